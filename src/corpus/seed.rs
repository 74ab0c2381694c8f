//! Bilingual bootstrap dataset, stored only when the corpus is empty.

use crate::corpus::store::CorpusStore;
use crate::corpus::types::{Priority, TrainingExample};
use crate::error::Result;

/// (text, category, priority)
const BOOTSTRAP_EXAMPLES: &[(&str, &str, Priority)] = &[
    // High
    ("Incendie dans un immeuble, fumée épaisse et personnes bloquées", "Sécurité", Priority::High),
    ("Fuite de gaz importante, forte odeur dans toute la rue", "Sécurité", Priority::High),
    ("Câble électrique arraché qui pend sur le trottoir, danger immédiat", "Électricité", Priority::High),
    ("Inondation du sous-sol de l'école, eau qui monte rapidement", "Eau et assainissement", Priority::High),
    ("Arbre tombé en travers de la route, circulation bloquée, urgent", "Voirie", Priority::High),
    ("Effondrement partiel d'un mur près de l'arrêt de bus, risque grave", "Bâtiments", Priority::High),
    ("Canalisation principale éclatée, plus d'eau potable dans le quartier", "Eau et assainissement", Priority::High),
    ("Accident grave au carrefour, feux de signalisation hors service", "Voirie", Priority::High),
    ("Fire in the apartment block, people trapped on the third floor", "Safety", Priority::High),
    ("Gas leak near the primary school, strong smell, emergency", "Safety", Priority::High),
    ("Live electrical wire down on the sidewalk, immediate danger", "Electricity", Priority::High),
    // Medium
    ("Lampadaire en panne depuis une semaine dans notre rue", "Éclairage public", Priority::Medium),
    ("Nid de poule profond sur l'avenue principale", "Voirie", Priority::Medium),
    ("Poubelles non collectées depuis plusieurs jours, odeurs", "Propreté", Priority::Medium),
    ("Bruit de chantier très tôt le matin tous les jours", "Nuisances", Priority::Medium),
    ("Feu de signalisation qui clignote de façon irrégulière", "Voirie", Priority::Medium),
    ("Bouche d'égout bouchée, eau stagnante après la pluie", "Eau et assainissement", Priority::Medium),
    ("Retard répété du ramassage des ordures ménagères", "Propreté", Priority::Medium),
    ("Trottoir dégradé difficile d'accès pour les poussettes", "Voirie", Priority::Medium),
    ("Street light broken for a week on our street", "Public lighting", Priority::Medium),
    ("Deep pothole on the main avenue damaging cars", "Roads", Priority::Medium),
    ("Garbage not collected for several days, bad smell", "Cleanliness", Priority::Medium),
    // Low
    ("Suggestion d'installer des bancs supplémentaires dans le parc", "Aménagement", Priority::Low),
    ("Proposition de fleurir le rond-point pour l'embellissement", "Aménagement", Priority::Low),
    ("Peinture écaillée sur la façade de la mairie", "Bâtiments", Priority::Low),
    ("Demande d'information sur les horaires de la bibliothèque", "Information", Priority::Low),
    ("Graffiti sur un mur du parking municipal", "Propreté", Priority::Low),
    ("Idée d'ajouter une piste cyclable le long du canal", "Aménagement", Priority::Low),
    ("Pelouse du square un peu haute, tonte à prévoir", "Espaces verts", Priority::Low),
    ("Suggestion to add more benches in the park", "Planning", Priority::Low),
    ("Request for information about library opening hours", "Information", Priority::Low),
    ("Idea to plant flowers along the avenue for beautification", "Planning", Priority::Low),
];

/// Build the bootstrap examples with `keyword_count` keywords each.
pub fn bootstrap_examples(keyword_count: usize) -> Result<Vec<TrainingExample>> {
    BOOTSTRAP_EXAMPLES
        .iter()
        .map(|(text, category, priority)| {
            TrainingExample::new(*text, Some(category.to_string()), *priority, keyword_count)
        })
        .collect()
}

/// Store the bootstrap dataset when `store` is empty.
///
/// Returns the number of examples written (0 when the store already had data).
pub fn seed_if_empty(store: &dyn CorpusStore, keyword_count: usize) -> Result<usize> {
    if !store.is_empty()? {
        return Ok(0);
    }

    let examples = bootstrap_examples(keyword_count)?;
    let written = examples.len();
    store.save_all(examples)?;
    log::info!("seeded {} corpus with {written} bootstrap examples", store.name());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::language::{Language, detect_language};
    use crate::corpus::memory::MemoryCorpusStore;

    #[test]
    fn test_bootstrap_covers_every_tier() {
        let examples = bootstrap_examples(5).unwrap();
        assert_eq!(examples.len(), 32);
        for priority in Priority::ALL {
            assert!(examples.iter().filter(|e| e.priority == priority).count() >= 10);
        }
        assert!(examples.iter().all(|e| !e.keywords.is_empty()));
    }

    #[test]
    fn test_bootstrap_is_bilingual() {
        let examples = bootstrap_examples(5).unwrap();
        let french = examples
            .iter()
            .filter(|e| detect_language(&e.text) == Language::Fr)
            .count();
        assert!(french > 0 && french < examples.len());
    }

    #[test]
    fn test_seed_only_when_empty() {
        let store = MemoryCorpusStore::new();
        assert_eq!(seed_if_empty(&store, 5).unwrap(), 32);
        assert_eq!(seed_if_empty(&store, 5).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 32);
    }
}
