use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use urgency::classification::{Classifier, ClassifierFactory, LinearSvm};
use urgency::config::{ClassifierConfig, EngineConfig};
use urgency::corpus::{CorpusStore, MemoryCorpusStore, Priority, TrainingExample};
use urgency::engine::{EngineStatus, PredictionSource, PriorityEngine};
use urgency::error::{Result, UrgencyError};

const FEEDBACK: [(&str, Priority); 10] = [
    ("Fuite de gaz dans la cave, odeur très forte", Priority::High),
    ("Incendie dans une poubelle près de l'école", Priority::High),
    ("Fire in the parking garage, smoke everywhere", Priority::High),
    ("Câble électrique arraché sur le trottoir", Priority::High),
    ("Nid de poule sur la route principale", Priority::Medium),
    ("Lampadaire en panne depuis une semaine", Priority::Medium),
    ("Garbage not collected this week", Priority::Medium),
    ("Suggestion de nouveaux bancs dans le parc", Priority::Low),
    ("Graffiti sur le mur de la mairie", Priority::Low),
    ("Please add more flowers near the fountain", Priority::Low),
];

fn empty_engine() -> Result<PriorityEngine> {
    PriorityEngine::builder(Arc::new(MemoryCorpusStore::new())).build()
}

#[test]
fn untrained_engine_scores_high_keywords_as_high() -> Result<()> {
    let engine = empty_engine()?;

    let prediction = engine.predict_detailed("URGENT danger fuite", "incendie grave", "Sécurité");
    assert_eq!(prediction.priority, Priority::High);
    assert_eq!(prediction.priority.code(), 1);
    assert_eq!(prediction.source, PredictionSource::Fallback);
    Ok(())
}

#[test]
fn untrained_engine_scores_suggestions_as_low() -> Result<()> {
    let engine = empty_engine()?;

    let priority = engine.predict(
        "Suggestion d'embellissement du parc",
        "quelques bancs supplémentaires",
        "Aménagement",
    );
    assert_eq!(priority, Priority::Low);
    assert_eq!(priority.code(), 3);
    Ok(())
}

#[test]
fn digits_only_input_falls_back_to_medium() -> Result<()> {
    let engine = empty_engine()?;
    assert_eq!(engine.predict("12345", "", ""), Priority::Medium);

    engine.initialize()?;
    let prediction = engine.predict_detailed("12345", "", "");
    assert_eq!(prediction.priority, Priority::Medium);
    assert_eq!(prediction.source, PredictionSource::Fallback);
    assert_eq!(prediction.model_version, Some(1));
    Ok(())
}

#[test]
fn predict_always_returns_a_tier() -> Result<()> {
    let inputs = [
        ("", "", ""),
        ("   ", "\t", "\n"),
        ("!!!", "???", "..."),
        ("Fuite de gaz", "", "Sécurité"),
        ("Éclairage défectueux", "rue sombre", "Voirie"),
        ("こんにちは", "世界", ""),
        ("the and of", "le la les", ""),
    ];

    let untrained = empty_engine()?;
    let trained = empty_engine()?;
    trained.initialize()?;

    for (title, description, category) in inputs {
        for engine in [&untrained, &trained] {
            let code = engine.predict(title, description, category).code();
            assert!((1..=3).contains(&code), "{title:?} produced {code}");
        }
    }
    Ok(())
}

#[test]
fn ten_additions_trigger_exactly_one_retrain() -> Result<()> {
    let engine = empty_engine()?;

    let mut triggered = Vec::new();
    for (text, priority) in FEEDBACK {
        let outcome = engine.add_training_example(text, None, priority)?;
        triggered.push(outcome.retrain_triggered);
    }
    engine.join_background();

    assert_eq!(triggered.iter().filter(|t| **t).count(), 1);
    assert!(triggered[9]);
    assert_eq!(engine.retrain_count(), 1);
    assert_eq!(engine.status(), EngineStatus::Trained);
    assert_eq!(engine.active_model().map(|m| m.example_count()), Some(10));
    Ok(())
}

#[test]
fn explicit_train_on_empty_corpus_fails_without_touching_state() -> Result<()> {
    let engine = empty_engine()?;

    let err = engine.train_model().unwrap_err();
    assert!(matches!(err, UrgencyError::Training(_)));
    assert_eq!(engine.status(), EngineStatus::Uninitialized);
    assert_eq!(engine.model_version(), None);
    Ok(())
}

/// Store whose contents can be wiped, to empty the corpus under a trained engine.
#[derive(Debug, Default)]
struct ResettableStore {
    examples: RwLock<Vec<TrainingExample>>,
}

impl ResettableStore {
    fn clear(&self) {
        self.examples.write().clear();
    }
}

impl CorpusStore for ResettableStore {
    fn find_all(&self) -> Result<Vec<TrainingExample>> {
        Ok(self.examples.read().clone())
    }

    fn save(&self, example: TrainingExample) -> Result<()> {
        self.examples.write().push(example);
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.examples.read().len())
    }

    fn name(&self) -> &str {
        "resettable"
    }
}

#[test]
fn failed_retrain_keeps_previous_model() -> Result<()> {
    let store = Arc::new(ResettableStore::default());
    let engine = PriorityEngine::builder(store.clone()).build()?;
    engine.initialize()?;

    let before = engine.active_model().map(|m| m.version());
    let answer = engine.predict_detailed("Fuite de gaz", "odeur", "Sécurité");

    store.clear();
    let err = engine.train_model().unwrap_err();
    assert!(err.is_training());

    assert_eq!(engine.active_model().map(|m| m.version()), before);
    assert_eq!(
        engine.predict_detailed("Fuite de gaz", "odeur", "Sécurité"),
        answer
    );
    Ok(())
}

#[test]
fn zero_fit_bound_is_rejected() -> Result<()> {
    let config = EngineConfig {
        classifier: ClassifierConfig {
            max_fit_millis: 0,
            ..ClassifierConfig::default()
        },
        ..EngineConfig::default()
    };
    let err = PriorityEngine::new(config, Arc::new(MemoryCorpusStore::new())).unwrap_err();
    assert!(matches!(err, UrgencyError::Config(_)));
    Ok(())
}

#[test]
fn tight_fit_bound_still_publishes_a_model() -> Result<()> {
    let config = EngineConfig {
        classifier: ClassifierConfig {
            max_fit_millis: 1,
            ..ClassifierConfig::default()
        },
        ..EngineConfig::default()
    };
    let engine = PriorityEngine::new(config, Arc::new(MemoryCorpusStore::new()))?;
    let report = engine.initialize()?;
    assert_eq!(report.classes.len(), 3);

    let prediction =
        engine.predict_detailed("Lampadaire en panne depuis une semaine", "", "Éclairage public");
    assert_eq!(prediction.source, PredictionSource::Model);
    assert_eq!(prediction.model_version, Some(1));
    Ok(())
}

#[test]
fn unfinished_fit_keeps_previous_model() -> Result<()> {
    let starved = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&starved);
    let factory: ClassifierFactory = Arc::new(move || -> Box<dyn Classifier> {
        let epochs = if flag.load(Ordering::Acquire) { 0 } else { 50 };
        Box::new(LinearSvm::new(ClassifierConfig {
            epochs,
            ..ClassifierConfig::default()
        }))
    });
    let engine = PriorityEngine::builder(Arc::new(MemoryCorpusStore::new()))
        .classifier_factory(factory)
        .build()?;
    engine.initialize()?;
    let answer = engine.predict_detailed("Fuite de gaz", "odeur", "Sécurité");

    starved.store(true, Ordering::Release);
    let err = engine.train_model().unwrap_err();
    assert!(err.is_training());

    assert_eq!(engine.model_version(), Some(1));
    assert_eq!(
        engine.predict_detailed("Fuite de gaz", "odeur", "Sécurité"),
        answer
    );
    Ok(())
}

#[test]
fn retraining_unchanged_corpus_gives_stable_predictions() -> Result<()> {
    let engine = empty_engine()?;
    engine.initialize()?;

    let samples = [
        ("Fuite de gaz", "odeur forte dans l'immeuble", "Sécurité"),
        ("Nid de poule", "route abîmée", "Voirie"),
        ("Graffiti", "mur de l'école", "Propreté"),
        ("Broken streetlight", "dark street at night", "Lighting"),
    ];

    let first: Vec<Priority> = samples
        .iter()
        .map(|(t, d, c)| engine.predict(t, d, c))
        .collect();
    engine.train_model()?;
    let second: Vec<Priority> = samples
        .iter()
        .map(|(t, d, c)| engine.predict(t, d, c))
        .collect();

    assert_eq!(first, second);
    assert_eq!(engine.model_version(), Some(2));
    Ok(())
}

#[test]
fn unknown_vocabulary_policy_is_configurable() -> Result<()> {
    let with_fallback = empty_engine()?;
    with_fallback.initialize()?;
    let prediction = with_fallback.predict_detailed("zzzyx qwvrt", "", "");
    assert_eq!(prediction.source, PredictionSource::Fallback);
    assert_eq!(prediction.priority, Priority::Medium);

    let config = EngineConfig {
        fallback_on_unknown_vocabulary: false,
        ..EngineConfig::default()
    };
    let without_fallback = PriorityEngine::new(config, Arc::new(MemoryCorpusStore::new()))?;
    without_fallback.initialize()?;
    let prediction = without_fallback.predict_detailed("zzzyx qwvrt", "", "");
    assert_eq!(prediction.source, PredictionSource::Model);
    Ok(())
}

#[test]
fn statistics_describe_corpus_and_model() -> Result<()> {
    let engine = empty_engine()?;
    engine.initialize()?;
    engine.add_training_example("Odeur de gaz dans la rue", Some("Sécurité"), Priority::High)?;

    let stats = engine.model_statistics()?;
    assert!(stats.trained);
    assert_eq!(stats.example_count, 33);
    assert_eq!(stats.priority_distribution.values().sum::<usize>(), 33);
    assert_eq!(stats.language_distribution.values().sum::<usize>(), 33);
    assert_eq!(stats.priority_distribution[&Priority::High], 12);
    assert!(stats.vocabulary_size > 0);
    assert!(stats.last_trained_at.is_some());
    Ok(())
}
