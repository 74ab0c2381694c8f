//! Deterministic weighted-keyword scorer.
//!
//! The last-resort classifier: used whenever no trained model is active or the
//! model fails. Every tier keyword found in the normalized text adds the tier
//! weight (High ×3, Medium ×2, Low ×1) to that tier's score. The strictly
//! highest score wins; ties and all-zero scores resolve to Medium.
//!
//! Keywords match whole words of the normalized text, allowing a plural or
//! feminine ending: `banc` matches `bancs` but not `bancaire`, `gaz` does not
//! match `gazon`. A keyword ending in `*` is a stem and matches any word it
//! starts (`effondr*` covers `effondrement`). Multi-word entries such as
//! `nid de poule` match consecutive words.

use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::normalize;
use crate::corpus::types::Priority;

const HIGH_KEYWORDS: &[&str] = &[
    // fr
    "urgent", "urgence", "danger*", "incendie", "fuite", "gaz", "explosion", "effondr*",
    "blesse", "accident", "grave", "inondation", "electrocution", "secours", "bloque",
    // en
    "emergency", "fire", "leak*", "injur*", "collapse*", "flood*", "hazard*", "trapped",
];

const MEDIUM_KEYWORDS: &[&str] = &[
    // fr
    "panne", "casse", "lampadaire", "eclairage", "nid de poule", "poubelle", "ordure", "dechet",
    "bruit", "nuisance", "retard", "odeur", "egout", "stagnant", "degrade", "fissure",
    "reparation",
    // en
    "broken", "pothole", "garbage", "trash", "noise", "repair*", "delay*",
];

const LOW_KEYWORDS: &[&str] = &[
    // fr
    "suggestion", "proposition", "idee", "embellissement", "amenagement", "banc", "fleur*",
    "peinture", "graffiti", "information", "esthetique", "amelioration", "pelouse",
    "decoration",
    // en
    "idea", "proposal", "bench", "flower", "paint*", "beautification", "improvement",
];

/// Endings a word may add to a plain keyword (plural, feminine).
const INFLECTIONS: &[&str] = &["", "s", "x", "e", "es"];

static DEFAULT_SCORER: LazyLock<Arc<KeywordScorer>> =
    LazyLock::new(|| Arc::new(KeywordScorer::default()));

/// One weighted keyword tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordTier {
    /// Tier this list votes for.
    pub priority: Priority,
    /// Multiplier applied to every match.
    pub weight: u32,
    /// Normalized keywords (lowercase, no accents), stems ending in `*`.
    pub keywords: Vec<String>,
}

impl KeywordTier {
    /// Build a tier, normalizing every keyword. A trailing `*` is kept.
    pub fn new(priority: Priority, weight: u32, keywords: &[&str]) -> Self {
        KeywordTier {
            priority,
            weight,
            keywords: keywords
                .iter()
                .filter_map(|k| {
                    let (body, stem) = match k.strip_suffix('*') {
                        Some(body) => (body, true),
                        None => (*k, false),
                    };
                    let body = normalize(body);
                    match (body.is_empty(), stem) {
                        (true, _) => None,
                        (false, true) => Some(format!("{body}*")),
                        (false, false) => Some(body),
                    }
                })
                .collect(),
        }
    }

    /// Number of keywords found among `words`.
    fn matches(&self, words: &[&str]) -> u32 {
        self.keywords
            .iter()
            .filter(|keyword| phrase_matches(words, keyword))
            .count() as u32
    }
}

fn phrase_matches(words: &[&str], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split(' ').collect();
    words
        .windows(parts.len())
        .any(|window| window.iter().zip(&parts).all(|(w, k)| word_matches(w, k)))
}

fn word_matches(word: &str, keyword: &str) -> bool {
    if let Some(stem) = keyword.strip_suffix('*') {
        return word.starts_with(stem);
    }
    word.strip_prefix(keyword)
        .is_some_and(|ending| INFLECTIONS.contains(&ending))
}

/// Weighted score per tier for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierScores {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl TierScores {
    fn add(&mut self, priority: Priority, score: u32) {
        match priority {
            Priority::High => self.high += score,
            Priority::Medium => self.medium += score,
            Priority::Low => self.low += score,
        }
    }

    /// Tier with the strictly highest score, Medium on ties or all zeros.
    pub fn decide(&self) -> Priority {
        let ranked = [
            (Priority::High, self.high),
            (Priority::Medium, self.medium),
            (Priority::Low, self.low),
        ];
        let best = ranked.iter().map(|(_, s)| *s).max().unwrap_or(0);
        let mut winners = ranked.iter().filter(|(_, s)| *s == best);

        match (winners.next(), winners.next()) {
            (Some((priority, score)), None) if *score > 0 => *priority,
            _ => Priority::Medium,
        }
    }
}

/// Keyword-tier fallback classifier.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    tiers: Vec<KeywordTier>,
}

impl Default for KeywordScorer {
    fn default() -> Self {
        KeywordScorer::new(vec![
            KeywordTier::new(Priority::High, 3, HIGH_KEYWORDS),
            KeywordTier::new(Priority::Medium, 2, MEDIUM_KEYWORDS),
            KeywordTier::new(Priority::Low, 1, LOW_KEYWORDS),
        ])
    }
}

impl KeywordScorer {
    /// Build a scorer from custom tiers.
    pub fn new(tiers: Vec<KeywordTier>) -> Self {
        KeywordScorer { tiers }
    }

    /// Shared scorer with the built-in French/English tables.
    pub fn shared() -> Arc<KeywordScorer> {
        Arc::clone(&DEFAULT_SCORER)
    }

    /// Configured tiers.
    pub fn tiers(&self) -> &[KeywordTier] {
        &self.tiers
    }

    /// Weighted scores for `text`.
    pub fn scores(&self, text: &str) -> TierScores {
        let normalized = normalize(text);
        let mut scores = TierScores::default();
        if normalized.is_empty() {
            return scores;
        }

        let words: Vec<&str> = normalized.split(' ').collect();
        for tier in &self.tiers {
            scores.add(tier.priority, tier.matches(&words) * tier.weight);
        }
        scores
    }

    /// Classify `text`. Total: never fails, always returns a tier.
    pub fn score(&self, text: &str) -> Priority {
        self.scores(text).decide()
    }
}

/// Score `text` with the built-in tables.
pub fn score_text(text: &str) -> Priority {
    DEFAULT_SCORER.score(text)
}
