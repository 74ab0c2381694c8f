//! Corpus and model diagnostics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::language::{Language, detect_language};
use crate::corpus::types::{Priority, TrainingExample};
use crate::engine::state::ModelState;

/// Snapshot of the corpus and the active model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatistics {
    pub trained: bool,
    pub example_count: usize,
    pub priority_distribution: BTreeMap<Priority, usize>,
    pub language_distribution: BTreeMap<Language, usize>,
    pub model_version: Option<u64>,
    pub vocabulary_size: usize,
    pub classifier: Option<String>,
    pub last_trained_at: Option<DateTime<Utc>>,
}

impl ModelStatistics {
    /// Scan `examples` and describe `model`.
    pub fn collect(examples: &[TrainingExample], model: Option<&ModelState>) -> Self {
        let mut priority_distribution = BTreeMap::new();
        let mut language_distribution = BTreeMap::new();

        for example in examples {
            *priority_distribution.entry(example.priority).or_insert(0) += 1;
            *language_distribution
                .entry(detect_language(&example.text))
                .or_insert(0) += 1;
        }

        ModelStatistics {
            trained: model.is_some(),
            example_count: examples.len(),
            priority_distribution,
            language_distribution,
            model_version: model.map(ModelState::version),
            vocabulary_size: model.map(ModelState::vocabulary_size).unwrap_or(0),
            classifier: model.map(|m| m.classifier_name().to_string()),
            last_trained_at: model.map(ModelState::trained_at),
        }
    }
}
