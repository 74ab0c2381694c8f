//! The published model: a vectorizer and the classifier fitted with it.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::classification::classifier::{Classifier, ClassifierFactory};
use crate::classification::tfidf::{FeatureVector, TfIdfVectorizer};
use crate::config::EngineConfig;
use crate::corpus::types::{Priority, TrainingExample};
use crate::error::{Result, UrgencyError};

/// Lifecycle of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    /// No model has ever been published.
    Uninitialized,
    /// A model is active and no retrain is running.
    Trained,
    /// A retrain is in flight; the previous state (if any) keeps serving.
    Retraining,
}

/// Where a prediction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    /// The active trained model.
    Model,
    /// The keyword scorer.
    Fallback,
}

/// A priority with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub priority: Priority,
    pub source: PredictionSource,
    /// Version of the model consulted, if one was active.
    pub model_version: Option<u64>,
}

/// Summary of a completed retrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    pub version: u64,
    pub example_count: usize,
    pub vocabulary_size: usize,
    pub classes: Vec<Priority>,
    pub classifier: String,
    pub elapsed_ms: u64,
}

/// Immutable pairing of a fitted vectorizer with the classifier trained on
/// its output. Replaced wholesale on retrain, never patched.
pub struct ModelState {
    version: u64,
    vectorizer: TfIdfVectorizer,
    classifier: Box<dyn Classifier>,
    classes: Vec<Priority>,
    example_count: usize,
    trained_at: DateTime<Utc>,
    elapsed_ms: u64,
}

impl fmt::Debug for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelState")
            .field("version", &self.version)
            .field("vectorizer", &self.vectorizer)
            .field("classifier", &self.classifier.name())
            .field("example_count", &self.example_count)
            .field("trained_at", &self.trained_at)
            .finish()
    }
}

impl ModelState {
    /// Fit a brand-new state from a corpus snapshot.
    pub fn fit(
        version: u64,
        examples: &[TrainingExample],
        analyzer: Arc<dyn Analyzer>,
        config: &EngineConfig,
        factory: &ClassifierFactory,
    ) -> Result<Self> {
        if examples.is_empty() {
            return Err(UrgencyError::training("training corpus is empty"));
        }

        let started = Instant::now();
        let documents: Vec<String> = examples.iter().map(TrainingExample::document).collect();
        let labels: Vec<Priority> = examples.iter().map(|e| e.priority).collect();

        let vectorizer =
            TfIdfVectorizer::fit(analyzer, &documents, config.max_features, config.l2_normalize)?;
        let vectors = vectorizer.transform_all(&documents)?;

        let mut classifier = factory();
        classifier.train(&vectors, &labels)?;
        if !classifier.is_trained() {
            return Err(UrgencyError::training(format!(
                "{} reported success but is not trained",
                classifier.name()
            )));
        }

        let classes = Priority::ALL
            .into_iter()
            .filter(|p| labels.contains(p))
            .collect();

        Ok(ModelState {
            version,
            vectorizer,
            classifier,
            classes,
            example_count: examples.len(),
            trained_at: Utc::now(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Vectorize `text` with this state's own vocabulary.
    pub fn vectorize(&self, text: &str) -> Result<FeatureVector> {
        self.vectorizer.transform(text)
    }

    /// Classify an already vectorized document.
    pub fn classify(&self, vector: &FeatureVector) -> Result<Priority> {
        self.classifier.predict(vector)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn example_count(&self) -> usize {
        self.example_count
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Report describing how this state was built.
    pub fn report(&self) -> TrainReport {
        TrainReport {
            version: self.version,
            example_count: self.example_count,
            vocabulary_size: self.vocabulary_size(),
            classes: self.classes.clone(),
            classifier: self.classifier.name().to_string(),
            elapsed_ms: self.elapsed_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::ComplaintAnalyzer;
    use crate::classification::classifier::ClassifierKind;
    use crate::config::ClassifierConfig;
    use crate::corpus::seed::bootstrap_examples;

    fn factory() -> ClassifierFactory {
        ClassifierKind::LinearSvm.factory(ClassifierConfig::default())
    }

    #[test]
    fn test_fit_on_bootstrap() {
        let examples = bootstrap_examples(5).unwrap();
        let state = ModelState::fit(
            1,
            &examples,
            Arc::new(ComplaintAnalyzer::new()),
            &EngineConfig::default(),
            &factory(),
        )
        .unwrap();

        let report = state.report();
        assert_eq!(report.version, 1);
        assert_eq!(report.example_count, 32);
        assert_eq!(report.classes, Priority::ALL.to_vec());
        assert!(report.vocabulary_size > 50);

        let vector = state.vectorize("fuite de gaz").unwrap();
        assert_eq!(vector.dimension(), state.vocabulary_size());
        assert!(state.classify(&vector).is_ok());
    }

    #[test]
    fn test_fit_empty_corpus() {
        let err = ModelState::fit(
            1,
            &[],
            Arc::new(ComplaintAnalyzer::new()),
            &EngineConfig::default(),
            &factory(),
        )
        .unwrap_err();
        assert!(err.is_training());
    }

    #[test]
    fn test_vocabulary_bounded() {
        let examples = bootstrap_examples(5).unwrap();
        let config = EngineConfig {
            max_features: 20,
            ..EngineConfig::default()
        };
        let state = ModelState::fit(
            1,
            &examples,
            Arc::new(ComplaintAnalyzer::new()),
            &config,
            &factory(),
        )
        .unwrap();
        assert_eq!(state.vocabulary_size(), 20);
    }
}
