//! Classifier trait definition.
//!
//! The engine only ever calls `train` and `predict`, so any multiclass model
//! over [`FeatureVector`]s can be dropped in.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::classification::linear_svm::LinearSvm;
use crate::classification::naive_bayes::NaiveBayes;
use crate::classification::tfidf::FeatureVector;
use crate::config::ClassifierConfig;
use crate::corpus::types::Priority;
use crate::error::{Result, UrgencyError};

/// Trainable multiclass priority classifier.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Fit the model. Requires at least one example; a corpus with a single
    /// class must still succeed.
    fn train(&mut self, vectors: &[FeatureVector], labels: &[Priority]) -> Result<()>;

    /// Predict the tier of one vector. Deterministic for a fixed model.
    fn predict(&self, vector: &FeatureVector) -> Result<Priority>;

    /// Whether `train` has completed successfully.
    fn is_trained(&self) -> bool;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}

/// Produces fresh, untrained classifiers for each retrain.
pub type ClassifierFactory = Arc<dyn Fn() -> Box<dyn Classifier> + Send + Sync>;

/// Built-in classifier implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    /// One-vs-one linear support vector machine.
    #[default]
    LinearSvm,
    /// Multinomial naive Bayes.
    NaiveBayes,
}

impl ClassifierKind {
    /// Build an untrained classifier of this kind.
    pub fn build(self, config: &ClassifierConfig) -> Box<dyn Classifier> {
        match self {
            ClassifierKind::LinearSvm => Box::new(LinearSvm::new(config.clone())),
            ClassifierKind::NaiveBayes => Box::new(NaiveBayes::new(config.smoothing)),
        }
    }

    /// A factory building this kind with `config`.
    pub fn factory(self, config: ClassifierConfig) -> ClassifierFactory {
        Arc::new(move || self.build(&config))
    }
}

impl FromStr for ClassifierKind {
    type Err = UrgencyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear_svm" | "svm" => Ok(ClassifierKind::LinearSvm),
            "naive_bayes" | "nb" => Ok(ClassifierKind::NaiveBayes),
            other => Err(UrgencyError::config(format!("unknown classifier: {other}"))),
        }
    }
}

/// Shared input checks for `Classifier::train` implementations.
///
/// Returns the vector dimension and the distinct labels, most urgent first.
pub(crate) fn check_training_input(
    vectors: &[FeatureVector],
    labels: &[Priority],
) -> Result<(usize, Vec<Priority>)> {
    if vectors.is_empty() {
        return Err(UrgencyError::training("at least one training example is required"));
    }
    if vectors.len() != labels.len() {
        return Err(UrgencyError::training(format!(
            "{} vectors but {} labels",
            vectors.len(),
            labels.len()
        )));
    }

    let dimension = vectors[0].dimension();
    if let Some(bad) = vectors.iter().find(|v| v.dimension() != dimension) {
        return Err(UrgencyError::training(format!(
            "mixed vector dimensions: {} and {}",
            dimension,
            bad.dimension()
        )));
    }

    let classes: Vec<Priority> = Priority::ALL
        .into_iter()
        .filter(|p| labels.contains(p))
        .collect();
    Ok((dimension, classes))
}
