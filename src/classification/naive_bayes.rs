//! Multinomial naive Bayes over TF-IDF weights.

use crate::classification::classifier::{Classifier, check_training_input};
use crate::classification::tfidf::FeatureVector;
use crate::corpus::types::Priority;
use crate::error::{Result, UrgencyError};

#[derive(Debug, Clone)]
struct ClassModel {
    priority: Priority,
    log_prior: f64,
    /// log P(feature | class), dense over the vocabulary
    log_likelihood: Vec<f64>,
}

/// Multinomial naive Bayes with additive smoothing.
///
/// Only classes present in the training set can be predicted, so a
/// single-class corpus yields a model that always answers that class.
#[derive(Debug, Clone)]
pub struct NaiveBayes {
    smoothing: f64,
    dimension: usize,
    classes: Vec<ClassModel>,
}

impl NaiveBayes {
    /// Create an untrained classifier with smoothing `alpha`.
    pub fn new(smoothing: f64) -> Self {
        NaiveBayes {
            smoothing,
            dimension: 0,
            classes: Vec::new(),
        }
    }
}

impl Classifier for NaiveBayes {
    fn train(&mut self, vectors: &[FeatureVector], labels: &[Priority]) -> Result<()> {
        let (dimension, present) = check_training_input(vectors, labels)?;
        let alpha = self.smoothing;
        let total = vectors.len() as f64;

        let mut classes = Vec::with_capacity(present.len());
        for priority in present {
            let mut feature_mass = vec![0.0; dimension];
            let mut documents = 0usize;

            for (vector, _) in vectors.iter().zip(labels).filter(|(_, l)| **l == priority) {
                documents += 1;
                for &(idx, weight) in vector.entries() {
                    feature_mass[idx] += weight.max(0.0);
                }
            }

            let denominator = feature_mass.iter().sum::<f64>() + alpha * dimension as f64;
            let log_likelihood = feature_mass
                .iter()
                .map(|mass| ((mass + alpha) / denominator).ln())
                .collect();

            classes.push(ClassModel {
                priority,
                log_prior: (documents as f64 / total).ln(),
                log_likelihood,
            });
        }

        self.dimension = dimension;
        self.classes = classes;
        Ok(())
    }

    fn predict(&self, vector: &FeatureVector) -> Result<Priority> {
        if self.classes.is_empty() {
            return Err(UrgencyError::prediction("naive bayes is not trained"));
        }
        if vector.dimension() != self.dimension {
            return Err(UrgencyError::prediction(format!(
                "vector dimension {} does not match model dimension {}",
                vector.dimension(),
                self.dimension
            )));
        }

        let mut best: Option<(Priority, f64)> = None;
        for class in &self.classes {
            let score = class.log_prior + vector.dot(&class.log_likelihood);
            // classes are ordered most urgent first, so strict > keeps the urgent one on ties
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((class.priority, score));
            }
        }

        best.map(|(priority, _)| priority)
            .ok_or_else(|| UrgencyError::prediction("naive bayes has no classes"))
    }

    fn is_trained(&self) -> bool {
        !self.classes.is_empty()
    }

    fn name(&self) -> &str {
        "naive_bayes"
    }
}
