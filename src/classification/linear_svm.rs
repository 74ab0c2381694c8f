//! One-vs-one linear support vector machine.
//!
//! One binary hinge-loss model is trained per pair of observed classes with
//! Pegasos-style stochastic sub-gradient descent. The bias is an extra
//! constant feature. Shuffling uses a seeded RNG, so the same corpus and
//! config always produce the same model.
//!
//! Prediction runs every pairwise model and counts votes; ties are broken by
//! the summed decision values, then by urgency.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::classification::classifier::{Classifier, check_training_input};
use crate::classification::tfidf::FeatureVector;
use crate::config::ClassifierConfig;
use crate::corpus::types::Priority;
use crate::error::{Result, UrgencyError};

/// Binary separator between `positive` (+1) and `negative` (-1).
#[derive(Debug, Clone)]
struct PairwiseModel {
    positive: Priority,
    negative: Priority,
    weights: Vec<f64>,
    bias: f64,
    epochs_run: usize,
}

impl PairwiseModel {
    fn decision(&self, vector: &FeatureVector) -> f64 {
        vector.dot(&self.weights) + self.bias
    }
}

#[derive(Debug, Clone)]
enum SvmModel {
    /// Only one class was seen during training.
    Constant(Priority),
    OneVsOne {
        dimension: usize,
        pairs: Vec<PairwiseModel>,
    },
}

/// One-vs-one linear SVM classifier.
#[derive(Debug, Clone)]
pub struct LinearSvm {
    config: ClassifierConfig,
    model: Option<SvmModel>,
}

impl LinearSvm {
    /// Create an untrained classifier.
    pub fn new(config: ClassifierConfig) -> Self {
        LinearSvm {
            config,
            model: None,
        }
    }

    fn fit_pair(
        &self,
        vectors: &[FeatureVector],
        labels: &[Priority],
        positive: Priority,
        negative: Priority,
        dimension: usize,
        deadline: Instant,
    ) -> PairwiseModel {
        let mut samples: Vec<(usize, f64)> = labels
            .iter()
            .enumerate()
            .filter_map(|(i, label)| match label {
                l if *l == positive => Some((i, 1.0)),
                l if *l == negative => Some((i, -1.0)),
                _ => None,
            })
            .collect();

        let lambda = self.config.lambda;
        let seed = self
            .config
            .seed
            .wrapping_add((positive.index() * 3 + negative.index()) as u64);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut weights = vec![0.0; dimension];
        let mut bias = 0.0;
        let mut step: u64 = 0;

        let mut epochs_run = 0;
        for epoch in 0..self.config.epochs {
            // The first epoch always runs so no pair is left at the zero model.
            if epoch > 0 && Instant::now() > deadline {
                log::warn!(
                    "linear svm {positive:?}/{negative:?} stopped after {epoch} epochs: fit time bound reached"
                );
                break;
            }

            samples.shuffle(&mut rng);
            for &(i, y) in &samples {
                step += 1;
                let eta = 1.0 / (lambda * step as f64);
                let margin = y * (vectors[i].dot(&weights) + bias);

                let shrink = 1.0 - eta * lambda;
                for w in weights.iter_mut() {
                    *w *= shrink;
                }
                bias *= shrink;

                if margin < 1.0 {
                    for &(idx, x) in vectors[i].entries() {
                        weights[idx] += eta * y * x;
                    }
                    bias += eta * y;
                }
            }
            epochs_run += 1;
        }

        PairwiseModel {
            positive,
            negative,
            weights,
            bias,
            epochs_run,
        }
    }
}

impl Classifier for LinearSvm {
    fn train(&mut self, vectors: &[FeatureVector], labels: &[Priority]) -> Result<()> {
        let (dimension, classes) = check_training_input(vectors, labels)?;

        if let [only] = classes.as_slice() {
            log::debug!("single-class corpus, linear svm degenerates to constant {only:?}");
            self.model = Some(SvmModel::Constant(*only));
            return Ok(());
        }

        let deadline = Instant::now() + self.config.max_fit_duration();
        let mut pairs = Vec::new();
        for (i, positive) in classes.iter().enumerate() {
            for negative in &classes[i + 1..] {
                pairs.push(self.fit_pair(
                    vectors, labels, *positive, *negative, dimension, deadline,
                ));
            }
        }

        if pairs.iter().any(|p| p.epochs_run == 0) {
            return Err(UrgencyError::training("linear svm pair left untrained"));
        }
        if pairs
            .iter()
            .any(|p| !p.bias.is_finite() || p.weights.iter().any(|w| !w.is_finite()))
        {
            return Err(UrgencyError::training("linear svm diverged"));
        }

        self.model = Some(SvmModel::OneVsOne { dimension, pairs });
        Ok(())
    }

    fn predict(&self, vector: &FeatureVector) -> Result<Priority> {
        let (dimension, pairs) = match &self.model {
            None => return Err(UrgencyError::prediction("linear svm is not trained")),
            Some(SvmModel::Constant(priority)) => return Ok(*priority),
            Some(SvmModel::OneVsOne { dimension, pairs }) => (*dimension, pairs),
        };

        if vector.dimension() != dimension {
            return Err(UrgencyError::prediction(format!(
                "vector dimension {} does not match model dimension {dimension}",
                vector.dimension()
            )));
        }

        let mut votes = [0usize; 3];
        let mut confidence = [0.0f64; 3];
        for pair in pairs {
            let decision = pair.decision(vector);
            let winner = if decision >= 0.0 {
                pair.positive
            } else {
                pair.negative
            };
            votes[winner.index()] += 1;
            confidence[pair.positive.index()] += decision;
            confidence[pair.negative.index()] -= decision;
        }

        let best = (0..3)
            .filter(|&i| pairs.iter().any(|p| p.positive.index() == i || p.negative.index() == i))
            .max_by(|&a, &b| {
                votes[a]
                    .cmp(&votes[b])
                    .then(confidence[a].total_cmp(&confidence[b]))
                    .then(b.cmp(&a))
            })
            .and_then(Priority::from_index);

        best.ok_or_else(|| UrgencyError::prediction("linear svm has no classes"))
    }

    fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    fn name(&self) -> &str {
        "linear_svm"
    }
}
