//! Priority classification engine.
//!
//! The engine owns the active [`ModelState`] and keeps three promises:
//!
//! - `predict` always answers a tier, falling back to the keyword scorer when
//!   no model is active or the model fails;
//! - a retrain builds its state off to the side and publishes it with one
//!   pointer swap, so readers see either the old or the new pair of
//!   vectorizer and classifier, never a mix;
//! - at most one retrain runs at a time.
//!
//! ```text
//! UNINITIALIZED ──train──▶ TRAINED ◀──publish── RETRAINING
//!                             └────────train────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use urgency::corpus::{MemoryCorpusStore, Priority};
//! use urgency::engine::PriorityEngine;
//!
//! let engine = PriorityEngine::builder(Arc::new(MemoryCorpusStore::new())).build().unwrap();
//! // untrained: the keyword scorer answers
//! assert_eq!(engine.predict("Fuite de gaz", "danger", "Sécurité"), Priority::High);
//!
//! engine.initialize().unwrap();
//! assert!(engine.is_trained());
//! ```

pub mod state;
pub mod stats;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, default_analyzer};
use crate::classification::classifier::ClassifierFactory;
use crate::classification::keyword_scorer::KeywordScorer;
use crate::config::EngineConfig;
use crate::corpus::seed::seed_if_empty;
use crate::corpus::store::CorpusStore;
use crate::corpus::types::{Priority, TrainingExample};
use crate::error::{Result, UrgencyError};

pub use state::{EngineStatus, ModelState, Prediction, PredictionSource, TrainReport};
pub use stats::ModelStatistics;

/// What started a retrain. Only explicit retrains surface failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrainTrigger {
    /// Administrative call; waits for any in-flight retrain.
    Explicit,
    /// Daily scheduler tick.
    Scheduled,
    /// Corpus size reached a multiple of the threshold.
    Threshold,
}

/// Result of appending training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOutcome {
    /// Corpus size after the append.
    pub corpus_size: usize,
    /// Whether a background retrain was started.
    pub retrain_triggered: bool,
}

/// Builder for [`PriorityEngine`].
pub struct EngineBuilder {
    store: Arc<dyn CorpusStore>,
    config: EngineConfig,
    analyzer: Arc<dyn Analyzer>,
    scorer: Arc<KeywordScorer>,
    factory: Option<ClassifierFactory>,
}

impl EngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn keyword_scorer(mut self, scorer: Arc<KeywordScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Override the classifier chosen by `config.classifier.kind`.
    pub fn classifier_factory(mut self, factory: ClassifierFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn build(self) -> Result<PriorityEngine> {
        self.config.validate()?;
        let factory = self.factory.unwrap_or_else(|| {
            self.config
                .classifier
                .kind
                .factory(self.config.classifier.clone())
        });

        Ok(PriorityEngine {
            inner: Arc::new(EngineInner {
                config: self.config,
                store: self.store,
                analyzer: self.analyzer,
                scorer: self.scorer,
                factory,
                active: RwLock::new(None),
                retrain_guard: Mutex::new(()),
                next_version: AtomicU64::new(1),
                retrain_count: AtomicU64::new(0),
                background: Mutex::new(Vec::new()),
            }),
        })
    }
}

/// Cheaply clonable handle to a shared engine.
#[derive(Clone)]
pub struct PriorityEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: EngineConfig,
    store: Arc<dyn CorpusStore>,
    analyzer: Arc<dyn Analyzer>,
    scorer: Arc<KeywordScorer>,
    factory: ClassifierFactory,
    /// The single publication slot.
    active: RwLock<Option<Arc<ModelState>>>,
    /// Held for the whole duration of a retrain.
    retrain_guard: Mutex<()>,
    next_version: AtomicU64,
    retrain_count: AtomicU64,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for PriorityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityEngine")
            .field("store", &self.inner.store.name())
            .field("analyzer", &self.inner.analyzer.name())
            .field("status", &self.status())
            .field("model_version", &self.model_version())
            .finish()
    }
}

impl PriorityEngine {
    /// Start building an engine over `store`.
    pub fn builder(store: Arc<dyn CorpusStore>) -> EngineBuilder {
        EngineBuilder {
            store,
            config: EngineConfig::default(),
            analyzer: default_analyzer(),
            scorer: KeywordScorer::shared(),
            factory: None,
        }
    }

    /// Engine with `config` and the built-in classifier it names.
    pub fn new(config: EngineConfig, store: Arc<dyn CorpusStore>) -> Result<Self> {
        Self::builder(store).config(config).build()
    }

    /// Seed an empty corpus with the bootstrap dataset, then train.
    pub fn initialize(&self) -> Result<TrainReport> {
        let seeded = seed_if_empty(self.inner.store.as_ref(), self.inner.config.keyword_count)?;
        if seeded == 0 {
            log::debug!("corpus already populated, skipping bootstrap");
        }
        self.train_model()
    }

    /// Explicit retrain. Waits for any in-flight retrain, then trains on the
    /// current corpus. Failures are returned; the active model is unchanged.
    pub fn train_model(&self) -> Result<TrainReport> {
        let _guard = self.inner.retrain_guard.lock();
        self.inner.train_locked(RetrainTrigger::Explicit)
    }

    /// Retrain unless one is already running. Failures are only logged.
    ///
    /// Returns `None` when skipped or failed.
    pub fn retrain_if_idle(&self, trigger: RetrainTrigger) -> Option<TrainReport> {
        self.inner.retrain_if_idle(trigger)
    }

    /// Classify a complaint. Never fails.
    pub fn predict(&self, title: &str, description: &str, category: &str) -> Priority {
        self.predict_detailed(title, description, category).priority
    }

    /// Classify a complaint and report which path answered.
    pub fn predict_detailed(&self, title: &str, description: &str, category: &str) -> Prediction {
        let text = [title, description, category]
            .iter()
            .map(|field| field.trim())
            .filter(|field| !field.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        self.predict_text(&text)
    }

    /// Classify free text. Never fails.
    pub fn predict_text(&self, text: &str) -> Prediction {
        let Some(model) = self.active_model() else {
            log::debug!("no trained model, using keyword scorer");
            return self.fallback(text, None);
        };

        let attempt = catch_unwind(AssertUnwindSafe(|| -> Result<Option<Priority>> {
            let vector = model.vectorize(text)?;
            if vector.is_zero() && self.inner.config.fallback_on_unknown_vocabulary {
                return Ok(None);
            }
            model.classify(&vector).map(Some)
        }));

        match attempt {
            Ok(Ok(Some(priority))) => Prediction {
                priority,
                source: PredictionSource::Model,
                model_version: Some(model.version()),
            },
            Ok(Ok(None)) => {
                log::debug!("input shares no term with vocabulary v{}", model.version());
                self.fallback(text, Some(model.version()))
            }
            Ok(Err(e)) => {
                log::warn!("model v{} failed, using keyword scorer: {e}", model.version());
                self.fallback(text, Some(model.version()))
            }
            Err(_) => {
                log::error!("model v{} panicked, using keyword scorer", model.version());
                self.fallback(text, Some(model.version()))
            }
        }
    }

    fn fallback(&self, text: &str, model_version: Option<u64>) -> Prediction {
        Prediction {
            priority: self.inner.scorer.score(text),
            source: PredictionSource::Fallback,
            model_version,
        }
    }

    /// Append a labeled example; starts a background retrain when the corpus
    /// size becomes a multiple of `retrain_threshold`.
    pub fn add_training_example(
        &self,
        text: &str,
        category: Option<&str>,
        priority: Priority,
    ) -> Result<AddOutcome> {
        let example = TrainingExample::new(
            text,
            category.map(str::to_string),
            priority,
            self.inner.config.keyword_count,
        )?;
        self.inner.store.save(example)?;

        let corpus_size = self.inner.store.count()?;
        let retrain_triggered = corpus_size % self.inner.config.retrain_threshold == 0;
        if retrain_triggered {
            log::info!("corpus reached {corpus_size} examples, retraining in background");
            self.spawn_background_retrain()?;
        }

        Ok(AddOutcome {
            corpus_size,
            retrain_triggered,
        })
    }

    /// Append many examples; at most one background retrain is started, and
    /// only if some intermediate size crossed a threshold multiple.
    ///
    /// The batch is validated up front; nothing is stored if any text is blank.
    pub fn add_training_examples(&self, examples: Vec<TrainingExample>) -> Result<AddOutcome> {
        let threshold = self.inner.config.retrain_threshold;
        let keyword_count = self.inner.config.keyword_count;
        let examples = examples
            .into_iter()
            .map(|example| example.prepared(keyword_count))
            .collect::<Result<Vec<_>>>()?;
        let counts = self.inner.store.save_all(examples)?;

        let corpus_size = match counts.last() {
            Some(size) => *size,
            None => self.inner.store.count()?,
        };
        let retrain_triggered = counts.iter().any(|count| count % threshold == 0);
        if retrain_triggered {
            log::info!("bulk import reached {corpus_size} examples, retraining in background");
            self.spawn_background_retrain()?;
        }

        Ok(AddOutcome {
            corpus_size,
            retrain_triggered,
        })
    }

    fn spawn_background_retrain(&self) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        let handle = thread::Builder::new()
            .name("urgency-retrain".to_string())
            .spawn(move || {
                inner.retrain_if_idle(RetrainTrigger::Threshold);
            })
            .map_err(|e| UrgencyError::other(format!("failed to spawn retrain thread: {e}")))?;

        let mut background = self.inner.background.lock();
        background.retain(|h| !h.is_finished());
        background.push(handle);
        Ok(())
    }

    /// Wait for every background retrain started so far.
    pub fn join_background(&self) {
        let handles: Vec<JoinHandle<()>> = self.inner.background.lock().drain(..).collect();
        for handle in handles {
            if handle.join().is_err() {
                log::error!("background retrain thread panicked");
            }
        }
    }

    /// Best-effort diagnostic scan of the corpus and the active model.
    pub fn model_statistics(&self) -> Result<ModelStatistics> {
        let examples = self.inner.store.find_all()?;
        let model = self.active_model();
        Ok(ModelStatistics::collect(&examples, model.as_deref()))
    }

    /// Currently published model, if any.
    pub fn active_model(&self) -> Option<Arc<ModelState>> {
        self.inner.active.read().clone()
    }

    pub fn is_trained(&self) -> bool {
        self.inner.active.read().is_some()
    }

    pub fn status(&self) -> EngineStatus {
        if self.inner.retrain_guard.is_locked() {
            EngineStatus::Retraining
        } else if self.is_trained() {
            EngineStatus::Trained
        } else {
            EngineStatus::Uninitialized
        }
    }

    /// Version of the active model.
    pub fn model_version(&self) -> Option<u64> {
        self.active_model().map(|m| m.version())
    }

    /// Number of successfully published retrains.
    pub fn retrain_count(&self) -> u64 {
        self.inner.retrain_count.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn CorpusStore> {
        &self.inner.store
    }
}

impl EngineInner {
    fn retrain_if_idle(&self, trigger: RetrainTrigger) -> Option<TrainReport> {
        let Some(_guard) = self.retrain_guard.try_lock() else {
            log::info!("{trigger:?} retrain skipped: another retrain is in flight");
            return None;
        };

        match self.train_locked(trigger) {
            Ok(report) => Some(report),
            Err(e) => {
                log::error!("{trigger:?} retrain failed, keeping previous model: {e}");
                None
            }
        }
    }

    /// Caller must hold `retrain_guard`.
    fn train_locked(&self, trigger: RetrainTrigger) -> Result<TrainReport> {
        let examples = self.store.find_all()?;
        let version = self.next_version.load(Ordering::Acquire);

        let state = match ModelState::fit(
            version,
            &examples,
            Arc::clone(&self.analyzer),
            &self.config,
            &self.factory,
        ) {
            Ok(state) => state,
            Err(e) => {
                log::warn!(
                    "{trigger:?} retrain on {} examples failed: {e}",
                    examples.len()
                );
                return Err(match e {
                    UrgencyError::Training(_) => e,
                    other => UrgencyError::training(other.to_string()),
                });
            }
        };

        let report = state.report();
        *self.active.write() = Some(Arc::new(state));
        self.next_version.fetch_add(1, Ordering::AcqRel);
        self.retrain_count.fetch_add(1, Ordering::AcqRel);

        log::info!(
            "{trigger:?} retrain published model v{} ({} examples, {} terms, {}, {} ms)",
            report.version,
            report.example_count,
            report.vocabulary_size,
            report.classifier,
            report.elapsed_ms
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::memory::MemoryCorpusStore;

    fn engine() -> PriorityEngine {
        PriorityEngine::builder(Arc::new(MemoryCorpusStore::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_untrained_uses_fallback() {
        let engine = engine();
        assert_eq!(engine.status(), EngineStatus::Uninitialized);

        let prediction = engine.predict_detailed("URGENT danger fuite", "incendie grave", "Sécurité");
        assert_eq!(prediction.priority, Priority::High);
        assert_eq!(prediction.source, PredictionSource::Fallback);
        assert_eq!(prediction.model_version, None);
    }

    #[test]
    fn test_initialize_seeds_and_trains() {
        let engine = engine();
        let report = engine.initialize().unwrap();

        assert_eq!(report.example_count, 32);
        assert_eq!(report.version, 1);
        assert_eq!(engine.status(), EngineStatus::Trained);
        assert_eq!(engine.store().count().unwrap(), 32);
        assert_eq!(engine.retrain_count(), 1);
    }

    #[test]
    fn test_initialize_does_not_reseed() {
        let store = Arc::new(MemoryCorpusStore::new());
        store
            .save(TrainingExample::new("fuite de gaz", None, Priority::High, 5).unwrap())
            .unwrap();
        let engine = PriorityEngine::builder(store).build().unwrap();

        engine.initialize().unwrap();
        assert_eq!(engine.store().count().unwrap(), 1);
    }

    #[test]
    fn test_train_empty_corpus_fails_and_keeps_state() {
        let engine = engine();
        let err = engine.train_model().unwrap_err();
        assert!(err.is_training());
        assert!(!engine.is_trained());
        assert_eq!(engine.retrain_count(), 0);
    }

    #[test]
    fn test_retrain_if_idle_swallows_failure() {
        let engine = engine();
        assert!(engine.retrain_if_idle(RetrainTrigger::Scheduled).is_none());
        assert!(!engine.is_trained());
    }

    #[test]
    fn test_retrain_if_idle_skips_when_busy() {
        let engine = engine();
        engine.initialize().unwrap();

        let _held = engine.inner.retrain_guard.lock();
        assert_eq!(engine.status(), EngineStatus::Retraining);
        assert!(engine.retrain_if_idle(RetrainTrigger::Scheduled).is_none());
        assert_eq!(engine.retrain_count(), 1);
    }

    #[test]
    fn test_versions_increase() {
        let engine = engine();
        engine.initialize().unwrap();
        let report = engine.train_model().unwrap();
        assert_eq!(report.version, 2);
        assert_eq!(engine.model_version(), Some(2));
    }

    #[test]
    fn test_add_rejects_blank_text() {
        let engine = engine();
        let err = engine
            .add_training_example("  ", None, Priority::Low)
            .unwrap_err();
        assert!(matches!(err, UrgencyError::Validation(_)));
        assert_eq!(engine.store().count().unwrap(), 0);
    }

    #[test]
    fn test_bulk_add_rejects_whole_batch() {
        let engine = engine();
        let good = TrainingExample::new("panne ascenseur", None, Priority::Medium, 5).unwrap();
        let mut blank = good.clone();
        blank.text = " ".to_string();

        assert!(engine.add_training_examples(vec![good, blank]).is_err());
        assert_eq!(engine.store().count().unwrap(), 0);
    }

    #[test]
    fn test_bulk_add_triggers_single_retrain() {
        let engine = engine();
        let examples = crate::corpus::seed::bootstrap_examples(5).unwrap();
        let outcome = engine.add_training_examples(examples).unwrap();
        engine.join_background();

        assert_eq!(outcome.corpus_size, 32);
        assert!(outcome.retrain_triggered);
        assert_eq!(engine.retrain_count(), 1);
        assert!(engine.is_trained());
    }

    #[test]
    fn test_statistics() {
        let engine = engine();
        let stats = engine.model_statistics().unwrap();
        assert!(!stats.trained);
        assert_eq!(stats.example_count, 0);

        engine.initialize().unwrap();
        let stats = engine.model_statistics().unwrap();
        assert!(stats.trained);
        assert_eq!(stats.example_count, 32);
        assert_eq!(stats.model_version, Some(1));
        assert_eq!(stats.classifier.as_deref(), Some("linear_svm"));
    }
}
