//! Engine configuration.
//!
//! Every struct deserializes from JSON with all fields optional; missing
//! fields take their defaults.
//!
//! ```
//! use urgency::config::EngineConfig;
//!
//! let config: EngineConfig = serde_json::from_str(r#"{"retrain_threshold": 25}"#).unwrap();
//! assert_eq!(config.retrain_threshold, 25);
//! assert_eq!(config.max_features, 1500);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classification::classifier::ClassifierKind;
use crate::error::{Result, UrgencyError};

/// Top-level configuration for [`PriorityEngine`](crate::engine::PriorityEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum vocabulary size.
    pub max_features: usize,
    /// Retrain in the background whenever the corpus size is a multiple of this.
    pub retrain_threshold: usize,
    /// Keywords derived for each stored example.
    pub keyword_count: usize,
    /// Scale feature vectors to unit length.
    pub l2_normalize: bool,
    /// Defer to the keyword scorer when the input shares no term with the
    /// vocabulary.
    pub fallback_on_unknown_vocabulary: bool,
    /// Classifier settings.
    pub classifier: ClassifierConfig,
    /// Background scheduler settings.
    pub scheduler: SchedulerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_features: 1500,
            retrain_threshold: 10,
            keyword_count: 5,
            l2_normalize: true,
            fallback_on_unknown_vocabulary: true,
            classifier: ClassifierConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(UrgencyError::config("max_features must be positive"));
        }
        if self.retrain_threshold == 0 {
            return Err(UrgencyError::config("retrain_threshold must be positive"));
        }
        self.classifier.validate()?;
        self.scheduler.validate()
    }
}

/// Classifier hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Which implementation to train.
    pub kind: ClassifierKind,
    /// SGD passes over the training set (linear SVM).
    pub epochs: usize,
    /// Regularization strength (linear SVM).
    pub lambda: f64,
    /// Shuffle seed (linear SVM).
    pub seed: u64,
    /// Additive smoothing (naive Bayes).
    pub smoothing: f64,
    /// Upper bound on fit time, checked between epochs.
    pub max_fit_millis: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            kind: ClassifierKind::LinearSvm,
            epochs: 50,
            lambda: 0.01,
            seed: 42,
            smoothing: 1.0,
            max_fit_millis: 30_000,
        }
    }
}

impl ClassifierConfig {
    /// Fit-time bound as a duration.
    pub fn max_fit_duration(&self) -> Duration {
        Duration::from_millis(self.max_fit_millis)
    }

    fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(UrgencyError::config("classifier.epochs must be positive"));
        }
        if !(self.lambda > 0.0) {
            return Err(UrgencyError::config("classifier.lambda must be positive"));
        }
        if !(self.smoothing > 0.0) {
            return Err(UrgencyError::config("classifier.smoothing must be positive"));
        }
        if self.max_fit_millis == 0 {
            return Err(UrgencyError::config("classifier.max_fit_millis must be positive"));
        }
        Ok(())
    }
}

/// Periodic background work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between scheduled retrains.
    pub retrain_interval_secs: u64,
    /// Seconds between statistics log lines; `None` disables them.
    pub statistics_interval_secs: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            retrain_interval_secs: 24 * 60 * 60,
            statistics_interval_secs: None,
        }
    }
}

impl SchedulerConfig {
    /// Interval between scheduled retrains.
    pub fn retrain_interval(&self) -> Duration {
        Duration::from_secs(self.retrain_interval_secs)
    }

    /// Interval between statistics log lines.
    pub fn statistics_interval(&self) -> Option<Duration> {
        self.statistics_interval_secs.map(Duration::from_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.retrain_interval_secs == 0 {
            return Err(UrgencyError::config(
                "scheduler.retrain_interval_secs must be positive",
            ));
        }
        if self.statistics_interval_secs == Some(0) {
            return Err(UrgencyError::config(
                "scheduler.statistics_interval_secs must be positive",
            ));
        }
        Ok(())
    }
}
