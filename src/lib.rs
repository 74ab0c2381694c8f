//! # Urgency
//!
//! Urgency tier classification for citizen complaints.
//!
//! ## Features
//!
//! - French/English text normalization, tokenization and keyword extraction
//! - Deterministic keyword-scoring fallback
//! - TF-IDF bag-of-words features with a pluggable classifier
//! - Lock-protected model publication with background and scheduled retraining
//! - In-memory and JSON-lines training corpus stores

pub mod analysis;
pub mod classification;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod scheduler;

pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::corpus::{
        CorpusStore, JsonlCorpusStore, MemoryCorpusStore, Priority, TrainingExample,
    };
    pub use crate::engine::{Prediction, PredictionSource, PriorityEngine};
    pub use crate::error::{Result, UrgencyError};
    pub use crate::scheduler::RetrainScheduler;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
