//! Text analysis for complaint text.
//!
//! Normalization, bilingual tokenization, language detection and keyword
//! extraction. Everything here is pure and deterministic.

pub mod analyzer;
pub mod keywords;
pub mod language;
pub mod normalizer;
pub mod stop;
pub mod token;

pub use analyzer::{Analyzer, ComplaintAnalyzer, default_analyzer, tokenize};
pub use keywords::extract_keywords;
pub use language::{Language, detect_language};
pub use normalizer::normalize;
