//! Priority classification: the keyword fallback, TF-IDF features and the
//! trainable classifiers.
//!
//! # Architecture
//!
//! - `KeywordScorer`: deterministic weighted-keyword fallback
//! - `TfIdfVectorizer`: bounded vocabulary and TF-IDF feature extraction
//! - `Classifier` trait: `train` / `predict` interface used by the engine
//! - `LinearSvm`: one-vs-one linear SVM (default)
//! - `NaiveBayes`: multinomial naive Bayes

pub mod classifier;
pub mod keyword_scorer;
pub mod linear_svm;
pub mod naive_bayes;
pub mod tfidf;

pub use classifier::{Classifier, ClassifierFactory, ClassifierKind};
pub use keyword_scorer::{KeywordScorer, KeywordTier, TierScores, score_text};
pub use linear_svm::LinearSvm;
pub use naive_bayes::NaiveBayes;
pub use tfidf::{FeatureVector, TfIdfVectorizer, Vocabulary};
