//! TF-IDF vectorizer for complaint text.
//!
//! Fitting and transforming are separate operations: [`TfIdfVectorizer::fit`]
//! returns a new, immutable vectorizer, and [`TfIdfVectorizer::transform`]
//! only ever reads it. A fitted vectorizer is never refit in place.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;

use crate::analysis::analyzer::Analyzer;
use crate::error::{Result, UrgencyError};

/// Bounded, ordered set of terms with their document frequencies.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    /// Terms in feature-index order.
    terms: Vec<String>,
    /// term -> feature index
    index: AHashMap<String, usize>,
    /// Number of fitted documents containing each term.
    document_frequency: Vec<usize>,
}

impl Vocabulary {
    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether no term was selected.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Feature index of `term`.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Document frequency of the term at `idx`.
    pub fn document_frequency(&self, idx: usize) -> Option<usize> {
        self.document_frequency.get(idx).copied()
    }

    /// Terms in feature-index order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Sparse TF-IDF representation of one document against one vocabulary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    dimension: usize,
    /// (feature index, weight), sorted by index, zero weights omitted
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Build from possibly unsorted entries; zero weights are dropped.
    pub fn new(dimension: usize, mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|(_, w)| *w != 0.0);
        entries.sort_by_key(|(idx, _)| *idx);
        FeatureVector { dimension, entries }
    }

    /// Dimension of the vocabulary this vector was built against.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Non-zero entries sorted by feature index.
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// True when no vocabulary term occurs in the document.
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product with a dense weight vector; indices past `weights` count as zero.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|(idx, w)| weights.get(*idx).map(|v| v * w))
            .sum()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    fn l2_normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }
}

/// Fitted TF-IDF vectorizer.
pub struct TfIdfVectorizer {
    vocabulary: Vocabulary,
    /// idf per feature index: ln(N / df)
    idf: Vec<f64>,
    /// Total number of documents seen during fitting.
    n_documents: usize,
    /// Scale every output vector to unit length.
    l2_normalize: bool,
    /// Analyzer for tokenization.
    analyzer: Arc<dyn Analyzer>,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("l2_normalize", &self.l2_normalize)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Fit a vocabulary of at most `max_features` terms on `documents`.
    ///
    /// Terms are ranked by total frequency across the corpus (ties broken
    /// alphabetically). Fails on an empty corpus or when no document yields a
    /// single token.
    pub fn fit(
        analyzer: Arc<dyn Analyzer>,
        documents: &[String],
        max_features: usize,
        l2_normalize: bool,
    ) -> Result<Self> {
        if documents.is_empty() {
            return Err(UrgencyError::training("cannot fit vectorizer on an empty corpus"));
        }
        if max_features == 0 {
            return Err(UrgencyError::training("max_features must be positive"));
        }

        let mut term_frequency: AHashMap<String, usize> = AHashMap::new();
        let mut document_frequency: AHashMap<String, usize> = AHashMap::new();

        for doc in documents {
            let tokens = Self::tokenize_with_analyzer(doc, &analyzer)?;
            let mut seen: AHashSet<&str> = AHashSet::new();
            for token in &tokens {
                *term_frequency.entry(token.clone()).or_insert(0) += 1;
                if seen.insert(token.as_str()) {
                    *document_frequency.entry(token.clone()).or_insert(0) += 1;
                }
            }
        }

        if term_frequency.is_empty() {
            return Err(UrgencyError::training("corpus contains no usable terms"));
        }

        let mut ranked: Vec<(String, usize)> = term_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        let n_documents = documents.len();
        let mut vocabulary = Vocabulary::default();
        let mut idf = Vec::with_capacity(ranked.len());

        for (idx, (term, _)) in ranked.into_iter().enumerate() {
            let df = document_frequency.get(&term).copied().unwrap_or(0).max(1);
            idf.push((n_documents as f64 / df as f64).ln());
            vocabulary.index.insert(term.clone(), idx);
            vocabulary.document_frequency.push(df);
            vocabulary.terms.push(term);
        }

        Ok(TfIdfVectorizer {
            vocabulary,
            idf,
            n_documents,
            l2_normalize,
            analyzer,
        })
    }

    /// Transform a document into a TF-IDF feature vector.
    ///
    /// Terms outside the vocabulary contribute nothing.
    pub fn transform(&self, document: &str) -> Result<FeatureVector> {
        let tokens = Self::tokenize_with_analyzer(document, &self.analyzer)?;

        let mut tf: AHashMap<usize, f64> = AHashMap::new();
        for token in &tokens {
            if let Some(idx) = self.vocabulary.index_of(token) {
                *tf.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let entries = tf
            .into_iter()
            .map(|(idx, count)| (idx, count * self.idf[idx]))
            .collect();
        let vector = FeatureVector::new(self.vocabulary.len(), entries);

        Ok(if self.l2_normalize {
            vector.l2_normalized()
        } else {
            vector
        })
    }

    /// Transform many documents in parallel, preserving order.
    pub fn transform_all(&self, documents: &[String]) -> Result<Vec<FeatureVector>> {
        documents.par_iter().map(|doc| self.transform(doc)).collect()
    }

    fn tokenize_with_analyzer(text: &str, analyzer: &Arc<dyn Analyzer>) -> Result<Vec<String>> {
        let tokens: Vec<String> = analyzer.analyze(text)?.map(|token| token.text).collect();
        Ok(tokens)
    }

    /// The fitted vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Inverse document frequency of the term at `idx`.
    pub fn idf(&self, idx: usize) -> Option<f64> {
        self.idf.get(idx).copied()
    }

    /// Number of documents the vectorizer was fitted on.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }
}
