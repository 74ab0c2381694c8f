//! Bilingual (French + English) stop word filtering.
//!
//! The default list is applied after normalization, so entries are stored
//! lowercase and without accents (`etre`, not `être`).

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::{Token, TokenStream};

/// Default French stop words, already normalized.
const FRENCH_STOP_WORDS: &[&str] = &[
    "les", "des", "une", "est", "sont", "dans", "pour", "par", "sur", "avec", "sans", "pas",
    "plus", "que", "qui", "quoi", "dont", "mais", "donc", "car", "nous", "vous", "ils", "elle",
    "elles", "leur", "leurs", "notre", "nos", "votre", "vos", "mon", "mes", "ton", "tes", "son",
    "ses", "cet", "cette", "ces", "aux", "avoir", "etre", "tres", "tout", "tous", "toute",
    "depuis", "comme", "aussi", "encore", "ete", "fait", "faire", "entre", "chez",
];

/// Default English stop words, already normalized.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "with", "this", "that", "from", "they",
    "have", "has", "had", "was", "were", "been", "our", "your", "their", "there", "which",
    "what", "when", "where", "who", "will", "would", "can", "could", "into", "than", "then",
    "very", "also", "its", "all", "any", "some",
];

static DEFAULT_STOP_WORDS: LazyLock<Arc<HashSet<String>>> = LazyLock::new(|| {
    Arc::new(
        FRENCH_STOP_WORDS
            .iter()
            .chain(ENGLISH_STOP_WORDS.iter())
            .map(|word| word.to_string())
            .collect(),
    )
});

/// The shared default bilingual stop word set.
pub fn default_stop_words() -> Arc<HashSet<String>> {
    Arc::clone(&DEFAULT_STOP_WORDS)
}

/// Removes stop words and tokens that are too short to carry meaning.
#[derive(Clone, Debug)]
pub struct StopFilter {
    stop_words: Arc<HashSet<String>>,
    min_length: usize,
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl StopFilter {
    /// Tokens of this many characters or fewer are always dropped.
    pub const DEFAULT_MAX_DROPPED_LENGTH: usize = 2;

    /// Filter with the default bilingual list.
    pub fn new() -> Self {
        Self::with_stop_words(default_stop_words())
    }

    /// Filter with a caller-supplied list. Entries must already be normalized.
    pub fn with_stop_words(stop_words: Arc<HashSet<String>>) -> Self {
        StopFilter {
            stop_words,
            min_length: Self::DEFAULT_MAX_DROPPED_LENGTH + 1,
        }
    }

    /// Whether `word` is in the stop list.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Whether `word` survives the filter.
    pub fn keeps(&self, word: &str) -> bool {
        word.chars().count() >= self.min_length && !self.is_stop_word(word)
    }

    /// Number of stop words in the list.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Whether the stop list is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }

    /// Filter a token stream.
    pub fn filter(&self, tokens: TokenStream) -> TokenStream {
        let filter = self.clone();
        Box::new(tokens.filter(move |token: &Token| filter.keeps(&token.text)))
    }
}
