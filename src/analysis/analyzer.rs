//! Analyzers turn raw complaint text into the token stream every downstream
//! component (vectorizer, keyword extractor) works on.
//!
//! ```text
//! Raw Text → normalize → split on whitespace → StopFilter → Tokens
//! ```
//!
//! # Examples
//!
//! ```
//! use urgency::analysis::analyzer::{Analyzer, ComplaintAnalyzer};
//!
//! let analyzer = ComplaintAnalyzer::new();
//! let tokens: Vec<_> = analyzer.analyze("Fuite de gaz dans la cave").unwrap().collect();
//!
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[0].text, "fuite");
//! assert_eq!(tokens[1].text, "gaz");
//! assert_eq!(tokens[2].text, "cave");
//! ```

use std::sync::{Arc, LazyLock};

use crate::analysis::normalizer::normalize;
use crate::analysis::stop::StopFilter;
use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// The trait requires `Send + Sync` so an analyzer can be shared between the
/// request threads and the background retrain.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and logging).
    fn name(&self) -> &'static str;
}

/// Normalizing, whitespace-splitting, bilingual stop-word-removing analyzer.
#[derive(Clone, Debug, Default)]
pub struct ComplaintAnalyzer {
    stop_filter: StopFilter,
}

impl ComplaintAnalyzer {
    /// Create an analyzer with the default French/English stop words.
    pub fn new() -> Self {
        ComplaintAnalyzer {
            stop_filter: StopFilter::new(),
        }
    }

    /// Infallible variant of [`Analyzer::analyze`] returning plain strings.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        normalize(text)
            .split(' ')
            .filter(|word| self.stop_filter.keeps(word))
            .map(str::to_string)
            .collect()
    }
}

impl Analyzer for ComplaintAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let words: Vec<Token> = normalize(text)
            .split(' ')
            .filter(|word| !word.is_empty())
            .enumerate()
            .map(|(position, word)| Token::new(word, position))
            .collect();

        Ok(self.stop_filter.filter(Box::new(words.into_iter())))
    }

    fn name(&self) -> &'static str {
        "complaint"
    }
}

static DEFAULT_ANALYZER: LazyLock<Arc<ComplaintAnalyzer>> =
    LazyLock::new(|| Arc::new(ComplaintAnalyzer::new()));

/// The process-wide default analyzer.
pub fn default_analyzer() -> Arc<ComplaintAnalyzer> {
    Arc::clone(&DEFAULT_ANALYZER)
}

/// Tokenize with the default analyzer.
///
/// ```
/// use urgency::analysis::tokenize;
///
/// assert_eq!(tokenize("The street light is broken"), vec!["street", "light", "broken"]);
/// assert!(tokenize("").is_empty());
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    DEFAULT_ANALYZER.tokens(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_drops_short_and_stop_words() {
        let analyzer = ComplaintAnalyzer::new();
        let tokens: Vec<Token> = analyzer
            .analyze("Il y a une fuite d'eau sous le pont")
            .unwrap()
            .collect();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["fuite", "eau", "sous", "pont"]);
        assert_eq!(tokens[0].position, 4);
    }

    #[test]
    fn test_tokens_matches_analyze() {
        let analyzer = ComplaintAnalyzer::new();
        let text = "Éclairage public en panne depuis trois semaines";
        let streamed: Vec<String> = analyzer.analyze(text).unwrap().map(|t| t.text).collect();
        assert_eq!(analyzer.tokens(text), streamed);
        assert_eq!(streamed, vec!["eclairage", "public", "panne", "trois", "semaines"]);
    }

    #[test]
    fn test_empty_input() {
        let analyzer = ComplaintAnalyzer::new();
        assert!(analyzer.tokens("").is_empty());
        assert_eq!(analyzer.analyze("  ,; ").unwrap().count(), 0);
    }

    #[test]
    fn test_deterministic() {
        let text = "Danger: arbre tombé sur la route";
        assert_eq!(tokenize(text), tokenize(text));
        assert_eq!(tokenize(text), vec!["danger", "arbre", "tombe", "route"]);
    }

    #[test]
    fn test_name() {
        assert_eq!(ComplaintAnalyzer::new().name(), "complaint");
    }
}
