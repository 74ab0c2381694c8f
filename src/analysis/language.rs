//! Dominant-language detection for corpus statistics.
//!
//! Detection counts French and English marker words in the normalized text.
//! Markers are function words, so they are counted before stop word removal.
//! The result never influences classification.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::normalize;

const FRENCH_MARKERS: &[&str] = &[
    "le", "la", "les", "des", "une", "est", "dans", "pour", "avec", "sur", "pas", "sont", "nous",
    "vous", "depuis", "tres", "mais", "aux", "du", "et",
];

const ENGLISH_MARKERS: &[&str] = &[
    "the", "is", "are", "and", "with", "for", "this", "that", "from", "have", "has", "not",
    "been", "there", "was", "were", "our", "near", "since", "very",
];

static FRENCH: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| FRENCH_MARKERS.iter().copied().collect());
static ENGLISH: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_MARKERS.iter().copied().collect());

/// Supported complaint languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// French.
    Fr,
    /// English.
    En,
}

impl Language {
    /// ISO 639-1 code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the dominant language: French when French markers strictly
/// outnumber English ones, English otherwise (including ties and empty text).
pub fn detect_language(text: &str) -> Language {
    let normalized = normalize(text);
    let (mut french, mut english) = (0usize, 0usize);

    for word in normalized.split(' ') {
        if FRENCH.contains(word) {
            french += 1;
        }
        if ENGLISH.contains(word) {
            english += 1;
        }
    }

    if french > english {
        Language::Fr
    } else {
        Language::En
    }
}
