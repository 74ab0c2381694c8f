//! Text normalization shared by every component that looks at complaint text.
//!
//! Normalization lowercases, strips diacritics (NFD decomposition followed by
//! removal of combining marks), replaces everything outside `[a-z0-9]` and
//! whitespace with a space, and finally collapses runs of whitespace.
//!
//! # Examples
//!
//! ```
//! use urgency::analysis::normalizer::normalize;
//!
//! assert_eq!(normalize("  Fuite d'EAU — rue Émile-Zola!  "), "fuite d eau rue emile zola");
//! assert_eq!(normalize(""), "");
//! ```

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalize free text into a lowercase, accent-free, single-spaced string.
pub fn normalize(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());

    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        for lower in c.to_lowercase() {
            if lower.is_ascii_lowercase() || lower.is_ascii_digit() {
                cleaned.push(lower);
            } else {
                cleaned.push(' ');
            }
        }
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
