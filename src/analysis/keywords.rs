//! Frequency-based keyword extraction used to annotate training examples.

use ahash::AHashMap;

use crate::analysis::analyzer::ComplaintAnalyzer;

/// Return the `k` most frequent distinct tokens of `text`.
///
/// Ties are broken by first occurrence, so the output is stable for a given
/// input.
///
/// ```
/// use urgency::analysis::keywords::extract_keywords;
///
/// let keywords = extract_keywords("fuite fuite cave eau cave fuite", 2);
/// assert_eq!(keywords, vec!["fuite", "cave"]);
/// ```
pub fn extract_keywords(text: &str, k: usize) -> Vec<String> {
    extract_keywords_with(&ComplaintAnalyzer::new(), text, k)
}

/// Same as [`extract_keywords`] with an explicit analyzer.
pub fn extract_keywords_with(analyzer: &ComplaintAnalyzer, text: &str, k: usize) -> Vec<String> {
    if k == 0 {
        return Vec::new();
    }

    // token -> (count, first position)
    let mut counts: AHashMap<String, (usize, usize)> = AHashMap::new();
    for (position, token) in analyzer.tokens(text).into_iter().enumerate() {
        counts.entry(token).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(token, (count, first))| (token, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked.into_iter().take(k).map(|(token, _, _)| token).collect()
}
