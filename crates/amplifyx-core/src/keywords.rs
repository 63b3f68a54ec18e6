//! Keyword frequency analysis over visible page text

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::types::KeywordCount;

/// Number of entries returned by `/keyword-density`
pub const TOP_KEYWORDS: usize = 30;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("invalid word regex"));
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));

/// Lower-cased word tokens of `text`, in order of appearance
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = WHITESPACE.replace_all(text, " ").to_lowercase();
    WORD.find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Count every word and return them sorted by count, most frequent first.
///
/// Words with equal counts keep the order in which they first appeared.
pub fn word_frequencies(text: &str) -> Vec<KeywordCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for word in tokenize(text) {
        let count = counts.entry(word.clone()).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    let mut frequencies: Vec<KeywordCount> = order
        .into_iter()
        .map(|word| {
            let count = counts[&word];
            KeywordCount { word, count }
        })
        .collect();

    // sort_by is stable, which preserves first-occurrence order on ties
    frequencies.sort_by(|a, b| b.count.cmp(&a.count));
    frequencies
}

/// The [`TOP_KEYWORDS`] most frequent words of `text`
pub fn keyword_density(text: &str) -> Vec<KeywordCount> {
    let mut frequencies = word_frequencies(text);
    frequencies.truncate(TOP_KEYWORDS);
    frequencies
}

/// Share of `word` among all tokens, as a percentage
pub fn density_percent(word: &str, frequencies: &[KeywordCount]) -> f64 {
    let total: usize = frequencies.iter().map(|k| k.count).sum();
    if total == 0 {
        return 0.0;
    }

    frequencies
        .iter()
        .find(|k| k.word == word)
        .map(|k| k.count as f64 * 100.0 / total as f64)
        .unwrap_or(0.0)
}
