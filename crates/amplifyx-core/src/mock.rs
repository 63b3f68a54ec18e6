//! Deterministic keyword analytics derived from a text seed.
//!
//! There is no analytics provider behind this: the same content always maps
//! to the same five keywords drawn from a fixed catalog.

use serde::{Deserialize, Serialize};

pub const ANALYTICS_KEYWORDS: usize = 5;
const HIGH_PERFORMERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performance {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordAnalytic {
    pub keyword: String,
    pub performance: Performance,
    pub volume: String,
    pub difficulty: String,
    pub cpc: String,
}

struct CatalogEntry {
    keyword: &'static str,
    volume: &'static str,
    difficulty: &'static str,
    cpc: &'static str,
}

const fn entry(
    keyword: &'static str,
    volume: &'static str,
    difficulty: &'static str,
    cpc: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        keyword,
        volume,
        difficulty,
        cpc,
    }
}

const CATALOG: [CatalogEntry; 10] = [
    entry("digital marketing", "12.5K", "medium", "$3.40"),
    entry("content strategy", "8.2K", "low", "$2.80"),
    entry("social media", "45.1K", "high", "$4.20"),
    entry("brand awareness", "6.7K", "medium", "$3.10"),
    entry("engagement rate", "3.4K", "low", "$2.60"),
    entry("SEO optimization", "18.3K", "medium", "$4.80"),
    entry("content marketing", "22.1K", "medium", "$3.90"),
    entry("online presence", "7.8K", "low", "$2.40"),
    entry("target audience", "9.2K", "medium", "$3.20"),
    entry("conversion rate", "15.6K", "high", "$5.20"),
];

/// Rolling `h * 31 + unit` hash over UTF-16 code units, wrapping at i32
pub fn text_seed(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

/// SplitMix64 generator
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(text_seed(text) as u32 as u64)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `[0, 1)` built from the top 53 bits
    pub fn next_unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform index in `0..bound`
    pub fn next_index(&mut self, bound: usize) -> usize {
        ((self.next_unit() * bound as f64) as usize).min(bound.saturating_sub(1))
    }
}

/// Five distinct catalog keywords for `content`; the first two rank high
pub fn keyword_analytics(content: &str) -> Vec<KeywordAnalytic> {
    let mut rng = SeededRng::from_text(content);
    let mut order: Vec<usize> = (0..CATALOG.len()).collect();

    // partial Fisher-Yates: only the first ANALYTICS_KEYWORDS slots are drawn
    for slot in 0..ANALYTICS_KEYWORDS {
        let pick = slot + rng.next_index(order.len() - slot);
        order.swap(slot, pick);
    }

    order
        .into_iter()
        .take(ANALYTICS_KEYWORDS)
        .enumerate()
        .map(|(rank, index)| {
            let entry = &CATALOG[index];
            KeywordAnalytic {
                keyword: entry.keyword.to_string(),
                performance: if rank < HIGH_PERFORMERS {
                    Performance::High
                } else {
                    Performance::Medium
                },
                volume: entry.volume.to_string(),
                difficulty: entry.difficulty.to_string(),
                cpc: entry.cpc.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_text_seed_matches_rolling_hash() {
        assert_eq!(text_seed(""), 0);
        assert_eq!(text_seed("a"), 97);
        assert_eq!(text_seed("ab"), 97 * 31 + 98);
        // long inputs wrap instead of overflowing
        let _ = text_seed(&"z".repeat(10_000));
    }

    #[test]
    fn test_text_seed_uses_utf16_units() {
        // U+1F600 is a surrogate pair: 0xD83D, 0xDE00
        let expected = 0xD83Di32.wrapping_mul(31).wrapping_add(0xDE00);
        assert_eq!(text_seed("\u{1F600}"), expected);
    }

    #[test]
    fn test_rng_is_deterministic() {
        let mut a = SeededRng::from_text("same content");
        let mut b = SeededRng::from_text("same content");
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_unit_range() {
        let mut rng = SeededRng::new(42);
        for _ in 0..1_000 {
            let value = rng.next_unit();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_keyword_analytics_shape() {
        let keywords = keyword_analytics("Write a post about growing an audience");
        assert_eq!(keywords.len(), ANALYTICS_KEYWORDS);

        let distinct: HashSet<_> = keywords.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(distinct.len(), ANALYTICS_KEYWORDS);

        assert!(keywords[..2].iter().all(|k| k.performance == Performance::High));
        assert!(keywords[2..].iter().all(|k| k.performance == Performance::Medium));
    }

    #[test]
    fn test_keyword_analytics_is_stable() {
        let content = "Launching our new product line next week";
        assert_eq!(keyword_analytics(content), keyword_analytics(content));
    }

    #[test]
    fn test_different_content_varies_selection() {
        let selections: HashSet<Vec<String>> = (0..20)
            .map(|i| {
                keyword_analytics(&format!("draft number {}", i))
                    .into_iter()
                    .map(|k| k.keyword)
                    .collect()
            })
            .collect();
        assert!(selections.len() > 1);
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(&keyword_analytics("x")[0]).unwrap();
        assert_eq!(value["performance"], "high");
        for field in ["keyword", "volume", "difficulty", "cpc"] {
            assert!(value[field].is_string());
        }
    }
}
