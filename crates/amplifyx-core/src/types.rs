//! Response shapes shared by the extraction functions and the HTTP layer

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Basic on-page fields returned by `/analyze-page`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub title: String,
    pub meta_desc: String,
    pub h1: String,
    pub word_count: usize,
}

/// A single word and how often it appears in the page body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordDensity {
    pub keywords: Vec<KeywordCount>,
}

/// Description plus Open Graph and Twitter card tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTags {
    pub description: String,
    pub og_title: String,
    pub og_desc: String,
    pub twitter_title: String,
    pub twitter_desc: String,
}

impl MetaTags {
    /// True when at least one Open Graph or Twitter card tag is present
    pub fn has_social_tags(&self) -> bool {
        [
            &self.og_title,
            &self.og_desc,
            &self.twitter_title,
            &self.twitter_desc,
        ]
        .iter()
        .any(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotsFile {
    pub robots: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapFile {
    pub sitemap: String,
}

/// Position of a domain in a search result page, `-1` when absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankPosition {
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backlinks {
    pub backlinks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechStack {
    pub stack: Vec<String>,
}

/// Performance audit result returned by `/pagespeed`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpeedReport {
    /// Final URL after redirects
    pub url: String,

    /// Performance category score in `[0, 1]`, `None` when the audit could not score
    pub performance_score: Option<f64>,

    pub fetch_time: String,

    /// Raw audit map as produced by lighthouse
    pub audits: JsonValue,

    pub lighthouse_version: String,
}
