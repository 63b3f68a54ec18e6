//! Search engine result scraping for rank and backlink checks

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

pub const DEFAULT_WEB_SEARCH: &str = "https://www.google.com/search";
pub const DEFAULT_BACKLINK_SEARCH: &str = "https://www.bing.com/search";

static ANCHORS: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));
static RESULT_LINKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li.b_algo h2 a").expect("valid selector"));

/// Base URLs of the search pages that rank and backlink checks scrape
#[derive(Debug, Clone)]
pub struct SearchEndpoints {
    pub web_search: String,
    pub backlink_search: String,
}

impl Default for SearchEndpoints {
    fn default() -> Self {
        Self {
            web_search: DEFAULT_WEB_SEARCH.to_string(),
            backlink_search: DEFAULT_BACKLINK_SEARCH.to_string(),
        }
    }
}

impl SearchEndpoints {
    /// Search URL for a plain keyword query
    pub fn rank_query_url(&self, query: &str) -> Result<String> {
        with_query(&self.web_search, query)
    }

    /// Search URL listing pages that link from `url`'s domain
    pub fn backlink_query_url(&self, url: &str) -> Result<String> {
        with_query(&self.backlink_search, &format!("linkfromdomain:{}", url))
    }
}

fn with_query(base: &str, q: &str) -> Result<String> {
    let url = Url::parse_with_params(base, &[("q", q)])
        .with_context(|| format!("invalid search endpoint: {}", base))?;
    Ok(url.into())
}

/// 1-based position of the first anchor whose `href` contains `domain`.
///
/// Every `<a>` on the page counts toward the position, not only organic
/// results. Returns `-1` when no anchor matches.
pub fn rank_position(html: &str, domain: &str) -> i64 {
    let document = Html::parse_document(html);

    document
        .select(&ANCHORS)
        .position(|anchor| {
            anchor
                .value()
                .attr("href")
                .unwrap_or_default()
                .contains(domain)
        })
        .map(|index| index as i64 + 1)
        .unwrap_or(-1)
}

/// Result links (`li.b_algo h2 a`) of a backlink search page, in page order
pub fn extract_backlinks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT_LINKS)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
        .collect()
}
