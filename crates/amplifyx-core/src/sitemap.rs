//! XML sitemap parsing and validation

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// Protocol limit on URLs per sitemap file
pub const MAX_URLS_PER_SITEMAP: usize = 50_000;

static INDEX_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<sitemap>.*?<loc>(.*?)</loc>.*?</sitemap>").expect("invalid sitemap regex")
});
static URL_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<url>(.*?)</url>").expect("invalid url regex"));
static LOC: Lazy<Regex> = Lazy::new(|| child_tag("loc"));
static LASTMOD: Lazy<Regex> = Lazy::new(|| child_tag("lastmod"));
static CHANGEFREQ: Lazy<Regex> = Lazy::new(|| child_tag("changefreq"));
static PRIORITY: Lazy<Regex> = Lazy::new(|| child_tag("priority"));

fn child_tag(tag: &str) -> Regex {
    Regex::new(&format!(r"(?s)<{tag}>(.*?)</{tag}>")).expect("invalid child tag regex")
}

/// Analysis results for XML sitemap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapAnalysis {
    pub sitemap_type: SitemapType,
    pub url_entries: Vec<SitemapUrl>,
    pub nested_sitemaps: Vec<String>,
    pub statistics: SitemapStatistics,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SitemapType {
    Standard, // <urlset>
    Index,    // <sitemapindex>
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapUrl {
    pub loc: String,
    pub lastmod: Option<String>,
    pub changefreq: Option<String>,
    pub priority: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitemapStatistics {
    pub total_urls: usize,
    pub urls_with_lastmod: usize,
    pub urls_with_priority: usize,
    pub avg_priority: f32,
    /// URL counts per coarse content type ("product", "blog", ...)
    pub content_types: HashMap<String, usize>,
}

impl SitemapAnalysis {
    /// Number of listed URLs, or nested sitemaps for an index
    pub fn entry_count(&self) -> usize {
        match self.sitemap_type {
            SitemapType::Index => self.nested_sitemaps.len(),
            _ => self.url_entries.len(),
        }
    }

    pub fn count_of(&self, content_type: &str) -> usize {
        self.statistics
            .content_types
            .get(content_type)
            .copied()
            .unwrap_or(0)
    }
}

/// Parse XML sitemap content.
///
/// Every `<loc>` is expected on the same host as `base_origin`. Scheme and a
/// leading `www.` are ignored, so a site that moved to https or redirects to
/// its `www` host is not flagged.
pub fn parse_sitemap(content: &str, base_origin: &str) -> SitemapAnalysis {
    let mut analysis = SitemapAnalysis {
        sitemap_type: SitemapType::Unknown,
        url_entries: Vec::new(),
        nested_sitemaps: Vec::new(),
        statistics: SitemapStatistics::default(),
        issues: Vec::new(),
    };

    if content.contains("<sitemapindex") {
        analysis.sitemap_type = SitemapType::Index;
        parse_sitemap_index(content, &mut analysis);
    } else if content.contains("<urlset") {
        analysis.sitemap_type = SitemapType::Standard;
        parse_urlset(content, base_origin, &mut analysis);
    } else {
        analysis
            .issues
            .push("Invalid sitemap format - missing <urlset> or <sitemapindex>".to_string());
        return analysis;
    }

    if analysis.entry_count() == 0 {
        analysis.issues.push("Sitemap contains no URLs".to_string());
    }

    if analysis.sitemap_type == SitemapType::Standard
        && analysis.url_entries.len() > MAX_URLS_PER_SITEMAP
    {
        analysis.issues.push(format!(
            "Sitemap exceeds 50,000 URL limit ({} URLs) - consider using sitemap index",
            analysis.url_entries.len()
        ));
    }

    analysis
}

fn parse_sitemap_index(content: &str, analysis: &mut SitemapAnalysis) {
    analysis.nested_sitemaps = INDEX_ENTRY
        .captures_iter(content)
        .filter_map(|cap| cap.get(1))
        .map(|loc| decode_xml_entities(loc.as_str().trim()))
        .collect();
}

/// Lowercased host without a leading `www.`
fn site_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

fn parse_urlset(content: &str, base_origin: &str, analysis: &mut SitemapAnalysis) {
    let mut priority_sum: f32 = 0.0;
    let base_host = site_host(base_origin);

    for cap in URL_ENTRY.captures_iter(content) {
        let body = cap.get(1).map(|m| m.as_str()).unwrap_or_default();

        let loc = tag_text(body, &LOC)
            .map(|value| decode_xml_entities(&value))
            .unwrap_or_default();
        if loc.is_empty() {
            analysis.issues.push("URL entry without <loc>".to_string());
            continue;
        }

        let lastmod = tag_text(body, &LASTMOD);
        let changefreq = tag_text(body, &CHANGEFREQ);
        let priority = tag_text(body, &PRIORITY).and_then(|p| p.parse::<f32>().ok());

        if let Some(base_host) = &base_host
            && site_host(&loc).as_ref() != Some(base_host)
        {
            analysis.issues.push(format!("URL on wrong domain: {}", loc));
        }

        if let Some(p) = priority {
            if (0.0..=1.0).contains(&p) {
                priority_sum += p;
                analysis.statistics.urls_with_priority += 1;
            } else {
                analysis
                    .issues
                    .push(format!("Invalid priority {} for URL: {}", p, loc));
            }
        }

        if lastmod.is_some() {
            analysis.statistics.urls_with_lastmod += 1;
        }

        *analysis
            .statistics
            .content_types
            .entry(categorize_url(&loc).to_string())
            .or_insert(0) += 1;

        analysis.url_entries.push(SitemapUrl {
            loc,
            lastmod,
            changefreq,
            priority,
        });
    }

    analysis.statistics.total_urls = analysis.url_entries.len();
    if analysis.statistics.urls_with_priority > 0 {
        analysis.statistics.avg_priority =
            priority_sum / analysis.statistics.urls_with_priority as f32;
    }
}

/// Trimmed text of a child tag inside a `<url>` block
fn tag_text(body: &str, pattern: &Regex) -> Option<String> {
    pattern
        .captures(body)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Coarse content category inferred from URL path segments
pub fn categorize_url(url: &str) -> &'static str {
    let url_lower = url.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| url_lower.contains(n));

    if has(&["/product", "/item", "/shop"]) {
        "product"
    } else if has(&["/blog", "/post"]) {
        "blog"
    } else if has(&["/article", "/news"]) {
        "article"
    } else if has(&["/doc", "/guide", "/tutorial"]) {
        "documentation"
    } else if has(&["/about", "/contact", "/privacy"]) {
        "info"
    } else {
        "page"
    }
}

fn decode_xml_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
