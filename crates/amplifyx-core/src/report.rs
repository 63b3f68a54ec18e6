//! Website SEO report.
//!
//! Combines the page summary, meta tags, keyword frequencies, tech stack,
//! robots.txt and sitemap into templated issues and four 0-100 scores.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fetch::HttpFetcher;
use crate::keywords::{density_percent, word_frequencies};
use crate::meta::extract_meta_tags_from;
use crate::parser::{body_text, summarize_document};
use crate::robots_txt::parse_robots_txt;
use crate::sitemap::{SitemapType, parse_sitemap};
use crate::tech_stack::detect_tech_stack_from;
use crate::types::{KeywordCount, MetaTags, PageSummary};
use crate::url_utils::{normalize_origin, resolve_site_file};

pub const TITLE_LENGTH: (usize, usize) = (30, 60);
pub const DESCRIPTION_LENGTH: (usize, usize) = (120, 160);
pub const MIN_WORDS: usize = 300;
pub const REPORTED_KEYWORDS: usize = 5;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("invalid sentence regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Error,
    Warning,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    fn deduction(self) -> u32 {
        match self {
            Impact::High => 15,
            Impact::Medium => 8,
            Impact::Low => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub category: String,
    pub message: String,
    pub impact: Impact,
}

impl SeoIssue {
    fn new(kind: IssueKind, category: &str, message: impl Into<String>, impact: Impact) -> Self {
        Self {
            kind,
            category: category.to_string(),
            message: message.into(),
            impact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoScore {
    pub overall: u8,
    pub keyword: u8,
    pub readability: u8,
    pub engagement: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteSeoReport {
    pub url: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub issues: Vec<SeoIssue>,
    pub score: SeoScore,
    pub framework: Option<String>,
    pub keywords: Vec<String>,
    pub is_ecommerce: bool,
}

/// Site-level files fetched next to the page; `None` means not found
#[derive(Debug, Clone, Default)]
pub struct SiteFiles {
    pub robots: Option<String>,
    pub sitemap: Option<String>,
}

/// Fetch the page, robots.txt and sitemap.xml concurrently and build the report.
///
/// Only a page failure is an error. Missing site files become issues.
pub async fn analyze_website(fetcher: &HttpFetcher, url: &str) -> Result<WebsiteSeoReport> {
    let robots_url = resolve_site_file(url, "/robots.txt")?;
    let sitemap_url = resolve_site_file(url, "/sitemap.xml")?;

    let (page, robots, sitemap) = tokio::join!(
        fetcher.get_text(url),
        fetcher.get_text(&robots_url),
        fetcher.get_text(&sitemap_url),
    );

    let page = page?;
    if let Err(e) = &robots {
        debug!(url = %robots_url, error = %e, "robots.txt unavailable");
    }
    if let Err(e) = &sitemap {
        debug!(url = %sitemap_url, error = %e, "sitemap.xml unavailable");
    }

    let files = SiteFiles {
        robots: robots.ok(),
        sitemap: sitemap.ok(),
    };

    Ok(build_report(url, &page, &files))
}

/// Build the report from already fetched content
pub fn build_report(url: &str, html: &str, files: &SiteFiles) -> WebsiteSeoReport {
    let document = Html::parse_document(html);
    let summary = summarize_document(&document);
    let meta = extract_meta_tags_from(&document);
    let stack = detect_tech_stack_from(&document);
    let text = body_text(&document);
    let frequencies = word_frequencies(&text);

    let keywords: Vec<String> = frequencies
        .iter()
        .filter(|k| k.word.chars().count() > 3)
        .take(REPORTED_KEYWORDS)
        .map(|k| k.word.clone())
        .collect();

    let mut issues = Vec::new();
    check_title(&summary, &mut issues);
    check_description(&summary, &mut issues);
    check_heading(&summary, &mut issues);
    check_content(&summary, &mut issues);
    check_social(&meta, &mut issues);
    check_robots(files.robots.as_deref(), &mut issues);
    let product_urls = check_sitemap(files.sitemap.as_deref(), url, &mut issues);

    let keyword = keyword_score(&summary, keywords.first(), &frequencies);
    let readability = readability_score(&text, summary.word_count);
    let engagement = engagement_score(&summary, &meta);
    let overall = overall_score(&issues, [keyword, readability, engagement]);

    let is_ecommerce = stack
        .iter()
        .any(|tech| tech == "Shopify" || tech == "WooCommerce")
        || text.to_lowercase().contains("add to cart")
        || product_urls > 0;

    WebsiteSeoReport {
        url: url.to_string(),
        title: non_empty(summary.title.trim()),
        meta_description: non_empty(summary.meta_desc.trim()),
        issues,
        score: SeoScore {
            overall,
            keyword,
            readability,
            engagement,
        },
        framework: stack.into_iter().next(),
        keywords,
        is_ecommerce,
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn check_title(summary: &PageSummary, issues: &mut Vec<SeoIssue>) {
    let title = summary.title.trim();
    let length = title.chars().count();
    let (min, max) = TITLE_LENGTH;

    issues.push(if title.is_empty() {
        SeoIssue::new(IssueKind::Error, "Title", "Page is missing a <title> tag", Impact::High)
    } else if !(min..=max).contains(&length) {
        SeoIssue::new(
            IssueKind::Warning,
            "Title",
            format!("Title is {} characters; aim for {}-{}", length, min, max),
            Impact::Medium,
        )
    } else {
        SeoIssue::new(IssueKind::Success, "Title", "Title length is optimal", Impact::Low)
    });
}

fn check_description(summary: &PageSummary, issues: &mut Vec<SeoIssue>) {
    let description = summary.meta_desc.trim();
    let length = description.chars().count();
    let (min, max) = DESCRIPTION_LENGTH;

    issues.push(if description.is_empty() {
        SeoIssue::new(
            IssueKind::Error,
            "Meta Description",
            "Meta description is missing",
            Impact::High,
        )
    } else if !(min..=max).contains(&length) {
        SeoIssue::new(
            IssueKind::Warning,
            "Meta Description",
            format!("Meta description is {} characters; aim for {}-{}", length, min, max),
            Impact::Medium,
        )
    } else {
        SeoIssue::new(
            IssueKind::Success,
            "Meta Description",
            "Meta description length is optimal",
            Impact::Low,
        )
    });
}

fn check_heading(summary: &PageSummary, issues: &mut Vec<SeoIssue>) {
    issues.push(if summary.h1.trim().is_empty() {
        SeoIssue::new(IssueKind::Error, "Headings", "No <h1> heading found", Impact::Medium)
    } else {
        SeoIssue::new(IssueKind::Success, "Headings", "Page has an <h1> heading", Impact::Low)
    });
}

fn check_content(summary: &PageSummary, issues: &mut Vec<SeoIssue>) {
    issues.push(if summary.word_count < MIN_WORDS {
        SeoIssue::new(
            IssueKind::Warning,
            "Content",
            format!(
                "Thin content: {} words (aim for {}+)",
                summary.word_count, MIN_WORDS
            ),
            Impact::Medium,
        )
    } else {
        SeoIssue::new(
            IssueKind::Success,
            "Content",
            format!("Content length is healthy ({} words)", summary.word_count),
            Impact::Low,
        )
    });
}

fn check_social(meta: &MetaTags, issues: &mut Vec<SeoIssue>) {
    issues.push(if meta.has_social_tags() {
        SeoIssue::new(IssueKind::Success, "Social", "Social sharing tags present", Impact::Low)
    } else {
        SeoIssue::new(
            IssueKind::Warning,
            "Social",
            "No Open Graph or Twitter card tags",
            Impact::Low,
        )
    });
}

fn check_robots(robots: Option<&str>, issues: &mut Vec<SeoIssue>) {
    let Some(content) = robots else {
        issues.push(SeoIssue::new(
            IssueKind::Warning,
            "Crawling",
            "robots.txt not found",
            Impact::Medium,
        ));
        return;
    };

    let analysis = parse_robots_txt(content);
    let blocked = analysis.blocked_search_crawlers();

    issues.push(if blocked.is_empty() {
        SeoIssue::new(
            IssueKind::Success,
            "Crawling",
            "robots.txt allows search engine crawlers",
            Impact::Low,
        )
    } else {
        SeoIssue::new(
            IssueKind::Error,
            "Crawling",
            format!("robots.txt blocks {}", blocked.join(", ")),
            Impact::High,
        )
    });
}

/// Returns the number of product URLs listed in the sitemap
fn check_sitemap(sitemap: Option<&str>, url: &str, issues: &mut Vec<SeoIssue>) -> usize {
    let Some(content) = sitemap else {
        issues.push(SeoIssue::new(
            IssueKind::Warning,
            "Sitemap",
            "sitemap.xml not found",
            Impact::Medium,
        ));
        return 0;
    };

    let analysis = parse_sitemap(content, &normalize_origin(url));

    issues.push(if analysis.sitemap_type == SitemapType::Unknown {
        SeoIssue::new(
            IssueKind::Error,
            "Sitemap",
            "sitemap.xml is not a valid sitemap",
            Impact::Medium,
        )
    } else if let Some(first) = analysis.issues.first() {
        SeoIssue::new(
            IssueKind::Warning,
            "Sitemap",
            format!("Sitemap has {} issue(s): {}", analysis.issues.len(), first),
            Impact::Low,
        )
    } else {
        SeoIssue::new(
            IssueKind::Success,
            "Sitemap",
            format!("Sitemap lists {} entries", analysis.entry_count()),
            Impact::Low,
        )
    });

    analysis.count_of("product")
}

fn keyword_score(
    summary: &PageSummary,
    top_keyword: Option<&String>,
    frequencies: &[KeywordCount],
) -> u8 {
    let Some(keyword) = top_keyword else {
        return 0;
    };

    let mut score = 0u32;
    if summary.title.to_lowercase().contains(keyword.as_str()) {
        score += 35;
    }
    if summary.meta_desc.to_lowercase().contains(keyword.as_str()) {
        score += 25;
    }
    if summary.h1.to_lowercase().contains(keyword.as_str()) {
        score += 15;
    }

    let density = density_percent(keyword, frequencies);
    if (0.5..=3.0).contains(&density) {
        score += 25;
    } else if density > 0.0 {
        score += 10;
    }

    score.min(100) as u8
}

fn readability_score(text: &str, word_count: usize) -> u8 {
    if word_count == 0 {
        return 0;
    }

    let sentences = SENTENCE_END
        .split(text)
        .filter(|sentence| !sentence.trim().is_empty())
        .count()
        .max(1);
    let average = word_count as f64 / sentences as f64;

    let base: u32 = if average <= 20.0 {
        70
    } else if average <= 25.0 {
        50
    } else {
        30
    };

    let length_bonus: u32 = if word_count >= MIN_WORDS {
        30
    } else if word_count >= 100 {
        15
    } else {
        0
    };

    (base + length_bonus).min(100) as u8
}

fn engagement_score(summary: &PageSummary, meta: &MetaTags) -> u8 {
    let mut score = 0u32;
    if !meta.og_title.is_empty() || !meta.og_desc.is_empty() {
        score += 15;
    }
    if !meta.twitter_title.is_empty() || !meta.twitter_desc.is_empty() {
        score += 15;
    }
    if !summary.h1.trim().is_empty() {
        score += 25;
    }
    if !summary.meta_desc.trim().is_empty() {
        score += 25;
    }
    if !summary.title.trim().is_empty() {
        score += 20;
    }
    score as u8
}

fn overall_score(issues: &[SeoIssue], sub_scores: [u8; 3]) -> u8 {
    let health = issues
        .iter()
        .filter(|issue| issue.kind != IssueKind::Success)
        .fold(100u32, |score, issue| {
            score.saturating_sub(issue.impact.deduction())
        });

    let total = health + sub_scores.iter().map(|&s| s as u32).sum::<u32>();
    ((total as f64) / 4.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed_page() -> String {
        let paragraph = "Rust tooling makes seo audits fast and reliable. ".repeat(40);
        format!(
            r#"<html>
                <head>
                    <title>Rust SEO tooling for fast and reliable audits</title>
                    <meta name="description" content="{}">
                    <meta property="og:title" content="Rust SEO tooling">
                    <meta name="twitter:title" content="Rust SEO tooling">
                </head>
                <body><h1>Rust tooling</h1> <p>{}</p></body>
            </html>"#,
            "Learn how rust tooling speeds up seo audits with reliable crawlers, \
             structured extraction, and reports that highlight what to fix first.",
            paragraph
        )
    }

    fn files() -> SiteFiles {
        SiteFiles {
            robots: Some("User-agent: *\nDisallow:\nSitemap: https://example.com/sitemap.xml\n".into()),
            sitemap: Some(
                "<urlset><url><loc>https://example.com/</loc></url></urlset>".to_string(),
            ),
        }
    }

    fn issue<'a>(report: &'a WebsiteSeoReport, category: &str) -> &'a SeoIssue {
        report
            .issues
            .iter()
            .find(|i| i.category == category)
            .unwrap()
    }

    #[test]
    fn test_healthy_page_has_only_successes() {
        let report = build_report("https://example.com/", &well_formed_page(), &files());

        for issue in &report.issues {
            assert_eq!(issue.kind, IssueKind::Success, "{:?}", issue);
        }
        assert_eq!(report.score.engagement, 100);
        assert!(report.score.keyword >= 75);
        assert!(report.score.overall >= 80);
        assert_eq!(report.keywords[0], "rust");
        assert!(!report.is_ecommerce);
    }

    #[test]
    fn test_empty_page_reports_errors() {
        let report = build_report("https://example.com/", "<html></html>", &SiteFiles::default());

        assert_eq!(issue(&report, "Title").kind, IssueKind::Error);
        assert_eq!(issue(&report, "Meta Description").kind, IssueKind::Error);
        assert_eq!(issue(&report, "Headings").kind, IssueKind::Error);
        assert_eq!(issue(&report, "Sitemap").message, "sitemap.xml not found");
        assert_eq!(issue(&report, "Crawling").message, "robots.txt not found");
        assert_eq!(report.score.keyword, 0);
        assert_eq!(report.score.readability, 0);
        assert_eq!(report.score.engagement, 0);
        assert!(report.title.is_none());
        assert!(report.meta_description.is_none());
    }

    #[test]
    fn test_short_title_is_warning() {
        let html = "<html><head><title>Short</title></head><body></body></html>";
        let report = build_report("https://example.com/", html, &files());
        let title = issue(&report, "Title");
        assert_eq!(title.kind, IssueKind::Warning);
        assert!(title.message.contains("5 characters"));
    }

    #[test]
    fn test_robots_blocking_search_engines() {
        let files = SiteFiles {
            robots: Some("User-agent: *\nDisallow: /\n".to_string()),
            sitemap: None,
        };
        let report = build_report("https://example.com/", "<html></html>", &files);
        let crawling = issue(&report, "Crawling");
        assert_eq!(crawling.kind, IssueKind::Error);
        assert_eq!(crawling.impact, Impact::High);
        assert!(crawling.message.contains("Googlebot"));
    }

    #[test]
    fn test_invalid_sitemap_is_error() {
        let files = SiteFiles {
            robots: None,
            sitemap: Some("<html>not found</html>".to_string()),
        };
        let report = build_report("https://example.com/", "<html></html>", &files);
        assert_eq!(issue(&report, "Sitemap").kind, IssueKind::Error);
    }

    #[test]
    fn test_ecommerce_detection() {
        let shopify = r#"<script src="https://cdn.shopify.com/s/theme.js"></script>"#;
        let report = build_report("https://example.com/", shopify, &SiteFiles::default());
        assert!(report.is_ecommerce);
        assert_eq!(report.framework.as_deref(), Some("Shopify"));

        let cart = "<body><button>Add to Cart</button></body>";
        assert!(build_report("https://example.com/", cart, &SiteFiles::default()).is_ecommerce);

        let files = SiteFiles {
            robots: None,
            sitemap: Some(
                "<urlset><url><loc>https://example.com/products/a</loc></url></urlset>"
                    .to_string(),
            ),
        };
        assert!(build_report("https://example.com/", "<html></html>", &files).is_ecommerce);
    }

    #[test]
    fn test_issue_serialization_shape() {
        let issue = SeoIssue::new(IssueKind::Warning, "Title", "msg", Impact::Medium);
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "warning", "category": "Title", "message": "msg", "impact": "medium"})
        );
    }

    #[test]
    fn test_readability_prefers_short_sentences() {
        let short = "One two three. Four five six. Seven eight nine.";
        let long = format!("{}.", "word ".repeat(40));
        assert!(readability_score(short, 9) > readability_score(&long, 40));
    }

    #[test]
    fn test_overall_score_deductions() {
        let issues = vec![
            SeoIssue::new(IssueKind::Error, "A", "a", Impact::High),
            SeoIssue::new(IssueKind::Warning, "B", "b", Impact::Low),
            SeoIssue::new(IssueKind::Success, "C", "c", Impact::High),
        ];
        // health = 100 - 15 - 3 = 82; (82 + 100 + 100 + 100) / 4 = 95.5
        assert_eq!(overall_score(&issues, [100, 100, 100]), 96);
    }
}
