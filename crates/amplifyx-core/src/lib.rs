//! # amplifyx-core
//!
//! Core library behind the AmplifyX SEO API.
//!
//! This library provides:
//! - A shared HTTP fetcher for pages, site files and search result pages
//! - HTML extraction (title, meta tags, headings, visible text, keyword density)
//! - Tech-stack detection from `<script>` sources and the generator meta tag
//! - robots.txt and XML sitemap parsing
//! - Lighthouse page audits run as a scoped child process
//! - A website SEO report built from the pieces above
//! - Platform templated content rewriting
//! - A per-client daily word quota and a seeded mock-data generator
//!
//! ## Example
//!
//! ```
//! use amplifyx_core::parser;
//!
//! let html = r#"
//!     <html><head><title>Example</title></head>
//!     <body><h1>Hello</h1><p>Two words</p></body></html>
//! "#;
//!
//! let summary = parser::summarize_page(html);
//! assert_eq!(summary.title, "Example");
//! assert_eq!(summary.word_count, 3);
//! ```

pub mod audit;
pub mod fetch;
pub mod keywords;
pub mod meta;
pub mod mock;
pub mod parser;
pub mod report;
pub mod rewrite;
pub mod robots_txt;
pub mod search;
pub mod sitemap;
pub mod tech_stack;
pub mod types;
pub mod url_utils;
pub mod usage;

// Re-export commonly used types
pub use types::{
    Backlinks, KeywordCount, KeywordDensity, MetaTags, PageSpeedReport, PageSummary,
    RankPosition, RobotsFile, SitemapFile, TechStack,
};

pub use audit::{AuditError, LighthouseAuditor, PageAuditor};
pub use fetch::HttpFetcher;
pub use report::{SeoIssue, SeoScore, WebsiteSeoReport, build_report};
pub use rewrite::{Platform, RewriteOptions};
pub use search::SearchEndpoints;
pub use usage::{DailyQuota, DailyUsage, UsageError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_summary_serializes_camel_case() {
        let summary = PageSummary {
            title: "Title".to_string(),
            meta_desc: "Description".to_string(),
            h1: "Heading".to_string(),
            word_count: 42,
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["title"], "Title");
        assert_eq!(value["metaDesc"], "Description");
        assert_eq!(value["h1"], "Heading");
        assert_eq!(value["wordCount"], 42);
    }

    #[test]
    fn test_meta_tags_serialize_camel_case() {
        let tags = MetaTags {
            description: "d".to_string(),
            og_title: "ot".to_string(),
            og_desc: "od".to_string(),
            twitter_title: "tt".to_string(),
            twitter_desc: "td".to_string(),
        };

        let value = serde_json::to_value(&tags).unwrap();
        assert_eq!(value["ogTitle"], "ot");
        assert_eq!(value["ogDesc"], "od");
        assert_eq!(value["twitterTitle"], "tt");
        assert_eq!(value["twitterDesc"], "td");
    }

    #[test]
    fn test_rank_position_not_found() {
        let value = serde_json::to_value(RankPosition { position: -1 }).unwrap();
        assert_eq!(value, serde_json::json!({"position": -1}));
    }

    #[test]
    fn test_summarize_and_detect_together() {
        let html = r#"
            <html>
                <head>
                    <title>Shop</title>
                    <meta name="generator" content="WordPress 6.5">
                </head>
                <body>
                    <h1>Welcome</h1>
                    <script src="/wp-includes/js/jquery.js"></script>
                </body>
            </html>
        "#;

        let summary = parser::summarize_page(html);
        assert_eq!(summary.title, "Shop");
        assert_eq!(summary.word_count, 1);

        let stack = tech_stack::detect_tech_stack(html);
        assert_eq!(stack[0], "WordPress 6.5");
        assert!(stack.contains(&"WordPress".to_string()));
        assert!(stack.contains(&"jQuery".to_string()));
    }
}
