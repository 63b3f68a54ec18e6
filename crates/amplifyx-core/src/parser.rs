//! HTML field extraction for page analysis

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::types::PageSummary;

/// Elements whose text never renders
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid selector"));
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("valid selector"));
static META_DESCRIPTION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="description"]"#).expect("valid selector")
});

/// Extract title, meta description, first heading and body word count
pub fn summarize_page(html: &str) -> PageSummary {
    let document = Html::parse_document(html);
    summarize_document(&document)
}

/// Same as [`summarize_page`] for an already parsed document
pub fn summarize_document(document: &Html) -> PageSummary {
    PageSummary {
        title: all_text(document, &TITLE),
        meta_desc: first_attr(document, &META_DESCRIPTION, "content"),
        h1: first_text(document, &H1),
        word_count: count_words(&body_text(document)),
    }
}

/// Visible text of the `<body>` element.
///
/// Text inside `script`, `style`, `noscript` and `template` is skipped.
pub fn visible_body_text(html: &str) -> String {
    body_text(&Html::parse_document(html))
}

pub(crate) fn body_text(document: &Html) -> String {
    document
        .select(&BODY)
        .next()
        .map(visible_text)
        .unwrap_or_default()
}

/// Number of whitespace separated tokens
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Concatenated text of the first element matching `selector`, or `""`
pub(crate) fn first_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .unwrap_or_default()
}

/// Text of every element matching `selector`, joined without separators
pub(crate) fn all_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .flat_map(|element| element.text())
        .collect()
}

/// Attribute value of the first element matching `selector`, or `""`
pub(crate) fn first_attr(document: &Html, selector: &Selector, attr: &str) -> String {
    document
        .select(selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .unwrap_or_default()
        .to_string()
}

fn visible_text(root: ElementRef<'_>) -> String {
    let mut text = String::new();

    for node in root.descendants() {
        let Some(chunk) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_TAGS.contains(&element.name()))
        });

        if !hidden {
            text.push_str(chunk);
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_basic_page() {
        let html = r#"
            <html>
                <head>
                    <title>My Page</title>
                    <meta name="description" content="A short description">
                </head>
                <body>
                    <h1>Main heading</h1>
                    <p>Some body text here</p>
                </body>
            </html>
        "#;

        let summary = summarize_page(html);
        assert_eq!(summary.title, "My Page");
        assert_eq!(summary.meta_desc, "A short description");
        assert_eq!(summary.h1, "Main heading");
        assert_eq!(summary.word_count, 6);
    }

    #[test]
    fn test_summarize_empty_page() {
        let summary = summarize_page("");
        assert_eq!(summary.title, "");
        assert_eq!(summary.meta_desc, "");
        assert_eq!(summary.h1, "");
        assert_eq!(summary.word_count, 0);
    }

    #[test]
    fn test_only_first_h1_is_used() {
        let html = "<body><h1>First</h1><h1>Second</h1></body>";
        let summary = summarize_page(html);
        assert_eq!(summary.h1, "First");
    }

    #[test]
    fn test_every_title_element_is_joined() {
        let html = "<html><head><title>Shop</title><title> | Deals</title></head><body></body></html>";
        assert_eq!(summarize_page(html).title, "Shop | Deals");
    }

    #[test]
    fn test_word_count_skips_scripts_and_styles() {
        let html = r#"
            <body>
                <p>one two</p>
                <script>var ignored = "many words inside script";</script>
                <style>.a { color: red; }</style>
                <noscript>enable javascript please</noscript>
                <p>three</p>
            </body>
        "#;

        assert_eq!(summarize_page(html).word_count, 3);
    }

    #[test]
    fn test_visible_body_text_keeps_nested_text() {
        let html = "<body><div><span>alpha</span> <em>beta</em></div></body>";
        let text = visible_body_text(html);
        assert_eq!(text.split_whitespace().collect::<Vec<_>>(), ["alpha", "beta"]);
    }

    #[test]
    fn test_count_words_handles_mixed_whitespace() {
        assert_eq!(count_words("  a\tb\n\nc  "), 3);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
    }
}
