//! Framework and CMS detection from script sources and the generator meta tag

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::parser::first_attr;

/// Substring of a `<script src>` and the label it maps to, in reporting order
pub const SCRIPT_SIGNATURES: &[(&str, &str)] = &[
    ("wp-", "WordPress"),
    ("react", "React"),
    ("vue", "Vue.js"),
    ("angular", "Angular"),
    ("shopify", "Shopify"),
    ("_next/", "Next.js"),
    ("_nuxt/", "Nuxt"),
    ("gatsby", "Gatsby"),
    ("jquery", "jQuery"),
    ("svelte", "Svelte"),
    ("wix", "Wix"),
    ("squarespace", "Squarespace"),
    ("woocommerce", "WooCommerce"),
];

static GENERATOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="generator"]"#).expect("valid selector"));
static SCRIPT_SOURCES: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script[src]").expect("valid selector"));

/// Detect technologies used by a page.
///
/// The generator meta value (if any) comes first, then script signature labels.
pub fn detect_tech_stack(html: &str) -> Vec<String> {
    detect_tech_stack_from(&Html::parse_document(html))
}

pub fn detect_tech_stack_from(document: &Html) -> Vec<String> {
    let mut stack = Vec::new();

    let generator = first_attr(document, &GENERATOR, "content");
    if !generator.is_empty() {
        stack.push(generator);
    }

    let sources: Vec<&str> = document
        .select(&SCRIPT_SOURCES)
        .filter_map(|script| script.value().attr("src"))
        .collect();

    for (needle, label) in SCRIPT_SIGNATURES {
        let matched = sources.iter().any(|src| src.contains(needle));
        if matched && !stack.iter().any(|existing| existing == label) {
            stack.push(label.to_string());
        }
    }

    stack
}
