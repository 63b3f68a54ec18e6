//! Meta tag extraction for `/meta-check`

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::parser::first_attr;
use crate::types::MetaTags;

fn meta_selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static DESCRIPTION: Lazy<Selector> = Lazy::new(|| meta_selector(r#"meta[name="description"]"#));
static OG_TITLE: Lazy<Selector> = Lazy::new(|| meta_selector(r#"meta[property="og:title"]"#));
static OG_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| meta_selector(r#"meta[property="og:description"]"#));
static TWITTER_TITLE: Lazy<Selector> =
    Lazy::new(|| meta_selector(r#"meta[name="twitter:title"]"#));
static TWITTER_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| meta_selector(r#"meta[name="twitter:description"]"#));

/// Read the description, Open Graph and Twitter card tags; absent tags are `""`
pub fn extract_meta_tags(html: &str) -> MetaTags {
    extract_meta_tags_from(&Html::parse_document(html))
}

pub fn extract_meta_tags_from(document: &Html) -> MetaTags {
    MetaTags {
        description: first_attr(document, &DESCRIPTION, "content"),
        og_title: first_attr(document, &OG_TITLE, "content"),
        og_desc: first_attr(document, &OG_DESCRIPTION, "content"),
        twitter_title: first_attr(document, &TWITTER_TITLE, "content"),
        twitter_desc: first_attr(document, &TWITTER_DESCRIPTION, "content"),
    }
}
