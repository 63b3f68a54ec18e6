use anyhow::{Context, Result};
use url::Url;

/// Resolve a site-level file such as `/robots.txt` against any URL on the site.
///
/// Absolute paths replace the input's path, query and fragment.
pub fn resolve_site_file(base: &str, path: &str) -> Result<String> {
    let base = Url::parse(base).with_context(|| format!("invalid URL: {}", base))?;
    let resolved = base
        .join(path)
        .with_context(|| format!("cannot resolve {} against {}", path, base))?;
    Ok(resolved.into())
}

/// True for absolute `http` and `https` URLs
pub fn is_http_url(input: &str) -> bool {
    Url::parse(input)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Normalize a URL to its origin (scheme + host + optional port).
///
/// Falls back to trimming trailing slashes if the input cannot be parsed.
pub fn normalize_origin(input: &str) -> String {
    match Url::parse(input) {
        Ok(parsed) => parsed
            .origin()
            .ascii_serialization()
            .trim_end_matches('/')
            .to_string(),
        Err(_) => input.trim_end_matches('/').to_string(),
    }
}
