//! Rewrites `url(...)` references inside CSS text (inline `style=` attributes
//! and `<style>` bodies), spec.md §4.C "Subresource processing".

use once_cell::sync::Lazy;
use regex::Regex;

static CSS_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)url\(\s*(['"]?)([^'")]+)\1\s*\)"#).unwrap());

/// Finds every `url(...)` reference in `css`, in order of appearance.
pub fn find_urls(css: &str) -> Vec<String> {
    CSS_URL
        .captures_iter(css)
        .map(|c| c[2].to_string())
        .collect()
}

/// Rewrites each `url(...)` reference using `resolve`, which maps the
/// original reference to its replacement (already-absolutized, then fetched
/// and rewritten by the caller).
pub fn rewrite_urls(css: &str, mut resolve: impl FnMut(&str) -> String) -> String {
    CSS_URL
        .replace_all(css, |caps: &regex::Captures| {
            let original = &caps[2];
            let replacement = resolve(original);
            format!("url({replacement})")
        })
        .into_owned()
}
