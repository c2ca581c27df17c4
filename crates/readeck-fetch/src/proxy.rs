//! Proxy dispatch (spec.md §4.A): "before dialing, iterate `ProxyMatch`
//! list; the first entry whose host glob matches the request host provides
//! the proxy URL."

use globset::{Glob, GlobMatcher};
use readeck_config::ProxyMatch;

pub struct CompiledProxyMatch {
    matcher: GlobMatcher,
    pub proxy_url: String,
}

/// Compiles the configured `{host_glob, proxy_url}` list once per client so
/// each request only needs to evaluate already-built matchers, in document
/// order (first match wins).
pub fn compile(entries: &[ProxyMatch]) -> Vec<CompiledProxyMatch> {
    entries
        .iter()
        .filter_map(|entry| {
            Glob::new(&entry.host_glob)
                .map(|glob| CompiledProxyMatch {
                    matcher: glob.compile_matcher(),
                    proxy_url: entry.proxy_url.clone(),
                })
                .map_err(|err| tracing::warn!(glob = %entry.host_glob, %err, "ignoring invalid proxy host glob"))
                .ok()
        })
        .collect()
}

/// Returns the proxy URL for `host`, if any configured glob matches.
pub fn resolve<'a>(host: &str, compiled: &'a [CompiledProxyMatch]) -> Option<&'a str> {
    compiled
        .iter()
        .find(|entry| entry.matcher.is_match(host))
        .map(|entry| entry.proxy_url.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_glob_wins() {
        let compiled = compile(&[
            ProxyMatch::new("*.example.com", "http://proxy-a:3128"),
            ProxyMatch::new("*", "http://proxy-b:3128"),
        ]);

        assert_eq!(resolve("news.example.com", &compiled), Some("http://proxy-a:3128"));
        assert_eq!(resolve("other.test", &compiled), Some("http://proxy-b:3128"));
    }

    #[test]
    fn no_match_returns_none() {
        let compiled = compile(&[ProxyMatch::new("*.example.com", "http://proxy-a:3128")]);
        assert_eq!(resolve("unrelated.test", &compiled), None);
    }
}
