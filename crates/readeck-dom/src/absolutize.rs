//! URL absolutization, including `srcset` rewriting (ported from
//! `convertRelativeURLs` / `rxSrcsetURL` in `pkg/archiver/process_html.go`).

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Matches one `srcset` candidate: a URL, an optional `<n>x`/`<n>w`
/// descriptor, then a separating comma or end of string.
static SRCSET_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\S+)(\s+[\d.]+[xw])?(\s*(?:,|$))").unwrap());

/// Resolves `maybe_relative` against `base`, returning the original string
/// unchanged if it isn't a valid URL once joined (matches the original's
/// best-effort `createAbsoluteURL`, which never errors).
pub fn absolutize(maybe_relative: &str, base: &Url) -> String {
    let trimmed = maybe_relative.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("data:") {
        return maybe_relative.to_string();
    }
    match base.join(trimmed) {
        Ok(joined) => joined.to_string(),
        Err(_) => maybe_relative.to_string(),
    }
}

/// Rewrites every URL candidate inside a `srcset` attribute value.
pub fn absolutize_srcset(srcset: &str, base: &Url) -> String {
    let mut out = String::new();
    let mut last_end = 0;
    for caps in SRCSET_CANDIDATE.captures_iter(srcset) {
        let whole = caps.get(0).unwrap();
        out.push_str(&srcset[last_end..whole.start()]);
        let url_part = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let descriptor = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let tail = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        out.push_str(&absolutize(url_part, base));
        out.push_str(descriptor);
        out.push_str(tail);
        last_end = whole.end();
    }
    out.push_str(&srcset[last_end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/articles/one").unwrap()
    }

    #[test]
    fn resolves_relative_path() {
        assert_eq!(absolutize("../img/a.png", &base()), "https://example.com/img/a.png");
    }

    #[test]
    fn leaves_fragment_and_data_uris_untouched() {
        assert_eq!(absolutize("#top", &base()), "#top");
        assert_eq!(absolutize("data:image/png;base64,AA==", &base()), "data:image/png;base64,AA==");
    }

    #[test]
    fn rewrites_each_srcset_candidate() {
        let srcset = "small.jpg 480w, /big.jpg 800w";
        let rewritten = absolutize_srcset(srcset, &base());
        assert!(rewritten.contains("https://example.com/articles/small.jpg 480w"));
        assert!(rewritten.contains("https://example.com/big.jpg 800w"));
    }
}
