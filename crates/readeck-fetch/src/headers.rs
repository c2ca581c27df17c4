use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Chrome-like UA string, matching the original extractor's `uaString`
/// constant in `pkg/extract/http.go`.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.3";

/// Default headers sent with every request unless the caller overrides them
/// (spec.md §4.A).
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    let set = |headers: &mut HeaderMap, name: &'static str, value: &str| {
        let name = HeaderName::from_static(name);
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(name, value);
        }
    };

    set(&mut headers, "user-agent", USER_AGENT);
    set(
        &mut headers,
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/jpeg,image/png,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    );
    set(&mut headers, "accept-language", "en-US,en;q=0.8");
    set(&mut headers, "cache-control", "max-age=0");
    set(&mut headers, "upgrade-insecure-requests", "1");
    set(
        &mut headers,
        "sec-ch-ua",
        "\"Google Chrome\";v=\"137\", \"Chromium\";v=\"137\"",
    );
    set(&mut headers, "sec-ch-ua-mobile", "?0");
    set(&mut headers, "sec-ch-ua-platform", "\"Windows\"");
    set(&mut headers, "sec-fetch-site", "none");

    headers
}

/// Headers appropriate for an image/media subresource fetch (used by the
/// Archiver), matching `processURLNode`'s `Accept` override in
/// `pkg/archiver/process_html.go`.
pub fn image_accept_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str("image/webp,image/svg+xml,image/*,*/*;q=0.8") {
        headers.insert(HeaderName::from_static("accept"), value);
    }
    headers
}
