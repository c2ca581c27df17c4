//! `ExtractFavicon` (spec.md §4.F item 6): picks the `<link rel~="icon">`
//! with the largest declared `sizes`, fetches and decodes it, normalizes its
//! extension (`.ico` ⇒ `image/ico`), and falls back to `/favicon.ico`.
//! Duplicate largest-`sizes` candidates resolve to the first one in document
//! order (SPEC_FULL.md §9 Open Question resolution).

use async_trait::async_trait;
use readeck_dom::Dom;
use readeck_engine::{Extractor, ProcessMessage, Processor, ProcessorOutcome, Step};
use readeck_image::Picture as ImagePipeline;
use readeck_types::Picture;
use reqwest::header::HeaderMap;

pub struct ExtractFavicon;

#[async_trait]
impl Processor for ExtractFavicon {
    fn name(&self) -> &'static str {
        "extract-favicon"
    }

    async fn run(&self, msg: &mut ProcessMessage, extractor: &mut Extractor) -> ProcessorOutcome {
        if msg.step() != Step::Dom {
            return ProcessorOutcome::Continue;
        }
        let Ok(index) = usize::try_from(msg.position().max(0)) else {
            return ProcessorOutcome::Continue;
        };
        let Some(base_url) = extractor.drop_at(index).map(|d| d.url.clone()) else {
            return ProcessorOutcome::Continue;
        };

        let candidate = msg.dom.as_ref().and_then(|dom| largest_icon_href(dom));
        let href = candidate.unwrap_or_else(|| "/favicon.ico".to_string());
        let Ok(url) = base_url.join(&href) else {
            return ProcessorOutcome::Continue;
        };

        let client = extractor.client();
        let response = match client.fetch(&url, HeaderMap::new()).await {
            Ok(response) => response,
            Err(err) => {
                extractor.log(format!("favicon fetch failed for {url}: {err}"));
                return ProcessorOutcome::Continue;
            }
        };

        let content_type = normalize_icon_content_type(
            response
                .headers
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(""),
            url.path(),
        );

        let Ok(decoded) = ImagePipeline::decode(&content_type, &response.body) else {
            return ProcessorOutcome::Continue;
        };

        if let Some(drop) = extractor.drop_at_mut(index) {
            drop.pictures.insert(
                "icon".to_string(),
                Picture::new(url, content_type, response.body.to_vec(), decoded.width(), decoded.height()),
            );
        }

        ProcessorOutcome::Continue
    }
}

/// `.ico` has no registered IANA MIME type the browsers agree on; the
/// original normalizes it to `image/ico` specifically rather than the more
/// common `image/x-icon`, so this keeps that exact string.
fn normalize_icon_content_type(header: &str, path: &str) -> String {
    let header = header.split(';').next().unwrap_or("").trim();
    if path.to_ascii_lowercase().ends_with(".ico") || header.is_empty() {
        "image/ico".to_string()
    } else {
        header.to_string()
    }
}

fn largest_icon_href(dom: &Dom) -> Option<String> {
    let mut best: Option<(u64, String)> = None;
    for id in dom.find_all_tags(&["link"]) {
        let Some(rel) = dom.attr(id, "rel") else { continue };
        if !rel.split_whitespace().any(|token| token.eq_ignore_ascii_case("icon")) {
            continue;
        }
        let Some(href) = dom.attr(id, "href") else { continue };
        let area = dom.attr(id, "sizes").map(declared_area).unwrap_or(0);
        match &best {
            Some((best_area, _)) if *best_area >= area => {}
            _ => best = Some((area, href.to_string())),
        }
    }
    best.map(|(_, href)| href)
}

/// Parses a `sizes="WxH"` (or the first token of a space-separated list of
/// them) into its pixel area, so candidates compare by total size rather
/// than string order.
fn declared_area(sizes: &str) -> u64 {
    sizes
        .split_whitespace()
        .next()
        .and_then(|token| token.split_once(['x', 'X']))
        .and_then(|(w, h)| Some((w.parse::<u64>().ok()?, h.parse::<u64>().ok()?)))
        .map(|(w, h)| w * h)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn largest_sizes_wins_and_ties_keep_first() {
        let dom = Dom::parse(
            r#"<html><head>
                <link rel="icon" href="/a.png" sizes="16x16">
                <link rel="icon" href="/b.png" sizes="32x32">
                <link rel="icon" href="/c.png" sizes="32x32">
            </head></html>"#,
        );
        assert_eq!(largest_icon_href(&dom), Some("/b.png".to_string()));
    }

    #[test]
    fn missing_icon_link_falls_through_to_none() {
        let dom = Dom::parse("<html><head></head></html>");
        assert_eq!(largest_icon_href(&dom), None);
    }

    #[test]
    fn ico_extension_normalizes_content_type() {
        assert_eq!(normalize_icon_content_type("application/octet-stream", "/favicon.ico"), "image/ico");
        assert_eq!(normalize_icon_content_type("image/png", "/a.png"), "image/png");
    }
}
