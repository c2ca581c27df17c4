//! # readeck-archiver
//!
//! The Archiver (spec.md §4.C): turns one fully-parsed HTML document into a
//! self-contained offline archive by rewriting the DOM and recursively
//! fetching every subresource it references.

mod css;
mod events;
mod flags;
mod postprocess;
mod prepare;
mod resources;
mod subresources;

pub use events::{ArchiveEvent, ArchiveEventSender};
pub use flags::ArchiveFlags;
pub use resources::{ArchivedResource, ResourceStore};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use readeck_dom::Dom;
use readeck_fetch::SafeClient;
use readeck_types::Drop;
use serde::Serialize;
use url::Url;

/// The bibliographic fields that land in `manifest.json` (spec.md §6
/// "Archive file") but that the Archiver itself never derives from the
/// HTML it processes — the caller (the Engine, via the page's `Drop`)
/// supplies them alongside the URL and flags.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub title: String,
    pub description: String,
    pub authors: Vec<String>,
    pub lang: Option<String>,
    pub direction: Option<&'static str>,
    pub document_type: &'static str,
    pub date: Option<DateTime<Utc>>,
    pub site: Option<String>,
    pub domain: Option<String>,
    pub labels: Vec<String>,
    pub url: String,
    pub initial_url: String,
}

impl Manifest {
    /// Renders the `manifest.json` member of the Archive file (spec.md §6).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Everything `archive()` needs beyond the raw HTML: the request's URL
/// triple and the bibliographic metadata carried into `manifest.json`.
pub struct ArchiveRequest<'a> {
    pub drop: &'a Drop,
    pub html: &'a str,
    pub base_url: &'a Url,
    pub flags: ArchiveFlags,
    pub initial_url: &'a Url,
    pub labels: Vec<String>,
}

pub struct ArchiveOutput {
    pub html: String,
    pub manifest: Manifest,
    pub resources: HashMap<String, ArchivedResource>,
}

/// `Archive(ctx, URL, html, baseURL, flags) -> (rewrittenHTML, manifest,
/// resources)` (spec.md §4.C). Pure over its inputs: no disk I/O happens
/// here, the caller is responsible for persisting `resources`. The HTML
/// parser is tolerant of malformed input the way a browser is, so there is
/// no failure mode to surface here beyond per-subresource fetch errors,
/// which are reported on `events` instead of aborting the whole archive.
pub async fn archive(
    client: Arc<SafeClient>,
    events: ArchiveEventSender,
    request: ArchiveRequest<'_>,
) -> ArchiveOutput {
    let _ = events.send(ArchiveEvent::StartHtml {
        url: request.drop.url.to_string(),
    });

    let mut dom = Dom::parse(request.html);
    prepare::prepare(&mut dom, request.base_url, request.flags);

    let resources = Arc::new(ResourceStore::new());
    subresources::process(&mut dom, &client, request.base_url, &events, &resources).await;

    postprocess::postprocess(&mut dom, request.flags);

    let html = dom.to_html();
    let manifest = build_manifest(&request);
    let resources = Arc::try_unwrap(resources)
        .map(ResourceStore::into_inner)
        .unwrap_or_default();

    ArchiveOutput { html, manifest, resources }
}

fn build_manifest(request: &ArchiveRequest<'_>) -> Manifest {
    let drop = request.drop;
    Manifest {
        title: drop.title.clone(),
        description: drop.description.clone(),
        authors: drop.authors.clone(),
        lang: drop.lang.clone(),
        direction: drop.text_direction.map(|d| match d {
            readeck_types::TextDirection::Ltr => "ltr",
            readeck_types::TextDirection::Rtl => "rtl",
        }),
        document_type: match drop.document_type {
            readeck_types::DocumentType::Article => "article",
            readeck_types::DocumentType::Photo => "photo",
            readeck_types::DocumentType::Video => "video",
            readeck_types::DocumentType::Other => "other",
        },
        date: drop.date,
        site: drop.site.clone(),
        domain: drop.domain.clone(),
        labels: request.labels.clone(),
        url: drop.url.to_string(),
        initial_url: request.initial_url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readeck_config::ExtractorConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_drop(url: &str) -> Drop {
        Drop::new(Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn archives_a_simple_page_with_no_subresources() {
        let base_url = Url::parse("https://example.com/").unwrap();
        let client = Arc::new(SafeClient::new(Arc::new(ExtractorConfig::default())).unwrap());
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let drop = test_drop("https://example.com/");

        let request = ArchiveRequest {
            drop: &drop,
            html: "<html><head><title>t</title></head><body><p>hello</p></body></html>",
            base_url: &base_url,
            flags: ArchiveFlags::NONE,
            initial_url: &base_url,
            labels: Vec::new(),
        };

        let output = archive(client, tx, request).await;
        assert!(output.html.contains(r#"charset="utf-8""#));
        assert!(output.html.contains("Content-Security-Policy"));
        assert!(output.html.contains("<p>hello</p>"));
        assert!(output.resources.is_empty());
    }

    #[tokio::test]
    async fn fetches_and_stores_a_remote_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cat.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG".to_vec()).insert_header("content-type", "image/png"))
            .mount(&server)
            .await;

        let base_url = Url::parse(&server.uri()).unwrap();
        let client = Arc::new(SafeClient::new(Arc::new(ExtractorConfig::default())).unwrap());
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let drop = test_drop(&server.uri());

        let html = format!(r#"<html><body><img src="{}/cat.png"></body></html>"#, server.uri());
        let request = ArchiveRequest {
            drop: &drop,
            html: &html,
            base_url: &base_url,
            flags: ArchiveFlags::ENABLE_IMAGES,
            initial_url: &base_url,
            labels: Vec::new(),
        };

        let output = archive(client, tx, request).await;
        assert_eq!(output.resources.len(), 1);
        assert!(output.html.contains("./_resources/"));
        assert!(!output.html.contains(&server.uri()));
    }
}
