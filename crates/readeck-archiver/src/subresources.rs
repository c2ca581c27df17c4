//! Concurrent subresource fetch/rewrite (spec.md §4.C "Subresource
//! processing"): one future per rewriteable node, joined before
//! post-processing continues. Each task only reads the document (to pull
//! the attribute values it needs) and produces a plain [`NodeUpdate`]; the
//! updates are applied back onto the `Dom` sequentially afterwards, so the
//! tree itself is never touched from more than one place at a time.

use std::sync::Arc;

use readeck_dom::{Dom, NodeId};
use readeck_fetch::SafeClient;
use reqwest::header::HeaderMap;
use tokio::task::JoinSet;
use url::Url;

use crate::css::{find_urls, rewrite_urls};
use crate::events::{ArchiveEvent, ArchiveEventSender};
use crate::resources::ResourceStore;

const SRCSET_URL: &str = r"(\S+)(\s+[\d.]+[xw])?(\s*(?:,|$))";

/// Why a subresource wasn't fetched. `Skipped` covers URLs that were never
/// meant to go over the network (`data:` URIs, empty attributes); `Failed`
/// covers everything the event channel should surface (spec.md §4.C:
/// "Fetch failures other than errSkippedURL are reported via an event
/// channel").
enum FetchOutcome {
    Skipped,
    Failed(String),
}

enum NodeUpdate {
    SetAttr { id: NodeId, name: &'static str, value: String },
    RemoveAttr { id: NodeId, name: &'static str },
    TextContent { id: NodeId, text: String },
    ConvertLinkToStyle { id: NodeId, css: String },
}

pub async fn process(
    dom: &mut Dom,
    client: &Arc<SafeClient>,
    base_url: &Url,
    events: &ArchiveEventSender,
    resources: &Arc<ResourceStore>,
) {
    let jobs = collect_jobs(dom);
    let mut joins = JoinSet::new();

    for job in jobs {
        let client = Arc::clone(client);
        let events = events.clone();
        let resources = Arc::clone(resources);
        let base_url = base_url.clone();
        joins.spawn(async move { run_job(job, &client, &base_url, &events, &resources).await });
    }

    let mut updates = Vec::new();
    while let Some(result) = joins.join_next().await {
        if let Ok(mut batch) = result {
            updates.append(&mut batch);
        }
    }

    for update in updates {
        apply(dom, update);
    }
}

enum Job {
    StyleAttr { id: NodeId, css: String },
    StyleNode { id: NodeId, css: String },
    Icon { id: NodeId, href: String },
    Stylesheet { id: NodeId, href: String },
    Script { id: NodeId, src: String },
    Embed { id: NodeId, attr: &'static str, url: String },
    Media { id: NodeId, src: Option<String>, poster: Option<String>, srcset: Option<String> },
}

fn collect_jobs(dom: &Dom) -> Vec<Job> {
    let mut jobs = Vec::new();

    for node in dom.descendant_elements(dom.root()) {
        let tag = dom.tag_name(node).unwrap_or_default().to_string();

        if let Some(style) = dom.attr(node, "style").filter(|s| !s.trim().is_empty()) {
            jobs.push(Job::StyleAttr { id: node, css: style.to_string() });
        }

        match tag.as_str() {
            "style" => jobs.push(Job::StyleNode { id: node, css: dom.text_content(node) }),
            "link" => {
                let rel = dom.attr(node, "rel").unwrap_or_default();
                if let Some(href) = dom.attr(node, "href") {
                    if rel.contains("icon") {
                        jobs.push(Job::Icon { id: node, href: href.to_string() });
                    } else if rel.contains("stylesheet") {
                        jobs.push(Job::Stylesheet { id: node, href: href.to_string() });
                    }
                }
            }
            "script" => {
                if let Some(src) = dom.attr(node, "src") {
                    jobs.push(Job::Script { id: node, src: src.to_string() });
                }
            }
            "object" | "embed" | "iframe" => {
                let attr_name = if tag == "object" { "data" } else { "src" };
                if let Some(url) = dom.attr(node, attr_name) {
                    jobs.push(Job::Embed { id: node, attr: attr_name, url: url.to_string() });
                }
            }
            "img" | "picture" | "figure" | "video" | "audio" | "source" => {
                let src = dom.attr(node, "src").map(str::to_string);
                let poster = dom.attr(node, "poster").map(str::to_string);
                let srcset = dom.attr(node, "srcset").map(str::to_string);
                if src.is_some() || poster.is_some() || srcset.is_some() {
                    jobs.push(Job::Media { id: node, src, poster, srcset });
                }
            }
            _ => {}
        }
    }

    jobs
}

async fn run_job(
    job: Job,
    client: &SafeClient,
    base_url: &Url,
    events: &ArchiveEventSender,
    resources: &ResourceStore,
) -> Vec<NodeUpdate> {
    match job {
        Job::StyleAttr { id, css } => {
            let rewritten = rewrite_css(&css, client, base_url, events, resources).await;
            vec![NodeUpdate::SetAttr { id, name: "style", value: rewritten }]
        }
        Job::StyleNode { id, css } => {
            let rewritten = rewrite_css(&css, client, base_url, events, resources).await;
            vec![NodeUpdate::TextContent { id, text: rewritten }]
        }
        Job::Icon { id, href } => match fetch_and_store(client, base_url, &href, None, resources).await {
            Ok(path) => vec![NodeUpdate::SetAttr { id, name: "href", value: path }],
            Err(err) => {
                report(events, &href, err);
                Vec::new()
            }
        },
        Job::Stylesheet { id, href } => match fetch_raw(client, base_url, &href, None).await {
            Ok((bytes, _)) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                let rewritten = rewrite_css(&text, client, base_url, events, resources).await;
                vec![NodeUpdate::ConvertLinkToStyle { id, css: rewritten }]
            }
            Err(err) => {
                report(events, &href, err);
                Vec::new()
            }
        },
        Job::Script { id, src } => match fetch_raw(client, base_url, &src, None).await {
            Ok((bytes, _)) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                vec![
                    NodeUpdate::RemoveAttr { id, name: "src" },
                    NodeUpdate::TextContent { id, text },
                ]
            }
            Err(err) => {
                report(events, &src, err);
                Vec::new()
            }
        },
        Job::Embed { id, attr, url } => match fetch_and_store(client, base_url, &url, None, resources).await {
            Ok(path) => vec![NodeUpdate::SetAttr { id, name: attr, value: path }],
            Err(err) => {
                report(events, &url, err);
                Vec::new()
            }
        },
        Job::Media { id, src, poster, srcset } => {
            let mut updates = Vec::new();
            let accept = Some("image/webp,image/svg+xml,image/*,*/*;q=0.8");

            if let Some(src) = src {
                match fetch_and_store(client, base_url, &src, accept, resources).await {
                    Ok(path) => updates.push(NodeUpdate::SetAttr { id, name: "src", value: path }),
                    Err(err) => {
                        report(events, &src, err);
                        updates.push(NodeUpdate::RemoveAttr { id, name: "src" });
                    }
                }
            }

            if let Some(poster) = poster {
                match fetch_and_store(client, base_url, &poster, accept, resources).await {
                    Ok(path) => updates.push(NodeUpdate::SetAttr { id, name: "poster", value: path }),
                    Err(err) => {
                        report(events, &poster, err);
                        updates.push(NodeUpdate::RemoveAttr { id, name: "poster" });
                    }
                }
            }

            if let Some(srcset) = srcset {
                let rewritten = rewrite_srcset(&srcset, client, base_url, accept, events, resources).await;
                match rewritten {
                    Some(value) => updates.push(NodeUpdate::SetAttr { id, name: "srcset", value }),
                    None => updates.push(NodeUpdate::RemoveAttr { id, name: "srcset" }),
                }
            }

            updates
        }
    }
}

async fn rewrite_css(
    css: &str,
    client: &SafeClient,
    base_url: &Url,
    events: &ArchiveEventSender,
    resources: &ResourceStore,
) -> String {
    let references = find_urls(css);
    let mut resolved = std::collections::HashMap::new();
    for reference in references {
        if resolved.contains_key(&reference) {
            continue;
        }
        match fetch_and_store(client, base_url, &reference, None, resources).await {
            Ok(path) => {
                resolved.insert(reference, path);
            }
            Err(err) => report(events, &reference, err),
        }
    }
    rewrite_urls(css, |original| resolved.get(original).cloned().unwrap_or_else(|| original.to_string()))
}

async fn rewrite_srcset(
    srcset: &str,
    client: &SafeClient,
    base_url: &Url,
    accept: Option<&str>,
    events: &ArchiveEventSender,
    resources: &ResourceStore,
) -> Option<String> {
    let re = regex::Regex::new(SRCSET_URL).unwrap();
    let mut parts = Vec::new();
    for caps in re.captures_iter(srcset) {
        let original = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let descriptor = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if original.is_empty() {
            continue;
        }
        match fetch_and_store(client, base_url, original, accept, resources).await {
            Ok(path) => parts.push(format!("{path}{descriptor}")),
            Err(err) => report(events, original, err),
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

async fn fetch_raw(
    client: &SafeClient,
    base_url: &Url,
    uri: &str,
    accept: Option<&str>,
) -> Result<(bytes::Bytes, String), FetchOutcome> {
    if uri.trim().is_empty() || uri.starts_with("data:") {
        return Err(FetchOutcome::Skipped);
    }
    let resolved = readeck_dom::absolutize(uri, base_url);
    let url = Url::parse(&resolved).map_err(|_| FetchOutcome::Skipped)?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(FetchOutcome::Skipped);
    }

    let mut headers = HeaderMap::new();
    if let Some(accept) = accept {
        if let Ok(value) = accept.parse() {
            headers.insert(reqwest::header::ACCEPT, value);
        }
    }

    let response = client
        .fetch(&url, headers)
        .await
        .map_err(|err| FetchOutcome::Failed(err.to_string()))?;

    let content_type = response
        .headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .split(';')
        .next()
        .unwrap_or("application/octet-stream")
        .trim()
        .to_string();

    Ok((response.body, content_type))
}

async fn fetch_and_store(
    client: &SafeClient,
    base_url: &Url,
    uri: &str,
    accept: Option<&str>,
    resources: &ResourceStore,
) -> Result<String, FetchOutcome> {
    let (bytes, content_type) = fetch_raw(client, base_url, uri, accept).await?;
    Ok(resources.store(uri, &content_type, bytes))
}

fn report(events: &ArchiveEventSender, uri: &str, outcome: FetchOutcome) {
    let message = match outcome {
        FetchOutcome::Skipped => return,
        FetchOutcome::Failed(message) => message,
    };
    tracing::debug!(uri, message, "subresource fetch failed, dropping the asset");
    let _ = events.send(ArchiveEvent::Error {
        uri: uri.to_string(),
        message,
    });
}

fn apply(dom: &mut Dom, update: NodeUpdate) {
    match update {
        NodeUpdate::SetAttr { id, name, value } => dom.set_attr(id, name, &value),
        NodeUpdate::RemoveAttr { id, name } => dom.remove_attr(id, name),
        NodeUpdate::TextContent { id, text } => dom.set_text_content(id, &text),
        NodeUpdate::ConvertLinkToStyle { id, css } => {
            // `<link>` is a void element, so the conversion to `<style>`
            // (which carries text content) creates a fresh node and swaps
            // it in, rather than mutating the link in place.
            let style = dom.create_element("style");
            dom.set_attr(style, "type", "text/css");
            dom.set_text_content(style, &css);
            dom.replace(id, style);
        }
    }
}
