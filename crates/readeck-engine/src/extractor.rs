//! The `Extractor`: owns the drop list and the HTTP client for one
//! extraction run, and drives the `Step::Start → Body → Dom → Finish` loop
//! per drop, followed by `PostProcess` and `Done` (spec.md §4.D, ported
//! from `pkg/extract/extract.go`'s `Run`).

use std::sync::Arc;

use readeck_dom::Dom;
use readeck_fetch::SafeClient;
use readeck_types::{Drop, FetchError, UrlList};
use reqwest::header::HeaderMap;
use url::Url;

use crate::message::{transform_data_attributes, Processor, ProcessMessage, Step};
use crate::relative_uris::fix_relative_uris;

/// More than this many discovered pages cancels the run with "too many
/// pages" (spec.md §8 invariant 3).
pub const MAX_DROPS: usize = 100;

pub struct Extractor {
    pub url: Url,
    pub visited: UrlList,
    logs: Vec<String>,
    errors: Vec<String>,
    drops: Vec<Drop>,
    unique_id: String,
    client: Arc<SafeClient>,
    processors: Vec<Box<dyn Processor>>,
    pub html: String,
}

impl Extractor {
    pub fn new(mut url: Url, client: Arc<SafeClient>) -> Self {
        url.set_fragment(None);
        Self {
            url: url.clone(),
            visited: UrlList::new(),
            logs: Vec::new(),
            errors: Vec::new(),
            drops: vec![Drop::new(url)],
            unique_id: crate::uid::generate(),
            client,
            processors: Vec::new(),
            html: String::new(),
        }
    }

    pub fn add_processors(&mut self, processors: impl IntoIterator<Item = Box<dyn Processor>>) {
        self.processors.extend(processors);
    }

    pub fn drops(&self) -> &[Drop] {
        &self.drops
    }

    pub fn drop_at(&self, index: usize) -> Option<&Drop> {
        self.drops.get(index)
    }

    pub fn drop_at_mut(&mut self, index: usize) -> Option<&mut Drop> {
        self.drops.get_mut(index)
    }

    /// The extraction's first (and usually only) `Drop`.
    pub fn main_drop(&self) -> Option<&Drop> {
        self.drops.first()
    }

    /// Appends a newly discovered page, as `GoToNextPage` does when a site
    /// config or `Readability` pagination link is found.
    pub fn add_drop(&mut self, url: Url) {
        self.drops.push(Drop::new(url));
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Exposes the shared HTTP client so processors (favicon/picture/oembed
    /// fetches, the final `Archive` step) can fetch through the same
    /// SSRF-guarded, cache-backed client the main loop uses, rather than
    /// each standing up its own.
    pub fn client(&self) -> Arc<SafeClient> {
        Arc::clone(&self.client)
    }

    /// Starts the extraction. Runs to completion synchronously over
    /// `self.drops`, growing the list as pagination processors discover
    /// more pages, bounded by `MAX_DROPS` and the reset counter.
    pub async fn run(&mut self) {
        let mut msg = ProcessMessage::new(Step::Start, MAX_DROPS);
        let mut fatal = false;
        let mut i = 0usize;

        'main: while i < self.drops.len() {
            let url = self.drops[i].url.clone();
            if self.visited.is_present(&url) {
                i += 1;
                continue;
            }
            self.visited.add(&url);

            if self.drops.len() >= msg.max_drops() {
                msg.cancel("too many pages");
            }
            msg.position = i as i64;

            msg.step = Step::Start;
            self.run_processors(&mut msg).await;
            if msg.is_canceled() {
                break 'main;
            }

            if let Err(err) = self.load_drop(i).await {
                self.add_error(format!("cannot load resource: {err}"));
                fatal = true;
                break 'main;
            }

            msg.step = Step::Body;
            self.run_processors(&mut msg).await;
            if msg.is_canceled() {
                break 'main;
            }

            if self.drops[i].is_html() {
                let base_url = self.drops[i].url.clone();
                let html = String::from_utf8_lossy(&self.drops[i].body).into_owned();
                let mut dom = Dom::parse(&html);
                fix_relative_uris(&mut dom, &base_url);

                msg.step = Step::Dom;
                msg.dom = Some(dom);
                self.run_processors(&mut msg).await;

                if msg.is_canceled() {
                    msg.dom = None;
                    break 'main;
                }

                if let Some(dom) = msg.dom.as_mut() {
                    transform_data_attributes(dom, &self.unique_id);
                }
                if let Some(dom) = msg.dom.take() {
                    if let Some(drop) = self.drops.get_mut(i) {
                        drop.body = dom.to_html().into_bytes();
                    }
                }
            }

            msg.step = Step::Finish;
            self.run_processors(&mut msg).await;
            if msg.is_canceled() {
                break 'main;
            }

            i = (msg.position + 1).max(0) as usize;
        }

        if !msg.is_canceled() && !fatal {
            msg.step = Step::PostProcess;
            self.set_final_html();
            self.run_processors(&mut msg).await;
        }

        msg.step = Step::Done;
        self.run_processors(&mut msg).await;
    }

    async fn run_processors(&mut self, msg: &mut ProcessMessage) {
        let processors = std::mem::take(&mut self.processors);
        for processor in &processors {
            let outcome = processor.run(msg, self).await;
            if outcome == crate::message::ProcessorOutcome::Halt {
                break;
            }
        }
        self.processors = processors;
    }

    async fn load_drop(&mut self, index: usize) -> Result<(), FetchError> {
        let url = self.drops[index].url.clone();
        let response = self.client.fetch(&url, HeaderMap::new()).await?;
        let content_type_header = response
            .headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream");
        let (content_type, charset) = split_content_type(content_type_header);

        let drop = &mut self.drops[index];
        drop.url = response.final_url;
        drop.content_type = content_type;
        drop.charset = charset;
        drop.body = response.body.to_vec();
        Ok(())
    }

    /// Concatenates every non-empty drop body into the final document,
    /// separated by an HTML comment naming the page, matching
    /// `setFinalHTML`.
    fn set_final_html(&mut self) {
        let mut out = String::new();
        for (i, drop) in self.drops.iter().enumerate() {
            if drop.body.is_empty() {
                continue;
            }
            out.push_str(&format!("<!-- page {} -->\n", i + 1));
            out.push_str(&String::from_utf8_lossy(&drop.body));
            out.push('\n');
        }
        self.html = out;
    }
}

fn split_content_type(header: &str) -> (String, Option<String>) {
    let mut parts = header.split(';');
    let content_type = parts.next().unwrap_or_default().trim().to_string();
    let charset = parts
        .find_map(|part| part.trim().strip_prefix("charset=").map(|c| c.trim_matches('"').to_string()));
    (content_type, charset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_charset_out_of_content_type() {
        let (ct, charset) = split_content_type("text/html; charset=iso-8859-1");
        assert_eq!(ct, "text/html");
        assert_eq!(charset, Some("iso-8859-1".to_string()));
    }

    #[test]
    fn content_type_without_charset_has_none() {
        let (ct, charset) = split_content_type("image/png");
        assert_eq!(ct, "image/png");
        assert_eq!(charset, None);
    }
}
