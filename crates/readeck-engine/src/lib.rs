//! # readeck-engine
//!
//! The extraction state machine (spec.md §4.D): owns the `Drop` list for one
//! URL, drives the `Start → Body → Dom → Finish` loop per drop followed by
//! `PostProcess`/`Done`, and runs the registered `Processor` list at every
//! step. Ported from `pkg/extract/extract.go`'s `Extractor`/`Run`.
//!
//! This crate defines the `Processor` trait but implements none of the
//! standard ones — those live in `readeck-processors`, which depends on this
//! crate (not the other way around) so a caller assembles the two rather
//! than the engine hard-coding a fixed pipeline.

mod extractor;
mod message;
mod relative_uris;
mod uid;

pub use extractor::{Extractor, MAX_DROPS};
pub use message::{ephemeral_attr_prefix, transform_data_attributes, ProcessMessage, Processor, ProcessorOutcome, Step};
pub use relative_uris::fix_relative_uris;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use readeck_config::ExtractorConfig;
    use readeck_fetch::SafeClient;
    use std::sync::Arc;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct RecordTitle;
    #[async_trait]
    impl Processor for RecordTitle {
        fn name(&self) -> &'static str {
            "record-title"
        }
        async fn run(&self, msg: &mut ProcessMessage, extractor: &mut Extractor) -> ProcessorOutcome {
            if msg.step() == Step::Dom {
                if let Some(dom) = msg.dom.as_ref() {
                    if let Some(index) = usize::try_from(msg.position()).ok() {
                        if let Some(title_id) = dom.find_all_tags(&["title"]).into_iter().next() {
                            let title = dom.text_content(title_id);
                            if let Some(drop) = extractor.drop_at_mut(index) {
                                drop.title = title;
                            }
                        }
                    }
                }
            }
            ProcessorOutcome::Continue
        }
    }

    #[tokio::test]
    async fn run_fetches_the_page_and_invokes_processors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><head><title>Hello</title></head><body><p>hi</p></body></html>")
                    .insert_header("content-type", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let client = Arc::new(SafeClient::new(Arc::new(ExtractorConfig::default())).unwrap());
        let mut extractor = Extractor::new(Url::parse(&server.uri()).unwrap(), client);
        extractor.add_processors(vec![Box::new(RecordTitle) as Box<dyn Processor>]);

        extractor.run().await;

        assert_eq!(extractor.main_drop().unwrap().title, "Hello");
        assert!(extractor.html.contains("<p>hi</p>"));
        assert!(extractor.errors().is_empty());
    }

    #[tokio::test]
    async fn cycle_back_to_the_same_url_terminates_without_reprocessing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>x</body></html>").insert_header(
                "content-type",
                "text/html",
            ))
            .mount(&server)
            .await;

        let client = Arc::new(SafeClient::new(Arc::new(ExtractorConfig::default())).unwrap());
        let url = Url::parse(&server.uri()).unwrap();
        let mut extractor = Extractor::new(url.clone(), client);
        extractor.add_drop(url);

        extractor.run().await;
        assert_eq!(extractor.visited.len(), 1);
    }

    /// Simulates a page that always links to one more page, the way a
    /// paginated article's `next_page_selector` would discover pages
    /// forever if left unbounded.
    struct InfinitePaginator;
    #[async_trait]
    impl Processor for InfinitePaginator {
        fn name(&self) -> &'static str {
            "infinite-paginator"
        }
        async fn run(&self, msg: &mut ProcessMessage, extractor: &mut Extractor) -> ProcessorOutcome {
            if msg.step() == Step::Finish {
                let mut next = extractor.url.clone();
                next.set_path(&format!("/{}", extractor.drops().len()));
                extractor.add_drop(next);
            }
            ProcessorOutcome::Continue
        }
    }

    #[tokio::test]
    async fn unbounded_pagination_is_capped_at_max_drops() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body>x</body></html>")
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;

        let client = Arc::new(SafeClient::new(Arc::new(ExtractorConfig::default())).unwrap());
        let base = Url::parse(&server.uri()).unwrap();
        let mut extractor = Extractor::new(base, client);
        extractor.add_processors(vec![Box::new(InfinitePaginator) as Box<dyn Processor>]);

        extractor.run().await;
        assert_eq!(extractor.drops().len(), MAX_DROPS);
    }
}
