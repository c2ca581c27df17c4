//! `ExtractOembed` (spec.md §4.F item 4): fetches the page's
//! `<link rel="alternate" type="application/json+oembed">` target, if any,
//! and merges its fields under the `oembed.*` namespace so `SetDropProperties`
//! and `ExtractPicture` can read them.

use async_trait::async_trait;
use readeck_engine::{Extractor, ProcessMessage, Processor, ProcessorOutcome, Step};
use reqwest::header::HeaderMap;

const OEMBED_REL: &str = "alternate";
const OEMBED_TYPE: &str = "application/json+oembed";

pub struct ExtractOembed;

#[async_trait]
impl Processor for ExtractOembed {
    fn name(&self) -> &'static str {
        "extract-oembed"
    }

    async fn run(&self, msg: &mut ProcessMessage, extractor: &mut Extractor) -> ProcessorOutcome {
        if msg.step() != Step::Dom {
            return ProcessorOutcome::Continue;
        }
        let Ok(index) = usize::try_from(msg.position().max(0)) else {
            return ProcessorOutcome::Continue;
        };

        let Some(href) = msg.dom.as_ref().and_then(oembed_link) else {
            return ProcessorOutcome::Continue;
        };
        let Ok(url) = url::Url::parse(&href) else {
            return ProcessorOutcome::Continue;
        };

        let client = extractor.client();
        let response = match client.fetch(&url, HeaderMap::new()).await {
            Ok(response) => response,
            Err(err) => {
                extractor.log(format!("oembed fetch failed for {url}: {err}"));
                return ProcessorOutcome::Continue;
            }
        };
        let Ok(value) = serde_json::from_slice::<serde_json::Value>(&response.body) else {
            return ProcessorOutcome::Continue;
        };
        let serde_json::Value::Object(fields) = value else {
            return ProcessorOutcome::Continue;
        };

        if let Some(drop) = extractor.drop_at_mut(index) {
            for (key, field_value) in fields {
                if let Some(text) = field_value.as_str() {
                    drop.properties.insert(format!("oembed.{key}"), text.to_string());
                } else {
                    drop.properties.insert(format!("oembed.{key}"), field_value.to_string());
                }
            }
        }

        ProcessorOutcome::Continue
    }
}

fn oembed_link(dom: &readeck_dom::Dom) -> Option<String> {
    dom.find_all_tags(&["link"]).into_iter().find_map(|id| {
        let rel = dom.attr(id, "rel")?;
        let kind = dom.attr(id, "type")?;
        if rel == OEMBED_REL && kind == OEMBED_TYPE {
            dom.attr(id, "href").map(str::to_string)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use readeck_dom::Dom;
    use readeck_engine::Step;
    use readeck_fetch::SafeClient;
    use std::sync::Arc;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn merges_oembed_fields_under_namespace() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oembed.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "type": "photo",
                "url": "https://example.com/cat.jpg",
            })))
            .mount(&server)
            .await;

        let client = Arc::new(SafeClient::new(Arc::new(readeck_config::ExtractorConfig::default())).unwrap());
        let mut extractor = Extractor::new(Url::parse(&server.uri()).unwrap(), client);

        let html = format!(
            r#"<html><head><link rel="alternate" type="application/json+oembed" href="{}/oembed.json"></head></html>"#,
            server.uri()
        );
        let mut msg = ProcessMessage::new(Step::Dom, 100);
        msg.dom = Some(Dom::parse(&html));

        ExtractOembed.run(&mut msg, &mut extractor).await;

        let drop = extractor.drop_at(0).unwrap();
        assert_eq!(drop.properties.get("oembed.type"), Some(&"photo".to_string()));
        assert_eq!(drop.properties.get("oembed.url"), Some(&"https://example.com/cat.jpg".to_string()));
    }
}
