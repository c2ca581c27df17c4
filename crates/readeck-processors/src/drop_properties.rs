//! `SetDropProperties` (spec.md §4.F item 5): derives `DocumentType`, `Site`
//! and the primary `Date` once `ExtractOembed` has had a chance to populate
//! `oembed.*` properties.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use readeck_dom::Dom;
use readeck_engine::{Extractor, ProcessMessage, Processor, ProcessorOutcome, Step};
use readeck_types::DocumentType;

pub struct SetDropProperties;

#[async_trait]
impl Processor for SetDropProperties {
    fn name(&self) -> &'static str {
        "set-drop-properties"
    }

    async fn run(&self, msg: &mut ProcessMessage, extractor: &mut Extractor) -> ProcessorOutcome {
        if msg.step() != Step::Dom {
            return ProcessorOutcome::Continue;
        }
        let Ok(index) = usize::try_from(msg.position().max(0)) else {
            return ProcessorOutcome::Continue;
        };
        let dom = msg.dom.as_ref();
        let graph_type = dom.and_then(meta_content("property", "og:type"));
        let site_name = dom.and_then(meta_content("property", "og:site_name"));
        let date_text = dom.and_then(find_date);

        let Some(drop) = extractor.drop_at_mut(index) else {
            return ProcessorOutcome::Continue;
        };

        let oembed_type = drop.properties.get("oembed.type").cloned();
        drop.document_type = match oembed_type.as_deref() {
            Some("video") => DocumentType::Video,
            Some("photo") => DocumentType::Photo,
            _ if graph_type.as_deref().is_some_and(|t| t.starts_with("video.")) => DocumentType::Video,
            _ => DocumentType::Article,
        };

        if let Some(host) = drop.url.host_str() {
            drop.domain = Some(host.to_string());
        }
        drop.site = site_name.or_else(|| drop.domain.clone());

        if let Some(date) = date_text.and_then(|text| parse_date(&text)) {
            drop.date = Some(date);
        }

        readeck_siteconfig::promote_document_type_from_site_config(drop);

        ProcessorOutcome::Continue
    }
}

fn meta_content<'a>(attr: &'a str, value: &'a str) -> impl Fn(&Dom) -> Option<String> + 'a {
    move |dom: &Dom| {
        dom.find_all_tags(&["meta"])
            .into_iter()
            .find(|&id| dom.attr(id, attr) == Some(value))
            .and_then(|id| dom.attr(id, "content"))
            .map(str::to_string)
    }
}

fn find_date(dom: &Dom) -> Option<String> {
    meta_content("property", "article:published_time")(dom)
        .or_else(|| meta_content("name", "date")(dom))
        .or_else(|| json_ld_date(dom))
}

fn json_ld_date(dom: &Dom) -> Option<String> {
    dom.find_all_tags(&["script"]).into_iter().find_map(|id| {
        if dom.attr(id, "type") != Some("application/ld+json") {
            return None;
        }
        let value: serde_json::Value = serde_json::from_str(&dom.text_content(id)).ok()?;
        value.get("datePublished").and_then(|v| v.as_str()).map(str::to_string)
    })
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use readeck_fetch::SafeClient;
    use std::sync::Arc;
    use url::Url;

    fn extractor() -> Extractor {
        let client = Arc::new(SafeClient::new(Arc::new(readeck_config::ExtractorConfig::default())).unwrap());
        Extractor::new(Url::parse("https://blog.example.com/post").unwrap(), client)
    }

    #[tokio::test]
    async fn oembed_video_type_overrides_default_article() {
        let mut extractor = extractor();
        extractor.drop_at_mut(0).unwrap().properties.insert("oembed.type".into(), "video".into());
        let mut msg = ProcessMessage::new(Step::Dom, 100);
        msg.dom = Some(Dom::parse("<html></html>"));

        SetDropProperties.run(&mut msg, &mut extractor).await;
        assert_eq!(extractor.drop_at(0).unwrap().document_type, DocumentType::Video);
    }

    #[tokio::test]
    async fn site_falls_back_to_domain_without_og_site_name() {
        let mut extractor = extractor();
        let mut msg = ProcessMessage::new(Step::Dom, 100);
        msg.dom = Some(Dom::parse("<html></html>"));

        SetDropProperties.run(&mut msg, &mut extractor).await;
        let drop = extractor.drop_at(0).unwrap();
        assert_eq!(drop.domain.as_deref(), Some("blog.example.com"));
        assert_eq!(drop.site.as_deref(), Some("blog.example.com"));
    }

    #[tokio::test]
    async fn published_time_meta_sets_date() {
        let mut extractor = extractor();
        let mut msg = ProcessMessage::new(Step::Dom, 100);
        msg.dom = Some(Dom::parse(
            r#"<html><head><meta property="article:published_time" content="2024-03-05T12:00:00Z"></head></html>"#,
        ));

        SetDropProperties.run(&mut msg, &mut extractor).await;
        assert!(extractor.drop_at(0).unwrap().date.is_some());
    }
}
