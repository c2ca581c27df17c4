//! `ExtractPicture` (spec.md §4.F item 7): fetches the best header image and
//! produces `image` and `thumbnail` (fit 380px) variants, stored on
//! `Drop.pictures`.

use async_trait::async_trait;
use readeck_dom::Dom;
use readeck_engine::{Extractor, ProcessMessage, Processor, ProcessorOutcome, Step};
use readeck_image::Picture as ImagePipeline;
use readeck_types::Picture;
use reqwest::header::HeaderMap;

const THUMBNAIL_MAX: u32 = 380;

pub struct ExtractPicture;

#[async_trait]
impl Processor for ExtractPicture {
    fn name(&self) -> &'static str {
        "extract-picture"
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

        let oembed_url = extractor
            .drop_at(index)
            .filter(|d| d.properties.get("oembed.type").map(String::as_str) == Some("photo"))
            .and_then(|d| d.properties.get("oembed.url").cloned());

        let candidate = oembed_url
            .or_else(|| msg.dom.as_ref().and_then(header_image_href))
            .and_then(|href| base_url.join(&href).ok());

        let Some(url) = candidate else {
            return ProcessorOutcome::Continue;
        };

        let client = extractor.client();
        let response = match client.fetch(&url, HeaderMap::new()).await {
            Ok(response) => response,
            Err(err) => {
                extractor.log(format!("picture fetch failed for {url}: {err}"));
                return ProcessorOutcome::Continue;
            }
        };
        let content_type = response
            .headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .split(';')
            .next()
            .unwrap_or_default()
            .to_string();

        let Ok(full) = ImagePipeline::decode(&content_type, &response.body) else {
            return ProcessorOutcome::Continue;
        };
        let (full_width, full_height) = (full.width(), full.height());

        let mut thumbnail = match ImagePipeline::decode(&content_type, &response.body) {
            Ok(pic) => pic,
            Err(_) => return ProcessorOutcome::Continue,
        };
        if thumbnail.fit(THUMBNAIL_MAX, THUMBNAIL_MAX).is_err() {
            return ProcessorOutcome::Continue;
        }
        let Ok(thumbnail_bytes) = thumbnail.encode() else {
            return ProcessorOutcome::Continue;
        };

        if let Some(drop) = extractor.drop_at_mut(index) {
            drop.pictures.insert(
                "image".to_string(),
                Picture::new(url.clone(), content_type.clone(), response.body.to_vec(), full_width, full_height),
            );
            drop.pictures.insert(
                "thumbnail".to_string(),
                Picture::new(url, content_type, thumbnail_bytes, thumbnail.width(), thumbnail.height()),
            );
        }

        ProcessorOutcome::Continue
    }
}

fn header_image_href(dom: &Dom) -> Option<String> {
    meta_content(dom, "property", "og:image").or_else(|| meta_content(dom, "name", "twitter:image"))
}

fn meta_content(dom: &Dom, attr: &str, value: &str) -> Option<String> {
    dom.find_all_tags(&["meta"])
        .into_iter()
        .find(|&id| dom.attr(id, attr) == Some(value))
        .and_then(|id| dom.attr(id, "content"))
        .map(str::to_string)
}
