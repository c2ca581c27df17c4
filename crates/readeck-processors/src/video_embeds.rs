//! `ConvertVideoEmbeds` (spec.md §4.F item 10), ported from
//! `pkg/extract/contents/video_embeds.go`: replaces a YouTube `<iframe>`
//! embed with a `<figure>` linking to the canonical watch URL, with a
//! thumbnail image and a figcaption link.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use readeck_dom::Dom;
use readeck_engine::{Extractor, ProcessMessage, Processor, ProcessorOutcome, Step};
use regex::Regex;

const YOUTUBE_HOSTS: &[&str] = &["www.youtube.com", "youtube.com", "www.youtube-nocookie.com"];

static EMBED_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/embed/([A-Za-z0-9_-]+)").unwrap());

pub struct ConvertVideoEmbeds;

#[async_trait]
impl Processor for ConvertVideoEmbeds {
    fn name(&self) -> &'static str {
        "convert-video-embeds"
    }

    async fn run(&self, msg: &mut ProcessMessage, extractor: &mut Extractor) -> ProcessorOutcome {
        if msg.step() != Step::Dom {
            return ProcessorOutcome::Continue;
        }
        let Some(dom) = msg.dom.as_mut() else {
            return ProcessorOutcome::Continue;
        };
        let prefix = readeck_engine::ephemeral_attr_prefix(extractor.unique_id());
        convert(dom, &prefix);
        ProcessorOutcome::Continue
    }
}

fn convert(dom: &mut Dom, ephemeral_prefix: &str) {
    for iframe in dom.find_all_tags(&["iframe"]) {
        let Some(src) = dom.attr(iframe, "src").map(str::to_string) else { continue };
        let Ok(mut src_url) = url::Url::parse(&src) else { continue };
        let Some(host) = src_url.host_str().map(str::to_string) else { continue };
        if !YOUTUBE_HOSTS.contains(&host.as_str()) {
            continue;
        }
        let Some(video_id) = EMBED_PATH.captures(src_url.path()).map(|c| c[1].to_string()) else { continue };

        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        let thumbnail_url = format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg");

        let _ = src_url.set_host(Some("www.youtube-nocookie.com"));

        let link = dom.create_element("a");
        dom.set_attr(link, "href", &watch_url);
        dom.set_attr(link, &format!("{ephemeral_prefix}video-iframe-src"), src_url.as_str());
        let img = dom.create_element("img");
        dom.set_attr(img, "alt", "YouTube video");
        dom.set_attr(img, "src", &thumbnail_url);
        dom.append_child(link, img);

        let caption_link = dom.create_element("a");
        dom.set_attr(caption_link, "href", &watch_url);
        dom.set_text_content(caption_link, &watch_url);
        let figcaption = dom.create_element("figcaption");
        dom.append_child(figcaption, caption_link);

        let figure = dom.create_element("figure");
        dom.append_child(figure, link);
        dom.append_child(figure, figcaption);

        dom.replace(iframe, figure);
    }
}
