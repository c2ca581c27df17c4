//! Lazy-image attribute canonicalization, ported from
//! `convertLazyImageAttrs` in `pkg/archiver/process_html.go`: collapse
//! `data-src`/`data-lazy-src`/etc. into real `src`/`srcset` so the archived
//! page renders without JavaScript.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::Dom;
use crate::node::NodeId;

static LAZY_IMAGE_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*\S+\.(jpg|jpeg|png|webp)\S*\s*$").unwrap());
static LAZY_IMAGE_SRCSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|webp)\s+\d").unwrap());
static IMG_EXTENSIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|webp)").unwrap());
static B64_DATA_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^data:\s*([^\s;,]+)\s*;\s*base64\s*").unwrap());

fn is_valid_url(value: &str) -> bool {
    url::Url::parse(value).is_ok() || value.starts_with('/')
}

/// Applies the lazy-image heuristic to every `img`/`picture`/`figure` node
/// in `dom`.
pub fn canonicalize_lazy_images(dom: &mut Dom) {
    for node in dom.find_all_tags(&["img", "picture", "figure"]) {
        canonicalize_one(dom, node);
    }
}

fn canonicalize_one(dom: &mut Dom, node: NodeId) {
    let tag = dom.tag_name(node).unwrap_or_default().to_string();
    let class = dom.class_name(node).to_lowercase();
    let mut src = dom.attr(node, "src").map(str::to_string);
    let srcset = dom.attr(node, "srcset").map(str::to_string);

    if let Some(value) = &src {
        if let Some(caps) = B64_DATA_URL.captures(value) {
            let mime = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            if mime != "image/svg+xml" {
                let other_attr_suggests_image = dom
                    .attrs(node)
                    .iter()
                    .filter(|(k, _)| k != "src")
                    .any(|(_, v)| IMG_EXTENSIONS.is_match(v) && is_valid_url(v));

                if other_attr_suggests_image {
                    let b64_start = value.find("base64").map(|i| i + 7).unwrap_or(value.len());
                    let b64_len = value.len().saturating_sub(b64_start);
                    if b64_len < 133 {
                        dom.remove_attr(node, "src");
                        src = None;
                    }
                }
            }
        }
    }

    let has_real_source = src.as_deref().is_some_and(|s| !s.is_empty())
        || srcset.as_deref().is_some_and(|s| !s.is_empty());
    if has_real_source && !class.contains("lazy") {
        return;
    }

    let candidates = dom.attrs(node);
    for (name, value) in candidates {
        if name == "src" || name == "srcset" {
            continue;
        }

        let copy_to = if LAZY_IMAGE_SRCSET.is_match(&value) {
            Some("srcset")
        } else if LAZY_IMAGE_SRC.is_match(&value) {
            Some("src")
        } else {
            None
        };

        let Some(copy_to) = copy_to else { continue };
        if !is_valid_url(&value) {
            continue;
        }

        let figure_has_image = tag == "figure"
            && dom
                .descendant_elements(node)
                .iter()
                .any(|id| matches!(dom.tag_name(*id), Some("img") | Some("picture")));

        if tag == "img" || tag == "picture" {
            dom.set_attr(node, copy_to, &value);
        } else if tag == "figure" && !figure_has_image {
            let img = dom.create_element("img");
            dom.set_attr(img, copy_to, &value);
            dom.append_child(node, img);
        }

        dom.remove_attr(node, &name);
    }
}
