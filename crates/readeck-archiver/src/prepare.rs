//! DOM preparation, steps 1-8 of the Archiver's pipeline (spec.md §4.C),
//! run before any subresource is fetched.

use readeck_dom::{absolutize, absolutize_srcset, canonicalize_lazy_images, Dom, NodeId};
use url::Url;

use crate::flags::ArchiveFlags;

const NOSCRIPT_MARKER: &str = "data-obelisk-noscript";

pub fn prepare(dom: &mut Dom, base_url: &Url, flags: ArchiveFlags) {
    set_charset(dom);
    set_content_security_policy(dom, flags);
    apply_flags(dom, flags);
    convert_noscript_to_div(dom, true);
    remove_comments(dom);
    canonicalize_lazy_images(dom);
    convert_relative_urls(dom, base_url);
    remove_link_integrity_attrs(dom);
}

fn head_node(dom: &mut Dom) -> NodeId {
    if let Some(head) = dom.find_all_tags(&["head"]).into_iter().next() {
        return head;
    }
    let head = dom.create_element("head");
    dom.prepend_child(dom.root(), head);
    head
}

fn set_charset(dom: &mut Dom) {
    let head = head_node(dom);
    for meta in dom.find_all_tags(&["meta"]) {
        if dom.has_attr(meta, "charset") {
            dom.set_attr(meta, "charset", "utf-8");
            return;
        }
    }
    let meta = dom.create_element("meta");
    dom.set_attr(meta, "charset", "utf-8");
    dom.append_child(head, meta);
}

fn set_content_security_policy(dom: &mut Dom, flags: ArchiveFlags) {
    for meta in dom.find_all_tags(&["meta"]) {
        if dom.attr(meta, "http-equiv") == Some("Content-Security-Policy") {
            dom.remove(meta);
        }
    }

    let mut policies = vec![
        "default-src 'self' 'unsafe-inline' data:;".to_string(),
        "connect-src 'none';".to_string(),
    ];
    if !flags.contains(ArchiveFlags::ENABLE_JS) {
        policies.push("script-src 'none';".to_string());
    }
    if !flags.contains(ArchiveFlags::ENABLE_CSS) {
        policies.push("style-src 'none';".to_string());
    }
    if !flags.contains(ArchiveFlags::ENABLE_EMBEDS) {
        policies.push("frame-src 'none'; child-src 'none';".to_string());
    }
    if !flags.contains(ArchiveFlags::ENABLE_IMAGES) {
        policies.push("image-src 'none';".to_string());
    }
    if !flags.contains(ArchiveFlags::ENABLE_MEDIA) {
        policies.push("media-src 'none';".to_string());
    }

    let head = head_node(dom);
    for policy in policies.into_iter().rev() {
        let meta = dom.create_element("meta");
        dom.set_attr(meta, "http-equiv", "Content-Security-Policy");
        dom.set_attr(meta, "content", &policy);
        dom.prepend_child(head, meta);
    }
}

fn apply_flags(dom: &mut Dom, flags: ArchiveFlags) {
    if !flags.contains(ArchiveFlags::ENABLE_JS) {
        for script in dom.find_all_tags(&["script"]) {
            dom.remove(script);
        }
        for a in dom.find_all_tags(&["a"]) {
            if dom.attr(a, "href").is_some_and(|href| href.starts_with("javascript:")) {
                dom.set_attr(a, "href", "#");
            }
        }
        convert_noscript_to_div(dom, false);
    }

    if !flags.contains(ArchiveFlags::ENABLE_CSS) {
        for style in dom.find_all_tags(&["style"]) {
            dom.remove(style);
        }
        for node in dom.descendant_elements(dom.root()) {
            dom.remove_attr(node, "style");
        }
        for link in dom.find_all_tags(&["link"]) {
            if dom.attr(link, "rel") == Some("stylesheet") {
                dom.remove(link);
            }
        }
    }

    if !flags.contains(ArchiveFlags::ENABLE_EMBEDS) {
        for node in dom.find_all_tags(&["object", "embed", "iframe"]) {
            dom.remove(node);
        }
    }

    if !flags.contains(ArchiveFlags::ENABLE_IMAGES) {
        for node in dom.find_all_tags(&["img", "picture"]) {
            dom.remove(node);
        }
    }

    if !flags.contains(ArchiveFlags::ENABLE_MEDIA) {
        for node in dom.find_all_tags(&["video", "audio", "source"]) {
            dom.remove(node);
        }
    }
}

/// Converts `<noscript>` into a marked `<div>` so its content gets the same
/// treatment (lazy-image canonicalization, URL absolutization, ...) as the
/// rest of the document; `revert_converted_noscript` undoes this afterwards.
/// With scripting disabled (the parser's default), a document's `<noscript>`
/// content is already parsed as ordinary child markup, so this only needs
/// to re-parent those children under a plain `<div>`.
fn convert_noscript_to_div(dom: &mut Dom, mark_new_div: bool) {
    for noscript in dom.find_all_tags(&["noscript"]) {
        let div = dom.create_element("div");
        if mark_new_div {
            dom.set_attr(div, NOSCRIPT_MARKER, "true");
        }
        dom.move_children(noscript, div);
        dom.replace(noscript, div);
    }
}

fn remove_comments(dom: &mut Dom) {
    for comment in dom.all_comments() {
        dom.remove(comment);
    }
}

fn convert_relative_urls(dom: &mut Dom, base_url: &Url) {
    let mut absolutize_attr = |dom: &mut Dom, id: NodeId, attr: &str| {
        if let Some(value) = dom.attr(id, attr) {
            let resolved = absolutize(value, base_url);
            dom.set_attr(id, attr, &resolved);
        }
    };

    for a in dom.find_all_tags(&["a"]) {
        absolutize_attr(dom, a, "href");
    }
    for link in dom.find_all_tags(&["link"]) {
        absolutize_attr(dom, link, "href");
    }
    for embed in dom.find_all_tags(&["embed"]) {
        absolutize_attr(dom, embed, "src");
    }
    for script in dom.find_all_tags(&["script"]) {
        absolutize_attr(dom, script, "src");
    }
    for iframe in dom.find_all_tags(&["iframe"]) {
        absolutize_attr(dom, iframe, "src");
    }
    for object in dom.find_all_tags(&["object"]) {
        absolutize_attr(dom, object, "data");
    }

    for media in dom.find_all_tags(&["img", "picture", "figure", "video", "audio", "source"]) {
        absolutize_attr(dom, media, "src");
        absolutize_attr(dom, media, "poster");
        if let Some(srcset) = dom.attr(media, "srcset") {
            let rewritten = absolutize_srcset(srcset, base_url);
            dom.set_attr(media, "srcset", &rewritten);
        }
    }
}

fn remove_link_integrity_attrs(dom: &mut Dom) {
    for link in dom.find_all_tags(&["link"]) {
        dom.remove_attr(link, "integrity");
    }
}

/// Reverts `convert_noscript_to_div`'s markers, run once every subresource
/// has been processed. Mirrors the forward conversion by re-parenting the
/// div's children rather than round-tripping through a text node, so the
/// restored `<noscript>` keeps real child elements instead of escaped markup.
pub fn revert_converted_noscript(dom: &mut Dom) {
    for div in dom.find_all_tags(&["div"]) {
        if dom.attr(div, NOSCRIPT_MARKER) != Some("true") {
            continue;
        }
        let noscript = dom.create_element("noscript");
        dom.move_children(div, noscript);
        dom.replace(div, noscript);
    }
}
