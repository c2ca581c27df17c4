//! Post-processing, steps 1-3 of spec.md §4.C, run once every subresource
//! has been resolved.

use readeck_dom::Dom;

use crate::flags::ArchiveFlags;
use crate::prepare::revert_converted_noscript;

pub fn postprocess(dom: &mut Dom, flags: ArchiveFlags) {
    revert_converted_noscript(dom);

    if !flags.contains(ArchiveFlags::ENABLE_DATA_ATTRIBUTES) {
        remove_data_attributes(dom);
    }

    set_lazy_images(dom);
}

fn remove_data_attributes(dom: &mut Dom) {
    for node in dom.descendant_elements(dom.root()) {
        let data_attrs: Vec<String> = dom
            .attrs(node)
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| name.starts_with("data-"))
            .collect();
        for name in data_attrs {
            dom.remove_attr(node, &name);
        }
    }
}

fn set_lazy_images(dom: &mut Dom) {
    for img in dom.find_all_tags(&["img"]) {
        dom.set_attr(img, "loading", "lazy");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_data_attributes_by_default() {
        let mut dom = Dom::parse(r#"<html><body><div data-foo="1" id="x"></div></body></html>"#);
        postprocess(&mut dom, ArchiveFlags::NONE);
        let html = dom.to_html();
        assert!(!html.contains("data-foo"));
        assert!(html.contains(r#"id="x""#));
    }

    #[test]
    fn keeps_data_attributes_when_flag_enabled() {
        let mut dom = Dom::parse(r#"<html><body><div data-foo="1"></div></body></html>"#);
        postprocess(&mut dom, ArchiveFlags::ENABLE_DATA_ATTRIBUTES);
        assert!(dom.to_html().contains("data-foo"));
    }

    #[test]
    fn every_img_gets_lazy_loading() {
        let mut dom = Dom::parse(r#"<html><body><img src="a.png"></body></html>"#);
        postprocess(&mut dom, ArchiveFlags::NONE);
        assert!(dom.to_html().contains(r#"loading="lazy""#));
    }
}
