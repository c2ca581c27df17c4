//! Absolutizes every relative URL-bearing attribute in a freshly parsed DOM,
//! run once before any `Step::Dom` processor sees it (spec.md §8 invariant
//! 8 "no relative href/src remains after StepDom"). Grounded on the same
//! tag/attribute list the Archiver's own preparation pass uses, since both
//! stages face the same problem: a parsed document whose links are still
//! relative to the page that served it.

use readeck_dom::{absolutize, absolutize_srcset, Dom};
use url::Url;

pub fn fix_relative_uris(dom: &mut Dom, base_url: &Url) {
    let mut absolutize_attr = |dom: &mut Dom, id, attr: &str| {
        if let Some(value) = dom.attr(id, attr) {
            let resolved = absolutize(value, base_url);
            dom.set_attr(id, attr, &resolved);
        }
    };

    for id in dom.find_all_tags(&["a", "link"]) {
        absolutize_attr(dom, id, "href");
    }
    for id in dom.find_all_tags(&["script", "iframe", "embed", "source", "audio", "video"]) {
        absolutize_attr(dom, id, "src");
    }
    for id in dom.find_all_tags(&["object"]) {
        absolutize_attr(dom, id, "data");
    }
    for id in dom.find_all_tags(&["form"]) {
        absolutize_attr(dom, id, "action");
    }
    for id in dom.find_all_tags(&["img", "picture", "source"]) {
        absolutize_attr(dom, id, "src");
        absolutize_attr(dom, id, "poster");
        if let Some(srcset) = dom.attr(id, "srcset") {
            let rewritten = absolutize_srcset(srcset, base_url);
            dom.set_attr(id, "srcset", &rewritten);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_href_and_src_become_absolute() {
        let mut dom = Dom::parse(r#"<html><body><a href="/x">l</a><img src="y.png"></body></html>"#);
        let base = Url::parse("https://example.com/articles/").unwrap();
        fix_relative_uris(&mut dom, &base);
        let html = dom.to_html();
        assert!(html.contains("https://example.com/x"));
        assert!(html.contains("https://example.com/articles/y.png"));
    }
}
