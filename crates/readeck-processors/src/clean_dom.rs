//! `CleanDom` (spec.md §4.F item 13): a final defense-in-depth pass over the
//! narrowed content — strips any script-ish element that survived, strips
//! event-handler/`style`/`javascript:` attributes, and unifies headings so
//! the archived body never competes with `Drop.title` for the page's `h1`.

use async_trait::async_trait;
use readeck_dom::Dom;
use readeck_engine::{Extractor, ProcessMessage, Processor, ProcessorOutcome, Step};

const SCRIPT_TAGS: &[&str] = &["script", "noscript", "style"];

pub struct CleanDom;

#[async_trait]
impl Processor for CleanDom {
    fn name(&self) -> &'static str {
        "clean-dom"
    }

    async fn run(&self, msg: &mut ProcessMessage, _extractor: &mut Extractor) -> ProcessorOutcome {
        if msg.step() != Step::Dom {
            return ProcessorOutcome::Continue;
        }
        let Some(dom) = msg.dom.as_mut() else {
            return ProcessorOutcome::Continue;
        };
        clean(dom);
        ProcessorOutcome::Continue
    }
}

fn clean(dom: &mut Dom) {
    for id in dom.find_all_tags(SCRIPT_TAGS) {
        dom.remove(id);
    }
    strip_dangerous_attrs(dom);
    unify_headings(dom);
}

fn strip_dangerous_attrs(dom: &mut Dom) {
    for id in dom.descendant_elements(dom.root()) {
        for (name, value) in dom.attrs(id) {
            let lname = name.to_ascii_lowercase();
            let is_handler = lname.starts_with("on") || lname == "style";
            let is_js_uri = matches!(lname.as_str(), "href" | "src")
                && value.trim_start().to_ascii_lowercase().starts_with("javascript:");
            if is_handler || is_js_uri {
                dom.remove_attr(id, &name);
            }
        }
    }
}

/// Demotes every `<h1>` in the content to `<h2>` — `Drop.title` already
/// stands in as the document's single top-level heading.
fn unify_headings(dom: &mut Dom) {
    for h1 in dom.find_all_tags(&["h1"]) {
        let attrs = dom.attrs(h1);
        let h2 = dom.create_element("h2");
        for (name, value) in attrs {
            dom.set_attr(h2, &name, &value);
        }
        dom.move_children(h1, h2);
        dom.replace(h1, h2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_event_handlers_and_javascript_uris() {
        let mut dom = Dom::parse(
            r#"<html><body><a href="javascript:alert(1)" onclick="evil()">click</a><div style="color:red">x</div></body></html>"#,
        );
        clean(&mut dom);
        let html = dom.to_html();
        assert!(!html.contains("onclick"));
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("style="));
    }

    #[test]
    fn h1_is_demoted_to_h2_with_attrs_and_content_preserved() {
        let mut dom = Dom::parse(r#"<html><body><h1 class="title">Headline</h1></body></html>"#);
        clean(&mut dom);
        let html = dom.to_html();
        assert!(!html.contains("<h1"));
        assert!(html.contains(r#"<h2 class="title">Headline</h2>"#));
    }

    #[test]
    fn lingering_script_tags_are_removed() {
        let mut dom = Dom::parse(r#"<html><body><script>evil()</script><p>ok</p></body></html>"#);
        clean(&mut dom);
        let html = dom.to_html();
        assert!(!html.contains("evil()"));
        assert!(html.contains("ok"));
    }
}
