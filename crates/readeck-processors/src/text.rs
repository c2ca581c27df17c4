//! `Text` (spec.md §4.F item 14): renders the narrowed content down to
//! plain text for search indexing, stored under `Drop.properties["text"]`
//! since `Drop` has no dedicated text field.

use readeck_dom::{Dom, NodeId};
use readeck_engine::{Extractor, ProcessMessage, Processor, ProcessorOutcome, Step};

const BLOCK_TAGS: &[&str] =
    &["p", "li", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "td", "th", "figcaption"];

pub struct Text;

#[async_trait::async_trait]
impl Processor for Text {
    fn name(&self) -> &'static str {
        "text"
    }

    async fn run(&self, msg: &mut ProcessMessage, extractor: &mut Extractor) -> ProcessorOutcome {
        if msg.step() != Step::Dom {
            return ProcessorOutcome::Continue;
        }
        let Ok(index) = usize::try_from(msg.position().max(0)) else {
            return ProcessorOutcome::Continue;
        };
        let Some(dom) = msg.dom.as_ref() else {
            return ProcessorOutcome::Continue;
        };
        let text = render_text(dom);
        if let Some(drop) = extractor.drop_at_mut(index) {
            drop.properties.insert("text".to_string(), text);
        }
        ProcessorOutcome::Continue
    }
}

fn render_text(dom: &Dom) -> String {
    let Some(body) = dom.find_all_tags(&["body"]).into_iter().next() else {
        return String::new();
    };
    let mut blocks = Vec::new();
    collect_blocks(dom, body, &mut blocks);
    if blocks.is_empty() {
        return normalize_whitespace(&dom.text_content(body));
    }
    blocks.join("\n\n")
}

/// Walks document order, taking the whole text of a block-level element in
/// one go rather than descending into it — otherwise a `<blockquote>`
/// wrapping a `<p>` would contribute its text twice.
fn collect_blocks(dom: &Dom, id: NodeId, blocks: &mut Vec<String>) {
    if let Some(tag) = dom.tag_name(id) {
        if BLOCK_TAGS.contains(&tag) {
            let text = normalize_whitespace(&dom.text_content(id));
            if !text.is_empty() {
                blocks.push(text);
            }
            return;
        }
    }
    for child in dom.children(id) {
        collect_blocks(dom, child, blocks);
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_become_blank_line_separated_blocks() {
        let dom = Dom::parse(
            r#"<html><body><p>First   paragraph.</p><p>Second
            paragraph.</p></body></html>"#,
        );
        assert_eq!(render_text(&dom), "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn nested_blockquote_paragraph_is_not_duplicated() {
        let dom = Dom::parse(r#"<html><body><blockquote><p>Quoted text.</p></blockquote></body></html>"#);
        assert_eq!(render_text(&dom), "Quoted text.");
    }

    #[test]
    fn body_with_no_block_tags_falls_back_to_whole_text() {
        let dom = Dom::parse(r#"<html><body><span>just a span</span></body></html>"#);
        assert_eq!(render_text(&dom), "just a span");
    }
}
