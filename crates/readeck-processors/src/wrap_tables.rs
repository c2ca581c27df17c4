//! `WrapTables` (spec.md §4.F item 12), ported from
//! `pkg/extract/contents/wrap_tables.go`: wraps every bare `<table>` in a
//! `<figure>` so archived tables get the same scrollable/captionable
//! treatment as images, skipping tables that are already a figure's only
//! child.

use async_trait::async_trait;
use readeck_dom::Dom;
use readeck_engine::{Extractor, ProcessMessage, Processor, ProcessorOutcome, Step};

pub struct WrapTables;

#[async_trait]
impl Processor for WrapTables {
    fn name(&self) -> &'static str {
        "wrap-tables"
    }

    async fn run(&self, msg: &mut ProcessMessage, _extractor: &mut Extractor) -> ProcessorOutcome {
        if msg.step() != Step::Dom {
            return ProcessorOutcome::Continue;
        }
        let Some(dom) = msg.dom.as_mut() else {
            return ProcessorOutcome::Continue;
        };
        wrap(dom);
        ProcessorOutcome::Continue
    }
}

fn wrap(dom: &mut Dom) {
    for table in dom.find_all_tags(&["table"]) {
        let Some(parent) = dom.parent(table) else { continue };
        if dom.tag_name(parent) == Some("figure") && dom.children(parent).len() == 1 {
            continue;
        }

        let siblings = dom.children(parent);
        let Some(idx) = siblings.iter().position(|&id| id == table) else { continue };
        let after = siblings[idx + 1..].to_vec();

        let figure = dom.create_element("figure");
        dom.append_child(figure, table);
        dom.append_child(parent, figure);
        for node in after {
            dom.detach_from_parent(node);
            dom.append_child(parent, node);
        }
    }
}
