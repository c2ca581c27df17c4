use crate::dom::Dom;
use crate::node::{NodeData, NodeId};

pub(crate) fn serialize_node(dom: &Dom, id: NodeId, out: &mut String) {
    let node = &dom.nodes[id.0];
    if node.removed {
        return;
    }

    match &node.data {
        NodeData::Document => {
            for child in dom.children(id) {
                serialize_node(dom, child, out);
            }
        }
        NodeData::Doctype => out.push_str("<!DOCTYPE html>"),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Text(text) => out.push_str(&escape_text(text)),
        NodeData::Element { tag, attrs } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');

            if Dom::is_void(tag) {
                return;
            }

            if Dom::is_raw_text(tag) {
                out.push_str(&dom.text_content(id));
            } else {
                for child in dom.children(id) {
                    serialize_node(dom, child, out);
                }
            }

            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
