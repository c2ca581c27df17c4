use std::collections::BTreeMap;

/// Index into a [`crate::Dom`]'s arena. Stable for the lifetime of the
/// owning `Dom` — removed nodes leave their slot as a tombstone rather than
/// reusing the id, so a `NodeId` captured before a mutation never aliases an
/// unrelated node afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Document,
    Doctype,
    Comment(String),
    Text(String),
    Element {
        tag: String,
        attrs: BTreeMap<String, String>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Set once a node is detached/removed; excluded from traversal and
    /// serialization even though its arena slot is still allocated.
    pub removed: bool,
}

impl Node {
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            removed: false,
        }
    }
}

/// Void elements never carry a closing tag or children, per the HTML5 spec.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text content is never escaped or re-parsed as markup.
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];
