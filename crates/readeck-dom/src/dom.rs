//! An owned, mutable HTML document tree (spec.md §4.C): `scraper`'s public
//! API is read-only, so the Archiver and the cleanup processors need
//! something that can detach, insert and rewrite nodes in place the way the
//! original's `go-shiori/dom` helpers do over `golang.org/x/net/html`. `Dom`
//! ingests a document via `scraper`'s stable selection API, then owns the
//! tree itself (in the spirit of `ego_tree`'s arena design) so every
//! mutation below works against plain indices instead of borrowed
//! references.

use std::collections::{BTreeMap, HashMap};

use scraper::{ElementRef, Html, Selector};

use crate::node::{Node, NodeData, NodeId, RAW_TEXT_ELEMENTS, VOID_ELEMENTS};
use crate::serialize::serialize_node;

/// A mutable HTML document. See the module docs for why this exists instead
/// of mutating `scraper::Html` directly.
pub struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl Dom {
    /// Parses `html` into a fresh, independently-owned tree.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut dom = Dom {
            nodes: vec![Node::new(NodeData::Document)],
            root: NodeId(0),
        };
        let mut mapped: HashMap<ego_tree::NodeId, NodeId> = HashMap::new();
        mapped.insert(document.tree.root().id(), dom.root);
        let mut preorder = Vec::new();
        fn collect_preorder<'a>(
            node: ego_tree::NodeRef<'a, scraper::Node>,
            out: &mut Vec<ego_tree::NodeRef<'a, scraper::Node>>,
        ) {
            for child in node.children() {
                out.push(child);
                collect_preorder(child, out);
            }
        }
        collect_preorder(document.tree.root(), &mut preorder);

        for scraper_node in preorder {
            let parent_scraper_id = scraper_node.parent().map(|p| p.id());
            let parent_id = parent_scraper_id.and_then(|id| mapped.get(&id).copied()).unwrap_or(dom.root);

            let data = match scraper_node.value() {
                scraper::Node::Element(el) => NodeData::Element {
                    tag: el.name().to_string(),
                    attrs: el
                        .attrs()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect::<BTreeMap<_, _>>(),
                },
                scraper::Node::Text(t) => NodeData::Text(t.text.to_string()),
                scraper::Node::Comment(c) => NodeData::Comment(c.comment.to_string()),
                scraper::Node::Doctype(_) => NodeData::Doctype,
                scraper::Node::Document | scraper::Node::Fragment => continue,
                scraper::Node::ProcessingInstruction(_) => continue,
            };

            let new_id = dom.push_node(Node::new(data));
            dom.nodes[parent_id.0].children.push(new_id);
            dom.nodes[new_id.0].parent = Some(parent_id);
            mapped.insert(scraper_node.id(), new_id);
        }

        dom
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(|child| !self.node(*child).removed)
            .collect()
    }

    /// All elements in the subtree rooted at `id`, `id` itself included if
    /// it is an element, in document order.
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk_elements(id, &mut out);
        out
    }

    fn walk_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if self.node(id).removed {
            return;
        }
        if self.is_element(id) {
            out.push(id);
        }
        for child in self.children(id) {
            self.walk_elements(child, out);
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Element { .. })
    }

    pub fn is_comment(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Comment(_))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Text(_))
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn attrs(&self, id: NodeId) -> Vec<(String, String)> {
        match &self.node(id).data {
            NodeData::Element { attrs, .. } => attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => Vec::new(),
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data {
            attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data {
            attrs.remove(name);
        }
    }

    pub fn class_name(&self, id: NodeId) -> String {
        self.attr(id, "class").unwrap_or_default().to_string()
    }

    /// Concatenated text of every text-node descendant, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if self.node(id).removed {
            return;
        }
        if let NodeData::Text(t) = &self.node(id).data {
            out.push_str(t);
        }
        for child in self.children(id) {
            self.collect_text(child, out);
        }
    }

    /// Replaces all children of `id` with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        let children = self.node(id).children.clone();
        for child in children {
            self.node_mut(child).removed = true;
        }
        self.node_mut(id).children.clear();
        let text_id = self.push_node(Node::new(NodeData::Text(text.to_string())));
        self.node_mut(text_id).parent = Some(id);
        self.node_mut(id).children.push(text_id);
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(Node::new(NodeData::Element {
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(Node::new(NodeData::Text(text.to_string())))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach_from_parent(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach_from_parent(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.insert(0, child);
    }

    /// Moves every current child of `from` to become a child of `to`, in
    /// order (used by noscript→div conversion, which re-parents a parsed
    /// fragment's body children into a fresh wrapper).
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = self.node(from).children.clone();
        for child in children {
            self.append_child(to, child);
        }
    }

    /// Detaches `id` from its parent without deallocating it, so callers can
    /// still read it (e.g. before deciding where to reinsert it).
    pub fn detach_from_parent(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
        self.node_mut(id).parent = None;
    }

    /// Removes `id` and its whole subtree from the document.
    pub fn remove(&mut self, id: NodeId) {
        let descendants = self.descendant_elements(id);
        self.detach_from_parent(id);
        self.node_mut(id).removed = true;
        for d in descendants {
            self.node_mut(d).removed = true;
        }
    }

    /// Replaces `old` in its current position with `new`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        let parent = match self.node(old).parent {
            Some(p) => p,
            None => return,
        };
        self.detach_from_parent(new);
        let position = self.node(parent).children.iter().position(|c| *c == old);
        self.detach_from_parent(old);
        self.node_mut(old).removed = true;
        self.node_mut(new).parent = Some(parent);
        match position {
            Some(i) => self.node_mut(parent).children.insert(i, new),
            None => self.node_mut(parent).children.push(new),
        }
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serialize_node(self, id, &mut out);
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            serialize_node(self, child, &mut out);
        }
        out
    }

    /// Serializes the whole document from its root.
    pub fn to_html(&self) -> String {
        self.inner_html(self.root)
    }

    /// Evaluates a CSS selector against the document's *current* state.
    /// Implemented by re-serializing, re-parsing with `scraper`, matching
    /// with `scraper::Selector`, then mapping the matches back onto this
    /// tree's node ids by document-order position — `scraper`'s own
    /// mutation story stops at read access, so every other `Dom` method
    /// mutates directly while this one borrows `scraper` only for matching.
    pub fn select(&self, css: &str) -> Vec<NodeId> {
        let selector = match Selector::parse(css) {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(selector = css, %err, "ignoring invalid css selector");
                return Vec::new();
            }
        };

        let html = self.to_html();
        let document = Html::parse_document(&html);
        let matched: std::collections::HashSet<ego_tree::NodeId> =
            document.select(&selector).map(|el| el.id()).collect();

        let mut mine = self.descendant_elements(self.root).into_iter();
        let mut theirs = Vec::new();
        collect_element_refs(document.tree.root(), &mut theirs);

        let mut result = Vec::new();
        for scraper_ref in theirs {
            let mine_id = match mine.next() {
                Some(id) => id,
                None => break,
            };
            if matched.contains(&scraper_ref.id()) {
                result.push(mine_id);
            }
        }
        result
    }

    pub fn find_all_tags(&self, tags: &[&str]) -> Vec<NodeId> {
        self.descendant_elements(self.root)
            .into_iter()
            .filter(|id| self.tag_name(*id).is_some_and(|t| tags.contains(&t)))
            .collect()
    }

    pub fn all_comments(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk_comments(self.root, &mut out);
        out
    }

    fn walk_comments(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if self.node(id).removed {
            return;
        }
        if self.is_comment(id) {
            out.push(id);
        }
        for child in self.children(id) {
            self.walk_comments(child, out);
        }
    }

    pub(crate) fn is_void(tag: &str) -> bool {
        VOID_ELEMENTS.contains(&tag)
    }

    pub(crate) fn is_raw_text(tag: &str) -> bool {
        RAW_TEXT_ELEMENTS.contains(&tag)
    }
}

fn collect_element_refs<'a>(
    node: ego_tree::NodeRef<'a, scraper::Node>,
    out: &mut Vec<ElementRef<'a>>,
) {
    for child in node.children() {
        if let Some(el) = ElementRef::wrap(child) {
            out.push(el);
        }
        collect_element_refs(child, out);
    }
}
