//! Headless document model.
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by
//! [`NodeId`]. Queries only walk nodes attached under the body, so content
//! removed with [`Document::clear_children`] disappears from lookups even
//! though its slot stays allocated.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Layout box in page coordinates (pixels, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlapping box, if the rects touch or overlap. Edge contact yields a
    /// zero-area rect rather than `None`.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

const VOID_ELEMENTS: &[&str] = &["img", "br", "hr", "input", "meta", "link"];

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    rect: Option<Rect>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            children: Vec::new(),
            parent: None,
            rect: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only a `body` element.
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
        }
    }

    pub const fn body(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.node(parent).is_none() || self.node(child).is_none() {
            return;
        }
        if self.self_and_ancestors(parent).contains(&child) {
            return;
        }
        if let Some(old) = self.node(child).and_then(|n| n.parent) {
            if let Some(old_parent) = self.node_mut(old) {
                old_parent.children.retain(|c| *c != child);
            }
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    /// Detach every child of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) {
        let children = match self.node_mut(parent) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            if let Some(node) = self.node_mut(child) {
                node.parent = None;
            }
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// `id` followed by its ancestors, nearest first.
    pub fn self_and_ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.node(id).map(|_| id);
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.parent(current);
        }
        out
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.self_and_ancestors(id).last() == Some(&self.body())
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.tag.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if name == "class" {
            let value = value.into();
            if let Some(node) = self.node_mut(id) {
                node.classes = value.split_whitespace().map(str::to_owned).collect();
            }
            return;
        }
        if let Some(node) = self.node_mut(id) {
            node.attrs.insert(name.to_owned(), value.into());
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)
            .and_then(|n| n.attrs.get(name))
            .map(String::as_str)
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.node_mut(id) {
            node.attrs.remove(name);
        }
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.node_mut(id) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_owned());
            }
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.node_mut(id) {
            node.classes.retain(|c| c != class);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if let Some(node) = self.node_mut(id) {
            node.rect = Some(rect);
        }
    }

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.node(id).and_then(|n| n.rect)
    }

    /// Attached nodes in document (depth-first, pre-order) order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.body())
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    pub fn find_first_by_class(&self, class: &str) -> Option<NodeId> {
        self.descendants(self.body())
            .into_iter()
            .find(|id| self.has_class(*id, class))
    }

    /// First attached node carrying every class in `classes`.
    pub fn find_first_by_classes(&self, classes: &[&str]) -> Option<NodeId> {
        self.descendants(self.body())
            .into_iter()
            .find(|id| classes.iter().all(|c| self.has_class(*id, c)))
    }

    pub fn find_by_attr(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.body())
            .into_iter()
            .filter(|id| self.has_attr(*id, name))
            .collect()
    }

    pub fn find_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.body())
            .into_iter()
            .find(|id| self.attr(*id, "id") == Some(element_id))
    }

    /// Serialize the subtree rooted at `id` as HTML.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        let _ = write!(out, "<{}", node.tag);
        if !node.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&node.classes.join(" ")));
        }
        for (name, value) in &node.attrs {
            if value.is_empty() {
                let _ = write!(out, " {name}");
            } else {
                let _ = write!(out, " {name}=\"{}\"", escape(value));
            }
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&node.tag.as_str()) {
            return;
        }
        for child in &node.children {
            self.write_html(*child, out);
        }
        let _ = write!(out, "</{}>", node.tag);
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Cloneable handle shared by every page task.
///
/// The lock is never held across an `.await`; a poisoned lock is recovered
/// since the document holds no invariants a panicking writer could break
/// halfway.
#[derive(Debug, Clone, Default)]
pub struct SharedDocument(Arc<Mutex<Document>>);

impl SharedDocument {
    pub fn new(doc: Document) -> Self {
        Self(Arc::new(Mutex::new(doc)))
    }

    pub fn lock(&self) -> MutexGuard<'_, Document> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
