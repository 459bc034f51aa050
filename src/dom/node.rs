//! Tree types: `Node`, `Element`, `Document`.

use crate::dom::render;

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Box<Element>),
    Text(String),
}

impl Node {
    /// View this node as an element, if it is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Mutable element view.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }
}

// =============================================================================
// Element
// =============================================================================

/// An element with a tag name, ordered attributes, and child nodes.
///
/// Attribute order is preserved; lookups are linear (head elements carry a
/// handful of attributes at most).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check attribute presence.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(n, _)| n == name)
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Remove an attribute by name.
    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| n != name);
    }

    /// Append a child element.
    pub fn push_elem(&mut self, el: Element) {
        self.children.push(Node::Element(Box::new(el)));
    }

    /// Append a text child.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Iterate over direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Index of the first direct child element with the given tag.
    pub fn child_index(&self, tag: &str) -> Option<usize> {
        self.children.iter().position(
            |n| matches!(n, Node::Element(el) if el.tag.eq_ignore_ascii_case(tag)),
        )
    }

    /// Concatenated text content of the whole subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
        }
    }
}

// =============================================================================
// Document
// =============================================================================

/// A complete document: an `<html>` root guaranteed to carry `<head>` and
/// `<body>` children.
///
/// Both the live document and freshly parsed documents use this type; a
/// parsed document is "adopted" by moving its parts out via
/// [`Document::into_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// Build a document from a root element, inserting missing `<head>` /
    /// `<body>` children.
    pub fn new(mut root: Element) -> Self {
        if root.child_index("head").is_none() {
            root.children.insert(0, Node::Element(Box::new(Element::new("head"))));
        }
        if root.child_index("body").is_none() {
            root.push_elem(Element::new("body"));
        }
        Self { root }
    }

    /// Parse an HTML string into a document.
    pub fn parse(html: &str) -> anyhow::Result<Self> {
        crate::dom::parse::parse_document(html)
    }

    /// The `<head>` element.
    pub fn head(&self) -> &Element {
        self.child("head")
    }

    /// Mutable `<head>` element.
    pub fn head_mut(&mut self) -> &mut Element {
        self.child_mut("head")
    }

    /// The `<body>` element.
    pub fn body(&self) -> &Element {
        self.child("body")
    }

    /// Mutable `<body>` element.
    pub fn body_mut(&mut self) -> &mut Element {
        self.child_mut("body")
    }

    /// Tear the document apart for adoption into a live document:
    /// `(root element without head/body, head, body)`.
    pub fn into_parts(mut self) -> (Element, Element, Element) {
        let head = self.take_child("head");
        let body = self.take_child("body");
        (self.root, head, body)
    }

    /// Render the document back to HTML.
    pub fn to_html(&self) -> String {
        format!("<!doctype html>{}", render::render_element(&self.root))
    }

    fn child(&self, tag: &str) -> &Element {
        self.root
            .children
            .iter()
            .find_map(|n| match n {
                Node::Element(el) if el.tag.eq_ignore_ascii_case(tag) => Some(el.as_ref()),
                _ => None,
            })
            .expect("html root keeps head and body children")
    }

    fn child_mut(&mut self, tag: &str) -> &mut Element {
        self.root
            .children
            .iter_mut()
            .find_map(|n| match n {
                Node::Element(el) if el.tag.eq_ignore_ascii_case(tag) => Some(el.as_mut()),
                _ => None,
            })
            .expect("html root keeps head and body children")
    }

    fn take_child(&mut self, tag: &str) -> Element {
        match self.root.child_index(tag) {
            Some(idx) => match self.root.children.remove(idx) {
                Node::Element(el) => *el,
                Node::Text(_) => Element::new(tag),
            },
            None => Element::new(tag),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
