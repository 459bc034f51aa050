//! Fetched HTML to owned tree conversion using `tl`.

use anyhow::anyhow;

use crate::dom::{Document, Element, Node};

/// Parse a complete HTML document.
///
/// Server-rendered pages always carry an `<html>` root; fragments without
/// one are wrapped so the result still satisfies the `Document` invariants
/// (any top-level `<head>`/`<body>` are kept in place, everything else
/// lands in the body).
pub fn parse_document(html: &str) -> anyhow::Result<Document> {
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|e| anyhow!("invalid html: {e}"))?;
    let parser = dom.parser();

    let mut top: Vec<Node> = Vec::new();
    for handle in dom.children() {
        if let Some(node) = convert(*handle, parser) {
            top.push(node);
        }
    }

    let root = match extract_root(&mut top) {
        Some(html_el) => html_el,
        None => wrap_fragment(top),
    };

    Ok(Document::new(root))
}

/// Pull out a top-level `<html>` element, if present.
fn extract_root(top: &mut Vec<Node>) -> Option<Element> {
    let idx = top
        .iter()
        .position(|n| matches!(n, Node::Element(el) if el.tag == "html"))?;
    match top.remove(idx) {
        Node::Element(el) => Some(*el),
        Node::Text(_) => None,
    }
}

/// Wrap root-less markup in an `<html>` element.
fn wrap_fragment(top: Vec<Node>) -> Element {
    let mut root = Element::new("html");
    let mut body = Element::new("body");

    for node in top {
        match node {
            Node::Element(el) if el.tag == "head" || el.tag == "body" => {
                root.children.push(Node::Element(el));
            }
            // Doctype declarations surface as stray text; drop them.
            Node::Text(t) if t.trim_start().starts_with("<!") => {}
            other => body.children.push(other),
        }
    }

    if root.child_index("body").is_none() {
        root.push_elem(body);
    }
    root
}

/// Convert a `tl` node handle to an owned tree node.
fn convert(handle: tl::NodeHandle, parser: &tl::Parser) -> Option<Node> {
    let node = handle.get(parser)?;

    match node {
        tl::Node::Tag(tag) => {
            let tag_name = tag.name().as_utf8_str().to_lowercase();
            let mut el = Element::new(tag_name);

            for (key, value) in tag.attributes().iter() {
                let key_str: &str = key.as_ref();
                let value_str = value.map(|v| v.to_string()).unwrap_or_default();
                el.set_attr(key_str, value_str);
            }

            for child_handle in tag.children().top().iter() {
                if let Some(child) = convert(*child_handle, parser) {
                    el.children.push(child);
                }
            }

            Some(Node::Element(Box::new(el)))
        }
        tl::Node::Raw(bytes) => {
            let text = bytes.as_utf8_str().to_string();
            // Skip whitespace-only text between elements
            if text.trim().is_empty() {
                None
            } else {
                Some(Node::Text(text))
            }
        }
        tl::Node::Comment(_) => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
