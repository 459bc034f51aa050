//! Serialize the owned tree back to HTML text.

use crate::dom::{Element, Node};
use crate::utils::html::{escape, escape_attr, is_raw_text_element, is_void_element};

/// Render an element, including its own tags.
pub fn render_element(el: &Element) -> String {
    let mut out = String::new();
    write_element(el, &mut out);
    out
}

/// Render only the children of an element.
pub fn render_children(el: &Element) -> String {
    let mut out = String::new();
    write_children(el, &mut out);
    out
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');

    if is_void_element(&el.tag) {
        return;
    }

    write_children(el, out);

    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn write_children(el: &Element, out: &mut String) {
    // Script and style content is raw text and must not be entity-escaped.
    let raw = is_raw_text_element(&el.tag);
    for child in &el.children {
        match child {
            Node::Element(e) => write_element(e, out),
            Node::Text(t) if raw => out.push_str(t),
            Node::Text(t) => out.push_str(&escape(t)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
