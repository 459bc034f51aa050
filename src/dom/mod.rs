//! Owned element tree for live and parsed documents.
//!
//! The engine never talks to a browser binding directly; it operates on
//! this tree (tag name, attributes, children, text) so every reconciliation
//! step is testable with documents built in memory.
//!
//! # Modules
//!
//! - `node` - `Node`, `Element`, `Document` tree types
//! - `parse` - fetched HTML to owned tree (via `tl`)
//! - `render` - owned tree back to HTML text

mod node;
pub mod parse;
pub mod render;

pub use node::{Document, Element, Node};
