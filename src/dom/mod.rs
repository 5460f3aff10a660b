//! Platform - the live node tree the application builds into.
//!
//! The application never renders anything itself. It creates elements,
//! wires attributes, styles and native listeners through [`Platform`], and
//! at export time walks the same tree back out through it. The trait is the
//! whole contract; [`MemoryDom`] is the in-process implementation used when
//! no browser is attached (and by the tests).

mod memory;

pub use memory::{DomNodeId, MemoryDom};

use std::fmt;
use std::hash::Hash;

use crate::behavior::Behavior;

/// One child of an element, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomChild<N> {
    Element(N),
    Text(String),
}

/// Operations the core needs from a live document.
pub trait Platform {
    /// Handle to a platform element.
    type Node: Copy + Eq + Hash + fmt::Debug;

    /// The `<html>` element.
    fn document_element(&self) -> Self::Node;
    fn head(&self) -> Self::Node;
    fn body(&self) -> Self::Node;

    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Append `child` to `parent`, moving it from any previous parent.
    ///
    /// Returns `false` and leaves the tree alone when `child` is `parent`
    /// or one of its ancestors.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> bool;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Whether `ancestor` is `node` or lies on its parent chain.
    fn is_inclusive_ancestor(&self, ancestor: Self::Node, node: Self::Node) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Remove `node` from its parent, if it has one. The node stays usable.
    fn detach(&mut self, node: Self::Node);

    /// Replace all children of `node` with a single text node.
    fn set_text_content(&mut self, node: Self::Node, text: &str);

    /// Concatenated text of all descendants.
    fn text_content(&self, node: Self::Node) -> String;

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);
    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    fn add_class(&mut self, node: Self::Node, class: &str);
    fn has_class(&self, node: Self::Node, class: &str) -> bool;

    /// Inline style property, by CSS (hyphenated) name.
    fn style_property(&self, node: Self::Node, property: &str) -> Option<String>;
    fn set_style_property(&mut self, node: Self::Node, property: &str, value: &str);
    fn remove_style_property(&mut self, node: Self::Node, property: &str);

    /// Register native event delivery of `behavior` on `channel`.
    fn add_event_listener(&mut self, node: Self::Node, channel: &str, behavior: &Behavior);
    fn remove_event_listener(&mut self, node: Self::Node, channel: &str, behavior: &Behavior);

    /// Lower-case tag name.
    fn tag_name(&self, node: Self::Node) -> String;

    /// Opening tag with all attributes, without the closing `>`
    /// (`<div id="a" class="x"`).
    fn opening_tag(&self, node: Self::Node) -> String;

    fn children(&self, node: Self::Node) -> Vec<DomChild<Self::Node>>;
}

/// Elements that never have children or a closing tag.
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta" | "source" | "track" | "wbr"
    )
}

/// Escape text for use inside a double-quoted attribute value.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for use as element content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
