//! Core types shared by the style engine, the node factory and export.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StyleShape;

// =============================================================================
// Style values
// =============================================================================

/// One property of a style definition.
///
/// `Flat` is a plain CSS value. `Nested` is a sub-block keyed by inner
/// property, rendered under `selector:key{...}` (pseudo-classes such as
/// `hover`, pseudo-elements, transition blocks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Flat(String),
    Nested(IndexMap<String, String>),
}

impl StyleValue {
    pub fn shape(&self) -> StyleShape {
        match self {
            StyleValue::Flat(_) => StyleShape::Flat,
            StyleValue::Nested(_) => StyleShape::Nested,
        }
    }

    pub fn as_flat(&self) -> Option<&str> {
        match self {
            StyleValue::Flat(v) => Some(v),
            StyleValue::Nested(_) => None,
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Flat(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Flat(value)
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for StyleValue {
    fn from(pairs: [(K, V); N]) -> Self {
        StyleValue::Nested(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Ordered property bag. Rendering follows insertion order.
pub type StyleBag = IndexMap<String, StyleValue>;

/// Build a [`StyleBag`] from `key => value` pairs.
///
/// ```ignore
/// let bag = style_bag! {
///     "color" => "red",
///     "hover" => [("color", "blue")],
/// };
/// ```
#[macro_export]
macro_rules! style_bag {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut bag = $crate::types::StyleBag::new();
        $( bag.insert(::std::string::String::from($key), $crate::types::StyleValue::from($value)); )*
        bag
    }};
}

/// One element of a node style list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleEntry {
    /// A named style, used as a selector reference when published or as a
    /// composition source when not.
    Named(String),
    /// An inline property bag.
    Inline(StyleBag),
}

impl From<&str> for StyleEntry {
    fn from(name: &str) -> Self {
        StyleEntry::Named(name.to_string())
    }
}

impl From<String> for StyleEntry {
    fn from(name: String) -> Self {
        StyleEntry::Named(name)
    }
}

impl From<StyleBag> for StyleEntry {
    fn from(bag: StyleBag) -> Self {
        StyleEntry::Inline(bag)
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// Handle to a node created by an application. Index 0 is the root
/// container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub(crate) usize);

impl NodeRef {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Children passed to node creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Children {
    /// Append these nodes, in order.
    Nodes(Vec<NodeRef>),
    /// Replace all children with this text.
    Text(String),
}

impl Default for Children {
    fn default() -> Self {
        Children::Nodes(Vec::new())
    }
}

impl From<Vec<NodeRef>> for Children {
    fn from(nodes: Vec<NodeRef>) -> Self {
        Children::Nodes(nodes)
    }
}

impl<const N: usize> From<[NodeRef; N]> for Children {
    fn from(nodes: [NodeRef; N]) -> Self {
        Children::Nodes(nodes.to_vec())
    }
}

impl From<&str> for Children {
    fn from(text: &str) -> Self {
        Children::Text(text.to_string())
    }
}

impl From<String> for Children {
    fn from(text: String) -> Self {
        Children::Text(text)
    }
}

// =============================================================================
// Application events
// =============================================================================

/// Payload delivered on application event channels.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A node finished construction (the reserved `"create"` channel).
    Created(NodeRef),
    /// Caller-defined payload.
    Value(Value),
}

impl From<Value> for AppEvent {
    fn from(value: Value) -> Self {
        AppEvent::Value(value)
    }
}

/// Channel triggered once per node after construction.
pub const CREATE_CHANNEL: &str = "create";
