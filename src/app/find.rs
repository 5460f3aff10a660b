//! Lookups over created nodes.

use super::Application;
use crate::dom::Platform;
use crate::style::to_kebab_case;
use crate::types::{NodeRef, StyleBag, StyleValue};

/// Nodes matching a token as an id, a tag name and a class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindResult {
    pub id: Vec<NodeRef>,
    pub tag: Vec<NodeRef>,
    pub class: Vec<NodeRef>,
}

impl FindResult {
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.tag.is_empty() && self.class.is_empty()
    }
}

impl<P: Platform> Application<P> {
    /// Every node whose id, tag or class equals `token`, in creation order.
    pub fn find(&self, token: &str) -> FindResult {
        let mut result = FindResult::default();
        for (index, record) in self.nodes.iter().enumerate() {
            let node = NodeRef(index);
            if self.platform.attribute(record.handle, "id").as_deref() == Some(token) {
                result.id.push(node);
            }
            if self.platform.tag_name(record.handle).eq_ignore_ascii_case(token) {
                result.tag.push(node);
            }
            if self.platform.has_class(record.handle, token) {
                result.class.push(node);
            }
        }
        result
    }

    /// Nodes whose inline style has every flat property of `style`.
    ///
    /// Nested blocks never match an inline style.
    pub fn find_by_style(&self, style: &StyleBag) -> Vec<NodeRef> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                style.iter().all(|(key, value)| match value {
                    StyleValue::Flat(value) => {
                        self.platform.style_property(record.handle, &to_kebab_case(key)).as_deref() == Some(value.as_str())
                    }
                    StyleValue::Nested(_) => false,
                })
            })
            .map(|(index, _)| NodeRef(index))
            .collect()
    }
}
