//! Node Factory - the only way visual nodes come into existence.
//!
//! `create` validates the optional stable id, applies attributes, wires
//! event behaviors, resolves the style list, attaches children and
//! finally announces the node on the `"create"` channel. Each node gets its
//! own per-channel behavior table; the exporter reads it back as `on*`
//! attributes.
//!
//! # Style resolution
//!
//! - published named style → selector reference (`.card` adds class `card`,
//!   `#main` sets `id="main"`)
//! - unpublished named style → flat keys copied inline, comma-appended onto
//!   values already present
//! - inline bags → merged left to right and assigned, overwriting
//!
//! Nested blocks (pseudo-classes) can only live in published rules, so they
//! are skipped with a warning when they would have to be applied inline.

use indexmap::IndexMap;

use super::{Application, NodeRecord};
use crate::behavior::Behavior;
use crate::dom::Platform;
use crate::error::{PageError, Result};
use crate::style::to_kebab_case;
use crate::types::{AppEvent, CREATE_CHANNEL, Children, NodeRef, StyleEntry, StyleValue};

// =============================================================================
// NodeConfig
// =============================================================================

/// Attributes, event behaviors and style for one node.
///
/// ```ignore
/// let config = NodeConfig::new()
///     .attr("type", "button")
///     .on("click", &increment)
///     .style(".btn")
///     .style(style_bag! { "marginTop" => "4px" });
/// ```
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Applied verbatim, in order.
    pub attributes: Vec<(String, String)>,
    /// Channel → behavior, in order. One channel may appear more than once.
    pub events: Vec<(String, Behavior)>,
    pub style: Vec<StyleEntry>,
}

impl NodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn on(mut self, channel: impl Into<String>, behavior: &Behavior) -> Self {
        self.events.push((channel.into(), behavior.clone()));
        self
    }

    pub fn style(mut self, entry: impl Into<StyleEntry>) -> Self {
        self.style.push(entry.into());
        self
    }
}

// =============================================================================
// Creation
// =============================================================================

impl<P: Platform> Application<P> {
    /// Create a `kind` element.
    ///
    /// With `id`, the node becomes addressable by that name in the exported
    /// script, so it must be a valid identifier and unused. On error nothing
    /// is created.
    pub fn create(
        &mut self,
        kind: &str,
        config: NodeConfig,
        children: impl Into<Children>,
        id: Option<&str>,
    ) -> Result<NodeRef> {
        if let Some(id) = id {
            self.check_binding(id)?;
        }

        let handle = self.platform.create_element(kind);
        if let Some(id) = id {
            self.platform.set_attribute(handle, "id", id);
        }

        for (name, value) in &config.attributes {
            if id.is_some() && name == "id" {
                tracing::warn!(kind, id, "node already has a stable id, id attribute skipped");
                continue;
            }
            self.platform.set_attribute(handle, name, value);
        }

        let mut events: IndexMap<String, Vec<Behavior>> = IndexMap::new();
        for (channel, behavior) in config.events {
            if !behavior.is_function() {
                tracing::warn!(kind, %channel, source = behavior.source(), "cannot add non-function event listener");
                continue;
            }
            self.platform.add_event_listener(handle, &channel, &behavior);
            events.entry(channel).or_default().push(behavior);
        }

        self.apply_style(kind, handle, id, &config.style);

        match children.into() {
            Children::Nodes(nodes) => {
                for child in nodes {
                    if child == self.root() {
                        tracing::warn!(kind, "the root container cannot be a child, skipped");
                        continue;
                    }
                    match self.node_handle(child) {
                        Some(child) => {
                            self.platform.append_child(handle, child);
                        }
                        None => tracing::warn!(child = child.index(), "unknown child node"),
                    }
                }
            }
            Children::Text(text) => self.platform.set_text_content(handle, &text),
        }

        let node = NodeRef(self.nodes.len());
        self.nodes.push(NodeRecord { handle, events });
        self.by_handle.insert(handle, node);
        if let Some(id) = id {
            self.element_names.insert(id.to_string(), node);
        }
        tracing::debug!(kind, node = node.index(), id, "created node");

        self.events.trigger(CREATE_CHANNEL, &AppEvent::Created(node));
        Ok(node)
    }

    fn apply_style(&mut self, kind: &str, handle: P::Node, stable_id: Option<&str>, entries: &[StyleEntry]) {
        let mut inline = Vec::new();

        for entry in entries {
            let name = match entry {
                StyleEntry::Inline(_) => {
                    inline.push(entry.clone());
                    continue;
                }
                StyleEntry::Named(name) => name,
            };

            if self.styles.is_published(name) {
                if let Some(class) = name.strip_prefix('.') {
                    self.platform.add_class(handle, class);
                } else if let Some(id) = name.strip_prefix('#') {
                    match stable_id {
                        Some(stable_id) if stable_id != id => {
                            tracing::warn!(kind, stable_id, style = %name, "node already has a stable id, style reference skipped");
                        }
                        _ => self.platform.set_attribute(handle, "id", id),
                    }
                }
                continue;
            }

            let Some(bag) = self.styles.style(name) else {
                tracing::warn!(style = %name, "unknown style");
                continue;
            };
            for (key, value) in bag {
                match value {
                    StyleValue::Flat(value) => {
                        let property = to_kebab_case(key);
                        let merged = match self.platform.style_property(handle, &property) {
                            Some(current) if !current.is_empty() => format!("{current},{value}"),
                            _ => value.clone(),
                        };
                        self.platform.set_style_property(handle, &property, &merged);
                    }
                    StyleValue::Nested(_) => {
                        tracing::warn!(style = %name, key = %key, "nested block needs a published style, skipped");
                    }
                }
            }
        }

        if inline.is_empty() {
            return;
        }
        for (key, value) in self.styles.process_style(&inline) {
            match value {
                StyleValue::Flat(value) => {
                    self.platform.set_style_property(handle, &to_kebab_case(&key), &value);
                }
                StyleValue::Nested(_) => {
                    tracing::warn!(kind, key = %key, "cannot define nested block on a dynamic style, skipped");
                }
            }
        }
    }
}
