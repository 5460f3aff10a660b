//! MemoryDom - an arena-backed document.
//!
//! Elements are indices into one `Vec`. Attributes keep first-set order;
//! `class` and `style` are ordinary attributes kept in sync with the class
//! list and the inline style map.

use indexmap::IndexMap;
use serde_json::Value;

use super::{DomChild, Platform, escape_attribute, escape_text, is_void_element};
use crate::behavior::Behavior;
use crate::dispatch::{DispatchReport, call_isolated};

/// Index of an element in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomNodeId(usize);

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: IndexMap<String, String>,
    style: IndexMap<String, String>,
    children: Vec<DomChild<DomNodeId>>,
    parent: Option<DomNodeId>,
    listeners: IndexMap<String, Vec<Behavior>>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: IndexMap::new(),
            style: IndexMap::new(),
            children: Vec::new(),
            parent: None,
            listeners: IndexMap::new(),
        }
    }

    fn sync_style_attribute(&mut self) {
        if self.style.is_empty() {
            self.attributes.shift_remove("style");
            return;
        }
        let text: String = self.style.iter().map(|(k, v)| format!("{k}:{v};")).collect();
        self.attributes.insert("style".to_string(), text);
    }
}

/// In-memory [`Platform`]: `<html>` with `<head>` and `<body>`.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    elements: Vec<Element>,
    html: DomNodeId,
    head: DomNodeId,
    body: DomNodeId,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let mut dom = Self {
            elements: Vec::new(),
            html: DomNodeId(0),
            head: DomNodeId(0),
            body: DomNodeId(0),
        };
        dom.html = dom.create_element("html");
        dom.head = dom.create_element("head");
        dom.body = dom.create_element("body");
        dom.append_child(dom.html, dom.head);
        dom.append_child(dom.html, dom.body);
        dom
    }

    fn element(&self, node: DomNodeId) -> &Element {
        &self.elements[node.0]
    }

    fn element_mut(&mut self, node: DomNodeId) -> &mut Element {
        &mut self.elements[node.0]
    }

    /// Fire a native event: run every behavior registered on `channel` of
    /// `node`, in registration order, with failures isolated.
    pub fn dispatch(&self, node: DomNodeId, channel: &str, payload: &Value) -> DispatchReport {
        let mut report = DispatchReport::default();
        if let Some(listeners) = self.element(node).listeners.get(channel) {
            for behavior in listeners {
                call_isolated(&mut report, channel, || behavior.invoke(payload));
            }
        }
        report
    }

    /// Number of native listeners on `node` for `channel`.
    pub fn listener_count(&self, node: DomNodeId, channel: &str) -> usize {
        self.element(node).listeners.get(channel).map_or(0, Vec::len)
    }

    /// Full markup of `node` and its subtree.
    pub fn outer_html(&self, node: DomNodeId) -> String {
        let mut out = self.opening_tag(node);
        out.push('>');
        let tag = &self.element(node).tag;
        if is_void_element(tag) {
            return out;
        }
        for child in &self.element(node).children {
            match child {
                DomChild::Element(child) => out.push_str(&self.outer_html(*child)),
                DomChild::Text(text) => out.push_str(&escape_text(text)),
            }
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
        out
    }
}

impl Platform for MemoryDom {
    type Node = DomNodeId;

    fn document_element(&self) -> DomNodeId {
        self.html
    }

    fn head(&self) -> DomNodeId {
        self.head
    }

    fn body(&self) -> DomNodeId {
        self.body
    }

    fn create_element(&mut self, tag: &str) -> DomNodeId {
        self.elements.push(Element::new(tag));
        DomNodeId(self.elements.len() - 1)
    }

    fn detach(&mut self, node: DomNodeId) {
        if let Some(parent) = self.element_mut(node).parent.take() {
            self.element_mut(parent)
                .children
                .retain(|c| *c != DomChild::Element(node));
        }
    }

    fn append_child(&mut self, parent: DomNodeId, child: DomNodeId) -> bool {
        if self.is_inclusive_ancestor(child, parent) {
            tracing::warn!(?parent, ?child, "child would contain its own parent, not appended");
            return false;
        }
        self.detach(child);
        self.element_mut(child).parent = Some(parent);
        self.element_mut(parent).children.push(DomChild::Element(child));
        true
    }

    fn parent(&self, node: DomNodeId) -> Option<DomNodeId> {
        self.element(node).parent
    }

    fn set_text_content(&mut self, node: DomNodeId, text: &str) {
        let old = std::mem::take(&mut self.element_mut(node).children);
        for child in old {
            if let DomChild::Element(child) = child {
                self.element_mut(child).parent = None;
            }
        }
        if !text.is_empty() {
            self.element_mut(node).children.push(DomChild::Text(text.to_string()));
        }
    }

    fn text_content(&self, node: DomNodeId) -> String {
        let mut out = String::new();
        for child in &self.element(node).children {
            match child {
                DomChild::Element(child) => out.push_str(&self.text_content(*child)),
                DomChild::Text(text) => out.push_str(text),
            }
        }
        out
    }

    fn set_attribute(&mut self, node: DomNodeId, name: &str, value: &str) {
        let element = self.element_mut(node);
        if name == "style" {
            element.style.clear();
            for declaration in value.split(';') {
                if let Some((property, value)) = declaration.split_once(':') {
                    element
                        .style
                        .insert(property.trim().to_string(), value.trim().to_string());
                }
            }
            element.sync_style_attribute();
            return;
        }
        element.attributes.insert(name.to_string(), value.to_string());
    }

    fn attribute(&self, node: DomNodeId, name: &str) -> Option<String> {
        self.element(node).attributes.get(name).cloned()
    }

    fn add_class(&mut self, node: DomNodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let attributes = &mut self.element_mut(node).attributes;
        let classes = match attributes.get("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        attributes.insert("class".to_string(), classes);
    }

    fn has_class(&self, node: DomNodeId, class: &str) -> bool {
        self.element(node)
            .attributes
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn style_property(&self, node: DomNodeId, property: &str) -> Option<String> {
        self.element(node).style.get(property).cloned()
    }

    fn set_style_property(&mut self, node: DomNodeId, property: &str, value: &str) {
        let element = self.element_mut(node);
        element.style.insert(property.to_string(), value.to_string());
        element.sync_style_attribute();
    }

    fn remove_style_property(&mut self, node: DomNodeId, property: &str) {
        let element = self.element_mut(node);
        if element.style.shift_remove(property).is_some() {
            element.sync_style_attribute();
        }
    }

    fn add_event_listener(&mut self, node: DomNodeId, channel: &str, behavior: &Behavior) {
        self.element_mut(node)
            .listeners
            .entry(channel.to_string())
            .or_default()
            .push(behavior.clone());
    }

    fn remove_event_listener(&mut self, node: DomNodeId, channel: &str, behavior: &Behavior) {
        if let Some(listeners) = self.element_mut(node).listeners.get_mut(channel) {
            listeners.retain(|l| l != behavior);
        }
    }

    fn tag_name(&self, node: DomNodeId) -> String {
        self.element(node).tag.clone()
    }

    fn opening_tag(&self, node: DomNodeId) -> String {
        let element = self.element(node);
        let mut out = format!("<{}", element.tag);
        for (name, value) in &element.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
        out
    }

    fn children(&self, node: DomNodeId) -> Vec<DomChild<DomNodeId>> {
        self.element(node).children.clone()
    }
}
