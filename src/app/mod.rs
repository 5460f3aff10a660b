//! Application - one page under construction.
//!
//! Everything the page is made of hangs off one [`Application`] value: the
//! platform document, the node arena, the behavior/state/event registries,
//! named styles and animations, style variables, dependencies and the
//! startup hook. There is no ambient state; two applications never see each
//! other.
//!
//! # Example
//!
//! ```ignore
//! use spark_page::{AppConfig, Application, NodeConfig};
//! use serde_json::Value;
//!
//! let mut app = Application::new(AppConfig::default().with_title("Demo"));
//! let count = app.add_state("count", 0)?;
//!
//! let increment = app.behavior_with("(event) => { count.set(count.get() + 1); }", {
//!     let count = count.clone();
//!     move |_| {
//!         count.set(count.get().as_i64().unwrap_or(0) + 1);
//!         Ok(())
//!     }
//! });
//!
//! let button = app.create("button", NodeConfig::new().on("click", &increment), "+", Some("plus"))?;
//! app.append_child(button);
//! let html = app.export()?;
//! ```

mod config;
mod dependencies;
mod factory;
mod find;

pub use config::AppConfig;
pub use dependencies::DependencyList;
pub use factory::NodeConfig;
pub use find::FindResult;

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;

use crate::behavior::{Behavior, BehaviorRegistry, is_identifier};
use crate::dispatch::{DispatchReport, call_isolated};
use crate::dom::{MemoryDom, Platform};
use crate::error::{BehaviorError, PageError, Result};
use crate::export::is_function_name;
use crate::state::{EventRegistry, Handler, StateCell};
use crate::style::{Frames, KeyframeRegistry, Keyframes, StyleMap};
use crate::style_bag;
use crate::types::{AppEvent, NodeRef, StyleBag};

/// Reset rule emitted ahead of every published style.
pub const ROOT_RESET: &str = "*,*::before,*::after{box-sizing:border-box;}body{margin:0px 0px;}";

/// Bookkeeping for one created node.
#[derive(Debug, Clone)]
pub(crate) struct NodeRecord<N> {
    pub(crate) handle: N,
    /// Channel → behaviors, in registration order.
    pub(crate) events: IndexMap<String, Vec<Behavior>>,
}

/// A page under construction on platform `P`.
pub struct Application<P: Platform = MemoryDom> {
    pub(crate) config: AppConfig,
    pub(crate) platform: P,
    pub(crate) title_node: P::Node,

    pub(crate) behaviors: BehaviorRegistry,
    pub(crate) states: IndexMap<String, StateCell>,
    pub(crate) events: EventRegistry<AppEvent>,
    pub(crate) styles: StyleMap,
    pub(crate) animations: KeyframeRegistry,
    pub(crate) dependencies: DependencyList,
    pub(crate) variables: IndexMap<String, String>,
    pub(crate) onload: Option<Behavior>,

    /// Node arena. Index 0 is the root container.
    pub(crate) nodes: Vec<NodeRecord<P::Node>>,
    pub(crate) by_handle: HashMap<P::Node, NodeRef>,
    /// Stable identifiers in registration order.
    pub(crate) element_names: IndexMap<String, NodeRef>,
}

impl Application<MemoryDom> {
    /// Application backed by an in-memory document.
    pub fn new(config: AppConfig) -> Self {
        Self::with_platform(MemoryDom::new(), config)
    }

    /// Fire a native event on `node`, as the platform would on user input.
    pub fn dispatch(&self, node: NodeRef, channel: &str, payload: &Value) -> DispatchReport {
        match self.node_handle(node) {
            Some(handle) => self.platform.dispatch(handle, channel, payload),
            None => DispatchReport::default(),
        }
    }
}

impl Default for Application<MemoryDom> {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl<P: Platform> Application<P> {
    /// Set up head metadata, the root class and the root container on
    /// `platform`.
    pub fn with_platform(mut platform: P, config: AppConfig) -> Self {
        let head = platform.head();

        let charset = platform.create_element("meta");
        platform.set_attribute(charset, "charset", "UTF-8");
        platform.append_child(head, charset);

        let viewport = platform.create_element("meta");
        platform.set_attribute(viewport, "name", "viewport");
        platform.set_attribute(viewport, "content", "width=device-width, initial-scale=1.0");
        platform.append_child(head, viewport);

        let title_node = platform.create_element("title");
        platform.set_text_content(title_node, &config.title);
        platform.append_child(head, title_node);

        let mut styles = StyleMap::new();
        let root_selector = config.root_selector();
        styles.add_style(
            &root_selector,
            style_bag! { "display" => "flex", "width" => "100vw", "height" => "100vh" },
        );
        styles.style_to_css(&root_selector);

        let root = platform.create_element("div");
        platform.add_class(root, &config.root_class);
        let body = platform.body();
        platform.append_child(body, root);

        let mut by_handle = HashMap::new();
        by_handle.insert(root, NodeRef(0));

        tracing::debug!(title = %config.title, "created application");

        Self {
            config,
            platform,
            title_node,
            behaviors: BehaviorRegistry::new(),
            states: IndexMap::new(),
            events: EventRegistry::new(),
            styles,
            animations: KeyframeRegistry::new(),
            dependencies: DependencyList::new(),
            variables: IndexMap::new(),
            onload: None,
            nodes: vec![NodeRecord {
                handle: root,
                events: IndexMap::new(),
            }],
            by_handle,
            element_names: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    // =========================================================================
    // Title
    // =========================================================================

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.config.title = title.into();
        self.platform.set_text_content(self.title_node, &self.config.title);
    }

    // =========================================================================
    // Style variables
    // =========================================================================

    /// Define a custom property (`--name`) on the document element.
    pub fn create_variable(&mut self, name: &str, value: impl Into<String>) {
        let name = name.trim_start_matches("--");
        let value = value.into();
        let html = self.platform.document_element();
        self.platform.set_style_property(html, &format!("--{name}"), &value);
        self.variables.insert(name.to_string(), value);
    }

    /// Change an existing variable. Returns false if it was never created.
    pub fn set_variable(&mut self, name: &str, value: impl Into<String>) -> bool {
        let name = name.trim_start_matches("--");
        if !self.variables.contains_key(name) {
            return false;
        }
        self.create_variable(name, value);
        true
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name.trim_start_matches("--")).map(String::as_str)
    }

    pub fn remove_variable(&mut self, name: &str) -> bool {
        let name = name.trim_start_matches("--");
        let html = self.platform.document_element();
        self.platform.remove_style_property(html, &format!("--{name}"));
        self.variables.shift_remove(name).is_some()
    }

    /// Variables in creation order, names without the `--` prefix.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // =========================================================================
    // Behaviors and state
    // =========================================================================

    /// Register an export-only behavior.
    pub fn behavior(&mut self, source: impl Into<String>) -> Behavior {
        self.behaviors.register(source, None)
    }

    /// Register a behavior that also runs natively while the page is live.
    pub fn behavior_with<F>(&mut self, source: impl Into<String>, native: F) -> Behavior
    where
        F: Fn(&Value) -> std::result::Result<(), BehaviorError> + 'static,
    {
        self.behaviors.register_native(source, native)
    }

    pub fn behaviors(&self) -> &BehaviorRegistry {
        &self.behaviors
    }

    /// Create a state cell, or return the existing one under `name`.
    pub fn add_state(&mut self, name: &str, initial: impl Into<Value>) -> Result<StateCell> {
        if let Some(existing) = self.states.get(name) {
            return Ok(existing.clone());
        }
        self.check_binding(name)?;
        let cell = StateCell::new(name, initial);
        self.states.insert(name.to_string(), cell.clone());
        tracing::debug!(name, initial = %cell.initial(), "added state");
        Ok(cell)
    }

    /// Node ids and state names share one script scope with the generated
    /// `behaviorN` functions; a name must be a free, valid identifier there.
    pub(crate) fn check_binding(&self, name: &str) -> Result<()> {
        if !is_identifier(name) || is_function_name(name) {
            tracing::warn!(name, "name is not usable as a script identifier");
            return Err(PageError::InvalidIdentifier { name: name.to_string() });
        }
        if self.element_names.contains_key(name) || self.states.contains_key(name) {
            tracing::warn!(name, "name is already bound to an element or state");
            return Err(PageError::DuplicateId { id: name.to_string() });
        }
        Ok(())
    }

    pub fn state(&self, name: &str) -> Option<&StateCell> {
        self.states.get(name)
    }

    /// State cells in registration order.
    pub fn states(&self) -> impl Iterator<Item = &StateCell> {
        self.states.values()
    }

    // =========================================================================
    // Animations
    // =========================================================================

    pub fn create_animation(&mut self, name: &str, frames: Frames) -> &Keyframes {
        self.animations.create(name, frames)
    }

    pub fn animation(&self, name: &str) -> Option<&Keyframes> {
        self.animations.get(name)
    }

    pub fn animation_mut(&mut self, name: &str) -> Option<&mut Keyframes> {
        self.animations.get_mut(name)
    }

    /// Re-render an animation after editing it through [`Self::animation_mut`].
    pub fn update_animation(&mut self, name: &str) -> Result<()> {
        if self.animations.update(name) {
            Ok(())
        } else {
            Err(PageError::UnknownAnimation { name: name.to_string() })
        }
    }

    pub fn animations(&self) -> &KeyframeRegistry {
        &self.animations
    }

    // =========================================================================
    // Styles
    // =========================================================================

    pub fn add_style(&mut self, name: &str, style: StyleBag) {
        self.styles.add_style(name, style);
    }

    /// Merge `patch` into `name`, comma-appending on existing keys.
    pub fn add_to_style(&mut self, name: &str, patch: &StyleBag) -> Result<()> {
        self.merge_style(name, patch, false)
    }

    /// Merge `patch` into `name`, replacing existing keys.
    pub fn set_to_style(&mut self, name: &str, patch: &StyleBag) -> Result<()> {
        self.merge_style(name, patch, true)
    }

    pub fn add_to_root(&mut self, patch: &StyleBag) -> Result<()> {
        let root = self.config.root_selector();
        self.merge_style(&root, patch, false)
    }

    pub fn set_to_root(&mut self, patch: &StyleBag) -> Result<()> {
        let root = self.config.root_selector();
        self.merge_style(&root, patch, true)
    }

    /// Publish `name` as a stylesheet rule. False if it is not defined.
    pub fn publish_style(&mut self, name: &str) -> bool {
        self.styles.style_to_css(name)
    }

    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    fn merge_style(&mut self, name: &str, patch: &StyleBag, overwrite: bool) -> Result<()> {
        self.styles
            .add_to_style(name, patch, overwrite)
            .inspect_err(|err| tracing::warn!(name, error = %err, "style patch rejected"))
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Wrap a callback into a channel handler.
    pub fn handler<F>(&mut self, callback: F) -> Handler<AppEvent>
    where
        F: Fn(&AppEvent) -> std::result::Result<(), BehaviorError> + 'static,
    {
        self.events.handler(callback)
    }

    /// Subscribe `handler` to `channel`.
    pub fn on(&mut self, channel: &str, handler: &Handler<AppEvent>) -> bool {
        self.events.add_event_listener(channel, handler)
    }

    /// Unsubscribe `handler`. Returns whether the channel existed.
    pub fn off(&mut self, channel: &str, handler: &Handler<AppEvent>) -> bool {
        self.events.remove_event_listener(channel, handler)
    }

    pub fn trigger(&self, channel: &str, payload: &AppEvent) -> DispatchReport {
        self.events.trigger(channel, payload)
    }

    /// Channel names in creation order.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.events.channels()
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// The root container.
    pub fn root(&self) -> NodeRef {
        NodeRef(0)
    }

    /// Append `node` to the root container.
    ///
    /// Returns `false` for unknown nodes and for the root itself.
    pub fn append_child(&mut self, node: NodeRef) -> bool {
        let Some(handle) = self.node_handle(node) else {
            tracing::warn!(node = node.index(), "unknown node, not appended");
            return false;
        };
        let root = self.nodes[0].handle;
        self.platform.append_child(root, handle)
    }

    /// Detach `node` from its parent. The root cannot be detached.
    pub fn detach(&mut self, node: NodeRef) -> bool {
        if node == self.root() {
            return false;
        }
        match self.node_handle(node) {
            Some(handle) => {
                self.platform.detach(handle);
                true
            }
            None => false,
        }
    }

    /// Unwire `behavior` from `channel` of `node`, live and in the export.
    pub fn remove_node_listener(&mut self, node: NodeRef, channel: &str, behavior: &Behavior) -> bool {
        let Some(record) = self.nodes.get_mut(node.0) else {
            return false;
        };
        let Some(behaviors) = record.events.get_mut(channel) else {
            return false;
        };
        let before = behaviors.len();
        behaviors.retain(|b| b != behavior);
        if behaviors.is_empty() {
            record.events.shift_remove(channel);
        }
        self.platform.remove_event_listener(record.handle, channel, behavior);
        before != record.events.get(channel).map_or(0, Vec::len)
    }

    pub fn node_handle(&self, node: NodeRef) -> Option<P::Node> {
        self.nodes.get(node.0).map(|record| record.handle)
    }

    pub fn node_by_id(&self, id: &str) -> Option<NodeRef> {
        self.element_names.get(id).copied()
    }

    /// Behaviors wired to `node`, per channel.
    pub fn behaviors_of(&self, node: NodeRef) -> Option<&IndexMap<String, Vec<Behavior>>> {
        self.nodes.get(node.0).map(|record| &record.events)
    }

    /// Number of nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // =========================================================================
    // Dependencies and startup
    // =========================================================================

    /// Load an external script and/or run an initializer.
    ///
    /// Sources are recorded once and get a `<script src>` on the live
    /// document. An initializer runs natively right away; one whose source
    /// is not a function is skipped with a warning.
    pub fn add_dependency(&mut self, src: Option<&str>, init: Option<&Behavior>) -> DispatchReport {
        let mut report = DispatchReport::default();

        if let Some(src) = src {
            if self.dependencies.add_source(src) {
                let script = self.platform.create_element("script");
                self.platform.set_attribute(script, "src", src);
                let body = self.platform.body();
                self.platform.append_child(body, script);
                tracing::debug!(src, "added dependency");
            }
        }

        if let Some(init) = init {
            if !init.is_function() {
                tracing::warn!(source = init.source(), "dependency initializer is not a function, skipped");
            } else if self.dependencies.add_initializer(init) {
                call_isolated(&mut report, "dependency", || init.invoke(&Value::Null));
            }
        }
        report
    }

    pub fn dependencies(&self) -> &DependencyList {
        &self.dependencies
    }

    /// Set the startup hook exported as `window.onload`.
    pub fn set_onload(&mut self, behavior: &Behavior) {
        self.onload = Some(behavior.clone());
    }

    pub fn onload(&self) -> Option<&Behavior> {
        self.onload.as_ref()
    }

    /// Run the startup hook natively, if one is set.
    pub fn run_onload(&self) -> DispatchReport {
        let mut report = DispatchReport::default();
        if let Some(onload) = &self.onload {
            call_isolated(&mut report, "onload", || onload.invoke(&Value::Null));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_new_sets_up_document() {
        let app = Application::new(AppConfig::default().with_title("Demo"));
        let dom = app.platform();
        let head = dom.outer_html(dom.head());

        assert_eq!(
            head,
            concat!(
                r#"<head><meta charset="UTF-8">"#,
                r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#,
                "<title>Demo</title></head>"
            )
        );
        assert_eq!(
            dom.outer_html(dom.body()),
            r#"<body><div class="pageRoot"></div></body>"#
        );
        assert_eq!(
            app.styles().published_text(".pageRoot"),
            Some(".pageRoot{display:flex;width:100vw;height:100vh;}")
        );
    }

    #[test]
    fn test_set_title_updates_document() {
        let mut app = Application::default();
        app.set_title("Renamed");
        assert_eq!(app.title(), "Renamed");
        let dom = app.platform();
        assert!(dom.outer_html(dom.head()).contains("<title>Renamed</title>"));
    }

    #[test]
    fn test_variables_mirror_onto_html() {
        let mut app = Application::default();
        assert!(!app.set_variable("accent", "red"));

        app.create_variable("accent", "red");
        assert!(app.set_variable("--accent", "blue"));
        assert_eq!(app.variable("accent"), Some("blue"));

        let html = app.platform().document_element();
        assert_eq!(app.platform().style_property(html, "--accent"), Some("blue".to_string()));

        assert!(app.remove_variable("accent"));
        assert_eq!(app.platform().style_property(html, "--accent"), None);
        assert_eq!(app.variables().count(), 0);
    }

    #[test]
    fn test_add_state_returns_existing() {
        let mut app = Application::default();
        let first = app.add_state("count", 0).unwrap();
        first.set(3);
        let again = app.add_state("count", 99).unwrap();

        assert_eq!(again.get(), Value::from(3));
        assert_eq!(again.initial(), &Value::from(0));
        assert_eq!(app.states().count(), 1);
    }

    #[test]
    fn test_add_state_rejects_bad_identifier() {
        let mut app = Application::default();
        assert!(matches!(
            app.add_state("my-count", 0),
            Err(PageError::InvalidIdentifier { .. })
        ));
        assert!(app.state("my-count").is_none());
    }

    #[test]
    fn test_nodes_and_states_share_one_namespace() {
        let mut app = Application::default();
        app.create("p", NodeConfig::new(), "0", Some("count")).unwrap();
        assert!(matches!(app.add_state("count", 0), Err(PageError::DuplicateId { .. })));
        assert!(app.state("count").is_none());

        app.add_state("total", 0).unwrap();
        assert!(matches!(
            app.create("p", NodeConfig::new(), "", Some("total")),
            Err(PageError::DuplicateId { .. })
        ));
        assert_eq!(app.export().unwrap().matches("const total=").count(), 1);
    }

    #[test]
    fn test_generated_and_reserved_names_rejected() {
        let mut app = Application::default();
        for name in ["behavior0", "behavior17", "class", "function"] {
            assert!(
                matches!(app.create("div", NodeConfig::new(), "", Some(name)), Err(PageError::InvalidIdentifier { .. })),
                "accepted node id {name:?}"
            );
            assert!(
                matches!(app.add_state(name, 0), Err(PageError::InvalidIdentifier { .. })),
                "accepted state {name:?}"
            );
        }
        assert!(app.add_state("behaviors", 0).is_ok());
        assert_eq!(app.node_count(), 1);
    }

    #[test]
    fn test_root_cannot_be_appended() {
        let mut app = Application::default();
        let node = app.create("p", NodeConfig::new(), "x", None).unwrap();
        assert!(app.append_child(node));
        assert!(!app.append_child(app.root()));

        let html = app.export().unwrap();
        assert!(html.contains(r#"<body><div class="pageRoot"><p>x</p></div>"#));
    }

    #[test]
    fn test_root_style_patches() {
        let mut app = Application::default();
        app.add_to_root(&style_bag! { "gap" => "4px" }).unwrap();
        app.set_to_root(&style_bag! { "display" => "grid" }).unwrap();
        assert_eq!(
            app.styles().published_text(".pageRoot"),
            Some(".pageRoot{display:grid;width:100vw;height:100vh;gap:4px;}")
        );
        assert!(matches!(
            app.add_to_style("missing", &StyleBag::new()),
            Err(PageError::UnknownStyle { .. })
        ));
    }

    #[test]
    fn test_update_animation() {
        let mut app = Application::default();
        app.create_animation("fade", crate::frames! { "from" => { "opacity" => "0" } });
        if let Some(fade) = app.animation_mut("fade") {
            fade.frames_mut()
                .insert("to".to_string(), [("opacity".to_string(), "1".to_string())].into_iter().collect());
        }
        app.update_animation("fade").unwrap();

        assert_eq!(
            app.animation("fade").map(Keyframes::text),
            Some("@keyframes fade{from{opacity:0;}to{opacity:1;}}")
        );
        assert!(matches!(
            app.update_animation("spin"),
            Err(PageError::UnknownAnimation { .. })
        ));
    }

    #[test]
    fn test_dependency_recorded_once_and_initializer_runs() {
        let runs = Rc::new(Cell::new(0));
        let mut app = Application::default();
        let init = {
            let runs = runs.clone();
            app.behavior_with("() => { lib.init(); }", move |_| {
                runs.set(runs.get() + 1);
                Ok(())
            })
        };

        app.add_dependency(Some("lib.js"), Some(&init));
        app.add_dependency(Some("lib.js"), Some(&init));
        let bogus = app.behavior("lib.init()");
        app.add_dependency(None, Some(&bogus));

        assert_eq!(runs.get(), 1);
        assert_eq!(app.dependencies().sources().collect::<Vec<_>>(), vec!["lib.js"]);
        assert_eq!(app.dependencies().initializers().len(), 1);
    }

    #[test]
    fn test_onload_runs_isolated() {
        let mut app = Application::default();
        assert_eq!(app.run_onload().invoked(), 0);

        let failing = app.behavior_with("() => { start(); }", |_| Err(BehaviorError::new("no start")));
        app.set_onload(&failing);
        let report = app.run_onload();
        assert_eq!(report.failures, vec![BehaviorError::new("no start")]);
    }

    #[test]
    fn test_detach_and_remove_listener() {
        let mut app = Application::default();
        let say = app.behavior("() => { say(); }");
        let node = app
            .create("button", NodeConfig::new().on("click", &say), "Hi", None)
            .unwrap();
        app.append_child(node);

        assert!(!app.detach(app.root()));
        assert!(app.remove_node_listener(node, "click", &say));
        assert!(!app.remove_node_listener(node, "click", &say));
        assert!(app.behaviors_of(node).unwrap().is_empty());
        assert_eq!(app.platform().listener_count(app.node_handle(node).unwrap(), "click"), 0);

        assert!(app.detach(node));
        let root = app.node_handle(app.root()).unwrap();
        assert_eq!(app.platform().outer_html(root), r#"<div class="pageRoot"></div>"#);
    }

    #[test]
    fn test_channels_listed_in_creation_order() {
        let mut app = Application::default();
        let noop = app.handler(|_| Ok(()));
        app.on("saved", &noop);
        app.on("loaded", &noop);
        assert_eq!(app.events().collect::<Vec<_>>(), vec!["saved", "loaded"]);
        assert!(app.off("saved", &noop));
        assert_eq!(app.trigger("saved", &AppEvent::Value(Value::Null)).invoked(), 0);
    }
}
