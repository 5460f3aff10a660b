//! Export - freeze a running application into one HTML document.
//!
//! The exporter only reads. It walks the platform tree from the root
//! container, re-expresses every node's behavior table as `on*` attributes,
//! and writes one script that declares each referenced behavior once
//! (`behaviorN`), binds named nodes, rebuilds state cells from their
//! initial values and replays dependency initializers and the startup hook.
//!
//! Document layout:
//!
//! ```text
//! <!DOCTYPE html><html lang style="--vars">
//!   <head> metas, title
//!     <style id="pageAnimations"> keyframes
//!     <style id="pageStyles"> reset, published rules
//!   <body> root container subtree
//!     <script src> per dependency
//!     <script> behaviors, node bindings, states, initializers, onload
//! ```

mod functions;
mod sink;

pub use sink::{ArtifactSink, DirectorySink, MemorySink};

pub(crate) use functions::is_function_name;
use functions::{FUNCTION_PREFIX, FunctionTable};

use crate::app::{Application, ROOT_RESET};
use crate::dom::{DomChild, Platform, escape_attribute, escape_text, is_void_element};
use crate::error::{PageError, Result};

/// Id of the `<style>` element holding keyframes.
pub const ANIMATIONS_STYLE_ID: &str = "pageAnimations";
/// Id of the `<style>` element holding the reset and published rules.
pub const STYLES_STYLE_ID: &str = "pageStyles";

impl<P: Platform> Application<P> {
    /// Serialize the whole application.
    ///
    /// Fails when a referenced behavior or initializer is not a function, or
    /// the startup hook is not one ([`PageError::InitializerNotFunction`]).
    pub fn export(&self) -> Result<String> {
        let mut functions = FunctionTable::new();
        let mut out = String::from("<!DOCTYPE html>");

        self.write_html_open(&mut out);
        self.write_head(&mut out, &mut functions);

        out.push_str("<body>");
        let root = self.nodes[0].handle;
        self.write_element(&mut out, root, &mut functions);
        for src in self.dependencies.sources() {
            out.push_str("<script src=\"");
            out.push_str(&escape_attribute(src));
            out.push_str("\"></script>");
        }

        let script = self.script(&mut functions)?;
        out.push_str("<script>");
        out.push_str(&escape_script_close(&script));
        out.push_str("</script></body></html>");

        tracing::debug!(
            bytes = out.len(),
            functions = functions.len(),
            states = self.states.len(),
            "exported application"
        );
        Ok(out)
    }

    /// Export and hand the document to `sink`, named `file_name` or
    /// `<title>.html`. Returns the name used.
    pub fn export_to(&self, sink: &mut dyn ArtifactSink, file_name: Option<&str>) -> Result<String> {
        let text = self.export()?;
        let file_name = match file_name {
            Some(name) => name.to_string(),
            None => format!("{}.html", self.config.title),
        };
        sink.deliver(&file_name, &text)?;
        Ok(file_name)
    }

    // =========================================================================
    // Markup
    // =========================================================================

    fn write_html_open(&self, out: &mut String) {
        out.push_str("<html");
        if let Some(lang) = &self.config.lang {
            out.push_str(" lang=\"");
            out.push_str(&escape_attribute(lang));
            out.push('"');
        }
        if !self.variables.is_empty() {
            let vars: String = self.variables.iter().map(|(name, value)| format!("--{name}:{value};")).collect();
            out.push_str(" style=\"");
            out.push_str(&escape_attribute(&vars));
            out.push('"');
        }
        out.push('>');
    }

    fn write_head(&self, out: &mut String, functions: &mut FunctionTable) {
        out.push_str("<head>");
        for child in self.platform.children(self.platform.head()) {
            match child {
                DomChild::Element(node) => self.write_element(out, node, functions),
                DomChild::Text(text) => out.push_str(&escape_text(&text)),
            }
        }

        out.push_str(&format!("<style id=\"{ANIMATIONS_STYLE_ID}\">"));
        for (_, keyframes) in self.animations.iter() {
            out.push_str(keyframes.text());
        }
        out.push_str("</style>");

        out.push_str(&format!("<style id=\"{STYLES_STYLE_ID}\">"));
        out.push_str(ROOT_RESET);
        for (_, text) in self.styles.published() {
            out.push_str(text);
        }
        out.push_str("</style></head>");
    }

    /// Pre-order walk: opening tag, behavior attributes, children, close.
    fn write_element(&self, out: &mut String, node: P::Node, functions: &mut FunctionTable) {
        out.push_str(&self.platform.opening_tag(node));

        if let Some(record) = self.by_handle.get(&node).and_then(|n| self.nodes.get(n.index())) {
            for (channel, behaviors) in &record.events {
                out.push_str(" on");
                out.push_str(channel);
                out.push_str("=\"");
                for behavior in behaviors {
                    out.push_str(&functions.name(behavior));
                    out.push_str("(event);");
                }
                out.push('"');
            }
        }
        out.push('>');

        let tag = self.platform.tag_name(node);
        if is_void_element(&tag) {
            return;
        }
        for child in self.platform.children(node) {
            match child {
                DomChild::Element(child) => self.write_element(out, child, functions),
                DomChild::Text(text) => out.push_str(&escape_text(&text)),
            }
        }
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
    }

    // =========================================================================
    // Script
    // =========================================================================

    fn script(&self, functions: &mut FunctionTable) -> Result<String> {
        let mut bindings = String::new();
        for id in self.element_names.keys() {
            bindings.push_str(&format!("const {id}=document.getElementById(\"{id}\");"));
        }

        let mut states = String::new();
        for cell in self.states.values() {
            let name = cell.name();
            let initial = cell.initial().to_string().replace("</", "<\\/");
            let mut calls = String::new();
            for listener in cell.listeners() {
                listener
                    .function()
                    .inspect_err(|err| tracing::warn!(state = name, error = %err, "state listener is not a function"))?;
                calls.push_str(&format!("{}({name}.value);", functions.name(&listener)));
            }
            states.push_str(&format!(
                "const {name}={{value:{initial},initial:{initial},get:()=>{name}.value,getInitial:()=>{name}.initial,set:(val)=>{{{name}.value=val;{calls}}}}};"
            ));
        }

        let mut initializers = String::new();
        for init in self.dependencies.initializers() {
            initializers.push_str(&init.function()?.to_statements());
        }

        let onload = match &self.onload {
            Some(hook) => {
                let function = hook.function().map_err(|_| {
                    tracing::warn!(source = hook.source(), "initializer function is not a function");
                    PageError::InitializerNotFunction {
                        source_text: hook.source().to_string(),
                    }
                })?;
                format!("window.onload={};", function.to_arrow())
            }
            None => String::new(),
        };

        // Declarations go first but are only known once every reference
        // above has been numbered.
        let mut script = String::new();
        for (ordinal, behavior) in functions.iter() {
            script.push_str(&format!("const {FUNCTION_PREFIX}{ordinal}={};", behavior.function()?.to_arrow()));
        }
        script.push_str(&bindings);
        script.push_str(&states);
        script.push_str(&initializers);
        script.push_str(&onload);
        Ok(script)
    }
}

/// Break up every `</script` so script text cannot close its element early.
fn escape_script_close(script: &str) -> String {
    const CLOSE: &str = "</script";
    let mut out = String::with_capacity(script.len());
    let mut rest = script;
    while let Some(at) = rest.to_ascii_lowercase().find(CLOSE) {
        out.push_str(&rest[..at]);
        out.push_str("<\\/");
        out.push_str(&rest[at + 2..at + CLOSE.len()]);
        rest = &rest[at + CLOSE.len()..];
    }
    out.push_str(rest);
    out
}
