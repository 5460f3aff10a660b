//! # spark-page
//!
//! Reactive page builder that freezes a running application into one
//! self-contained HTML document.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! reactive state.
//!
//! ## Architecture
//!
//! A page is built live: nodes on a [`Platform`] document, reactive
//! [`StateCell`]s, composable named styles and keyframe animations. Caller
//! logic is registered as [`Behavior`]s, each carrying the script source it
//! exports as plus an optional native closure that runs while live. Export
//! reads everything back out:
//!
//! ```text
//! Application ─┬─ Platform tree ──────────► markup + on* attributes
//!              ├─ StyleMap / Keyframes ───► <style> blocks
//!              └─ Behaviors / States ─────► <script>
//! ```
//!
//! ## Modules
//!
//! - [`app`] - Application, node factory, config, dependencies
//! - [`behavior`] - Behavior registry and function-source recovery
//! - [`state`] - State cells and named event channels
//! - [`style`] - Style map, keyframes, property-name conversion
//! - [`dom`] - Platform trait and the in-memory document
//! - [`export`] - Document serializer and artifact sinks

pub mod app;
pub mod behavior;
pub mod dispatch;
pub mod dom;
pub mod error;
pub mod export;
pub mod state;
pub mod style;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use app::{AppConfig, Application, DependencyList, FindResult, NodeConfig, ROOT_RESET};
pub use behavior::{Behavior, BehaviorId, BehaviorRegistry, FunctionSource, NativeFn};
pub use dispatch::DispatchReport;
pub use dom::{DomChild, DomNodeId, MemoryDom, Platform};
pub use error::{BehaviorError, PageError, Result, StyleShape};
pub use export::{ArtifactSink, DirectorySink, MemorySink};
pub use state::{EventRegistry, Handler, HandlerId, StateCell};
pub use style::{FrameProps, Frames, KeyframeRegistry, Keyframes, StyleMap, to_kebab_case};
