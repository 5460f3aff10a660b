//! Error types for page construction and export.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Shape of a style property: a plain value or a nested block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleShape {
    Flat,
    Nested,
}

impl fmt::Display for StyleShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleShape::Flat => f.write_str("a flat value"),
            StyleShape::Nested => f.write_str("a nested block"),
        }
    }
}

/// Errors raised by authoring operations and by export.
#[derive(Debug, Error)]
pub enum PageError {
    // === Authoring Errors ===
    /// The name is already bound to a node or a state cell.
    #[error("element or state of name '{id}' already exists")]
    DuplicateId { id: String },

    /// Node ids and state names become script bindings in the export.
    #[error("'{name}' is not a valid script identifier")]
    InvalidIdentifier { name: String },

    /// Behavior source text that does not describe a function.
    #[error("behavior is not a function: {source_text}")]
    NotAFunction { source_text: String },

    /// A patch tried to change a style key from flat to nested or back.
    #[error("style '{name}' key '{key}' holds {existing} but the patch supplies {supplied}")]
    StyleShapeMismatch {
        name: String,
        key: String,
        existing: StyleShape,
        supplied: StyleShape,
    },

    /// Startup hook whose source is not a function.
    #[error("initializer function is not a function: {source_text}")]
    InitializerNotFunction { source_text: String },

    // === Lookup Misses ===
    /// No style definition under this name.
    #[error("style '{name}' is not defined")]
    UnknownStyle { name: String },

    /// No keyframes definition under this name.
    #[error("animation '{name}' is not defined")]
    UnknownAnimation { name: String },

    // === Configuration ===
    /// Application configuration that could not be parsed.
    #[error("invalid application config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    // === Delivery ===
    /// Failed to persist the exported document.
    #[error("failed to write {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PageError>;

/// Failure reported by a listener or behavior while running live.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BehaviorError {
    message: String,
}

impl BehaviorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
