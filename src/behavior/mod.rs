//! Behaviors - caller logic that survives export.
//!
//! A behavior is registered as an explicit unit: the script source of a
//! function expression, plus an optional native closure that runs while the
//! page is live. The registry hands out a [`BehaviorId`] at registration
//! time, so "is this the same behavior?" is an id comparison everywhere
//! (listener dedup, export ordinals), never a comparison of closures.
//!
//! # Example
//!
//! ```ignore
//! use spark_page::behavior::BehaviorRegistry;
//!
//! let mut behaviors = BehaviorRegistry::new();
//! let log = behaviors.register_native("(val) => { console.log(val); }", |val| {
//!     println!("{val}");
//!     Ok(())
//! });
//! assert!(log.is_function());
//! ```

mod source;

pub use source::{FunctionSource, is_identifier};

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::error::{BehaviorError, PageError, Result};

/// Native closure run when a behavior fires live.
pub type NativeFn = Rc<dyn Fn(&Value) -> std::result::Result<(), BehaviorError>>;

/// Registration-time identity of a behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BehaviorId(usize);

impl BehaviorId {
    pub fn index(self) -> usize {
        self.0
    }
}

struct BehaviorInner {
    id: BehaviorId,
    source: String,
    function: Option<FunctionSource>,
    native: Option<NativeFn>,
}

/// Shared handle to a registered behavior. Cloning is cheap.
#[derive(Clone)]
pub struct Behavior {
    inner: Rc<BehaviorInner>,
}

impl Behavior {
    pub fn id(&self) -> BehaviorId {
        self.inner.id
    }

    /// Source text exactly as registered.
    pub fn source(&self) -> &str {
        &self.inner.source
    }

    /// Whether the source text is a function expression.
    pub fn is_function(&self) -> bool {
        self.inner.function.is_some()
    }

    /// Parsed function, or [`PageError::NotAFunction`].
    pub fn function(&self) -> Result<&FunctionSource> {
        self.inner.function.as_ref().ok_or_else(|| PageError::NotAFunction {
            source_text: self.inner.source.clone(),
        })
    }

    pub fn has_native(&self) -> bool {
        self.inner.native.is_some()
    }

    /// Run the native closure. Export-only behaviors succeed as no-ops.
    pub fn invoke(&self, value: &Value) -> std::result::Result<(), BehaviorError> {
        match &self.inner.native {
            Some(native) => native(value),
            None => Ok(()),
        }
    }
}

impl PartialEq for Behavior {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Behavior {}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("id", &self.inner.id)
            .field("source", &self.inner.source)
            .field("native", &self.inner.native.is_some())
            .finish()
    }
}

/// Issues behavior ids and keeps every registered behavior.
#[derive(Default)]
pub struct BehaviorRegistry {
    behaviors: Vec<Behavior>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a behavior, optionally with a native closure.
    ///
    /// Source that is not a function is still registered; consumers decide
    /// whether that is a warning (node events) or an error (startup hook).
    pub fn register(&mut self, source: impl Into<String>, native: Option<NativeFn>) -> Behavior {
        let source = source.into();
        let function = FunctionSource::parse(&source).ok();
        let id = BehaviorId(self.behaviors.len());
        if function.is_none() {
            tracing::debug!(?id, %source, "registered behavior that is not a function");
        }

        let behavior = Behavior {
            inner: Rc::new(BehaviorInner {
                id,
                source,
                function,
                native,
            }),
        };
        self.behaviors.push(behavior.clone());
        behavior
    }

    /// Register with a native closure.
    pub fn register_native<F>(&mut self, source: impl Into<String>, native: F) -> Behavior
    where
        F: Fn(&Value) -> std::result::Result<(), BehaviorError> + 'static,
    {
        self.register(source, Some(Rc::new(native)))
    }

    pub fn get(&self, id: BehaviorId) -> Option<&Behavior> {
        self.behaviors.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Behavior> {
        self.behaviors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_ids_are_sequential() {
        let mut registry = BehaviorRegistry::new();
        let a = registry.register("() => {}", None);
        let b = registry.register("() => {}", None);

        assert_eq!(a.id().index(), 0);
        assert_eq!(b.id().index(), 1);
        assert_ne!(a, b);
        assert_eq!(registry.get(b.id()), Some(&b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_clone_keeps_identity() {
        let mut registry = BehaviorRegistry::new();
        let a = registry.register("(x) => { f(x); }", None);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_native_invocation() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let mut registry = BehaviorRegistry::new();
        let behavior = registry.register_native("(v) => { record(v); }", move |v| {
            seen_clone.borrow_mut().push(v.clone());
            Ok(())
        });

        behavior.invoke(&Value::from(3)).unwrap();
        assert_eq!(*seen.borrow(), vec![Value::from(3)]);
    }

    #[test]
    fn test_export_only_behavior_is_noop() {
        let mut registry = BehaviorRegistry::new();
        let behavior = registry.register("() => { alert(1); }", None);
        assert!(!behavior.has_native());
        assert!(behavior.invoke(&Value::Null).is_ok());
    }

    #[test]
    fn test_non_function_source_kept() {
        let mut registry = BehaviorRegistry::new();
        let behavior = registry.register("not a function", None);
        assert!(!behavior.is_function());
        assert!(matches!(behavior.function(), Err(PageError::NotAFunction { .. })));
        assert_eq!(behavior.source(), "not a function");
    }
}
