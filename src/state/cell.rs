//! StateCell - a reactive value with a fixed initial snapshot.
//!
//! The current value lives in a spark-signals [`Signal`], so deriveds and
//! effects can read it like any other signal. Listeners are behaviors: they
//! run natively on `set` and are re-declared by the exporter so the exported
//! `set` calls them too.
//!
//! # Example
//!
//! ```ignore
//! let count = app.add_state("count", 0)?;
//! count.add_listener(&show_count);
//! count.set(1); // show_count runs with 1
//! assert_eq!(count.initial(), &Value::from(0));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use spark_signals::{Signal, signal};

use crate::behavior::Behavior;
use crate::dispatch::{DispatchReport, call_isolated};

struct StateInner {
    name: String,
    initial: Value,
    current: Signal<Value>,
    listeners: RefCell<Vec<Behavior>>,
}

/// Shared handle to a reactive state cell. Cloning is cheap.
#[derive(Clone)]
pub struct StateCell {
    inner: Rc<StateInner>,
}

impl StateCell {
    pub fn new(name: impl Into<String>, initial: impl Into<Value>) -> Self {
        let initial = initial.into();
        Self {
            inner: Rc::new(StateInner {
                name: name.into(),
                current: signal(initial.clone()),
                initial,
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current value.
    pub fn get(&self) -> Value {
        self.inner.current.get()
    }

    /// Value the cell was created with. Never changes.
    pub fn initial(&self) -> &Value {
        &self.inner.initial
    }

    /// Underlying signal, for use in deriveds and effects.
    pub fn signal(&self) -> Signal<Value> {
        self.inner.current.clone()
    }

    /// Assign a new value and notify every listener in insertion order.
    ///
    /// A listener that fails is logged and skipped; the rest still run.
    /// Listeners may call `set` again (on this or any cell); the nested call
    /// completes before the next listener runs.
    pub fn set(&self, value: impl Into<Value>) -> DispatchReport {
        let value = value.into();
        self.inner.current.set(value.clone());

        // Snapshot so listeners can add/remove listeners or re-enter `set`.
        let listeners = self.inner.listeners.borrow().clone();
        let mut report = DispatchReport::default();
        for listener in &listeners {
            call_isolated(&mut report, &self.inner.name, || listener.invoke(&value));
        }
        report
    }

    /// Add a listener. Returns false if it was already registered.
    pub fn add_listener(&self, listener: &Behavior) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        if listeners.contains(listener) {
            return false;
        }
        listeners.push(listener.clone());
        true
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn remove_listener(&self, listener: &Behavior) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l != listener);
        listeners.len() != before
    }

    /// Listeners in registration order.
    pub fn listeners(&self) -> Vec<Behavior> {
        self.inner.listeners.borrow().clone()
    }

    pub fn has_listeners(&self) -> bool {
        !self.inner.listeners.borrow().is_empty()
    }
}

impl fmt::Debug for StateCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("name", &self.inner.name)
            .field("initial", &self.inner.initial)
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}
