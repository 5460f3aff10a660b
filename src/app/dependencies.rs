//! External scripts and their initializers.

use indexmap::IndexSet;

use crate::behavior::Behavior;

/// Script sources and initializer behaviors, both in registration order and
/// both recorded once.
#[derive(Debug, Default, Clone)]
pub struct DependencyList {
    sources: IndexSet<String>,
    initializers: Vec<Behavior>,
}

impl DependencyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a source. Returns false if it was already present.
    pub fn add_source(&mut self, src: &str) -> bool {
        self.sources.insert(src.to_string())
    }

    /// Record an initializer. Returns false if it was already present.
    pub fn add_initializer(&mut self, init: &Behavior) -> bool {
        if self.initializers.contains(init) {
            return false;
        }
        self.initializers.push(init.clone());
        true
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(String::as_str)
    }

    pub fn initializers(&self) -> &[Behavior] {
        &self.initializers
    }
}
