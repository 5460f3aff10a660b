//! Ordinal table for behaviors referenced by an export.

use indexmap::IndexMap;

use crate::behavior::{Behavior, BehaviorId};

/// Prefix of the names behaviors are declared under in the export.
pub(crate) const FUNCTION_PREFIX: &str = "behavior";

/// Whether `name` has the shape of a generated function name
/// (`behavior` followed by digits).
pub(crate) fn is_function_name(name: &str) -> bool {
    name.strip_prefix(FUNCTION_PREFIX)
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Behavior → ordinal, allocated on first reference.
///
/// One behavior referenced from several places is declared once as
/// `behaviorN` and called by that name everywhere.
#[derive(Debug, Default)]
pub(crate) struct FunctionTable {
    ordinals: IndexMap<BehaviorId, Behavior>,
}

impl FunctionTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Ordinal of `behavior`, allocating the next one if unseen.
    pub(crate) fn ordinal(&mut self, behavior: &Behavior) -> usize {
        let entry = self.ordinals.entry(behavior.id());
        let index = entry.index();
        entry.or_insert_with(|| behavior.clone());
        index
    }

    /// `behaviorN`
    pub(crate) fn name(&mut self, behavior: &Behavior) -> String {
        format!("{FUNCTION_PREFIX}{}", self.ordinal(behavior))
    }

    /// Behaviors in ordinal order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &Behavior)> {
        self.ordinals.values().enumerate()
    }

    pub(crate) fn len(&self) -> usize {
        self.ordinals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::BehaviorRegistry;

    #[test]
    fn test_ordinals_are_first_use_order() {
        let mut behaviors = BehaviorRegistry::new();
        let a = behaviors.register("() => {}", None);
        let b = behaviors.register("() => {}", None);

        let mut table = FunctionTable::new();
        assert_eq!(table.ordinal(&b), 0);
        assert_eq!(table.ordinal(&a), 1);
        assert_eq!(table.ordinal(&b.clone()), 0);
        assert_eq!(table.name(&a), "behavior1");
        assert_eq!(table.len(), 2);

        let order: Vec<_> = table.iter().map(|(n, behavior)| (n, behavior.id())).collect();
        assert_eq!(order, vec![(0, b.id()), (1, a.id())]);
    }

    #[test]
    fn test_function_name_shape() {
        assert!(is_function_name("behavior0"));
        assert!(is_function_name("behavior12"));
        assert!(!is_function_name("behavior"));
        assert!(!is_function_name("behaviors"));
        assert!(!is_function_name("behavior1a"));
        assert!(!is_function_name("count"));
    }
}
