//! StyleMap - named style definitions and their published stylesheet text.
//!
//! A definition is only a composition source until it is published with
//! [`StyleMap::style_to_css`]. Publishing materializes it as a real rule
//! (`.name{...}`) that nodes reference by class or id; after that every
//! change to the definition regenerates the rule text.

use indexmap::IndexMap;

use super::case::to_kebab_case;
use crate::error::{PageError, Result};
use crate::types::{StyleBag, StyleEntry, StyleValue};

/// Named style definitions plus published rule text.
#[derive(Debug, Default, Clone)]
pub struct StyleMap {
    styles: IndexMap<String, StyleBag>,
    /// Published rules in first-publish order.
    published: IndexMap<String, String>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Definitions
    // =========================================================================

    /// Define or replace a named style.
    pub fn add_style(&mut self, name: &str, style: StyleBag) {
        self.styles.insert(name.to_string(), style);
        if self.published.contains_key(name) {
            self.style_to_css(name);
        }
    }

    /// Drop a definition and its published rule.
    pub fn remove_style(&mut self, name: &str) -> bool {
        self.published.shift_remove(name);
        self.styles.shift_remove(name).is_some()
    }

    pub fn style(&self, name: &str) -> Option<&StyleBag> {
        self.styles.get(name)
    }

    pub fn styles(&self) -> impl Iterator<Item = (&str, &StyleBag)> {
        self.styles.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `patch` into the definition `name`.
    ///
    /// Flat values are replaced when `overwrite` is set and comma-appended
    /// otherwise (`"a"` + `"b"` → `"a,b"`), which is how transitions and
    /// animations stack. Nested blocks follow the same rule per inner key.
    /// Keys missing from the definition are inserted as given.
    ///
    /// A key cannot change shape: a flat value patched with a nested block
    /// (or the reverse) is rejected and the definition is left untouched.
    pub fn add_to_style(&mut self, name: &str, patch: &StyleBag, overwrite: bool) -> Result<()> {
        let target = self.styles.get_mut(name).ok_or_else(|| PageError::UnknownStyle {
            name: name.to_string(),
        })?;

        for (key, value) in patch {
            if let Some(existing) = target.get(key) {
                if existing.shape() != value.shape() {
                    return Err(PageError::StyleShapeMismatch {
                        name: name.to_string(),
                        key: key.clone(),
                        existing: existing.shape(),
                        supplied: value.shape(),
                    });
                }
            }
        }

        for (key, value) in patch {
            match (target.get_mut(key), value) {
                (None, _) => {
                    target.insert(key.clone(), value.clone());
                }
                (Some(StyleValue::Flat(current)), StyleValue::Flat(value)) => {
                    merge_value(current, value, overwrite);
                }
                (Some(StyleValue::Nested(current)), StyleValue::Nested(inner)) => {
                    for (inner_key, value) in inner {
                        match current.get_mut(inner_key) {
                            Some(existing) => merge_value(existing, value, overwrite),
                            None => {
                                current.insert(inner_key.clone(), value.clone());
                            }
                        }
                    }
                }
                // Shapes were checked above.
                (Some(_), _) => {}
            }
        }

        if self.published.contains_key(name) {
            self.style_to_css(name);
        }
        Ok(())
    }

    /// Merge a style list into one flat bag.
    ///
    /// Named entries contribute their definition unless they are published
    /// (those are applied as selector references by the caller). Inline bags
    /// contribute themselves. Later entries win per top-level key; nested
    /// blocks are carried through unresolved.
    pub fn process_style(&self, entries: &[StyleEntry]) -> StyleBag {
        let mut merged = StyleBag::new();
        for entry in entries {
            let bag = match entry {
                StyleEntry::Named(name) if self.is_published(name) => continue,
                StyleEntry::Named(name) => match self.styles.get(name) {
                    Some(bag) => bag,
                    None => continue,
                },
                StyleEntry::Inline(bag) => bag,
            };
            for (key, value) in bag {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    // =========================================================================
    // Publication
    // =========================================================================

    /// Render the rule text for `name` using the name as selector.
    pub fn style_to_string(&self, name: &str) -> Option<String> {
        self.styles.get(name).map(|bag| render_rule(name, bag))
    }

    /// Publish `name` (or refresh its text if already published).
    ///
    /// Returns false when there is no definition to publish.
    pub fn style_to_css(&mut self, name: &str) -> bool {
        let Some(text) = self.style_to_string(name) else {
            return false;
        };
        tracing::debug!(name, "published style");
        self.published.insert(name.to_string(), text);
        true
    }

    pub fn is_published(&self, name: &str) -> bool {
        self.published.contains_key(name)
    }

    /// Published rule text for `name`.
    pub fn published_text(&self, name: &str) -> Option<&str> {
        self.published.get(name).map(String::as_str)
    }

    /// Published rules in first-publish order.
    pub fn published(&self) -> impl Iterator<Item = (&str, &str)> {
        self.published.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn merge_value(current: &mut String, value: &str, overwrite: bool) {
    if overwrite {
        *current = value.to_string();
    } else {
        current.push(',');
        current.push_str(value);
    }
}

/// `prop:value;` with the property name converted to CSS form.
pub(crate) fn push_declaration(out: &mut String, property: &str, value: &str) {
    out.push_str(&to_kebab_case(property));
    out.push(':');
    out.push_str(value);
    out.push(';');
}

/// `selector{flat...}` followed by `selector:key{...}` per nested block.
pub fn render_rule(selector: &str, bag: &StyleBag) -> String {
    let mut text = String::new();
    text.push_str(selector);
    text.push('{');

    let mut nested = Vec::new();
    for (key, value) in bag {
        match value {
            StyleValue::Flat(value) => push_declaration(&mut text, key, value),
            StyleValue::Nested(inner) => nested.push((key, inner)),
        }
    }
    text.push('}');

    for (key, inner) in nested {
        text.push_str(selector);
        text.push(':');
        text.push_str(key);
        text.push('{');
        for (property, value) in inner {
            push_declaration(&mut text, property, value);
        }
        text.push('}');
    }
    text
}
