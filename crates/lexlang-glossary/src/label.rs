//! Lazy, cached label resolution.

use crate::registry::Component;
use crate::registry::EntryId;
use crate::Entry;
use std::cell::Cell;

/// A reference to a glossary entry by label.
///
/// The label text is fixed; the resolution into the registry is lazy and
/// cached. The cache holds the entry's slot id and the registry generation
/// at which it was computed. When the entry is redefined the registry bumps
/// its generation, so the next resolution detects the stale cache and looks
/// the label up again instead of returning a dangling result. Repeated use
/// of an unchanged label never re-scans the entry table.
#[derive(Debug)]
pub struct GlsLabel {
    label: String,
    cache: Cell<Option<(EntryId, u64)>>,
}

impl GlsLabel {
    pub fn new<T: Into<String>>(label: T) -> GlsLabel {
        GlsLabel {
            label: label.into(),
            cache: Cell::new(None),
        }
    }

    /// The literal label text.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Resolve the label against the registry.
    ///
    /// A missing entry is not an error; callers decide the severity.
    pub fn resolve<'a>(&self, registry: &'a Component) -> Option<&'a Entry> {
        if let Some((id, generation)) = self.cache.get() {
            if generation == registry.generation() {
                return registry.entry_by_id(id);
            }
        }
        match registry.entry_id(&self.label) {
            Some(id) => {
                self.cache.set(Some((id, registry.generation())));
                registry.entry_by_id(id)
            }
            None => {
                self.cache.set(None);
                None
            }
        }
    }

    /// Drop the cached resolution, forcing the next [resolve](GlsLabel::resolve)
    /// to look the label up again.
    pub fn refresh(&self) {
        self.cache.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn define(component: &mut Component, label: &str, name: &str) {
        let fields = HashMap::from([(
            "name".to_string(),
            name.chars()
                .map(lexlang::token::Token::new_character)
                .collect(),
        )]);
        component
            .define_entry(label, "main", "general", None, fields, &[])
            .unwrap();
    }

    #[test]
    fn resolution_is_cached_and_correct() {
        let mut component = Component::default();
        define(&mut component, "color", "color");
        let label = GlsLabel::new("color");
        assert_eq!(label.resolve(&component).unwrap().label(), "color");
        // Second resolve hits the cache.
        assert_eq!(label.resolve(&component).unwrap().label(), "color");
    }

    #[test]
    fn missing_entry_resolves_to_none() {
        let component = Component::default();
        let label = GlsLabel::new("missing");
        assert!(label.resolve(&component).is_none());
    }

    #[test]
    fn redefinition_invalidates_the_cache() {
        let mut component = Component::default();
        define(&mut component, "color", "color");
        let label = GlsLabel::new("color");
        assert_eq!(
            label.resolve(&component).unwrap().field_text("name"),
            Some("color".into())
        );
        let fields = HashMap::from([(
            "name".to_string(),
            "colour"
                .chars()
                .map(lexlang::token::Token::new_character)
                .collect(),
        )]);
        component
            .redefine_entry("color", "main", "general", None, fields, &[])
            .unwrap();
        assert_eq!(
            label.resolve(&component).unwrap().field_text("name"),
            Some("colour".into())
        );
    }

    #[test]
    fn definition_after_a_miss_is_observed() {
        let mut component = Component::default();
        let label = GlsLabel::new("color");
        assert!(label.resolve(&component).is_none());
        define(&mut component, "color", "color");
        assert!(label.resolve(&component).is_some());
    }

    #[test]
    fn explicit_refresh_forces_a_new_lookup() {
        let mut component = Component::default();
        define(&mut component, "color", "color");
        let label = GlsLabel::new("color");
        assert!(label.resolve(&component).is_some());
        label.refresh();
        assert!(label.resolve(&component).is_some());
    }
}
