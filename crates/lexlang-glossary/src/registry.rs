//! The glossary registry.
//!
//! The registry is the process-wide owner of all glossary data: entries,
//! glossaries, categories and the used flags. It is a Lexlang component;
//! the commands in this crate require the interpreter state to hold a
//! registry via the `HasComponent` trait.
//!
//! Entries are stored in a slab and addressed by [EntryId]. Redefining an
//! entry allocates a new slot and bumps the registry *generation*; cached
//! label resolutions (see [GlsLabel](crate::GlsLabel)) carry the generation
//! at which they were computed, so a stale cache is detected and refreshed
//! lazily rather than dangling.
//!
//! The used flags live in a scoped map sharing the grouping discipline of
//! the command map. The interpreter state must forward its group hooks to
//! [Component::begin_group_hook] and [Component::end_group_hook] so the two
//! stay in lockstep.

use crate::Category;
use crate::Entry;
use crate::Glossary;
use lexicraft_stdext::collections::scoped::Scope;
use lexicraft_stdext::collections::scoped::ScopedMap;
use lexlang::diagnostics::Severity;
use lexlang::error;
use lexlang::prelude as lxl;
use lexlang::token::Token;
use lexlang::traits::*;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Identifier of an entry slot in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryId(usize);

/// The glossary registry component.
///
/// A new registry contains the `main` glossary and the `general` category,
/// which are the defaults entries are filed under.
pub struct Component {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    glossaries: HashMap<String, Glossary>,
    categories: HashMap<String, Category>,
    used: ScopedMap<String, bool>,
    generation: u64,
    next_entry_index: usize,
    entry_not_defined_severity: Severity,
}

impl Default for Component {
    fn default() -> Self {
        let mut component = Component {
            entries: vec![],
            index: HashMap::new(),
            glossaries: HashMap::new(),
            categories: HashMap::new(),
            used: Default::default(),
            generation: 0,
            next_entry_index: 0,
            entry_not_defined_severity: Severity::Warning,
        };
        component.register_glossary_type(Glossary::new("main"));
        component.register_category("general");
        component
    }
}

impl Component {
    /// Forward target for the state's begin-group hook.
    pub fn begin_group_hook<S: HasComponent<Component>>(state: &mut S) {
        state.component_mut().used.begin_group();
    }

    /// Forward target for the state's end-group hook.
    pub fn end_group_hook<S: HasComponent<Component>>(state: &mut S) {
        // The VM only invokes the hook for balanced group ends, so the used
        // map always has a group to end here.
        _ = state.component_mut().used.end_group();
    }

    /// The severity with which references to missing entries are reported.
    pub fn entry_not_defined_severity(&self) -> Severity {
        self.entry_not_defined_severity
    }

    /// Configure whether a reference to a missing entry is a warning (the
    /// reference falls back to echoing the label) or a hard error.
    pub fn set_entry_not_defined_severity(&mut self, severity: Severity) {
        self.entry_not_defined_severity = severity;
    }

    /// The current generation, bumped whenever an entry is redefined.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Register a glossary type. Setup-time call; the `\newglossary`
    /// command forwards here.
    ///
    /// Returns false if a glossary with the same type name already exists;
    /// the existing glossary is retained.
    pub fn register_glossary_type(&mut self, glossary: Glossary) -> bool {
        let type_name = glossary.type_name().to_string();
        if self.glossaries.contains_key(&type_name) {
            return false;
        }
        self.glossaries.insert(type_name, glossary);
        true
    }

    /// Register a category. Setup-time call.
    ///
    /// Registering an existing category is a no-op; attributes are kept.
    pub fn register_category<T: Into<String>>(&mut self, label: T) -> &mut Category {
        self.categories.entry(label.into()).or_default()
    }

    pub fn glossary(&self, type_name: &str) -> Option<&Glossary> {
        self.glossaries.get(type_name)
    }

    pub fn category(&self, label: &str) -> Option<&Category> {
        self.categories.get(label)
    }

    /// Set an attribute on a category, creating the category if needed.
    pub fn set_category_attribute<N: Into<String>, V: Into<String>>(
        &mut self,
        category: &str,
        name: N,
        value: V,
    ) {
        self.register_category(category).set_attribute(name, value);
    }

    /// Whether the provided attribute is true for the category of the
    /// provided entry.
    pub fn is_attribute_true(&self, entry: &Entry, attribute: &str) -> bool {
        self.category(entry.category())
            .is_some_and(|category| category.is_attribute_true(attribute))
    }

    /// Define a new entry.
    ///
    /// Fails with a duplicate-entry error if the label is taken (the
    /// original entry is retained) and with a glossary-not-defined error if
    /// the type is unknown. In both failure cases nothing is inserted.
    pub fn define_entry(
        &mut self,
        label: &str,
        glossary_type: &str,
        category: &str,
        parent: Option<String>,
        fields: HashMap<String, Vec<Token>>,
        plural_suffix: &[Token],
    ) -> lxl::Result<EntryId> {
        if self.index.contains_key(label) {
            return Err(error::Error::duplicate_entry(label));
        }
        if !self.glossaries.contains_key(glossary_type) {
            return Err(error::Error::glossary_not_defined(glossary_type));
        }
        let id = self.insert_entry(label, glossary_type, category, parent, fields, plural_suffix);
        Ok(id)
    }

    /// Redefine an existing entry.
    ///
    /// The new definition replaces the old one and the registry generation
    /// is bumped, so cached label resolutions refresh. Fails with an
    /// entry-not-defined error if the label has never been defined, and
    /// with a glossary-not-defined error if the new type is unknown.
    pub fn redefine_entry(
        &mut self,
        label: &str,
        glossary_type: &str,
        category: &str,
        parent: Option<String>,
        fields: HashMap<String, Vec<Token>>,
        plural_suffix: &[Token],
    ) -> lxl::Result<EntryId> {
        let old_id = match self.index.get(label) {
            None => return Err(error::Error::entry_not_defined(label)),
            Some(id) => *id,
        };
        if !self.glossaries.contains_key(glossary_type) {
            return Err(error::Error::glossary_not_defined(glossary_type));
        }
        let old_type = self.entries[old_id].glossary_type().to_string();
        if let Some(glossary) = self.glossaries.get_mut(&old_type) {
            glossary.remove_member(label);
        }
        self.index.remove(label);
        let id = self.insert_entry(label, glossary_type, category, parent, fields, plural_suffix);
        self.generation += 1;
        Ok(id)
    }

    fn insert_entry(
        &mut self,
        label: &str,
        glossary_type: &str,
        category: &str,
        parent: Option<String>,
        fields: HashMap<String, Vec<Token>>,
        plural_suffix: &[Token],
    ) -> EntryId {
        let mut entry = Entry::new(
            label.to_string(),
            glossary_type.to_string(),
            category.to_string(),
            parent,
            fields,
            self.next_entry_index,
        );
        self.next_entry_index += 1;
        entry.fill_default_fields(plural_suffix);
        let id = self.entries.len();
        self.entries.push(entry);
        self.index.insert(label.to_string(), id);
        if let Some(glossary) = self.glossaries.get_mut(glossary_type) {
            glossary.add_member(label);
        }
        EntryId(id)
    }

    /// Resolve a label to its entry.
    ///
    /// A missing entry is not an error at this level; callers decide the
    /// severity.
    pub fn resolve(&self, label: &str) -> Option<&Entry> {
        self.index.get(label).map(|id| &self.entries[*id])
    }

    /// Resolve a label to its slot id, for cache-filling lookups.
    pub fn entry_id(&self, label: &str) -> Option<EntryId> {
        self.index.get(label).copied().map(EntryId)
    }

    /// The entry in the provided slot, if the slot is current.
    ///
    /// A slot abandoned by redefinition resolves to [None]; callers holding
    /// a stale id should look the label up again.
    pub fn entry_by_id(&self, id: EntryId) -> Option<&Entry> {
        let entry = self.entries.get(id.0)?;
        (self.index.get(entry.label()) == Some(&id.0)).then_some(entry)
    }

    /// Mutable access to an entry, for commands that set fields after
    /// definition.
    pub fn entry_mut(&mut self, label: &str) -> Option<&mut Entry> {
        let id = *self.index.get(label)?;
        self.entries.get_mut(id)
    }

    /// Whether the entry with the provided label has been used.
    ///
    /// Entries that have never been marked are unused.
    pub fn is_used(&self, label: &str) -> bool {
        self.used.get(&label.to_string()).copied().unwrap_or(false)
    }

    /// Set the used flag of the provided label.
    ///
    /// A local mark is rolled back when the current group ends, exactly
    /// like a local command binding; a global mark persists.
    pub fn mark_used<T: Into<String>>(&mut self, label: T, used: bool, scope: Scope) {
        self.used.insert(label.into(), used, scope);
    }

    /// Group the members of a glossary under headings.
    ///
    /// The heading of an entry is the uppercased first character of its
    /// sort key; entries whose sort key starts with a non-alphabetic
    /// character are grouped under the `#` heading. Headings are ordered by
    /// character, and entries under a heading keep definition order, so the
    /// result is reproducible across runs.
    pub fn entries_by_heading(&self, glossary_type: &str) -> Vec<(char, Vec<&Entry>)> {
        let mut headings: BTreeMap<char, Vec<&Entry>> = BTreeMap::new();
        let glossary = match self.glossary(glossary_type) {
            None => return vec![],
            Some(glossary) => glossary,
        };
        for label in glossary.members() {
            let entry = match self.resolve(label) {
                None => continue,
                Some(entry) => entry,
            };
            let heading = match entry.sort_key().chars().next() {
                Some(c) if c.is_alphabetic() => c.to_uppercase().next().unwrap_or(c),
                _ => '#',
            };
            headings.entry(heading).or_default().push(entry);
        }
        headings.into_iter().collect()
    }
}
