//! Glossary entries.

use lexlang::token::Token;
use std::collections::HashMap;

/// A single glossary entry.
///
/// An entry is identified by its label, belongs to exactly one glossary (its
/// type), has a category, and carries a map of named fields whose values are
/// token sequences. The well-known fields (`name`, `text`, `plural`,
/// `description` and so on) have defaulting rules applied at definition
/// time; arbitrary user fields are stored as given.
///
/// Whether an entry has been used in the document is *not* part of the
/// entry: the used flags live in the registry, where they participate in
/// the grouping discipline.
#[derive(Debug, Clone)]
pub struct Entry {
    label: String,
    glossary_type: String,
    category: String,
    parent: Option<String>,
    fields: HashMap<String, Vec<Token>>,
    index: usize,
}

impl Entry {
    pub(crate) fn new(
        label: String,
        glossary_type: String,
        category: String,
        parent: Option<String>,
        fields: HashMap<String, Vec<Token>>,
        index: usize,
    ) -> Entry {
        Entry {
            label,
            glossary_type,
            category,
            parent,
            fields,
            index,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The type name of the glossary this entry belongs to.
    pub fn glossary_type(&self) -> &str {
        &self.glossary_type
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// The label of this entry's parent, for hierarchical glossaries.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// The position of this entry in definition order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The value of the named field, or [None] if the field is not set.
    pub fn field(&self, name: &str) -> Option<&[Token]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Set a field, replacing any previous value.
    pub fn set_field<T: Into<String>>(&mut self, name: T, value: Vec<Token>) {
        self.fields.insert(name.into(), value);
    }

    /// The characters of the named field, with command references skipped.
    ///
    /// This is the form used for sorting and headings, where only the
    /// character content matters.
    pub fn field_text(&self, name: &str) -> Option<String> {
        self.field(name)
            .map(|tokens| tokens.iter().filter_map(Token::char).collect())
    }

    /// The key this entry is sorted under: the `sort` field, falling back to
    /// `name`, falling back to the label.
    pub fn sort_key(&self) -> String {
        self.field_text("sort")
            .filter(|s| !s.is_empty())
            .or_else(|| self.field_text("name").filter(|s| !s.is_empty()))
            .unwrap_or_else(|| self.label.clone())
    }

    /// Apply the field defaulting rules.
    ///
    /// The chain: `name` defaults to the label, `text` to `name`, `first`
    /// to `text`, and `plural` to `text` with the plural suffix appended.
    /// `firstplural` defaults to `first` with the suffix appended when
    /// `first` was given explicitly, and to `plural` otherwise.
    /// `symbolplural` defaults to `symbol` when a symbol is present.
    pub(crate) fn fill_default_fields(&mut self, plural_suffix: &[Token]) {
        if !self.has_field("name") {
            let name = self.label.chars().map(Token::new_character).collect();
            self.set_field("name", name);
        }
        if !self.has_field("text") {
            let text = self.fields["name"].clone();
            self.set_field("text", text);
        }
        let explicit_first = self.has_field("first");
        if !explicit_first {
            let first = self.fields["text"].clone();
            self.set_field("first", first);
        }
        if !self.has_field("plural") {
            let mut plural = self.fields["text"].clone();
            plural.extend_from_slice(plural_suffix);
            self.set_field("plural", plural);
        }
        if !self.has_field("firstplural") {
            let firstplural = if explicit_first {
                let mut firstplural = self.fields["first"].clone();
                firstplural.extend_from_slice(plural_suffix);
                firstplural
            } else {
                self.fields["plural"].clone()
            };
            self.set_field("firstplural", firstplural);
        }
        if self.has_field("symbol") && !self.has_field("symbolplural") {
            let symbolplural = self.fields["symbol"].clone();
            self.set_field("symbolplural", symbolplural);
        }
    }
}
