//! # Lexlang glossary subsystem
//!
//! This crate implements a cross-referenced terminology subsystem on top of
//! the Lexlang interpreter: glossary entries with named fields, glossaries
//! as ordered collections of entries, categories with attribute-driven
//! conditional behavior, used flags with group-scoped undo, and indexed
//! listings grouped by heading.
//!
//! The data model lives in the [registry](registry::Component), a Lexlang
//! component owned by the interpreter state. The commands are thin layers
//! over the registry: definitions and references are immediate commands,
//! field access and conditionals are expandable ones. Hosts that configure
//! glossaries programmatically call the registry's setup methods
//! ([register_glossary_type](registry::Component::register_glossary_type),
//! [register_category](registry::Component::register_category)) before
//! interpretation begins; the `\newglossary` family mirrors them at
//! runtime.

extern crate lexlang;

use lexlang::diagnostics;
use lexlang::error;
use lexlang::prelude as lxl;
use lexlang::token::Token;
use lexlang::token::Value;
use lexlang::traits::*;
use lexlang::vm;
use std::collections::HashMap;

pub mod attributes;
mod category;
pub mod conditionals;
pub mod define;
mod entry;
pub mod fields;
mod glossary;
mod label;
pub mod refs;
pub mod registry;
#[cfg(test)]
pub mod testing;
pub mod unset;

pub use category::Category;
pub use entry::Entry;
pub use glossary::Glossary;
pub use label::GlsLabel;
pub use registry::Component;
pub use registry::EntryId;

/// All the built-in commands in the glossary subsystem, including the
/// textual constants the commands rely on.
pub fn built_ins<S: HasComponent<Component>>(
) -> HashMap<&'static str, lexlang::command::BuiltIn<S>> {
    HashMap::from([
        ("Gls", refs::get_gls_capital()),
        ("Glspl", refs::get_glspl_capital()),
        ("gls", refs::get_gls()),
        ("glsentrydesc", fields::get_glsentrydesc()),
        ("glsentryfield", fields::get_glsentryfield()),
        ("glsentryname", fields::get_glsentryname()),
        ("glsentrytext", fields::get_glsentrytext()),
        ("glshasattribute", conditionals::get_glshasattribute()),
        ("glsifattribute", conditionals::get_glsifattribute()),
        ("glslocalreset", unset::get_glslocalreset()),
        ("glslocalunset", unset::get_glslocalunset()),
        ("glspl", refs::get_glspl()),
        ("glsreset", unset::get_glsreset()),
        ("glssetcategoryattribute", attributes::get_glssetcategoryattribute()),
        ("glssetfield", fields::get_glssetfield()),
        ("glsunset", unset::get_glsunset()),
        ("ifglsentryexists", conditionals::get_ifglsentryexists()),
        ("ifglshasparent", conditionals::get_ifglshasparent()),
        ("ifglsused", conditionals::get_ifglsused()),
        ("newglossary", define::get_newglossary()),
        ("newglossaryentry", define::get_newglossaryentry()),
        ("newignoredglossary", define::get_newignoredglossary()),
        ("renewglossaryentry", define::get_renewglossaryentry()),
        // Textual constants.
        ("glossaryname", lexlang::command::BuiltIn::new_textual("Glossary")),
        ("glsdefaulttype", lexlang::command::BuiltIn::new_textual(define::DEFAULT_TYPE)),
        ("glspluralsuffix", lexlang::command::BuiltIn::new_textual("s")),
    ])
}

/// Handle a reference to a label with no entry, at the configured severity.
///
/// At the warning severity, exactly one diagnostic carrying the offending
/// label is reported and processing continues; callers then substitute
/// their fallback. At the error severity the reference is a hard error.
pub(crate) fn entry_not_defined<I>(input: &I, label: &str) -> lxl::Result<()>
where
    I: vm::TokenStream,
    I::S: HasComponent<Component>,
{
    match input.state().component().entry_not_defined_severity() {
        diagnostics::Severity::Error => Err(error::Error::entry_not_defined(label)),
        diagnostics::Severity::Warning => {
            input.report(
                diagnostics::Diagnostic::warning("glossary.entry.not.defined")
                    .with_arg("label", label),
            );
            Ok(())
        }
    }
}

/// Apply a sentence case change: uppercase the first character token.
///
/// Leading spaces are skipped; if the first substantive token is a command
/// reference the text is left unchanged.
pub(crate) fn uppercase_first(tokens: &mut [Token]) {
    for token in tokens.iter_mut() {
        match token.value() {
            Value::Space(_) => continue,
            Value::Letter(c) | Value::Other(c) => {
                if let Some(upper) = c.to_uppercase().next() {
                    *token = Token::new_character(upper);
                }
                return;
            }
            _ => return,
        }
    }
}
