//! The entry reference commands `\gls`, `\Gls`, `\glspl` and `\Glspl`.
//!
//! A reference resolves its label, marks the entry used, and pushes the
//! appropriate field text back onto the input: the `first`/`firstplural`
//! field on the entry's first use, the `text`/`plural` field afterwards.
//! The capitalized variants apply a sentence-case change to the first
//! character of the pushed text.
//!
//! Marking the entry used is a side effect, so references are immediate
//! commands, not expandable ones. The mark is global, matching the way a
//! first use anywhere in a document is a first use for the whole document;
//! the unset and reset commands provide local variants.
//!
//! A reference to a label with no entry falls back to echoing the literal
//! label and reports exactly one diagnostic.

use crate::registry::Component;
use crate::GlsLabel;
use lexicraft_stdext::collections::scoped::Scope;
use lexlang::prelude as lxl;
use lexlang::traits::*;
use lexlang::*;

pub const GLS_DOC: &str = "Reference a glossary entry";
pub const GLS_CAPITAL_DOC: &str = "Reference a glossary entry, capitalizing the first letter";
pub const GLSPL_DOC: &str = "Reference a glossary entry in the plural";
pub const GLSPL_CAPITAL_DOC: &str =
    "Reference a glossary entry in the plural, capitalizing the first letter";

/// Get the `\gls` command.
pub fn get_gls<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(gls_fn).with_doc(GLS_DOC)
}

/// Get the `\Gls` command.
pub fn get_gls_capital<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(gls_capital_fn).with_doc(GLS_CAPITAL_DOC)
}

/// Get the `\glspl` command.
pub fn get_glspl<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(glspl_fn).with_doc(GLSPL_DOC)
}

/// Get the `\Glspl` command.
pub fn get_glspl_capital<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(glspl_capital_fn).with_doc(GLSPL_CAPITAL_DOC)
}

fn gls_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    reference_fn(input, false, false)
}

fn gls_capital_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    reference_fn(input, true, false)
}

fn glspl_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    reference_fn(input, false, true)
}

fn glspl_capital_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    reference_fn(input, true, true)
}

fn reference_fn<S: HasComponent<Component>>(
    input: &mut vm::ExecutionInput<S>,
    capitalize: bool,
    plural: bool,
) -> lxl::Result<()> {
    // The optional argument carries presentation options (counter, format)
    // that only matter to a document writer; it is accepted so references
    // using it parse, and an absent argument is an empty configuration.
    let _options = parse::parse_optional_keyval(input.unexpanded())?;
    let label = GlsLabel::new(parse::parse_label(
        "reading the label of a glossary reference",
        input.expanded(),
    )?);
    let field_tokens = {
        let registry = input.state().component();
        label.resolve(registry).map(|entry| {
            let field = match (plural, registry.is_used(label.label())) {
                (false, false) => "first",
                (false, true) => "text",
                (true, false) => "firstplural",
                (true, true) => "plural",
            };
            entry.field(field).map(<[token::Token]>::to_vec)
        })
    };
    match field_tokens {
        None => {
            crate::entry_not_defined(input, label.label())?;
            input.push_string_tokens(label.label());
        }
        Some(tokens) => {
            input
                .state_mut()
                .component_mut()
                .mark_used(label.label(), true, Scope::Global);
            let mut tokens = tokens.unwrap_or_default();
            if capitalize {
                crate::uppercase_first(&mut tokens);
            }
            input.push_expansion(&tokens);
        }
    }
    Ok(())
}
