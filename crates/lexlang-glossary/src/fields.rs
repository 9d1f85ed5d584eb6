//! Field access and field assignment commands.
//!
//! `\glsentryname{label}`, `\glsentrytext{label}`, `\glsentrydesc{label}`
//! and the general `\glsentryfield{label}{field}` expand to the value of an
//! entry's field. Unlike the reference commands these have no side effects:
//! the entry is not marked used, so they are safe anywhere expansion
//! happens, including inside conditional predicates.
//!
//! `\glssetfield{label}{field}{value}` mutates an existing entry after its
//! definition, so it is an immediate command.

use crate::registry::Component;
use crate::GlsLabel;
use lexlang::prelude as lxl;
use lexlang::traits::*;
use lexlang::*;

pub const GLSENTRYNAME_DOC: &str = "Expand to the name field of a glossary entry";
pub const GLSENTRYTEXT_DOC: &str = "Expand to the text field of a glossary entry";
pub const GLSENTRYDESC_DOC: &str = "Expand to the description field of a glossary entry";
pub const GLSENTRYFIELD_DOC: &str = "Expand to an arbitrary field of a glossary entry";
pub const GLSSETFIELD_DOC: &str = "Set a field of an existing glossary entry";

/// Get the `\glsentryname` command.
pub fn get_glsentryname<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_expandable(glsentryname_fn).with_doc(GLSENTRYNAME_DOC)
}

/// Get the `\glsentrytext` command.
pub fn get_glsentrytext<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_expandable(glsentrytext_fn).with_doc(GLSENTRYTEXT_DOC)
}

/// Get the `\glsentrydesc` command.
pub fn get_glsentrydesc<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_expandable(glsentrydesc_fn).with_doc(GLSENTRYDESC_DOC)
}

/// Get the `\glsentryfield` command.
pub fn get_glsentryfield<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_expandable(glsentryfield_fn).with_doc(GLSENTRYFIELD_DOC)
}

/// Get the `\glssetfield` command.
pub fn get_glssetfield<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(glssetfield_fn).with_doc(GLSSETFIELD_DOC)
}

fn glsentryname_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExpansionInput<S>,
) -> lxl::Result<()> {
    fixed_field_fn(input, "name")
}

fn glsentrytext_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExpansionInput<S>,
) -> lxl::Result<()> {
    fixed_field_fn(input, "text")
}

fn glsentrydesc_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExpansionInput<S>,
) -> lxl::Result<()> {
    fixed_field_fn(input, "description")
}

fn glsentryfield_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExpansionInput<S>,
) -> lxl::Result<()> {
    let label = GlsLabel::new(parse::parse_label(
        "reading the label of a field access",
        input.expanded(),
    )?);
    let field = parse::parse_label("reading the field name of a field access", input.expanded())?;
    expand_field(input, &label, &field)
}

fn glssetfield_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    let label = parse::parse_label("reading the label of a field assignment", input.expanded())?;
    let field = parse::parse_label(
        "reading the field name of a field assignment",
        input.expanded(),
    )?;
    let mut value = vec![];
    parse::parse_balanced_group(
        "reading the value of a field assignment",
        input.unexpanded(),
        &mut value,
    )?;
    if input.state().component().resolve(&label).is_none() {
        return crate::entry_not_defined(input, &label);
    }
    if let Some(entry) = input.state_mut().component_mut().entry_mut(&label) {
        entry.set_field(field, value);
    }
    Ok(())
}

fn fixed_field_fn<S: HasComponent<Component>>(
    input: &mut vm::ExpansionInput<S>,
    field: &str,
) -> lxl::Result<()> {
    let label = GlsLabel::new(parse::parse_label(
        "reading the label of a field access",
        input.expanded(),
    )?);
    expand_field(input, &label, field)
}

fn expand_field<S: HasComponent<Component>>(
    input: &mut vm::ExpansionInput<S>,
    label: &GlsLabel,
    field: &str,
) -> lxl::Result<()> {
    let field_tokens = {
        let registry = input.state().component();
        label
            .resolve(registry)
            .map(|entry| entry.field(field).map(<[token::Token]>::to_vec))
    };
    match field_tokens {
        None => {
            crate::entry_not_defined(input, label.label())?;
            input.push_string_tokens(label.label());
        }
        // A missing field on an existing entry expands to nothing.
        Some(tokens) => input.push_expansion(&tokens.unwrap_or_default()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::testing::*;
    use lexlang::command;
    use lexlang_testing::test_suite;
    use lexlang_testing::TestOption;
    use std::collections::HashMap;

    fn built_in_commands() -> HashMap<&'static str, command::BuiltIn<State>> {
        all_built_ins()
    }

    test_suite![
        expansion_equality_tests(
            (
                entry_name,
                r"\newglossaryentry{svm}{name=SVM, description=a classifier}\glsentryname{svm}",
                "SVM"
            ),
            (
                entry_text_defaults_to_name,
                r"\newglossaryentry{svm}{name=SVM}\glsentrytext{svm}",
                "SVM"
            ),
            (
                entry_description,
                r"\newglossaryentry{svm}{name=SVM, description=a classifier}\glsentrydesc{svm}",
                "a classifier"
            ),
            (
                arbitrary_field,
                r"\newglossaryentry{svm}{name=SVM, symbol=M}\glsentryfield{svm}{symbol}",
                "M"
            ),
            (
                missing_field_expands_to_nothing,
                r"\newglossaryentry{svm}{name=SVM}[\glsentryfield{svm}{symbol}]",
                "[]"
            ),
            (
                field_access_in_conditional_branch,
                r"\newglossaryentry{svm}{name=SVM}\iftrue{\glsentryname{svm}}{x}",
                "SVM"
            ),
            (
                set_field_then_read_it_back,
                r"\newglossaryentry{svm}{name=SVM}\glssetfield{svm}{symbol}{M}\glsentryfield{svm}{symbol}",
                "M"
            ),
            (
                set_field_overwrites_previous_value,
                r"\newglossaryentry{svm}{name=SVM, description=old}\glssetfield{svm}{description}{new}\glsentrydesc{svm}",
                "new"
            ),
        ),
    ];

    #[test]
    fn field_access_does_not_mark_used() {
        let (output, _) = lexlang_testing::run_to_string::<State>(
            r"\newglossaryentry{svm}{name=SVM}\glsentryname{svm}\ifglsused{svm}{used}{unused}",
            &[TestOption::BuiltInCommands(built_in_commands)],
        );
        assert_eq!(output, "SVMunused");
    }

    #[test]
    fn missing_entry_echoes_label_with_one_diagnostic() {
        let (output, diagnostics) = lexlang_testing::run_to_string::<State>(
            r"\glsentryname{missing}",
            &[TestOption::BuiltInCommands(built_in_commands)],
        );
        assert_eq!(output, "missing");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].key(), "glossary.entry.not.defined");
    }

    #[test]
    fn set_field_on_missing_entry_reports_one_diagnostic() {
        let (output, diagnostics) = lexlang_testing::run_to_string::<State>(
            r"\glssetfield{missing}{symbol}{M}",
            &[TestOption::BuiltInCommands(built_in_commands)],
        );
        assert_eq!(output, "");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].key(), "glossary.entry.not.defined");
        assert_eq!(diagnostics[0].arg("label"), Some("missing"));
    }
}
