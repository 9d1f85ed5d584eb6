//! The definition commands: `\newglossaryentry`, `\renewglossaryentry`,
//! `\newglossary` and `\newignoredglossary`.

use crate::registry::Component;
use crate::Glossary;
use lexlang::diagnostics;
use lexlang::prelude as lxl;
use lexlang::token::Token;
use lexlang::traits::*;
use lexlang::*;
use std::collections::HashMap;

pub const NEWGLOSSARYENTRY_DOC: &str = "Define a glossary entry";
pub const RENEWGLOSSARYENTRY_DOC: &str = "Redefine an existing glossary entry";
pub const NEWGLOSSARY_DOC: &str = "Define a glossary";
pub const NEWIGNOREDGLOSSARY_DOC: &str = "Define a glossary that listings skip";

/// The glossary type entries are filed under when the `type` key is absent.
///
/// The `\glsdefaulttype` textual constant mirrors this value for use in
/// document text.
pub const DEFAULT_TYPE: &str = "main";

/// The category entries are filed under when the `category` key is absent.
pub const DEFAULT_CATEGORY: &str = "general";

/// Get the `\newglossaryentry` command.
pub fn get_newglossaryentry<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(newglossaryentry_fn).with_doc(NEWGLOSSARYENTRY_DOC)
}

/// Get the `\renewglossaryentry` command.
pub fn get_renewglossaryentry<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(renewglossaryentry_fn).with_doc(RENEWGLOSSARYENTRY_DOC)
}

/// Get the `\newglossary` command.
pub fn get_newglossary<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(newglossary_fn).with_doc(NEWGLOSSARY_DOC)
}

/// Get the `\newignoredglossary` command.
pub fn get_newignoredglossary<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(newignoredglossary_fn).with_doc(NEWIGNOREDGLOSSARY_DOC)
}

fn newglossaryentry_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    definition_fn(input, false)
}

fn renewglossaryentry_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    definition_fn(input, true)
}

fn definition_fn<S: HasComponent<Component>>(
    input: &mut vm::ExecutionInput<S>,
    redefine: bool,
) -> lxl::Result<()> {
    let label = parse::parse_label(
        "reading the label of a glossary entry definition",
        input.expanded(),
    )?;
    let keyvals = parse::parse_keyval_group(
        "reading the key-value list of a glossary entry definition",
        input.unexpanded(),
    )?;

    let mut glossary_type: Option<String> = None;
    let mut category: Option<String> = None;
    let mut parent: Option<String> = None;
    let mut fields: HashMap<String, Vec<Token>> = HashMap::new();
    for (key, value) in keyvals.iter() {
        let value_tokens = value.map(<[Token]>::to_vec).unwrap_or_default();
        // The structural keys name strings, not token sequences.
        match key {
            "type" => glossary_type = Some(tokens_to_text(&value_tokens)),
            "category" => category = Some(tokens_to_text(&value_tokens)),
            "parent" => parent = Some(tokens_to_text(&value_tokens)),
            _ => {
                fields.insert(key.to_string(), value_tokens);
            }
        }
    }
    let glossary_type = glossary_type.unwrap_or_else(|| DEFAULT_TYPE.into());
    let category = category.unwrap_or_else(|| DEFAULT_CATEGORY.into());
    let suffix = plural_suffix_tokens(input);

    let registry = input.state_mut().component_mut();
    let result = if redefine {
        registry.redefine_entry(&label, &glossary_type, &category, parent, fields, &suffix)
    } else {
        registry.define_entry(&label, &glossary_type, &category, parent, fields, &suffix)
    };
    match result {
        Ok(_) => Ok(()),
        Err(err) => match err.kind() {
            // The definition is rejected and the prior state retained;
            // processing continues after one diagnostic.
            error::Kind::DuplicateEntry => {
                input.report(
                    diagnostics::Diagnostic::warning("glossary.entry.duplicate")
                        .with_arg("label", label),
                );
                Ok(())
            }
            error::Kind::EntryNotDefined => {
                input.report(
                    diagnostics::Diagnostic::warning("glossary.entry.not.defined")
                        .with_arg("label", label),
                );
                Ok(())
            }
            error::Kind::GlossaryNotDefined => {
                input.report(
                    diagnostics::Diagnostic::warning("glossary.type.not.defined")
                        .with_arg("type", glossary_type),
                );
                Ok(())
            }
            _ => Err(err),
        },
    }
}

fn newglossary_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    let options = parse::parse_optional_keyval(input.unexpanded())?;
    let type_name = parse::parse_label(
        "reading the type name of a glossary definition",
        input.expanded(),
    )?;
    let mut title = vec![];
    parse::parse_balanced_group(
        "reading the title of a glossary definition",
        input.unexpanded(),
        &mut title,
    )?;
    let mut glossary = Glossary::new(type_name.as_str()).with_title(title);
    if let Some(counter) = options.value("counter") {
        glossary = glossary.with_counter(tokens_to_text(counter));
    }
    if options.contains("nohyperlinks") {
        glossary = glossary.without_hyperlinks();
    }
    register(input, glossary, type_name)
}

fn newignoredglossary_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    let type_name = parse::parse_label(
        "reading the type name of a glossary definition",
        input.expanded(),
    )?;
    let glossary = Glossary::new(type_name.as_str()).ignored();
    register(input, glossary, type_name)
}

fn register<S: HasComponent<Component>>(
    input: &mut vm::ExecutionInput<S>,
    glossary: Glossary,
    type_name: String,
) -> lxl::Result<()> {
    if !input
        .state_mut()
        .component_mut()
        .register_glossary_type(glossary)
    {
        input.report(
            diagnostics::Diagnostic::warning("glossary.type.duplicate")
                .with_arg("type", type_name),
        );
    }
    Ok(())
}

fn tokens_to_text(tokens: &[Token]) -> String {
    tokens.iter().filter_map(Token::char).collect()
}

/// The token sequence appended to a singular field to build its default
/// plural.
///
/// When the `\glspluralsuffix` constant is bound, the suffix is a reference
/// to it, so a document can change the suffix after entries are defined;
/// otherwise the literal `s` is used.
fn plural_suffix_tokens<S: LexlangState>(input: &vm::ExecutionInput<S>) -> Vec<Token> {
    if let Some(name) = input.vm().cs_name_interner().get("glspluralsuffix") {
        if input.commands_map().get(&name).is_some() {
            return vec![Token::new_control_sequence(name)];
        }
    }
    "s".chars().map(Token::new_character).collect()
}

#[cfg(test)]
mod tests {
    use crate::testing::*;
    use lexlang::command;
    use lexlang::diagnostics;
    use lexlang::vm;
    use lexlang_testing::test_suite;
    use lexlang_testing::TestOption;
    use std::collections::HashMap;

    fn built_in_commands() -> HashMap<&'static str, command::BuiltIn<State>> {
        all_built_ins()
    }

    fn run(source: &str) -> (Box<vm::VM<State>>, diagnostics::CollectingSink) {
        let mut vm = vm::VM::<State>::new(all_built_ins());
        let sink = diagnostics::CollectingSink::default();
        vm.diagnostics = std::rc::Rc::new(std::cell::RefCell::new(sink.clone()));
        vm.push_source(source);
        vm.run::<vm::DefaultHandlers>().unwrap();
        (vm, sink)
    }

    test_suite![
        expansion_equality_tests(
            (
                define_and_reference,
                r"\newglossaryentry{svm}{name=SVM}\glsentryname{svm}",
                "SVM"
            ),
            (
                redefinition_takes_effect,
                r"\newglossaryentry{color}{name=color}\renewglossaryentry{color}{name=colour}\glsentryname{color}",
                "colour"
            ),
            (
                entry_in_custom_glossary,
                r"\newglossary{acronyms}{Acronyms}\newglossaryentry{svm}{name=SVM, type=acronyms}\glsentryname{svm}",
                "SVM"
            ),
            (
                entry_in_ignored_glossary,
                r"\newignoredglossary{hidden}\newglossaryentry{svm}{name=SVM, type=hidden}\glsentryname{svm}",
                "SVM"
            ),
        ),
        failure_tests(
            (missing_label, r"\newglossaryentry"),
            (missing_field_list, r"\newglossaryentry{svm}"),
            (unclosed_field_list, r"\newglossaryentry{svm}{name=SVM"),
        ),
    ];

    #[test]
    fn duplicate_definition_reports_and_keeps_original() {
        let (vm, sink) = run(
            r"\newglossaryentry{svm}{name=first}\newglossaryentry{svm}{name=second}",
        );
        assert_eq!(sink.keys(), vec!["glossary.entry.duplicate"]);
        assert_eq!(sink.reported()[0].arg("label"), Some("svm"));
        let entry = vm.state.glossary.resolve("svm").unwrap();
        assert_eq!(entry.field_text("name"), Some("first".into()));
    }

    #[test]
    fn unknown_type_reports_and_defines_nothing() {
        let (vm, sink) = run(r"\newglossaryentry{svm}{name=SVM, type=nope}");
        assert_eq!(sink.keys(), vec!["glossary.type.not.defined"]);
        assert!(vm.state.glossary.resolve("svm").is_none());
    }

    #[test]
    fn renew_of_missing_entry_reports() {
        let (vm, sink) = run(r"\renewglossaryentry{svm}{name=SVM}");
        assert_eq!(sink.keys(), vec!["glossary.entry.not.defined"]);
        assert!(vm.state.glossary.resolve("svm").is_none());
    }

    #[test]
    fn duplicate_glossary_type_reports() {
        let (_, sink) = run(r"\newglossary{acronyms}{Acronyms}\newglossary{acronyms}{Again}");
        assert_eq!(sink.keys(), vec!["glossary.type.duplicate"]);
    }

    #[test]
    fn glossary_members_keep_definition_order() {
        let (vm, _) = run(
            r"\newglossaryentry{banana}{name=banana}\newglossaryentry{apple}{name=apple}",
        );
        assert_eq!(
            vm.state.glossary.glossary("main").unwrap().members(),
            ["banana", "apple"]
        );
    }

    #[test]
    fn newglossary_stores_the_title() {
        let (vm, _) = run(r"\newglossary{acr}{List of Acronyms}");
        let glossary = vm.state.glossary.glossary("acr").unwrap();
        let title = lexlang::token::write_tokens(glossary.title().unwrap(), vm.cs_name_interner());
        assert_eq!(title, "List of Acronyms");
    }

    #[test]
    fn newglossary_options_are_applied() {
        let (vm, _) = run(r"\newglossary[counter=section, nohyperlinks]{acr}{Acronyms}");
        let glossary = vm.state.glossary.glossary("acr").unwrap();
        assert_eq!(glossary.counter(), "section");
        assert!(!glossary.has_hyperlinks());
        assert!(!glossary.is_ignored());
    }

    #[test]
    fn structural_keys_are_not_stored_as_fields() {
        let (vm, _) = run(
            r"\newglossary{acr}{Acronyms}\newglossaryentry{svm}{name=SVM, type=acr, category=general}",
        );
        let entry = vm.state.glossary.resolve("svm").unwrap();
        assert_eq!(entry.glossary_type(), "acr");
        assert_eq!(entry.category(), "general");
        assert!(!entry.has_field("type"));
        assert!(!entry.has_field("category"));
    }

    #[test]
    fn parent_forms_a_forest() {
        let (vm, _) = run(
            r"\newglossaryentry{animal}{name=animal}\newglossaryentry{cat}{name=cat, parent=animal}",
        );
        let entry = vm.state.glossary.resolve("cat").unwrap();
        assert_eq!(entry.parent(), Some("animal"));
    }
}
