//! Glossary conditionals.
//!
//! These are two-branch substitution commands in the style of the standard
//! library conditionals: the predicate is evaluated as a pure read of the
//! registry, then a copy of the selected branch is pushed back onto the
//! input without executing the discarded one.

use crate::registry::Component;
use lexlang::prelude as lxl;
use lexlang::traits::*;
use lexlang::*;
use lexlang_stdlib::conditional;

pub const IFGLSUSED_DOC: &str = "Branch on whether a glossary entry has been used";
pub const IFGLSENTRYEXISTS_DOC: &str = "Branch on whether a glossary entry is defined";
pub const IFGLSHASPARENT_DOC: &str = "Branch on whether a glossary entry has a parent";
pub const GLSIFATTRIBUTE_DOC: &str =
    "Branch on whether an attribute is true for an entry's category";
pub const GLSHASATTRIBUTE_DOC: &str =
    "Branch on whether an attribute is set at all for an entry's category";

/// Get the `\ifglsused` command.
pub fn get_ifglsused<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_expandable(ifglsused_fn).with_doc(IFGLSUSED_DOC)
}

/// Get the `\ifglsentryexists` command.
pub fn get_ifglsentryexists<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_expandable(ifglsentryexists_fn).with_doc(IFGLSENTRYEXISTS_DOC)
}

/// Get the `\ifglshasparent` command.
pub fn get_ifglshasparent<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_expandable(ifglshasparent_fn).with_doc(IFGLSHASPARENT_DOC)
}

/// Get the `\glsifattribute` command.
pub fn get_glsifattribute<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_expandable(glsifattribute_fn).with_doc(GLSIFATTRIBUTE_DOC)
}

/// Get the `\glshasattribute` command.
pub fn get_glshasattribute<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_expandable(glshasattribute_fn).with_doc(GLSHASATTRIBUTE_DOC)
}

fn ifglsused_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExpansionInput<S>,
) -> lxl::Result<()> {
    let label = parse::parse_label("reading the label of a glossary conditional", input.expanded())?;
    let registry = input.state().component();
    let condition = registry.resolve(&label).is_some() && registry.is_used(&label);
    conditional::two_way(input, condition)
}

fn ifglsentryexists_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExpansionInput<S>,
) -> lxl::Result<()> {
    let label = parse::parse_label("reading the label of a glossary conditional", input.expanded())?;
    let condition = input.state().component().resolve(&label).is_some();
    conditional::two_way(input, condition)
}

fn ifglshasparent_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExpansionInput<S>,
) -> lxl::Result<()> {
    let label = parse::parse_label("reading the label of a glossary conditional", input.expanded())?;
    let condition = input
        .state()
        .component()
        .resolve(&label)
        .is_some_and(|entry| entry.parent().is_some());
    conditional::two_way(input, condition)
}

fn glsifattribute_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExpansionInput<S>,
) -> lxl::Result<()> {
    let label = parse::parse_label("reading the label of a glossary conditional", input.expanded())?;
    let attribute = parse::parse_label(
        "reading the attribute name of a glossary conditional",
        input.expanded(),
    )?;
    let registry = input.state().component();
    let condition = registry
        .resolve(&label)
        .is_some_and(|entry| registry.is_attribute_true(entry, &attribute));
    conditional::two_way(input, condition)
}

fn glshasattribute_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExpansionInput<S>,
) -> lxl::Result<()> {
    let label = parse::parse_label("reading the label of a glossary conditional", input.expanded())?;
    let attribute = parse::parse_label(
        "reading the attribute name of a glossary conditional",
        input.expanded(),
    )?;
    let registry = input.state().component();
    let condition = registry.resolve(&label).is_some_and(|entry| {
        registry
            .category(entry.category())
            .is_some_and(|category| category.has_attribute(&attribute))
    });
    conditional::two_way(input, condition)
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
                unused_entry_selects_false_branch,
                r"\newglossaryentry{svm}{name=SVM}\ifglsused{svm}{used}{unused}",
                "unused"
            ),
            (
                used_entry_selects_true_branch,
                r"\newglossaryentry{svm}{name=SVM}\glsunset{svm}\ifglsused{svm}{used}{unused}",
                "used"
            ),
            (
                missing_entry_counts_as_unused,
                r"\ifglsused{missing}{used}{unused}",
                "unused"
            ),
            (
                exists_true,
                r"\newglossaryentry{svm}{name=SVM}\ifglsentryexists{svm}{yes}{no}",
                "yes"
            ),
            (exists_false, r"\ifglsentryexists{svm}{yes}{no}", "no"),
            (
                has_parent,
                r"\newglossaryentry{animal}{name=animal}\newglossaryentry{cat}{name=cat, parent=animal}\ifglshasparent{cat}{child}{root};\ifglshasparent{animal}{child}{root}",
                "child;root"
            ),
            (
                attribute_true,
                r"\glssetcategoryattribute{general}{nohyper}{true}\newglossaryentry{svm}{name=SVM}\glsifattribute{svm}{nohyper}{on}{off}",
                "on"
            ),
            (
                attribute_false,
                r"\glssetcategoryattribute{general}{nohyper}{false}\newglossaryentry{svm}{name=SVM}\glsifattribute{svm}{nohyper}{on}{off}",
                "off"
            ),
            (
                attribute_missing,
                r"\newglossaryentry{svm}{name=SVM}\glsifattribute{svm}{nohyper}{on}{off}",
                "off"
            ),
            // An attribute set to any value, including false, is present.
            (
                has_attribute_set_to_false,
                r"\glssetcategoryattribute{general}{nohyper}{false}\newglossaryentry{svm}{name=SVM}\glshasattribute{svm}{nohyper}{set}{unset}",
                "set"
            ),
            (
                has_attribute_missing,
                r"\newglossaryentry{svm}{name=SVM}\glshasattribute{svm}{nohyper}{set}{unset}",
                "unset"
            ),
            (
                discarded_branch_is_not_executed,
                r"\newglossaryentry{svm}{name=SVM}\ifglsentryexists{svm}{\def\A{yes}}{\def\A{no}}\A",
                "yes"
            ),
        ),
        failure_tests(
            (missing_branches, r"\newglossaryentry{svm}{name=SVM}\ifglsused{svm}"),
        ),
    ];
}
