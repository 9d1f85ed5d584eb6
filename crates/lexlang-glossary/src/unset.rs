//! The unset and reset family of commands.
//!
//! In glossary terminology, *unsetting* an entry marks its first-use flag
//! as spent (the entry counts as used) and *resetting* makes the entry
//! count as unused again. The plain commands apply globally; the `local`
//! variants follow the grouping discipline, so a local unset or reset
//! inside a group is rolled back when the group ends.

use crate::registry::Component;
use crate::GlsLabel;
use lexicraft_stdext::collections::scoped::Scope;
use lexlang::prelude as lxl;
use lexlang::traits::*;
use lexlang::*;

pub const GLSUNSET_DOC: &str = "Mark a glossary entry as used";
pub const GLSRESET_DOC: &str = "Mark a glossary entry as unused";
pub const GLSLOCALUNSET_DOC: &str = "Mark a glossary entry as used, until the group ends";
pub const GLSLOCALRESET_DOC: &str = "Mark a glossary entry as unused, until the group ends";

/// Get the `\glsunset` command.
pub fn get_glsunset<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(glsunset_fn).with_doc(GLSUNSET_DOC)
}

/// Get the `\glsreset` command.
pub fn get_glsreset<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(glsreset_fn).with_doc(GLSRESET_DOC)
}

/// Get the `\glslocalunset` command.
pub fn get_glslocalunset<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(glslocalunset_fn).with_doc(GLSLOCALUNSET_DOC)
}

/// Get the `\glslocalreset` command.
pub fn get_glslocalreset<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(glslocalreset_fn).with_doc(GLSLOCALRESET_DOC)
}

fn glsunset_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    mark_fn(input, true, Scope::Global)
}

fn glsreset_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    mark_fn(input, false, Scope::Global)
}

fn glslocalunset_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    mark_fn(input, true, Scope::Local)
}

fn glslocalreset_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    mark_fn(input, false, Scope::Local)
}

fn mark_fn<S: HasComponent<Component>>(
    input: &mut vm::ExecutionInput<S>,
    used: bool,
    scope: Scope,
) -> lxl::Result<()> {
    let label = GlsLabel::new(parse::parse_label(
        "reading the label of an unset or reset command",
        input.expanded(),
    )?);
    if label.resolve(input.state().component()).is_none() {
        crate::entry_not_defined(input, label.label())?;
        return Ok(());
    }
    input
        .state_mut()
        .component_mut()
        .mark_used(label.label(), used, scope);
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
                unset_marks_used,
                r"\newglossaryentry{color}{name=color}\glsunset{color}\ifglsused{color}{used}{unused}",
                "used"
            ),
            (
                reset_marks_unused,
                r"\newglossaryentry{color}{name=color}\glsunset{color}\glsreset{color}\ifglsused{color}{used}{unused}",
                "unused"
            ),
            // A local unset inside a group is rolled back when the group
            // ends.
            (
                local_unset_is_rolled_back,
                r"\newglossaryentry{color}{name=color}{\glslocalunset{color}\ifglsused{color}{used}{unused}}\ifglsused{color}{used}{unused}",
                "usedunused"
            ),
            (
                local_reset_is_rolled_back,
                r"\newglossaryentry{color}{name=color}\glsunset{color}{\glslocalreset{color}\ifglsused{color}{used}{unused}}\ifglsused{color}{used}{unused}",
                "unusedused"
            ),
            (
                global_unset_inside_group_persists,
                r"\newglossaryentry{color}{name=color}{\glsunset{color}}\ifglsused{color}{used}{unused}",
                "used"
            ),
            (
                nested_groups_restore_in_order,
                r"\newglossaryentry{color}{name=color}{\glslocalunset{color}{\glslocalreset{color}\ifglsused{color}{u}{n}}\ifglsused{color}{u}{n}}\ifglsused{color}{u}{n}",
                "nun"
            ),
        ),
    ];

    #[test]
    fn unset_of_missing_entry_reports_one_diagnostic() {
        let (output, diagnostics) = lexlang_testing::run_to_string::<State>(
            r"\glsunset{missing}",
            &[TestOption::BuiltInCommands(built_in_commands)],
        );
        assert_eq!(output, "");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].key(), "glossary.entry.not.defined");
    }
}
