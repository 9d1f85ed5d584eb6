//! The `\global` prefix command.
//!
//! # Developer notes
//!
//! The prefix changes the behavior, at run time, of the assignment command
//! that follows it, so it cannot be scoped tightly. The approach: a
//! component holds a `global` flag that `\global` sets to true. Any command
//! that can be prefixed reads the flag a single time using
//! [Component::take_global], which returns the flag value and resets the
//! flag to false.
//!
//! For the convention to work it is essential that *all* code paths within
//! a prefixable command call [take_global](Component::take_global), even
//! paths that don't use the result. For example `\gdef` always assigns in
//! the global scope, but it still takes the flag. This behavior should be
//! verified with unit tests, and this module provides an
//! [assert_global_is_false](get_assert_global_is_false) command to make
//! that easy.
//!
//! Commands that may be prefixed are recognized by their tags, which are
//! registered in the component.

use lexlang::prelude as lxl;
use lexlang::traits::*;
use lexlang::*;
use lexicraft_stdext::collections::scoped::Scope;
use std::collections::HashSet;

pub const GLOBAL_DOC: &str = "Make the following assignment global";

/// Component for the `\global` prefix command.
pub struct Component {
    global: bool,
    prefixable: HashSet<command::Tag>,
}

impl Default for Component {
    fn default() -> Self {
        Component {
            global: false,
            prefixable: [
                crate::def::def_tag(),
                crate::alias::let_tag(),
                crate::textual::textdef_tag(),
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl Component {
    /// Get the value of the global flag and reset the flag to false.
    ///
    /// See the module documentation for correct usage of this method.
    pub fn take_global(&mut self) -> bool {
        let global = self.global;
        self.global = false;
        global
    }

    /// Allow commands with the provided tag to be prefixed with `\global`.
    pub fn register_prefixable(&mut self, tag: command::Tag) {
        self.prefixable.insert(tag);
    }
}

/// Read the global flag and convert it to an assignment scope.
pub fn assignment_scope<S: HasComponent<Component>>(state: &mut S) -> Scope {
    match state.component_mut().take_global() {
        true => Scope::Global,
        false => Scope::Local,
    }
}

/// Get the `\global` command.
pub fn get_global<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(global_primitive_fn).with_doc(GLOBAL_DOC)
}

fn global_primitive_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    let token = input.next_or_err("reading the command after a \\global prefix")?;
    let prefixable = match token.value() {
        token::Value::ControlSequence(name) => {
            matches!(
                input.commands_map().resolve_tag(&name),
                Some(tag) if input.state().component().prefixable.contains(&tag)
            )
        }
        _ => false,
    };
    if !prefixable {
        return Err(error::Error::missing_argument(
            "reading the command after a \\global prefix",
        )
        .with_note(format![
            "the token \\{} cannot be prefixed by \\global",
            input.vm().resolve_cs_name(token)
        ]));
    }
    input.state_mut().component_mut().global = true;
    // The prefixed command is an immediate command; re-scan it so the main
    // loop executes it with the flag set.
    input.back(token);
    Ok(())
}

/// Get a command that asserts the global flag is false.
///
/// This command is used in unit tests to verify that prefixable commands
/// take the flag on every code path.
pub fn get_assert_global_is_false<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    fn assert_global_is_false_fn<S: HasComponent<Component>>(
        _: token::Token,
        input: &mut vm::ExecutionInput<S>,
    ) -> lxl::Result<()> {
        assert!(
            !input.state().component().global,
            "the global flag was not reset"
        );
        Ok(())
    }
    command::BuiltIn::new_immediate(assert_global_is_false_fn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use lexlang_testing::test_suite;
    use lexlang_testing::TestOption;
    use std::collections::HashMap;

    fn built_in_commands() -> HashMap<&'static str, command::BuiltIn<State>> {
        let mut commands = crate::built_ins();
        commands.insert("assertGlobalIsFalse", get_assert_global_is_false());
        commands
    }

    test_suite![
        expansion_equality_tests(
            (
                global_def,
                r"\def\A{a}{\global\def\A{b}}\A",
                "b"
            ),
            (
                flag_is_reset_after_assignment,
                r"\global\def\A{a}\assertGlobalIsFalse\A",
                "a"
            ),
            (
                gdef_takes_flag,
                r"\global\gdef\A{a}\assertGlobalIsFalse\A",
                "a"
            ),
        ),
        failure_tests(
            (global_before_character, r"\global a"),
            (global_before_undefined, r"\global\undefinedCommandName"),
            (global_at_end_of_input, r"\global"),
        ),
    ];
}
