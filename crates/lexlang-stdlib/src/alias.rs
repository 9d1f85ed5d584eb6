//! The `\let` aliasing command.
//!
//! `\let\alias\target` binds `\alias` to a forward to `\target`. The
//! forward is by name, not by value: the target binding is looked up every
//! time the alias is used, so a later global redefinition of the target is
//! observed through the alias.

use crate::prefix;
use lexlang::prelude as lxl;
use lexlang::traits::*;
use lexlang::*;

pub const LET_DOC: &str = "Bind a control sequence as an alias of another command";

/// Get the `\let` command.
pub fn get_let<S: HasComponent<prefix::Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(let_primitive_fn)
        .with_tag(let_tag())
        .with_doc(LET_DOC)
}

static LET_TAG: command::StaticTag = command::StaticTag::new();

pub fn let_tag() -> command::Tag {
    LET_TAG.get()
}

fn let_primitive_fn<S: HasComponent<prefix::Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    let scope = prefix::assignment_scope(input.state_mut());
    let alias = parse::parse_command_target("a \\let assignment", input.unexpanded())?;
    parse::parse_optional_equals(input.unexpanded())?;
    let token = input
        .unexpanded()
        .next_or_err("reading the right hand side of a \\let assignment")?;
    match token.value() {
        token::Value::ControlSequence(target) => {
            input.commands_map_mut().alias(alias, target, scope);
            Ok(())
        }
        _ => Err(
            error::Error::missing_argument("reading the right hand side of a \\let assignment")
                .with_note("the target of a \\let assignment must be a control sequence"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use lexlang_testing::test_suite;
    use lexlang_testing::TestOption;
    use std::collections::HashMap;

    fn built_in_commands() -> HashMap<&'static str, command::BuiltIn<State>> {
        crate::built_ins()
    }

    test_suite![
        expansion_equality_tests(
            (let_for_macro, r"\def\A{abc}\let\B\A\B", "abc"),
            (let_for_macro_equals, r"\def\A{abc}\let\B=\A\B", "abc"),
            (local, r"\def\A{a}\def\B{b}\let\C=\A{\let\C=\B \C}\C", "ba"),
            (
                global,
                r"\def\A{a}\def\B{b}\let\C=\A{\global\let\C=\B \C}\C",
                "bb"
            ),
            // The alias tracks the current binding of its target, not the
            // binding captured when the alias was created.
            (
                alias_observes_later_global_rebinding,
                r"\def\Y{old}\let\X\Y\gdef\Y{new}\X",
                "new"
            ),
            (
                alias_observes_rebinding_through_chain,
                r"\def\Y{old}\let\X\Y\let\W\X\gdef\Y{new}\W",
                "new"
            ),
            (
                alias_to_not_yet_defined_target,
                r"\let\X\Y\def\Y{later}\X",
                "later"
            ),
            (
                alias_rolled_back_at_group_end,
                r"\def\A{a}\def\B{b}{\let\A\B}\A",
                "a"
            ),
        ),
        failure_tests(
            (let_to_character_fails, r"\let\B=a"),
            (let_end_of_input, r"\let\B="),
            (let_missing_alias, r"\let a"),
            (alias_to_undefined_target_fails_on_use, r"\let\B=\undefinedTarget\B"),
        ),
    ];
}
