//! Conditional primitives.
//!
//! Conditionals in Lexlang are two-branch substitution commands: a
//! conditional reads its predicate arguments, then exactly two branch
//! groups, and expands to a copy of the branch selected by the predicate.
//! The discarded branch is never executed; the selected branch is pushed
//! back onto the input and executed by the main loop as usual.
//!
//! Predicates are pure reads of the interpreter state. Expansion of a
//! conditional therefore has no side effects, which makes conditionals
//! usable anywhere expansion happens.

use lexlang::prelude as lxl;
use lexlang::traits::*;
use lexlang::*;

pub const IFTRUE_DOC: &str = "Expand to the first branch";
pub const IFFALSE_DOC: &str = "Expand to the second branch";
pub const IFDEFINED_DOC: &str =
    "Expand to the first branch if the provided control sequence is defined";

/// Read the two branches of a conditional and push back a copy of the
/// selected one.
///
/// This is the helper all two-branch conditionals are built on. The
/// branches are read without expansion, so the discarded branch is
/// discarded unevaluated.
pub fn two_way<S: LexlangState>(
    input: &mut vm::ExpansionInput<S>,
    condition: bool,
) -> lxl::Result<()> {
    let mut branch = input.checkout_token_buffer();
    parse::parse_undelimited_argument(
        "reading the first branch of a conditional",
        input.unexpanded(),
        &mut branch,
    )?;
    if condition {
        let mut discarded = input.checkout_token_buffer();
        parse::parse_undelimited_argument(
            "reading the second branch of a conditional",
            input.unexpanded(),
            &mut discarded,
        )?;
        input.return_token_buffer(discarded);
    } else {
        branch.clear();
        parse::parse_undelimited_argument(
            "reading the second branch of a conditional",
            input.unexpanded(),
            &mut branch,
        )?;
    }
    input.push_expansion(&branch);
    input.return_token_buffer(branch);
    Ok(())
}

/// Get the `\iftrue` command.
pub fn get_iftrue<S: LexlangState>() -> command::BuiltIn<S> {
    command::BuiltIn::new_expandable(iftrue_primitive_fn).with_doc(IFTRUE_DOC)
}

fn iftrue_primitive_fn<S: LexlangState>(
    _: token::Token,
    input: &mut vm::ExpansionInput<S>,
) -> lxl::Result<()> {
    two_way(input, true)
}

/// Get the `\iffalse` command.
pub fn get_iffalse<S: LexlangState>() -> command::BuiltIn<S> {
    command::BuiltIn::new_expandable(iffalse_primitive_fn).with_doc(IFFALSE_DOC)
}

fn iffalse_primitive_fn<S: LexlangState>(
    _: token::Token,
    input: &mut vm::ExpansionInput<S>,
) -> lxl::Result<()> {
    two_way(input, false)
}

/// Get the `\ifdefined` command.
pub fn get_ifdefined<S: LexlangState>() -> command::BuiltIn<S> {
    command::BuiltIn::new_expandable(ifdefined_primitive_fn).with_doc(IFDEFINED_DOC)
}

fn ifdefined_primitive_fn<S: LexlangState>(
    _: token::Token,
    input: &mut vm::ExpansionInput<S>,
) -> lxl::Result<()> {
    let token = input
        .unexpanded()
        .next_or_err("reading the control sequence after \\ifdefined")?;
    let defined = match token.value() {
        token::Value::ControlSequence(name) => input.commands_map().resolve(&name).is_some(),
        _ => {
            return Err(error::Error::missing_argument(
                "reading the control sequence after \\ifdefined",
            ))
        }
    };
    two_way(input, defined)
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
            (iftrue_selects_first_branch, r"\iftrue{yes}{no}", "yes"),
            (iffalse_selects_second_branch, r"\iffalse{yes}{no}", "no"),
            (single_token_branches, r"\iftrue ab", "a"),
            (nested, r"\iftrue{\iffalse{a}{b}}{c}", "b"),
            (
                discarded_branch_is_not_executed,
                r"\iffalse{\def\A{wrong}}{\def\A{right}}\A",
                "right"
            ),
            (
                branch_with_nested_groups,
                r"\iftrue{a{b}c}{d}",
                "a{b}c"
            ),
            (ifdefined_true, r"\def\A{}\ifdefined\A{yes}{no}", "yes"),
            (ifdefined_false, r"\ifdefined\neverDefined{yes}{no}", "no"),
            (
                ifdefined_sees_local_scope,
                r"{\def\A{}\ifdefined\A{yes}{no}}\ifdefined\A{yes}{no}",
                "yesno"
            ),
            (
                conditional_inside_macro,
                r"\def\pick#1{\iftrue{#1}{never}}\pick{x}",
                "x"
            ),
        ),
        failure_tests(
            (missing_branches, r"\iftrue"),
            (missing_second_branch, r"\iftrue{a}"),
            (ifdefined_missing_target, r"\ifdefined"),
            (ifdefined_character_target, r"\ifdefined a{yes}{no}"),
        ),
    ];
}
