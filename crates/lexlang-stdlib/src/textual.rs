//! The `\textdef` command for defining textual constants.
//!
//! A textual constant is a command bound to a fixed string; using the
//! command expands to the characters of the string. Textual constants are
//! how a host seeds named values such as a default glossary type.

use crate::prefix;
use lexlang::prelude as lxl;
use lexlang::traits::*;
use lexlang::*;

pub const TEXTDEF_DOC: &str = "Define a command that expands to a fixed string";

/// Get the `\textdef` command.
pub fn get_textdef<S: HasComponent<prefix::Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(textdef_primitive_fn)
        .with_tag(textdef_tag())
        .with_doc(TEXTDEF_DOC)
}

static TEXTDEF_TAG: command::StaticTag = command::StaticTag::new();

pub fn textdef_tag() -> command::Tag {
    TEXTDEF_TAG.get()
}

fn textdef_primitive_fn<S: HasComponent<prefix::Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    let scope = prefix::assignment_scope(input.state_mut());
    let name = parse::parse_command_target("a textual definition", input.unexpanded())?;
    parse::parse_optional_equals(input.unexpanded())?;
    let mut value_tokens = vec![];
    parse::parse_balanced_group(
        "reading the value of a textual definition",
        input.unexpanded(),
        &mut value_tokens,
    )?;
    let value: String = value_tokens.iter().filter_map(token::Token::char).collect();
    input.commands_map_mut().insert_textual(name, value, scope);
    Ok(())
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
            (textdef_output, r"\textdef\A{main}\A", "main"),
            (textdef_equals, r"\textdef\A={main}\A", "main"),
            (
                textdef_local,
                r"\textdef\A{outer}{\textdef\A{inner}\A}\A",
                "innerouter"
            ),
            (
                textdef_global,
                r"\textdef\A{outer}{\global\textdef\A{inner}\A}\A",
                "innerinner"
            ),
            (
                textual_constant_in_macro_replacement,
                r"\textdef\type{main}\def\show{[\type]}\show",
                "[main]"
            ),
        ),
        failure_tests(
            (textdef_missing_target, r"\textdef{x}"),
            (textdef_missing_value, r"\textdef\A"),
            (textdef_unclosed_value, r"\textdef\A{never"),
        ),
    ];
}
