//! Primitives for creating user-defined macros (`\def` and `\gdef`).

use crate::prefix;
use lexicraft_stdext::collections::scoped::Scope;
use lexlang::prelude as lxl;
use lexlang::texmacro;
use lexlang::traits::*;
use lexlang::*;

pub const DEF_DOC: &str = "Define a custom macro";

/// Get the `\def` command.
pub fn get_def<S: HasComponent<prefix::Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(def_primitive_fn)
        .with_tag(def_tag())
        .with_doc(DEF_DOC)
}

/// Get the `\gdef` command.
pub fn get_gdef<S: HasComponent<prefix::Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(gdef_primitive_fn)
        .with_tag(def_tag())
        .with_doc(DEF_DOC)
}

static DEF_TAG: command::StaticTag = command::StaticTag::new();

pub fn def_tag() -> command::Tag {
    DEF_TAG.get()
}

fn def_primitive_fn<S: HasComponent<prefix::Component>>(
    def_token: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    parse_and_set_macro(def_token, input, false)
}

fn gdef_primitive_fn<S: HasComponent<prefix::Component>>(
    def_token: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    parse_and_set_macro(def_token, input, true)
}

fn parse_and_set_macro<S: HasComponent<prefix::Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
    set_globally_override: bool,
) -> lxl::Result<()> {
    let mut scope = prefix::assignment_scope(input.state_mut());
    if set_globally_override {
        scope = Scope::Global;
    }
    let name = parse::parse_command_target("a macro definition", input.unexpanded())?;
    let num_parameters = parse_parameter_text(input.unexpanded())?;
    let replacements = parse_replacement_text(input.unexpanded(), num_parameters)?;
    let user_defined_macro = texmacro::Macro::new(num_parameters, replacements);
    input
        .commands_map_mut()
        .insert_macro(name, user_defined_macro, scope);
    Ok(())
}

fn char_to_parameter_index(c: char) -> Option<usize> {
    match c {
        '1' => Some(0),
        '2' => Some(1),
        '3' => Some(2),
        '4' => Some(3),
        '5' => Some(4),
        '6' => Some(5),
        '7' => Some(6),
        '8' => Some(7),
        '9' => Some(8),
        _ => None,
    }
}

/// Parse the parameter text of a macro definition: the tokens between the
/// macro name and the opening brace of the replacement text.
///
/// Parameters are undelimited, so the parameter text is a run of parameter
/// tokens `#1#2...#n` in order. Returns the number of parameters.
fn parse_parameter_text<S: LexlangState>(
    input: &mut vm::UnexpandedStream<S>,
) -> lxl::Result<usize> {
    let mut num_parameters = 0;
    loop {
        let token = input.next_or_err("reading the parameter text of a macro definition")?;
        match token.value() {
            token::Value::BeginGroup(_) => return Ok(num_parameters),
            token::Value::Parameter(_) => {
                let parameter_token =
                    input.next_or_err("reading the number after a parameter token")?;
                let index = parameter_token
                    .char()
                    .and_then(char_to_parameter_index)
                    .ok_or_else(|| {
                        error::Error::missing_argument(
                            "reading the number after a parameter token",
                        )
                        .with_note(
                            "a parameter token must be followed by a number from 1 through 9",
                        )
                    })?;
                if index != num_parameters {
                    return Err(error::Error::missing_argument(
                        "reading the parameter text of a macro definition",
                    )
                    .with_note(format![
                        "parameter number {} appeared where number {} was expected",
                        index + 1,
                        num_parameters + 1,
                    ]));
                }
                num_parameters += 1;
            }
            _ => {
                return Err(error::Error::missing_argument(
                    "reading the parameter text of a macro definition",
                )
                .with_note("the parameters of a macro are undelimited: only tokens of the form #n may appear before the replacement text"));
            }
        }
    }
}

/// Parse the replacement text of a macro definition, assuming the opening
/// brace has been consumed.
///
/// The token lists in the result are reversed, which is the storage order
/// the macro type expects.
fn parse_replacement_text<S: LexlangState>(
    input: &mut vm::UnexpandedStream<S>,
    num_parameters: usize,
) -> lxl::Result<Vec<texmacro::Replacement>> {
    let mut result: Vec<texmacro::Replacement> = vec![];
    let mut scope_depth = 0;
    let push = |result: &mut Vec<texmacro::Replacement>, token| match result.last_mut() {
        Some(texmacro::Replacement::Tokens(tokens)) => {
            tokens.push(token);
        }
        _ => {
            result.push(texmacro::Replacement::Tokens(vec![token]));
        }
    };

    loop {
        let token = input.next_or_err("reading the replacement text of a macro definition")?;
        match token.value() {
            token::Value::BeginGroup(_) => {
                scope_depth += 1;
            }
            token::Value::EndGroup(_) => {
                if scope_depth == 0 {
                    for replacement in result.iter_mut() {
                        if let texmacro::Replacement::Tokens(tokens) = replacement {
                            tokens.reverse();
                        }
                    }
                    return Ok(result);
                }
                scope_depth -= 1;
            }
            token::Value::Parameter(_) => {
                let parameter_token =
                    input.next_or_err("reading the number after a parameter token")?;
                // A doubled parameter token stands for a literal one, which
                // supports nested macro definitions.
                if let token::Value::Parameter(_) = parameter_token.value() {
                    push(&mut result, parameter_token);
                    continue;
                }
                let index = parameter_token
                    .char()
                    .and_then(char_to_parameter_index)
                    .ok_or_else(|| {
                        error::Error::missing_argument(
                            "reading the number after a parameter token",
                        )
                        .with_note(
                            "a parameter token must be followed by a number from 1 through 9",
                        )
                    })?;
                if index >= num_parameters {
                    return Err(error::Error::missing_argument(
                        "reading the replacement text of a macro definition",
                    )
                    .with_note(format![
                        "parameter number {} appeared but this macro has only {} parameter(s)",
                        index + 1,
                        num_parameters,
                    ]));
                }
                result.push(texmacro::Replacement::Parameter(index));
                continue;
            }
            _ => {}
        }
        push(&mut result, token);
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
        let mut commands = crate::built_ins();
        commands.insert(
            "assertGlobalIsFalse",
            prefix::get_assert_global_is_false(),
        );
        commands
    }

    test_suite![
        expansion_equality_tests(
            (def_parsed_successfully, r"\def\A{abc}", ""),
            (output_is_correct, r"\def\A{abc}\A", "abc"),
            (output_twice, r"\def\A{abc}\A\A", "abcabc"),
            (parse_one_parameter, r"\def\A#1{a-#1-b}", ""),
            (one_parameter, r"\def\A#1{a-#1-b}\A1", "a-1-b"),
            (
                one_parameter_multiple_times,
                r"\def\A#1{#1 #1 #1}\A1",
                "1 1 1"
            ),
            (
                one_parameter_multiple_tokens,
                r"\def\A#1{a-#1-b}\A{123}",
                "a-123-b"
            ),
            (two_parameters, r"\def\A#1#2{#2-#1}\A56", "6-5"),
            (
                two_parameters_multiple_token_inputs,
                r"\def\A#1#2{#2-#1}\A{abc}{xyz}",
                "xyz-abc"
            ),
            (
                grouping,
                r"\def\A{Hello}\A{\def\A{World}\A}\A",
                r"HelloWorldHello"
            ),
            (
                grouping_global,
                r"\def\A{Hello}\A{\global\def\A{World}\A}\A",
                r"HelloWorldWorld"
            ),
            (gdef, r"\def\A{Hello}\A{\gdef\A{World}\A}\A", r"HelloWorldWorld"),
            (
                gdef_global,
                r"\def\A{Hello}\A{\global\gdef\A{World}\A}\A",
                r"HelloWorldWorld"
            ),
            (def_takes_global, r"\global\def\A{Hello}\assertGlobalIsFalse", r""),
            (gdef_takes_global, r"\global\gdef\A{Hello}\assertGlobalIsFalse", r""),
            (
                nested_definition,
                r"\def\a#1{\def\b##1{##1#1}}\a!\b{Hello}",
                "Hello!"
            ),
            (
                repeated_expansion,
                r"\def\mustnt{I must not talk in class.}%
                  \def\five{\mustnt\mustnt\mustnt\mustnt\mustnt}%
                  \five\five",
                "I must not talk in class.".repeat(10)
            ),
            (
                redefinition_mid_expansion,
                r"\def\a{\b}%
                  \def\b{A\def\a{B\def\a{C\def\a{\b}}}}%
                  \def\puzzle{\a\a\a\a\a}%
                  \puzzle",
                "ABCAB"
            ),
        ),
        failure_tests(
            (end_of_input_scanning_target, r"\def"),
            (end_of_input_scanning_parameter_text, r"\def\A"),
            (end_of_input_scanning_replacement, r"\def\A{"),
            (end_of_input_scanning_nested_replacement, r"\def\A{{}"),
            (end_of_input_reading_parameter_number, r"\def\A#"),
            (end_of_input_scanning_argument, r"\def\A#1{} \A"),
            (
                end_of_input_reading_value_for_parameter,
                r"\def\A#1{} \A{this {is parameter 1 but it never ends}"
            ),
            (unexpected_token_target, r"\def a"),
            (unexpected_token_parameter_text, r"\def\A abc{}"),
            (unexpected_token_parameter_number, r"\def\A #a{}"),
            (unexpected_parameter_number_in_parameter_text, r"\def\A #2{}"),
            (unexpected_parameter_token_in_replacement, r"\def\A #1{#a}"),
            (unexpected_parameter_number_in_replacement, r"\def\A {#1}"),
            (
                unexpected_parameter_number_in_replacement_2,
                r"\def\A #1{#2}"
            ),
        ),
    ];
}
