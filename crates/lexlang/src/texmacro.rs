//! User-defined macros.
//!
//! A macro is a command with a fixed number of parameters `#1` through `#9`
//! and a replacement text. Invoking the macro reads one argument per
//! parameter from the input, substitutes the arguments into the replacement
//! text, and pushes the result back onto the input for re-scanning. No state
//! is mutated; macro invocation is pure expansion.
//!
//! Arguments are read without expansion. Each argument is either a single
//! token or a balanced braced group; in the latter case the outer braces are
//! not part of the argument.

use crate::parse;
use crate::prelude as lxl;
use crate::token::Token;
use crate::vm;
use crate::vm::LexlangState;

/// A user-defined macro.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Macro {
    num_parameters: usize,
    replacements: Vec<Replacement>,
}

/// A token list or parameter in a replacement text.
///
/// Token lists are stored in reverse order. The replacement is pushed onto
/// the input's pushback stack, whose top is the next token to be read, so
/// storing the tokens reversed makes substitution a plain extend.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Replacement {
    /// A list of tokens, in reverse order.
    Tokens(Vec<Token>),

    /// A parameter. The index must be less than the macro's number of
    /// parameters.
    Parameter(usize),
}

impl Macro {
    /// Create a new macro.
    pub fn new(num_parameters: usize, replacements: Vec<Replacement>) -> Macro {
        Macro {
            num_parameters,
            replacements,
        }
    }

    pub fn num_parameters(&self) -> usize {
        self.num_parameters
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    /// Expand the macro: read its arguments and push the substituted
    /// replacement text onto the input.
    pub fn call<S: LexlangState>(
        &self,
        _token: Token,
        input: &mut vm::ExpansionInput<S>,
    ) -> lxl::Result<()> {
        let mut argument_tokens = input.checkout_token_buffer();
        let mut argument_indices: Vec<(usize, usize)> = Vec::with_capacity(self.num_parameters);
        for _ in 0..self.num_parameters {
            let start_index = argument_tokens.len();
            parse::parse_undelimited_argument(
                "reading an argument for a user-defined macro",
                input.unexpanded(),
                &mut argument_tokens,
            )?;
            argument_indices.push((start_index, argument_tokens.len()));
        }

        let mut arguments: Vec<&[Token]> = Vec::with_capacity(self.num_parameters);
        for (i, j) in &argument_indices {
            arguments.push(&argument_tokens[*i..*j]);
        }

        let result = input.expansions_mut();
        Macro::perform_replacement(&self.replacements, &arguments, result);

        input.return_token_buffer(argument_tokens);
        Ok(())
    }

    fn perform_replacement(
        replacements: &[Replacement],
        arguments: &[&[Token]],
        result: &mut Vec<Token>,
    ) {
        let mut output_size = 0;
        for replacement in replacements {
            output_size += match replacement {
                Replacement::Tokens(tokens) => tokens.len(),
                Replacement::Parameter(i) => arguments[*i].len(),
            };
        }
        result.reserve(output_size);
        // The pushback stack is read top-first, so the last replacement
        // element is pushed first.
        for replacement in replacements.iter().rev() {
            match replacement {
                Replacement::Tokens(tokens) => {
                    result.extend(tokens);
                }
                Replacement::Parameter(i) => {
                    result.extend(arguments[*i].iter().rev().copied());
                }
            }
        }
    }
}
