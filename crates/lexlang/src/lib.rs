//! # Lexlang
//!
//! Lexlang is an interpreter for a token-based markup language in the TeX
//! tradition: named commands consume tokens from an input stream, optionally
//! rewrite themselves into new tokens (macro expansion), and mutate a
//! process-wide but group-scoped table of name→command bindings.
//!
//! This crate contains the language core: tokens and category codes, the
//! lexer, the command type and the scoped command map, the virtual machine
//! with its input streams, parsing helpers, the error taxonomy and the
//! diagnostics interface. Primitives live in the `lexlang-stdlib` crate and
//! the glossary subsystem in `lexlang-glossary`.

extern crate lexicraft_stdext;

pub mod command;
pub mod diagnostics;
pub mod error;
pub mod parse;
pub mod prelude;
pub mod texmacro;
pub mod token;
pub mod vm;

/// Traits that are commonly used when implementing primitives.
pub mod traits {
    pub use crate::vm::{Handlers, HasComponent, LexlangState, TokenStream};
}
