//! # The Lexlang standard library
//!
//! This crate contains implementations of the general-purpose Lexlang
//! primitives: macro definition, aliasing, the `\global` prefix, textual
//! constants, conditionals and the script module for batch runs.

extern crate lexlang;

use std::collections::HashMap;

use lexlang::traits::*;
use lexlang::vm::implement_has_component;

pub mod alias;
pub mod conditional;
pub mod def;
pub mod prefix;
pub mod relax;
pub mod script;
#[cfg(test)]
pub mod testing;
pub mod textual;

/// A state struct that is compatible with every primitive in the Lexlang
/// standard library.
#[derive(Default)]
pub struct StdLibState {
    pub prefix: prefix::Component,
    pub script: script::Component,
}

impl LexlangState for StdLibState {}

implement_has_component![
    StdLibState,
    (prefix::Component, prefix),
    (script::Component, script),
];

impl StdLibState {
    /// All the built-in commands in the standard library.
    pub fn all_built_ins() -> HashMap<&'static str, lexlang::command::BuiltIn<StdLibState>> {
        built_ins()
    }
}

/// The standard library's built-in commands, for any state that has the
/// prefix component.
pub fn built_ins<S: HasComponent<prefix::Component>>(
) -> HashMap<&'static str, lexlang::command::BuiltIn<S>> {
    HashMap::from([
        ("def", def::get_def()),
        ("gdef", def::get_gdef()),
        ("global", prefix::get_global()),
        ("ifdefined", conditional::get_ifdefined()),
        ("iffalse", conditional::get_iffalse()),
        ("iftrue", conditional::get_iftrue()),
        ("let", alias::get_let()),
        ("relax", relax::get_relax()),
        ("textdef", textual::get_textdef()),
    ])
}
