//! Utilities for writing unit tests for the glossary commands.

use crate::registry;
use lexlang::command::BuiltIn;
use lexlang::traits::*;
use lexlang::vm::implement_has_component;
use lexlang_testing::TestingComponent;
use std::collections::HashMap;

/// State type for unit tests of glossary commands.
#[derive(Default)]
pub struct State {
    pub glossary: registry::Component,
    pub prefix: lexlang_stdlib::prefix::Component,
    pub testing: TestingComponent,
}

impl LexlangState for State {
    fn begin_group_hook(&mut self) {
        registry::Component::begin_group_hook(self)
    }

    fn end_group_hook(&mut self) {
        registry::Component::end_group_hook(self)
    }
}

implement_has_component![
    State,
    (registry::Component, glossary),
    (lexlang_stdlib::prefix::Component, prefix),
    (TestingComponent, testing),
];

/// The glossary built-ins plus the standard library ones, so tests can mix
/// `\def` and friends with glossary commands.
pub fn all_built_ins() -> HashMap<&'static str, BuiltIn<State>> {
    let mut commands = lexlang_stdlib::built_ins();
    commands.extend(crate::built_ins());
    commands
}
