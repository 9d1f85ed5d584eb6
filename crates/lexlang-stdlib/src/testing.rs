//! Utilities for writing unit tests for standard library primitives.
//!
//! The heavy lifting is done by the `lexlang-testing` crate; this module
//! just provides a ready-made state type that includes the components the
//! standard library primitives need.

use crate::prefix;
use lexlang::traits::*;
use lexlang::vm::implement_has_component;
use lexlang_testing::TestingComponent;

/// State type for unit tests of standard library primitives.
#[derive(Default)]
pub struct State {
    pub prefix: prefix::Component,
    pub testing: TestingComponent,
}

impl LexlangState for State {}

implement_has_component![
    State,
    (prefix::Component, prefix),
    (TestingComponent, testing),
];
