//! The `\relax` command, which does nothing.

use lexlang::prelude as lxl;
use lexlang::traits::*;
use lexlang::*;

pub const RELAX_DOC: &str = "Do nothing";

/// Get the `\relax` command.
pub fn get_relax<S: LexlangState>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(relax_primitive_fn).with_doc(RELAX_DOC)
}

fn relax_primitive_fn<S: LexlangState>(
    _: token::Token,
    _: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
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

    test_suite![expansion_equality_tests(
        (relax_does_nothing, r"a\relax b", "ab"),
        (relax_stops_label_scanning, r"\def\A{x}\A\relax\A", "xx"),
    ),];
}
