//! Lexlang as a scripting language.
//!
//! This module enables running Lexlang source as a batch script. Input is
//! processed with the usual semantics, but instead of feeding a document
//! writer the output is collected and returned as a list of tokens. These
//! are easily converted to a string using [lexlang::token::write_tokens].

use lexlang::diagnostics;
use lexlang::prelude as lxl;
use lexlang::traits::*;
use lexlang::*;

/// Component for the script module.
#[derive(Default)]
pub struct Component {
    exec_output: Vec<token::Token>,
    allow_undefined_commands: bool,
}

/// Set whether undefined commands are reported as a warning and echoed, or
/// raise a hard error.
pub fn set_allow_undefined_commands<S: HasComponent<Component>>(state: &mut S, allow: bool) {
    state.component_mut().allow_undefined_commands = allow;
}

/// Run the interpreter for the provided VM and return the collected output.
pub fn run<S: HasComponent<Component>>(vm: &mut vm::VM<S>) -> lxl::Result<Vec<token::Token>> {
    vm.run::<Handlers>()?;
    let mut result = Vec::new();
    std::mem::swap(&mut result, &mut vm.state.component_mut().exec_output);
    Ok(result)
}

struct Handlers;

impl<S: HasComponent<Component>> vm::Handlers<S> for Handlers {
    fn character_handler(
        mut token: token::Token,
        input: &mut vm::ExecutionInput<S>,
    ) -> lxl::Result<()> {
        if let Some('\n') = token.char() {
            token = token::Token::new_space(' ');
        }
        input.state_mut().component_mut().exec_output.push(token);
        Ok(())
    }

    fn undefined_command_handler(
        token: token::Token,
        input: &mut vm::ExecutionInput<S>,
    ) -> lxl::Result<()> {
        if input.state().component().allow_undefined_commands {
            // Echo the control sequence and continue; exactly one
            // diagnostic is reported for the reference.
            let name = input.vm().resolve_cs_name(token).to_string();
            input.report(diagnostics::Diagnostic::warning("command.undefined").with_arg("name", name));
            input.state_mut().component_mut().exec_output.push(token);
            Ok(())
        } else {
            Err(input.vm().undefined_command_error(token))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefix;
    use lexlang::vm::implement_has_component;

    #[derive(Default)]
    struct State {
        prefix: prefix::Component,
        script: Component,
    }

    impl LexlangState for State {}

    implement_has_component![
        State,
        (prefix::Component, prefix),
        (Component, script),
    ];

    fn new_vm(allow_undefined_commands: bool) -> Box<vm::VM<State>> {
        let mut vm = vm::VM::<State>::new(crate::built_ins());
        set_allow_undefined_commands(&mut vm.state, allow_undefined_commands);
        vm
    }

    fn run_to_string(vm: &mut vm::VM<State>) -> String {
        let tokens = run(vm).unwrap();
        token::write_tokens(&tokens, vm.cs_name_interner())
    }

    #[test]
    fn output_is_collected() {
        let mut vm = new_vm(false);
        vm.push_source(r"\def\greet#1{hello, #1}\greet{world}");
        assert_eq!(run_to_string(&mut vm), "hello, world");
    }

    #[test]
    fn undefined_command_is_a_hard_error_by_default() {
        let mut vm = new_vm(false);
        vm.push_source(r"\neverDefined");
        let err = run(&mut vm).unwrap_err();
        assert_eq!(err.kind(), error::Kind::UndefinedCommand);
    }

    #[test]
    fn undefined_command_is_echoed_with_one_warning_when_allowed() {
        let mut vm = new_vm(true);
        let sink = diagnostics::CollectingSink::default();
        vm.diagnostics = std::rc::Rc::new(std::cell::RefCell::new(sink.clone()));
        // The lexer trims whitespace after a control word, so the rendered
        // output has no space after the echoed command.
        vm.push_source(r"a\neverDefined b");
        assert_eq!(run_to_string(&mut vm), r"a\neverDefinedb");
        let reported = sink.reported();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].key(), "command.undefined");
        assert_eq!(reported[0].arg("name"), Some("neverDefined"));
    }
}
