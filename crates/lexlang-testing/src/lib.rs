/*!
Lexlang unit testing library

This is a crate for writing unit tests for code that uses Lexlang.
It is used extensively in the Lexlang standard library and the glossary
crate, so the unit tests there are good examples of what this crate can do.

## Basic setup

Each unit test built with this library works with a specific user-defined
Lexlang state type, provided by the unit test writer. In addition to
implementing the [`LexlangState`] trait, this state must:

1. Include the [`TestingComponent`] type as a component; i.e., the state
   must implement the
   [`HasComponent<TestingComponent>`](lexlang::traits::HasComponent) trait.

1. Implement [`Default`].

If the unit test doesn't require anything else from the state, the [`State`]
type defined in this library can simply be used.

## Test types

Expansion equality tests ([`run_expansion_equality_test`]) verify that two
Lexlang snippets produce the same output; the second snippet is usually a
constant. Failure tests ([`run_failure_test`]) verify that a snippet fails
to execute. Diagnostics emitted while a test runs are captured and can be
asserted on through the [`TestingComponent`].

The preferred way to write a suite of unit tests is the [`test_suite`]
macro, which removes the boilerplate around the run functions.
*/

use std::collections::HashMap;

use lexlang::diagnostics;
use lexlang::traits::*;
use lexlang::vm::implement_has_component;
use lexlang::vm::VM;
use lexlang::*;

/// Lexlang component that every unit testing state needs to have.
#[derive(Default)]
pub struct TestingComponent {
    allow_undefined_command: bool,
    tokens: Vec<token::Token>,
    diagnostics: diagnostics::CollectingSink,
}

impl TestingComponent {
    fn take_tokens(&mut self) -> Vec<token::Token> {
        let mut result = Vec::new();
        std::mem::swap(&mut result, &mut self.tokens);
        result
    }

    /// The diagnostics reported while the test ran.
    pub fn diagnostics(&self) -> Vec<diagnostics::Diagnostic> {
        self.diagnostics.reported()
    }

    /// The message keys of the diagnostics reported while the test ran.
    pub fn diagnostic_keys(&self) -> Vec<String> {
        self.diagnostics.keys()
    }
}

/// Simple state type for simple unit tests.
///
/// If the primitives under test don't require custom components or other
/// pieces in the state, it is easier to use this type rather than defining a
/// custom one.
#[derive(Default)]
pub struct State {
    testing: TestingComponent,
}

impl LexlangState for State {}

implement_has_component![State, TestingComponent, testing];

/// Option passed to a test runner.
pub enum TestOption<'a, S> {
    /// The built-in commands are the result of invoking the provided static
    /// function.
    ///
    /// Overrides previous `BuiltInCommands` or `BuiltInCommandsDyn` options.
    BuiltInCommands(fn() -> HashMap<&'static str, command::BuiltIn<S>>),

    /// The built-in commands are the result of invoking the provided
    /// closure.
    ///
    /// Overrides previous `BuiltInCommands` or `BuiltInCommandsDyn` options.
    BuiltInCommandsDyn(Box<dyn Fn() -> HashMap<&'static str, command::BuiltIn<S>> + 'a>),

    /// The provided static function is invoked after the VM is created and
    /// before execution starts. This can be used to provide more custom VM
    /// initialization.
    ///
    /// Overrides previous `CustomVMInitialization` or
    /// `CustomVMInitializationDyn` options.
    CustomVMInitialization(fn(&mut VM<S>)),

    /// The provided closure is invoked after the VM is created and before
    /// execution starts. This can be used to provide more custom VM
    /// initialization.
    ///
    /// Overrides previous `CustomVMInitialization` or
    /// `CustomVMInitializationDyn` options.
    #[allow(clippy::type_complexity)]
    CustomVMInitializationDyn(Box<dyn Fn(&mut VM<S>) + 'a>),

    /// Whether undefined commands are echoed to the output rather than
    /// raising an error. Defaults to false.
    ///
    /// Overrides previous `AllowUndefinedCommands` options.
    AllowUndefinedCommands(bool),
}

/// Run an expansion equality test.
///
/// The test passes if the two provided input strings expand to the same
/// tokens.
pub fn run_expansion_equality_test<S>(lhs: &str, rhs: &str, options: &[TestOption<S>])
where
    S: Default + HasComponent<TestingComponent>,
{
    let options = ResolvedOptions::new(options);

    let mut vm_1 = initialize_vm(&options);
    let output_1 = execute_source_code(&mut vm_1, lhs, &options)
        .map_err(|err| {
            println!("{err}");
            err
        })
        .unwrap();

    let mut vm_2 = initialize_vm(&options);
    let output_2 = execute_source_code(&mut vm_2, rhs, &options)
        .map_err(|err| {
            println!("{err}");
            err
        })
        .unwrap();
    compare_output(output_1, &vm_1, output_2, &vm_2)
}

fn compare_output<S>(
    mut output_1: Vec<token::Token>,
    vm_1: &vm::VM<S>,
    mut output_2: Vec<token::Token>,
    vm_2: &vm::VM<S>,
) {
    let trim_space = |v: &mut Vec<token::Token>| {
        let last = match v.last() {
            None => return,
            Some(last) => last,
        };
        if last.cat_code() == Some(token::CatCode::Space) {
            v.pop();
        }
    };
    trim_space(&mut output_1);
    trim_space(&mut output_2);

    use ::lexlang::token::Value::ControlSequence;
    let equal = output_1.len() == output_2.len()
        && output_1
            .iter()
            .zip(output_2.iter())
            .all(|(token_1, token_2)| match (&token_1.value(), &token_2.value()) {
                (ControlSequence(cs_name_1), ControlSequence(cs_name_2)) => {
                    let name_1 = vm_1.cs_name_interner().resolve(*cs_name_1);
                    let name_2 = vm_2.cs_name_interner().resolve(*cs_name_2);
                    name_1 == name_2
                }
                _ => token_1 == token_2,
            });

    if !equal {
        println!("Expansion output is different:");
        println!("------[lhs]------");
        println!(
            "'{}'",
            ::lexlang::token::write_tokens(&output_1, vm_1.cs_name_interner())
        );
        println!("------[rhs]------");
        println!(
            "'{}'",
            ::lexlang::token::write_tokens(&output_2, vm_2.cs_name_interner())
        );
        println!("-----------------");
        panic!("Expansion test failed");
    }
}

/// Run a failure test.
///
/// The test passes if execution of the provided input fails.
pub fn run_failure_test<S>(input: &str, options: &[TestOption<S>])
where
    S: Default + HasComponent<TestingComponent>,
{
    let options = ResolvedOptions::new(options);

    let mut vm = initialize_vm(&options);
    let result = execute_source_code(&mut vm, input, &options);
    if let Ok(output) = result {
        println!("Execution succeeded:");
        println!(
            "{}",
            ::lexlang::token::write_tokens(&output, vm.cs_name_interner())
        );
        panic!("Failure test did not pass: execution successful");
    }
}

/// Run a test and return the output tokens written as a string, plus the
/// diagnostics that were reported.
///
/// This runner is for tests that assert on diagnostics or on rendered
/// output directly.
pub fn run_to_string<S>(
    input: &str,
    options: &[TestOption<S>],
) -> (String, Vec<diagnostics::Diagnostic>)
where
    S: Default + HasComponent<TestingComponent>,
{
    let options = ResolvedOptions::new(options);
    let mut vm = initialize_vm(&options);
    let output = execute_source_code(&mut vm, input, &options)
        .map_err(|err| {
            println!("{err}");
            err
        })
        .unwrap();
    let rendered = ::lexlang::token::write_tokens(&output, vm.cs_name_interner());
    let diagnostics = vm.state.component().diagnostics();
    (rendered, diagnostics)
}

struct ResolvedOptions<'a, S> {
    built_in_commands: &'a dyn Fn() -> HashMap<&'static str, command::BuiltIn<S>>,
    custom_vm_initialization: &'a dyn Fn(&mut VM<S>),
    allow_undefined_commands: bool,
}

impl<'a, S> ResolvedOptions<'a, S> {
    pub fn new(options: &'a [TestOption<S>]) -> Self {
        let mut resolved = Self {
            built_in_commands: &HashMap::new,
            custom_vm_initialization: &|_| {},
            allow_undefined_commands: false,
        };
        for option in options {
            match option {
                TestOption::BuiltInCommands(f) => resolved.built_in_commands = f,
                TestOption::BuiltInCommandsDyn(f) => resolved.built_in_commands = f,
                TestOption::CustomVMInitialization(f) => resolved.custom_vm_initialization = f,
                TestOption::CustomVMInitializationDyn(f) => resolved.custom_vm_initialization = f,
                TestOption::AllowUndefinedCommands(b) => resolved.allow_undefined_commands = *b,
            }
        }
        resolved
    }
}

fn initialize_vm<S>(options: &ResolvedOptions<S>) -> Box<vm::VM<S>>
where
    S: Default + HasComponent<TestingComponent>,
{
    let mut vm = VM::<S>::new((options.built_in_commands)());
    vm.diagnostics = std::rc::Rc::new(std::cell::RefCell::new(
        vm.state.component().diagnostics.clone(),
    ));
    (options.custom_vm_initialization)(&mut vm);
    vm
}

/// Execute source code in a VM with the provided options.
fn execute_source_code<S>(
    vm: &mut vm::VM<S>,
    source: &str,
    options: &ResolvedOptions<S>,
) -> Result<Vec<token::Token>, Box<error::Error>>
where
    S: Default + HasComponent<TestingComponent>,
{
    vm.push_source(source);
    vm.state.component_mut().allow_undefined_command = options.allow_undefined_commands;
    vm.run::<Handlers>()?;
    Ok(vm.state.component_mut().take_tokens())
}

struct Handlers;

impl<S: HasComponent<TestingComponent>> vm::Handlers<S> for Handlers {
    fn character_handler(
        token: token::Token,
        input: &mut vm::ExecutionInput<S>,
    ) -> prelude::Result<()> {
        input.state_mut().component_mut().tokens.push(token);
        Ok(())
    }

    fn undefined_command_handler(
        token: token::Token,
        input: &mut vm::ExecutionInput<S>,
    ) -> prelude::Result<()> {
        if input.state().component().allow_undefined_command {
            input.state_mut().component_mut().tokens.push(token);
            Ok(())
        } else {
            Err(input.vm().undefined_command_error(token))
        }
    }
}

/// Macro to generate a suite of unit tests
///
/// The general use of this macro looks like this:
/// ```
/// # use lexlang_testing::*;
/// # use std::collections::HashMap;
/// # fn built_in_commands() -> HashMap<&'static str, lexlang::command::BuiltIn<State>> {
/// #     Default::default()
/// # }
/// test_suite![
///     state(State),
///     options(TestOption::BuiltInCommands(built_in_commands)),
///     expansion_equality_tests(
///         (case_1, "", ""),
///     ),
///     failure_tests(
///         (case_2, "}"),
///     ),
/// ];
/// ```
///
/// The arguments to the macro are:
///
/// - `state(State)`: the Rust type to use as the VM state in the tests.
///   Can be omitted, in which case it defaults to the type name `State` in
///   the current scope.
///
/// - `options(option_1, ..., option_n)`: options to pass to the test
///   runner, of type [TestOption]. Can be omitted, in which case they
///   default to `options(TestOption::BuiltInCommands(built_in_commands))`
///   where `built_in_commands` is a static function in the current scope.
///
/// - `expansion_equality_tests(cases...)`: a list of cases of the form
///   (case name, left hand side, right hand side), fed into
///   [run_expansion_equality_test].
///
/// - `failure_tests(cases...)`: a list of cases of the form
///   (case name, input), fed into [run_failure_test].
///
/// Only one `state()` argument may be provided, and if provided it must be
/// in the first position. Only one `options()` argument may be provided,
/// and if provided it must be in the first position or directly after the
/// `state()` argument.
#[macro_export]
macro_rules! test_suite {
    ( state($state: ty), options $options: tt, expansion_equality_tests ( $( ($name: ident, $lhs: expr, $rhs: expr $(,)? ) ),* $(,)? ) $(,)? ) => (
        $(
            #[test]
            fn $name() {
                let lhs = $lhs;
                let rhs = $rhs;
                let options = vec! $options;
                $crate::run_expansion_equality_test::<$state>(&lhs, &rhs, &options);
            }
        )*
    );
    ( state($state: ty), options $options: tt, expansion_equality_tests $test_body: tt $(,)? ) => (
        compile_error!("Invalid test cases for expansion_equality_tests: must be a list of tuples (name, lhs, rhs)");
    );
    ( state($state: ty), options $options: tt, failure_tests ( $( ($name: ident, $input: expr $(,)? ) ),* $(,)? ) $(,)? ) => (
        $(
            #[test]
            fn $name() {
                let input = $input;
                let options = vec! $options;
                $crate::run_failure_test::<$state>(&input, &options);
            }
        )*
    );
    ( state($state: ty), options $options: tt, $test_kind: ident $test_cases: tt $(,)? ) => (
        compile_error!("Invalid keyword: test_suite! only accepts the following keywords: `state`, `options`, `expansion_equality_tests`, `failure_tests`");
    );
    ( state($state: ty), options $options: tt, $( $test_kind: ident $test_cases: tt ),+ $(,)? ) => (
        $(
            test_suite![state($state), options $options, $test_kind $test_cases,];
        )+
    );
    ( options $options: tt, $( $test_kind: ident $test_cases: tt ),+ $(,)? ) => (
        test_suite![state(State), options $options, $( $test_kind $test_cases, )+ ];
    );
    ( $( $test_kind: ident $test_cases: tt ),+ $(,)? ) => (
        test_suite![options (TestOption::BuiltInCommands(built_in_commands)), $( $test_kind $test_cases, )+ ];
    );
}
