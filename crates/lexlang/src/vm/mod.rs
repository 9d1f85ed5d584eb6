//! The Lexlang virtual machine (VM).
//!
//! This module contains the definition of the runtime VM, the input streams
//! that wrap the VM, and the main loop that drives interpretation.

use crate::command;
use crate::command::BuiltIn;
use crate::command::Command;
use crate::diagnostics;
use crate::error;
use crate::prelude as lxl;
use crate::token;
use crate::token::lexer;
use crate::token::CsNameInterner;
use crate::token::Token;
use crate::token::Value;
use lexicraft_stdext::algorithms::spellcheck;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

mod streams;
pub use streams::*;

/// Implementations of this trait determine how the VM handles tokens that
/// have no automatic behavior.
///
/// The main loop reads the next expanded token and acts on it. Most cases
/// are fixed by the language semantics: immediate commands are executed,
/// begin-group and end-group tokens drive the grouping stack. The remaining
/// cases are business logic of the program being built, and are specified by
/// implementing the handlers here.
pub trait Handlers<S: LexlangState> {
    /// Handler to invoke for character tokens.
    ///
    /// This is not invoked for begin-group or end-group tokens, which are
    /// handled automatically.
    fn character_handler(token: Token, input: &mut ExecutionInput<S>) -> lxl::Result<()> {
        _ = (token, input);
        Ok(())
    }

    /// Handler to invoke for a control sequence with no binding.
    ///
    /// The default handler returns a hard error carrying the offending name
    /// and, when one exists, a similarly spelled defined name.
    fn undefined_command_handler(token: Token, input: &mut ExecutionInput<S>) -> lxl::Result<()> {
        Err(input.vm().undefined_command_error(token))
    }
}

/// Handlers with every behavior set to the default.
pub struct DefaultHandlers;

impl<S: LexlangState> Handlers<S> for DefaultHandlers {}

/// Implementations of this trait may be used as the state in a Lexlang VM.
///
/// The trait has no required methods; for any type it can be implemented
/// trivially. The methods are hooks invoked at specific points while the VM
/// runs, and offer a way of customizing VM behavior. They are all
/// dispatched statically.
pub trait LexlangState: Sized {
    /// Get the category code for the provided character.
    fn cat_code(&self, c: char) -> token::CatCode {
        token::CatCode::default_for(c)
    }

    /// Hook invoked when a group begins.
    ///
    /// State types with their own group-scoped data use this hook, together
    /// with [end_group_hook](LexlangState::end_group_hook), to stay in
    /// lockstep with the command map's grouping.
    fn begin_group_hook(&mut self) {}

    /// Hook invoked when a group ends.
    ///
    /// This hook is only invoked for balanced group ends; an end-group token
    /// with no open group is an error before the hook is reached.
    fn end_group_hook(&mut self) {}
}

impl LexlangState for () {}

/// The Lexlang virtual machine.
pub struct VM<S> {
    /// The state.
    pub state: S,

    /// The commands map.
    pub commands_map: command::Map<S>,

    /// Sink that receives diagnostics for recoverable conditions.
    ///
    /// Defaults to a sink that prints to standard error. Replaceable so
    /// hosts can render message keys themselves and tests can capture
    /// reports.
    pub diagnostics: Rc<RefCell<dyn diagnostics::DiagnosticSink>>,

    internal: Internal,
}

impl<S: Default> VM<S> {
    /// Create a new VM with the provided built-in commands.
    pub fn new(initial_built_ins: HashMap<&str, BuiltIn<S>>) -> Box<VM<S>> {
        let mut cs_name_interner = CsNameInterner::default();
        let initial_built_ins = initial_built_ins
            .into_iter()
            .map(|(key, value)| (cs_name_interner.get_or_intern(key), value))
            .collect();
        Box::new(VM {
            state: Default::default(),
            commands_map: command::Map::new(initial_built_ins),
            diagnostics: Rc::new(RefCell::new(diagnostics::StderrSink)),
            internal: Internal::new(cs_name_interner),
        })
    }
}

impl<S: LexlangState> VM<S> {
    /// Add new source code to the VM.
    ///
    /// Input source code is organized as a stack. Pushing source code onto
    /// the stack means it is read first.
    pub fn push_source<T: Into<String>>(&mut self, source_code: T) {
        self.internal.push_source(source_code.into());
    }

    /// Run the VM until the input is exhausted.
    pub fn run<H: Handlers<S>>(&mut self) -> lxl::Result<()> {
        let input = ExecutionInput::new(self);
        loop {
            let token = match input.next()? {
                None => break,
                Some(token) => token,
            };
            match token.value() {
                Value::ControlSequence(name) => {
                    match input.commands_map().resolve(&name) {
                        Some(Command::Immediate(cmd, _)) => {
                            let cmd = *cmd;
                            cmd(token, input)?;
                        }
                        // Expandable commands, macros and textual constants
                        // are consumed by the expanding stream before they
                        // reach this loop.
                        Some(_) => (),
                        None => H::undefined_command_handler(token, input)?,
                    }
                }
                Value::BeginGroup(_) => {
                    input.begin_group();
                }
                Value::EndGroup(_) => {
                    input.end_group()?;
                }
                Value::Parameter(_) | Value::Space(_) | Value::Letter(_) | Value::Other(_) => {
                    H::character_handler(token, input)?
                }
            }
        }
        Ok(())
    }
}

impl<S> VM<S> {
    /// Clear all source code from the VM.
    pub fn clear_sources(&mut self) {
        self.internal.clear_sources()
    }

    /// Return a reference to the control sequence name string interner.
    ///
    /// The interner resolves [CsName](token::CsName) values into strings.
    #[inline]
    pub fn cs_name_interner(&self) -> &CsNameInterner {
        &self.internal.cs_name_interner
    }

    /// Report a diagnostic through the VM's sink.
    pub fn report(&self, diagnostic: diagnostics::Diagnostic) {
        self.diagnostics.borrow_mut().report(&diagnostic);
    }

    /// Resolve the name carried by the provided token.
    ///
    /// Returns a placeholder if the token is not a control sequence.
    pub fn resolve_cs_name(&self, token: Token) -> &str {
        match token.value() {
            Value::ControlSequence(name) => self
                .internal
                .cs_name_interner
                .resolve(name)
                .unwrap_or("invalidCsName"),
            _ => "notACsName",
        }
    }

    /// Build an undefined-command error for the provided token, with a
    /// spelling suggestion when a close name is bound.
    ///
    /// This walks all bound names and is only intended for error paths.
    pub fn undefined_command_error(&self, token: Token) -> Box<error::Error> {
        let name = self.resolve_cs_name(token).to_string();
        let candidates: Vec<&str> = self
            .commands_map
            .bound_names_slow()
            .into_iter()
            .filter_map(|cs_name| self.internal.cs_name_interner.resolve(cs_name))
            .collect();
        let suggestion = spellcheck::find_close_words(&candidates, &name)
            .first()
            .map(|s| s.word().to_string());
        error::Error::undefined_command(name, suggestion)
    }

    fn begin_group(&mut self)
    where
        S: LexlangState,
    {
        self.commands_map.begin_group();
        self.state.begin_group_hook();
    }

    fn end_group(&mut self) -> lxl::Result<()>
    where
        S: LexlangState,
    {
        match self.commands_map.end_group() {
            Ok(()) => {
                self.state.end_group_hook();
                Ok(())
            }
            Err(_) => Err(error::Error::unbalanced_group()),
        }
    }
}

/// Parts of the VM that are private.
struct Internal {
    // The sources form a stack. The top element is stored directly for
    // performance.
    current_source: Source,
    sources: Vec<Source>,

    cs_name_interner: CsNameInterner,

    token_buffers: std::collections::BinaryHeap<TokenBuffer>,
}

impl Internal {
    fn new(cs_name_interner: CsNameInterner) -> Self {
        Internal {
            current_source: Default::default(),
            sources: Default::default(),
            cs_name_interner,
            token_buffers: Default::default(),
        }
    }

    fn push_source(&mut self, source_code: String) {
        let mut new_source = Source::new(source_code);
        std::mem::swap(&mut new_source, &mut self.current_source);
        self.sources.push(new_source);
    }

    fn clear_sources(&mut self) {
        self.current_source = Default::default();
        self.sources.clear();
    }

    #[inline]
    fn push_expansion(&mut self, expansion: &[Token]) {
        self.current_source
            .expansions
            .extend(expansion.iter().rev());
    }

    #[inline]
    fn expansions_mut(&mut self) -> &mut Vec<Token> {
        &mut self.current_source.expansions
    }

    fn pop_source(&mut self) -> bool {
        match self.sources.pop() {
            None => false,
            Some(source) => {
                self.current_source = source;
                true
            }
        }
    }
}

struct Source {
    // The pushback stack: the next token to be read is the last element.
    expansions: Vec<Token>,
    root: lexer::Lexer,
}

impl Source {
    fn new(source_code: String) -> Source {
        Source {
            expansions: Vec::with_capacity(32),
            root: lexer::Lexer::new(source_code),
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::new("".into())
    }
}

// Token buffers are keyed by capacity so that the buffer with the most
// memory already allocated is reused first.
#[derive(Default)]
struct TokenBuffer(Vec<Token>);

impl PartialEq for TokenBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.0.capacity() == other.0.capacity()
    }
}

impl Eq for TokenBuffer {}

impl PartialOrd for TokenBuffer {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TokenBuffer {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.capacity().cmp(&other.0.capacity())
    }
}

/// Helper trait for implementing the component pattern.
///
/// Stateful commands do not store their state in globals; instead the state
/// needed by a family of commands is isolated in a *component*, a concrete
/// Rust type defined in the same module as the commands. Any VM state type
/// that contains the component can implement this trait, and the commands
/// are written against the trait bound rather than a specific state type.
/// Different programs can therefore compose different sets of commands by
/// including the corresponding components in their state.
pub trait HasComponent<C>: LexlangState {
    /// Return an immutable reference to the component.
    fn component(&self) -> &C;

    /// Return a mutable reference to the component.
    fn component_mut(&mut self) -> &mut C;
}

/// This macro implements the [HasComponent] trait in the common case when
/// the state is a struct and the component is a direct field of the struct.
///
/// ## Examples
///
/// ```
/// # mod mylibrary{
/// #   pub struct Component;
/// # }
/// # use lexlang::vm::implement_has_component;
/// # use lexlang::traits::*;
/// #
/// struct MyState {
///     component: mylibrary::Component,
/// }
///
/// impl LexlangState for MyState {}
///
/// implement_has_component![MyState, mylibrary::Component, component];
/// ```
#[macro_export]
macro_rules! implement_has_component {
    ( $type: path, $component: path, $field: ident ) => {
        implement_has_component![$type, ($component, $field),];
    };
    ( $type: path, $(($component: path, $field: ident),)+) => {
        $(
            impl ::lexlang::vm::HasComponent<$component> for $type {
                #[inline]
                fn component(&self) -> &$component {
                    &self.$field
                }
                #[inline]
                fn component_mut(&mut self) -> &mut $component {
                    &mut self.$field
                }
            }
        )*
    };
}

pub use implement_has_component;
