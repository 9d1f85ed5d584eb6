use super::LexlangState;
use crate::command;
use crate::diagnostics;
use crate::prelude as lxl;
use crate::token::Token;
use crate::*;

/// A stream of tokens generated on demand.
///
/// The front of the stream is retrieved with [TokenStream::next]; a token
/// that turns out not to be wanted is returned with [TokenStream::back]. In
/// practice all token streams in Lexlang are [ExecutionInput],
/// [ExpansionInput] or [UnexpandedStream]; this trait exists so a generic
/// function can accept any of them.
///
/// # Note on lazy loading
///
/// The contents of a stream cannot be determined in advance: reading a token
/// may pull more characters through the lexer, and tokenization is governed
/// by category codes that commands can change at runtime. Tokens are
/// therefore produced strictly on demand.
pub trait TokenStream {
    /// The type of the custom state in the VM.
    type S;

    /// Gets the next token in the stream.
    ///
    /// A result of `Ok(None)` indicates that the stream is exhausted.
    fn next(&mut self) -> lxl::Result<Option<Token>>;

    /// Returns a token to the front of the stream; it becomes the next token
    /// read.
    ///
    /// To return a sequence of tokens, call this method on the tokens in
    /// reverse order; the original relative order is then preserved.
    fn back(&mut self, token: Token);

    /// Gets the next token, or an end-of-input error mentioning the work
    /// being done.
    fn next_or_err(&mut self, doing: &'static str) -> lxl::Result<Token> {
        match self.next()? {
            Some(token) => Ok(token),
            None => Err(error::Error::end_of_input(doing)),
        }
    }

    /// Returns a reference to the VM.
    fn vm(&self) -> &vm::VM<Self::S>;

    /// Returns a reference to the commands map.
    #[inline]
    fn commands_map(&self) -> &command::Map<Self::S> {
        &self.vm().commands_map
    }

    /// Returns a reference to the custom state.
    #[inline]
    fn state(&self) -> &Self::S {
        &self.vm().state
    }

    /// Report a diagnostic through the VM's sink.
    fn report(&self, diagnostic: diagnostics::Diagnostic) {
        self.vm().report(diagnostic)
    }
}

/// Stream that returns input tokens without performing expansion.
///
/// The unexpanded stream is used when reading tokens verbatim, e.g. when
/// reading the replacement text of a macro definition.
#[repr(transparent)]
pub struct UnexpandedStream<S>(vm::VM<S>);

impl<S: LexlangState> TokenStream for UnexpandedStream<S> {
    type S = S;

    #[inline]
    fn next(&mut self) -> lxl::Result<Option<Token>> {
        stream::next_unexpanded(&mut self.0)
    }

    #[inline]
    fn back(&mut self, token: Token) {
        self.0.internal.expansions_mut().push(token);
    }

    #[inline]
    fn vm(&self) -> &vm::VM<S> {
        &self.0
    }
}

/// A [TokenStream] that performs expansion.
///
/// The expanded stream resolves each leading command token and, when the
/// command is expandable (a one-step rewrite primitive, a macro or a textual
/// constant), performs the rewrite and re-scans the replacement before
/// anything that followed in the original stream. Tokens returned from
/// [TokenStream::next] are therefore never expandable.
#[repr(transparent)]
pub struct ExpandedStream<S>(UnexpandedStream<S>);

impl<S> std::convert::AsMut<ExpandedStream<S>> for ExpandedStream<S> {
    fn as_mut(&mut self) -> &mut ExpandedStream<S> {
        self
    }
}

impl<S: LexlangState> TokenStream for ExpandedStream<S> {
    type S = S;

    #[inline]
    fn next(&mut self) -> lxl::Result<Option<Token>> {
        stream::next_expanded(&mut self.0 .0)
    }

    #[inline]
    fn back(&mut self, token: Token) {
        self.0.back(token);
    }

    #[inline]
    fn vm(&self) -> &vm::VM<S> {
        &self.0 .0
    }
}

impl<S: LexlangState> ExpandedStream<S> {
    /// Returns the underlying unexpanded stream.
    pub fn unexpanded(&mut self) -> &mut UnexpandedStream<S> {
        &mut self.0
    }

    /// Expand the next token in the input exactly one step.
    ///
    /// The replacement is pushed back onto the input and is not itself
    /// expanded by this call. Returns whether an expansion was performed;
    /// when it was not, the input is left unchanged. Expansion never mutates
    /// the commands map or any other shared state.
    pub fn expand_once(&mut self) -> lxl::Result<bool> {
        stream::expand_once(&mut self.0 .0)
    }

    /// Push tokens to the front of the input stream.
    ///
    /// The first token in the provided slice will be the next token read.
    #[inline]
    pub fn push_expansion(&mut self, expansion: &[Token]) {
        self.0 .0.internal.push_expansion(expansion)
    }

    /// Returns a mutable reference to the pushback stack for the current
    /// input source.
    ///
    /// The tokens are a stack: the next token read is the last element.
    /// Adding tokens here avoids the allocation of
    /// [push_expansion](ExpandedStream::push_expansion).
    #[inline]
    pub fn expansions_mut(&mut self) -> &mut Vec<Token> {
        self.0 .0.internal.expansions_mut()
    }

    /// Push the characters of a string to the front of the input stream.
    pub fn push_string_tokens(&mut self, s: &str) {
        let expansions = self.expansions_mut();
        for c in s.chars().rev() {
            expansions.push(Token::new_character(c));
        }
    }

    /// Returns an empty vector that can be used as a token buffer,
    /// potentially without allocating memory.
    ///
    /// Reusing buffers matters because several macros may be mid-expansion
    /// at once, each needing its own scratch space; a single shared buffer
    /// would be incorrect and per-call allocation is wasteful. Return the
    /// buffer with [return_token_buffer](ExpandedStream::return_token_buffer)
    /// when done.
    pub fn checkout_token_buffer(&mut self) -> Vec<Token> {
        self.0 .0.internal.token_buffers.pop().unwrap_or_default().0
    }

    /// Return a token buffer, allowing it to be reused.
    pub fn return_token_buffer(&mut self, mut token_buffer: Vec<Token>) {
        token_buffer.clear();
        self.0
             .0
            .internal
            .token_buffers
            .push(super::TokenBuffer(token_buffer))
    }
}

/// Input type for expandable primitives.
///
/// This type provides access to the input stream (with or without
/// expansion) and read-only access to the VM. It deliberately provides no
/// mutable access to the commands map or the state: expansion has no side
/// effects.
#[repr(transparent)]
pub struct ExpansionInput<S>(ExpandedStream<S>);

impl<S> std::convert::AsMut<ExpandedStream<S>> for ExpansionInput<S> {
    fn as_mut(&mut self) -> &mut ExpandedStream<S> {
        &mut self.0
    }
}

impl<S: LexlangState> TokenStream for ExpansionInput<S> {
    type S = S;

    #[inline]
    fn next(&mut self) -> lxl::Result<Option<Token>> {
        self.0.next()
    }

    #[inline]
    fn back(&mut self, token: Token) {
        self.0.back(token);
    }

    #[inline]
    fn vm(&self) -> &vm::VM<S> {
        self.0.vm()
    }
}

impl<S> ExpansionInput<S> {
    /// Creates a mutable reference to this type from the [VM](vm::VM) type.
    #[inline]
    pub fn new(vm: &mut vm::VM<S>) -> &mut ExpansionInput<S> {
        // Safe because ExpansionInput is a transparent wrapper around VM.
        unsafe { &mut *(vm as *mut vm::VM<S> as *mut ExpansionInput<S>) }
    }
}

impl<S: LexlangState> ExpansionInput<S> {
    #[inline]
    pub fn unexpanded(&mut self) -> &mut UnexpandedStream<S> {
        self.0.unexpanded()
    }

    #[inline]
    pub fn expanded(&mut self) -> &mut ExpandedStream<S> {
        &mut self.0
    }

    /// Push tokens to the front of the input stream.
    ///
    /// The first token in the provided slice will be the next token read.
    #[inline]
    pub fn push_expansion(&mut self, expansion: &[Token]) {
        self.0.push_expansion(expansion)
    }

    /// Returns a mutable reference to the pushback stack for the current
    /// input source.
    #[inline]
    pub fn expansions_mut(&mut self) -> &mut Vec<Token> {
        self.0.expansions_mut()
    }

    /// Push the characters of a string to the front of the input stream.
    pub fn push_string_tokens(&mut self, s: &str) {
        self.0.push_string_tokens(s)
    }

    /// See [ExpandedStream::checkout_token_buffer].
    pub fn checkout_token_buffer(&mut self) -> Vec<Token> {
        self.0.checkout_token_buffer()
    }

    /// See [ExpandedStream::return_token_buffer].
    pub fn return_token_buffer(&mut self, token_buffer: Vec<Token>) {
        self.0.return_token_buffer(token_buffer)
    }
}

/// Input type for immediate primitives.
///
/// In addition to the input stream, this type provides mutable access to the
/// state and the commands map, and control of the grouping stack. Only
/// immediate primitives can mutate shared interpreter state.
#[repr(transparent)]
pub struct ExecutionInput<S>(ExpandedStream<S>);

impl<S> std::convert::AsMut<ExpandedStream<S>> for ExecutionInput<S> {
    fn as_mut(&mut self) -> &mut ExpandedStream<S> {
        &mut self.0
    }
}

impl<S: LexlangState> TokenStream for ExecutionInput<S> {
    type S = S;

    #[inline]
    fn next(&mut self) -> lxl::Result<Option<Token>> {
        self.0.next()
    }

    #[inline]
    fn back(&mut self, token: Token) {
        self.0.back(token);
    }

    #[inline]
    fn vm(&self) -> &vm::VM<S> {
        self.0.vm()
    }
}

impl<S> ExecutionInput<S> {
    /// Creates a mutable reference to this type from the [VM](vm::VM) type.
    #[inline]
    pub fn new(vm: &mut vm::VM<S>) -> &mut ExecutionInput<S> {
        // Safe because ExecutionInput is a transparent wrapper around VM.
        unsafe { &mut *(vm as *mut vm::VM<S> as *mut ExecutionInput<S>) }
    }

    /// Returns a mutable reference to the state.
    #[inline]
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.0 .0 .0.state
    }

    /// Returns a mutable reference to the commands map.
    #[inline]
    pub fn commands_map_mut(&mut self) -> &mut command::Map<S> {
        &mut self.0 .0 .0.commands_map
    }
}

impl<S: LexlangState> ExecutionInput<S> {
    #[inline]
    pub fn unexpanded(&mut self) -> &mut UnexpandedStream<S> {
        self.0.unexpanded()
    }

    #[inline]
    pub fn expanded(&mut self) -> &mut ExpandedStream<S> {
        &mut self.0
    }

    /// Push tokens to the front of the input stream.
    ///
    /// The first token in the provided slice will be the next token read.
    #[inline]
    pub fn push_expansion(&mut self, expansion: &[Token]) {
        self.0.push_expansion(expansion)
    }

    /// Push the characters of a string to the front of the input stream.
    pub fn push_string_tokens(&mut self, s: &str) {
        self.0.push_string_tokens(s)
    }

    /// Begin a new group.
    pub fn begin_group(&mut self) {
        self.0 .0 .0.begin_group()
    }

    /// End the current group.
    ///
    /// Fails if there is no group to end.
    pub fn end_group(&mut self) -> lxl::Result<()> {
        self.0 .0 .0.end_group()
    }
}

mod stream {
    use super::*;
    use crate::token::lexer;
    use crate::token::Value;

    impl<T: LexlangState> lexer::CatCodeFn for T {
        #[inline]
        fn cat_code(&self, c: char) -> crate::token::CatCode {
            LexlangState::cat_code(self, c)
        }
    }

    pub fn next_unexpanded<S: LexlangState>(vm: &mut vm::VM<S>) -> lxl::Result<Option<Token>> {
        loop {
            if let Some(token) = vm.internal.current_source.expansions.pop() {
                return Ok(Some(token));
            }
            match vm
                .internal
                .current_source
                .root
                .next(&vm.state, &mut vm.internal.cs_name_interner)
            {
                Ok(Some(token)) => return Ok(Some(token)),
                Ok(None) => {
                    if !vm.internal.pop_source() {
                        return Ok(None);
                    }
                }
                Err(lexer::Error::InvalidCharacter(c)) => {
                    return Err(error::Error::invalid_character(c));
                }
                Err(lexer::Error::EmptyControlSequence) => {
                    return Err(error::Error::end_of_input(
                        "reading a control sequence name after an escape character",
                    ));
                }
            }
        }
    }

    /// Return the next non-expandable token.
    ///
    /// This is an explicit loop rather than recursion: each iteration
    /// performs at most one expansion step, and replacements land on the
    /// heap-allocated pushback stack, so arbitrarily deep macro nesting
    /// cannot exhaust the call stack.
    pub fn next_expanded<S: LexlangState>(vm: &mut vm::VM<S>) -> lxl::Result<Option<Token>> {
        loop {
            let token = match next_unexpanded(vm)? {
                None => return Ok(None),
                Some(token) => token,
            };
            let name = match token.value() {
                Value::ControlSequence(name) => name,
                _ => return Ok(Some(token)),
            };
            match vm.commands_map.resolve(&name) {
                Some(command::Command::Expandable(command, _)) => {
                    let command = *command;
                    command(token, ExpansionInput::new(vm))?;
                }
                Some(command::Command::Macro(command)) => {
                    let command = command.clone();
                    command.call(token, ExpansionInput::new(vm))?;
                }
                Some(command::Command::Textual(value)) => {
                    let value = value.clone();
                    push_textual(vm, &value);
                }
                _ => return Ok(Some(token)),
            }
        }
    }

    pub fn expand_once<S: LexlangState>(vm: &mut vm::VM<S>) -> lxl::Result<bool> {
        let token = match next_unexpanded(vm)? {
            None => return Ok(false),
            Some(token) => token,
        };
        let name = match token.value() {
            Value::ControlSequence(name) => name,
            _ => {
                vm.internal.expansions_mut().push(token);
                return Ok(false);
            }
        };
        match vm.commands_map.resolve(&name) {
            Some(command::Command::Expandable(command, _)) => {
                let command = *command;
                command(token, ExpansionInput::new(vm))?;
                Ok(true)
            }
            Some(command::Command::Macro(command)) => {
                let command = command.clone();
                command.call(token, ExpansionInput::new(vm))?;
                Ok(true)
            }
            Some(command::Command::Textual(value)) => {
                let value = value.clone();
                push_textual(vm, &value);
                Ok(true)
            }
            _ => {
                vm.internal.expansions_mut().push(token);
                Ok(false)
            }
        }
    }

    fn push_textual<S>(vm: &mut vm::VM<S>, value: &str) {
        let expansions = vm.internal.expansions_mut();
        for c in value.chars().rev() {
            expansions.push(Token::new_character(c));
        }
    }
}
