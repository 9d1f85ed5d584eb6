//! Lexlang commands.
//!
//! A command is a named unit of behavior bound in the command map. There are
//! two fundamentally different ways a command can interact with the
//! interpreter:
//!
//! - *Expansion*: the command rewrites itself into a replacement sequence of
//!   tokens, which is pushed back onto the input for re-scanning. Expansion
//!   can read tokens (the command's arguments) but never mutates the
//!   interpreter state.
//!
//! - *Processing*: the command executes its full behavior, including side
//!   effects on the command map or other shared state.
//!
//! The [Command] type is a closed set of variants. Built-in behaviors are
//! provided as function pointers; user-level behaviors (macros, textual
//! constants, aliases) are data interpreted by the main loop. New behaviors
//! are new variant payloads, which keeps dispatch exhaustive.

use crate::texmacro;
use crate::token;
use crate::vm;
use std::num;
use std::rc;
use std::sync;

pub(crate) mod map;

pub use map::Map;
pub use map::Scope;
pub use map::ALIAS_DEPTH_LIMIT;

/// The Rust type of expandable primitive functions.
///
/// The function consumes exactly the arguments its command requires from the
/// input and pushes its one-step replacement back onto the input. The
/// replacement is not recursively expanded by the call itself.
pub type ExpandableFn<S> =
    fn(token: token::Token, input: &mut vm::ExpansionInput<S>) -> crate::prelude::Result<()>;

/// The Rust type of immediate primitive functions.
///
/// Immediate commands are executed for their side effects and produce no
/// replacement tokens.
pub type ImmediateFn<S> =
    fn(token: token::Token, input: &mut vm::ExecutionInput<S>) -> crate::prelude::Result<()>;

/// A Lexlang command.
pub enum Command<S> {
    /// A side-effecting primitive. Never expanded; only processed.
    ///
    /// Examples: `\def`, `\newglossaryentry`.
    Immediate(ImmediateFn<S>, Option<Tag>),

    /// A built-in one-step rewrite primitive.
    ///
    /// Examples: the conditionals, `\glsentryname`.
    Expandable(ExpandableFn<S>, Option<Tag>),

    /// A user-defined replacement-text macro.
    Macro(rc::Rc<texmacro::Macro>),

    /// A named constant string; expands to its characters.
    Textual(rc::Rc<str>),

    /// A forward to the command currently bound under another name.
    ///
    /// The target is resolved every time the alias is used, not when the
    /// alias is created, so a later rebinding of the target is observed
    /// through the alias.
    Alias(token::CsName),
}

impl<S> std::fmt::Display for Command<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Immediate(..) => write![f, "an immediate command"],
            Command::Expandable(..) => write![f, "an expandable command"],
            Command::Macro(_) => write![f, "a user-defined macro"],
            Command::Textual(_) => write![f, "a textual constant"],
            Command::Alias(_) => write![f, "an alias"],
        }
    }
}

impl<S> Command<S> {
    /// Gets the tag attached to this command, or [None].
    pub fn tag(&self) -> Option<Tag> {
        match self {
            Command::Immediate(_, tag) => *tag,
            Command::Expandable(_, tag) => *tag,
            Command::Macro(_) | Command::Textual(_) | Command::Alias(_) => None,
        }
    }
}

// The derived implementation would require S to be Clone.
impl<S> Clone for Command<S> {
    fn clone(&self) -> Self {
        match self {
            Command::Immediate(f, tag) => Command::Immediate(*f, *tag),
            Command::Expandable(f, tag) => Command::Expandable(*f, *tag),
            Command::Macro(m) => Command::Macro(m.clone()),
            Command::Textual(s) => Command::Textual(s.clone()),
            Command::Alias(target) => Command::Alias(*target),
        }
    }
}

/// A built-in command: a [Command] plus its documentation string.
///
/// Built-ins are the commands provided to the VM at initialization.
pub struct BuiltIn<S> {
    cmd: Command<S>,
    doc: Option<&'static str>,
}

impl<S> BuiltIn<S> {
    /// Create a new immediate built-in command.
    pub fn new_immediate(f: ImmediateFn<S>) -> BuiltIn<S> {
        Command::Immediate(f, None).into()
    }

    /// Create a new expandable built-in command.
    pub fn new_expandable(f: ExpandableFn<S>) -> BuiltIn<S> {
        Command::Expandable(f, None).into()
    }

    /// Create a new textual constant built-in command.
    pub fn new_textual<T: AsRef<str>>(value: T) -> BuiltIn<S> {
        Command::Textual(value.as_ref().into()).into()
    }

    /// Set the tag for this built-in command.
    pub fn with_tag(mut self, tag: Tag) -> BuiltIn<S> {
        match &mut self.cmd {
            Command::Immediate(_, t) => *t = Some(tag),
            Command::Expandable(_, t) => *t = Some(tag),
            Command::Macro(_) | Command::Textual(_) | Command::Alias(_) => {
                panic!("cannot add a tag to this type of command")
            }
        }
        self
    }

    /// Set the doc for this built-in command.
    pub fn with_doc(mut self, doc: &'static str) -> BuiltIn<S> {
        self.doc = Some(doc);
        self
    }

    pub fn cmd(&self) -> &Command<S> {
        &self.cmd
    }

    pub fn doc(&self) -> Option<&'static str> {
        self.doc
    }
}

impl<S> Clone for BuiltIn<S> {
    fn clone(&self) -> Self {
        Self {
            cmd: self.cmd.clone(),
            doc: self.doc,
        }
    }
}

impl<S> From<Command<S>> for BuiltIn<S> {
    fn from(cmd: Command<S>) -> Self {
        BuiltIn { cmd, doc: None }
    }
}

/// A tag is a piece of metadata optionally attached to a command.
///
/// Tags let one command recognize another command read out of the input
/// stream. The usual example is a prefix command such as `\global`, which
/// reads the following token and must decide whether the command it names is
/// allowed to be prefixed. The function pointer inside the command cannot be
/// compared usefully; the tag can.
///
/// Tags are non-zero 32 bit integers handed out from a global counter, so
/// `Option<Tag>` takes up 4 bytes.
#[derive(PartialEq, Eq, Clone, Copy, Debug, PartialOrd, Ord, Hash)]
pub struct Tag(num::NonZeroU32);

static NEXT_TAG_VALUE: sync::Mutex<u32> = sync::Mutex::new(1);

impl Tag {
    /// Creates a new unique tag.
    ///
    /// ```
    /// # use lexlang::command::Tag;
    /// let tag_1 = Tag::new();
    /// let tag_2 = Tag::new();
    /// assert_ne!(tag_1, tag_2);
    /// ```
    // Creating a new tag is a global operation and shouldn't happen without
    // explicit intention, hence no Default implementation.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Tag {
        let mut n = NEXT_TAG_VALUE.lock().unwrap();
        let tag = Tag(num::NonZeroU32::new(*n).unwrap());
        *n = n.checked_add(1).unwrap();
        tag
    }
}

/// A static tag enables creating a tag in a static variable.
///
/// ```
/// # use lexlang::command::StaticTag;
/// static TAG: StaticTag = StaticTag::new();
///
/// let first_get = TAG.get();
/// let second_get = TAG.get();
/// assert_eq!(first_get, second_get);
/// ```
pub struct StaticTag(std::sync::OnceLock<Tag>);

impl Default for StaticTag {
    fn default() -> Self {
        StaticTag::new()
    }
}

impl StaticTag {
    /// Create a new static tag.
    pub const fn new() -> StaticTag {
        StaticTag(std::sync::OnceLock::new())
    }

    /// Get the actual [Tag] out of this [StaticTag].
    ///
    /// Repeated calls return the same tag; the tag is lazily constructed on
    /// the first call.
    pub fn get(&self) -> Tag {
        *self.0.get_or_init(Tag::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static STATIC_TAG_1: StaticTag = StaticTag::new();
    static STATIC_TAG_2: StaticTag = StaticTag::new();

    #[test]
    fn tag() {
        let tag_1_val_1 = STATIC_TAG_1.get();
        let tag_2_val_1 = STATIC_TAG_2.get();
        let other_tag_1 = Tag::new();
        let tag_1_val_2 = STATIC_TAG_1.get();
        let tag_2_val_2 = STATIC_TAG_2.get();
        let other_tag_2 = Tag::new();

        assert_eq!(tag_1_val_1, tag_1_val_2);
        assert_eq!(tag_2_val_1, tag_2_val_2);

        assert_ne!(tag_1_val_1, tag_2_val_2);
        assert_ne!(tag_1_val_1, other_tag_1);
        assert_ne!(tag_1_val_1, other_tag_2);
    }

    #[test]
    fn tag_size() {
        assert_eq!(std::mem::size_of::<Option<Tag>>(), 4);
    }

    #[test]
    fn clone_is_independent() {
        let original: Command<()> = Command::Textual("hello".into());
        let copied = original.clone();
        match (original, copied) {
            (Command::Textual(a), Command::Textual(b)) => assert_eq!(a, b),
            _ => panic!("expected textual commands"),
        }
    }
}
