//! Lexlang tokens and category codes.

mod catcode;
pub mod lexer;
pub use catcode::CatCode;
use lexicraft_stdext::collections::interner;
use std::fmt::Display;
use std::num;

/// String type used to represent control sequence names in Lexlang.
///
/// The implementation of this type is opaque so that it can be performance
/// optimized without worrying about downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CsName(num::NonZeroU32);

impl CsName {
    #[inline]
    pub fn to_usize(&self) -> usize {
        self.0.get() as usize
    }

    pub fn try_from_usize(u: usize) -> Option<CsName> {
        let u = match u32::try_from(u) {
            Ok(u) => u,
            Err(_) => return None,
        };
        num::NonZeroU32::new(u).map(CsName)
    }
}

/// String interner for control sequence names.
pub type CsNameInterner = interner::Interner<CsName>;

impl interner::Key for CsName {
    fn try_from_usize(index: usize) -> Option<Self> {
        num::NonZeroU32::try_from_usize(index).map(CsName)
    }

    fn into_usize(self) -> usize {
        self.0.into_usize()
    }
}

/// The value of a token.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    BeginGroup(char),
    EndGroup(char),
    Parameter(char),
    Space(char),
    Letter(char),
    Other(char),
    ControlSequence(CsName),
}

impl Value {
    pub fn new(c: char, cat_code: CatCode) -> Value {
        match cat_code {
            CatCode::BeginGroup => Value::BeginGroup(c),
            CatCode::EndGroup => Value::EndGroup(c),
            CatCode::Parameter => Value::Parameter(c),
            CatCode::Space => Value::Space(c),
            CatCode::Letter => Value::Letter(c),
            CatCode::Other => Value::Other(c),
            _ => panic!("cat code {cat_code} cannot be carried by a token"),
        }
    }
}

/// A Lexlang token.
///
/// Tokens are immutable `Copy` values; reusing a token across expansions
/// copies it, so expansions can never alias each other.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    value: Value,
}

macro_rules! token_constructor {
    ($name: ident, $value: expr) => {
        pub fn $name(c: char) -> Token {
            Token { value: $value(c) }
        }
    };
}

impl Token {
    token_constructor!(new_begin_group, Value::BeginGroup);
    token_constructor!(new_end_group, Value::EndGroup);
    token_constructor!(new_parameter, Value::Parameter);
    token_constructor!(new_space, Value::Space);
    token_constructor!(new_letter, Value::Letter);
    token_constructor!(new_other, Value::Other);

    pub fn new_control_sequence(name: CsName) -> Token {
        Token {
            value: Value::ControlSequence(name),
        }
    }

    pub fn new_from_value(value: Value) -> Token {
        Token { value }
    }

    /// Build a token for a plain character: space, letter or other.
    pub fn new_character(c: char) -> Token {
        match c {
            ' ' | '\t' | '\n' | '\r' => Token::new_space(c),
            _ if c.is_alphabetic() => Token::new_letter(c),
            _ => Token::new_other(c),
        }
    }

    #[inline]
    pub fn value(&self) -> Value {
        self.value
    }

    /// The character this token carries, or [None] for a control sequence.
    pub fn char(&self) -> Option<char> {
        match self.value {
            Value::BeginGroup(c)
            | Value::EndGroup(c)
            | Value::Parameter(c)
            | Value::Space(c)
            | Value::Letter(c)
            | Value::Other(c) => Some(c),
            Value::ControlSequence(_) => None,
        }
    }

    pub fn cat_code(&self) -> Option<CatCode> {
        match self.value {
            Value::BeginGroup(_) => Some(CatCode::BeginGroup),
            Value::EndGroup(_) => Some(CatCode::EndGroup),
            Value::Parameter(_) => Some(CatCode::Parameter),
            Value::Space(_) => Some(CatCode::Space),
            Value::Letter(_) => Some(CatCode::Letter),
            Value::Other(_) => Some(CatCode::Other),
            Value::ControlSequence(_) => None,
        }
    }
}

enum PendingWhitespace {
    NotStarted,
    None,
    Space,
    Newlines(usize),
}

impl PendingWhitespace {
    fn start(&mut self) {
        *self = PendingWhitespace::None;
    }

    fn add_space(&mut self) {
        *self = match self {
            PendingWhitespace::NotStarted => PendingWhitespace::NotStarted,
            PendingWhitespace::None => PendingWhitespace::Space,
            PendingWhitespace::Space => PendingWhitespace::Space,
            PendingWhitespace::Newlines(n) => PendingWhitespace::Newlines(*n),
        }
    }

    fn add_newline(&mut self) {
        *self = match self {
            PendingWhitespace::NotStarted => PendingWhitespace::NotStarted,
            PendingWhitespace::None => PendingWhitespace::Newlines(1),
            PendingWhitespace::Space => PendingWhitespace::Newlines(1),
            PendingWhitespace::Newlines(n) => PendingWhitespace::Newlines(*n + 1),
        }
    }
}

impl Display for PendingWhitespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingWhitespace::NotStarted | PendingWhitespace::None => Ok(()),
            PendingWhitespace::Space => {
                write!(f, " ")
            }
            PendingWhitespace::Newlines(n) => {
                for _ in 0..*n {
                    writeln!(f)?;
                }
                Ok(())
            }
        }
    }
}

/// Data structure for writing tokens.
///
/// Whitespace is buffered so that leading and trailing whitespace is trimmed
/// and internal runs are collapsed.
pub struct Writer<I> {
    io_writer: I,
    pending_whitespace: PendingWhitespace,
}

impl<I: Default> Default for Writer<I> {
    fn default() -> Self {
        Self {
            io_writer: Default::default(),
            pending_whitespace: PendingWhitespace::NotStarted,
        }
    }
}

impl<I> Writer<I> {
    /// Create a new writer that writes output to the provided IO writer.
    pub fn new(io_writer: I) -> Self {
        Self {
            io_writer,
            pending_whitespace: PendingWhitespace::NotStarted,
        }
    }

    pub fn take_io_writer(self) -> I {
        self.io_writer
    }
}

impl<I: std::io::Write> Writer<I> {
    /// Write a token.
    pub fn write(&mut self, interner: &CsNameInterner, token: Token) -> Result<(), std::io::Error> {
        match &token.value {
            Value::ControlSequence(s) => {
                let name = interner.resolve(*s).unwrap_or("invalidCsName");
                write!(self.io_writer, "{}\\{}", self.pending_whitespace, name)?;
                self.pending_whitespace.start();
            }
            Value::Space('\n') => self.pending_whitespace.add_newline(),
            Value::Space(_) => self.pending_whitespace.add_space(),
            _ => {
                write!(
                    self.io_writer,
                    "{}{}",
                    self.pending_whitespace,
                    token.char().unwrap()
                )?;
                self.pending_whitespace.start();
            }
        }
        self.io_writer.flush()
    }
}

/// Write a collection of tokens to a string.
pub fn write_tokens<'a, T>(tokens: T, interner: &CsNameInterner) -> String
where
    T: IntoIterator<Item = &'a Token>,
{
    let mut writer: Writer<Vec<u8>> = Default::default();
    for token in tokens.into_iter() {
        writer.write(interner, *token).unwrap();
    }
    let buffer = writer.take_io_writer();
    std::str::from_utf8(&buffer).unwrap().into()
}
