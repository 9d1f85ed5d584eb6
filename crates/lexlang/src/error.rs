//! Error handling.
//!
//! Errors in Lexlang are values of the [Error] type, which carries a [Kind]
//! describing what went wrong plus the offending name or label when there is
//! one. Errors are boxed on the fallible path so that the `Ok` branch of
//! results stays a single pointer wide.
//!
//! Two propagation disciplines exist. Structural errors
//! ([UnbalancedGroup](Kind::UnbalancedGroup), [EndOfInput](Kind::EndOfInput))
//! terminate the current processing unit and propagate out of the run loop.
//! Reference errors (an undefined command, a glossary label with no entry)
//! are usually recovered locally: the command substitutes a fallback and
//! reports a diagnostic through the [diagnostics](crate::diagnostics) sink
//! instead of returning an error. The [Kind] values for the recoverable
//! conditions exist for the places, such as registry APIs, where the caller
//! decides the severity.

use std::fmt;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    /// A group was closed with no group open.
    UnbalancedGroup,
    /// The input ended while a command was reading its arguments.
    EndOfInput,
    /// A mandatory argument is missing or malformed.
    MissingArgument,
    /// The lexer read a character with the invalid category code.
    InvalidCharacter,
    /// A control sequence has no binding.
    UndefinedCommand,
    /// An entry was defined under a label that is already taken.
    DuplicateEntry,
    /// A referenced glossary label has no matching entry.
    EntryNotDefined,
    /// A referenced glossary type has no matching glossary.
    GlossaryNotDefined,
    /// A bracketed optional argument was opened but never closed.
    UnbalancedOptionalArg,
}

impl Kind {
    fn describe(&self) -> &'static str {
        match self {
            Kind::UnbalancedGroup => "there is no group to end",
            Kind::EndOfInput => "unexpected end of input",
            Kind::MissingArgument => "missing argument",
            Kind::InvalidCharacter => "invalid character in the input",
            Kind::UndefinedCommand => "undefined control sequence",
            Kind::DuplicateEntry => "an entry with this label is already defined",
            Kind::EntryNotDefined => "no entry is defined with this label",
            Kind::GlossaryNotDefined => "no glossary is defined with this type name",
            Kind::UnbalancedOptionalArg => "unbalanced optional argument",
        }
    }
}

/// A Lexlang error.
#[derive(Debug)]
pub struct Error {
    kind: Kind,
    /// The offending command name or glossary label, if there is one.
    name: Option<String>,
    /// What the interpreter was doing when the error occurred.
    doing: Option<String>,
    notes: Vec<String>,
}

impl Error {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The offending command name or glossary label.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    fn new(kind: Kind) -> Box<Error> {
        Box::new(Error {
            kind,
            name: None,
            doing: None,
            notes: vec![],
        })
    }

    pub fn with_note<T: Into<String>>(mut self: Box<Self>, note: T) -> Box<Self> {
        self.notes.push(note.into());
        self
    }

    /// Error for ending a group when no group is open.
    pub fn unbalanced_group() -> Box<Error> {
        Error::new(Kind::UnbalancedGroup)
    }

    /// Error for input that ended while doing the described work.
    pub fn end_of_input<T: Into<String>>(doing: T) -> Box<Error> {
        let mut err = Error::new(Kind::EndOfInput);
        err.doing = Some(doing.into());
        err
    }

    /// Error for a missing or malformed mandatory argument.
    pub fn missing_argument<T: Into<String>>(doing: T) -> Box<Error> {
        let mut err = Error::new(Kind::MissingArgument);
        err.doing = Some(doing.into());
        err
    }

    pub fn invalid_character(c: char) -> Box<Error> {
        let mut err = Error::new(Kind::InvalidCharacter);
        err.name = Some(c.to_string());
        err
    }

    /// Error for a control sequence with no binding.
    ///
    /// The optional suggestion is a defined name spelled similarly to the
    /// undefined one; it is attached as a note.
    pub fn undefined_command<T: Into<String>>(name: T, suggestion: Option<String>) -> Box<Error> {
        let mut err = Error::new(Kind::UndefinedCommand);
        err.name = Some(name.into());
        if let Some(suggestion) = suggestion {
            err.notes.push(format!["did you mean \\{suggestion}?"]);
        }
        err
    }

    pub fn duplicate_entry<T: Into<String>>(label: T) -> Box<Error> {
        let mut err = Error::new(Kind::DuplicateEntry);
        err.name = Some(label.into());
        err
    }

    pub fn entry_not_defined<T: Into<String>>(label: T) -> Box<Error> {
        let mut err = Error::new(Kind::EntryNotDefined);
        err.name = Some(label.into());
        err
    }

    pub fn glossary_not_defined<T: Into<String>>(type_name: T) -> Box<Error> {
        let mut err = Error::new(Kind::GlossaryNotDefined);
        err.name = Some(type_name.into());
        err
    }

    pub fn unbalanced_optional_arg() -> Box<Error> {
        Error::new(Kind::UnbalancedOptionalArg)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write![f, "{}", self.kind.describe()]?;
        if let Some(name) = &self.name {
            write![f, ": {name}"]?;
        }
        if let Some(doing) = &self.doing {
            write![f, " while {doing}"]?;
        }
        for note in &self.notes {
            write![f, "\nnote: {note}"]?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offending_name() {
        let err = Error::undefined_command("glx", Some("gls".into()));
        let message = err.to_string();
        assert!(message.contains("glx"), "{message}");
        assert!(message.contains("did you mean \\gls?"), "{message}");
    }

    #[test]
    fn display_includes_doing_context() {
        let err = Error::end_of_input("reading a balanced group");
        let message = err.to_string();
        assert!(message.contains("reading a balanced group"), "{message}");
    }

    #[test]
    fn kinds_are_preserved() {
        assert_eq!(Error::unbalanced_group().kind(), Kind::UnbalancedGroup);
        assert_eq!(Error::duplicate_entry("svm").kind(), Kind::DuplicateEntry);
        assert_eq!(
            Error::duplicate_entry("svm").name(),
            Some("svm"),
        );
    }
}
