//! Logic for parsing elements of the Lexlang grammar from token streams.
//!
//! The grammar elements here are the argument shapes shared by many
//! commands: a command target (the control sequence being defined or
//! aliased), a label (the key naming a glossary entry or type), a balanced
//! braced group, and key–value lists in both mandatory braced and optional
//! bracketed forms.
//!
//! The general error contract: a *mandatory* argument that is missing or
//! malformed fails with a missing-argument error, while an *optional*
//! argument that is absent parses successfully as its empty value without
//! consuming anything.

#[macro_use]
mod helpers;

use crate::diagnostics;
use crate::error;
use crate::prelude as lxl;
use crate::token;
use crate::token::Token;
use crate::token::Value;
use crate::vm;
use crate::vm::LexlangState;
use crate::vm::TokenStream;

/// Skip space tokens at the front of the stream.
pub fn parse_spaces<S: TokenStream>(stream: &mut S) -> lxl::Result<()> {
    while get_optional_element![
        stream,
        Value::Space(_) => (),
    ]
    .is_some()
    {}
    Ok(())
}

/// Parses the target of a definition command: the control sequence being
/// defined, aliased or assigned.
pub fn parse_command_target<S: LexlangState>(
    doing: &'static str,
    stream: &mut vm::UnexpandedStream<S>,
) -> lxl::Result<token::CsName> {
    parse_spaces(stream)?;
    get_required_element![
        stream,
        doing,
        Value::ControlSequence(name) => name,
    ]
}

/// Parses an optional equals sign, consuming surrounding spaces.
pub fn parse_optional_equals<S: TokenStream>(stream: &mut S) -> lxl::Result<()> {
    parse_spaces(stream)?;
    if get_optional_element![
        stream,
        Value::Other('=') => (),
    ]
    .is_some()
    {
        parse_spaces(stream)?;
    }
    Ok(())
}

/// Parses balanced tokens from the stream, assuming the opening brace has
/// already been consumed.
///
/// The tokens up to, but not including, the matching closing brace are
/// appended to `result`. Fails if the input ends before the group is closed.
pub fn finish_parsing_balanced_tokens<S: TokenStream>(
    stream: &mut S,
    result: &mut Vec<Token>,
) -> lxl::Result<()> {
    let mut scope_depth = 0;
    loop {
        let token = stream.next_or_err("reading a balanced group")?;
        match token.value() {
            Value::BeginGroup(_) => {
                scope_depth += 1;
            }
            Value::EndGroup(_) => {
                if scope_depth == 0 {
                    return Ok(());
                }
                scope_depth -= 1;
            }
            _ => (),
        }
        result.push(token);
    }
}

/// Parses a mandatory braced balanced group.
///
/// Leading spaces are skipped; the next token must open a group. The group's
/// tokens, without the outer braces, are appended to `result`.
pub fn parse_balanced_group<S: TokenStream>(
    doing: &'static str,
    stream: &mut S,
    result: &mut Vec<Token>,
) -> lxl::Result<()> {
    parse_spaces(stream)?;
    get_required_element![
        stream,
        doing,
        Value::BeginGroup(_) => (),
    ]?;
    finish_parsing_balanced_tokens(stream, result)
}

/// Parses a single undelimited argument: one token, or a braced balanced
/// group without its outer braces.
///
/// Leading spaces are skipped. A closing brace in argument position is a
/// grouping error; exhausted input is an end-of-input error.
pub fn parse_undelimited_argument<S: LexlangState>(
    doing: &'static str,
    stream: &mut vm::UnexpandedStream<S>,
    result: &mut Vec<Token>,
) -> lxl::Result<()> {
    loop {
        let token = stream.next_or_err(doing)?;
        match token.value() {
            Value::Space(_) => continue,
            Value::BeginGroup(_) => {
                return finish_parsing_balanced_tokens(stream, result);
            }
            Value::EndGroup(_) => {
                return Err(error::Error::unbalanced_group()
                    .with_note("a closing brace appeared where an argument was expected"));
            }
            _ => {
                result.push(token);
                return Ok(());
            }
        }
    }
}

/// Parses a mandatory label argument and returns it as a string.
///
/// A label is either a braced group or a bare run of letter and other
/// characters. Labels are read with expansion, so a macro that expands to a
/// label can be used wherever a label is expected. Fails with a
/// missing-argument error if the stream is exhausted or the next token
/// cannot start a label.
pub fn parse_label<S: LexlangState>(
    doing: &'static str,
    stream: &mut vm::ExpandedStream<S>,
) -> lxl::Result<String> {
    parse_spaces(stream)?;
    let mut label = String::new();
    let braced = get_required_element![
        stream,
        doing,
        Value::BeginGroup(_) => true,
        Value::Letter(c) => {
            label.push(c);
            false
        },
        Value::Other(c) => {
            label.push(c);
            false
        },
    ]?;
    if braced {
        loop {
            let token = stream.next_or_err(doing)?;
            match token.value() {
                Value::EndGroup(_) => break,
                Value::Letter(c) | Value::Other(c) => label.push(c),
                // Spaces inside a braced label are not significant.
                Value::Space(_) => (),
                _ => return Err(error::Error::missing_argument(doing)),
            }
        }
        if label.is_empty() {
            return Err(error::Error::missing_argument(doing));
        }
    } else {
        while let Some(c) = get_optional_element![
            stream,
            Value::Letter(c) => c,
            Value::Other(c) => c,
        ] {
            label.push(c);
        }
    }
    Ok(label)
}

/// An ordered list of key–value pairs.
///
/// Keys without a value (`{draft,name=x}` has the flag key `draft`) are
/// recorded with no value. Insertion order is preserved; a key assigned
/// twice keeps both assignments, and lookups return the last one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KeyValList {
    entries: Vec<(String, Option<Vec<Token>>)>,
}

impl KeyValList {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the key is present, with or without a value.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// The value of the key, or [None] if the key is absent or is a flag.
    pub fn value(&self, key: &str) -> Option<&[Token]> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&[Token]>)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

/// Parses a mandatory braced key–value list, e.g.
/// `{name=mouse, plural=mice, seeonce}`.
///
/// Keys are runs of letter and other characters; surrounding spaces are
/// trimmed. Values run to the next comma; braced groups protect commas and
/// equals signs inside a value, and a value consisting of exactly one braced
/// group loses the outer braces. Values are read without expansion.
pub fn parse_keyval_group<S: LexlangState>(
    doing: &'static str,
    stream: &mut vm::UnexpandedStream<S>,
) -> lxl::Result<KeyValList> {
    parse_spaces(stream)?;
    get_required_element![
        stream,
        doing,
        Value::BeginGroup(_) => (),
    ]?;
    parse_keyval_body(stream, doing, Terminator::EndGroup)
}

/// Parses an optional bracketed key–value list, e.g. `[format=bold]`.
///
/// If the next non-space token is not an opening bracket, nothing is
/// consumed and the empty list is returned. A malformed bracketed list,
/// whether never closed or interrupted by a stray closing brace, is
/// reported through the diagnostics sink, once, and likewise yields the
/// empty list.
pub fn parse_optional_keyval<S: LexlangState>(
    stream: &mut vm::UnexpandedStream<S>,
) -> lxl::Result<KeyValList> {
    let mut skipped_spaces: Vec<Token> = vec![];
    loop {
        let token = match stream.next()? {
            None => {
                restore_skipped(stream, skipped_spaces);
                return Ok(KeyValList::default());
            }
            Some(token) => token,
        };
        match token.value() {
            Value::Space(_) => skipped_spaces.push(token),
            Value::Other('[') => break,
            _ => {
                stream.back(token);
                restore_skipped(stream, skipped_spaces);
                return Ok(KeyValList::default());
            }
        }
    }
    match parse_keyval_body(stream, "reading an optional argument", Terminator::CloseBracket) {
        Ok(list) => Ok(list),
        Err(err)
            if matches!(
                err.kind(),
                error::Kind::EndOfInput | error::Kind::UnbalancedOptionalArg
            ) =>
        {
            stream.report(diagnostics::Diagnostic::warning(
                "argument.optional.unbalanced",
            ));
            Ok(KeyValList::default())
        }
        Err(err) => Err(err),
    }
}

fn restore_skipped<S: LexlangState>(stream: &mut vm::UnexpandedStream<S>, skipped: Vec<Token>) {
    for token in skipped.into_iter().rev() {
        stream.back(token);
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Terminator {
    EndGroup,
    CloseBracket,
}

fn parse_keyval_body<S: LexlangState>(
    stream: &mut vm::UnexpandedStream<S>,
    doing: &'static str,
    terminator: Terminator,
) -> lxl::Result<KeyValList> {
    let mut list = KeyValList::default();
    'entries: loop {
        parse_spaces(stream)?;
        // Read the key; the loop exits into the value reader below when an
        // equals sign is found, and otherwise finishes the entry itself.
        let mut key = String::new();
        loop {
            let token = stream.next_or_err(doing)?;
            match (token.value(), terminator) {
                (Value::EndGroup(_), Terminator::EndGroup)
                | (Value::Other(']'), Terminator::CloseBracket) => {
                    if !key.is_empty() {
                        list.entries.push((key, None));
                    }
                    break 'entries;
                }
                (Value::EndGroup(_), Terminator::CloseBracket) => {
                    // The brace is left for the enclosing context; only the
                    // bracketed list is malformed.
                    stream.back(token);
                    return Err(error::Error::unbalanced_optional_arg());
                }
                (Value::Other(','), _) => {
                    if !key.is_empty() {
                        list.entries.push((key, None));
                    }
                    continue 'entries;
                }
                (Value::Other('='), _) => break,
                (Value::Letter(c), _) | (Value::Other(c), _) => key.push(c),
                // Trailing spaces inside a key are trimmed; internal ones are
                // not meaningful for the labels used as keys.
                (Value::Space(_), _) => (),
                _ => return Err(error::Error::missing_argument(doing)),
            }
        }
        // Read the value: tokens up to a comma or the terminator, with
        // braced groups protecting both.
        parse_spaces(stream)?;
        let mut value: Vec<Token> = vec![];
        let mut scope_depth = 0usize;
        loop {
            let token = stream.next_or_err(doing)?;
            match (token.value(), terminator) {
                (Value::BeginGroup(_), _) => {
                    scope_depth += 1;
                    value.push(token);
                }
                (Value::EndGroup(_), Terminator::EndGroup) if scope_depth == 0 => {
                    push_entry(&mut list, key, value);
                    break 'entries;
                }
                (Value::Other(']'), Terminator::CloseBracket) if scope_depth == 0 => {
                    push_entry(&mut list, key, value);
                    break 'entries;
                }
                (Value::EndGroup(_), _) => {
                    if scope_depth == 0 {
                        stream.back(token);
                        return Err(error::Error::unbalanced_optional_arg());
                    }
                    scope_depth -= 1;
                    value.push(token);
                }
                (Value::Other(','), _) if scope_depth == 0 => {
                    push_entry(&mut list, key, value);
                    continue 'entries;
                }
                _ => value.push(token),
            }
        }
    }
    Ok(list)
}

fn push_entry(list: &mut KeyValList, key: String, mut value: Vec<Token>) {
    // Trim trailing spaces.
    while value
        .last()
        .is_some_and(|t| matches!(t.value(), Value::Space(_)))
    {
        value.pop();
    }
    // A value that is exactly one braced group loses the outer braces.
    let is_single_group = value.len() >= 2
        && matches!(value[0].value(), Value::BeginGroup(_))
        && matches!(value[value.len() - 1].value(), Value::EndGroup(_))
        && {
            let mut depth = 0;
            let mut single = true;
            for (i, token) in value.iter().enumerate() {
                match token.value() {
                    Value::BeginGroup(_) => depth += 1,
                    Value::EndGroup(_) => {
                        depth -= 1;
                        if depth == 0 && i != value.len() - 1 {
                            single = false;
                            break;
                        }
                    }
                    _ => (),
                }
            }
            single
        };
    if is_single_group {
        value.pop();
        value.remove(0);
    }
    list.entries.push((key, Some(value)));
}
