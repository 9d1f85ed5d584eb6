//! The Lexlang lexer, which reads an input stream of characters and produces tokens.
//!
//! The lexer is the upstream token source of the interpreter and is "just in
//! time": it only produces the next token when that token is requested. It is
//! in general incorrect to tokenize input as a batch, because tokenization is
//! controlled by category codes which can change at runtime based on commands
//! the lexer has already produced.

use crate::token;
use crate::token::CatCode;
use crate::token::CsNameInterner;
use crate::token::Token;

#[derive(Debug)]
pub(crate) enum Error {
    InvalidCharacter(char),
    EmptyControlSequence,
}

/// Trait through which the lexer obtains category codes.
///
/// The interpreter state implements this trait, so category codes can be
/// changed while the input is being read.
pub trait CatCodeFn {
    fn cat_code(&self, c: char) -> CatCode;
}

impl CatCodeFn for std::collections::HashMap<char, CatCode> {
    fn cat_code(&self, c: char) -> CatCode {
        self.get(&c).copied().unwrap_or_default()
    }
}

/// The Lexlang lexer.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lexer {
    source_code: String,
    pos: usize,
    trim_next_whitespace: bool,
    // Control sequence names are read into a shared buffer to avoid allocating
    // for each one.
    #[cfg_attr(feature = "serde", serde(skip))]
    buffer: String,
}

impl Lexer {
    pub fn new(source_code: String) -> Lexer {
        Lexer {
            source_code,
            pos: 0,
            trim_next_whitespace: false,
            buffer: Default::default(),
        }
    }

    pub(crate) fn next<F: CatCodeFn>(
        &mut self,
        cat_code_fn: &F,
        cs_name_interner: &mut CsNameInterner,
    ) -> Result<Option<Token>, Error> {
        while let Some(c) = self.pop_char() {
            let token = match cat_code_fn.cat_code(c) {
                CatCode::Escape => {
                    let name = self.read_control_sequence(cat_code_fn)?;
                    Token::new_control_sequence(cs_name_interner.get_or_intern(name))
                }
                CatCode::Space => {
                    self.consume_whitespace(cat_code_fn);
                    if self.trim_next_whitespace {
                        continue;
                    }
                    Token::new_space(' ')
                }
                CatCode::BeginGroup => Token::new_begin_group(c),
                CatCode::EndGroup => Token::new_end_group(c),
                CatCode::Parameter => Token::new_parameter(c),
                CatCode::Letter => Token::new_letter(c),
                CatCode::Other => Token::new_other(c),
                CatCode::Comment => {
                    while let Some(c) = self.peek_char() {
                        self.pop_char();
                        if c == '\n' {
                            break;
                        }
                    }
                    self.trim_next_whitespace = true;
                    continue;
                }
                CatCode::Ignored => {
                    continue;
                }
                CatCode::Invalid => return Err(Error::InvalidCharacter(c)),
            };
            self.trim_next_whitespace = matches!(token.value(), token::Value::ControlSequence(..));
            return Ok(Some(token));
        }
        Ok(None)
    }

    fn pop_char(&mut self) -> Option<char> {
        let c = self.source_code[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn peek_char(&self) -> Option<char> {
        self.source_code[self.pos..].chars().next()
    }

    fn consume_whitespace<F: CatCodeFn>(&mut self, cat_code_fn: &F) {
        while let Some(c) = self.peek_char() {
            if cat_code_fn.cat_code(c) != CatCode::Space {
                break;
            }
            self.pop_char();
        }
    }

    /// Read a control sequence name, assuming the escape character has already
    /// been consumed.
    ///
    /// A control word is a run of letter characters; any other single
    /// character forms a control symbol of its own.
    fn read_control_sequence<F: CatCodeFn>(&mut self, cat_code_fn: &F) -> Result<&str, Error> {
        self.buffer.clear();
        let first = match self.pop_char() {
            None => return Err(Error::EmptyControlSequence),
            Some(first) => first,
        };
        self.buffer.push(first);
        if cat_code_fn.cat_code(first) == CatCode::Letter {
            while let Some(c) = self.peek_char() {
                if cat_code_fn.cat_code(c) != CatCode::Letter {
                    break;
                }
                self.pop_char();
                self.buffer.push(c);
            }
        }
        Ok(&self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Value;

    struct DefaultCatCodes;

    impl CatCodeFn for DefaultCatCodes {
        fn cat_code(&self, c: char) -> CatCode {
            CatCode::default_for(c)
        }
    }

    fn tokenize(input: &str) -> (Vec<Token>, CsNameInterner) {
        let mut lexer = Lexer::new(input.to_string());
        let mut interner = CsNameInterner::default();
        let mut tokens = vec![];
        while let Some(token) = lexer.next(&DefaultCatCodes {}, &mut interner).unwrap() {
            tokens.push(token);
        }
        (tokens, interner)
    }

    macro_rules! lexer_test {
        ($name: ident, $input: expr, $want: expr) => {
            #[test]
            fn $name() {
                let (tokens, interner) = tokenize($input);
                let got: Vec<Value> = tokens.iter().map(Token::value).collect();
                let want: Vec<Value> = $want(&interner);
                assert_eq!(got, want);
            }
        };
    }

    fn cs(interner: &CsNameInterner, name: &str) -> Value {
        Value::ControlSequence(interner.get(name).unwrap())
    }

    lexer_test![
        characters,
        "a{1}",
        |_: &CsNameInterner| vec![
            Value::Letter('a'),
            Value::BeginGroup('{'),
            Value::Other('1'),
            Value::EndGroup('}'),
        ]
    ];

    lexer_test![
        control_word_trims_following_whitespace,
        r"\gls  x",
        |i: &CsNameInterner| vec![cs(i, "gls"), Value::Letter('x')]
    ];

    lexer_test![
        control_symbol_trims_following_whitespace,
        r"\% x",
        |i: &CsNameInterner| vec![cs(i, "%"), Value::Letter('x')]
    ];

    lexer_test![
        whitespace_run_collapses_to_one_space,
        "a \t \n b",
        |_: &CsNameInterner| vec![Value::Letter('a'), Value::Space(' '), Value::Letter('b')]
    ];

    lexer_test![
        comment_runs_to_end_of_line,
        "a% ignored {\nb",
        |_: &CsNameInterner| vec![Value::Letter('a'), Value::Letter('b')]
    ];

    #[test]
    fn empty_control_sequence_errors() {
        let mut lexer = Lexer::new(r"\".to_string());
        let mut interner = CsNameInterner::default();
        assert!(lexer.next(&DefaultCatCodes {}, &mut interner).is_err());
    }

    #[test]
    fn invalid_character_errors() {
        let mut lexer = Lexer::new("\u{7F}".to_string());
        let mut interner = CsNameInterner::default();
        assert!(lexer.next(&DefaultCatCodes {}, &mut interner).is_err());
    }
}
