use std::fmt;

/// The category code of an input character.
///
/// Category codes drive the lexer: they determine whether a character starts a
/// control sequence, opens or closes a group, introduces a macro parameter,
/// and so on. The set here is the subset of the classic TeX codes that the
/// Lexlang language actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CatCode {
    /// Starts a control sequence (`\` by default).
    Escape,
    /// Opens a group (`{` by default).
    BeginGroup,
    /// Closes a group (`}` by default).
    EndGroup,
    /// Introduces a macro parameter (`#` by default).
    Parameter,
    /// Whitespace.
    Space,
    /// A letter; letters form the names of control words.
    Letter,
    /// Any other visible character.
    #[default]
    Other,
    /// Starts a comment that runs to the end of the line (`%` by default).
    Comment,
    /// Silently dropped by the lexer.
    Ignored,
    /// Reported as an error by the lexer.
    Invalid,
}

impl CatCode {
    /// The default category code assignment.
    pub fn default_for(c: char) -> CatCode {
        match c {
            '\\' => CatCode::Escape,
            '{' => CatCode::BeginGroup,
            '}' => CatCode::EndGroup,
            '#' => CatCode::Parameter,
            ' ' | '\t' | '\n' | '\r' => CatCode::Space,
            '%' => CatCode::Comment,
            '\u{0}' => CatCode::Ignored,
            '\u{7F}' => CatCode::Invalid,
            _ if c.is_alphabetic() => CatCode::Letter,
            _ => CatCode::Other,
        }
    }
}

impl fmt::Display for CatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatCode::Escape => "escape",
            CatCode::BeginGroup => "begin group",
            CatCode::EndGroup => "end group",
            CatCode::Parameter => "parameter",
            CatCode::Space => "space",
            CatCode::Letter => "letter",
            CatCode::Other => "other",
            CatCode::Comment => "comment",
            CatCode::Ignored => "ignored",
            CatCode::Invalid => "invalid",
        };
        write![f, "{name}"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_assignment() {
        assert_eq!(CatCode::default_for('\\'), CatCode::Escape);
        assert_eq!(CatCode::default_for('{'), CatCode::BeginGroup);
        assert_eq!(CatCode::default_for('}'), CatCode::EndGroup);
        assert_eq!(CatCode::default_for('#'), CatCode::Parameter);
        assert_eq!(CatCode::default_for(' '), CatCode::Space);
        assert_eq!(CatCode::default_for('q'), CatCode::Letter);
        assert_eq!(CatCode::default_for('Ä'), CatCode::Letter);
        assert_eq!(CatCode::default_for('3'), CatCode::Other);
        assert_eq!(CatCode::default_for('['), CatCode::Other);
        assert_eq!(CatCode::default_for('%'), CatCode::Comment);
        assert_eq!(CatCode::default_for('\u{7F}'), CatCode::Invalid);
    }
}
