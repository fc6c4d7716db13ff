//! Lexical tokens.

use std::fmt;

use crate::error::LexErrorKind;
use crate::span::FileSpan;
use crate::string::MotString;

/// Token type in the lexer output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Invalid input; the token carries a [`LexErrorKind`].
    Error,

    // whitespace/control
    StartOfInput,
    EndOfInput,
    EndOfLine,
    /// Zero-width marker: the line is one level (four spaces) deeper.
    Indent,
    /// Zero-width marker: one level closed.
    Outdent,

    // text
    Word,
    LineText,
    QuotedText,
    BlockText,

    // symbols
    Colon,
    GreaterThan,
}

impl TokenType {
    pub fn name(self) -> &'static str {
        match self {
            TokenType::Error => "Error",
            TokenType::StartOfInput => "StartOfInput",
            TokenType::EndOfInput => "EndOfInput",
            TokenType::EndOfLine => "EndOfLine",
            TokenType::Indent => "Indent",
            TokenType::Outdent => "Outdent",
            TokenType::Word => "Word",
            TokenType::LineText => "LineText",
            TokenType::QuotedText => "QuotedText",
            TokenType::BlockText => "BlockText",
            TokenType::Colon => "Colon",
            TokenType::GreaterThan => "GreaterThan",
        }
    }

    /// Whether tokens of this type carry a decoded string value.
    pub fn has_value(self) -> bool {
        matches!(
            self,
            TokenType::Word | TokenType::LineText | TokenType::QuotedText | TokenType::BlockText
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single token. `trivia` is the skipped whitespace and comments which
/// immediately precede `text`.
#[derive(Clone)]
pub struct Token<'c> {
    token_type: TokenType,
    trivia: FileSpan<'c>,
    text: FileSpan<'c>,
    value: Option<MotString>,
    error: Option<LexErrorKind>,
}

impl<'c> Token<'c> {
    /// Creates a token. `value` must be present exactly for the text-bearing types.
    pub(crate) fn new(
        token_type: TokenType,
        trivia: FileSpan<'c>,
        text: FileSpan<'c>,
        value: Option<MotString>,
    ) -> Self {
        debug_assert_eq!(trivia.end(), text.start());
        debug_assert_ne!(token_type, TokenType::Error);
        debug_assert_eq!(
            value.is_some(),
            token_type.has_value(),
            "token type `{}` created with the wrong value presence",
            token_type
        );

        Self {
            token_type,
            trivia,
            text,
            value,
            error: None,
        }
    }

    pub(crate) fn error(kind: LexErrorKind, trivia: FileSpan<'c>, text: FileSpan<'c>) -> Self {
        debug_assert_eq!(trivia.end(), text.start());
        Self {
            token_type: TokenType::Error,
            trivia,
            text,
            value: None,
            error: Some(kind),
        }
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn trivia(&self) -> FileSpan<'c> {
        self.trivia
    }

    pub fn text(&self) -> FileSpan<'c> {
        self.text
    }

    /// The decoded value: escapes resolved for quoted text, padding removed
    /// for block text.
    pub fn value(&self) -> Option<&MotString> {
        self.value.as_ref()
    }

    pub fn error_kind(&self) -> Option<LexErrorKind> {
        self.error
    }

    pub fn is_error(&self) -> bool {
        self.token_type == TokenType::Error
    }
}

impl PartialEq for Token<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.token_type == other.token_type
            && self.trivia == other.trivia
            && self.text == other.text
            && self.error == other.error
            && match (&self.value, &other.value) {
                (Some(a), Some(b)) => MotString::are_equal(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Token");
        s.field("type", &self.token_type)
            .field("trivia", &self.trivia)
            .field("text", &self.text);
        if let Some(value) = &self.value {
            s.field("value", value);
        }
        if let Some(error) = &self.error {
            s.field("error", error);
        }
        s.finish()
    }
}

/// Debug rendering used by the token dump: `Type line:column value`.
impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details = self.text.position_details();
        write!(
            f,
            "{} {}:{}",
            self.token_type,
            details.line_number + 1,
            details.column + 1
        )?;

        match (&self.value, self.error) {
            (Some(value), _) if self.token_type == TokenType::BlockText => write!(f, "\n{}", value),
            (Some(value), _) => write!(f, " {:?}", value.to_str_lossy()),
            (None, Some(kind)) => write!(f, " {}", kind),
            (None, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FileContent;

    #[test]
    fn test_value_presence_by_type() {
        assert!(TokenType::Word.has_value());
        assert!(TokenType::BlockText.has_value());
        assert!(!TokenType::Colon.has_value());
        assert!(!TokenType::Error.has_value());
    }

    #[test]
    fn test_display() {
        let content = FileContent::new("test.mot", b"REPO main\n".to_vec());
        content.mark_line(0);
        let token = Token::new(
            TokenType::Word,
            FileSpan::new(&content, 4, 5),
            FileSpan::new(&content, 5, 9),
            Some(MotString::from_static("main")),
        );
        assert_eq!(token.to_string(), "Word 1:6 \"main\"");
    }
}
