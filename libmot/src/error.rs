//! Error types for MOT loading, lexing and parsing.

use std::io;

use thiserror::Error;

use crate::content::Location;
use crate::token::{Token, TokenType};

/// Result type for MOT parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// The reason the lexer produced an `Error` token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexErrorKind {
    /// A tab appeared in the leading whitespace of a line.
    #[error("Tab character used for indentation. Four spaces must be used for indentation.")]
    TabIndentation,

    /// Leading spaces are not exactly one level deeper, or a whole number of levels shallower.
    #[error("Misaligned indentation. Indents must be multiples of four spaces.")]
    MisalignedIndentation,

    /// A character which cannot start any token.
    #[error("Unexpected character.")]
    UnexpectedCharacter,

    /// A quoted string hit a newline or the end of the file before its closing quote.
    #[error("Unterminated quoted text.")]
    UnterminatedString,

    /// A backslash followed by a character with no escape meaning.
    #[error("Unsupported escape sequence in quoted text.")]
    UnsupportedEscape,

    /// `\u` with no hex digits, or a value which is not a Unicode scalar value.
    #[error("Invalid unicode escape sequence. Expected one to six hex digits naming a valid code point.")]
    InvalidUnicodeEscape,

    /// The token stream was read after `EndOfInput`.
    #[error("Attempted to read past the end of input.")]
    PastEndOfInput,
}

/// Error type for MOT parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The lexer stopped on an invalid token.
    #[error("Error: {kind}\n    at {location}")]
    Lex { kind: LexErrorKind, location: Location },

    /// The grammar required a different token.
    #[error(
        "Error: Cannot parse configuration file\n    Unexpected token {found}\n    at {location}{}",
        expected_suffix(.expected)
    )]
    UnexpectedToken {
        found: TokenType,
        expected: Vec<TokenType>,
        location: Location,
    },
}

impl ParseError {
    /// Where in the file the error occurred.
    pub fn location(&self) -> &Location {
        match self {
            ParseError::Lex { location, .. } => location,
            ParseError::UnexpectedToken { location, .. } => location,
        }
    }

    /// The error for `token` where one of `expected` was required. An `Error`
    /// token reports its lexical error instead.
    pub(crate) fn at_token(token: &Token<'_>, expected: &[TokenType]) -> Self {
        let location = token.text().location();
        match token.error_kind() {
            Some(kind) => ParseError::Lex { kind, location },
            None => ParseError::UnexpectedToken {
                found: token.token_type(),
                expected: expected.to_vec(),
                location,
            },
        }
    }
}

fn expected_suffix(expected: &[TokenType]) -> String {
    if expected.is_empty() {
        return String::new();
    }

    let names: Vec<&str> = expected.iter().map(|t| t.name()).collect();
    format!("\n    Expected: {}", names.join(", "))
}

fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

/// Error type for loading a file from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Error: Cannot load file. Filename is empty.")]
    EmptyFilename,

    #[error("Error: Unable to open file \"{path}\"")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(
        "Error: Cannot load file \"{path}\"\n       Its size is larger than {}MB",
        megabytes(.max_size)
    )]
    TooLarge { path: String, max_size: u64 },

    #[error("Error: Failed while reading file \"{path}\"")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}
