//! Indentation-aware lexer.
//!
//! The lexer pulls one token at a time from a [`FileContent`]. Whitespace and
//! comments are attached to the following token as trivia. Indentation is
//! reported with zero-width markers:
//! - `Indent`: a line starts exactly one level (four spaces) deeper
//! - `Outdent`: one open level closes; a deeper dedent yields several
//! - `EndOfLine`: a newline which ends a non-blank line
//!
//! Blank lines and comment lines are trivia. Every line the lexer starts is
//! recorded in the content's line index, so spans can be located later.

use tracing::trace;

use crate::content::FileContent;
use crate::error::{LexErrorKind, ParseError, Result};
use crate::scanner::{self, ScanError};
use crate::span::FileSpan;
use crate::string::MotString;
use crate::token::{Token, TokenType};
use crate::utf8;

/// Width of one indentation level.
pub const SPACES_PER_INDENT: u32 = 4;

/// Pull lexer with one token of lookahead.
pub struct Lexer<'c> {
    content: &'c FileContent,
    input: &'c [u8],
    position: u32,
    trivia_start: u32,
    indent_level: u32,
    line_start: u32,
    line_spaces: u32,
    last_token_type: TokenType,
    next: Option<Token<'c>>,
}

impl<'c> Lexer<'c> {
    /// Starts lexing from the beginning, clearing the content's line index.
    pub fn new(content: &'c FileContent) -> Self {
        content.reset_line_markers();
        let mut lexer = Self {
            content,
            input: content.data(),
            position: 0,
            trivia_start: 0,
            indent_level: 0,
            line_start: 0,
            line_spaces: 0,
            last_token_type: TokenType::StartOfInput,
            next: None,
        };
        lexer.start_new_line(0);
        lexer
    }

    pub fn content(&self) -> &'c FileContent {
        self.content
    }

    /// Current nesting depth, in levels.
    pub fn indent_level(&self) -> u32 {
        self.indent_level
    }

    /// The next token, without consuming it.
    pub fn peek(&mut self) -> &Token<'c> {
        let token = match self.next.take() {
            Some(token) => token,
            None => self.lex(),
        };
        self.next.insert(token)
    }

    pub fn peek_type(&mut self) -> TokenType {
        self.peek().token_type()
    }

    /// Consumes and returns the next token. Past the end of input this keeps
    /// returning `PastEndOfInput` errors.
    pub fn advance(&mut self) -> Token<'c> {
        match self.next.take() {
            Some(token) => token,
            None => self.lex(),
        }
    }

    fn lex(&mut self) -> Token<'c> {
        let token = self.lex_token();
        trace!(
            token = %token.token_type(),
            start = token.text().start(),
            end = token.text().end(),
            "lexed token"
        );
        token
    }

    fn lex_token(&mut self) -> Token<'c> {
        let last = self.last_token_type;
        self.trivia_start = self.position;

        if last == TokenType::EndOfInput {
            let here = FileSpan::empty(self.content, self.position);
            return Token::error(LexErrorKind::PastEndOfInput, here, here);
        }

        self.consume_trivia();

        if self.position >= self.size() {
            return self.lex_end_of_input();
        }

        if matches!(
            last,
            TokenType::StartOfInput | TokenType::EndOfLine | TokenType::Indent | TokenType::Outdent
        ) {
            if self.position != self.line_start + self.line_spaces {
                let leading = &self.input[self.line_start as usize..self.position as usize];
                if let Some(offset) = leading.iter().position(|&b| b == b'\t') {
                    let tab = self.line_start + offset as u32;
                    return self.error_token(LexErrorKind::TabIndentation, tab, tab + 1);
                }
            }

            if self.indent_level * SPACES_PER_INDENT != self.line_spaces {
                return self.lex_indentation();
            }
        }

        let ch = self.input[self.position as usize];
        match ch {
            b':' => self.new_token(TokenType::Colon, 1, None),
            b'>' => self.new_token(TokenType::GreaterThan, 1, None),
            b'"' => self.lex_quoted_text(),
            b'\r' | b'\n' if last == TokenType::GreaterThan => self.lex_block_text(),
            b'\r' | b'\n' => self.lex_end_of_line(),
            _ if last == TokenType::Colon => self.lex_line_text(),
            _ if scanner::is_alpha(ch) => self.lex_word(),
            _ => {
                let width = utf8::decode(self.input, self.position as usize, self.input.len())
                    .map_or(1, |(_, size)| size as u32);
                self.error_token(
                    LexErrorKind::UnexpectedCharacter,
                    self.position,
                    self.position + width,
                )
            }
        }
    }

    fn size(&self) -> u32 {
        self.content.size()
    }

    /// Records a line beginning at `line_start` and counts its leading spaces.
    fn start_new_line(&mut self, line_start: u32) {
        self.content.mark_line(line_start);
        self.line_start = line_start;
        self.line_spaces = self.input[line_start as usize..]
            .iter()
            .take_while(|&&b| b == b' ')
            .count() as u32;
    }

    fn consume_trivia(&mut self) {
        let mut pos = self.position as usize;
        let mut in_comment = false;

        while pos < self.input.len() {
            match self.input[pos] {
                b' ' | b'\t' => pos += 1,
                b'\r' | b'\n' => {
                    if !matches!(
                        self.last_token_type,
                        TokenType::StartOfInput | TokenType::EndOfLine | TokenType::Outdent
                    ) {
                        break;
                    }
                    pos += scanner::newline_len(self.input, pos);
                    self.start_new_line(pos as u32);
                    in_comment = false;
                }
                b'#' => {
                    in_comment = true;
                    pos += 1;
                }
                _ if in_comment => pos += 1,
                _ => break,
            }
        }

        self.position = pos as u32;
    }

    fn lex_end_of_input(&mut self) -> Token<'c> {
        match self.last_token_type {
            TokenType::GreaterThan => self.lex_block_text(),
            TokenType::EndOfLine | TokenType::Outdent if self.indent_level > 0 => {
                self.indent_level -= 1;
                self.new_token(TokenType::Outdent, 0, None)
            }
            TokenType::EndOfLine | TokenType::Outdent => {
                self.new_token(TokenType::EndOfInput, 0, None)
            }
            // the last line has no terminator
            _ => self.new_token(TokenType::EndOfLine, 0, None),
        }
    }

    /// Resolves one step of indentation change. Deeper lines must be exactly
    /// one level in; shallower lines close one level per call.
    fn lex_indentation(&mut self) -> Token<'c> {
        let current = self.indent_level * SPACES_PER_INDENT;

        if self.line_spaces < current {
            self.indent_level -= 1;
            return self.new_token(TokenType::Outdent, 0, None);
        }

        if self.line_spaces == current + SPACES_PER_INDENT {
            self.indent_level += 1;
            return self.new_token(TokenType::Indent, 0, None);
        }

        self.error_token(LexErrorKind::MisalignedIndentation, self.position, self.position)
    }

    fn lex_end_of_line(&mut self) -> Token<'c> {
        let len = scanner::newline_len(self.input, self.position as usize) as u32;
        let token = self.new_token(TokenType::EndOfLine, len, None);
        self.start_new_line(self.position);
        token
    }

    fn lex_word(&mut self) -> Token<'c> {
        let end = scanner::scan_word(self.input, self.position as usize) as u32;
        let len = end - self.position;
        let value = self.shared_value(self.position, len);
        self.new_token(TokenType::Word, len, Some(value))
    }

    fn lex_line_text(&mut self) -> Token<'c> {
        let end = scanner::scan_line_text(self.input, self.position as usize) as u32;
        let len = end - self.position;
        let value = self.shared_value(self.position, len);
        self.new_token(TokenType::LineText, len, Some(value))
    }

    fn lex_quoted_text(&mut self) -> Token<'c> {
        let open = self.position;
        match scanner::scan_quoted_text(self.input, open as usize) {
            Ok(scan) => {
                let close = scan.close as u32;
                let value = match scan.decoded {
                    Some(decoded) => MotString::from_vec(decoded),
                    None => self.shared_value(open + 1, close - open - 1),
                };
                self.new_token(TokenType::QuotedText, close + 1 - open, Some(value))
            }
            Err(ScanError { kind, start, end }) => self.error_token(kind, start as u32, end as u32),
        }
    }

    fn lex_block_text(&mut self) -> Token<'c> {
        let required = ((self.indent_level + 1) * SPACES_PER_INDENT) as usize;
        let start = self.position as usize;
        let scan = scanner::scan_block_text(self.input, start, required);

        for &line in &scan.lines {
            self.content.mark_line(line as u32);
        }

        let value = MotString::from_vec(scan.value);
        self.new_token(TokenType::BlockText, (scan.end - start) as u32, Some(value))
    }

    fn shared_value(&self, start: u32, len: u32) -> MotString {
        MotString::from_shared(self.content.shared_data().clone(), start, len)
    }

    fn new_token(&mut self, token_type: TokenType, len: u32, value: Option<MotString>) -> Token<'c> {
        let start = self.position;
        let end = start + len;
        self.position = end;
        self.last_token_type = token_type;

        Token::new(
            token_type,
            FileSpan::new(self.content, self.trivia_start, start),
            FileSpan::new(self.content, start, end),
            value,
        )
    }

    /// An error token covering `[start, end)`. Anything skipped before `start`
    /// becomes its trivia. The position never moves back over consumed input.
    fn error_token(&mut self, kind: LexErrorKind, start: u32, end: u32) -> Token<'c> {
        let trivia_start = self.trivia_start.min(start);
        self.position = self.position.max(end);
        self.last_token_type = TokenType::Error;

        Token::error(
            kind,
            FileSpan::new(self.content, trivia_start, start),
            FileSpan::new(self.content, start, end),
        )
    }
}

/// Yields every token up to and including `EndOfInput`, or up to the first
/// `Error` token.
impl<'c> Iterator for Lexer<'c> {
    type Item = Token<'c>;

    fn next(&mut self) -> Option<Token<'c>> {
        if self.next.is_none()
            && matches!(self.last_token_type, TokenType::EndOfInput | TokenType::Error)
        {
            return None;
        }
        Some(self.advance())
    }
}

/// Lexes the whole file, failing on the first lexical error.
pub fn tokenize(content: &FileContent) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    for token in Lexer::new(content) {
        if token.is_error() {
            return Err(ParseError::at_token(&token, &[]));
        }
        tokens.push(token);
    }
    Ok(tokens)
}
