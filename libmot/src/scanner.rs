//! Sub-scanners for the lexer.
//!
//! Each scanner starts at a known byte offset and reports how far its token
//! extends, plus whatever decoded value it produced. They do not touch lexer
//! state; the [`Lexer`](crate::lexer::Lexer) turns their results into tokens
//! and registers any lines they consumed.

use crate::error::LexErrorKind;
use crate::utf8;

/// A lexical error with the byte range it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanError {
    pub kind: LexErrorKind,
    pub start: usize,
    pub end: usize,
}

impl ScanError {
    fn new(kind: LexErrorKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }
}

/// Result of scanning quoted text.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct QuotedScan {
    /// Offset of the closing quote.
    pub close: usize,
    /// Decoded contents when the text held escape sequences. `None` means the
    /// bytes between the quotes are the value verbatim.
    pub decoded: Option<Vec<u8>>,
}

/// Result of scanning block text.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct BlockScan {
    /// End of the last content line, excluding its terminator.
    pub end: usize,
    pub value: Vec<u8>,
    /// Start offsets of every line the block consumed, in order.
    pub lines: Vec<usize>,
}

pub(crate) fn is_newline(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}

pub(crate) fn is_alpha(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_alphanumeric(byte: u8) -> bool {
    is_alpha(byte) || byte.is_ascii_digit()
}

/// Length of the line terminator at `pos`: two for `\r\n`, otherwise one.
pub(crate) fn newline_len(input: &[u8], pos: usize) -> usize {
    if input[pos] == b'\r' && input.get(pos + 1) == Some(&b'\n') {
        2
    } else {
        1
    }
}

/// Scans `[A-Za-z_][A-Za-z0-9_]*` and returns the end offset.
pub(crate) fn scan_word(input: &[u8], start: usize) -> usize {
    debug_assert!(is_alpha(input[start]));

    let mut pos = start + 1;
    while pos < input.len() && is_alphanumeric(input[pos]) {
        pos += 1;
    }
    pos
}

/// Scans unquoted text up to a newline or `#`. Returns the end of the text
/// with trailing spaces and tabs removed.
pub(crate) fn scan_line_text(input: &[u8], start: usize) -> usize {
    let mut pos = start;
    let mut end = start;

    while pos < input.len() {
        let byte = input[pos];
        if is_newline(byte) || byte == b'#' {
            break;
        }
        pos += 1;
        if byte != b' ' && byte != b'\t' {
            end = pos;
        }
    }

    end
}

/// Scans a double-quoted string starting at the opening quote. The string
/// must close on the same line.
///
/// The first pass validates escapes and measures the decoded length, so the
/// second pass (only needed when escapes were present) allocates once.
pub(crate) fn scan_quoted_text(input: &[u8], open: usize) -> Result<QuotedScan, ScanError> {
    debug_assert_eq!(input[open], b'"');

    let mut pos = open + 1;
    let mut decoded_len = 0;
    let mut has_escapes = false;

    while pos < input.len() {
        match input[pos] {
            b'\r' | b'\n' => break,
            b'"' => {
                let decoded = if has_escapes {
                    Some(decode_escapes(&input[open + 1..pos], decoded_len))
                } else {
                    None
                };
                return Ok(QuotedScan {
                    close: pos,
                    decoded,
                });
            }
            b'\\' => {
                let (cp, consumed) = parse_escape(input, pos)?;
                pos += consumed;
                decoded_len += utf8::encoded_size(cp);
                has_escapes = true;
            }
            _ => {
                pos += 1;
                decoded_len += 1;
            }
        }
    }

    Err(ScanError::new(LexErrorKind::UnterminatedString, open, pos))
}

fn decode_escapes(raw: &[u8], decoded_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(decoded_len);
    let mut i = 0;

    while i < raw.len() {
        if raw[i] != b'\\' {
            out.push(raw[i]);
            i += 1;
            continue;
        }

        match parse_escape(raw, i) {
            Ok((cp, consumed)) => {
                utf8::push_encoded(&mut out, cp);
                i += consumed;
            }
            Err(_) => {
                // already validated by the first pass
                out.push(raw[i]);
                i += 1;
            }
        }
    }

    debug_assert_eq!(out.len(), decoded_len);
    out
}

/// Parses the escape sequence whose backslash is at `pos`. Returns the code
/// point and the length of the sequence including the backslash.
pub(crate) fn parse_escape(input: &[u8], pos: usize) -> Result<(u32, usize), ScanError> {
    debug_assert_eq!(input[pos], b'\\');

    let format = match input.get(pos + 1) {
        Some(&byte) if !is_newline(byte) => byte,
        _ => return Err(ScanError::new(LexErrorKind::UnsupportedEscape, pos, pos + 1)),
    };

    let ch = match format {
        // the escape is just the literal second character
        b'\'' | b'"' | b'?' | b'\\' => format,
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0C,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'v' => 0x0B,
        b'u' => return parse_unicode_escape(input, pos),
        _ => {
            let width = utf8::decode(input, pos + 1, input.len()).map_or(1, |(_, size)| size);
            return Err(ScanError::new(
                LexErrorKind::UnsupportedEscape,
                pos,
                pos + 1 + width,
            ));
        }
    };

    Ok((ch as u32, 2))
}

/// `\u` followed by one to six hex digits naming a Unicode scalar value.
fn parse_unicode_escape(input: &[u8], pos: usize) -> Result<(u32, usize), ScanError> {
    const MAX_DIGITS: usize = 6;

    let mut value = 0u32;
    let mut digits = 0;
    while digits < MAX_DIGITS {
        let Some(digit) = input.get(pos + 2 + digits).and_then(|&b| (b as char).to_digit(16)) else {
            break;
        };
        value = (value << 4) | digit;
        digits += 1;
    }

    let end = pos + 2 + digits;
    if digits == 0 || utf8::encoded_size(value) == 0 {
        return Err(ScanError::new(LexErrorKind::InvalidUnicodeEscape, pos, end));
    }

    Ok((value, 2 + digits))
}

/// Scans block text. `start` is the line terminator which ends the `>` line
/// (or the end of input). Following lines belong to the block while they are
/// blank or have at least `required_spaces` leading spaces. Each included
/// line loses that padding (a blank line loses at most that much) and the
/// rest of it, with its terminator, is kept verbatim. Blank lines after the
/// last content line are left to the caller, and the terminator of the last
/// content line is not part of the value.
pub(crate) fn scan_block_text(input: &[u8], start: usize, required_spaces: usize) -> BlockScan {
    let size = input.len();
    let mut result = BlockScan {
        end: start,
        value: Vec::new(),
        lines: Vec::new(),
    };
    // (line start, line end) of blank lines seen since the last content line
    let mut pending: Vec<(usize, usize)> = Vec::new();
    let mut has_content = false;
    let mut cursor = start;

    while cursor < size {
        debug_assert!(is_newline(input[cursor]));

        let line_start = cursor + newline_len(input, cursor);
        let mut pos = line_start;
        while pos < size && input[pos] == b' ' {
            pos += 1;
        }

        if pos >= size || is_newline(input[pos]) {
            if line_start < size {
                pending.push((line_start, pos));
            }
            cursor = pos;
            continue;
        }

        if pos - line_start < required_spaces {
            break;
        }

        let mut line_end = pos;
        while line_end < size && !is_newline(input[line_end]) {
            line_end += 1;
        }

        if has_content {
            let terminator = result.end + newline_len(input, result.end);
            result.value.extend_from_slice(&input[result.end..terminator]);
        }
        for &(blank_start, blank_end) in &pending {
            let padding = (blank_end - blank_start).min(required_spaces);
            let terminator = blank_end + newline_len(input, blank_end);
            result
                .value
                .extend_from_slice(&input[blank_start + padding..terminator]);
            result.lines.push(blank_start);
        }
        pending.clear();

        result.lines.push(line_start);
        result
            .value
            .extend_from_slice(&input[line_start + required_spaces..line_end]);
        result.end = line_end;
        has_content = true;
        cursor = line_end;
    }

    result
}
