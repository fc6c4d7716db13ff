//! UTF-8 codec with per-code-point case folding.
//!
//! Everything here works on raw bytes rather than `&str`, because file content
//! is not validated up front and the lexer, hashing and column counting all
//! need a well-defined answer for malformed input. Code points are `u32`
//! values; surrogates (`U+D800..=U+DFFF`) are not scalar values and are
//! rejected by both `decode` and `encode`.

/// The largest valid Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

const HIGH_BITS: u64 = 0x8080_8080_8080_8080;

/// Returns the encoded length announced by a lead byte, or zero if the byte
/// cannot start a sequence (continuation bytes and `0xF8..=0xFF`).
pub fn expected_size(lead: u8) -> usize {
    if lead & 0b1000_0000 == 0b0000_0000 {
        1
    } else if lead & 0b1110_0000 == 0b1100_0000 {
        2
    } else if lead & 0b1111_0000 == 0b1110_0000 {
        3
    } else if lead & 0b1111_1000 == 0b1111_0000 {
        4
    } else {
        0
    }
}

/// Returns the number of bytes needed to encode `cp`, or zero when it is not
/// a Unicode scalar value.
pub fn encoded_size(cp: u32) -> usize {
    match cp {
        0..=0x7F => 1,
        0x80..=0x7FF => 2,
        0xD800..=0xDFFF => 0,
        0x800..=0xFFFF => 3,
        0x1_0000..=MAX_CODE_POINT => 4,
        _ => 0,
    }
}

/// Decodes the code point starting at `position`, reading no further than
/// `limit`. Returns the code point and the number of bytes consumed, or
/// `None` for a malformed, overlong, surrogate or truncated sequence.
pub fn decode(bytes: &[u8], position: usize, limit: usize) -> Option<(u32, usize)> {
    let limit = limit.min(bytes.len());
    if position >= limit {
        return None;
    }

    let lead = bytes[position];
    let size = expected_size(lead);
    if size == 0 || position + size > limit {
        return None;
    }

    if size == 1 {
        return Some((lead as u32, 1));
    }

    let mut cp = (lead & (0x7F >> size)) as u32;
    for &byte in &bytes[position + 1..position + size] {
        if byte & 0b1100_0000 != 0b1000_0000 {
            return None;
        }
        cp = (cp << 6) | (byte & 0b0011_1111) as u32;
    }

    // Rejects overlong forms and surrogates in one check.
    if encoded_size(cp) != size {
        return None;
    }

    Some((cp, size))
}

/// Encodes `cp` into `buf` and returns the number of bytes written. Writes
/// nothing and returns zero when `cp` is not a scalar value.
///
/// # Panics
///
/// Panics if `buf` is shorter than `encoded_size(cp)`.
pub fn encode(cp: u32, buf: &mut [u8]) -> usize {
    let size = encoded_size(cp);
    match size {
        1 => {
            buf[0] = cp as u8;
        }
        2 => {
            buf[0] = 0b1100_0000 | (cp >> 6) as u8;
            buf[1] = 0b1000_0000 | (cp & 0x3F) as u8;
        }
        3 => {
            buf[0] = 0b1110_0000 | (cp >> 12) as u8;
            buf[1] = 0b1000_0000 | ((cp >> 6) & 0x3F) as u8;
            buf[2] = 0b1000_0000 | (cp & 0x3F) as u8;
        }
        4 => {
            buf[0] = 0b1111_0000 | (cp >> 18) as u8;
            buf[1] = 0b1000_0000 | ((cp >> 12) & 0x3F) as u8;
            buf[2] = 0b1000_0000 | ((cp >> 6) & 0x3F) as u8;
            buf[3] = 0b1000_0000 | (cp & 0x3F) as u8;
        }
        _ => {}
    }
    size
}

/// Appends the encoding of `cp` to `out`. Returns the number of bytes added.
pub fn push_encoded(out: &mut Vec<u8>, cp: u32) -> usize {
    let mut buf = [0u8; 4];
    let size = encode(cp, &mut buf);
    out.extend_from_slice(&buf[..size]);
    size
}

/// Returns the uppercase form of `cp`, or `cp` itself when it has no
/// single-code-point uppercase mapping.
pub fn to_upper(cp: u32) -> u32 {
    if cp < 0x80 {
        return (cp as u8).to_ascii_uppercase() as u32;
    }

    match char::from_u32(cp) {
        Some(ch) => single_mapping(cp, ch.to_uppercase()),
        None => cp,
    }
}

/// Returns the lowercase form of `cp`, or `cp` itself when it has no
/// single-code-point lowercase mapping.
pub fn to_lower(cp: u32) -> u32 {
    if cp < 0x80 {
        return (cp as u8).to_ascii_lowercase() as u32;
    }

    match char::from_u32(cp) {
        Some(ch) => single_mapping(cp, ch.to_lowercase()),
        None => cp,
    }
}

// Multi-character expansions (e.g. ß -> SS) would change string lengths, so
// they fold to themselves.
fn single_mapping(cp: u32, mut mapped: impl Iterator<Item = char>) -> u32 {
    match (mapped.next(), mapped.next()) {
        (Some(ch), None) => ch as u32,
        _ => cp,
    }
}

/// Counts the code points in `bytes`. Each byte which is not part of a valid
/// sequence counts as one character.
pub fn count_characters(bytes: &[u8]) -> u32 {
    let mut i = 0;

    // ASCII-heavy input: skip eight bytes at a time while no high bit is set.
    for chunk in bytes.chunks_exact(8) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        if u64::from_ne_bytes(word) & HIGH_BITS != 0 {
            break;
        }
        i += 8;
    }

    let len = bytes.len();
    let mut count = i;
    while i < len {
        i += match decode(bytes, i, len) {
            Some((_, size)) => size,
            None => 1,
        };
        count += 1;
    }

    count as u32
}

/// Iterates over the code points of `bytes`.
pub fn chars(bytes: &[u8]) -> Chars<'_> {
    Chars { bytes, index: 0 }
}

/// Iterator over `(byte offset, code point)` pairs. Bytes which do not start
/// a valid sequence are yielded one at a time as `Err(byte)`.
#[derive(Debug, Clone)]
pub struct Chars<'a> {
    bytes: &'a [u8],
    index: usize,
}

impl Chars<'_> {
    /// Byte offset of the next item.
    pub fn offset(&self) -> usize {
        self.index
    }
}

impl Iterator for Chars<'_> {
    type Item = (usize, Result<u32, u8>);

    fn next(&mut self) -> Option<Self::Item> {
        let at = self.index;
        if at >= self.bytes.len() {
            return None;
        }

        match decode(self.bytes, at, self.bytes.len()) {
            Some((cp, size)) => {
                self.index += size;
                Some((at, Ok(cp)))
            }
            None => {
                self.index += 1;
                Some((at, Err(self.bytes[at])))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_expected_size() {
        assert_eq!(expected_size(b'a'), 1);
        assert_eq!(expected_size(0xC3), 2);
        assert_eq!(expected_size(0xE2), 3);
        assert_eq!(expected_size(0xF0), 4);
        assert_eq!(expected_size(0x80), 0);
        assert_eq!(expected_size(0xF8), 0);
        assert_eq!(expected_size(0xFF), 0);
    }

    #[test]
    fn test_decode_multibyte() {
        let bytes = "aé€😀".as_bytes();
        assert_eq!(decode(bytes, 0, bytes.len()), Some(('a' as u32, 1)));
        assert_eq!(decode(bytes, 1, bytes.len()), Some(('é' as u32, 2)));
        assert_eq!(decode(bytes, 3, bytes.len()), Some(('€' as u32, 3)));
        assert_eq!(decode(bytes, 6, bytes.len()), Some(('😀' as u32, 4)));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        // lone continuation byte
        assert_eq!(decode(&[0x80], 0, 1), None);
        // bad continuation
        assert_eq!(decode(&[0xC3, 0x41], 0, 2), None);
        // truncated by limit even though the buffer is long enough
        assert_eq!(decode(&[0xE2, 0x82, 0xAC], 0, 2), None);
        // overlong encoding of '/'
        assert_eq!(decode(&[0xC0, 0xAF], 0, 2), None);
        // encoded surrogate U+D800
        assert_eq!(decode(&[0xED, 0xA0, 0x80], 0, 3), None);
        // above U+10FFFF
        assert_eq!(decode(&[0xF4, 0x90, 0x80, 0x80], 0, 4), None);
    }

    #[test]
    fn test_encode_out_of_range() {
        let mut buf = [0u8; 4];
        assert_eq!(encode(MAX_CODE_POINT + 1, &mut buf), 0);
        assert_eq!(encode(0xD800, &mut buf), 0);
        assert_eq!(buf, [0u8; 4]);
        assert_eq!(encode(MAX_CODE_POINT, &mut buf), 4);
    }

    #[test]
    fn test_case_mapping() {
        assert_eq!(to_upper('a' as u32), 'A' as u32);
        assert_eq!(to_upper('п' as u32), 'П' as u32);
        assert_eq!(to_lower('П' as u32), 'п' as u32);
        assert_eq!(to_upper('1' as u32), '1' as u32);
        // ß uppercases to "SS", which is not a single code point
        assert_eq!(to_upper('ß' as u32), 'ß' as u32);
        assert_eq!(to_upper(0xD800), 0xD800);
    }

    #[test]
    fn test_count_characters() {
        assert_eq!(count_characters(b""), 0);
        assert_eq!(count_characters(b"hello world, this is ascii"), 26);
        assert_eq!(count_characters("😀😀😀".as_bytes()), 3);
        assert_eq!(count_characters("abcdefgh€".as_bytes()), 9);
        // invalid bytes count individually
        assert_eq!(count_characters(&[b'a', 0x80, 0xFF, b'b']), 4);
    }

    #[test]
    fn test_chars_reports_invalid_bytes() {
        let items: Vec<_> = chars(&[b'a', 0xFF, 0xC3, 0xA9]).collect();
        assert_eq!(items, vec![(0, Ok('a' as u32)), (1, Err(0xFF)), (2, Ok('é' as u32))]);
    }

    proptest! {
        #[test]
        fn encode_decode_round_trip(ch in any::<char>()) {
            let cp = ch as u32;
            let mut buf = [0u8; 4];
            let size = encode(cp, &mut buf);
            prop_assert_eq!(size, encoded_size(cp));
            let expected = ch.to_string();
            prop_assert_eq!(&buf[..size], expected.as_bytes());
            prop_assert_eq!(decode(&buf, 0, size), Some((cp, size)));
        }

        #[test]
        fn surrogates_never_encode(cp in 0xD800u32..=0xDFFF) {
            let mut buf = [0u8; 4];
            prop_assert_eq!(encode(cp, &mut buf), 0);
        }

        #[test]
        fn count_matches_std_for_valid_text(s in ".*") {
            prop_assert_eq!(count_characters(s.as_bytes()) as usize, s.chars().count());
        }

        #[test]
        fn ascii_count_is_length(s in "[ -~]{0,100}") {
            prop_assert_eq!(count_characters(s.as_bytes()) as usize, s.len());
        }
    }
}
