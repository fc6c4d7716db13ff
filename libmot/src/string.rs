//! Immutable, reference-counted strings with case-insensitive identity.
//!
//! A `MotString` is a view `(buffer, offset, len)` over UTF-8 bytes. Token
//! values point straight into the file's buffer; decoded values (escapes,
//! block text) own a fresh buffer. Cloning and taking substrings never copies
//! bytes.
//!
//! Names in the profile language are case-insensitive, so the `Eq`, `Hash`
//! and `Ord` implementations fold case. Use [`MotString::are_equal`] or
//! [`MotString::compare`] for exact comparisons.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::utf8;

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

#[derive(Clone)]
enum Buffer {
    Static(&'static [u8]),
    Shared(Arc<[u8]>),
}

/// Hash code and character count, computed together in one pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Metrics {
    hash_code: u32,
    char_count: u32,
}

/// An immutable UTF-8 string view. See the module documentation.
#[derive(Clone)]
pub struct MotString {
    buffer: Buffer,
    offset: u32,
    len: u32,
    metrics: OnceLock<Metrics>,
}

impl MotString {
    /// A string backed by a literal. Usable in `static` items.
    pub const fn from_static(literal: &'static str) -> Self {
        Self {
            buffer: Buffer::Static(literal.as_bytes()),
            offset: 0,
            len: literal.len() as u32,
            metrics: OnceLock::new(),
        }
    }

    pub const fn empty() -> Self {
        Self::from_static("")
    }

    /// A view of `len` bytes at `offset` within a shared buffer. No bytes are copied.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn from_shared(buffer: Arc<[u8]>, offset: u32, len: u32) -> Self {
        assert!(
            offset as usize + len as usize <= buffer.len(),
            "MotString range {}+{} is outside a buffer of {} bytes",
            offset,
            len,
            buffer.len()
        );

        Self {
            buffer: Buffer::Shared(buffer),
            offset,
            len,
            metrics: OnceLock::new(),
        }
    }

    /// Takes ownership of freshly produced bytes.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            return Self::empty();
        }

        let len = bytes.len() as u32;
        Self::from_shared(Arc::from(bytes), 0, len)
    }

    pub fn as_bytes(&self) -> &[u8] {
        let range = self.offset as usize..(self.offset + self.len) as usize;
        match &self.buffer {
            Buffer::Static(bytes) => &bytes[range],
            Buffer::Shared(bytes) => &bytes[range],
        }
    }

    /// The contents as `&str`, if they are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    pub fn byte_len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of code points. Invalid bytes count as one character each.
    pub fn char_count(&self) -> u32 {
        self.metrics().char_count
    }

    /// Case-insensitive FNV-1a hash of the string.
    pub fn hash_code(&self) -> u32 {
        self.metrics().hash_code
    }

    fn metrics(&self) -> Metrics {
        *self.metrics.get_or_init(|| compute_metrics(self.as_bytes()))
    }

    /// A substring sharing this string's buffer. `start` and `len` are byte
    /// counts and are clamped to the string; UTF-8 boundaries are not checked.
    pub fn sub_string(&self, start: u32, len: u32) -> MotString {
        let start = start.min(self.len);
        let len = len.min(self.len - start);
        if len == 0 {
            return Self::empty();
        }

        Self {
            buffer: self.buffer.clone(),
            offset: self.offset + start,
            len,
            metrics: OnceLock::new(),
        }
    }

    fn same_view(a: &MotString, b: &MotString) -> bool {
        let same_buffer = match (&a.buffer, &b.buffer) {
            (Buffer::Static(x), Buffer::Static(y)) => std::ptr::eq(x.as_ptr(), y.as_ptr()),
            (Buffer::Shared(x), Buffer::Shared(y)) => Arc::ptr_eq(x, y),
            _ => false,
        };
        same_buffer && a.offset == b.offset && a.len == b.len
    }

    /// Ordered, case-sensitive comparison of the UTF-8 bytes. The empty string
    /// sorts first, and a string sorts before any longer string it prefixes.
    pub fn compare(a: &MotString, b: &MotString) -> Ordering {
        a.as_bytes().cmp(b.as_bytes())
    }

    /// Ordered comparison of the uppercase form of each code point.
    pub fn compare_case_insensitive(a: &MotString, b: &MotString) -> Ordering {
        if a.is_empty() || b.is_empty() {
            return a.len.cmp(&b.len);
        }
        compare_folded(a.as_bytes(), b.as_bytes())
    }

    /// Exact equality. Strings of different byte lengths are rejected without
    /// looking at their contents.
    pub fn are_equal(a: &MotString, b: &MotString) -> bool {
        if a.len != b.len {
            return false;
        }
        Self::same_view(a, b) || a.as_bytes() == b.as_bytes()
    }

    /// Case-insensitive equality. Strings whose hashes differ are rejected
    /// without a full comparison.
    pub fn are_case_insensitive_equal(a: &MotString, b: &MotString) -> bool {
        if a.is_empty() || b.is_empty() {
            return a.len == b.len;
        }
        if Self::same_view(a, b) {
            return true;
        }
        if a.hash_code() != b.hash_code() {
            return false;
        }
        compare_folded(a.as_bytes(), b.as_bytes()) == Ordering::Equal
    }

    /// Orders optional strings: an absent or empty string sorts before any
    /// non-empty one, and absent equals empty.
    pub fn compare_optional(a: Option<&MotString>, b: Option<&MotString>) -> Ordering {
        match (a.filter(|s| !s.is_empty()), b.filter(|s| !s.is_empty())) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => Self::compare_case_insensitive(a, b),
        }
    }

    pub fn is_equal_to(&self, other: &MotString) -> bool {
        Self::are_equal(self, other)
    }

    pub fn is_case_insensitive_equal_to(&self, other: &MotString) -> bool {
        Self::are_case_insensitive_equal(self, other)
    }
}

fn mix(hash: u32, byte: u8) -> u32 {
    (hash ^ byte as u32).wrapping_mul(FNV_PRIME)
}

fn compute_metrics(bytes: &[u8]) -> Metrics {
    let len = bytes.len();
    let mut hash = FNV_OFFSET;
    let mut char_count = 0u32;
    let mut i = 0;

    while i < len {
        let byte = bytes[i];
        char_count += 1;

        if byte < 0x80 {
            hash = mix(hash, byte.to_ascii_uppercase());
            i += 1;
            continue;
        }

        match utf8::decode(bytes, i, len) {
            Some((cp, size)) => {
                let mut buf = [0u8; 4];
                let written = utf8::encode(utf8::to_upper(cp), &mut buf);
                for &b in &buf[..written] {
                    hash = mix(hash, b);
                }
                i += size;
            }
            None => {
                hash = mix(hash, byte);
                i += 1;
            }
        }
    }

    Metrics {
        hash_code: hash,
        char_count,
    }
}

/// Compares code point by code point after uppercasing. Where either side is
/// not valid UTF-8 the raw bytes are compared instead.
fn compare_folded(a: &[u8], b: &[u8]) -> Ordering {
    let mut left = utf8::chars(a);
    let mut right = utf8::chars(b);

    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some((_, Ok(x))), Some((_, Ok(y)))) if x == y => Ordering::Equal,
            (Some((_, Ok(x))), Some((_, Ok(y)))) => utf8::to_upper(x).cmp(&utf8::to_upper(y)),
            (Some((i, _)), Some((j, _))) => a[i].cmp(&b[j]),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

impl Default for MotString {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for MotString {
    fn eq(&self, other: &Self) -> bool {
        Self::are_case_insensitive_equal(self, other)
    }
}

impl Eq for MotString {}

impl Hash for MotString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_code());
    }
}

impl PartialOrd for MotString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MotString {
    fn cmp(&self, other: &Self) -> Ordering {
        Self::compare_case_insensitive(self, other)
    }
}

impl From<&str> for MotString {
    fn from(s: &str) -> Self {
        Self::from_vec(s.as_bytes().to_vec())
    }
}

impl From<String> for MotString {
    fn from(s: String) -> Self {
        Self::from_vec(s.into_bytes())
    }
}

impl From<Vec<u8>> for MotString {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl fmt::Display for MotString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl fmt::Debug for MotString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_str_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_literal_equality() {
        let a = MotString::from_static("test");
        let b = MotString::from("test");
        let upper = MotString::from_static("TEST");

        assert!(a.is_equal_to(&a));
        assert!(a.is_equal_to(&b));
        assert!(b.is_equal_to(&a));
        assert!(!a.is_equal_to(&upper));
    }

    #[test]
    fn test_case_insensitive_equality() {
        let a = MotString::from_static("test");
        let b = MotString::from_static("TEST");
        let c = MotString::from_static("TeSt");

        assert!(MotString::are_case_insensitive_equal(&b, &a));
        assert!(MotString::are_case_insensitive_equal(&c, &a));
        assert!(a.is_case_insensitive_equal_to(&c));
        assert!(!a.is_case_insensitive_equal_to(&MotString::from_static("tests")));
    }

    #[test]
    fn test_cyrillic_case_insensitive() {
        let upper = MotString::from("heyП");
        let lower = MotString::from("heyп");

        assert_eq!(upper.hash_code(), lower.hash_code());
        assert!(MotString::are_case_insensitive_equal(&upper, &lower));
        assert_ne!(MotString::compare(&upper, &lower), Ordering::Equal);
    }

    #[test]
    fn test_ordering() {
        let a = MotString::from_static("a");
        let b = MotString::from_static("b");
        let empty = MotString::empty();
        let x = MotString::from_static("x");

        assert_eq!(MotString::compare(&a, &b), Ordering::Less);
        assert_eq!(MotString::compare(&empty, &x), Ordering::Less);
        assert_eq!(MotString::compare(&x, &empty), Ordering::Greater);
        assert_eq!(MotString::compare(&empty, &MotString::empty()), Ordering::Equal);
        assert_eq!(
            MotString::compare(&MotString::from_static("ab"), &MotString::from_static("abc")),
            Ordering::Less
        );
        assert_eq!(
            MotString::compare_case_insensitive(&MotString::from_static("ABC"), &MotString::from_static("abd")),
            Ordering::Less
        );
        assert_eq!(
            MotString::compare_case_insensitive(&MotString::from_static("one"), &MotString::from_static("OnE")),
            Ordering::Equal
        );
    }

    #[test]
    fn test_optional_comparison() {
        let x = MotString::from_static("x");
        let empty = MotString::empty();

        assert_eq!(MotString::compare_optional(None, Some(&x)), Ordering::Less);
        assert_eq!(MotString::compare_optional(Some(&x), None), Ordering::Greater);
        assert_eq!(MotString::compare_optional(None, Some(&empty)), Ordering::Equal);
        assert_eq!(MotString::compare_optional(Some(&empty), Some(&x)), Ordering::Less);
    }

    #[test]
    fn test_sub_string_shares_buffer() {
        let buffer: Arc<[u8]> = Arc::from(b"PREFIX tools".to_vec());
        let s = MotString::from_shared(buffer.clone(), 0, 12);
        let sub = s.sub_string(7, 5);

        assert_eq!(sub.as_bytes(), b"tools");
        assert_eq!(Arc::strong_count(&buffer), 3);

        // clamped to the original length
        assert_eq!(s.sub_string(7, 100).as_bytes(), b"tools");
        assert!(s.sub_string(50, 2).is_empty());
    }

    #[test]
    fn test_char_count() {
        assert_eq!(MotString::from("héllo").char_count(), 5);
        assert_eq!(MotString::from_vec(vec![b'a', 0xFF, b'b']).char_count(), 3);
        assert_eq!(MotString::empty().char_count(), 0);
    }

    #[test]
    fn test_invalid_bytes_hash_verbatim() {
        let a = MotString::from_vec(vec![b'a', 0xFF]);
        let b = MotString::from_vec(vec![b'A', 0xFF]);
        let c = MotString::from_vec(vec![b'A', 0xFE]);

        assert!(MotString::are_case_insensitive_equal(&a, &b));
        assert!(!MotString::are_case_insensitive_equal(&a, &c));
    }

    #[test]
    fn test_hash_map_keys_fold_case() {
        let mut prefixes = HashMap::new();
        prefixes.insert(MotString::from("Tools"), 1);

        assert_eq!(prefixes.get(&MotString::from_static("TOOLS")), Some(&1));
        assert_eq!(prefixes.get(&MotString::from_static("tools")), Some(&1));
        assert_eq!(prefixes.get(&MotString::from_static("tool")), None);

        let set: HashSet<MotString> = ["env", "ENV", "Env"].into_iter().map(MotString::from).collect();
        assert_eq!(set.len(), 1);
    }

    proptest! {
        #[test]
        fn metrics_are_idempotent(s in "\\PC{0,40}") {
            let a = MotString::from(s.as_str());
            let first = (a.hash_code(), a.char_count());
            let copy = MotString::from(s.as_str());
            prop_assert_eq!(first, (copy.hash_code(), copy.char_count()));
            prop_assert_eq!(first, (a.hash_code(), a.char_count()));
            prop_assert_eq!(a.char_count() as usize, s.chars().count());
        }

        #[test]
        fn ascii_case_changes_are_equal(s in "[a-zA-Z0-9_]{0,40}") {
            let lower = MotString::from(s.to_ascii_lowercase());
            let upper = MotString::from(s.to_ascii_uppercase());
            prop_assert!(MotString::are_case_insensitive_equal(&lower, &upper));
            prop_assert_eq!(lower.hash_code(), upper.hash_code());
            prop_assert_eq!(MotString::compare_case_insensitive(&lower, &upper), Ordering::Equal);
        }

        #[test]
        fn compare_matches_byte_order(a in "\\PC{0,20}", b in "\\PC{0,20}") {
            let ma = MotString::from(a.as_str());
            let mb = MotString::from(b.as_str());
            prop_assert_eq!(MotString::compare(&ma, &mb), a.as_bytes().cmp(b.as_bytes()));
            prop_assert_eq!(MotString::are_equal(&ma, &mb), a == b);
        }
    }
}
