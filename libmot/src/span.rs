//! Byte ranges within a file.

use std::fmt;

use crate::content::{FileContent, Location, PositionDetails};
use crate::string::MotString;

/// A half-open `[start, end)` byte range within a [`FileContent`].
#[derive(Clone, Copy)]
pub struct FileSpan<'c> {
    content: &'c FileContent,
    start: u32,
    end: u32,
}

impl<'c> FileSpan<'c> {
    pub fn new(content: &'c FileContent, start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start {} is after end {}", start, end);
        debug_assert!(end <= content.size(), "span end {} is past the end of the file", end);
        Self {
            content,
            start,
            end,
        }
    }

    /// An empty span at `position`.
    pub fn empty(content: &'c FileContent, position: u32) -> Self {
        Self::new(content, position, position)
    }

    pub fn content(&self) -> &'c FileContent {
        self.content
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The raw bytes covered by this span.
    pub fn bytes(&self) -> &'c [u8] {
        &self.content.data()[self.start as usize..self.end as usize]
    }

    /// A string sharing the file's buffer.
    pub fn to_mot_string(&self) -> MotString {
        MotString::from_shared(self.content.shared_data().clone(), self.start, self.len())
    }

    /// The smallest span covering both `self` and `other`.
    pub fn cover(&self, other: &FileSpan<'c>) -> FileSpan<'c> {
        debug_assert!(std::ptr::eq(self.content, other.content));
        FileSpan::new(
            self.content,
            self.start.min(other.start),
            self.end.max(other.end),
        )
    }

    pub fn position_details(&self) -> PositionDetails {
        self.content.position_details(self.start)
    }

    pub fn location(&self) -> Location {
        self.content.location(self.start)
    }
}

impl PartialEq for FileSpan<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.content, other.content) && self.start == other.start && self.end == other.end
    }
}

impl Eq for FileSpan<'_> {}

impl fmt::Debug for FileSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
