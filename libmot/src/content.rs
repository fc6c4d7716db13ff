//! File content and the line index used for diagnostics.
//!
//! A `FileContent` owns the bytes of one loaded file. The lexer records the
//! byte offset of every line it starts, which lets any span be turned into a
//! line and column later without re-scanning the file.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::LoadError;
use crate::utf8;

/// Default upper bound for [`FileContent::load`].
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Options for loading a file from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Files larger than this many bytes are rejected.
    pub max_size: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// The bytes of a source file plus its incrementally built line index.
#[derive(Debug)]
pub struct FileContent {
    filename: String,
    data: Arc<[u8]>,
    line_starts: RefCell<Vec<u32>>,
}

/// Line information for a byte offset. All values are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionDetails {
    pub line_number: u32,
    pub line_start: u32,
    /// Code points between the line start and the position.
    pub column: u32,
}

/// A human-facing position: file name with one-based line and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub filename: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" line {}:{}", self.filename, self.line, self.column)
    }
}

impl FileContent {
    /// Wraps bytes which are already in memory.
    ///
    /// # Panics
    ///
    /// Panics if `data` is larger than `u32::MAX` bytes; offsets are stored as `u32`.
    pub fn new(filename: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        let data = data.into();
        assert!(
            u32::try_from(data.len()).is_ok(),
            "file content cannot exceed u32::MAX bytes"
        );

        Self {
            filename: filename.into(),
            data,
            line_starts: RefCell::new(Vec::new()),
        }
    }

    /// Reads a file from disk, refusing anything larger than `options.max_size`.
    pub fn load(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let path_name = path.display().to_string();
        if path_name.is_empty() {
            return Err(LoadError::EmptyFilename);
        }

        let file = fs::File::open(path).map_err(|source| LoadError::Open {
            path: path_name.clone(),
            source,
        })?;

        let size = file
            .metadata()
            .map_err(|source| LoadError::Read {
                path: path_name.clone(),
                source,
            })?
            .len();

        let max_size = options.max_size.min(u32::MAX as u64);
        if size > max_size {
            return Err(LoadError::TooLarge {
                path: path_name,
                max_size: options.max_size,
            });
        }

        let mut data = Vec::with_capacity(size as usize);
        file.take(max_size + 1)
            .read_to_end(&mut data)
            .map_err(|source| LoadError::Read {
                path: path_name.clone(),
                source,
            })?;

        // The file may have changed between the metadata call and the read.
        if data.len() as u64 != size {
            let source = io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes, read {}", size, data.len()),
            );
            return Err(LoadError::Read {
                path: path_name,
                source,
            });
        }

        debug!(path = %path_name, bytes = data.len(), "loaded file");
        Ok(Self::new(path_name, data))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The backing buffer, for zero-copy strings which point into the file.
    pub fn shared_data(&self) -> &Arc<[u8]> {
        &self.data
    }

    pub fn size(&self) -> u32 {
        self.data.len() as u32
    }

    /// Number of lines recorded so far.
    pub fn line_count(&self) -> u32 {
        self.line_starts.borrow().len() as u32
    }

    /// Snapshot of the recorded line starts.
    pub fn line_starts(&self) -> Ref<'_, [u32]> {
        Ref::map(self.line_starts.borrow(), |v| v.as_slice())
    }

    /// Records the start of the next line and returns its zero-based number.
    /// Lines must be marked in increasing order, beginning at offset zero.
    pub fn mark_line(&self, position: u32) -> u32 {
        let mut lines = self.line_starts.borrow_mut();
        debug_assert!(
            lines.last().map_or(position == 0, |&last| position > last),
            "line starts must begin at zero and strictly increase"
        );
        debug_assert!(position <= self.size());

        let line_number = lines.len() as u32;
        lines.push(position);
        line_number
    }

    /// Clears the line index. Every new lexer over this content does this first.
    pub fn reset_line_markers(&self) {
        self.line_starts.borrow_mut().clear();
    }

    /// Start offset of `line_number`, or the file size past the known lines.
    pub fn line_start_position(&self, line_number: u32) -> u32 {
        self.line_starts
            .borrow()
            .get(line_number as usize)
            .copied()
            .unwrap_or_else(|| self.size())
    }

    /// Finds the line containing `position`. The last known line extends to the
    /// end of the file. With no recorded lines every field is zero.
    pub fn position_details(&self, position: u32) -> PositionDetails {
        let lines = self.line_starts.borrow();
        if lines.is_empty() {
            return PositionDetails::default();
        }

        debug_assert_eq!(lines[0], 0);

        // Index of the last line start <= position.
        let index = lines.partition_point(|&start| start <= position) - 1;
        let line_start = lines[index];

        let end = position.min(self.size());
        let column = if end > line_start {
            utf8::count_characters(&self.data[line_start as usize..end as usize])
        } else {
            0
        };

        PositionDetails {
            line_number: index as u32,
            line_start,
            column,
        }
    }

    /// One-based location of `position`, for error messages.
    pub fn location(&self, position: u32) -> Location {
        let details = self.position_details(position);
        Location {
            filename: self.filename.clone(),
            line: details.line_number + 1,
            column: details.column + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn content_with_lines(text: &str) -> FileContent {
        let content = FileContent::new("test.mot", text.as_bytes().to_vec());
        content.mark_line(0);
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                content.mark_line(i as u32 + 1);
            }
        }
        content
    }

    #[test]
    fn test_empty_index_is_all_zero() {
        let content = FileContent::new("test.mot", b"abc".to_vec());
        assert_eq!(content.position_details(2), PositionDetails::default());
    }

    #[test]
    fn test_position_details() {
        let content = content_with_lines("one\ntwo\nthree");
        assert_eq!(
            content.position_details(0),
            PositionDetails { line_number: 0, line_start: 0, column: 0 }
        );
        assert_eq!(
            content.position_details(5),
            PositionDetails { line_number: 1, line_start: 4, column: 1 }
        );
        assert_eq!(
            content.position_details(13),
            PositionDetails { line_number: 2, line_start: 8, column: 5 }
        );
    }

    #[test]
    fn test_column_counts_code_points() {
        let content = content_with_lines("héllo: wörld");
        // "héllo" is six bytes but five characters
        assert_eq!(content.position_details(6).column, 5);
    }

    #[test]
    fn test_mark_line_returns_index() {
        let content = FileContent::new("test.mot", b"a\nb\n".to_vec());
        assert_eq!(content.mark_line(0), 0);
        assert_eq!(content.mark_line(2), 1);
        assert_eq!(content.line_count(), 2);
        content.reset_line_markers();
        assert_eq!(content.line_count(), 0);
    }

    #[test]
    fn test_line_start_position_past_end() {
        let content = content_with_lines("a\nb");
        assert_eq!(content.line_start_position(1), 2);
        assert_eq!(content.line_start_position(5), 3);
    }

    #[test]
    fn test_location_is_one_based() {
        let content = content_with_lines("a\n  b");
        let location = content.location(4);
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 3);
        assert_eq!(location.to_string(), "\"test.mot\" line 2:3");
    }

    #[test]
    fn test_load_missing_file() {
        let err = FileContent::load("/nonexistent/profile.mot", LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[test]
    fn test_load_too_large() {
        let path = std::env::temp_dir().join(format!("libmot-too-large-{}.mot", std::process::id()));
        fs::write(&path, b"PROFILE big\n").unwrap();
        let result = FileContent::load(&path, LoadOptions { max_size: 4 });
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(LoadError::TooLarge { max_size: 4, .. })));
    }

    #[test]
    fn test_load_reads_file() {
        let path = std::env::temp_dir().join(format!("libmot-load-{}.mot", std::process::id()));
        fs::write(&path, b"PROFILE small\n").unwrap();
        let result = FileContent::load(&path, LoadOptions::default());
        fs::remove_file(&path).unwrap();
        let content = result.unwrap();
        assert_eq!(content.data(), b"PROFILE small\n");
        assert_eq!(content.filename(), path.display().to_string());
    }

    proptest! {
        #[test]
        fn position_details_is_monotonic(text in "[a-z \n]{0,200}") {
            let content = content_with_lines(&text);
            let mut last_line = 0;
            for p in 0..=text.len() as u32 {
                let details = content.position_details(p);
                prop_assert!(details.line_start <= p);
                prop_assert!(details.line_number >= last_line);
                let next = content.line_start_position(details.line_number + 1);
                prop_assert!(p < next || p == content.size());
                last_line = details.line_number;
            }
        }
    }
}
