//! Position tracking for wrapped symbols.
//!
//! The oracle reports physical positions as byte offsets into a file; the
//! symbol layer exposes them as 1-based line/column [`Location`]s.

use std::fmt;
use std::sync::Arc;

use text_size::TextSize;

/// A zero-based line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Maps byte offsets of one file to line/column pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Starting offset of each line (`line_starts[0]` is always 0)
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        let bytes = text.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            match b {
                b'\n' => line_starts.push(TextSize::from((i + 1) as u32)),
                // lone \r (old Mac); \r\n is handled by the \n arm
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => {
                    line_starts.push(TextSize::from((i + 1) as u32))
                }
                _ => {}
            }
        }
        Self {
            line_starts,
            len: TextSize::from(text.len() as u32),
        }
    }

    /// Convert a byte offset to a line/column pair.
    ///
    /// Returns `None` for offsets past the end of the file.
    pub fn line_col(&self, offset: TextSize) -> Option<LineCol> {
        if offset > self.len {
            return None;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };
        let start = self.line_starts[line];
        Some(LineCol::new(line as u32, u32::from(offset - start)))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Where a wrapped symbol physically lives.
///
/// `Absent` is the sentinel for anything without a physical source position
/// (compiled input, compiler-synthesized members); it is never an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    File {
        path: Arc<str>,
        /// 1-based line
        line: u32,
        /// 1-based column
        column: u32,
    },
    Absent,
}

impl Location {
    pub fn file(path: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self::File {
            path: path.into(),
            line,
            column,
        }
    }

    /// Build a location from a zero-based line/column pair.
    pub fn from_line_col(path: impl Into<Arc<str>>, lc: LineCol) -> Self {
        Self::file(path, lc.line + 1, lc.col + 1)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Location::Absent)
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Location::File { path, .. } => Some(path),
            Location::Absent => None,
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            Location::File { line, .. } => Some(*line),
            Location::Absent => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File { path, line, column } => write!(f, "{path}:{line}:{column}"),
            Location::Absent => f.write_str("<no location>"),
        }
    }
}
