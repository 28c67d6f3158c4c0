//! Source positions, ranges and declaration locations.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use text_size::TextRange;
pub use text_size::TextSize;

/// Line and column of a declaration boundary, as recorded by the compiler.
///
/// Stored 0-indexed; displayed 1-indexed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
pub struct LineCol {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column (in UTF-8 bytes, not characters)
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// 1-indexed line, as shown to users.
    #[inline]
    pub const fn line_one_indexed(self) -> u32 {
        self.line + 1
    }

    #[inline]
    pub const fn col_one_indexed(self) -> u32 {
        self.col + 1
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

// ============================================================================
// LOCATION
// ============================================================================

/// Where a declaration lives: a file plus a start/end position.
///
/// A *ghost* location has no real backing position. It is synthesised when
/// only a unit-level answer exists (for example a module alias that points
/// at a whole compilation unit) and always sits at the start of the file.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File name as recorded by whoever produced the location. May be
    /// relative (as stored in compiled artifacts) until resolved.
    pub file: PathBuf,
    /// Byte range in the file.
    pub range: TextRange,
    /// Start position.
    pub start: LineCol,
    /// End position.
    pub end: LineCol,
    #[serde(default)]
    pub ghost: bool,
}

impl Location {
    /// Create a real (non-ghost) location.
    pub fn new(file: impl Into<PathBuf>, range: TextRange, start: LineCol, end: LineCol) -> Self {
        Self {
            file: file.into(),
            range,
            start,
            end,
            ghost: false,
        }
    }

    /// Zero-width ghost location at the very start of `file`.
    pub fn ghost_at_start(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            range: TextRange::empty(TextSize::from(0)),
            start: LineCol::default(),
            end: LineCol::default(),
            ghost: true,
        }
    }

    /// Same position, different file.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = file.into();
        self
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn is_ghost(&self) -> bool {
        self.ghost
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.start)?;
        if self.ghost {
            write!(f, " (ghost)")?;
        }
        Ok(())
    }
}
