//! Source map for managing source files and computing source locations.
//!
//! This module provides the [`SourceMap`] type for managing source files
//! and computing line/column information from byte offsets. Line starts are
//! precomputed once per file, so location queries are binary searches.

use std::sync::Arc;

use super::{FileId, Span};

/// A source file with its content and metadata
///
/// # Examples
///
/// ```
/// use homc_util::span::SourceFile;
///
/// let file = SourceFile::new(0, "main.hom", "fun main() {}");
/// assert_eq!(file.name(), "main.hom");
/// assert_eq!(file.content(), "fun main() {}");
/// ```
#[derive(Clone)]
pub struct SourceFile {
    /// Unique file identifier
    id: FileId,
    /// File name (path or display name)
    name: String,
    /// File content
    content: Arc<str>,
    /// Precomputed line start offsets
    line_starts: Arc<[usize]>,
}

/// One line's share of a multi-line span
///
/// Produced by [`SourceFile::line_spans`]; columns are 1-based and measured
/// in bytes from the line start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineSpan {
    /// Line number (1-based)
    pub line: usize,
    /// Column where the span enters this line (1-based)
    pub start_column: usize,
    /// Column just past the span on this line (1-based, exclusive)
    pub end_column: usize,
}

impl SourceFile {
    /// Create a new source file
    pub fn new(id: usize, name: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        let content = content.into();
        let line_starts = Self::compute_line_starts(&content);
        Self {
            id: FileId(id),
            name: name.into(),
            content,
            line_starts,
        }
    }

    fn compute_line_starts(content: &str) -> Arc<[usize]> {
        let mut line_starts = vec![0];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        line_starts.into()
    }

    /// Get the file identifier
    #[inline]
    pub fn id(&self) -> FileId {
        self.id
    }

    /// Get the file name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the file content
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the total number of lines
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the byte offset where a line starts (0-indexed line number)
    #[inline]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Convert a byte offset to (line, column) coordinates
    ///
    /// Line and column are 1-indexed. Column is measured in bytes from the
    /// start of the line.
    ///
    /// # Examples
    ///
    /// ```
    /// use homc_util::span::SourceFile;
    ///
    /// let file = SourceFile::new(0, "main.hom", "fun main() {}");
    /// assert_eq!(file.offset_to_line_col(4), (1, 5));
    /// ```
    pub fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => (line + 1, 1),
            Err(insert_point) => {
                let line = insert_point - 1;
                let line_start = self.line_starts.get(line).copied().unwrap_or(0);
                (line + 1, offset - line_start + 1)
            }
        }
    }

    /// Get a specific source line (1-indexed), without its line terminator
    pub fn line_at(&self, line: usize) -> Option<&str> {
        let start = self.line_start(line.checked_sub(1)?)?;
        let end = self.line_start(line).unwrap_or(self.content.len());
        let line_content = &self.content[start..end];
        Some(line_content.trim_end_matches(['\n', '\r']))
    }

    /// Extract a substring from the file content
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or not on character boundaries.
    pub fn extract(&self, range: std::ops::Range<usize>) -> &str {
        &self.content[range]
    }

    /// Split a span into its per-line sub-spans
    ///
    /// A single-line span yields one [`LineSpan`]; a multi-line span yields
    /// one entry per touched line, with the first entry starting at the
    /// span's start column and the last one ending at the span's end column.
    /// The diagnostic renderer uses this to draw multi-line squiggles.
    ///
    /// # Examples
    ///
    /// ```
    /// use homc_util::span::{SourceFile, Span};
    ///
    /// let file = SourceFile::new(0, "t.hom", "ab\ncdef\ngh");
    /// let parts = file.line_spans(Span::new(1, 9, 1, 2));
    /// assert_eq!(parts.len(), 3);
    /// assert_eq!(parts[0].line, 1);
    /// assert_eq!(parts[2].end_column, 2);
    /// ```
    pub fn line_spans(&self, span: Span) -> Vec<LineSpan> {
        let (begin_line, begin_col) = self.offset_to_line_col(span.start);
        let (end_line, end_col) = self.offset_to_line_col(span.end);

        if begin_line == end_line {
            return vec![LineSpan {
                line: begin_line,
                start_column: begin_col,
                end_column: end_col.max(begin_col + 1),
            }];
        }

        let mut parts = Vec::with_capacity(end_line - begin_line + 1);
        let first_len = self
            .line_at(begin_line)
            .map(|l| l.len() + 1)
            .unwrap_or(begin_col);
        parts.push(LineSpan {
            line: begin_line,
            start_column: begin_col,
            end_column: first_len.max(begin_col + 1),
        });
        for line in begin_line + 1..end_line {
            let len = self.line_at(line).map(|l| l.len()).unwrap_or(0);
            parts.push(LineSpan {
                line,
                start_column: 1,
                end_column: len + 1,
            });
        }
        parts.push(LineSpan {
            line: end_line,
            start_column: 1,
            end_column: end_col.max(2),
        });
        parts
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("line_count", &self.line_count())
            .finish()
    }
}

/// A source map managing the session's source files
///
/// # Examples
///
/// ```
/// use homc_util::span::SourceMap;
///
/// let mut map = SourceMap::new();
/// let file_id = map.add_file("main.hom", "fun main() {}");
/// let file = map.get(file_id).unwrap();
/// assert_eq!(file.name(), "main.hom");
/// ```
#[derive(Default)]
pub struct SourceMap {
    files: Vec<Arc<SourceFile>>,
}

impl SourceMap {
    /// Create a new empty source map
    #[inline]
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Add a new source file, returning its [`FileId`]
    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<Arc<str>>) -> FileId {
        let id = self.files.len();
        let file = SourceFile::new(id, name, content);
        let file_id = file.id();
        self.files.push(Arc::new(file));
        file_id
    }

    /// Get a source file by its ID
    #[inline]
    pub fn get(&self, id: FileId) -> Option<Arc<SourceFile>> {
        self.files.get(id.0).cloned()
    }

    /// Get the number of files in the source map
    #[inline]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}
