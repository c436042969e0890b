//! Line offset table for position-to-offset conversion

use crate::types::LineColumn;
use thiserror::Error;

/// A parser position that does not fit the buffer it was reported against
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OffsetError {
    #[error("line {line} is outside the source (table has {entries} entries)")]
    LineOutOfRange { line: usize, entries: usize },

    #[error("column {column} exceeds the {line_len}-byte length of line {line}")]
    ColumnOutOfRange {
        line: usize,
        column: usize,
        line_len: usize,
    },
}

/// Cumulative line lengths of a source buffer
///
/// Entry `k` is the total byte length of lines `1..=k`, so entry `k - 1` is
/// the byte offset at which line `k` starts. The table always begins with
/// `0`. Line terminators stay in the length of the line they end, which
/// keeps a byte column within a line unambiguous even for `\r\n` sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    offsets: Vec<usize>,

    /// Number of `\n`-separated rows, as a parser counts them
    line_count: usize,
}

impl OffsetTable {
    /// Build the table with a single scan of the buffer
    ///
    /// # Example
    ///
    /// ```
    /// use srcml_source_map::OffsetTable;
    ///
    /// let table = OffsetTable::new(b"ab\ncde\nf");
    /// assert_eq!(table.offsets(), &[0, 3, 7, 8]);
    /// ```
    pub fn new(bytes: &[u8]) -> Self {
        let mut offsets = vec![0];
        offsets.extend(memchr::memchr_iter(b'\n', bytes).map(|idx| idx + 1));
        let line_count = offsets.len();

        // An unterminated final line still contributes its length
        if bytes.len() > offsets[offsets.len() - 1] {
            offsets.push(bytes.len());
        }

        OffsetTable {
            offsets,
            line_count,
        }
    }

    /// Convert a 1-indexed line and byte column to an absolute byte offset
    ///
    /// Returns `offsets[line - 1] + column`, after checking that the line
    /// exists and the column does not run past the end of that line.
    pub fn to_offset(&self, at: LineColumn) -> Result<usize, OffsetError> {
        let LineColumn { line, column } = at;
        if line == 0 || line > self.offsets.len() {
            return Err(OffsetError::LineOutOfRange {
                line,
                entries: self.offsets.len(),
            });
        }

        let line_len = self.line_len(line);
        if column > line_len {
            return Err(OffsetError::ColumnOutOfRange {
                line,
                column,
                line_len,
            });
        }

        Ok(self.offsets[line - 1] + column)
    }

    /// Convert a byte offset back to a line and byte column
    ///
    /// Uses binary search over the line starts. Returns None if the offset is
    /// past the end of the buffer.
    pub fn offset_to_line_column(&self, offset: usize) -> Option<LineColumn> {
        if offset > self.total_length() {
            return None;
        }

        let starts = &self.offsets[..self.line_count];
        // Number of lines starting at or before `offset`; never zero since
        // the first line starts at 0
        let line = starts.partition_point(|&start| start <= offset);

        Some(LineColumn {
            line,
            column: offset - starts[line - 1],
        })
    }

    /// Byte length of a 1-indexed line, terminator included
    ///
    /// The entry past the last terminated line has length zero.
    pub fn line_len(&self, line: usize) -> usize {
        let Some(idx) = line.checked_sub(1) else {
            return 0;
        };
        match (self.offsets.get(idx), self.offsets.get(line)) {
            (Some(start), Some(end)) => end - start,
            _ => 0,
        }
    }

    /// The raw cumulative offsets
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Get the number of lines in the buffer
    pub fn line_count(&self) -> usize {
        // If there are no newlines, there's 1 line
        // If there are n newlines, there are n+1 lines
        self.line_count
    }

    /// Get the total length of the buffer in bytes
    pub fn total_length(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }
}
