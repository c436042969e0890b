//! Source buffers and position arithmetic for srcml
//!
//! This crate owns the raw text of a single source file and the arithmetic
//! that turns parser-reported positions into byte offsets into that text.
//!
//! # Overview
//!
//! The core types are:
//! - [`SourceBuffer`]: The decoded source text, sliced by byte range
//! - [`OffsetTable`]: Converts `(line, column)` positions into byte offsets
//! - [`Span`]: A half-open byte range `[beg, end)` into a [`SourceBuffer`]
//!
//! # Example
//!
//! ```rust
//! use srcml_source_map::*;
//!
//! let buffer = SourceBuffer::from_bytes(b"x = 1\ny = 2\n".to_vec()).unwrap();
//! let table = OffsetTable::new(buffer.as_bytes());
//!
//! let beg = table.to_offset(LineColumn::new(2, 0)).unwrap();
//! let end = table.to_offset(LineColumn::new(2, 5)).unwrap();
//! assert_eq!(buffer.slice(Span::new(beg, end)).unwrap(), "y = 2");
//! ```

pub mod buffer;
pub mod offsets;
pub mod types;

// Re-export main types
pub use buffer::{DecodeError, SliceError, SourceBuffer};
pub use offsets::{OffsetError, OffsetTable};
pub use types::{LineColumn, Position, Span};
