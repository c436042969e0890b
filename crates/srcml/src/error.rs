/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for conversion.
//!
//! User errors (unreadable input, bad encoding, syntax errors) and internal
//! errors (positions or spans that contradict the source) are kept apart, so
//! callers can tell a bad input from a defect.

use srcml_source_map::{DecodeError, LineColumn, OffsetError, SliceError, Span};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting a source file.
#[derive(Debug, Error)]
pub enum SrcmlError {
    /// The input file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not valid UTF-8.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The Python grammar could not be loaded into the parser.
    #[error("failed to load the Python grammar: {message}")]
    Grammar { message: String },

    /// The source does not parse as Python.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// A position or span contradicts the source text.
    #[error("internal consistency failure: {0}")]
    Internal(#[from] InternalError),
}

impl SrcmlError {
    /// Whether this error indicates a defect rather than a bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, SrcmlError::Internal(_))
    }
}

/// Invariant violations found while locating or serializing nodes.
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("node `{kind}` has an unusable position: {source}")]
    Offset {
        kind: String,
        #[source]
        source: OffsetError,
    },

    #[error("node `{kind}` at {at} ends before it begins: {span}")]
    InvertedSpan {
        kind: String,
        at: LineColumn,
        span: Span,
    },

    #[error("node `{kind}` reached serialization without a span")]
    MissingSpan { kind: String },

    #[error("text gap at {at} in node `{kind}` cannot be sliced: {source}")]
    Slice {
        kind: String,
        at: LineColumn,
        #[source]
        source: SliceError,
    },

    #[error("failed to write XML: {0}")]
    Xml(String),

    #[error("serialized XML does not reproduce the source (first difference at byte {offset})")]
    RoundTrip { offset: usize },
}

/// Result type for conversion operations.
pub type SrcmlResult<T> = Result<T, SrcmlError>;
