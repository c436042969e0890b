/*
 * pipeline.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! End-to-end conversion: bytes in, XML document out.

use crate::error::{InternalError, SrcmlError, SrcmlResult};
use crate::parser::parse_python;
use crate::serializer::{SerializeOptions, serialize};
use crate::spans::infer_spans;
use crate::xml::text_content_of;
use srcml_source_map::{OffsetTable, SourceBuffer};
use std::path::Path;

/// Options for a conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub serialize: SerializeOptions,
    /// Re-read the produced document and check it reproduces the source.
    pub verify: bool,
}

/// Convert the file at `path`.
pub fn convert_file(path: &Path, options: &ConvertOptions) -> SrcmlResult<String> {
    let bytes = std::fs::read(path).map_err(|source| SrcmlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read source");
    convert(bytes, options)
}

/// Convert raw source bytes, which must be UTF-8.
pub fn convert(bytes: Vec<u8>, options: &ConvertOptions) -> SrcmlResult<String> {
    let buffer = SourceBuffer::from_bytes(bytes)?;
    convert_buffer(&buffer, options)
}

/// Convert already-decoded source text.
pub fn convert_str(source: &str, options: &ConvertOptions) -> SrcmlResult<String> {
    convert_buffer(&SourceBuffer::from(source), options)
}

fn convert_buffer(buffer: &SourceBuffer, options: &ConvertOptions) -> SrcmlResult<String> {
    let offsets = OffsetTable::new(buffer.as_bytes());
    tracing::debug!(lines = offsets.line_count(), "built offset table");

    let ast = parse_python(buffer.as_str())?;
    let spans = infer_spans(&ast, &offsets)?;
    let root = serialize(&ast, &spans, buffer, &offsets, options.serialize)?;
    let xml = root.to_xml_string()?;

    if options.verify {
        verify_round_trip(&xml, buffer.as_str())?;
        tracing::debug!("round trip verified");
    }
    Ok(xml)
}

/// Check that the character data of `xml` is exactly `source`.
pub fn verify_round_trip(xml: &str, source: &str) -> Result<(), InternalError> {
    let text = text_content_of(xml)?;
    if text == source {
        return Ok(());
    }
    let offset = text
        .bytes()
        .zip(source.bytes())
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| text.len().min(source.len()));
    Err(InternalError::RoundTrip { offset })
}
