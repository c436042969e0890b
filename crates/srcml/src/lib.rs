/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Lossless conversion of Python source into XML.
//!
//! The output is one XML element per syntax tree node that occupies source
//! text. Whitespace, comments and punctuation that the tree does not keep are
//! placed in the text and tails of the surrounding elements, so concatenating
//! all character data of the document gives back the input byte for byte.
//!
//! # Architecture
//!
//! Conversion runs in four steps:
//!
//! 1. [`srcml_source_map::SourceBuffer`] decodes the input and
//!    [`srcml_source_map::OffsetTable`] indexes its lines.
//! 2. [`parser::parse_python`] parses with tree-sitter and lowers the result
//!    into a generic [`Ast`].
//! 3. [`spans::infer_spans`] assigns a byte span to every node, bottom-up.
//! 4. [`serializer::serialize`] builds the [`XmlElement`] tree top-down,
//!    filling the gaps between children with source text.
//!
//! # Example
//!
//! ```
//! use srcml::{ConvertOptions, convert_str};
//!
//! let xml = convert_str("x = 1\n", &ConvertOptions::default()).unwrap();
//! assert!(xml.starts_with("<module>"));
//! assert!(xml.contains("<identifier>x</identifier> = <integer>1</integer>"));
//! ```

pub mod ast;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod serializer;
pub mod spans;
pub mod xml;

// Re-export main types at crate root
pub use ast::{Ast, AstBuilder, Field, FieldValue, NodeData, NodeId};
pub use error::{InternalError, SrcmlError, SrcmlResult};
pub use parser::parse_python;
pub use pipeline::{ConvertOptions, convert, convert_file, convert_str, verify_round_trip};
pub use serializer::{SerializeOptions, locatable_descendants, serialize};
pub use spans::{SpanTable, infer_spans};
pub use xml::{XmlElement, text_content_of};
