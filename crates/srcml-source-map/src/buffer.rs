//! The immutable source text of one run

use crate::types::Span;
use thiserror::Error;

/// Source bytes that are not valid UTF-8
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("source is not valid UTF-8: invalid byte sequence at offset {valid_up_to}")]
pub struct DecodeError {
    /// Length of the longest valid prefix
    pub valid_up_to: usize,
}

/// A byte range that cannot be cut out of the buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SliceError {
    #[error("span {span} is inverted")]
    Inverted { span: Span },

    #[error("span {span} runs past the end of the {len}-byte source")]
    OutOfBounds { span: Span, len: usize },

    #[error("span {span} does not fall on character boundaries")]
    NotCharBoundary { span: Span },
}

/// Decoded source text
///
/// The buffer is validated as UTF-8 once, at construction, so every slice on
/// character boundaries is a `&str` view into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    text: String,
}

impl SourceBuffer {
    /// Take ownership of raw bytes, failing if they are not UTF-8
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        String::from_utf8(bytes)
            .map(|text| SourceBuffer { text })
            .map_err(|err| DecodeError {
                valid_up_to: err.utf8_error().valid_up_to(),
            })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The text between two byte offsets
    pub fn slice(&self, span: Span) -> Result<&str, SliceError> {
        if !span.is_ordered() {
            return Err(SliceError::Inverted { span });
        }
        if span.end > self.text.len() {
            return Err(SliceError::OutOfBounds {
                span,
                len: self.text.len(),
            });
        }
        self.text
            .get(span.beg..span.end)
            .ok_or(SliceError::NotCharBoundary { span })
    }
}

impl From<String> for SourceBuffer {
    fn from(text: String) -> Self {
        SourceBuffer { text }
    }
}

impl From<&str> for SourceBuffer {
    fn from(text: &str) -> Self {
        SourceBuffer {
            text: text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_valid_bytes() {
        let buffer = SourceBuffer::from_bytes(b"x = 1\n".to_vec()).unwrap();
        assert_eq!(buffer.as_str(), "x = 1\n");
        assert_eq!(buffer.len(), 6);
    }

    #[test]
    fn test_invalid_utf8_reports_offset() {
        let err = SourceBuffer::from_bytes(b"ok = 1\n\xff\xfe".to_vec()).unwrap_err();
        assert_eq!(err, DecodeError { valid_up_to: 7 });
    }

    #[test]
    fn test_slice() {
        let buffer = SourceBuffer::from("print('hi')");
        assert_eq!(buffer.slice(Span::new(0, 5)).unwrap(), "print");
        assert_eq!(buffer.slice(Span::new(11, 11)).unwrap(), "");
    }

    #[test]
    fn test_slice_errors() {
        let buffer = SourceBuffer::from("é = 1");

        assert_eq!(
            buffer.slice(Span::new(3, 1)),
            Err(SliceError::Inverted {
                span: Span::new(3, 1)
            })
        );
        assert_eq!(
            buffer.slice(Span::new(0, 7)),
            Err(SliceError::OutOfBounds {
                span: Span::new(0, 7),
                len: 6
            })
        );
        // 'é' occupies bytes 0..2
        assert_eq!(
            buffer.slice(Span::new(1, 3)),
            Err(SliceError::NotCharBoundary {
                span: Span::new(1, 3)
            })
        );
    }
}
