/*
 * xml.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! XML element tree and its serialization.
//!
//! [`XmlElement`] follows the text/tail model: an element's `text` is the
//! content before its first child, and each child's `tail` is the content
//! between that child and the next sibling (or the parent's end tag).
//! Writing goes through `quick-xml`.

use crate::error::InternalError;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::borrow::Cow;

/// An element of the output document.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    /// Content before the first child.
    pub text: String,
    pub children: Vec<XmlElement>,
    /// Content after this element, before the next sibling or the parent's end.
    pub tail: String,
}

impl XmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        XmlElement {
            tag: tag.into(),
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
            tail: String::new(),
        }
    }

    /// Concatenate all text inside this element in document order.
    ///
    /// The element's own tail is outside it and not included.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        let mut pending = vec![Piece::Element(self)];
        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Element(element) => {
                    out.push_str(&element.text);
                    for child in element.children.iter().rev() {
                        pending.push(Piece::Text(&child.tail));
                        pending.push(Piece::Element(child));
                    }
                }
                Piece::Text(text) => out.push_str(text),
                Piece::End(_) => {}
            }
        }
    }

    /// Serialize this element as a standalone document.
    pub fn to_xml_string(&self) -> Result<String, InternalError> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| InternalError::Xml(e.to_string()))
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), InternalError> {
        let mut pending = vec![Piece::Element(self)];
        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Element(element) => {
                    let mut start = BytesStart::new(element.tag.as_str());
                    for (name, value) in &element.attributes {
                        start.push_attribute((name.as_str(), value.as_str()));
                    }

                    if element.text.is_empty() && element.children.is_empty() {
                        emit(writer, Event::Empty(start))?;
                        continue;
                    }

                    emit(writer, Event::Start(start))?;
                    write_text(writer, &element.text)?;
                    pending.push(Piece::End(&element.tag));
                    for child in element.children.iter().rev() {
                        pending.push(Piece::Text(&child.tail));
                        pending.push(Piece::Element(child));
                    }
                }
                Piece::Text(text) => write_text(writer, text)?,
                Piece::End(tag) => emit(writer, Event::End(BytesEnd::new(tag)))?,
            }
        }
        Ok(())
    }
}

// Deep documents would otherwise be freed recursively, one frame per level
impl Drop for XmlElement {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut element) = pending.pop() {
            pending.append(&mut element.children);
        }
    }
}

/// Work items for walking an element tree in document order.
enum Piece<'a> {
    Element(&'a XmlElement),
    Text(&'a str),
    End(&'a str),
}

fn emit<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), InternalError> {
    writer
        .write_event(event)
        .map_err(|e| InternalError::Xml(e.to_string()))
}

fn write_text<W: std::io::Write>(writer: &mut Writer<W>, text: &str) -> Result<(), InternalError> {
    if text.is_empty() {
        return Ok(());
    }
    emit(writer, Event::Text(BytesText::from_escaped(escape_text(text))))
}

/// Escape character data.
///
/// Only `&`, `<` and `>` are escaped as markup. `\r` is also written as a
/// character reference, since XML readers normalise literal `\r\n` and `\r`
/// to `\n`.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    let escaped = partial_escape(text);
    if escaped.contains('\r') {
        Cow::Owned(escaped.replace('\r', "&#13;"))
    } else {
        escaped
    }
}

/// Read serialized XML back and concatenate its character data.
///
/// Used to check that a written document still carries the exact source.
pub fn text_content_of(xml: &str) -> Result<String, InternalError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text_start = false;
    reader.config_mut().trim_text_end = false;

    let mut out = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| InternalError::Xml(err.to_string()))?;
                out.push_str(&text);
            }
            Ok(Event::CData(e)) => {
                out.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(InternalError::Xml(format!(
                    "error at byte {}: {}",
                    reader.buffer_position(),
                    err
                )));
            }
        }
    }
    Ok(out)
}
