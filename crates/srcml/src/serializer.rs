/*
 * serializer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Lossless serialization of a located tree into XML elements.
//!
//! Each located node becomes one element. The source text between a node's
//! start and its first located descendant becomes the element's text, and
//! the text after each descendant (up to the next one, or the node's end)
//! becomes that descendant's tail. Every byte of the node's span ends up in
//! exactly one text or tail.

use crate::ast::{Ast, NodeId};
use crate::error::{InternalError, SrcmlResult};
use crate::spans::SpanTable;
use crate::xml::XmlElement;
use srcml_source_map::{LineColumn, OffsetTable, SourceBuffer, Span};

/// Options for [`serialize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Annotate every element with `beg` and `end` byte offsets.
    pub spans: bool,
}

/// Descendants of `id` that become its direct XML children, in source order.
///
/// A child with a span is taken as is. A child without one contributes its
/// own locatable descendants in its place, so wrappers without a textual
/// footprint never appear in the output.
pub fn locatable_descendants(ast: &Ast, spans: &SpanTable, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    collect_locatable(ast, spans, id, &mut out);
    out
}

fn collect_locatable(ast: &Ast, spans: &SpanTable, id: NodeId, out: &mut Vec<NodeId>) {
    for child in ast.child_nodes(id) {
        if spans.get(child).is_some() {
            out.push(child);
        } else {
            collect_locatable(ast, spans, child, out);
        }
    }
}

/// Serialize the tree rooted at `ast.root()`.
///
/// Elements are built with an explicit work stack, so nesting depth is not
/// limited by the call stack.
///
/// # Errors
///
/// Fails with an internal error if spans overlap, are out of order, or fall
/// outside their parent, since any output would then drop or repeat text.
pub fn serialize(
    ast: &Ast,
    spans: &SpanTable,
    source: &SourceBuffer,
    offsets: &OffsetTable,
    options: SerializeOptions,
) -> SrcmlResult<XmlElement> {
    let serializer = Serializer {
        ast,
        spans,
        source,
        offsets,
        options,
    };
    let root = serializer.run()?;
    tracing::debug!(tag = %root.tag, "serialized tree");
    Ok(root)
}

enum Step {
    /// Build the element for a node; `tail` is the text that follows it.
    Open { id: NodeId, tail: String },
    /// All children of the innermost open element are done.
    Close,
}

struct Serializer<'a> {
    ast: &'a Ast,
    spans: &'a SpanTable,
    source: &'a SourceBuffer,
    offsets: &'a OffsetTable,
    options: SerializeOptions,
}

impl Serializer<'_> {
    fn span_of(&self, id: NodeId) -> Result<Span, InternalError> {
        self.spans.get(id).ok_or_else(|| InternalError::MissingSpan {
            kind: self.ast.kind(id).to_string(),
        })
    }

    /// Source text of a gap inside node `owner`.
    fn gap(&self, owner: NodeId, beg: usize, end: usize) -> Result<String, InternalError> {
        self.source
            .slice(Span::new(beg, end))
            .map(str::to_string)
            .map_err(|source| InternalError::Slice {
                kind: self.ast.kind(owner).to_string(),
                at: self.line_column(beg),
                source,
            })
    }

    /// Line and column of an offset, clamped to the end of the buffer.
    fn line_column(&self, offset: usize) -> LineColumn {
        let offset = offset.min(self.offsets.total_length());
        self.offsets
            .offset_to_line_column(offset)
            .unwrap_or(LineColumn::new(1, 0))
    }

    fn run(&self) -> SrcmlResult<XmlElement> {
        let root = self.ast.root();
        let mut open: Vec<XmlElement> = Vec::new();
        let mut work = vec![Step::Open {
            id: root,
            tail: String::new(),
        }];

        while let Some(step) = work.pop() {
            match step {
                Step::Open { id, tail } => {
                    let element = self.start_element(id, tail, &mut work)?;
                    open.push(element);
                }
                Step::Close => {
                    let Some(element) = open.pop() else {
                        break;
                    };
                    match open.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                }
            }
        }

        Err(InternalError::MissingSpan {
            kind: self.ast.kind(root).to_string(),
        }
        .into())
    }

    /// Start the element for `id` and schedule its children.
    ///
    /// The text before the first child and every child's tail are sliced
    /// here, so each child is pushed together with the text that follows it.
    fn start_element(
        &self,
        id: NodeId,
        tail: String,
        work: &mut Vec<Step>,
    ) -> SrcmlResult<XmlElement> {
        let span = self.span_of(id)?;
        let mut element = XmlElement::new(self.ast.kind(id));
        element.tail = tail;
        if self.options.spans {
            element.attributes = vec![
                ("beg".to_string(), span.beg.to_string()),
                ("end".to_string(), span.end.to_string()),
            ];
        }
        work.push(Step::Close);

        let children = locatable_descendants(self.ast, self.spans, id);
        let Some(&first) = children.first() else {
            element.text = self.gap(id, span.beg, span.end)?;
            return Ok(element);
        };

        element.text = self.gap(id, span.beg, self.span_of(first)?.beg)?;
        let mut steps = Vec::with_capacity(children.len());
        for (i, &child) in children.iter().enumerate() {
            let child_end = self.span_of(child)?.end;
            let next_beg = match children.get(i + 1) {
                Some(&next) => self.span_of(next)?.beg,
                None => span.end,
            };
            steps.push(Step::Open {
                id: child,
                tail: self.gap(id, child_end, next_beg)?,
            });
        }
        // Reversed so the first child is built first
        work.extend(steps.into_iter().rev());
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstBuilder, FieldValue, NodeData};
    use crate::error::SrcmlError;
    use crate::spans::infer_spans;
    use pretty_assertions::assert_eq;
    use srcml_source_map::{Position, SliceError};

    fn at(beg: usize, end: usize) -> Position {
        Position::new(LineColumn::new(1, beg), LineColumn::new(1, end))
    }

    fn module(builder: &mut AstBuilder, body: FieldValue) -> NodeId {
        builder.alloc(NodeData::new("module").with_field("body", body))
    }

    fn run(ast: &Ast, source: &str, options: SerializeOptions) -> SrcmlResult<XmlElement> {
        let buffer = SourceBuffer::from(source);
        let offsets = OffsetTable::new(buffer.as_bytes());
        let spans = infer_spans(ast, &offsets)?;
        serialize(ast, &spans, &buffer, &offsets, options)
    }

    /// `f(a, b)  # call` as call(function, arguments-wrapper(args list))
    fn call_tree() -> (Ast, NodeId) {
        let mut builder = AstBuilder::new();
        let f = builder.alloc(NodeData::new("identifier").with_position(at(0, 1)));
        let a = builder.alloc(NodeData::new("identifier").with_position(at(2, 3)));
        let b = builder.alloc(NodeData::new("identifier").with_position(at(5, 6)));
        let args = builder.alloc(
            NodeData::new("arguments")
                .with_field("args", FieldValue::List(vec![a, b])),
        );
        let call = builder.alloc(
            NodeData::new("call")
                .with_position(at(0, 7))
                .with_field("function", FieldValue::Node(f))
                .with_field("arguments", FieldValue::Node(args)),
        );
        let root = module(&mut builder, FieldValue::List(vec![call]));
        (builder.finish(root), args)
    }

    #[test]
    fn test_interleaves_text_and_tails() {
        let (ast, _) = call_tree();
        let source = "f(a, b)  # call\n";
        let root = run(&ast, source, SerializeOptions::default()).unwrap();

        assert_eq!(
            root.to_xml_string().unwrap(),
            "<module><call><identifier>f</identifier>(<arguments><identifier>a</identifier>, \
             <identifier>b</identifier></arguments>)</call>  # call\n</module>"
        );
        assert_eq!(root.text_content(), source);
    }

    #[test]
    fn test_wrapper_with_span_is_emitted() {
        // The `arguments` wrapper has children, so it is located and kept
        let (ast, args) = call_tree();
        let buffer = SourceBuffer::from("f(a, b)\n");
        let spans = infer_spans(&ast, &OffsetTable::new(buffer.as_bytes())).unwrap();
        assert_eq!(spans.get(args), Some(Span::new(2, 6)));

        let call = ast.child_nodes(ast.root()).next().unwrap();
        let kinds: Vec<&str> = locatable_descendants(&ast, &spans, call)
            .into_iter()
            .map(|id| ast.kind(id))
            .collect();
        assert_eq!(kinds, vec!["identifier", "arguments"]);
    }

    #[test]
    fn test_unlocated_wrappers_are_flattened() {
        let mut builder = AstBuilder::new();
        let a = builder.alloc(NodeData::new("identifier").with_position(at(0, 1)));
        let add = builder.alloc(NodeData::new("Add"));
        let b = builder.alloc(NodeData::new("identifier").with_position(at(4, 5)));
        let empty = builder.alloc(
            NodeData::new("keywords")
                .with_field("items", FieldValue::List(vec![])),
        );
        let binary = builder.alloc(
            NodeData::new("binary_operator")
                .with_position(at(0, 5))
                .with_field("left", FieldValue::Node(a))
                .with_field("operator", FieldValue::Node(add))
                .with_field("right", FieldValue::Node(b))
                .with_field("keywords", FieldValue::Node(empty))
                .with_field("type_comment", FieldValue::Absent),
        );
        let root = module(&mut builder, FieldValue::Node(binary));
        let ast = builder.finish(root);

        let xml = run(&ast, "a + b", SerializeOptions::default()).unwrap();
        assert_eq!(
            xml.to_xml_string().unwrap(),
            "<module><binary_operator><identifier>a</identifier> + \
             <identifier>b</identifier></binary_operator></module>"
        );
    }

    #[test]
    fn test_empty_root() {
        let mut builder = AstBuilder::new();
        let root = builder.alloc(NodeData::new("module"));
        let ast = builder.finish(root);

        let xml = run(&ast, "", SerializeOptions::default()).unwrap();
        assert_eq!(xml.tag, "module");
        assert_eq!(xml.text, "");
        assert!(xml.children.is_empty());
        assert_eq!(xml.to_xml_string().unwrap(), "<module/>");
    }

    #[test]
    fn test_span_attributes() {
        let (ast, _) = call_tree();
        let xml = run(&ast, "f(a, b)\n", SerializeOptions { spans: true }).unwrap();
        assert_eq!(
            xml.attributes,
            vec![
                ("beg".to_string(), "0".to_string()),
                ("end".to_string(), "8".to_string()),
            ]
        );
        assert_eq!(
            xml.children[0].attributes,
            vec![
                ("beg".to_string(), "0".to_string()),
                ("end".to_string(), "7".to_string()),
            ]
        );
    }

    #[test]
    fn test_overlapping_children_fail() {
        let mut builder = AstBuilder::new();
        let a = builder.alloc(NodeData::new("identifier").with_position(at(0, 3)));
        let b = builder.alloc(NodeData::new("identifier").with_position(at(2, 5)));
        let root = module(&mut builder, FieldValue::List(vec![a, b]));
        let ast = builder.finish(root);

        let err = run(&ast, "abcdef", SerializeOptions::default()).unwrap_err();
        assert!(err.is_internal());
        assert!(err.to_string().contains("text gap at 1:3"), "{err}");
        assert!(matches!(
            err,
            SrcmlError::Internal(InternalError::Slice {
                source: SliceError::Inverted { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_gap_errors_report_line_and_column() {
        let mut builder = AstBuilder::new();
        let first = builder.alloc(NodeData::new("pass_statement").with_position(Position::new(
            LineColumn::new(1, 0),
            LineColumn::new(2, 2),
        )));
        let second = builder.alloc(NodeData::new("pass_statement").with_position(Position::new(
            LineColumn::new(2, 1),
            LineColumn::new(2, 3),
        )));
        let root = module(&mut builder, FieldValue::List(vec![first, second]));
        let ast = builder.finish(root);

        let err = run(&ast, "a\nbcd\n", SerializeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            SrcmlError::Internal(InternalError::Slice { at, .. }) if at == LineColumn::new(2, 2)
        ));
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let depth = 100_000;
        let source = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        let mut builder = AstBuilder::new();
        let mut current =
            builder.alloc(NodeData::new("identifier").with_position(at(depth, depth + 1)));
        for level in (0..depth).rev() {
            current = builder.alloc(
                NodeData::new("parenthesized_expression")
                    .with_position(at(level, 2 * depth + 1 - level))
                    .with_field("children", FieldValue::List(vec![current])),
            );
        }
        let root = module(&mut builder, FieldValue::Node(current));
        let ast = builder.finish(root);

        let xml = run(&ast, &source, SerializeOptions::default()).unwrap();
        assert_eq!(xml.children.len(), 1);
        assert_eq!(xml.text_content(), source);
    }

    #[test]
    fn test_child_outside_parent_fails() {
        let mut builder = AstBuilder::new();
        let a = builder.alloc(NodeData::new("identifier").with_position(at(4, 6)));
        let parent = builder.alloc(
            NodeData::new("expression_statement")
                .with_position(at(0, 5))
                .with_field("children", FieldValue::List(vec![a])),
        );
        let root = module(&mut builder, FieldValue::Node(parent));
        let ast = builder.finish(root);

        let err = run(&ast, "abcdef", SerializeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            SrcmlError::Internal(InternalError::Slice { ref kind, .. })
                if kind == "expression_statement"
        ));
    }
}
