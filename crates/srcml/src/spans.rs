/*
 * spans.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Span inference.
//!
//! Assigns a byte span to every node of an [`Ast`] in one post-order pass.
//! Nodes with a parser-supplied position are converted through the
//! [`OffsetTable`]; the root covers the whole buffer; any other node covers
//! its first through last located child. Position-less nodes without located
//! children stay unlocated.

use crate::ast::{Ast, NodeId};
use crate::error::{InternalError, SrcmlResult};
use srcml_source_map::{OffsetTable, Span};

/// Spans indexed by [`NodeId`], kept beside the tree rather than in it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanTable {
    spans: Vec<Option<Span>>,
}

impl SpanTable {
    /// The span of `id`, if it could be located.
    pub fn get(&self, id: NodeId) -> Option<Span> {
        self.spans.get(id.index()).copied().flatten()
    }

    /// Number of nodes that received a span.
    pub fn located(&self) -> usize {
        self.spans.iter().filter(|span| span.is_some()).count()
    }
}

enum Visit {
    Enter(NodeId),
    Exit(NodeId),
}

/// Compute spans for every node reachable from the root.
///
/// The traversal keeps its own stack, so tree depth is not limited by the
/// call stack.
pub fn infer_spans(ast: &Ast, offsets: &OffsetTable) -> SrcmlResult<SpanTable> {
    let mut table = SpanTable {
        spans: vec![None; ast.len()],
    };

    let mut stack = vec![Visit::Enter(ast.root())];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(id) => {
                stack.push(Visit::Exit(id));
                // Reversed so children are popped in source order
                let children: Vec<NodeId> = ast.child_nodes(id).collect();
                stack.extend(children.into_iter().rev().map(Visit::Enter));
            }
            Visit::Exit(id) => {
                let span = locate(ast, id, &table, offsets)?;
                table.spans[id.index()] = span;
            }
        }
    }

    tracing::debug!(
        located = table.located(),
        nodes = ast.len(),
        "inferred node spans"
    );
    Ok(table)
}

/// Span of a single node, given the spans of its children.
fn locate(
    ast: &Ast,
    id: NodeId,
    table: &SpanTable,
    offsets: &OffsetTable,
) -> SrcmlResult<Option<Span>> {
    let node = ast.node(id);

    // The parser's own bounds win, even over the children
    if let Some(position) = node.position {
        let to_offset = |at| {
            offsets.to_offset(at).map_err(|source| InternalError::Offset {
                kind: node.kind.clone(),
                source,
            })
        };
        let span = Span::new(to_offset(position.start)?, to_offset(position.end)?);
        if !span.is_ordered() {
            return Err(InternalError::InvertedSpan {
                kind: node.kind.clone(),
                at: position.start,
                span,
            }
            .into());
        }
        return Ok(Some(span));
    }

    if id == ast.root() {
        return Ok(Some(Span::new(0, offsets.total_length())));
    }

    let mut located = ast.child_nodes(id).filter_map(|child| table.get(child));
    let Some(first) = located.next() else {
        tracing::trace!(
            kind = %node.kind,
            "no position and no located children; leaving unlocated"
        );
        return Ok(None);
    };
    let last = located.last().unwrap_or(first);
    Ok(Some(Span::new(first.beg, last.end)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstBuilder, FieldValue, NodeData};
    use crate::error::SrcmlError;
    use srcml_source_map::{LineColumn, Position};

    fn at(line: usize, beg: usize, end: usize) -> Position {
        Position::new(LineColumn::new(line, beg), LineColumn::new(line, end))
    }

    fn module(builder: &mut AstBuilder, body: FieldValue) -> NodeId {
        builder.alloc(NodeData::new("module").with_field("body", body))
    }

    #[test]
    fn test_root_covers_whole_buffer() {
        let source = "\n\nx = 1  # c\n\n";
        let mut builder = AstBuilder::new();
        let x = builder.alloc(NodeData::new("identifier").with_position(at(3, 0, 1)));
        let root = module(&mut builder, FieldValue::List(vec![x]));
        let ast = builder.finish(root);

        let spans = infer_spans(&ast, &OffsetTable::new(source.as_bytes())).unwrap();
        assert_eq!(spans.get(root), Some(Span::new(0, source.len())));
        assert_eq!(spans.get(x), Some(Span::new(2, 3)));
    }

    #[test]
    fn test_wrapper_takes_first_and_last_child() {
        let source = "f(a, b)\n";
        let mut builder = AstBuilder::new();
        let a = builder.alloc(NodeData::new("identifier").with_position(at(1, 2, 3)));
        let b = builder.alloc(NodeData::new("identifier").with_position(at(1, 5, 6)));
        let wrapper = builder.alloc(
            NodeData::new("arguments")
                .with_field("args", FieldValue::List(vec![a]))
                .with_field("more", FieldValue::Node(b)),
        );
        let root = module(&mut builder, FieldValue::Node(wrapper));
        let ast = builder.finish(root);

        let spans = infer_spans(&ast, &OffsetTable::new(source.as_bytes())).unwrap();
        assert_eq!(spans.get(wrapper), Some(Span::new(2, 6)));
    }

    #[test]
    fn test_explicit_position_takes_precedence() {
        let source = "(a)\n";
        let mut builder = AstBuilder::new();
        let a = builder.alloc(NodeData::new("identifier").with_position(at(1, 1, 2)));
        let parens = builder.alloc(
            NodeData::new("parenthesized_expression")
                .with_position(at(1, 0, 3))
                .with_field("children", FieldValue::List(vec![a])),
        );
        let root = module(&mut builder, FieldValue::Node(parens));
        let ast = builder.finish(root);

        let spans = infer_spans(&ast, &OffsetTable::new(source.as_bytes())).unwrap();
        assert_eq!(spans.get(parens), Some(Span::new(0, 3)));
    }

    #[test]
    fn test_positionless_leaf_stays_unlocated() {
        let source = "a + b\n";
        let mut builder = AstBuilder::new();
        let a = builder.alloc(NodeData::new("identifier").with_position(at(1, 0, 1)));
        let add = builder.alloc(NodeData::new("Add"));
        let empty = builder.alloc(
            NodeData::new("arguments")
                .with_field("args", FieldValue::List(vec![])),
        );
        let root = builder.alloc(
            NodeData::new("module")
                .with_field("left", FieldValue::Node(a))
                .with_field("op", FieldValue::Node(add))
                .with_field("args", FieldValue::Node(empty)),
        );
        let ast = builder.finish(root);

        let spans = infer_spans(&ast, &OffsetTable::new(source.as_bytes())).unwrap();
        assert_eq!(spans.get(add), None);
        assert_eq!(spans.get(empty), None);
        assert_eq!(spans.located(), 2);
    }

    #[test]
    fn test_position_outside_buffer_is_internal_error() {
        let mut builder = AstBuilder::new();
        let x = builder.alloc(NodeData::new("identifier").with_position(at(5, 0, 1)));
        let root = module(&mut builder, FieldValue::Node(x));
        let ast = builder.finish(root);

        let err = infer_spans(&ast, &OffsetTable::new(b"x\n")).unwrap_err();
        assert!(err.is_internal());
        assert!(matches!(
            err,
            SrcmlError::Internal(InternalError::Offset { ref kind, .. }) if kind == "identifier"
        ));
    }

    #[test]
    fn test_inverted_position_is_internal_error() {
        let mut builder = AstBuilder::new();
        let x = builder.alloc(NodeData::new("identifier").with_position(at(1, 3, 1)));
        let root = module(&mut builder, FieldValue::Node(x));
        let ast = builder.finish(root);

        let err = infer_spans(&ast, &OffsetTable::new(b"abcd\n")).unwrap_err();
        assert!(matches!(
            err,
            SrcmlError::Internal(InternalError::InvertedSpan { span, at, .. })
                if span == Span::new(3, 1) && at == LineColumn::new(1, 3)
        ));
    }

    #[test]
    fn test_deep_tree_does_not_overflow() {
        let depth = 200_000;
        let source = "x\n";
        let mut builder = AstBuilder::new();
        let mut current = builder.alloc(NodeData::new("identifier").with_position(at(1, 0, 1)));
        for _ in 0..depth {
            current = builder.alloc(
                NodeData::new("wrapper")
                    .with_field("inner", FieldValue::Node(current)),
            );
        }
        let root = module(&mut builder, FieldValue::Node(current));
        let ast = builder.finish(root);

        let spans = infer_spans(&ast, &OffsetTable::new(source.as_bytes())).unwrap();
        assert_eq!(spans.get(current), Some(Span::new(0, 1)));
        assert_eq!(spans.located(), depth + 2);
    }
}
