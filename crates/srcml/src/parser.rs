/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Python parser using tree-sitter.
//!
//! This module lowers tree-sitter concrete syntax trees into the generic
//! [`Ast`]. It uses the bottom-up traversal from `srcml-treesitter-ast`.
//!
//! The lowering keeps what an abstract tree keeps and drops the rest:
//! comments and bare punctuation disappear (their text comes back through
//! gap filling), operator tokens become position-less leaves named after
//! Python's `ast` operator classes, and the module root carries no position
//! of its own so that it spans the entire file.

use crate::ast::{Ast, AstBuilder, Field, FieldValue, NodeData, NodeId};
use crate::error::{SrcmlError, SrcmlResult};
use srcml_source_map::{LineColumn, Position};
use srcml_treesitter_ast::{
    ChildResult, TraversePhase, bottomup_traverse_concrete_tree, topdown_traverse_concrete_tree,
};
use tree_sitter::{Node, Parser, Point};

/// Field name given to children that occupy no grammar field.
pub const UNNAMED_FIELD: &str = "children";

/// Intermediate representation during bottom-up traversal.
#[derive(Debug)]
enum Lowered {
    /// A node in the arena
    Node(NodeId),
    /// An anonymous token; its kind is its text
    Token(&'static str),
    /// Extras (comments, line continuations), which the tree omits
    Skip,
}

/// Parse Python source into a generic syntax tree.
///
/// # Errors
///
/// Returns [`SrcmlError::Syntax`] with the location of the first error or
/// missing node if the source does not parse cleanly. Python 2 statements
/// and operators, which the grammar still accepts, are rejected the same way.
pub fn parse_python(source: &str) -> SrcmlResult<Ast> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| SrcmlError::Grammar {
            message: e.to_string(),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| SrcmlError::Syntax {
            line: 1,
            column: 1,
            message: "tree-sitter parse failed".to_string(),
        })?;

    if let Some(err) = find_syntax_error(&tree, source.as_bytes()) {
        return Err(err);
    }
    if tree.root_node().has_error() {
        return Err(SrcmlError::Syntax {
            line: 1,
            column: 1,
            message: "unknown parse error".to_string(),
        });
    }

    let tree_root = tree.root_node().id();
    let mut builder = AstBuilder::new();
    let mut cursor = tree.walk();
    let lowered = bottomup_traverse_concrete_tree(
        &mut cursor,
        &mut |node, children, _input| lower_node(node, children, tree_root, &mut builder),
        source.as_bytes(),
    );

    let root = match lowered {
        Lowered::Node(id) => id,
        // The root of a Python tree is always a named `module`
        Lowered::Token(_) | Lowered::Skip => builder.alloc(NodeData::new("module")),
    };
    let ast = builder.finish(root);
    tracing::debug!(nodes = ast.len(), "lowered tree-sitter tree");
    Ok(ast)
}

/// Locate the first error, missing node or Python 2 construct, in document
/// order.
fn find_syntax_error(tree: &tree_sitter::Tree, source: &[u8]) -> Option<SrcmlError> {
    let mut found: Option<SrcmlError> = None;
    let mut cursor = tree.walk();
    topdown_traverse_concrete_tree(&mut cursor, &mut |node, phase| {
        if phase == TraversePhase::Exit || found.is_some() {
            return false;
        }
        let message = if node.is_missing() {
            format!("missing '{}'", node.kind())
        } else if node.is_error() {
            let text = node.utf8_text(source).unwrap_or("<invalid>");
            format!("unexpected '{}'", text.lines().next().unwrap_or(""))
        } else if let Some(message) = python2_construct(node, source) {
            message.to_string()
        } else {
            return true;
        };
        let start = node.start_position();
        found = Some(SrcmlError::Syntax {
            line: start.row + 1,
            column: start.column + 1,
            message,
        });
        false
    });
    found
}

/// Python 2 syntax that the tree-sitter grammar accepts but Python 3 does not.
fn python2_construct(node: &Node, source: &[u8]) -> Option<&'static str> {
    match node.kind() {
        // `print (x)` is a valid call that the grammar may read as a statement
        "print_statement" if !print_argument_is_parenthesized(node, source) => {
            Some("Python 2 print statement")
        }
        "exec_statement" => Some("Python 2 exec statement"),
        "<>" if !node.is_named() => Some("Python 2 '<>' operator; use '!='"),
        _ => None,
    }
}

fn print_argument_is_parenthesized(node: &Node, source: &[u8]) -> bool {
    let keyword_end = node.child(0).map_or(node.start_byte(), |keyword| keyword.end_byte());
    source
        .get(keyword_end..node.end_byte())
        .and_then(|rest| rest.iter().find(|byte| !byte.is_ascii_whitespace()))
        .is_some_and(|&byte| byte == b'(')
}

fn line_column(point: Point) -> LineColumn {
    LineColumn::new(point.row + 1, point.column)
}

/// The visitor function for bottom-up traversal.
fn lower_node(
    node: &Node,
    children: Vec<ChildResult<Lowered>>,
    tree_root: usize,
    builder: &mut AstBuilder,
) -> Lowered {
    if node.is_extra() {
        return Lowered::Skip;
    }
    if !node.is_named() {
        return Lowered::Token(node.kind());
    }

    let mut fields: Vec<Field> = Vec::new();
    for child in children {
        match (child.value, child.field) {
            (Lowered::Skip, _) => {}
            (Lowered::Node(id), Some(name)) => push_node(&mut fields, name, id, true),
            (Lowered::Node(id), None) => push_node(&mut fields, UNNAMED_FIELD, id, false),
            // Keywords and punctuation outside any field carry no information
            (Lowered::Token(_), None) => {}
            (Lowered::Token(token), Some(name)) => match operator_tag(node.kind(), token) {
                Some(tag) => {
                    let id = builder.alloc(NodeData::new(tag));
                    push_node(&mut fields, name, id, true);
                }
                None => fields.push(Field::new(name, FieldValue::Scalar(token.to_string()))),
            },
        }
    }

    let mut data = NodeData::new(node.kind());
    data.fields = fields;
    if node.id() != tree_root {
        data = data.with_position(Position::new(
            line_column(node.start_position()),
            line_column(node.end_position()),
        ));
    }
    Lowered::Node(builder.alloc(data))
}

/// Append a child to the field list.
///
/// A child joins the previous field when it has the same name, so repeated
/// fields become lists while fields stay in source order. A lone child of a
/// grammar field is a single-node field; unnamed children always form lists.
fn push_node(fields: &mut Vec<Field>, name: &str, id: NodeId, grammar_field: bool) {
    if let Some(last) = fields.last_mut().filter(|last| last.name == name) {
        match last.value {
            FieldValue::List(ref mut ids) => {
                ids.push(id);
                return;
            }
            FieldValue::Node(first) => {
                last.value = FieldValue::List(vec![first, id]);
                return;
            }
            FieldValue::Scalar(_) | FieldValue::Absent => {}
        }
    }

    let value = if grammar_field {
        FieldValue::Node(id)
    } else {
        FieldValue::List(vec![id])
    };
    fields.push(Field::new(name, value));
}

/// Name of the Python `ast` operator class for an operator token.
fn operator_tag(parent_kind: &str, token: &str) -> Option<&'static str> {
    match parent_kind {
        "binary_operator" => binary_operator_tag(token),
        "augmented_assignment" => token.strip_suffix('=').and_then(binary_operator_tag),
        "unary_operator" => match token {
            "+" => Some("UAdd"),
            "-" => Some("USub"),
            "~" => Some("Invert"),
            _ => None,
        },
        "boolean_operator" => match token {
            "and" => Some("And"),
            "or" => Some("Or"),
            _ => None,
        },
        "comparison_operator" => match token {
            "==" => Some("Eq"),
            "!=" => Some("NotEq"),
            "<" => Some("Lt"),
            "<=" => Some("LtE"),
            ">" => Some("Gt"),
            ">=" => Some("GtE"),
            "is" => Some("Is"),
            "is not" => Some("IsNot"),
            "in" => Some("In"),
            "not in" => Some("NotIn"),
            _ => None,
        },
        _ => None,
    }
}

fn binary_operator_tag(token: &str) -> Option<&'static str> {
    Some(match token {
        "+" => "Add",
        "-" => "Sub",
        "*" => "Mult",
        "@" => "MatMult",
        "/" => "Div",
        "%" => "Mod",
        "**" => "Pow",
        "<<" => "LShift",
        ">>" => "RShift",
        "|" => "BitOr",
        "^" => "BitXor",
        "&" => "BitAnd",
        "//" => "FloorDiv",
        _ => return None,
    })
}
