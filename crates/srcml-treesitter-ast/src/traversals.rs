/*
 * traversals.rs
 *
 * Copyright (c) 2025 Posit, PBC
 *
 * Generic traversal helpers for tree-sitter TreeCursor.
 *
 * Both traversals are iterative, so arbitrarily deep parse trees cannot
 * exhaust the call stack.
 */

use tree_sitter::{Node, TreeCursor};

/// Phase of tree traversal - whether we're entering or exiting a node.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum TraversePhase {
    Enter,
    Exit,
}

/// Top-down traversal of a tree-sitter tree.
///
/// Visits each node twice: once on entry (before children) and once on exit (after children).
/// The visitor returns `true` to descend into children, `false` to skip them.
///
/// # Example
/// ```ignore
/// topdown_traverse_concrete_tree(&mut cursor, &mut |node, phase| {
///     println!("{:?}: {}", phase, node.kind());
///     true // descend into children
/// });
/// ```
pub fn topdown_traverse_concrete_tree<F>(cursor: &mut TreeCursor, visitor: &mut F)
where
    F: for<'a> FnMut(&'a Node, TraversePhase) -> bool,
{
    let mut stack: Vec<usize> = vec![0];
    while let Some(step) = stack.pop() {
        match step {
            0 => {
                stack.push(2); // exit
                if visitor(&cursor.node(), TraversePhase::Enter) && cursor.goto_first_child() {
                    stack.push(1); // go to parent
                    stack.push(3); // check for next sibling
                    stack.push(0); // recurse
                }
            }
            1 => {
                cursor.goto_parent();
            }
            2 => {
                visitor(&cursor.node(), TraversePhase::Exit);
            }
            3 => {
                if cursor.goto_next_sibling() {
                    stack.push(3); // continue sibling traversal
                    stack.push(0); // recurse
                }
            }
            _ => unreachable!(),
        }
    }
}

/// The result produced for one child, tagged with where it sits in its parent.
#[derive(Debug)]
pub struct ChildResult<T> {
    /// The child's node kind
    pub kind: &'static str,
    /// The grammar field the child occupies in its parent, if any
    pub field: Option<&'static str>,
    /// What the visitor produced for the child
    pub value: T,
}

/// Phase tracking for bottom-up traversal, holding accumulated children.
#[derive(Debug)]
pub enum BottomUpTraversePhase<'a, T: std::fmt::Debug> {
    Enter(Node<'a>),
    GoToSiblings(Node<'a>, Vec<ChildResult<T>>), // accumulated children
    Exit(Node<'a>),
}

/// Bottom-up traversal of a tree-sitter tree.
///
/// Processes children before parents, accumulating results from children
/// (in source order, with their field names) and passing them to the
/// parent's visitor call.
///
/// # Type Parameters
/// * `F` - The visitor function type
/// * `T` - The result type produced by the visitor for each node
///
/// # Arguments
/// * `cursor` - A tree-sitter cursor positioned at the starting node
/// * `visitor` - A function called for each node with the node, its
///   children's results, and the input bytes
/// * `input_bytes` - The source text as bytes
///
/// # Returns
/// The visitor's result for the starting node.
///
/// # Example
/// ```ignore
/// let root = bottomup_traverse_concrete_tree(
///     &mut cursor,
///     &mut |node, children, input| MyNode::from_children(node, children, input),
///     input_bytes,
/// );
/// ```
pub fn bottomup_traverse_concrete_tree<F, T: std::fmt::Debug>(
    cursor: &mut TreeCursor,
    visitor: &mut F,
    input_bytes: &[u8],
) -> T
where
    F: for<'a> FnMut(&'a Node, Vec<ChildResult<T>>, &[u8]) -> T,
{
    let mut stack: Vec<BottomUpTraversePhase<T>> =
        vec![BottomUpTraversePhase::Enter(cursor.node())];
    let start_depth = cursor.depth();

    while let Some(top) = stack.pop() {
        match top {
            BottomUpTraversePhase::Enter(node) => {
                stack.push(BottomUpTraversePhase::GoToSiblings(node, Vec::new()));
                if cursor.goto_first_child() {
                    stack.push(BottomUpTraversePhase::Enter(cursor.node()));
                } else {
                    stack.push(BottomUpTraversePhase::Exit(node));
                }
            }
            BottomUpTraversePhase::GoToSiblings(node, vec) => {
                stack.push(BottomUpTraversePhase::GoToSiblings(node, vec));
                if cursor.goto_next_sibling() {
                    stack.push(BottomUpTraversePhase::Enter(cursor.node()));
                } else {
                    stack.push(BottomUpTraversePhase::Exit(node));
                    cursor.goto_parent();
                }
            }
            BottomUpTraversePhase::Exit(node) => {
                let Some(BottomUpTraversePhase::GoToSiblings(_, children)) = stack.pop() else {
                    panic!("Expected GoToSiblings phase on stack");
                };
                // The cursor sits on `node` here, so its field name is the
                // one `node` has in its parent
                let field = if cursor.depth() > start_depth {
                    cursor.field_name()
                } else {
                    None
                };
                let value = visitor(&node, children, input_bytes);
                match stack.last_mut() {
                    None => return value, // we are done
                    Some(BottomUpTraversePhase::GoToSiblings(_, next_children)) => {
                        next_children.push(ChildResult {
                            kind: node.kind(),
                            field,
                            value,
                        });
                    }
                    _ => {
                        panic!("Expected GoToSiblings phase on stack");
                    }
                }
            }
        }
    }
    unreachable!("bottom-up traversal always exits through the starting node")
}
