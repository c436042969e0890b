/*
 * lib.rs
 *
 * Copyright (c) 2025 Posit, PBC
 *
 * srcml-treesitter-ast: Generic tree-sitter traversal utilities.
 *
 * This crate provides the traversal infrastructure the srcml lowering is
 * built on:
 *
 * - Top-down traversal with enter/exit phases
 * - Bottom-up traversal that hands each node the results of its children,
 *   together with the grammar field each child occupies
 */

pub mod traversals;

// Re-export commonly used items at crate root
pub use traversals::{
    BottomUpTraversePhase, ChildResult, TraversePhase, bottomup_traverse_concrete_tree,
    topdown_traverse_concrete_tree,
};
