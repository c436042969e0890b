/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Generic syntax tree types.
//!
//! Every grammar production is represented by the same [`NodeData`]: a type
//! tag, an optional parser-supplied position, and an ordered list of named
//! fields. Passes walk fields through [`Ast::child_nodes`] and need no
//! knowledge of individual productions.
//!
//! Nodes live in an arena owned by [`Ast`] and are addressed by [`NodeId`],
//! so derived data (such as spans) can be kept in parallel tables instead of
//! being written into the tree.

use srcml_source_map::Position;
use std::fmt;

/// Index of a node in its [`Ast`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct NodeId(u32);

impl NodeId {
    /// Construct an identifier from a raw value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Retrieve the underlying index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// The value held by one field of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Non-node data, such as an operator token's text.
    Scalar(String),
    /// A single child node.
    Node(NodeId),
    /// An ordered list of child nodes.
    List(Vec<NodeId>),
    /// An optional field with no value.
    Absent,
}

/// A named field of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Field {
            name: name.into(),
            value,
        }
    }

    /// The child nodes held by this field, in order.
    pub fn nodes(&self) -> &[NodeId] {
        match &self.value {
            FieldValue::Node(id) => std::slice::from_ref(id),
            FieldValue::List(ids) => ids,
            FieldValue::Scalar(_) | FieldValue::Absent => &[],
        }
    }
}

/// One node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// Type tag: the grammar production name.
    pub kind: String,
    /// Start and end as reported by the parser, if it reported any.
    pub position: Option<Position>,
    /// Ordered fields.
    pub fields: Vec<Field>,
}

impl NodeData {
    pub fn new(kind: impl Into<String>) -> Self {
        NodeData {
            kind: kind.into(),
            position: None,
            fields: Vec::new(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.push(Field::new(name, value));
        self
    }
}

/// A complete tree: the node arena and its root.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Ast {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Borrow the node stored at `id`.
    ///
    /// Identifiers are only handed out by the builder that produced this
    /// tree, so they are always in range.
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &str {
        &self.node(id).kind
    }

    /// Immediate child nodes of `id`, field by field, with list fields
    /// flattened in order. Scalars and absent fields are skipped.
    pub fn child_nodes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .fields
            .iter()
            .flat_map(|field| field.nodes().iter().copied())
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Bump allocator for building an [`Ast`] bottom-up.
///
/// Children are allocated before the parents that refer to them; the last
/// node passed to [`AstBuilder::finish`] becomes the root.
#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes: Vec<NodeData>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node and return its identifier.
    pub fn alloc(&mut self, node: NodeData) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn finish(self, root: NodeId) -> Ast {
        Ast {
            nodes: self.nodes,
            root,
        }
    }
}
