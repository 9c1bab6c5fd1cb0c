//! Typed syntax-tree nodes consumed by the walk.
//!
//! The front-end lowers a tree-sitter parse into this closed set of shapes.
//! Anything the grammar produces outside the set arrives as [`Node::Unsupported`]
//! carrying the foreign kind string, so the walk can report it and move on.

use serde::Serialize;
use std::fmt;

/// How a reference is used at its occurrence site.
///
/// This is a closed set promised by the front-end: a name is read (`print(a)`),
/// written (`a = 1`), or deleted (`del a`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessRole {
    Load,
    Store,
    Delete,
}

impl AccessRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessRole::Load => "load",
            AccessRole::Store => "store",
            AccessRole::Delete => "delete",
        }
    }
}

impl fmt::Display for AccessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Numeric subtype of a number literal.
///
/// Recorded in the per-line kind view instead of the generic "number" tag,
/// since the finer distinction is the analytically useful one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberType {
    Integer,
    Float,
    Complex,
}

impl NumberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberType::Integer => "int",
            NumberType::Float => "float",
            NumberType::Complex => "complex",
        }
    }
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A keyword argument at a call site.
///
/// An absent `name` is the double-starred expansion (`fn(**opts)`).
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordNode {
    pub name: Option<String>,
    pub value: Node,
    pub line: usize,
}

/// A lowered syntax-tree node.
///
/// Lines are 1-indexed. Child fields are stored in the source order the
/// handlers dispatch them in.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A bare name reference.
    Name {
        line: usize,
        id: String,
        role: AccessRole,
    },
    /// A starred reference (`*var`), wrapping exactly one value node.
    Starred {
        line: usize,
        value: Box<Node>,
        role: AccessRole,
    },
    /// A number literal; `raw` keeps the literal text verbatim.
    Number {
        line: usize,
        raw: String,
        subtype: NumberType,
    },
    /// A string literal with its cooked text.
    Str { line: usize, value: String },
    /// A tuple literal or tuple target pattern.
    Tuple {
        line: usize,
        elements: Vec<Node>,
        role: AccessRole,
    },
    /// A list literal or list target pattern.
    List {
        line: usize,
        elements: Vec<Node>,
        role: AccessRole,
    },
    /// A set literal. Sets cannot be assignment targets, so no role.
    Set { line: usize, elements: Vec<Node> },
    /// A call: callee, positional arguments, keyword arguments.
    Call {
        line: usize,
        func: Box<Node>,
        args: Vec<Node>,
        keywords: Vec<KeywordNode>,
    },
    /// An inline conditional (`a if b else c`).
    IfExp {
        line: usize,
        test: Box<Node>,
        body: Box<Node>,
        orelse: Box<Node>,
    },
    /// An assignment with one value and one or more targets.
    Assign {
        line: usize,
        targets: Vec<Node>,
        value: Box<Node>,
    },
    /// Any shape outside the supported set; `kind` is the foreign shape tag.
    Unsupported { line: usize, kind: String },
}

/// The shape tag of a [`Node`], used as the dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeShape {
    Name,
    Starred,
    Number,
    Str,
    Tuple,
    List,
    Set,
    Call,
    IfExp,
    Assign,
    Unsupported,
}

/// Every shape that resolves to a real handler, in registration order.
pub const REGISTERED_SHAPES: &[NodeShape] = &[
    NodeShape::Name,
    NodeShape::Starred,
    NodeShape::Number,
    NodeShape::Str,
    NodeShape::Tuple,
    NodeShape::List,
    NodeShape::Set,
    NodeShape::Call,
    NodeShape::IfExp,
    NodeShape::Assign,
];

impl Node {
    /// Source line of the node (1-indexed).
    pub fn line(&self) -> usize {
        match self {
            Node::Name { line, .. }
            | Node::Starred { line, .. }
            | Node::Number { line, .. }
            | Node::Str { line, .. }
            | Node::Tuple { line, .. }
            | Node::List { line, .. }
            | Node::Set { line, .. }
            | Node::Call { line, .. }
            | Node::IfExp { line, .. }
            | Node::Assign { line, .. }
            | Node::Unsupported { line, .. } => *line,
        }
    }

    /// Shape tag for registry dispatch.
    pub fn shape(&self) -> NodeShape {
        match self {
            Node::Name { .. } => NodeShape::Name,
            Node::Starred { .. } => NodeShape::Starred,
            Node::Number { .. } => NodeShape::Number,
            Node::Str { .. } => NodeShape::Str,
            Node::Tuple { .. } => NodeShape::Tuple,
            Node::List { .. } => NodeShape::List,
            Node::Set { .. } => NodeShape::Set,
            Node::Call { .. } => NodeShape::Call,
            Node::IfExp { .. } => NodeShape::IfExp,
            Node::Assign { .. } => NodeShape::Assign,
            Node::Unsupported { .. } => NodeShape::Unsupported,
        }
    }

    /// The foreign kind tag of an unsupported node, if this is one.
    pub fn unsupported_kind(&self) -> Option<&str> {
        match self {
            Node::Unsupported { kind, .. } => Some(kind),
            _ => None,
        }
    }
}
