//! Parsing front-end.
//!
//! Wraps the tree-sitter Python grammar and lowers its concrete syntax tree
//! into the closed [`Node`] set the walk dispatches on. Grammar constructs
//! outside that set survive lowering as [`Node::Unsupported`] so the walk
//! can report them instead of failing.

mod python;

use anyhow::{Context as _, Result};

use crate::node::Node;

/// A reusable Python parser. Not `Sync`; parallel drivers create one per
/// worker.
pub struct PythonParser {
    parser: tree_sitter::Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .context("failed to load the Python grammar")?;
        Ok(Self { parser })
    }

    /// Parse one module's source text and lower it to walkable nodes.
    pub fn parse(&mut self, source: &str) -> Result<Vec<Node>> {
        let tree = self
            .parser
            .parse(source, None)
            .context("tree-sitter produced no syntax tree")?;
        Ok(python::lower_module(tree.root_node(), source))
    }
}
