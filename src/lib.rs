//! Pyfacts - Python source statistics extractor.
//!
//! Pyfacts parses Python sources with tree-sitter, lowers the concrete
//! syntax into a closed set of typed nodes, and walks them to build
//! per-file statistics: every recognized construct becomes an entity with a
//! usage record describing how it participates in its surroundings.
//!
//! # Architecture
//!
//! - `parser`: tree-sitter front-end lowering source text to [`Node`]s
//! - `node`: the closed node shapes the walk dispatches on
//! - `handlers`: one handler per shape plus the dispatch registry
//! - `entity` / `usage`: the entity records and their capability model
//! - `context`: the dual-stack traversal context
//! - `stats`: the per-module aggregator with category and line views
//! - `walk`: the top-level per-module driver
//! - `files`: source discovery and the sequential/parallel batch drivers
//! - `report`: JSON and pretty rendering
//!
//! Soft failures (shapes outside the registered set, capability markings
//! against kinds that do not declare them) surface as [`Diagnostic`]
//! notices; broken traversal invariants abort the module with a
//! [`WalkError`].

pub mod cli;
pub mod context;
pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod files;
pub mod handlers;
pub mod node;
pub mod parser;
pub mod report;
pub mod stats;
pub mod usage;
pub mod walk;

pub use context::{Context, Frame};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use entity::{Entity, EntityKind};
pub use error::WalkError;
pub use node::{AccessRole, Node, NodeShape, NumberType};
pub use parser::PythonParser;
pub use stats::{EntityId, ModuleStats};
pub use usage::{Capability, ContainerKind, Marked, UsageFlags};
pub use walk::{walk_module, ModuleAnalysis};
