//! Top-level walk over a module's lowered nodes.

use tracing::debug;

use crate::context::Context;
use crate::diagnostics::Diagnostics;
use crate::error::WalkError;
use crate::handlers::{dispatch, Walk};
use crate::node::Node;
use crate::stats::ModuleStats;

/// Everything a walk produces for one module: the populated aggregator and
/// the soft-failure notices collected along the way.
#[derive(Debug)]
pub struct ModuleAnalysis {
    pub stats: ModuleStats,
    pub diagnostics: Diagnostics,
}

/// Walk the top-level nodes of one module and collect its statistics.
///
/// Each top-level node is dispatched against a context resting on the module
/// sentinel, and must leave it there; a handler that leaks a frame turns the
/// remaining statistics inconsistent, so the whole module is abandoned with
/// a [`WalkError`].
pub fn walk_module(path: &str, nodes: &[Node]) -> Result<ModuleAnalysis, WalkError> {
    let mut stats = ModuleStats::new(path);
    let mut context = Context::new();
    let mut diagnostics = Diagnostics::new();

    for node in nodes {
        let line = node.line();
        {
            let mut walk = Walk {
                stats: &mut stats,
                context: &mut context,
                diagnostics: &mut diagnostics,
            };
            dispatch(node, &mut walk)?;
        }
        let depth = context.ast_depth();
        if depth != 1 {
            return Err(WalkError::ContextNotRestored { line, depth });
        }
    }

    debug!(
        path,
        entities = stats.entity_count(),
        registered = stats.registered_count(),
        notices = diagnostics.len(),
        "module walk finished"
    );

    Ok(ModuleAnalysis { stats, diagnostics })
}
