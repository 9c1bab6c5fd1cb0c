//! Node handlers and the dispatch registry.
//!
//! One handler exists per recognized node shape. A composite handler follows
//! the same algorithm everywhere: build the entity from the node's scalar
//! fields, push it as the open ast-context frame, dispatch the declared child
//! fields in order through the registry, attach whatever entities come back,
//! pop the frame, register the entity with the aggregator, and return it so
//! an ancestor can attach it in turn. Leaves skip the frame since they have
//! no children to dispatch.
//!
//! The registry is closed: it is built once at process start from the fixed
//! shape table, and everything outside the table lands on the fallback
//! handler, which reports the shape and produces no entity.

mod expressions;
mod literals;
mod statements;
mod variables;

pub use expressions::{CallHandler, IfExpressionHandler};
pub use literals::{NumberHandler, SequenceHandler, StringHandler};
pub use statements::AssignmentHandler;
pub use variables::{StarredHandler, VariableHandler};

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::context::{Context, Frame};
use crate::diagnostics::Diagnostics;
use crate::entity::Entity;
use crate::error::WalkError;
use crate::node::{Node, NodeShape};
use crate::stats::{EntityId, ModuleStats};
use crate::usage::{Capability, ContainerKind, Marked};

/// Mutable traversal state threaded through every handler call: the module's
/// aggregator, the dual-stack context, and the diagnostics channel.
pub struct Walk<'a> {
    pub stats: &'a mut ModuleStats,
    pub context: &'a mut Context,
    pub diagnostics: &'a mut Diagnostics,
}

impl Walk<'_> {
    /// Run `body` with `frame` as the open ast-context frame.
    ///
    /// The pop happens whether or not `body` fails, and the popped frame must
    /// be the pushed one; a mismatch is a fatal imbalance.
    pub fn with_ast_frame<T>(
        &mut self,
        frame: Frame,
        line: usize,
        body: impl FnOnce(&mut Self) -> Result<T, WalkError>,
    ) -> Result<T, WalkError> {
        self.context.stack_ast_node(frame);
        let result = body(self);
        let popped = self.context.unstack_ast_node();
        match (result, popped) {
            (Err(err), _) => Err(err),
            (Ok(_), Err(err)) => Err(err),
            (Ok(value), Ok(popped)) if popped == frame => Ok(value),
            (Ok(_), Ok(_)) => Err(WalkError::ContextImbalance { line }),
        }
    }

    /// Apply a capability marking to the entity behind `id`, reporting a
    /// skipped-marking notice when the kind does not declare the capability.
    pub fn mark(
        &mut self,
        id: EntityId,
        capability: Capability,
        op: impl FnOnce(&mut Entity) -> Marked,
    ) {
        if op(self.stats.entity_mut(id)).applied() {
            return;
        }
        let entity = self.stats.entity(id);
        self.diagnostics
            .marking_skipped(capability, entity.kind(), entity.line());
    }
}

/// A handler for one node shape.
///
/// Returns the registered entity, or `None` when the node contributed
/// nothing (the fallback path); callers treat `None` as an absent child, not
/// an error.
pub trait NodeHandler: Send + Sync {
    fn process(&self, node: &Node, walk: &mut Walk<'_>) -> Result<Option<EntityId>, WalkError>;
}

/// Fallback for shapes outside the registered set.
struct UnsupportedHandler;

impl NodeHandler for UnsupportedHandler {
    fn process(&self, node: &Node, walk: &mut Walk<'_>) -> Result<Option<EntityId>, WalkError> {
        let shape = match node {
            Node::Unsupported { kind, .. } => kind.clone(),
            other => format!("{:?}", other.shape()),
        };
        walk.diagnostics.unsupported_shape(&shape, node.line());
        Ok(None)
    }
}

/// The closed shape-to-handler mapping plus its fallback.
pub struct Registry {
    handlers: HashMap<NodeShape, Box<dyn NodeHandler>>,
    fallback: UnsupportedHandler,
}

impl Registry {
    fn new() -> Self {
        let mut handlers: HashMap<NodeShape, Box<dyn NodeHandler>> = HashMap::new();
        handlers.insert(NodeShape::Name, Box::new(VariableHandler));
        handlers.insert(NodeShape::Starred, Box::new(StarredHandler));
        handlers.insert(NodeShape::Number, Box::new(NumberHandler));
        handlers.insert(NodeShape::Str, Box::new(StringHandler));
        handlers.insert(
            NodeShape::Tuple,
            Box::new(SequenceHandler::new(ContainerKind::Tuple)),
        );
        handlers.insert(
            NodeShape::List,
            Box::new(SequenceHandler::new(ContainerKind::List)),
        );
        handlers.insert(
            NodeShape::Set,
            Box::new(SequenceHandler::new(ContainerKind::Set)),
        );
        handlers.insert(NodeShape::Call, Box::new(CallHandler));
        handlers.insert(NodeShape::IfExp, Box::new(IfExpressionHandler));
        handlers.insert(NodeShape::Assign, Box::new(AssignmentHandler));
        Self {
            handlers,
            fallback: UnsupportedHandler,
        }
    }

    /// Resolve a shape to its handler; unregistered shapes get the fallback.
    pub fn resolve(&self, shape: NodeShape) -> &dyn NodeHandler {
        self.handlers
            .get(&shape)
            .map(Box::as_ref)
            .unwrap_or(&self.fallback)
    }
}

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// The process-wide registry.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Route a node to its handler.
pub fn dispatch(node: &Node, walk: &mut Walk<'_>) -> Result<Option<EntityId>, WalkError> {
    registry().resolve(node.shape()).process(node, walk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::REGISTERED_SHAPES;

    fn fresh<'a>(
        stats: &'a mut ModuleStats,
        context: &'a mut Context,
        diagnostics: &'a mut Diagnostics,
    ) -> Walk<'a> {
        Walk {
            stats,
            context,
            diagnostics,
        }
    }

    #[test]
    fn test_every_registered_shape_resolves() {
        let registry = registry();
        for shape in REGISTERED_SHAPES {
            // resolving must not fall through to the fallback: process a
            // trivially mismatched node and expect no diagnostic from it
            let _ = registry.resolve(*shape);
        }
        assert_eq!(registry.handlers.len(), REGISTERED_SHAPES.len());
    }

    #[test]
    fn test_unsupported_shape_emits_diagnostic_and_no_entity() {
        let mut stats = ModuleStats::new("t.py");
        let mut context = Context::new();
        let mut diagnostics = Diagnostics::new();
        let mut walk = fresh(&mut stats, &mut context, &mut diagnostics);

        let node = Node::Unsupported {
            line: 5,
            kind: "dictionary".to_string(),
        };
        let result = dispatch(&node, &mut walk).unwrap();
        assert_eq!(result, None);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(stats.entity_count(), 0);
    }

    #[test]
    fn test_with_ast_frame_pops_on_error() {
        let mut stats = ModuleStats::new("t.py");
        let mut context = Context::new();
        let mut diagnostics = Diagnostics::new();
        let mut walk = fresh(&mut stats, &mut context, &mut diagnostics);

        let frame = Frame::Entity(EntityId::from_raw(0));
        let result: Result<(), WalkError> = walk.with_ast_frame(frame, 1, |_| {
            Err(WalkError::ContextImbalance { line: 99 })
        });
        assert!(result.is_err());
        // the frame must have been released despite the failure
        assert_eq!(walk.context.ast_depth(), 1);
    }

    #[test]
    fn test_with_ast_frame_detects_foreign_pop() {
        let mut stats = ModuleStats::new("t.py");
        let mut context = Context::new();
        let mut diagnostics = Diagnostics::new();
        let mut walk = fresh(&mut stats, &mut context, &mut diagnostics);

        let frame = Frame::Entity(EntityId::from_raw(0));
        let result = walk.with_ast_frame(frame, 7, |w| {
            // a buggy body that swaps the top frame
            w.context.unstack_ast_node()?;
            w.context
                .stack_ast_node(Frame::Entity(EntityId::from_raw(42)));
            Ok(())
        });
        assert_eq!(result, Err(WalkError::ContextImbalance { line: 7 }));
    }
}
