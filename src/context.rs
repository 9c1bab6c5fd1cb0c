//! Dual-stack traversal context.
//!
//! Two independent stacks track, during recursive descent, the composite
//! entity currently being assembled (`ast_context`) and the enclosing logical
//! scope (`execution_context`). Both are bottomed by a [`Frame::Module`]
//! sentinel that is never popped; popping past it is a fatal error, since it
//! means a handler's push/pop discipline broke.

use crate::error::WalkError;
use crate::stats::EntityId;

/// One element on a context stack: the module sentinel or an open entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// The per-module aggregator at the bottom of both stacks.
    Module,
    /// An in-progress entity, addressed in the module's arena.
    Entity(EntityId),
}

#[derive(Debug)]
pub struct Context {
    ast_context: Vec<Frame>,
    execution_context: Vec<Frame>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            ast_context: vec![Frame::Module],
            execution_context: vec![Frame::Module],
        }
    }

    /// Push an in-progress composite onto the ast-context stack.
    pub fn stack_ast_node(&mut self, frame: Frame) {
        self.ast_context.push(frame);
    }

    /// Pop the topmost composite. Fails if only the sentinel remains.
    pub fn unstack_ast_node(&mut self) -> Result<Frame, WalkError> {
        if self.ast_context.len() <= 1 {
            return Err(WalkError::ContextUnderflow { stack: "ast" });
        }
        Ok(self.ast_context.pop().expect("checked non-sentinel depth"))
    }

    /// Push an entity that opens a new logical scope. Not exercised by the
    /// current handler set (none of them opens a scope), but part of the
    /// context contract for handlers that do.
    pub fn stack_execution_context(&mut self, frame: Frame) {
        self.execution_context.push(frame);
    }

    /// Pop the topmost logical scope. Same discipline as the ast stack.
    pub fn unstack_execution_context(&mut self) -> Result<Frame, WalkError> {
        if self.execution_context.len() <= 1 {
            return Err(WalkError::ContextUnderflow { stack: "execution" });
        }
        Ok(self
            .execution_context
            .pop()
            .expect("checked non-sentinel depth"))
    }

    /// The innermost open composite, or the module sentinel.
    pub fn current_ast_node(&self) -> Frame {
        *self
            .ast_context
            .last()
            .expect("ast context lost its module sentinel")
    }

    /// The enclosing logical scope, or the module sentinel.
    pub fn current_execution_context(&self) -> Frame {
        *self
            .execution_context
            .last()
            .expect("execution context lost its module sentinel")
    }

    /// Depth of the ast-context stack, sentinel included. A finished
    /// top-level node must leave this at 1.
    pub fn ast_depth(&self) -> usize {
        self.ast_context.len()
    }

    pub fn execution_depth(&self) -> usize {
        self.execution_context.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context_sits_on_sentinel() {
        let cx = Context::new();
        assert_eq!(cx.current_ast_node(), Frame::Module);
        assert_eq!(cx.current_execution_context(), Frame::Module);
        assert_eq!(cx.ast_depth(), 1);
    }

    #[test]
    fn test_push_pop_symmetry() {
        let mut cx = Context::new();
        let frame = Frame::Entity(EntityId::from_raw(0));
        cx.stack_ast_node(frame);
        assert_eq!(cx.current_ast_node(), frame);
        assert_eq!(cx.unstack_ast_node(), Ok(frame));
        assert_eq!(cx.current_ast_node(), Frame::Module);
    }

    #[test]
    fn test_sentinel_is_never_popped() {
        let mut cx = Context::new();
        assert_eq!(
            cx.unstack_ast_node(),
            Err(WalkError::ContextUnderflow { stack: "ast" })
        );
        assert_eq!(
            cx.unstack_execution_context(),
            Err(WalkError::ContextUnderflow { stack: "execution" })
        );
        // the failed pops must not have disturbed the sentinel
        assert_eq!(cx.ast_depth(), 1);
        assert_eq!(cx.execution_depth(), 1);
    }

    #[test]
    fn test_stacks_are_independent() {
        let mut cx = Context::new();
        cx.stack_ast_node(Frame::Entity(EntityId::from_raw(1)));
        assert_eq!(cx.current_execution_context(), Frame::Module);
        cx.stack_execution_context(Frame::Entity(EntityId::from_raw(2)));
        assert_eq!(cx.ast_depth(), 2);
        assert_eq!(cx.execution_depth(), 2);
    }
}
