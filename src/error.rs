//! Fatal walk errors.
//!
//! Soft failures (unsupported shapes, skipped capability marking) go to the
//! diagnostics channel and never surface here. A `WalkError` means the tree
//! or a handler broke an invariant, and the statistics for the module would
//! be inconsistent; the module's walk is aborted.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalkError {
    /// A pop reached the module sentinel at the bottom of a context stack.
    #[error("context underflow: attempted to pop the module sentinel from the {stack} stack")]
    ContextUnderflow { stack: &'static str },

    /// A composite handler popped a different frame than it pushed.
    #[error("context imbalance at line {line}: popped frame does not match the pushed frame")]
    ContextImbalance { line: usize },

    /// A top-level node left the ast-context stack off its resting depth.
    #[error("context not restored after top-level node at line {line}: depth {depth}, expected 1")]
    ContextNotRestored { line: usize, depth: usize },
}
