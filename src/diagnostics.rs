//! Soft-failure diagnostics channel.
//!
//! Recoverable conditions during a walk - a node shape with no handler, or a
//! capability marking against an entity kind that does not declare it - are
//! appended here and the walk continues with the affected contribution
//! absent. The channel never raises and never halts anything.

use serde::Serialize;

use crate::entity::EntityKind;
use crate::usage::Capability;

/// One soft-failure notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A node shape had no registered handler; its subtree contributed
    /// nothing.
    UnsupportedShape { shape: String, line: usize },
    /// A capability marking targeted an entity kind that does not declare
    /// the capability; no state changed.
    MarkingSkipped {
        capability: Capability,
        entity_kind: EntityKind,
        line: usize,
    },
}

impl Diagnostic {
    pub fn line(&self) -> usize {
        match self {
            Diagnostic::UnsupportedShape { line, .. }
            | Diagnostic::MarkingSkipped { line, .. } => *line,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnsupportedShape { shape, line } => {
                write!(f, "unsupported shape: {} (line {})", shape, line)
            }
            Diagnostic::MarkingSkipped {
                capability,
                entity_kind,
                line,
            } => write!(
                f,
                "capability marking skipped: {} on entity of kind {} (line {})",
                capability, entity_kind, line
            ),
        }
    }
}

/// Append-only stream of notices for one module's walk.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    notices: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unsupported_shape(&mut self, shape: &str, line: usize) {
        tracing::debug!(shape, line, "unsupported node shape");
        self.notices.push(Diagnostic::UnsupportedShape {
            shape: shape.to_string(),
            line,
        });
    }

    pub fn marking_skipped(&mut self, capability: Capability, entity_kind: EntityKind, line: usize) {
        tracing::debug!(
            capability = capability.as_str(),
            entity_kind = entity_kind.as_str(),
            line,
            "capability marking skipped"
        );
        self.notices.push(Diagnostic::MarkingSkipped {
            capability,
            entity_kind,
            line,
        });
    }

    pub fn notices(&self) -> &[Diagnostic] {
        &self.notices
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.notices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_accumulate_in_order() {
        let mut diags = Diagnostics::new();
        diags.unsupported_shape("dictionary", 4);
        diags.marking_skipped(Capability::StarRole, EntityKind::IfExpression, 9);

        assert_eq!(diags.len(), 2);
        assert_eq!(
            diags.notices()[0],
            Diagnostic::UnsupportedShape {
                shape: "dictionary".into(),
                line: 4
            }
        );
        assert_eq!(diags.notices()[1].line(), 9);
    }

    #[test]
    fn test_display_wording() {
        let notice = Diagnostic::UnsupportedShape {
            shape: "lambda".into(),
            line: 2,
        };
        assert_eq!(notice.to_string(), "unsupported shape: lambda (line 2)");
    }
}
