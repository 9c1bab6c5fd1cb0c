//! Handlers for name references.

use crate::context::Frame;
use crate::entity::{Entity, StarredRef, Variable};
use crate::error::WalkError;
use crate::node::Node;
use crate::stats::EntityId;
use crate::usage::Capability;

use super::{dispatch, NodeHandler, Walk};

/// Leaf handler for bare name references. Records the identifier and the
/// load/store/delete role the node carries; no context frame is needed.
pub struct VariableHandler;

impl NodeHandler for VariableHandler {
    fn process(&self, node: &Node, walk: &mut Walk<'_>) -> Result<Option<EntityId>, WalkError> {
        let Node::Name { line, id, role } = node else {
            return Ok(None);
        };
        let entity = Entity::Variable(Variable::new(*line, id.clone(), *role));
        let id = walk.stats.alloc(entity);
        walk.stats.add(id);
        Ok(Some(id))
    }
}

/// Composite handler for starred references (`*var`).
///
/// Holds exactly one child; on attach the child is marked as starred, and
/// the wrapper exposes the child's name by delegation.
pub struct StarredHandler;

impl NodeHandler for StarredHandler {
    fn process(&self, node: &Node, walk: &mut Walk<'_>) -> Result<Option<EntityId>, WalkError> {
        let Node::Starred { line, value, role } = node else {
            return Ok(None);
        };

        let id = walk
            .stats
            .alloc(Entity::Starred(StarredRef::new(*line, *role)));

        let value_id = walk.with_ast_frame(Frame::Entity(id), *line, |w| dispatch(value, w))?;

        if let Some(value_id) = value_id {
            let value_kind = walk.stats.entity(value_id).kind();
            if let Entity::Starred(starred) = walk.stats.entity_mut(id) {
                starred.value = Some(value_id);
                starred.value_kind = Some(value_kind);
            }
            walk.mark(value_id, Capability::StarRole, Entity::mark_starred);
        }

        walk.stats.add(id);
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::diagnostics::Diagnostics;
    use crate::entity::EntityKind;
    use crate::node::AccessRole;
    use crate::stats::ModuleStats;

    fn run(node: Node) -> (ModuleStats, Diagnostics, Option<EntityId>) {
        let mut stats = ModuleStats::new("t.py");
        let mut context = Context::new();
        let mut diagnostics = Diagnostics::new();
        let result = {
            let mut walk = Walk {
                stats: &mut stats,
                context: &mut context,
                diagnostics: &mut diagnostics,
            };
            dispatch(&node, &mut walk).unwrap()
        };
        assert_eq!(context.ast_depth(), 1, "frame leaked");
        (stats, diagnostics, result)
    }

    #[test]
    fn test_variable_records_name_and_role() {
        let (stats, diags, id) = run(Node::Name {
            line: 2,
            id: "x".into(),
            role: AccessRole::Store,
        });
        let id = id.unwrap();
        match stats.entity(id) {
            Entity::Variable(var) => {
                assert_eq!(var.name, "x");
                assert_eq!(var.role, AccessRole::Store);
                assert_eq!(var.line, 2);
            }
            other => panic!("expected variable, got {:?}", other.kind()),
        }
        assert_eq!(stats.variables, vec![id]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_starred_marks_and_delegates_name() {
        let (stats, diags, id) = run(Node::Starred {
            line: 3,
            role: AccessRole::Load,
            value: Box::new(Node::Name {
                line: 3,
                id: "args".into(),
                role: AccessRole::Load,
            }),
        });
        let id = id.unwrap();
        assert_eq!(stats.entity(id).kind(), EntityKind::StarredVariable);
        assert_eq!(stats.entity_name(id), Some("args"));

        let value_id = match stats.entity(id) {
            Entity::Starred(starred) => starred.value.unwrap(),
            _ => unreachable!(),
        };
        assert!(stats.entity(value_id).flags().unwrap().is_starred);

        // the inner name was registered before the wrapper
        assert_eq!(stats.variables, vec![value_id]);
        assert_eq!(stats.starred_variables, vec![id]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_starred_over_unsupported_value_fails_softly() {
        let (stats, diags, id) = run(Node::Starred {
            line: 4,
            role: AccessRole::Load,
            value: Box::new(Node::Unsupported {
                line: 4,
                kind: "subscript".into(),
            }),
        });
        let id = id.unwrap();
        match stats.entity(id) {
            Entity::Starred(starred) => assert_eq!(starred.value, None),
            _ => unreachable!(),
        }
        assert_eq!(diags.len(), 1);
    }
}
