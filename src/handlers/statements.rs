//! Handler for assignment statements.

use crate::context::Frame;
use crate::entity::{Assignment, Entity, EntityKind};
use crate::error::WalkError;
use crate::node::Node;
use crate::stats::EntityId;
use crate::usage::{Capability, ContainerKind};

use super::{dispatch, NodeHandler, Walk};

/// Processes assignments, targets before value.
///
/// The effective target count folds sequence targets into their element
/// counts: `a, b = pair` contributes two targets, not one. Elements of a
/// sequence target are marked as unpacking participants individually, so a
/// tuple of a variable and an attribute access still records the variable.
pub struct AssignmentHandler;

impl NodeHandler for AssignmentHandler {
    fn process(&self, node: &Node, walk: &mut Walk<'_>) -> Result<Option<EntityId>, WalkError> {
        let Node::Assign {
            line,
            targets,
            value,
        } = node
        else {
            return Ok(None);
        };

        let id = walk.stats.alloc(Entity::Assignment(Assignment::new(*line)));

        walk.with_ast_frame(Frame::Entity(id), *line, |w| {
            for target in targets {
                let Some(target_id) = dispatch(target, w)? else {
                    continue;
                };
                let target_kind = w.stats.entity(target_id).kind();
                if let Entity::Assignment(assign) = w.stats.entity_mut(id) {
                    assign.targets.push(target_id);
                    assign.number_of_targets += 1;
                }

                let container = match target_kind {
                    EntityKind::Tuple => Some(ContainerKind::Tuple),
                    EntityKind::List => Some(ContainerKind::List),
                    _ => None,
                };
                if let Some(container) = container {
                    let elements = match w.stats.entity(target_id) {
                        Entity::Sequence(seq) => seq.elements.clone(),
                        _ => Vec::new(),
                    };
                    if let Entity::Assignment(assign) = w.stats.entity_mut(id) {
                        assign.uses_unpacking = true;
                        match container {
                            ContainerKind::Tuple => assign.uses_tuple_for_unpacking = true,
                            ContainerKind::List => assign.uses_list_for_unpacking = true,
                            ContainerKind::Set => {}
                        }
                        // the sequence stands in for its elements
                        assign.number_of_targets += elements.len();
                        assign.number_of_targets -= 1;
                    }
                    for element in elements {
                        w.mark(element, Capability::Unpacking, |e| {
                            e.mark_in_unpacking(container)
                        });
                    }
                }

                w.mark(target_id, Capability::AssignmentRole, |e| {
                    e.mark_assignment_target(id)
                });
            }

            if let Some(value_id) = dispatch(value, w)? {
                let value_kind = w.stats.entity(value_id).kind();
                if let Entity::Assignment(assign) = w.stats.entity_mut(id) {
                    assign.value = Some(value_id);
                    assign.value_kind = Some(value_kind);
                }
                w.mark(value_id, Capability::AssignmentRole, |e| {
                    e.mark_assignment_value(id)
                });
            }

            Ok(())
        })?;

        walk.stats.add(id);
        Ok(Some(id))
    }
}
