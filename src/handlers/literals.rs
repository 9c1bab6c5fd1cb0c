//! Handlers for literal nodes: numbers, strings, and the three sequence
//! containers.

use crate::context::Frame;
use crate::entity::{Entity, NumberLit, SequenceLit, StringLit};
use crate::error::WalkError;
use crate::node::{AccessRole, Node};
use crate::stats::EntityId;
use crate::usage::{Capability, ContainerKind};

use super::{dispatch, NodeHandler, Walk};

/// Leaf handler for number literals.
pub struct NumberHandler;

impl NodeHandler for NumberHandler {
    fn process(&self, node: &Node, walk: &mut Walk<'_>) -> Result<Option<EntityId>, WalkError> {
        let Node::Number { line, raw, subtype } = node else {
            return Ok(None);
        };
        let id = walk
            .stats
            .alloc(Entity::Number(NumberLit::new(*line, raw.clone(), *subtype)));
        walk.stats.add(id);
        Ok(Some(id))
    }
}

/// Leaf handler for string literals.
pub struct StringHandler;

impl NodeHandler for StringHandler {
    fn process(&self, node: &Node, walk: &mut Walk<'_>) -> Result<Option<EntityId>, WalkError> {
        let Node::Str { line, value } = node else {
            return Ok(None);
        };
        let id = walk
            .stats
            .alloc(Entity::Str(StringLit::new(*line, value.clone())));
        walk.stats.add(id);
        Ok(Some(id))
    }
}

/// One composite handler shared by tuple, list, and set nodes, parametrized
/// by the container kind it registers under.
///
/// Every attached element is marked as used inside that container. Elements
/// whose node shape is unsupported are simply absent, so the sequence can end
/// up with fewer elements than the node had children.
pub struct SequenceHandler {
    kind: ContainerKind,
}

impl SequenceHandler {
    pub fn new(kind: ContainerKind) -> Self {
        Self { kind }
    }

    fn destructure<'n>(&self, node: &'n Node) -> Option<(usize, &'n [Node], Option<AccessRole>)> {
        match (self.kind, node) {
            (ContainerKind::Tuple, Node::Tuple { line, elements, role }) => {
                Some((*line, elements, Some(*role)))
            }
            (ContainerKind::List, Node::List { line, elements, role }) => {
                Some((*line, elements, Some(*role)))
            }
            (ContainerKind::Set, Node::Set { line, elements }) => Some((*line, elements, None)),
            _ => None,
        }
    }
}

impl NodeHandler for SequenceHandler {
    fn process(&self, node: &Node, walk: &mut Walk<'_>) -> Result<Option<EntityId>, WalkError> {
        let Some((line, elements, role)) = self.destructure(node) else {
            return Ok(None);
        };

        let id = walk
            .stats
            .alloc(Entity::Sequence(SequenceLit::new(line, self.kind, role)));

        walk.with_ast_frame(Frame::Entity(id), line, |w| {
            for element in elements {
                let Some(element_id) = dispatch(element, w)? else {
                    continue;
                };
                if let Entity::Sequence(seq) = w.stats.entity_mut(id) {
                    seq.elements.push(element_id);
                }
                w.mark(element_id, Capability::ContainerMembership, |e| {
                    e.mark_used_in(self.kind)
                });
            }
            Ok(())
        })?;

        walk.stats.add(id);
        Ok(Some(id))
    }
}
