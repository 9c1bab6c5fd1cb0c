//! Per-module statistics aggregator.
//!
//! One [`ModuleStats`] is created per analyzed source file. It owns every
//! entity discovered in that file in an arena addressed by [`EntityId`], the
//! per-category collections, and two line-indexed views that are kept in
//! lockstep with the categories: every registered entity appears exactly once
//! at its own line in both views, in insertion order.

use std::collections::BTreeMap;

use crate::entity::{Entity, EntityKind};

/// Handle to an entity in a module's arena.
///
/// Ids are only meaningful within the module that issued them. Holding an id
/// does not own the entity, which is what keeps the assignment back-reference
/// weak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    pub fn from_raw(raw: u32) -> Self {
        EntityId(raw)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Statistics for one source module.
#[derive(Debug, Clone, Default)]
pub struct ModuleStats {
    /// Path of the analyzed file, for reporting.
    pub path: String,

    entities: Vec<Entity>,

    // category collections, insertion order preserved
    pub variables: Vec<EntityId>,
    pub starred_variables: Vec<EntityId>,
    pub numbers: Vec<EntityId>,
    pub strings: Vec<EntityId>,
    pub tuples: Vec<EntityId>,
    pub lists: Vec<EntityId>,
    pub sets: Vec<EntityId>,
    pub calls: Vec<EntityId>,
    pub if_expressions: Vec<EntityId>,
    pub assignments: Vec<EntityId>,

    /// Entities observed per source line, in registration order.
    pub line_entities: BTreeMap<usize, Vec<EntityId>>,
    /// Kind tags per source line, parallel to `line_entities`. Numbers
    /// record their numeric subtype instead of the generic kind.
    pub line_kinds: BTreeMap<usize, Vec<&'static str>>,
}

impl ModuleStats {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Move an entity into the arena and return its handle. The entity is
    /// not yet visible in any category or line view; handlers call
    /// [`ModuleStats::add`] once construction finishes.
    pub fn alloc(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(entity);
        id
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.index()]
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.index()]
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Register a finished entity with its category collection and both
    /// line-indexed views.
    pub fn add(&mut self, id: EntityId) {
        let (line, kind, line_tag) = {
            let entity = self.entity(id);
            let tag = match entity {
                Entity::Number(number) => number.subtype.as_str(),
                other => other.kind().as_str(),
            };
            (entity.line(), entity.kind(), tag)
        };

        let category = match kind {
            EntityKind::Variable => &mut self.variables,
            EntityKind::StarredVariable => &mut self.starred_variables,
            EntityKind::Number => &mut self.numbers,
            EntityKind::String => &mut self.strings,
            EntityKind::Tuple => &mut self.tuples,
            EntityKind::List => &mut self.lists,
            EntityKind::Set => &mut self.sets,
            EntityKind::Call => &mut self.calls,
            EntityKind::IfExpression => &mut self.if_expressions,
            EntityKind::Assignment => &mut self.assignments,
            // keyword arguments live inline in their call and are never
            // registered on their own
            EntityKind::KeywordArgument => return,
        };
        category.push(id);

        self.line_entities.entry(line).or_default().push(id);
        self.line_kinds.entry(line).or_default().push(line_tag);
    }

    /// Resolve the display name of an entity, delegating through starred
    /// wrappers and call callees the way the entities themselves proxy
    /// their values.
    pub fn entity_name(&self, id: EntityId) -> Option<&str> {
        match self.entity(id) {
            Entity::Variable(var) => Some(&var.name),
            Entity::Starred(starred) => starred.value.and_then(|v| self.entity_name(v)),
            Entity::Call(call) => call.func.and_then(|f| self.entity_name(f)),
            _ => None,
        }
    }

    /// Total number of registered entities across all categories.
    pub fn registered_count(&self) -> usize {
        self.line_entities.values().map(Vec::len).sum()
    }

    pub fn category(&self, kind: EntityKind) -> &[EntityId] {
        match kind {
            EntityKind::Variable => &self.variables,
            EntityKind::StarredVariable => &self.starred_variables,
            EntityKind::Number => &self.numbers,
            EntityKind::String => &self.strings,
            EntityKind::Tuple => &self.tuples,
            EntityKind::List => &self.lists,
            EntityKind::Set => &self.sets,
            EntityKind::Call => &self.calls,
            EntityKind::IfExpression => &self.if_expressions,
            EntityKind::Assignment => &self.assignments,
            EntityKind::KeywordArgument => &[],
        }
    }
}
