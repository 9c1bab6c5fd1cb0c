//! Usage capabilities shared across entity kinds.
//!
//! Entities are heterogeneous, but most of them can be marked with
//! cross-cutting usage facts: "element of a list", "test of a conditional",
//! "target of an assignment", and so on. Each entity kind declares up front
//! which capabilities it supports; a marking call against an undeclared
//! capability returns [`Marked::Unsupported`] and changes nothing, so a
//! partially-recognized tree never aborts the walk.

use serde::Serialize;
use std::fmt;

use crate::stats::EntityId;

/// The fixed set of cross-cutting usage capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Can be marked as used inside a tuple/list/set.
    ContainerMembership,
    /// Can be marked as test/body/orelse of a conditional.
    BranchRole,
    /// Can be marked as target or value of an assignment.
    AssignmentRole,
    /// Can be marked as starred / double-starred.
    StarRole,
    /// Can be marked as participating as a keyword argument.
    KeywordRole,
    /// Can be marked as an effective target of an unpacking assignment.
    Unpacking,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ContainerMembership => "container_membership",
            Capability::BranchRole => "branch_role",
            Capability::AssignmentRole => "assignment_role",
            Capability::StarRole => "star_role",
            Capability::KeywordRole => "keyword_role",
            Capability::Unpacking => "unpacking",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a capability-marking call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "an Unsupported outcome should be reported on the diagnostics channel"]
pub enum Marked {
    /// The flag was set (idempotently).
    Applied,
    /// The entity kind does not declare the capability; nothing changed.
    Unsupported,
}

impl Marked {
    pub fn applied(&self) -> bool {
        matches!(self, Marked::Applied)
    }
}

/// Which container a marked entity sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Tuple,
    List,
    Set,
}

impl ContainerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Tuple => "tuple",
            ContainerKind::List => "list",
            ContainerKind::Set => "set",
        }
    }
}

/// Which branch of a conditional a marked entity occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchRole {
    Test,
    Body,
    OrElse,
}

/// The mutable usage record every capability-bearing entity kind embeds.
///
/// Flags only ever go from false to true, which makes repeated marking
/// idempotent in effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageFlags {
    // container-membership
    pub used_in_tuple: bool,
    pub used_in_list: bool,
    pub used_in_set: bool,

    // branch-role; `part_of_if_expression` distinguishes the inline
    // `a if b else c` form from a block-level conditional statement
    pub part_of_if_test: bool,
    pub part_of_if_body: bool,
    pub part_of_if_orelse: bool,
    pub part_of_if_expression: bool,

    // assignment-role; the back-reference is weak, the aggregator owns
    // the assignment
    pub is_assignment_target: bool,
    pub is_assignment_value: bool,
    pub assignment: Option<EntityId>,

    // star-role
    pub is_starred: bool,
    pub is_double_starred: bool,

    // keyword-role
    pub used_in_function_call: bool,
    pub used_in_function_definition: bool,
}

impl UsageFlags {
    pub fn mark_used_in(&mut self, container: ContainerKind) {
        match container {
            ContainerKind::Tuple => self.used_in_tuple = true,
            ContainerKind::List => self.used_in_list = true,
            ContainerKind::Set => self.used_in_set = true,
        }
    }

    pub fn mark_branch(&mut self, role: BranchRole, inside_if_expression: bool) {
        match role {
            BranchRole::Test => self.part_of_if_test = true,
            BranchRole::Body => self.part_of_if_body = true,
            BranchRole::OrElse => self.part_of_if_orelse = true,
        }
        self.part_of_if_expression = inside_if_expression;
    }

    pub fn mark_assignment_target(&mut self, assignment: EntityId) {
        self.is_assignment_target = true;
        self.assignment = Some(assignment);
    }

    pub fn mark_assignment_value(&mut self, assignment: EntityId) {
        self.is_assignment_value = true;
        self.assignment = Some(assignment);
    }

    pub fn mark_starred(&mut self) {
        self.is_starred = true;
    }

    pub fn mark_double_starred(&mut self) {
        self.is_double_starred = true;
    }

    /// Keyword-role marking: the entity participates as a keyword argument
    /// in a call; the double-starred form also sets the star-role flag.
    pub fn mark_keyword_arg(&mut self, double_starred: bool) {
        self.used_in_function_call = true;
        if double_starred {
            self.mark_double_starred();
        }
    }
}
