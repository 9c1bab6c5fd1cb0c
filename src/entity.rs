//! Entity records produced from recognized nodes.
//!
//! An entity is the statistics record for one construct: what it is, where it
//! occurs, and how it participates in its surroundings. Composite entities
//! (sequences, calls, conditionals, assignments) reference their children by
//! [`EntityId`] into the owning aggregator's arena; nothing here owns another
//! entity.
//!
//! Capability marking goes through the checked `mark_*` methods, which
//! consult the kind's declared capability set and return
//! [`Marked::Unsupported`] instead of failing when the kind does not carry
//! the flags.

use serde::Serialize;

use crate::context::Frame;
use crate::node::{AccessRole, NumberType};
use crate::stats::EntityId;
use crate::usage::{BranchRole, Capability, ContainerKind, Marked, UsageFlags};

/// Kind tag carried by every entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Variable,
    StarredVariable,
    Number,
    String,
    Tuple,
    List,
    Set,
    Call,
    #[serde(rename = "kwarg")]
    KeywordArgument,
    IfExpression,
    Assignment,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Variable => "variable",
            EntityKind::StarredVariable => "starred_variable",
            EntityKind::Number => "number",
            EntityKind::String => "string",
            EntityKind::Tuple => "tuple",
            EntityKind::List => "list",
            EntityKind::Set => "set",
            EntityKind::Call => "call",
            EntityKind::KeywordArgument => "kwarg",
            EntityKind::IfExpression => "if_expression",
            EntityKind::Assignment => "assignment",
        }
    }

    /// The usage capabilities this kind declares.
    ///
    /// Variables additionally support unpacking participation; the structural
    /// kinds (starred wrapper, keyword argument, conditional, assignment)
    /// carry no usage flags at all, and marking them is a soft failure.
    pub fn capabilities(&self) -> &'static [Capability] {
        const COMMON: &[Capability] = &[
            Capability::ContainerMembership,
            Capability::BranchRole,
            Capability::AssignmentRole,
            Capability::StarRole,
            Capability::KeywordRole,
        ];
        const VARIABLE: &[Capability] = &[
            Capability::ContainerMembership,
            Capability::BranchRole,
            Capability::AssignmentRole,
            Capability::StarRole,
            Capability::KeywordRole,
            Capability::Unpacking,
        ];
        match self {
            EntityKind::Variable => VARIABLE,
            EntityKind::Number
            | EntityKind::String
            | EntityKind::Tuple
            | EntityKind::List
            | EntityKind::Set
            | EntityKind::Call => COMMON,
            EntityKind::StarredVariable
            | EntityKind::KeywordArgument
            | EntityKind::IfExpression
            | EntityKind::Assignment => &[],
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a call goes through a bare name or an attribute access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Function,
    Attribute,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Function => "function",
            CallKind::Attribute => "attribute",
        }
    }
}

/// A bare name reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub line: usize,
    pub name: String,
    pub role: AccessRole,
    /// Set when this variable is an effective target of an unpacking
    /// assignment (`a, b = ...`).
    pub used_in_unpacking_assignment: bool,
    pub flags: UsageFlags,
}

impl Variable {
    pub fn new(line: usize, name: String, role: AccessRole) -> Self {
        Self {
            line,
            name,
            role,
            used_in_unpacking_assignment: false,
            flags: UsageFlags::default(),
        }
    }
}

/// A starred reference (`*var`). Holds its value by id and exposes the
/// value's name by delegation; it carries no usage flags of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct StarredRef {
    pub line: usize,
    pub role: AccessRole,
    pub value: Option<EntityId>,
    pub value_kind: Option<EntityKind>,
}

impl StarredRef {
    pub fn new(line: usize, role: AccessRole) -> Self {
        Self {
            line,
            role,
            value: None,
            value_kind: None,
        }
    }
}

/// A number literal with its raw text and numeric subtype.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLit {
    pub line: usize,
    pub raw: String,
    pub subtype: NumberType,
    pub flags: UsageFlags,
}

impl NumberLit {
    pub fn new(line: usize, raw: String, subtype: NumberType) -> Self {
        Self {
            line,
            raw,
            subtype,
            flags: UsageFlags::default(),
        }
    }
}

/// A string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLit {
    pub line: usize,
    pub value: String,
    pub char_count: usize,
    pub flags: UsageFlags,
}

impl StringLit {
    pub fn new(line: usize, value: String) -> Self {
        let char_count = value.chars().count();
        Self {
            line,
            value,
            char_count,
            flags: UsageFlags::default(),
        }
    }
}

/// A tuple, list, or set literal; one record parametrized by container kind.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceLit {
    pub line: usize,
    pub kind: ContainerKind,
    /// Sets have no access role.
    pub role: Option<AccessRole>,
    pub elements: Vec<EntityId>,
    pub flags: UsageFlags,
}

impl SequenceLit {
    pub fn new(line: usize, kind: ContainerKind, role: Option<AccessRole>) -> Self {
        Self {
            line,
            kind,
            role,
            elements: Vec::new(),
            flags: UsageFlags::default(),
        }
    }

    pub fn nr_of_elements(&self) -> usize {
        self.elements.len()
    }
}

/// A keyword argument built by the call handler; never dispatched from a
/// node of its own and never registered with a category collection.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordArg {
    pub name: Option<String>,
    pub value: EntityId,
    pub value_kind: EntityKind,
    pub double_starred: bool,
}

impl KeywordArg {
    pub fn kind(&self) -> EntityKind {
        EntityKind::KeywordArgument
    }
}

/// A function or method call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub line: usize,
    pub func: Option<EntityId>,
    pub call_kind: Option<CallKind>,
    /// Ordinary positional arguments; starred arguments are redirected into
    /// the variadic slot instead.
    pub arguments: Vec<EntityId>,
    pub argument_kinds: Vec<EntityKind>,
    /// Ordinary keyword arguments; the double-starred expansion is redirected
    /// into the variadic keyword slot instead.
    pub keyword_arguments: Vec<KeywordArg>,
    pub args_var_name: Option<String>,
    pub args_var_kind: Option<EntityKind>,
    pub kwargs_var_name: Option<String>,
    pub kwargs_var_kind: Option<EntityKind>,
    /// Innermost open composite at the time the call was encountered.
    pub ast_parent: Frame,
    /// Enclosing logical scope at the time the call was encountered.
    pub scope: Frame,
    pub flags: UsageFlags,
}

impl Call {
    pub fn new(line: usize, ast_parent: Frame, scope: Frame) -> Self {
        Self {
            line,
            func: None,
            call_kind: None,
            arguments: Vec::new(),
            argument_kinds: Vec::new(),
            keyword_arguments: Vec::new(),
            args_var_name: None,
            args_var_kind: None,
            kwargs_var_name: None,
            kwargs_var_kind: None,
            ast_parent,
            scope,
            flags: UsageFlags::default(),
        }
    }

    /// Record the callee. A bare name makes this a function call, anything
    /// else an attribute (method) call.
    pub fn set_func(&mut self, func: EntityId, kind: EntityKind) {
        self.func = Some(func);
        self.call_kind = Some(if kind == EntityKind::Variable {
            CallKind::Function
        } else {
            CallKind::Attribute
        });
    }
}

/// An inline conditional expression (`a if b else c`).
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub line: usize,
    pub test: Option<EntityId>,
    pub test_kind: Option<EntityKind>,
    pub body: Option<EntityId>,
    pub body_kind: Option<EntityKind>,
    pub orelse: Option<EntityId>,
    pub orelse_kind: Option<EntityKind>,
}

impl IfExpression {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            test: None,
            test_kind: None,
            body: None,
            body_kind: None,
            orelse: None,
            orelse_kind: None,
        }
    }
}

/// An assignment statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub line: usize,
    pub value: Option<EntityId>,
    pub value_kind: Option<EntityKind>,
    pub targets: Vec<EntityId>,
    /// Running effective target count: one per bare target, the element
    /// count for a sequence target.
    pub number_of_targets: usize,
    pub uses_unpacking: bool,
    pub uses_tuple_for_unpacking: bool,
    pub uses_list_for_unpacking: bool,
}

impl Assignment {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            value: None,
            value_kind: None,
            targets: Vec::new(),
            number_of_targets: 0,
            uses_unpacking: false,
            uses_tuple_for_unpacking: false,
            uses_list_for_unpacking: false,
        }
    }
}

/// Any entity held in a module's arena.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Variable(Variable),
    Starred(StarredRef),
    Number(NumberLit),
    Str(StringLit),
    Sequence(SequenceLit),
    Call(Call),
    IfExpression(IfExpression),
    Assignment(Assignment),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Variable(_) => EntityKind::Variable,
            Entity::Starred(_) => EntityKind::StarredVariable,
            Entity::Number(_) => EntityKind::Number,
            Entity::Str(_) => EntityKind::String,
            Entity::Sequence(seq) => match seq.kind {
                ContainerKind::Tuple => EntityKind::Tuple,
                ContainerKind::List => EntityKind::List,
                ContainerKind::Set => EntityKind::Set,
            },
            Entity::Call(_) => EntityKind::Call,
            Entity::IfExpression(_) => EntityKind::IfExpression,
            Entity::Assignment(_) => EntityKind::Assignment,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Entity::Variable(e) => e.line,
            Entity::Starred(e) => e.line,
            Entity::Number(e) => e.line,
            Entity::Str(e) => e.line,
            Entity::Sequence(e) => e.line,
            Entity::Call(e) => e.line,
            Entity::IfExpression(e) => e.line,
            Entity::Assignment(e) => e.line,
        }
    }

    /// The usage record, present only on capability-bearing kinds.
    pub fn flags(&self) -> Option<&UsageFlags> {
        match self {
            Entity::Variable(e) => Some(&e.flags),
            Entity::Number(e) => Some(&e.flags),
            Entity::Str(e) => Some(&e.flags),
            Entity::Sequence(e) => Some(&e.flags),
            Entity::Call(e) => Some(&e.flags),
            Entity::Starred(_) | Entity::IfExpression(_) | Entity::Assignment(_) => None,
        }
    }

    fn flags_mut(&mut self) -> Option<&mut UsageFlags> {
        match self {
            Entity::Variable(e) => Some(&mut e.flags),
            Entity::Number(e) => Some(&mut e.flags),
            Entity::Str(e) => Some(&mut e.flags),
            Entity::Sequence(e) => Some(&mut e.flags),
            Entity::Call(e) => Some(&mut e.flags),
            Entity::Starred(_) | Entity::IfExpression(_) | Entity::Assignment(_) => None,
        }
    }

    fn checked(&mut self, capability: Capability, apply: impl FnOnce(&mut UsageFlags)) -> Marked {
        if !self.kind().supports(capability) {
            return Marked::Unsupported;
        }
        match self.flags_mut() {
            Some(flags) => {
                apply(flags);
                Marked::Applied
            }
            None => Marked::Unsupported,
        }
    }

    /// Mark the entity as used inside the given container.
    pub fn mark_used_in(&mut self, container: ContainerKind) -> Marked {
        self.checked(Capability::ContainerMembership, |f| f.mark_used_in(container))
    }

    /// Mark the entity as occupying a branch of a conditional.
    pub fn mark_branch(&mut self, role: BranchRole, inside_if_expression: bool) -> Marked {
        self.checked(Capability::BranchRole, |f| {
            f.mark_branch(role, inside_if_expression)
        })
    }

    /// Mark the entity as the target of `assignment`.
    pub fn mark_assignment_target(&mut self, assignment: EntityId) -> Marked {
        self.checked(Capability::AssignmentRole, |f| {
            f.mark_assignment_target(assignment)
        })
    }

    /// Mark the entity as the value of `assignment`.
    pub fn mark_assignment_value(&mut self, assignment: EntityId) -> Marked {
        self.checked(Capability::AssignmentRole, |f| {
            f.mark_assignment_value(assignment)
        })
    }

    /// Mark the entity as starred (`*x`).
    pub fn mark_starred(&mut self) -> Marked {
        self.checked(Capability::StarRole, UsageFlags::mark_starred)
    }

    /// Mark the entity as participating as a keyword argument.
    pub fn mark_keyword_arg(&mut self, double_starred: bool) -> Marked {
        self.checked(Capability::KeywordRole, |f| f.mark_keyword_arg(double_starred))
    }

    /// Mark the entity as an effective target of an unpacking assignment,
    /// recording which container kind carried it. Only variables declare
    /// this capability.
    pub fn mark_in_unpacking(&mut self, container: ContainerKind) -> Marked {
        if !self.kind().supports(Capability::Unpacking) {
            return Marked::Unsupported;
        }
        match self {
            Entity::Variable(var) => {
                var.used_in_unpacking_assignment = true;
                match container {
                    ContainerKind::Tuple => var.flags.used_in_tuple = true,
                    ContainerKind::List => var.flags.used_in_list = true,
                    ContainerKind::Set => var.flags.used_in_set = true,
                }
                Marked::Applied
            }
            _ => Marked::Unsupported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_sets_per_kind() {
        assert!(EntityKind::Variable.supports(Capability::Unpacking));
        assert!(EntityKind::Number.supports(Capability::KeywordRole));
        assert!(!EntityKind::Number.supports(Capability::Unpacking));
        assert!(!EntityKind::StarredVariable.supports(Capability::StarRole));
        assert!(EntityKind::Assignment.capabilities().is_empty());
        assert!(EntityKind::IfExpression.capabilities().is_empty());
    }

    #[test]
    fn test_marking_unsupported_kind_changes_nothing() {
        let mut entity = Entity::IfExpression(IfExpression::new(1));
        assert_eq!(entity.mark_used_in(ContainerKind::List), Marked::Unsupported);
        assert_eq!(entity.mark_starred(), Marked::Unsupported);
        assert_eq!(entity, Entity::IfExpression(IfExpression::new(1)));
    }

    #[test]
    fn test_marking_is_idempotent_in_effect() {
        let mut entity = Entity::Number(NumberLit::new(2, "7".into(), NumberType::Integer));
        assert!(entity.mark_used_in(ContainerKind::List).applied());
        assert!(entity.mark_used_in(ContainerKind::List).applied());
        assert!(entity.flags().unwrap().used_in_list);
    }

    #[test]
    fn test_unpacking_marks_carrier_container() {
        let mut entity = Entity::Variable(Variable::new(1, "a".into(), AccessRole::Store));
        assert!(entity.mark_in_unpacking(ContainerKind::Tuple).applied());
        match entity {
            Entity::Variable(var) => {
                assert!(var.used_in_unpacking_assignment);
                assert!(var.flags.used_in_tuple);
                assert!(!var.flags.used_in_list);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_sequence_cannot_join_unpacking_itself() {
        let mut entity = Entity::Sequence(SequenceLit::new(
            1,
            ContainerKind::Tuple,
            Some(AccessRole::Store),
        ));
        assert_eq!(
            entity.mark_in_unpacking(ContainerKind::Tuple),
            Marked::Unsupported
        );
    }

    #[test]
    fn test_call_kind_classification() {
        let mut call = Call::new(4, Frame::Module, Frame::Module);
        call.set_func(EntityId::from_raw(0), EntityKind::Variable);
        assert_eq!(call.call_kind, Some(CallKind::Function));

        let mut call = Call::new(4, Frame::Module, Frame::Module);
        call.set_func(EntityId::from_raw(0), EntityKind::Call);
        assert_eq!(call.call_kind, Some(CallKind::Attribute));
    }
}
