//! Handlers for call and inline-conditional nodes.

use crate::context::Frame;
use crate::entity::{Call, Entity, EntityKind, IfExpression, KeywordArg};
use crate::error::WalkError;
use crate::node::Node;
use crate::stats::EntityId;
use crate::usage::{BranchRole, Capability};

use super::{dispatch, NodeHandler, Walk};

/// Composite handler for call nodes.
///
/// Fields are dispatched in node order: func, args, keywords. A starred
/// argument is redirected into the single variadic-positional slot; a
/// keyword with no name is the double-starred expansion and is redirected
/// into the single variadic-keyword slot. Both record the expanded value's
/// name and kind rather than joining the ordinary argument lists.
pub struct CallHandler;

impl NodeHandler for CallHandler {
    fn process(&self, node: &Node, walk: &mut Walk<'_>) -> Result<Option<EntityId>, WalkError> {
        let Node::Call {
            line,
            func,
            args,
            keywords,
        } = node
        else {
            return Ok(None);
        };

        // capture the surroundings before this call opens its own frame
        let ast_parent = walk.context.current_ast_node();
        let scope = walk.context.current_execution_context();
        let id = walk
            .stats
            .alloc(Entity::Call(Call::new(*line, ast_parent, scope)));

        walk.with_ast_frame(Frame::Entity(id), *line, |w| {
            if let Some(func_id) = dispatch(func, w)? {
                let func_kind = w.stats.entity(func_id).kind();
                if let Entity::Call(call) = w.stats.entity_mut(id) {
                    call.set_func(func_id, func_kind);
                }
            }

            for arg in args {
                let Some(arg_id) = dispatch(arg, w)? else {
                    continue;
                };
                let arg_kind = w.stats.entity(arg_id).kind();
                if arg_kind == EntityKind::StarredVariable {
                    let name = w.stats.entity_name(arg_id).map(str::to_string);
                    let value_kind = match w.stats.entity(arg_id) {
                        Entity::Starred(starred) => starred.value_kind,
                        _ => None,
                    };
                    if let Entity::Call(call) = w.stats.entity_mut(id) {
                        call.args_var_name = name;
                        call.args_var_kind = value_kind;
                    }
                } else if let Entity::Call(call) = w.stats.entity_mut(id) {
                    call.arguments.push(arg_id);
                    call.argument_kinds.push(arg_kind);
                }
            }

            for keyword in keywords {
                let Some(value_id) = dispatch(&keyword.value, w)? else {
                    continue;
                };
                let value_kind = w.stats.entity(value_id).kind();
                let double_starred = keyword.name.is_none();
                w.mark(value_id, Capability::KeywordRole, |e| {
                    e.mark_keyword_arg(double_starred)
                });

                if double_starred {
                    let name = w.stats.entity_name(value_id).map(str::to_string);
                    if let Entity::Call(call) = w.stats.entity_mut(id) {
                        call.kwargs_var_name = name;
                        call.kwargs_var_kind = Some(value_kind);
                    }
                } else if let Entity::Call(call) = w.stats.entity_mut(id) {
                    call.keyword_arguments.push(KeywordArg {
                        name: keyword.name.clone(),
                        value: value_id,
                        value_kind,
                        double_starred,
                    });
                }
            }

            Ok(())
        })?;

        walk.stats.add(id);
        Ok(Some(id))
    }
}

/// Composite handler for `a if b else c`.
///
/// Each attached branch entity is marked with its branch role, flagged as
/// acquired inside an inline conditional expression (as opposed to a
/// block-level conditional statement).
pub struct IfExpressionHandler;

impl NodeHandler for IfExpressionHandler {
    fn process(&self, node: &Node, walk: &mut Walk<'_>) -> Result<Option<EntityId>, WalkError> {
        let Node::IfExp {
            line,
            test,
            body,
            orelse,
        } = node
        else {
            return Ok(None);
        };

        let id = walk
            .stats
            .alloc(Entity::IfExpression(IfExpression::new(*line)));

        walk.with_ast_frame(Frame::Entity(id), *line, |w| {
            let fields: [(&Node, BranchRole); 3] = [
                (test, BranchRole::Test),
                (body, BranchRole::Body),
                (orelse, BranchRole::OrElse),
            ];
            for (field, role) in fields {
                let Some(field_id) = dispatch(field, w)? else {
                    continue;
                };
                let field_kind = w.stats.entity(field_id).kind();
                if let Entity::IfExpression(if_exp) = w.stats.entity_mut(id) {
                    match role {
                        BranchRole::Test => {
                            if_exp.test = Some(field_id);
                            if_exp.test_kind = Some(field_kind);
                        }
                        BranchRole::Body => {
                            if_exp.body = Some(field_id);
                            if_exp.body_kind = Some(field_kind);
                        }
                        BranchRole::OrElse => {
                            if_exp.orelse = Some(field_id);
                            if_exp.orelse_kind = Some(field_kind);
                        }
                    }
                }
                w.mark(field_id, Capability::BranchRole, |e| {
                    e.mark_branch(role, true)
                });
            }
            Ok(())
        })?;

        walk.stats.add(id);
        Ok(Some(id))
    }
}
