//! End-to-end walks over parsed source, from text to statistics.

use pyfacts::entity::{CallKind, Entity, EntityKind};
use pyfacts::{walk_module, EntityId, ModuleAnalysis, PythonParser};

fn analyze(source: &str) -> ModuleAnalysis {
    let nodes = PythonParser::new().unwrap().parse(source).unwrap();
    walk_module("test.py", &nodes).unwrap()
}

fn variable_named(analysis: &ModuleAnalysis, name: &str) -> EntityId {
    *analysis
        .stats
        .variables
        .iter()
        .find(|id| analysis.stats.entity_name(**id) == Some(name))
        .unwrap_or_else(|| panic!("no variable named {name}"))
}

#[test]
fn test_simple_assignment() {
    let analysis = analyze("a = 2\n");
    let stats = &analysis.stats;
    assert_eq!(stats.variables.len(), 1);
    assert_eq!(stats.numbers.len(), 1);
    assert_eq!(stats.assignments.len(), 1);

    let assign_id = stats.assignments[0];
    let Entity::Assignment(assign) = stats.entity(assign_id) else {
        panic!("not an assignment");
    };
    assert_eq!(assign.number_of_targets, 1);
    assert_eq!(assign.value_kind, Some(EntityKind::Number));
    assert!(!assign.uses_unpacking);

    let a = variable_named(&analysis, "a");
    let flags = stats.entity(a).flags().unwrap();
    assert!(flags.is_assignment_target);
    assert_eq!(flags.assignment, Some(assign_id));

    let value_flags = stats.entity(assign.value.unwrap()).flags().unwrap();
    assert!(value_flags.is_assignment_value);
    assert!(analysis.diagnostics.is_empty());
}

#[test]
fn test_tuple_unpacking_assignment() {
    let analysis = analyze("a, b = (1, 2)\n");
    let stats = &analysis.stats;
    // tuple target + tuple value
    assert_eq!(stats.tuples.len(), 2);

    let Entity::Assignment(assign) = stats.entity(stats.assignments[0]) else {
        panic!("not an assignment");
    };
    assert!(assign.uses_unpacking);
    assert!(assign.uses_tuple_for_unpacking);
    assert_eq!(assign.number_of_targets, 2);
    assert_eq!(assign.value_kind, Some(EntityKind::Tuple));

    for name in ["a", "b"] {
        let id = variable_named(&analysis, name);
        let Entity::Variable(var) = stats.entity(id) else {
            panic!("not a variable");
        };
        assert!(var.used_in_unpacking_assignment, "{name} not marked");
        assert!(var.flags.used_in_tuple);
    }

    // value elements are marked as container members
    let Entity::Sequence(value) = stats.entity(assign.value.unwrap()) else {
        panic!("not a sequence");
    };
    for element in &value.elements {
        assert!(stats.entity(*element).flags().unwrap().used_in_tuple);
    }
}

#[test]
fn test_starred_call_argument() {
    let analysis = analyze("fn(*a)\n");
    let stats = &analysis.stats;
    assert_eq!(stats.calls.len(), 1);
    assert_eq!(stats.starred_variables.len(), 1);

    let Entity::Call(call) = stats.entity(stats.calls[0]) else {
        panic!("not a call");
    };
    assert_eq!(call.call_kind, Some(CallKind::Function));
    assert!(call.arguments.is_empty());
    assert_eq!(call.args_var_name.as_deref(), Some("a"));
    assert_eq!(call.args_var_kind, Some(EntityKind::Variable));

    let a = variable_named(&analysis, "a");
    assert!(stats.entity(a).flags().unwrap().is_starred);
}

#[test]
fn test_conditional_expression_branches() {
    let analysis = analyze("1 if flag else other\n");
    let stats = &analysis.stats;
    assert_eq!(stats.if_expressions.len(), 1);

    let Entity::IfExpression(if_exp) = stats.entity(stats.if_expressions[0]) else {
        panic!("not a conditional");
    };
    assert_eq!(if_exp.test_kind, Some(EntityKind::Variable));
    assert_eq!(if_exp.body_kind, Some(EntityKind::Number));
    assert_eq!(if_exp.orelse_kind, Some(EntityKind::Variable));

    let test_flags = stats.entity(if_exp.test.unwrap()).flags().unwrap();
    assert!(test_flags.part_of_if_test && test_flags.part_of_if_expression);
    let body_flags = stats.entity(if_exp.body.unwrap()).flags().unwrap();
    assert!(body_flags.part_of_if_body);
    let orelse_flags = stats.entity(if_exp.orelse.unwrap()).flags().unwrap();
    assert!(orelse_flags.part_of_if_orelse);
}

#[test]
fn test_double_starred_keyword_argument() {
    let analysis = analyze("fn(**opts)\n");
    let stats = &analysis.stats;

    let Entity::Call(call) = stats.entity(stats.calls[0]) else {
        panic!("not a call");
    };
    assert!(call.keyword_arguments.is_empty());
    assert_eq!(call.kwargs_var_name.as_deref(), Some("opts"));
    assert_eq!(call.kwargs_var_kind, Some(EntityKind::Variable));

    let opts = variable_named(&analysis, "opts");
    let flags = stats.entity(opts).flags().unwrap();
    assert!(flags.used_in_function_call);
    assert!(flags.is_double_starred);
}

#[test]
fn test_line_views_stay_consistent() {
    let analysis = analyze("a = 2\nb = [1, 2.5]\nfn(a, b)\n");
    let stats = &analysis.stats;

    // every registered entity sits at its own line in both views
    let mut seen = 0;
    for (line, ids) in &stats.line_entities {
        assert_eq!(ids.len(), stats.line_kinds[line].len());
        for id in ids {
            assert_eq!(stats.entity(*id).line(), *line);
        }
        seen += ids.len();
    }
    assert_eq!(seen, stats.registered_count());

    // children register before their parents
    assert_eq!(stats.line_kinds[&1], vec!["variable", "int", "assignment"]);
    assert_eq!(
        stats.line_kinds[&2],
        vec!["variable", "int", "float", "list", "assignment"]
    );
    assert_eq!(
        stats.line_kinds[&3],
        vec!["variable", "variable", "variable", "call"]
    );
}

#[test]
fn test_unrecognized_constructs_become_notices() {
    let analysis = analyze("import os\nx = {\"k\": 1}\n");
    let stats = &analysis.stats;
    // the assignment still lands, with no value attached
    assert_eq!(stats.assignments.len(), 1);
    let Entity::Assignment(assign) = stats.entity(stats.assignments[0]) else {
        panic!("not an assignment");
    };
    assert_eq!(assign.value, None);
    assert_eq!(assign.value_kind, None);

    let shapes: Vec<String> = analysis
        .diagnostics
        .iter()
        .map(|notice| notice.to_string())
        .collect();
    assert_eq!(shapes.len(), 2);
    assert!(shapes[0].contains("import_statement"));
    assert!(shapes[1].contains("dictionary"));
}

#[test]
fn test_nested_composites_keep_every_level() {
    let analysis = analyze("result = fn(1, x=[2, 3]) if cond else (a, b)\n");
    let stats = &analysis.stats;
    assert_eq!(stats.assignments.len(), 1);
    assert_eq!(stats.if_expressions.len(), 1);
    assert_eq!(stats.calls.len(), 1);
    assert_eq!(stats.lists.len(), 1);
    assert_eq!(stats.tuples.len(), 1);
    // result, cond, a, b (the callee counts as a variable too)
    assert_eq!(stats.variables.len(), 5);
    assert_eq!(stats.numbers.len(), 3);

    let Entity::Call(call) = stats.entity(stats.calls[0]) else {
        panic!("not a call");
    };
    assert_eq!(call.keyword_arguments.len(), 1);
    assert_eq!(call.keyword_arguments[0].name.as_deref(), Some("x"));
    assert_eq!(
        call.keyword_arguments[0].value_kind,
        EntityKind::List
    );
}
