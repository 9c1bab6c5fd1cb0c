//! Lowering from the tree-sitter Python grammar to the typed node set.
//!
//! The grammar is concrete syntax: expression statements wrap their
//! expression, chained assignments nest to the right, and target patterns
//! use dedicated pattern kinds. Lowering flattens all of that into the
//! closed abstract shapes, assigning access roles from position (targets
//! store, everything else loads) and 1-indexed lines from the node's start
//! position.

use phf::phf_map;
use tree_sitter::Node as TsNode;

use crate::node::{AccessRole, KeywordNode, Node, NumberType};

/// Grammar kinds the front-end knows how to lower. Everything outside this
/// table reaches the walk as an unsupported node carrying the kind string.
#[derive(Debug, Clone, Copy)]
enum GrammarKind {
    Identifier,
    /// `True`, `False`, `None`; lowered as loaded names.
    Singleton,
    Integer,
    Float,
    String,
    Tuple,
    List,
    Set,
    ListSplat,
    Call,
    Conditional,
    Assignment,
    Parenthesized,
}

static GRAMMAR_KINDS: phf::Map<&'static str, GrammarKind> = phf_map! {
    "identifier" => GrammarKind::Identifier,
    "true" => GrammarKind::Singleton,
    "false" => GrammarKind::Singleton,
    "none" => GrammarKind::Singleton,
    "integer" => GrammarKind::Integer,
    "float" => GrammarKind::Float,
    "string" => GrammarKind::String,
    "tuple" => GrammarKind::Tuple,
    "list" => GrammarKind::List,
    "set" => GrammarKind::Set,
    "list_splat" => GrammarKind::ListSplat,
    "call" => GrammarKind::Call,
    "conditional_expression" => GrammarKind::Conditional,
    "assignment" => GrammarKind::Assignment,
    "parenthesized_expression" => GrammarKind::Parenthesized,
};

fn line_of(node: TsNode<'_>) -> usize {
    node.start_position().row + 1
}

fn text<'s>(node: TsNode<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

fn unsupported(node: TsNode<'_>) -> Node {
    Node::Unsupported {
        line: line_of(node),
        kind: node.kind().to_string(),
    }
}

/// Lower the module root into the top-level node sequence.
pub(crate) fn lower_module(root: TsNode<'_>, source: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        match statement.kind() {
            "comment" => {}
            // one statement can hold several ';'-joined expressions
            "expression_statement" => {
                let mut inner = statement.walk();
                for expression in statement.named_children(&mut inner) {
                    if expression.kind() != "comment" {
                        nodes.push(lower_expression(expression, source));
                    }
                }
            }
            _ => nodes.push(unsupported(statement)),
        }
    }
    nodes
}

fn lower_expression(node: TsNode<'_>, source: &str) -> Node {
    let Some(kind) = GRAMMAR_KINDS.get(node.kind()) else {
        return unsupported(node);
    };
    let line = line_of(node);
    match kind {
        GrammarKind::Identifier | GrammarKind::Singleton => Node::Name {
            line,
            id: text(node, source).to_string(),
            role: AccessRole::Load,
        },
        GrammarKind::Integer | GrammarKind::Float => lower_number(node, source),
        GrammarKind::String => Node::Str {
            line,
            value: string_value(node, source),
        },
        GrammarKind::Tuple => Node::Tuple {
            line,
            elements: lower_elements(node, source),
            role: AccessRole::Load,
        },
        GrammarKind::List => Node::List {
            line,
            elements: lower_elements(node, source),
            role: AccessRole::Load,
        },
        GrammarKind::Set => Node::Set {
            line,
            elements: lower_elements(node, source),
        },
        GrammarKind::ListSplat => match node.named_child(0) {
            Some(value) => Node::Starred {
                line,
                value: Box::new(lower_expression(value, source)),
                role: AccessRole::Load,
            },
            None => unsupported(node),
        },
        GrammarKind::Call => lower_call(node, source),
        GrammarKind::Conditional => lower_conditional(node, source),
        GrammarKind::Assignment => lower_assignment(node, source),
        GrammarKind::Parenthesized => match node.named_child(0) {
            Some(inner) => lower_expression(inner, source),
            None => unsupported(node),
        },
    }
}

/// The grammar gives integers and floats their own kinds; a complex literal
/// is either of them with a `j` suffix.
fn lower_number(node: TsNode<'_>, source: &str) -> Node {
    let raw = text(node, source);
    let subtype = if raw.ends_with('j') || raw.ends_with('J') {
        NumberType::Complex
    } else if node.kind() == "float" {
        NumberType::Float
    } else {
        NumberType::Integer
    };
    Node::Number {
        line: line_of(node),
        raw: raw.to_string(),
        subtype,
    }
}

/// The text between the opening and closing quote tokens, escapes kept
/// verbatim.
fn string_value(node: TsNode<'_>, source: &str) -> String {
    let mut start = node.start_byte();
    let mut end = node.end_byte();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "string_start" => start = child.end_byte(),
            "string_end" => end = child.start_byte(),
            _ => {}
        }
    }
    source[start..end.max(start)].to_string()
}

fn lower_elements(node: TsNode<'_>, source: &str) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .map(|child| lower_expression(child, source))
        .collect()
}

fn lower_call(node: TsNode<'_>, source: &str) -> Node {
    let Some(func) = node.child_by_field_name("function") else {
        return unsupported(node);
    };
    let mut args = Vec::new();
    let mut keywords = Vec::new();
    if let Some(arguments) = node.child_by_field_name("arguments") {
        let mut cursor = arguments.walk();
        for argument in arguments.named_children(&mut cursor) {
            match argument.kind() {
                "comment" => {}
                "keyword_argument" => {
                    let name = argument
                        .child_by_field_name("name")
                        .map(|n| text(n, source).to_string());
                    let value = match argument.child_by_field_name("value") {
                        Some(value) => lower_expression(value, source),
                        None => unsupported(argument),
                    };
                    keywords.push(KeywordNode {
                        name,
                        value,
                        line: line_of(argument),
                    });
                }
                "dictionary_splat" => {
                    let value = match argument.named_child(0) {
                        Some(value) => lower_expression(value, source),
                        None => unsupported(argument),
                    };
                    keywords.push(KeywordNode {
                        name: None,
                        value,
                        line: line_of(argument),
                    });
                }
                _ => args.push(lower_expression(argument, source)),
            }
        }
    }
    Node::Call {
        line: line_of(node),
        func: Box::new(lower_expression(func, source)),
        args,
        keywords,
    }
}

/// `a if b else c`; the grammar orders the named children consequence,
/// condition, alternative.
fn lower_conditional(node: TsNode<'_>, source: &str) -> Node {
    let (Some(body), Some(test), Some(orelse)) = (
        node.named_child(0),
        node.named_child(1),
        node.named_child(2),
    ) else {
        return unsupported(node);
    };
    Node::IfExp {
        line: line_of(node),
        test: Box::new(lower_expression(test, source)),
        body: Box::new(lower_expression(body, source)),
        orelse: Box::new(lower_expression(orelse, source)),
    }
}

/// Chained assignments nest to the right in the grammar (`a = (b = 1)` in
/// spirit); flattening collects every left side as a target of one
/// assignment over the final value.
fn lower_assignment(node: TsNode<'_>, source: &str) -> Node {
    let line = line_of(node);
    let mut targets = Vec::new();
    let mut current = node;
    loop {
        let Some(left) = current.child_by_field_name("left") else {
            return unsupported(node);
        };
        targets.push(lower_target(left, source));
        let Some(right) = current.child_by_field_name("right") else {
            // a bare annotation (`a: int`) binds nothing
            return unsupported(node);
        };
        if right.kind() == "assignment" && right.child_by_field_name("right").is_some() {
            current = right;
        } else {
            return Node::Assign {
                line,
                targets,
                value: Box::new(lower_expression(right, source)),
            };
        }
    }
}

/// Assignment targets use pattern kinds and store roles.
fn lower_target(node: TsNode<'_>, source: &str) -> Node {
    let line = line_of(node);
    match node.kind() {
        "identifier" => Node::Name {
            line,
            id: text(node, source).to_string(),
            role: AccessRole::Store,
        },
        "pattern_list" | "tuple_pattern" => Node::Tuple {
            line,
            elements: lower_targets(node, source),
            role: AccessRole::Store,
        },
        "list_pattern" => Node::List {
            line,
            elements: lower_targets(node, source),
            role: AccessRole::Store,
        },
        "list_splat_pattern" => match node.named_child(0) {
            Some(value) => Node::Starred {
                line,
                value: Box::new(lower_target(value, source)),
                role: AccessRole::Store,
            },
            None => unsupported(node),
        },
        _ => unsupported(node),
    }
}

fn lower_targets(node: TsNode<'_>, source: &str) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .map(|child| lower_target(child, source))
        .collect()
}
