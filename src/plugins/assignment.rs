//! Assignment operators and `++`/`--`.
//!
//! Assignment operators are registered as right-associative binary
//! operators; after each expression, binary nodes carrying one of them are
//! rebuilt as `AssignmentExpression`s.

use crate::{
    ast::Expr,
    grammar::GrammarConfig,
    hooks::{HookEnv, HookPoint},
    lexer::{MINUS_CODE, PLUS_CODE},
    parser::{ParseResult, Parser},
};

pub const ASSIGNMENT_PRECEDENCE: f64 = 0.9;

pub const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "*=", "**=", "/=", "%=", "+=", "-=", "<<=", ">>=", ">>>=", "&=", "^=", "|=", "||=",
    "&&=", "??=",
];

pub fn init(grammar: &mut GrammarConfig) {
    for op in ASSIGNMENT_OPERATORS {
        grammar.add_binary_op(op, ASSIGNMENT_PRECEDENCE, true);
    }
    let hooks = grammar.hooks_mut();
    hooks.add(HookPoint::GobbleToken, gobble_update_prefix, false);
    hooks.add(HookPoint::AfterToken, gobble_update_postfix, false);
    hooks.add(HookPoint::AfterExpression, gobble_assignment, false);
}

pub fn is_assignment_operator(op: &str) -> bool {
    ASSIGNMENT_OPERATORS.contains(&op)
}

/// `++` or `--` at the cursor.
fn update_operator(parser: &Parser<'_>) -> Option<&'static str> {
    let code = parser.current_code();
    if code != parser.code_at(1) {
        return None;
    }
    match code {
        PLUS_CODE => Some("++"),
        MINUS_CODE => Some("--"),
        _ => None,
    }
}

fn is_update_target(node: &Expr) -> bool {
    matches!(node, Expr::Identifier { .. } | Expr::Member { .. })
}

fn gobble_update_prefix(parser: &mut Parser<'_>, env: &mut HookEnv) -> ParseResult<()> {
    let Some(operator) = update_operator(parser) else {
        return Ok(());
    };
    parser.advance_by(2);
    let target = parser.gobble_identifier()?;
    let argument = parser.gobble_token_property(target)?;
    if !is_update_target(&argument) {
        return Err(parser.error(format!("Unexpected {}", operator)));
    }
    env.node = Some(Expr::Update {
        operator: operator.to_string(),
        argument: Box::new(argument),
        prefix: true,
    });
    Ok(())
}

fn gobble_update_postfix(parser: &mut Parser<'_>, env: &mut HookEnv) -> ParseResult<()> {
    let Some(node) = env.node.as_ref() else {
        return Ok(());
    };
    let Some(operator) = update_operator(parser) else {
        return Ok(());
    };
    if !is_update_target(node) {
        return Err(parser.error(format!("Unexpected {}", operator)));
    }
    parser.advance_by(2);
    env.node = env.node.take().map(|argument| Expr::Update {
        operator: operator.to_string(),
        argument: Box::new(argument),
        prefix: false,
    });
    Ok(())
}

fn gobble_assignment(_: &mut Parser<'_>, env: &mut HookEnv) -> ParseResult<()> {
    env.node = env.node.take().map(binaries_to_assignments);
    Ok(())
}

/// Rewrites assignment-operator binaries. Descends through assignments and
/// operator-free nodes; other operator nodes are left alone.
fn binaries_to_assignments(node: Expr) -> Expr {
    match node {
        Expr::Binary {
            operator,
            left,
            right,
        } if is_assignment_operator(&operator) => Expr::Assignment {
            operator,
            left: Box::new(binaries_to_assignments(*left)),
            right: Box::new(binaries_to_assignments(*right)),
        },
        node if node.operator().is_some() => node,
        node => node.map_children(binaries_to_assignments),
    }
}
