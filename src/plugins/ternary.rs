//! `test ? consequent : alternate`.
//!
//! Binary parsing knows nothing about `?:`, so when the parsed test is a
//! binary expression looser than the conditional (assignment), the
//! conditional is pushed down that expression's right spine:
//! `a = b ? c : d` becomes `a = (b ? c : d)`.

use crate::{
    ast::Expr,
    grammar::GrammarConfig,
    hooks::{HookEnv, HookPoint},
    lexer::{COLON_CODE, QUMARK_CODE},
    parser::{ParseResult, Parser},
};

/// Binary operators at or below this precedence bind looser than `?:`.
pub const TERNARY_PRECEDENCE: f64 = 0.9;

pub fn init(grammar: &mut GrammarConfig) {
    grammar
        .hooks_mut()
        .add(HookPoint::AfterExpression, gobble_ternary, false);
}

fn gobble_ternary(parser: &mut Parser<'_>, env: &mut HookEnv) -> ParseResult<()> {
    if env.node.is_none() || parser.current_code() != QUMARK_CODE {
        return Ok(());
    }
    parser.advance();
    let Some(test) = env.node.take() else {
        return Ok(());
    };

    let Some(consequent) = parser.gobble_expression()? else {
        return Err(parser.error("Expected expression"));
    };
    parser.gobble_spaces()?;
    if parser.current_code() != COLON_CODE {
        return Err(parser.error("Expected :"));
    }
    parser.advance();
    let Some(alternate) = parser.gobble_expression()? else {
        return Err(parser.error("Expected expression"));
    };

    env.node = Some(reroot(parser.grammar(), test, consequent, alternate));
    Ok(())
}

fn binds_looser(grammar: &GrammarConfig, operator: &str) -> bool {
    grammar.is_binary_op(operator) && grammar.binary_precedence(operator) <= TERNARY_PRECEDENCE
}

fn reroot(grammar: &GrammarConfig, test: Expr, consequent: Expr, alternate: Expr) -> Expr {
    match test {
        Expr::Binary {
            operator,
            left,
            right,
        } if binds_looser(grammar, &operator) => Expr::Binary {
            operator,
            left,
            right: Box::new(reroot(grammar, *right, consequent, alternate)),
        },
        test => Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        },
    }
}
