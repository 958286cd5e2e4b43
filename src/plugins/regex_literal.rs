//! `/pattern/flags` regex literals.
//!
//! The pattern runs to the first unescaped `/` outside a character class.
//! Flags are validated when the literal is parsed so a bad flag is a
//! syntax error rather than a failure on first use.

use crate::{
    ast::{Expr, Literal},
    grammar::GrammarConfig,
    hooks::{HookEnv, HookPoint},
    lexer::{BSLASH_CODE, CBRACK_CODE, FSLASH_CODE, OBRACK_CODE},
    parser::{ParseResult, Parser},
    value::compile_regex,
};

pub fn init(grammar: &mut GrammarConfig) {
    grammar
        .hooks_mut()
        .add(HookPoint::GobbleToken, gobble_regex_literal, false);
}

fn gobble_regex_literal(parser: &mut Parser<'_>, env: &mut HookEnv) -> ParseResult<()> {
    if parser.current_code() != FSLASH_CODE {
        return Ok(());
    }
    let start = parser.index();
    parser.advance();
    let pattern_start = parser.index();

    let mut in_class = false;
    while !parser.at_end() {
        let code = parser.current_code();
        if code == FSLASH_CODE && !in_class {
            let pattern = parser.slice(pattern_start, parser.index());
            parser.advance();
            let flags_start = parser.index();
            while parser
                .current_char()
                .is_some_and(|c| c.is_ascii_alphanumeric())
            {
                parser.advance();
            }
            let flags = parser.slice(flags_start, parser.index());

            if let Err(message) = compile_regex(&pattern, &flags) {
                return Err(parser.error(message));
            }

            let node = Expr::Literal {
                value: Literal::Regex { pattern, flags },
                raw: parser.slice(start, parser.index()),
            };
            env.node = Some(parser.gobble_token_property(node)?);
            return Ok(());
        }

        if code == OBRACK_CODE {
            in_class = true;
        } else if in_class && code == CBRACK_CODE {
            in_class = false;
        }
        parser.advance_by(if code == BSLASH_CODE { 2 } else { 1 });
    }

    Err(parser.error("Unclosed Regex"))
}
