use thiserror::Error;
use tracing::trace;

use crate::{
    ast::{Expr, Literal},
    grammar::{DEFAULT_GRAMMAR, GrammarConfig},
    hooks::{HookEnv, HookPoint},
    lexer::{
        BSLASH_CODE, CBRACK_CODE, COMMA_CODE, CPAREN_CODE, DQUOTE_CODE, Lexer, OBRACK_CODE,
        OPAREN_CODE, PERIOD_CODE, QUMARK_CODE, SEMCOL_CODE, SQUOTE_CODE, is_decimal_digit,
    },
};

/// Malformed input, with the character index where parsing stopped.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{description} at character {index}")]
pub struct ParseError {
    pub description: String,
    pub index: usize,
}

impl ParseError {
    pub fn new(description: impl Into<String>, index: usize) -> Self {
        ParseError {
            description: description.into(),
            index,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Deepest nesting of expressions, operands and operator chains the parser
/// accepts. Bounds both the parser's recursion and the depth of the trees
/// it hands to the evaluator.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parses `source` with the default grammar.
pub fn parse_expression(source: &str) -> ParseResult<Expr> {
    Parser::parse_with(&DEFAULT_GRAMMAR, source)
}

struct BinaryOpInfo {
    value: String,
    prec: f64,
    right_a: bool,
}

/// Recursive-descent parser over a borrowed [`GrammarConfig`].
///
/// Binary expressions are parsed by precedence climbing over explicit
/// operand/operator stacks. Every other production is a `gobble_*` method;
/// they are public so hooks can call back into them.
pub struct Parser<'g> {
    grammar: &'g GrammarConfig,
    lexer: Lexer,
    depth: usize,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g GrammarConfig, source: &str) -> Self {
        Parser {
            grammar,
            lexer: Lexer::new(source),
            depth: 0,
        }
    }

    pub fn parse_with(grammar: &GrammarConfig, source: &str) -> ParseResult<Expr> {
        trace!(source, "parsing expression");
        Parser::new(grammar, source).parse()
    }

    pub fn grammar(&self) -> &'g GrammarConfig {
        self.grammar
    }

    // ---------------------------------------------------------------
    // Cursor access for hooks
    // ---------------------------------------------------------------

    pub fn index(&self) -> usize {
        self.lexer.position()
    }

    pub fn set_index(&mut self, index: usize) {
        self.lexer.set_position(index);
    }

    pub fn current_char(&self) -> Option<char> {
        self.lexer.current_char()
    }

    pub fn current_code(&self) -> u32 {
        self.lexer.current_code()
    }

    pub fn code_at(&self, offset: usize) -> u32 {
        self.lexer.code_at(offset)
    }

    pub fn advance(&mut self) {
        self.lexer.advance();
    }

    pub fn advance_by(&mut self, count: usize) {
        self.lexer.advance_by(count);
    }

    pub fn retreat(&mut self) {
        self.lexer.retreat();
    }

    pub fn at_end(&self) -> bool {
        self.lexer.at_end()
    }

    pub fn len(&self) -> usize {
        self.lexer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexer.is_empty()
    }

    pub fn slice(&self, start: usize, end: usize) -> String {
        self.lexer.slice(start, end)
    }

    /// Error positioned at the current index.
    pub fn error(&self, description: impl Into<String>) -> ParseError {
        ParseError::new(description, self.index())
    }

    /// Runs `production` one nesting level deeper.
    fn nested<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error("Maximum nesting depth exceeded"));
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    /// Fails when `links` more levels would pass the nesting limit.
    fn check_chain(&self, links: usize) -> ParseResult<()> {
        if self.depth + links > MAX_NESTING_DEPTH {
            return Err(self.error("Maximum nesting depth exceeded"));
        }
        Ok(())
    }

    fn current_display(&self) -> String {
        self.current_char().map(String::from).unwrap_or_default()
    }

    // ---------------------------------------------------------------
    // Hooks
    // ---------------------------------------------------------------

    fn run_hook(&mut self, point: HookPoint, node: Option<Expr>) -> ParseResult<Option<Expr>> {
        let grammar = self.grammar;
        if !grammar.hooks().has(point) {
            return Ok(node);
        }
        let mut env = HookEnv::new(node);
        grammar.hooks().run(point, self, &mut env)?;
        Ok(env.node)
    }

    fn search_hook(&mut self, point: HookPoint) -> ParseResult<Option<Expr>> {
        let grammar = self.grammar;
        if !grammar.hooks().has(point) {
            return Ok(None);
        }
        let mut env = HookEnv::default();
        grammar.hooks().search(point, self, &mut env)?;
        Ok(env.node)
    }

    // ---------------------------------------------------------------
    // Productions
    // ---------------------------------------------------------------

    /// Parses the whole input. One expression is returned bare; zero or
    /// several are wrapped in a `Compound`.
    pub fn parse(&mut self) -> ParseResult<Expr> {
        self.run_hook(HookPoint::BeforeAll, None)?;
        let mut nodes = self.gobble_expressions(None)?;
        let node = if nodes.len() == 1 {
            nodes.remove(0)
        } else {
            Expr::Compound { body: nodes }
        };
        let node = self.run_hook(HookPoint::AfterAll, Some(node))?;
        let node = node.unwrap_or(Expr::Compound { body: Vec::new() });
        if node.depth() > MAX_NESTING_DEPTH {
            return Err(self.error("Maximum nesting depth exceeded"));
        }
        Ok(node)
    }

    /// Skips whitespace, then lets `gobble-spaces` hooks skip more.
    pub fn gobble_spaces(&mut self) -> ParseResult<()> {
        self.lexer.skip_whitespace();
        self.run_hook(HookPoint::GobbleSpaces, None)?;
        Ok(())
    }

    /// Expressions separated by `;` or `,`, stopping at `until` or at the
    /// end of input.
    pub fn gobble_expressions(&mut self, until: Option<u32>) -> ParseResult<Vec<Expr>> {
        let mut nodes = Vec::new();
        while !self.at_end() {
            let code = self.current_code();
            if code == SEMCOL_CODE || code == COMMA_CODE {
                self.advance();
                continue;
            }
            if let Some(node) = self.gobble_expression()? {
                nodes.push(node);
            } else if !self.at_end() {
                if Some(code) == until {
                    break;
                }
                return Err(self.error(format!("Unexpected \"{}\"", self.current_display())));
            }
        }
        Ok(nodes)
    }

    pub fn gobble_expression(&mut self) -> ParseResult<Option<Expr>> {
        self.nested(Self::gobble_nested_expression)
    }

    fn gobble_nested_expression(&mut self) -> ParseResult<Option<Expr>> {
        let node = match self.search_hook(HookPoint::GobbleExpression)? {
            Some(node) => Some(node),
            None => self.gobble_binary_expression()?,
        };
        self.gobble_spaces()?;
        self.run_hook(HookPoint::AfterExpression, node)
    }

    /// Longest binary operator at the cursor. Word-like operators must not
    /// run into a following identifier character.
    pub fn gobble_binary_op(&mut self) -> ParseResult<Option<String>> {
        self.gobble_spaces()?;
        let mut len = self.grammar.max_binary_len().min(self.lexer.remaining());
        while len > 0 {
            let candidate = self.lexer.lookahead(len);
            if self.grammar.is_binary_op(&candidate) && self.operator_ends_cleanly(len) {
                self.advance_by(len);
                return Ok(Some(candidate));
            }
            len -= 1;
        }
        Ok(None)
    }

    fn operator_ends_cleanly(&self, len: usize) -> bool {
        !self.grammar.is_identifier_start(self.current_code())
            || (self.index() + len < self.len()
                && !self.grammar.is_identifier_part(self.code_at(len)))
    }

    fn binary_op_info(&self, op: String) -> BinaryOpInfo {
        BinaryOpInfo {
            prec: self.grammar.binary_precedence(&op),
            right_a: self.grammar.is_right_associative(&op),
            value: op,
        }
    }

    pub fn gobble_binary_expression(&mut self) -> ParseResult<Option<Expr>> {
        let Some(left) = self.gobble_token()? else {
            return Ok(None);
        };
        let Some(op) = self.gobble_binary_op()? else {
            return Ok(Some(left));
        };
        let first = self.binary_op_info(op);
        let Some(right) = self.gobble_token()? else {
            return Err(self.error(format!("Expected expression after {}", first.value)));
        };

        let mut operands = vec![left, right];
        let mut operators = vec![first];
        let mut links = 1;

        while let Some(op) = self.gobble_binary_op()? {
            let info = self.binary_op_info(op);
            if info.prec == 0.0 {
                let len = info.value.chars().count();
                self.set_index(self.index() - len);
                break;
            }

            while let Some(prev) = operators.last() {
                let reduce = if info.right_a && prev.right_a {
                    info.prec > prev.prec
                } else {
                    info.prec <= prev.prec
                };
                if !reduce {
                    break;
                }
                let (Some(right), Some(prev), Some(left)) =
                    (operands.pop(), operators.pop(), operands.pop())
                else {
                    break;
                };
                operands.push(Expr::binary(prev.value, left, right));
            }

            links += 1;
            self.check_chain(links)?;
            let Some(node) = self.gobble_token()? else {
                return Err(self.error(format!("Expected expression after {}", info.value)));
            };
            operators.push(info);
            operands.push(node);
        }

        let mut node = operands.pop();
        while let (Some(op), Some(left)) = (operators.pop(), operands.pop()) {
            node = node.map(|right| Expr::binary(op.value, left, right));
        }
        if let Some(node) = &node {
            self.check_chain(node.depth())?;
        }
        Ok(node)
    }

    /// A single operand: literal, identifier, array, group or unary
    /// expression, followed by its member/call chain.
    pub fn gobble_token(&mut self) -> ParseResult<Option<Expr>> {
        self.nested(Self::gobble_nested_token)
    }

    fn gobble_nested_token(&mut self) -> ParseResult<Option<Expr>> {
        self.gobble_spaces()?;

        if let Some(node) = self.search_hook(HookPoint::GobbleToken)? {
            return self.run_hook(HookPoint::AfterToken, Some(node));
        }

        let code = self.current_code();
        if is_decimal_digit(code) || code == PERIOD_CODE {
            return self.gobble_numeric_literal().map(Some);
        }

        let node = if code == SQUOTE_CODE || code == DQUOTE_CODE {
            Some(self.gobble_string_literal()?)
        } else if code == OBRACK_CODE {
            Some(self.gobble_array()?)
        } else {
            if let Some(op) = self.match_unary_op() {
                self.advance_by(op.chars().count());
                let Some(argument) = self.gobble_token()? else {
                    return Err(self.error("missing unaryOp argument"));
                };
                let node = Expr::Unary {
                    operator: op,
                    argument: Box::new(argument),
                    prefix: true,
                };
                return self.run_hook(HookPoint::AfterToken, Some(node));
            }

            if self.grammar.is_identifier_start(code) {
                let node = self.gobble_identifier()?;
                Some(self.rewrite_keyword(node))
            } else if code == OPAREN_CODE {
                self.gobble_group()?
            } else {
                None
            }
        };

        let Some(node) = node else {
            return self.run_hook(HookPoint::AfterToken, None);
        };
        let node = self.gobble_token_property(node)?;
        self.run_hook(HookPoint::AfterToken, Some(node))
    }

    fn match_unary_op(&self) -> Option<String> {
        let mut len = self.grammar.max_unary_len().min(self.lexer.remaining());
        while len > 0 {
            let candidate = self.lexer.lookahead(len);
            if self.grammar.is_unary_op(&candidate) && self.operator_ends_cleanly(len) {
                return Some(candidate);
            }
            len -= 1;
        }
        None
    }

    fn rewrite_keyword(&self, node: Expr) -> Expr {
        let Expr::Identifier { name } = &node else {
            return node;
        };
        if let Some(value) = self.grammar.literal(name) {
            return Expr::Literal {
                value: value.clone(),
                raw: name.clone(),
            };
        }
        if name == self.grammar.this_keyword() {
            return Expr::This;
        }
        node
    }

    /// Extends `node` with `.name`, `[expr]`, `(args)` and their `?.`
    /// optional forms.
    pub fn gobble_token_property(&mut self, mut node: Expr) -> ParseResult<Expr> {
        self.gobble_spaces()?;
        let mut code = self.current_code();
        let mut links = 0;
        while code == PERIOD_CODE || code == OBRACK_CODE || code == OPAREN_CODE || code == QUMARK_CODE
        {
            links += 1;
            self.check_chain(links)?;
            let mut optional = false;
            if code == QUMARK_CODE {
                if self.code_at(1) != PERIOD_CODE {
                    break;
                }
                optional = true;
                self.advance_by(2);
                self.gobble_spaces()?;
                code = self.current_code();
            }
            self.advance();

            if code == OBRACK_CODE {
                let Some(property) = self.gobble_expression()? else {
                    return Err(self.error(format!("Unexpected \"{}\"", self.current_display())));
                };
                node = Expr::Member {
                    computed: true,
                    object: Box::new(node),
                    property: Box::new(property),
                    optional,
                };
                self.gobble_spaces()?;
                if self.current_code() != CBRACK_CODE {
                    return Err(self.error("Unclosed ["));
                }
                self.advance();
            } else if code == OPAREN_CODE {
                let arguments = self
                    .gobble_arguments(CPAREN_CODE)?
                    .into_iter()
                    .flatten()
                    .collect();
                node = Expr::Call {
                    arguments,
                    callee: Box::new(node),
                    optional,
                };
            } else if code == PERIOD_CODE || optional {
                if optional {
                    self.retreat();
                }
                self.gobble_spaces()?;
                let property = self.gobble_identifier()?;
                node = Expr::Member {
                    computed: false,
                    object: Box::new(node),
                    property: Box::new(property),
                    optional,
                };
            }

            self.gobble_spaces()?;
            code = self.current_code();
        }
        Ok(node)
    }

    /// Decimal literal with optional fraction and exponent. A literal may
    /// not run into an identifier or a second period.
    pub fn gobble_numeric_literal(&mut self) -> ParseResult<Expr> {
        let start = self.index();
        self.skip_digits();
        if self.current_code() == PERIOD_CODE {
            self.advance();
            self.skip_digits();
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.current_char(), Some('+' | '-')) {
                self.advance();
            }
            self.skip_digits();
            if !is_decimal_digit(self.lexer.previous_code()) {
                let number = self.slice(start, self.index());
                return Err(self.error(format!(
                    "Expected exponent ({}{})",
                    number,
                    self.current_display()
                )));
            }
        }

        let raw = self.slice(start, self.index());
        let code = self.current_code();
        if self.grammar.is_identifier_start(code) {
            return Err(self.error(format!(
                "Variable names cannot start with a number ({}{})",
                raw,
                self.current_display()
            )));
        }
        if code == PERIOD_CODE || raw == "." {
            return Err(self.error("Unexpected period"));
        }

        let value = raw
            .parse::<f64>()
            .map_err(|_| ParseError::new(format!("Invalid number {}", raw), start))?;
        Ok(Expr::Literal {
            value: Literal::Number(value),
            raw,
        })
    }

    fn skip_digits(&mut self) {
        while is_decimal_digit(self.current_code()) {
            self.advance();
        }
    }

    /// Single- or double-quoted string. Unknown escapes keep the escaped
    /// character.
    pub fn gobble_string_literal(&mut self) -> ParseResult<Expr> {
        let start = self.index();
        let quote = self.current_char();
        self.advance();

        let mut value = String::new();
        let mut closed = false;
        while let Some(ch) = self.current_char() {
            self.advance();
            if Some(ch) == quote {
                closed = true;
                break;
            }
            if ch as u32 != BSLASH_CODE {
                value.push(ch);
                continue;
            }
            let Some(escaped) = self.current_char() else {
                break;
            };
            self.advance();
            value.push(match escaped {
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                'b' => '\u{8}',
                'f' => '\u{c}',
                'v' => '\u{b}',
                other => other,
            });
        }

        if !closed {
            return Err(self.error(format!("Unclosed quote after \"{}\"", value)));
        }
        Ok(Expr::Literal {
            value: Literal::String(value),
            raw: self.slice(start, self.index()),
        })
    }

    pub fn gobble_identifier(&mut self) -> ParseResult<Expr> {
        let start = self.index();
        if !self.grammar.is_identifier_start(self.current_code()) {
            return Err(self.error(format!("Unexpected {}", self.current_display())));
        }
        self.advance();
        while !self.at_end() && self.grammar.is_identifier_part(self.current_code()) {
            self.advance();
        }
        Ok(Expr::identifier(self.slice(start, self.index())))
    }

    /// Comma-separated expressions up to `termination`. Inside array
    /// literals, skipped positions become `None`; in argument lists they
    /// are errors.
    pub fn gobble_arguments(&mut self, termination: u32) -> ParseResult<Vec<Option<Expr>>> {
        let mut args: Vec<Option<Expr>> = Vec::new();
        let mut closed = false;
        let mut separators = 0usize;
        let terminator = char::from_u32(termination).unwrap_or(')');

        while !self.at_end() {
            self.gobble_spaces()?;
            let code = self.current_code();
            if code == termination {
                closed = true;
                self.advance();
                if termination == CPAREN_CODE && separators > 0 && separators >= args.len() {
                    return Err(self.error(format!("Unexpected token {}", terminator)));
                }
                break;
            } else if code == COMMA_CODE {
                self.advance();
                separators += 1;
                if separators != args.len() {
                    if termination == CPAREN_CODE {
                        return Err(self.error("Unexpected token ,"));
                    }
                    if termination == CBRACK_CODE {
                        while args.len() < separators {
                            args.push(None);
                        }
                    }
                }
            } else if args.len() != separators && separators != 0 {
                return Err(self.error("Expected comma"));
            } else {
                match self.gobble_expression()? {
                    Some(Expr::Compound { .. }) | None => {
                        return Err(self.error("Expected comma"));
                    }
                    Some(node) => args.push(Some(node)),
                }
            }
        }

        if !closed {
            return Err(self.error(format!("Expected {}", terminator)));
        }
        Ok(args)
    }

    /// `(...)`: nothing, a single expression, or a sequence.
    pub fn gobble_group(&mut self) -> ParseResult<Option<Expr>> {
        self.advance();
        let mut nodes = self.gobble_expressions(Some(CPAREN_CODE))?;
        if self.current_code() != CPAREN_CODE {
            return Err(self.error("Unclosed ("));
        }
        self.advance();
        Ok(match nodes.len() {
            0 => None,
            1 => Some(nodes.remove(0)),
            _ => Some(Expr::Sequence { expressions: nodes }),
        })
    }

    pub fn gobble_array(&mut self) -> ParseResult<Expr> {
        self.advance();
        Ok(Expr::Array {
            elements: self.gobble_arguments(CBRACK_CODE)?,
        })
    }
}
