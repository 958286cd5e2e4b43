//! Parser configuration: operator tables, keyword literals, identifier
//! characters, hooks and the set of registered plugins.
//!
//! A [`GrammarConfig`] is an owned value. Parsers borrow it, so two
//! differently-extended grammars can coexist without sharing state.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::{
    ast::{
        Expr, Literal,
        operators::{
            DEFAULT_BINARY_OPS, DEFAULT_IDENTIFIER_CHARS, DEFAULT_RIGHT_ASSOCIATIVE,
            DEFAULT_THIS_KEYWORD, DEFAULT_UNARY_OPS,
        },
    },
    hooks::Hooks,
    lexer::{is_ascii_letter, is_decimal_digit},
    parser::{ParseResult, Parser},
    plugins::{self, Plugin},
};

/// Grammar used by [`crate::parse_expression`].
pub static DEFAULT_GRAMMAR: Lazy<GrammarConfig> = Lazy::new(GrammarConfig::default);

#[derive(Debug, Clone)]
pub struct GrammarConfig {
    unary_ops: HashSet<String>,
    binary_ops: HashMap<String, f64>,
    right_associative: HashSet<String>,
    max_unary_len: usize,
    max_binary_len: usize,
    identifier_chars: HashSet<char>,
    literals: HashMap<String, Literal>,
    this_keyword: String,
    hooks: Hooks,
    plugins: HashSet<String>,
}

impl Default for GrammarConfig {
    /// Core tables plus the ternary plugin.
    fn default() -> Self {
        let mut grammar = Self::bare();
        grammar.register_plugin(&plugins::TERNARY);
        grammar
    }
}

impl GrammarConfig {
    /// Core tables with no plugins registered.
    pub fn bare() -> Self {
        let mut grammar = GrammarConfig {
            unary_ops: DEFAULT_UNARY_OPS.iter().map(|op| op.to_string()).collect(),
            binary_ops: DEFAULT_BINARY_OPS
                .iter()
                .map(|(op, prec)| (op.to_string(), *prec))
                .collect(),
            right_associative: DEFAULT_RIGHT_ASSOCIATIVE
                .iter()
                .map(|op| op.to_string())
                .collect(),
            max_unary_len: 0,
            max_binary_len: 0,
            identifier_chars: DEFAULT_IDENTIFIER_CHARS.iter().copied().collect(),
            literals: HashMap::from([
                ("true".to_string(), Literal::Boolean(true)),
                ("false".to_string(), Literal::Boolean(false)),
                ("null".to_string(), Literal::Null),
            ]),
            this_keyword: DEFAULT_THIS_KEYWORD.to_string(),
            hooks: Hooks::new(),
            plugins: HashSet::new(),
        };
        grammar.recompute_max_lengths();
        grammar
    }

    /// Grammar used for path filter and script sub-expressions: the default
    /// grammar plus regex literals, assignment operators, `typeof` and the
    /// `undefined` literal.
    pub fn path_filter() -> Self {
        let mut grammar = Self::default();
        grammar.register_plugins(&[plugins::REGEX, plugins::ASSIGNMENT]);
        grammar.add_unary_op("typeof");
        grammar.add_literal("null", Literal::Null);
        grammar.add_literal("undefined", Literal::Undefined);
        grammar
    }

    /// Parses `source` with this grammar.
    pub fn parse(&self, source: &str) -> ParseResult<Expr> {
        Parser::new(self, source).parse()
    }

    // ---------------------------------------------------------------
    // Extension API
    // ---------------------------------------------------------------

    pub fn add_unary_op(&mut self, op: &str) -> &mut Self {
        self.unary_ops.insert(op.to_string());
        self.recompute_max_lengths();
        self
    }

    pub fn add_binary_op(&mut self, op: &str, precedence: f64, right_associative: bool) -> &mut Self {
        self.binary_ops.insert(op.to_string(), precedence);
        if right_associative {
            self.right_associative.insert(op.to_string());
        } else {
            self.right_associative.remove(op);
        }
        self.recompute_max_lengths();
        self
    }

    pub fn add_identifier_char(&mut self, ch: char) -> &mut Self {
        self.identifier_chars.insert(ch);
        self
    }

    pub fn add_literal(&mut self, name: &str, value: Literal) -> &mut Self {
        self.literals.insert(name.to_string(), value);
        self
    }

    pub fn set_this_keyword(&mut self, keyword: &str) -> &mut Self {
        self.this_keyword = keyword.to_string();
        self
    }

    pub fn remove_unary_op(&mut self, op: &str) -> &mut Self {
        self.unary_ops.remove(op);
        self.recompute_max_lengths();
        self
    }

    pub fn remove_all_unary_ops(&mut self) -> &mut Self {
        self.unary_ops.clear();
        self.recompute_max_lengths();
        self
    }

    pub fn remove_binary_op(&mut self, op: &str) -> &mut Self {
        self.binary_ops.remove(op);
        self.right_associative.remove(op);
        self.recompute_max_lengths();
        self
    }

    pub fn remove_all_binary_ops(&mut self) -> &mut Self {
        self.binary_ops.clear();
        self.right_associative.clear();
        self.recompute_max_lengths();
        self
    }

    pub fn remove_identifier_char(&mut self, ch: char) -> &mut Self {
        self.identifier_chars.remove(&ch);
        self
    }

    pub fn remove_literal(&mut self, name: &str) -> &mut Self {
        self.literals.remove(name);
        self
    }

    pub fn remove_all_literals(&mut self) -> &mut Self {
        self.literals.clear();
        self
    }

    /// Runs the plugin's `init` once per plugin name. Returns `false` when a
    /// plugin with that name was already registered.
    pub fn register_plugin(&mut self, plugin: &Plugin) -> bool {
        if !self.plugins.insert(plugin.name.to_string()) {
            debug!(plugin = plugin.name, "plugin already registered");
            return false;
        }
        (plugin.init)(self);
        debug!(plugin = plugin.name, "plugin registered");
        true
    }

    pub fn register_plugins(&mut self, plugins: &[Plugin]) {
        for plugin in plugins {
            self.register_plugin(plugin);
        }
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains(name)
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    // ---------------------------------------------------------------
    // Queries used while parsing
    // ---------------------------------------------------------------

    pub fn is_unary_op(&self, op: &str) -> bool {
        self.unary_ops.contains(op)
    }

    pub fn is_binary_op(&self, op: &str) -> bool {
        self.binary_ops.contains_key(op)
    }

    /// Precedence of a binary operator, or `0` when unknown.
    pub fn binary_precedence(&self, op: &str) -> f64 {
        self.binary_ops.get(op).copied().unwrap_or(0.0)
    }

    pub fn is_right_associative(&self, op: &str) -> bool {
        self.right_associative.contains(op)
    }

    pub fn max_unary_len(&self) -> usize {
        self.max_unary_len
    }

    pub fn max_binary_len(&self) -> usize {
        self.max_binary_len
    }

    pub fn literal(&self, name: &str) -> Option<&Literal> {
        self.literals.get(name)
    }

    pub fn this_keyword(&self) -> &str {
        &self.this_keyword
    }

    pub fn is_identifier_start(&self, code: u32) -> bool {
        if is_ascii_letter(code) {
            return true;
        }
        let Some(ch) = char::from_u32(code) else {
            return false;
        };
        if code >= 128 && !self.binary_ops.contains_key(ch.encode_utf8(&mut [0; 4]) as &str) {
            return true;
        }
        self.identifier_chars.contains(&ch)
    }

    pub fn is_identifier_part(&self, code: u32) -> bool {
        self.is_identifier_start(code) || is_decimal_digit(code)
    }

    fn recompute_max_lengths(&mut self) {
        self.max_unary_len = self
            .unary_ops
            .iter()
            .map(|op| op.chars().count())
            .max()
            .unwrap_or(0);
        self.max_binary_len = self
            .binary_ops
            .keys()
            .map(|op| op.chars().count())
            .max()
            .unwrap_or(0);
    }
}
