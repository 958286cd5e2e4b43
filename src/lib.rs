//! # peek-query
//!
//! Expression parser, sandboxed evaluator and JSONPath-style query engine
//! for inspecting JSON snapshots.
//!
//! ```
//! use serde_json::json;
//!
//! let snapshot = json!({"user": {"name": "ada"}, "items": [1, 2, 3]});
//!
//! // Path queries
//! let found = peek_query::search(&snapshot, "user.name");
//! assert_eq!(found, json!({"name": "ada"}));
//!
//! // Plain key search
//! let found = peek_query::search(&snapshot, "USE");
//! assert_eq!(found, json!({"user": {"name": "ada"}}));
//!
//! // Expressions
//! let expr = peek_query::parse_expression("items.length * 2").unwrap();
//! let result = peek_query::evaluate(&expr, &snapshot).unwrap();
//! assert_eq!(result, json!(6));
//! ```

pub mod ast;
pub mod evaluator;
pub mod grammar;
pub mod hooks;
pub mod lexer;
pub mod methods;
pub mod parser;
pub mod path;
pub mod plugins;
pub mod search;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

use serde_json::Value as JsonValue;

pub use ast::{Expr, Literal};
pub use evaluator::{EvalError, EvalResult, Evaluator, Scope};
pub use grammar::GrammarConfig;
pub use hooks::{HookEnv, HookPoint};
pub use parser::{ParseError, ParseResult, Parser, parse_expression};
pub use path::{
    Match, PathError, PathSegment, PathToken, QueryEngine, QueryOptions, to_path_string, to_pointer,
    tokenize,
};
pub use plugins::Plugin;
pub use search::{Searcher, search};
pub use value::Value;

/// Evaluates `expr` with the entries of `context` as bindings and returns
/// the result as JSON.
pub fn evaluate(expr: &Expr, context: &JsonValue) -> EvalResult<JsonValue> {
    Evaluator::new().evaluate_json(expr, context)
}

/// Every match of `path` in `json`, using the process-wide engine.
pub fn query<'v>(json: &'v JsonValue, path: &str) -> Result<Vec<Match<'v>>, PathError> {
    path::DEFAULT_ENGINE.query(json, path)
}
