//! JSONPath-style queries over `serde_json` documents.
//!
//! A path string is split into [`PathToken`]s once and cached; the tokens
//! are then traced against a document to produce [`Match`]es. Filter and
//! script steps are parsed with [`GrammarConfig::path_filter`] and run by
//! the sandboxed [`Evaluator`].
//!
//! ```
//! use peek_query::QueryEngine;
//! use serde_json::json;
//!
//! let doc = json!({"items": [{"n": 1}, {"n": 3}, {"n": 5}]});
//! let engine = QueryEngine::default();
//! let values = engine.values(&doc, "$.items[?(@.n > 2)].n").unwrap();
//! assert_eq!(values, vec![json!(3), json!(5)]);
//! ```

pub mod cache;
pub mod format;
pub mod sandbox;
pub mod segment;
pub mod tokenizer;
pub mod tokens;
mod trace;

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use once_cell::sync::Lazy;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, instrument};

pub use cache::BoundedCache;
pub use format::{normalized_path, to_path_string, to_pointer};
pub use segment::{Path, PathSegment};
pub use tokenizer::tokenize;
pub use tokens::{PathToken, Slice, ValueType};
pub use trace::Match;

use crate::{
    ast::Expr,
    evaluator::{EvalError, Evaluator},
    grammar::GrammarConfig,
    parser::ParseError,
    value::Value,
};
use sandbox::{Candidate, PATH_BINDING};

/// Errors raised by a path query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    /// The path string itself is malformed
    #[error("invalid path: {0}")]
    Syntax(#[from] ParseError),

    /// A filter or script expression does not parse
    #[error("invalid expression ({code}): {source}")]
    Expression { code: String, source: ParseError },

    /// A filter or script expression failed while `strict_eval` is set
    #[error("expression failed ({code}): {source}")]
    Evaluation { code: String, source: EvalError },
}

/// Predicate behind `@other()`.
pub type TypePredicate = Arc<dyn Fn(&JsonValue, &Path) -> bool + Send + Sync>;

pub const DEFAULT_TOKEN_CACHE_CAPACITY: usize = 512;
pub const DEFAULT_SCRIPT_CACHE_CAPACITY: usize = 512;

#[derive(Clone)]
pub struct QueryOptions {
    /// Distinct path strings kept tokenized; 0 disables the cache
    pub token_cache_capacity: usize,
    /// Distinct filter/script sources kept parsed; 0 disables the cache
    pub script_cache_capacity: usize,
    /// Surface filter/script evaluation errors instead of treating the
    /// candidate as a non-match
    pub strict_eval: bool,
    pub other: Option<TypePredicate>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            token_cache_capacity: DEFAULT_TOKEN_CACHE_CAPACITY,
            script_cache_capacity: DEFAULT_SCRIPT_CACHE_CAPACITY,
            strict_eval: false,
            other: None,
        }
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("token_cache_capacity", &self.token_cache_capacity)
            .field("script_cache_capacity", &self.script_cache_capacity)
            .field("strict_eval", &self.strict_eval)
            .field("other", &self.other.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token_cache_capacity(mut self, capacity: usize) -> Self {
        self.token_cache_capacity = capacity;
        self
    }

    pub fn script_cache_capacity(mut self, capacity: usize) -> Self {
        self.script_cache_capacity = capacity;
        self
    }

    pub fn strict_eval(mut self, strict: bool) -> Self {
        self.strict_eval = strict;
        self
    }

    /// Sets the predicate consulted by `@other()`.
    pub fn other<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&JsonValue, &Path) -> bool + Send + Sync + 'static,
    {
        self.other = Some(Arc::new(predicate));
        self
    }
}

/// Parsed filter or script source.
#[derive(Debug)]
struct CompiledScript {
    expr: Expr,
    uses_path: bool,
}

/// Tokenizes, caches and runs path queries.
///
/// Safe to share between threads; the caches sit behind mutexes.
pub struct QueryEngine {
    grammar: GrammarConfig,
    evaluator: Evaluator,
    options: QueryOptions,
    tokens: Mutex<BoundedCache<String, Arc<Vec<PathToken>>>>,
    scripts: Mutex<BoundedCache<String, Arc<CompiledScript>>>,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(QueryOptions::default())
    }
}

impl fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEngine")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Engine behind [`crate::query`] and [`crate::search`].
pub static DEFAULT_ENGINE: Lazy<QueryEngine> = Lazy::new(QueryEngine::default);

impl QueryEngine {
    pub fn new(options: QueryOptions) -> Self {
        Self::with_grammar(GrammarConfig::path_filter(), options)
    }

    /// Engine whose filters and scripts are parsed with `grammar`.
    pub fn with_grammar(grammar: GrammarConfig, options: QueryOptions) -> Self {
        QueryEngine {
            grammar,
            evaluator: Evaluator::new(),
            tokens: Mutex::new(BoundedCache::new(options.token_cache_capacity)),
            scripts: Mutex::new(BoundedCache::new(options.script_cache_capacity)),
            options,
        }
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Tokens for `path`, from the cache when possible.
    pub fn tokens(&self, path: &str) -> Result<Arc<Vec<PathToken>>, PathError> {
        let mut cache = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tokens) = cache.get(&path.to_string()) {
            debug!(path, "path token cache hit");
            return Ok(tokens);
        }
        debug!(path, "path token cache miss");
        let tokens = Arc::new(tokenize(path)?);
        cache.insert(path.to_string(), Arc::clone(&tokens));
        Ok(tokens)
    }

    fn compile_script(&self, code: &str) -> Result<Arc<CompiledScript>, PathError> {
        let mut cache = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(script) = cache.get(&code.to_string()) {
            return Ok(script);
        }
        let rewritten = sandbox::rewrite(code);
        let expr = self
            .grammar
            .parse(&rewritten)
            .map_err(|source| PathError::Expression {
                code: code.to_string(),
                source,
            })?;
        let script = Arc::new(CompiledScript {
            expr,
            uses_path: rewritten.contains(PATH_BINDING),
        });
        cache.insert(code.to_string(), Arc::clone(&script));
        Ok(script)
    }

    /// Evaluates a filter or script for one candidate. `Ok(None)` means the
    /// evaluation failed and the candidate does not match.
    fn run_script<'a>(
        &self,
        code: &str,
        candidate: &Candidate<'a>,
    ) -> Result<Option<Value<'a>>, PathError> {
        let script = self.compile_script(code)?;
        let mut scope = candidate.scope(script.uses_path);
        match self.evaluator.evaluate(&script.expr, &mut scope) {
            Ok(value) => Ok(Some(value)),
            Err(source) if self.options.strict_eval => Err(PathError::Evaluation {
                code: code.to_string(),
                source,
            }),
            Err(error) => {
                debug!(code, %error, "expression failed, treating candidate as no match");
                Ok(None)
            }
        }
    }

    /// Every match of `path` in `json`, in document order.
    #[instrument(level = "debug", skip(self, json))]
    pub fn query<'v>(&self, json: &'v JsonValue, path: &str) -> Result<Vec<Match<'v>>, PathError> {
        let tokens = self.tokens(path)?;
        let matches = trace::Tracer::new(self, json).run(&tokens)?;
        debug!(count = matches.len(), "query finished");
        Ok(matches)
    }

    /// Matched values, cloned out of the document.
    pub fn values(&self, json: &JsonValue, path: &str) -> Result<Vec<JsonValue>, PathError> {
        Ok(self
            .query(json, path)?
            .into_iter()
            .map(|m| m.value.into_owned())
            .collect())
    }

    /// Normalized path strings of the matches.
    pub fn paths(&self, json: &JsonValue, path: &str) -> Result<Vec<String>, PathError> {
        Ok(self
            .query(json, path)?
            .iter()
            .map(Match::path_string)
            .collect())
    }

    /// JSON Pointers of the matches.
    pub fn pointers(&self, json: &JsonValue, path: &str) -> Result<Vec<String>, PathError> {
        Ok(self.query(json, path)?.iter().map(Match::pointer).collect())
    }

    pub fn clear_caches(&self) {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached path strings.
    pub fn cached_paths(&self) -> usize {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
