//! Run parse / eval / tokens / query / search against JSON input

use serde_json::{Value as JsonValue, json};

use super::CliError;
use crate::{
    Evaluator, GrammarConfig, QueryEngine, Searcher, to_path_string, tokenize,
    path::DEFAULT_ENGINE,
};

/// Which operation `execute_check` performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckMode {
    /// Parse an expression and return its AST
    Parse,
    /// Evaluate an expression against the input object
    #[default]
    Eval,
    /// Tokenize a path
    Tokens,
    /// Run a path query and list every match
    Query,
    /// Run the search dispatcher
    Search,
}

/// Options for a check operation
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub mode: CheckMode,
    /// Expression, path or search query
    pub source: String,
    /// JSON input string
    pub input: Option<String>,
}

fn parse_input(input: Option<&String>) -> Result<JsonValue, CliError> {
    let json_str = input.ok_or(CliError::NoInput)?;
    Ok(serde_json::from_str(json_str)?)
}

/// Execute a check operation, returning its JSON output
pub fn execute_check(options: &CheckOptions) -> Result<JsonValue, CliError> {
    execute_with(&DEFAULT_ENGINE, options)
}

fn execute_with(engine: &QueryEngine, options: &CheckOptions) -> Result<JsonValue, CliError> {
    let source = options.source.as_str();
    match options.mode {
        CheckMode::Parse => {
            let expr = GrammarConfig::path_filter().parse(source)?;
            Ok(serde_json::to_value(&expr)?)
        }
        CheckMode::Eval => {
            let expr = GrammarConfig::path_filter().parse(source)?;
            // Expressions without free names need no input
            let context = match options.input.as_ref() {
                Some(_) => parse_input(options.input.as_ref())?,
                None => JsonValue::Null,
            };
            Ok(Evaluator::new().evaluate_json(&expr, &context)?)
        }
        CheckMode::Tokens => {
            let tokens = tokenize(source)?;
            let steps: Vec<JsonValue> = tokens
                .iter()
                .map(|t| {
                    let rendered = to_path_string(std::slice::from_ref(t));
                    JsonValue::String(rendered.trim_start_matches('$').to_string())
                })
                .collect();
            Ok(json!({
                "canonical": to_path_string(&tokens),
                "tokens": steps,
            }))
        }
        CheckMode::Query => {
            let document = parse_input(options.input.as_ref())?;
            let matches = engine.query(&document, source)?;
            Ok(JsonValue::Array(
                matches
                    .iter()
                    .map(|m| {
                        json!({
                            "path": m.path_string(),
                            "pointer": m.pointer(),
                            "value": m.value.as_ref(),
                        })
                    })
                    .collect(),
            ))
        }
        CheckMode::Search => {
            let document = parse_input(options.input.as_ref())?;
            Ok(Searcher::new(engine).search(&document, source))
        }
    }
}
