//! Bindings for filter (`[?(...)]`) and script (`[(...)]`) expressions.
//!
//! The `@` shorthands are rewritten to plain identifiers before parsing so
//! the expression grammar needs no special support for them:
//!
//! | shorthand          | identifier           | bound to                        |
//! |--------------------|----------------------|---------------------------------|
//! | `@`                | `_$_v`               | candidate value                 |
//! | `@root`            | `_$_root`            | document root                   |
//! | `@parent`          | `_$_parent`          | container of the candidate      |
//! | `@parentProperty`  | `_$_parentProperty`  | key of the container            |
//! | `@property`        | `_$_property`        | key of the candidate            |
//! | `@path`            | `_$_path`            | normalized path of the candidate|

use serde_json::Value as JsonValue;

use super::{format::normalized_path, segment::PathSegment};
use crate::{evaluator::Scope, value::Value};

pub const VALUE_BINDING: &str = "_$_v";
pub const ROOT_BINDING: &str = "_$_root";
pub const PARENT_BINDING: &str = "_$_parent";
pub const PARENT_PROPERTY_BINDING: &str = "_$_parentProperty";
pub const PROPERTY_BINDING: &str = "_$_property";
pub const PATH_BINDING: &str = "_$_path";

const SHORTHANDS: &[(&str, &str)] = &[
    ("parentProperty", PARENT_PROPERTY_BINDING),
    ("parent", PARENT_BINDING),
    ("property", PROPERTY_BINDING),
    ("root", ROOT_BINDING),
    ("path", PATH_BINDING),
];

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Replaces `@` shorthands outside of string literals.
///
/// `@` followed by an identifier that is not a known shorthand is left
/// alone and fails at parse time.
pub fn rewrite(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let mut out = String::with_capacity(code.len() + 8);
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if let Some(q) = quote {
            out.push(ch);
            if ch == '\\' {
                if let Some(&next) = chars.get(i + 1) {
                    out.push(next);
                    i += 1;
                }
            } else if ch == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match ch {
            '\'' | '"' => {
                quote = Some(ch);
                out.push(ch);
                i += 1;
            }
            '@' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && is_identifier_char(chars[end]) {
                    end += 1;
                }
                let word: String = chars[start..end].iter().collect();
                if word.is_empty() {
                    out.push_str(VALUE_BINDING);
                } else if let Some((_, binding)) = SHORTHANDS.iter().find(|(s, _)| *s == word) {
                    out.push_str(binding);
                } else {
                    out.push('@');
                    out.push_str(&word);
                }
                i = end;
            }
            _ => {
                out.push(ch);
                i += 1;
            }
        }
    }
    out
}

/// Everything a filter or script can see about one candidate.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub value: &'a JsonValue,
    pub root: &'a JsonValue,
    /// `None` at the document root
    pub parent: Option<&'a JsonValue>,
    pub parent_property: Option<&'a PathSegment>,
    pub property: Option<&'a PathSegment>,
    pub path: &'a [PathSegment],
}

fn segment_value<'a>(segment: Option<&PathSegment>) -> Value<'a> {
    match segment {
        Some(PathSegment::Field(name)) => Value::String(name.clone()),
        Some(PathSegment::Index(i)) => Value::Number(*i as f64),
        Some(PathSegment::PropertyName) | None => Value::Null,
    }
}

impl<'a> Candidate<'a> {
    /// Scope for the rewritten expression. `@path` is only rendered when
    /// `with_path` is set.
    pub fn scope(&self, with_path: bool) -> Scope<'a> {
        let mut scope = Scope::new();
        scope.set(VALUE_BINDING, Value::from_json(self.value));
        scope.set(ROOT_BINDING, Value::from_json(self.root));
        scope.set(
            PARENT_BINDING,
            self.parent.map_or(Value::Null, Value::from_json),
        );
        scope.set(
            PARENT_PROPERTY_BINDING,
            segment_value(self.parent_property),
        );
        scope.set(PROPERTY_BINDING, segment_value(self.property));
        if with_path {
            scope.set(PATH_BINDING, Value::String(normalized_path(self.path)));
        }
        scope
    }
}
