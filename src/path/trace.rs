//! Walks a JSON document against a token list.
//!
//! Each frame handles the head token at one node and recurses with the
//! remaining tokens. `^` cannot be answered where it appears, so it travels
//! back up as a [`Trace::Parent`] until it reaches the frame that owns the
//! node it refers to; that frame continues with the tokens after the `^`.

use std::borrow::Cow;

use serde_json::Value as JsonValue;
use tracing::trace;

use super::{
    PathError, QueryEngine,
    format::{normalized_path, to_pointer},
    sandbox::Candidate,
    segment::{Path, PathSegment},
    tokens::{PathToken, ValueType},
};
use crate::value::Value;

/// One value selected by a path query.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'v> {
    /// Concrete segments from the root to the value
    pub path: Path,
    /// Borrowed from the document, or owned when produced by `~` or a
    /// `length` lookup
    pub value: Cow<'v, JsonValue>,
    /// Container holding the value; `None` for the root
    pub parent: Option<&'v JsonValue>,
    /// Key or index of the value in `parent`
    pub parent_property: Option<PathSegment>,
    /// Set once a wildcard, slice, filter, union or descent took part
    pub has_array_expr: bool,
}

impl Match<'_> {
    /// `$['store']['book'][0]`
    pub fn path_string(&self) -> String {
        normalized_path(&self.path)
    }

    /// `/store/book/0`
    pub fn pointer(&self) -> String {
        to_pointer(&self.path)
    }
}

#[derive(Debug, Clone)]
struct Node<'v> {
    value: Cow<'v, JsonValue>,
    path: Path,
    parent: Option<&'v JsonValue>,
    parent_property: Option<PathSegment>,
    has_array_expr: bool,
}

impl<'v> Node<'v> {
    fn root(value: &'v JsonValue) -> Self {
        Node {
            value: Cow::Borrowed(value),
            path: Vec::new(),
            parent: None,
            parent_property: None,
            has_array_expr: false,
        }
    }

    /// The node as a document reference. Owned nodes are scalars produced
    /// by `~` or `length` and have no children.
    fn document(&self) -> Option<&'v JsonValue> {
        match self.value {
            Cow::Borrowed(value) => Some(value),
            Cow::Owned(_) => None,
        }
    }

    fn child(
        &self,
        container: &'v JsonValue,
        key: PathSegment,
        value: Cow<'v, JsonValue>,
        via_array_expr: bool,
    ) -> Node<'v> {
        let mut path = self.path.clone();
        path.push(key.clone());
        Node {
            value,
            path,
            parent: Some(container),
            parent_property: Some(key),
            has_array_expr: self.has_array_expr || via_array_expr,
        }
    }

    fn into_match(self) -> Match<'v> {
        Match {
            path: self.path,
            value: self.value,
            parent: self.parent,
            parent_property: self.parent_property,
            has_array_expr: self.has_array_expr,
        }
    }
}

enum Trace<'v, 't> {
    Match(Match<'v>),
    /// Continue with `rest` at the ancestor whose path has `depth` segments
    Parent { depth: usize, rest: &'t [PathToken] },
}

fn children(container: &JsonValue) -> Vec<(PathSegment, &JsonValue)> {
    match container {
        JsonValue::Object(map) => map
            .iter()
            .map(|(k, v)| (PathSegment::Field(k.clone()), v))
            .collect(),
        JsonValue::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (PathSegment::Index(i), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// `"0"`, `"12"`; not `"01"`, `"-1"` or `"+1"`.
fn canonical_index(name: &str) -> Option<usize> {
    if name.is_empty() || (name.len() > 1 && name.starts_with('0')) {
        return None;
    }
    if !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

pub(super) struct Tracer<'e, 'v> {
    engine: &'e QueryEngine,
    root: &'v JsonValue,
}

type TraceResult<'v, 't> = Result<Vec<Trace<'v, 't>>, PathError>;

impl<'e, 'v> Tracer<'e, 'v> {
    pub(super) fn new(engine: &'e QueryEngine, root: &'v JsonValue) -> Self {
        Tracer { engine, root }
    }

    pub(super) fn run(&self, tokens: &[PathToken]) -> Result<Vec<Match<'v>>, PathError> {
        let traces = self.trace(tokens, Node::root(self.root))?;
        Ok(traces
            .into_iter()
            .filter_map(|t| match t {
                Trace::Match(m) => Some(m),
                Trace::Parent { depth, .. } => {
                    trace!(depth, "dropping unresolved parent selector");
                    None
                }
            })
            .collect())
    }

    fn trace<'t>(&self, tokens: &'t [PathToken], node: Node<'v>) -> TraceResult<'v, 't> {
        let Some((token, rest)) = tokens.split_first() else {
            return Ok(vec![Trace::Match(node.into_match())]);
        };
        let traces = self.step(token, rest, tokens, &node)?;

        let mut out = Vec::with_capacity(traces.len());
        for t in traces {
            match t {
                Trace::Parent { depth, rest } if depth == node.path.len() => {
                    out.extend(self.trace(rest, node.clone())?);
                }
                other => out.push(other),
            }
        }
        Ok(out)
    }

    /// Applies `token` at `node`. `all` is the token list starting at
    /// `token`, re-applied below the node by `..`.
    fn step<'t>(
        &self,
        token: &PathToken,
        rest: &'t [PathToken],
        all: &'t [PathToken],
        node: &Node<'v>,
    ) -> TraceResult<'v, 't> {
        match token {
            PathToken::Name(name) => self.member(name, rest, node),
            PathToken::Index(index) => self.index(*index, rest, node),
            PathToken::Wildcard => {
                let Some(container) = node.document() else {
                    return Ok(Vec::new());
                };
                let mut out = Vec::new();
                for (key, value) in children(container) {
                    let child = node.child(container, key, Cow::Borrowed(value), true);
                    out.extend(self.trace(rest, child)?);
                }
                Ok(out)
            }
            PathToken::Descendant => {
                let mut out = self.trace(rest, node.clone())?;
                if let Some(container) = node.document() {
                    for (key, value) in children(container) {
                        if value.is_object() || value.is_array() || value.is_null() {
                            let child = node.child(container, key, Cow::Borrowed(value), true);
                            out.extend(self.trace(all, child)?);
                        }
                    }
                }
                Ok(out)
            }
            PathToken::Parent => match node.path.len() {
                0 => Ok(Vec::new()),
                len => Ok(vec![Trace::Parent {
                    depth: len - 1,
                    rest,
                }]),
            },
            PathToken::PropertyName => {
                let Some(key) = node.path.last() else {
                    return Ok(Vec::new());
                };
                if *key == PathSegment::PropertyName {
                    return Ok(Vec::new());
                }
                let mut path = node.path.clone();
                path.push(PathSegment::PropertyName);
                let named = Node {
                    value: Cow::Owned(key.to_json()),
                    path,
                    parent: node.parent,
                    parent_property: None,
                    has_array_expr: node.has_array_expr,
                };
                self.trace(rest, named)
            }
            PathToken::Slice(slice) => {
                let Some(container @ JsonValue::Array(items)) = node.document() else {
                    return Ok(Vec::new());
                };
                let mut out = Vec::new();
                for i in slice.indices(items.len()) {
                    let child =
                        node.child(container, PathSegment::Index(i), Cow::Borrowed(&items[i]), true);
                    out.extend(self.trace(rest, child)?);
                }
                Ok(out)
            }
            PathToken::Filter(code) => self.filter(code, rest, node),
            PathToken::Script(code) => {
                let candidate = Candidate {
                    value: node.value.as_ref(),
                    root: self.root,
                    parent: node.parent,
                    parent_property: node.path.len().checked_sub(2).and_then(|i| node.path.get(i)),
                    property: node.path.last(),
                    path: &node.path,
                };
                let Some(result) = self.engine.run_script(code, &candidate)? else {
                    return Ok(Vec::new());
                };
                let computed = script_token(&result);
                trace!(code = code.as_str(), token = ?computed, "script resolved");
                self.step(&computed, rest, all, node)
            }
            PathToken::TypeCheck(value_type) => {
                if self.is_type(*value_type, node) {
                    self.trace(rest, node.clone())
                } else {
                    Ok(Vec::new())
                }
            }
            PathToken::Union(parts) => {
                let mut in_union = node.clone();
                in_union.has_array_expr = true;
                let mut out = Vec::new();
                for part in parts {
                    out.extend(self.step(part, rest, all, &in_union)?);
                }
                Ok(out)
            }
        }
    }

    fn member<'t>(&self, name: &str, rest: &'t [PathToken], node: &Node<'v>) -> TraceResult<'v, 't> {
        let Some(container) = node.document() else {
            return Ok(Vec::new());
        };
        let child = match container {
            JsonValue::Object(map) => map.get(name).map(|value| {
                node.child(container, PathSegment::from(name), Cow::Borrowed(value), false)
            }),
            JsonValue::Array(items) if name == "length" => Some(node.child(
                container,
                PathSegment::from(name),
                Cow::Owned(JsonValue::from(items.len())),
                false,
            )),
            JsonValue::Array(items) => canonical_index(name).and_then(|i| {
                items
                    .get(i)
                    .map(|value| node.child(container, PathSegment::Index(i), Cow::Borrowed(value), false))
            }),
            JsonValue::String(s) if name == "length" => Some(node.child(
                container,
                PathSegment::from(name),
                Cow::Owned(JsonValue::from(s.chars().count())),
                false,
            )),
            _ => None,
        };
        match child {
            Some(child) => self.trace(rest, child),
            None => Ok(Vec::new()),
        }
    }

    fn index<'t>(&self, index: i64, rest: &'t [PathToken], node: &Node<'v>) -> TraceResult<'v, 't> {
        match node.document() {
            Some(container @ JsonValue::Array(items)) => {
                let len = items.len() as i64;
                let resolved = if index < 0 { index + len } else { index };
                if resolved < 0 || resolved >= len {
                    return Ok(Vec::new());
                }
                let i = resolved as usize;
                let child = node.child(container, PathSegment::Index(i), Cow::Borrowed(&items[i]), false);
                self.trace(rest, child)
            }
            Some(JsonValue::Object(_)) => self.member(&index.to_string(), rest, node),
            _ => Ok(Vec::new()),
        }
    }

    fn filter<'t>(&self, code: &str, rest: &'t [PathToken], node: &Node<'v>) -> TraceResult<'v, 't> {
        let Some(container) = node.document() else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for (key, value) in children(container) {
            let mut path = node.path.clone();
            path.push(key.clone());
            let candidate = Candidate {
                value,
                root: self.root,
                parent: Some(container),
                parent_property: node.parent_property.as_ref(),
                property: Some(&key),
                path: &path,
            };
            let keep = self
                .engine
                .run_script(code, &candidate)?
                .is_some_and(|result| result.is_truthy());
            if keep {
                let child = node.child(container, key, Cow::Borrowed(value), true);
                out.extend(self.trace(rest, child)?);
            }
        }
        Ok(out)
    }

    fn is_type(&self, value_type: ValueType, node: &Node<'v>) -> bool {
        let value: &JsonValue = &node.value;
        match value_type {
            ValueType::Null => value.is_null(),
            ValueType::Boolean => value.is_boolean(),
            ValueType::Number => value.is_number(),
            ValueType::String => value.is_string(),
            ValueType::Integer => value
                .as_f64()
                .is_some_and(|n| n.is_finite() && n.fract() == 0.0),
            ValueType::Array => value.is_array(),
            ValueType::Object => value.is_object(),
            ValueType::Scalar => value.is_boolean() || value.is_number() || value.is_string(),
            // JSON cannot hold these
            ValueType::NonFinite | ValueType::Undefined | ValueType::Function => false,
            ValueType::Other => self
                .engine
                .options
                .other
                .as_ref()
                .is_some_and(|predicate| predicate(value, &node.path)),
        }
    }
}

/// Integral numbers select an index; anything else selects the property
/// named by its string form.
fn script_token(result: &Value<'_>) -> PathToken {
    match result {
        Value::Number(n) if n.is_finite() && n.fract() == 0.0 => PathToken::Index(*n as i64),
        other => PathToken::Name(other.to_js_string()),
    }
}
