use std::fmt;

use serde_json::Value as JsonValue;

/// One concrete step from the root to a matched value.
///
/// Unlike a [`PathToken`](super::PathToken), a segment never selects more
/// than one child: wildcards, slices and filters resolve into the keys and
/// indices they actually visited.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object key
    ///
    /// # Examples
    /// - `$.user` → `Field("user")`
    /// - `$['first name']` → `Field("first name")`
    Field(String),

    /// Array position, already resolved against the array length
    ///
    /// # Examples
    /// - `$.items[0]` → `Index(0)`
    /// - `$.items[-1]` on a 3-element array → `Index(2)`
    Index(usize),

    /// Marker appended by `~`; the match value is the key itself
    PropertyName,
}

/// Ordered segments from the root (exclusive) to a value.
pub type Path = Vec<PathSegment>;

impl PathSegment {
    /// The key as a JSON value: a string for fields, a number for indices.
    pub fn to_json(&self) -> JsonValue {
        match self {
            PathSegment::Field(name) => JsonValue::String(name.clone()),
            PathSegment::Index(i) => JsonValue::from(*i),
            PathSegment::PropertyName => JsonValue::String("~".to_string()),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => f.write_str(name),
            PathSegment::Index(i) => write!(f, "{}", i),
            PathSegment::PropertyName => f.write_str("~"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        PathSegment::Field(name)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}
