use serde::Serialize;

/// Value carried by a `Literal` node.
///
/// Keyword literals (`true`, `null`, ...) come from the grammar's literal
/// table; regex literals are produced by the regex plugin and compiled only
/// when evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Null,
    Undefined,
    Boolean(bool),
    Number(f64),
    String(String),
    Regex { pattern: String, flags: String },
}

impl Literal {
    pub fn is_regex(&self) -> bool {
        matches!(self, Literal::Regex { .. })
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Boolean(b)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(n)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}
