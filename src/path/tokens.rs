use std::fmt;

/// One step of a parsed path expression.
///
/// Produced by [`tokenize`](super::tokenize) and rendered back by
/// [`to_path_string`](super::to_path_string); the two round-trip.
#[derive(Debug, Clone, PartialEq)]
pub enum PathToken {
    /// Own property by name (`.name`, `['name']`, `` .`name ``)
    Name(String),

    /// Array position (`[2]`); negative counts from the end
    Index(i64),

    /// Every child (`.*`, `[*]`)
    Wildcard,

    /// Recursive descent (`..`): the rest of the path is applied at this
    /// node and at every node below it
    Descendant,

    /// `[start:end:step]`
    Slice(Slice),

    /// `[?(expr)]`, source kept verbatim and parsed on first use
    Filter(String),

    /// `[(expr)]`, evaluated once at the current node; the result is used
    /// as the next name or index
    Script(String),

    /// `^`: continue from the parent of the match
    Parent,

    /// `~`: yield the key of the match instead of its value
    PropertyName,

    /// `@string()`, `@number()`, ...
    TypeCheck(ValueType),

    /// `[a,b,1]`: each part applied independently, results concatenated
    Union(Vec<PathToken>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slice {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub step: Option<i64>,
}

impl Slice {
    /// Indices selected from an array of length `len`, in visiting order.
    ///
    /// Bounds follow the usual half-open slice rules: negative bounds count
    /// from the end and are clamped to the array; a zero step is treated as
    /// one; a negative step walks backwards. A step past the array's length
    /// selects only the first index.
    pub fn indices(&self, len: usize) -> Vec<usize> {
        let len = len as i64;
        let step = match self.step {
            Some(0) | None => 1,
            Some(step) => step,
        };

        let mut out = Vec::new();
        if step > 0 {
            let clamp = |i: i64| if i < 0 { (i + len).max(0) } else { i.min(len) };
            let start = self.start.map_or(0, clamp);
            let end = self.end.map_or(len, clamp);
            let mut i = start;
            while i < end {
                out.push(i as usize);
                let Some(next) = i.checked_add(step) else {
                    break;
                };
                i = next;
            }
        } else {
            let clamp = |i: i64| if i < 0 { (i + len).max(-1) } else { i.min(len - 1) };
            let start = self.start.map_or(len - 1, clamp);
            let end = self.end.map_or(-1, clamp);
            let mut i = start;
            while i > end {
                out.push(i as usize);
                let Some(next) = i.checked_add(step) else {
                    break;
                };
                i = next;
            }
        }
        out
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{}", start)?;
        }
        f.write_str(":")?;
        if let Some(end) = self.end {
            write!(f, "{}", end)?;
        }
        if let Some(step) = self.step {
            write!(f, ":{}", step)?;
        }
        Ok(())
    }
}

/// Runtime type tested by a `@type()` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    String,
    Integer,
    Array,
    Object,
    Scalar,
    NonFinite,
    Undefined,
    Function,
    /// Delegated to the engine's configured predicate
    Other,
}

impl ValueType {
    pub const ALL: [ValueType; 12] = [
        ValueType::Null,
        ValueType::Boolean,
        ValueType::Number,
        ValueType::String,
        ValueType::Integer,
        ValueType::Array,
        ValueType::Object,
        ValueType::Scalar,
        ValueType::NonFinite,
        ValueType::Undefined,
        ValueType::Function,
        ValueType::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Scalar => "scalar",
            ValueType::NonFinite => "nonFinite",
            ValueType::Undefined => "undefined",
            ValueType::Function => "function",
            ValueType::Other => "other",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}()", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Slice {
        Slice { start, end, step }
    }

    #[test]
    fn test_slice_indices() {
        assert_eq!(slice(None, None, None).indices(3), vec![0, 1, 2]);
        assert_eq!(slice(Some(1), None, None).indices(4), vec![1, 2, 3]);
        assert_eq!(slice(Some(-2), None, None).indices(4), vec![2, 3]);
        assert_eq!(slice(None, Some(-1), None).indices(4), vec![0, 1, 2]);
        assert_eq!(slice(None, None, Some(2)).indices(5), vec![0, 2, 4]);
        assert_eq!(slice(Some(0), Some(0), None).indices(5), Vec::<usize>::new());
        assert_eq!(slice(Some(10), Some(20), None).indices(5), Vec::<usize>::new());
    }

    #[test]
    fn test_negative_step_walks_backwards() {
        assert_eq!(slice(None, None, Some(-1)).indices(3), vec![2, 1, 0]);
        assert_eq!(slice(Some(3), Some(0), Some(-2)).indices(5), vec![3, 1]);
        assert_eq!(slice(None, None, Some(-1)).indices(0), Vec::<usize>::new());
    }

    #[test]
    fn test_huge_step_stops_at_the_first_index() {
        assert_eq!(slice(Some(1), None, Some(i64::MAX)).indices(3), vec![1]);
        assert_eq!(slice(None, None, Some(i64::MIN)).indices(3), vec![2]);
        assert_eq!(
            slice(Some(i64::MIN), Some(i64::MAX), Some(i64::MAX)).indices(3),
            vec![0]
        );
    }

    #[test]
    fn test_slice_display() {
        assert_eq!(slice(Some(1), None, None).to_string(), "1:");
        assert_eq!(slice(None, Some(-1), Some(2)).to_string(), ":-1:2");
    }
}
