use std::{cmp::Ordering, fmt, ptr, sync::Arc};

use regex::{Regex, RegexBuilder};
use serde_json::{Number, Value as JsonValue};

/// A value produced while evaluating an expression.
///
/// Scalars are owned. JSON arrays and objects from the evaluation context
/// are borrowed as [`Value::Json`], so identity comparisons (`===`) between
/// two references to the same context node hold. Arrays built by the
/// expression itself (`[1, 2]`, `split`, `match`) are owned.
///
/// Coercions follow dynamic-language rules: truthiness, loose equality
/// with numeric coercion, `+` as concatenation when either side is a
/// string, 32-bit integer bitwise operators.
///
/// # Examples
///
/// ```
/// use peek_query::Value;
/// use serde_json::json;
///
/// let doc = json!({"n": 5});
/// let value = Value::from_json(&doc);
/// assert!(value.is_truthy());
/// assert_eq!(value.type_of(), "object");
/// assert_eq!(Value::Number(3.0).to_js_string(), "3");
/// ```
#[derive(Debug, Clone)]
pub enum Value<'a> {
    Undefined,

    Null,

    Boolean(bool),

    /// IEEE double; `NaN` and the infinities are ordinary values here
    Number(f64),

    String(String),

    /// Array created during evaluation
    Array(Vec<Value<'a>>),

    /// Array or object borrowed from the evaluation context
    Json(&'a JsonValue),

    Regex(Arc<RegexValue>),

    /// Built-in method bound to the value it was read from
    Method {
        receiver: Box<Value<'a>>,
        name: &'static str,
    },
}

/// Compiled regex literal plus the text it was written with.
#[derive(Debug)]
pub struct RegexValue {
    pub regex: Regex,
    pub source: String,
    pub flags: String,
}

impl RegexValue {
    pub fn new(source: &str, flags: &str) -> Result<Self, String> {
        Ok(RegexValue {
            regex: compile_regex(source, flags)?,
            source: source.to_string(),
            flags: flags.to_string(),
        })
    }

    pub fn is_global(&self) -> bool {
        self.flags.contains('g')
    }
}

/// Compiles a `/source/flags` literal. `i`, `m` and `s` map onto the
/// matching regex options; `d`, `g`, `u`, `v` and `y` are accepted and
/// otherwise ignored by compilation.
pub fn compile_regex(source: &str, flags: &str) -> Result<Regex, String> {
    let mut builder = RegexBuilder::new(source);
    let mut seen = String::new();
    for flag in flags.chars() {
        if seen.contains(flag) {
            return Err(format!(
                "Invalid flags supplied to RegExp constructor '{}'",
                flags
            ));
        }
        seen.push(flag);
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'd' | 'g' | 'u' | 'v' | 'y' => {}
            _ => {
                return Err(format!(
                    "Invalid flags supplied to RegExp constructor '{}'",
                    flags
                ));
            }
        }
    }
    builder
        .build()
        .map_err(|e| format!("Invalid regular expression: /{}/: {}", source, e))
}

impl<'a> Value<'a> {
    pub fn from_json(value: &'a JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) => Value::Json(value),
        }
    }

    /// JSON rendering. `undefined`, non-finite numbers and methods become
    /// `null`; integral numbers are written without a fraction.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Undefined | Value::Null | Value::Method { .. } => JsonValue::Null,
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Json(v) => (*v).clone(),
            Value::Regex(_) => JsonValue::Object(serde_json::Map::new()),
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Json(_) | Value::Regex(_) | Value::Method { .. } => true,
        }
    }

    /// Result of the `typeof` operator.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Method { .. } => "function",
            Value::Null | Value::Array(_) | Value::Json(_) | Value::Regex(_) => "object",
        }
    }

    fn is_object(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Json(_) | Value::Regex(_) | Value::Method { .. }
        )
    }

    /// Elements of an owned or borrowed array.
    pub fn array_items(&self) -> Option<Vec<Value<'a>>> {
        match self {
            Value::Array(items) => Some(items.clone()),
            Value::Json(json) => {
                let json: &'a JsonValue = *json;
                json.as_array()
                    .map(|items| items.iter().map(Value::from_json).collect())
            }
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Json(JsonValue::Array(_)))
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Array(_) | Value::Json(JsonValue::Array(_)) => {
                string_to_number(&self.to_js_string())
            }
            Value::Json(_) | Value::Regex(_) | Value::Method { .. } => f64::NAN,
        }
    }

    /// String conversion as used by `+`, `join` and property keys.
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => s.clone(),
            Value::Array(_) | Value::Json(JsonValue::Array(_)) => self
                .array_items()
                .unwrap_or_default()
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_js_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Json(JsonValue::Object(_)) => "[object Object]".to_string(),
            Value::Json(other) => Value::from_json(other).to_js_string(),
            Value::Regex(re) => format!("/{}/{}", re.source, re.flags),
            Value::Method { name, .. } => format!("function {}() {{ [native code] }}", name),
        }
    }

    /// Objects reduced to their string form; primitives unchanged.
    fn to_primitive(&self) -> Value<'a> {
        if self.is_object() {
            Value::String(self.to_js_string())
        } else {
            self.clone()
        }
    }

    /// `===`
    pub fn strict_eq(&self, other: &Value<'a>) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => ptr::eq(*a, *b),
            (Value::Regex(a), Value::Regex(b)) => Arc::ptr_eq(a, b),
            (
                Value::Method {
                    receiver: ra,
                    name: na,
                },
                Value::Method {
                    receiver: rb,
                    name: nb,
                },
            ) => na == nb && ra.strict_eq(rb),
            _ => false,
        }
    }

    /// `==`: `null` and `undefined` equal each other only; numbers,
    /// strings and booleans are compared numerically; objects are
    /// compared through their string form against primitives.
    pub fn loose_eq(&self, other: &Value<'a>) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
            (a, b) if a.is_object() && b.is_object() => a.strict_eq(b),
            (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
                self.to_number() == other.to_number()
            }
            (Value::Boolean(_), _) => Value::Number(self.to_number()).loose_eq(other),
            (_, Value::Boolean(_)) => self.loose_eq(&Value::Number(other.to_number())),
            (a, b) if a.is_object() => a.to_primitive().loose_eq(b),
            (a, b) if b.is_object() => a.loose_eq(&b.to_primitive()),
            (a, b) => a.strict_eq(b),
        }
    }

    /// Equality used by `includes`: strict, except `NaN` equals `NaN`.
    pub fn same_value_zero(&self, other: &Value<'a>) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => self.strict_eq(other),
        }
    }

    /// Ordering for `<`, `>`, `<=`, `>=`. Two strings compare
    /// lexicographically, anything else numerically; `None` when either
    /// side is `NaN`.
    pub fn compare(&self, other: &Value<'a>) -> Option<Ordering> {
        match (self.to_primitive(), other.to_primitive()) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(&b)),
            (a, b) => a.to_number().partial_cmp(&b.to_number()),
        }
    }

    /// `+`: concatenation when either operand is (or becomes) a string.
    pub fn add(&self, other: &Value<'a>) -> Value<'a> {
        let (a, b) = (self.to_primitive(), other.to_primitive());
        if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) {
            Value::String(a.to_js_string() + &b.to_js_string())
        } else {
            Value::Number(a.to_number() + b.to_number())
        }
    }

    pub fn to_int32(&self) -> i32 {
        to_uint32(self.to_number()) as i32
    }

    pub fn to_uint32(&self) -> u32 {
        to_uint32(self.to_number())
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_js_string())
    }
}

fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |n| n as f64);
    }
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Shortest round-trip rendering, with exponent notation outside
/// `[1e-6, 1e21)`.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if !(1e-6..1e21).contains(&abs) {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }
    format!("{}", n)
}

fn number_to_json(n: f64) -> JsonValue {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return JsonValue::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(JsonValue::Null, JsonValue::Number)
}
