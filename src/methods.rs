//! Built-in methods reachable through member access.
//!
//! [`lookup`] decides whether a receiver has a method of a given name;
//! [`call`] runs it with the receiver it was bound to.

use serde_json::Value as JsonValue;

use crate::{
    evaluator::{EvalError, EvalResult},
    value::{Value, number_to_string},
};

pub const STRING_METHODS: &[&str] = &[
    "includes",
    "startsWith",
    "endsWith",
    "indexOf",
    "toUpperCase",
    "toLowerCase",
    "trim",
    "slice",
    "substring",
    "split",
    "charAt",
    "match",
    "replace",
    "concat",
    "toString",
];

pub const ARRAY_METHODS: &[&str] = &["includes", "indexOf", "join", "slice", "concat"];

pub const REGEX_METHODS: &[&str] = &["test"];

pub const NUMBER_METHODS: &[&str] = &["toFixed", "toString"];

pub const OBJECT_METHODS: &[&str] = &["hasOwnProperty"];

/// Canonical name of the method `name` on `receiver`, if it has one.
pub fn lookup(receiver: &Value<'_>, name: &str) -> Option<&'static str> {
    let table: &[&'static str] = match receiver {
        Value::String(_) => STRING_METHODS,
        Value::Array(_) | Value::Json(JsonValue::Array(_)) => ARRAY_METHODS,
        Value::Json(_) => OBJECT_METHODS,
        Value::Regex(_) => REGEX_METHODS,
        Value::Number(_) => NUMBER_METHODS,
        Value::Boolean(_) => &["toString"],
        _ => &[],
    };
    table.iter().copied().find(|m| *m == name)
}

/// Invokes a bound method.
pub fn call<'a>(receiver: Value<'a>, name: &str, args: Vec<Value<'a>>) -> EvalResult<Value<'a>> {
    match (&receiver, name) {
        (Value::String(s), _) => call_string_method(s, name, &args),
        (Value::Regex(re), "test") => {
            let input = arg(&args, 0).to_js_string();
            Ok(Value::Boolean(re.regex.is_match(&input)))
        }
        (Value::Number(n), "toFixed") => method_to_fixed(*n, &args),
        (Value::Number(n), "toString") => method_number_to_string(*n, &args),
        (Value::Boolean(b), "toString") => Ok(Value::String(b.to_string())),
        (Value::Json(JsonValue::Object(map)), "hasOwnProperty") => {
            let key = arg(&args, 0).to_js_string();
            Ok(Value::Boolean(map.contains_key(&key)))
        }
        _ => match receiver.array_items() {
            Some(items) => call_array_method(items, name, &args),
            None => Err(EvalError::Type(format!(
                "{}.{} is not a function",
                receiver.type_of(),
                name
            ))),
        },
    }
}

fn arg<'v, 'a>(args: &'v [Value<'a>], index: usize) -> &'v Value<'a> {
    const UNDEFINED: &Value<'static> = &Value::Undefined;
    args.get(index).unwrap_or(UNDEFINED)
}

/// Integer argument with `undefined` mapped to `default`; `NaN` is 0.
fn int_arg(args: &[Value<'_>], index: usize, default: f64) -> f64 {
    match arg(args, index) {
        Value::Undefined => default,
        other => {
            let n = other.to_number();
            if n.is_nan() { 0.0 } else { n.trunc() }
        }
    }
}

/// Resolves a possibly negative position against `len` the way `slice`
/// does.
fn relative_index(position: f64, len: usize) -> usize {
    let len_f = len as f64;
    if position < 0.0 {
        (len_f + position).max(0.0) as usize
    } else {
        position.min(len_f) as usize
    }
}

fn clamp_index(position: f64, len: usize) -> usize {
    position.clamp(0.0, len as f64) as usize
}

fn char_slice(chars: &[char], start: usize, end: usize) -> String {
    if start >= end {
        return String::new();
    }
    chars[start..end].iter().collect()
}

fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

fn call_string_method<'a>(s: &str, name: &str, args: &[Value<'a>]) -> EvalResult<Value<'a>> {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    match name {
        "includes" => {
            let needle: Vec<char> = arg(args, 0).to_js_string().chars().collect();
            let from = clamp_index(int_arg(args, 1, 0.0), len);
            Ok(Value::Boolean(find_from(&chars, &needle, from).is_some()))
        }
        "startsWith" => {
            let needle: Vec<char> = arg(args, 0).to_js_string().chars().collect();
            let from = clamp_index(int_arg(args, 1, 0.0), len);
            Ok(Value::Boolean(chars[from..].starts_with(&needle)))
        }
        "endsWith" => {
            let needle: Vec<char> = arg(args, 0).to_js_string().chars().collect();
            let end = clamp_index(int_arg(args, 1, len as f64), len);
            Ok(Value::Boolean(chars[..end].ends_with(&needle)))
        }
        "indexOf" => {
            let needle: Vec<char> = arg(args, 0).to_js_string().chars().collect();
            let from = clamp_index(int_arg(args, 1, 0.0), len);
            Ok(Value::Number(
                find_from(&chars, &needle, from).map_or(-1.0, |i| i as f64),
            ))
        }
        "toUpperCase" => Ok(Value::String(s.to_uppercase())),
        "toLowerCase" => Ok(Value::String(s.to_lowercase())),
        "trim" => Ok(Value::String(s.trim().to_string())),
        "toString" => Ok(Value::String(s.to_string())),
        "slice" => {
            let start = relative_index(int_arg(args, 0, 0.0), len);
            let end = relative_index(int_arg(args, 1, len as f64), len);
            Ok(Value::String(char_slice(&chars, start, end)))
        }
        "substring" => {
            let a = clamp_index(int_arg(args, 0, 0.0), len);
            let b = clamp_index(int_arg(args, 1, len as f64), len);
            Ok(Value::String(char_slice(&chars, a.min(b), a.max(b))))
        }
        "charAt" => {
            let index = int_arg(args, 0, 0.0);
            let ch = if index >= 0.0 {
                chars.get(index as usize).map(char::to_string)
            } else {
                None
            };
            Ok(Value::String(ch.unwrap_or_default()))
        }
        "concat" => {
            let mut out = s.to_string();
            for a in args {
                out.push_str(&a.to_js_string());
            }
            Ok(Value::String(out))
        }
        "split" => method_split(s, args),
        "match" => method_match(s, args),
        "replace" => method_replace(s, args),
        _ => Err(EvalError::Type(format!("string.{} is not a function", name))),
    }
}

fn method_split<'a>(s: &str, args: &[Value<'a>]) -> EvalResult<Value<'a>> {
    let limit = match arg(args, 1) {
        Value::Undefined => usize::MAX,
        other => other.to_uint32() as usize,
    };
    let parts: Vec<String> = match arg(args, 0) {
        Value::Undefined => vec![s.to_string()],
        Value::Regex(re) => re.regex.split(s).map(str::to_string).collect(),
        separator => {
            let separator = separator.to_js_string();
            if separator.is_empty() {
                s.chars().map(String::from).collect()
            } else {
                s.split(separator.as_str()).map(str::to_string).collect()
            }
        }
    };
    Ok(Value::Array(
        parts.into_iter().take(limit).map(Value::String).collect(),
    ))
}

fn method_match<'a>(s: &str, args: &[Value<'a>]) -> EvalResult<Value<'a>> {
    let Value::Regex(re) = arg(args, 0) else {
        let needle = arg(args, 0).to_js_string();
        return Ok(match s.find(&needle) {
            Some(_) => Value::Array(vec![Value::String(needle)]),
            None => Value::Null,
        });
    };

    if re.is_global() {
        let all: Vec<Value<'a>> = re
            .regex
            .find_iter(s)
            .map(|m| Value::String(m.as_str().to_string()))
            .collect();
        return Ok(if all.is_empty() {
            Value::Null
        } else {
            Value::Array(all)
        });
    }

    Ok(match re.regex.captures(s) {
        Some(caps) => Value::Array(
            caps.iter()
                .map(|group| match group {
                    Some(m) => Value::String(m.as_str().to_string()),
                    None => Value::Undefined,
                })
                .collect(),
        ),
        None => Value::Null,
    })
}

/// Expands `$$`, `$&` and `$1`..`$99` in a replacement template.
fn expand_replacement(template: &str, groups: &[Option<&str>]) -> String {
    let mut out = String::new();
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some('&') => {
                chars.next();
                out.push_str(groups.first().copied().flatten().unwrap_or(""));
            }
            Some(d) if d.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() || digits.len() == 2 {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                match digits.parse::<usize>() {
                    Ok(n) if n > 0 && n < groups.len() => {
                        out.push_str(groups[n].unwrap_or(""));
                    }
                    _ => {
                        out.push('$');
                        out.push_str(&digits);
                    }
                }
            }
            _ => out.push('$'),
        }
    }
    out
}

fn method_replace<'a>(s: &str, args: &[Value<'a>]) -> EvalResult<Value<'a>> {
    let template = arg(args, 1).to_js_string();
    let Value::Regex(re) = arg(args, 0) else {
        let needle = arg(args, 0).to_js_string();
        return Ok(Value::String(match s.find(&needle) {
            Some(at) => {
                let replacement = expand_replacement(&template, &[Some(needle.as_str())]);
                format!("{}{}{}", &s[..at], replacement, &s[at + needle.len()..])
            }
            None => s.to_string(),
        }));
    };

    let limit = if re.is_global() { 0 } else { 1 };
    let replaced = re.regex.replacen(s, limit, |caps: &regex::Captures<'_>| {
        let groups: Vec<Option<&str>> = caps.iter().map(|g| g.map(|m| m.as_str())).collect();
        expand_replacement(&template, &groups)
    });
    Ok(Value::String(replaced.into_owned()))
}

fn method_to_fixed<'a>(n: f64, args: &[Value<'a>]) -> EvalResult<Value<'a>> {
    let digits = int_arg(args, 0, 0.0);
    if !(0.0..=100.0).contains(&digits) {
        return Err(EvalError::Range(
            "toFixed() digits argument must be between 0 and 100".to_string(),
        ));
    }
    if !n.is_finite() {
        return Ok(Value::String(number_to_string(n)));
    }
    Ok(Value::String(format!("{:.*}", digits as usize, n)))
}

fn method_number_to_string<'a>(n: f64, args: &[Value<'a>]) -> EvalResult<Value<'a>> {
    let radix = int_arg(args, 0, 10.0);
    if !(2.0..=36.0).contains(&radix) {
        return Err(EvalError::Range(
            "toString() radix must be between 2 and 36".to_string(),
        ));
    }
    if radix == 10.0 || !n.is_finite() {
        return Ok(Value::String(number_to_string(n)));
    }

    // Fractional digits are dropped for non-decimal radixes.
    let radix = radix as u64;
    let mut whole = n.abs().trunc() as u64;
    let mut digits = Vec::new();
    loop {
        let d = (whole % radix) as u32;
        digits.push(char::from_digit(d, radix as u32).unwrap_or('0'));
        whole /= radix;
        if whole == 0 {
            break;
        }
    }
    if n < 0.0 {
        digits.push('-');
    }
    Ok(Value::String(digits.iter().rev().collect()))
}

fn call_array_method<'a>(
    items: Vec<Value<'a>>,
    name: &str,
    args: &[Value<'a>],
) -> EvalResult<Value<'a>> {
    let len = items.len();
    match name {
        "includes" => {
            let needle = arg(args, 0);
            Ok(Value::Boolean(items.iter().any(|v| v.same_value_zero(needle))))
        }
        "indexOf" => {
            let needle = arg(args, 0);
            Ok(Value::Number(
                items
                    .iter()
                    .position(|v| v.strict_eq(needle))
                    .map_or(-1.0, |i| i as f64),
            ))
        }
        "join" => {
            let separator = match arg(args, 0) {
                Value::Undefined => ",".to_string(),
                other => other.to_js_string(),
            };
            Ok(Value::String(
                items
                    .iter()
                    .map(|v| if v.is_nullish() { String::new() } else { v.to_js_string() })
                    .collect::<Vec<_>>()
                    .join(&separator),
            ))
        }
        "slice" => {
            let start = relative_index(int_arg(args, 0, 0.0), len);
            let end = relative_index(int_arg(args, 1, len as f64), len);
            Ok(Value::Array(if start < end {
                items[start..end].to_vec()
            } else {
                Vec::new()
            }))
        }
        "concat" => {
            let mut out = items;
            for a in args {
                match a.array_items() {
                    Some(more) => out.extend(more),
                    None => out.push(a.clone()),
                }
            }
            Ok(Value::Array(out))
        }
        _ => Err(EvalError::Type(format!("array.{} is not a function", name))),
    }
}
