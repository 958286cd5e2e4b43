use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use tracing::instrument;

use crate::{
    ast::{BinOp, Expr, Literal, UnaryOp},
    methods,
    value::{RegexValue, Value, number_to_string},
};

/// Names that may only be read when they are an own property of the
/// object (or a binding in the scope).
pub const BLOCKED_PROPERTIES: &[&str] = &[
    "constructor",
    "__proto__",
    "__defineGetter__",
    "__defineSetter__",
];

/// Errors raised while evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Identifier not bound in the scope
    #[error("ReferenceError: {0}")]
    Reference(String),

    /// Operation not valid for the value: property read on `null`, call of
    /// a non-function, blocked property
    #[error("TypeError: {0}")]
    Type(String),

    /// Node or operator the evaluator does not support, invalid assignment
    /// target, malformed regex literal
    #[error("SyntaxError: {0}")]
    Syntax(String),

    /// Argument outside the range a built-in accepts
    #[error("RangeError: {0}")]
    Range(String),
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Flat name -> value bindings an expression is evaluated against.
///
/// Lookups never fall through to anything outside the scope. Assignments
/// write straight into it; there is no block scoping.
#[derive(Debug, Clone, Default)]
pub struct Scope<'a> {
    bindings: HashMap<String, Value<'a>>,
}

impl<'a> Scope<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds every entry of a JSON object.
    pub fn from_json(context: &'a Map<String, JsonValue>) -> Self {
        Scope {
            bindings: context
                .iter()
                .map(|(k, v)| (k.clone(), Value::from_json(v)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value<'a>> {
        self.bindings.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value<'a>) {
        self.bindings.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }
}

/// Structural interpreter over [`Expr`] trees.
///
/// Every node type is handled by walking the tree; there is no code
/// generation and no access to anything not reachable from the [`Scope`].
///
/// # Examples
///
/// ```
/// use peek_query::{Evaluator, parse_expression};
/// use serde_json::json;
///
/// let expr = parse_expression("price * qty > 100 ? 'bulk' : 'retail'").unwrap();
/// let result = Evaluator::new()
///     .evaluate_json(&expr, &json!({"price": 30, "qty": 4}))
///     .unwrap();
/// assert_eq!(result, json!("bulk"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Evaluator
    }

    /// Evaluates against a JSON context object and renders the result as
    /// JSON. A `null` context is an empty scope.
    #[instrument(level = "trace", skip_all, fields(node = expr.type_name()))]
    pub fn evaluate_json(&self, expr: &Expr, context: &JsonValue) -> EvalResult<JsonValue> {
        let mut scope = match context {
            JsonValue::Object(map) => Scope::from_json(map),
            JsonValue::Null => Scope::new(),
            other => {
                return Err(EvalError::Type(format!(
                    "evaluation context must be an object, got {}",
                    Value::from_json(other).type_of()
                )));
            }
        };
        Ok(self.evaluate(expr, &mut scope)?.to_json())
    }

    pub fn evaluate<'a>(&self, expr: &Expr, scope: &mut Scope<'a>) -> EvalResult<Value<'a>> {
        match expr {
            Expr::Literal { value, .. } => eval_literal(value),
            Expr::Identifier { name } => lookup(name, scope),
            Expr::This => Ok(scope.get("this").cloned().unwrap_or(Value::Undefined)),
            Expr::Array { elements } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(match element {
                        Some(e) => self.evaluate(e, scope)?,
                        None => Value::Undefined,
                    });
                }
                Ok(Value::Array(items))
            }
            Expr::Compound { body } => self.eval_compound(body, scope),
            Expr::Sequence { expressions } => {
                let mut last = Value::Undefined;
                for e in expressions {
                    last = self.evaluate(e, scope)?;
                }
                Ok(last)
            }
            Expr::Member { .. } | Expr::Call { .. } => {
                Ok(self.eval_chain(expr, scope)?.unwrap_or(Value::Undefined))
            }
            Expr::Unary {
                operator, argument, ..
            } => self.eval_unary(operator, argument, scope),
            Expr::Binary {
                operator,
                left,
                right,
            } => self.eval_binary(operator, left, right, scope),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.evaluate(test, scope)?.is_truthy() {
                    self.evaluate(consequent, scope)
                } else {
                    self.evaluate(alternate, scope)
                }
            }
            Expr::Assignment {
                operator,
                left,
                right,
            } => self.eval_assignment(operator, left, right, scope),
            Expr::Update {
                operator,
                argument,
                prefix,
            } => self.eval_update(operator, argument, *prefix, scope),
        }
    }

    /// Runs each statement in order and returns the last value. A
    /// `var`/`let`/`const` keyword directly before an assignment is skipped.
    fn eval_compound<'a>(&self, body: &[Expr], scope: &mut Scope<'a>) -> EvalResult<Value<'a>> {
        let mut last = Value::Undefined;
        let mut i = 0;
        while i < body.len() {
            if let Expr::Identifier { name } = &body[i]
                && matches!(name.as_str(), "var" | "let" | "const")
                && matches!(body.get(i + 1), Some(Expr::Assignment { .. }))
            {
                i += 1;
            }
            last = self.evaluate(&body[i], scope)?;
            i += 1;
        }
        Ok(last)
    }

    /// Member and call chains. `None` means an optional link met `null` or
    /// `undefined` and the rest of the chain was skipped.
    fn eval_chain<'a>(&self, expr: &Expr, scope: &mut Scope<'a>) -> EvalResult<Option<Value<'a>>> {
        match expr {
            Expr::Member {
                computed,
                object,
                property,
                optional,
            } => {
                let Some(object) = self.eval_chain(object, scope)? else {
                    return Ok(None);
                };
                if *optional && object.is_nullish() {
                    return Ok(None);
                }
                let key = if *computed {
                    property_key(&self.evaluate(property, scope)?)
                } else {
                    match property.as_ref() {
                        Expr::Identifier { name } => name.clone(),
                        other => property_key(&self.evaluate(other, scope)?),
                    }
                };
                get_property(object, &key).map(Some)
            }
            Expr::Call {
                arguments,
                callee,
                optional,
            } => {
                let Some(function) = self.eval_chain(callee, scope)? else {
                    return Ok(None);
                };
                if *optional && function.is_nullish() {
                    return Ok(None);
                }
                let mut args = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg, scope)?);
                }
                match function {
                    Value::Method { receiver, name } => methods::call(*receiver, name, args).map(Some),
                    _ => Err(EvalError::Type(format!("{} is not a function", describe(callee)))),
                }
            }
            other => self.evaluate(other, scope).map(Some),
        }
    }

    fn eval_unary<'a>(
        &self,
        operator: &str,
        argument: &Expr,
        scope: &mut Scope<'a>,
    ) -> EvalResult<Value<'a>> {
        let Some(op) = UnaryOp::from_symbol(operator) else {
            return Err(EvalError::Syntax(format!("Unsupported unary operator {}", operator)));
        };
        if op == UnaryOp::TypeOf
            && let Expr::Identifier { name } = argument
            && !scope.contains(name)
        {
            return Ok(Value::String("undefined".to_string()));
        }

        let value = self.evaluate(argument, scope)?;
        Ok(match op {
            UnaryOp::Negate => Value::Number(-value.to_number()),
            UnaryOp::Plus => Value::Number(value.to_number()),
            UnaryOp::Not => Value::Boolean(!value.is_truthy()),
            UnaryOp::BitNot => Value::Number(f64::from(!value.to_int32())),
            UnaryOp::TypeOf => Value::String(value.type_of().to_string()),
        })
    }

    fn eval_binary<'a>(
        &self,
        operator: &str,
        left: &Expr,
        right: &Expr,
        scope: &mut Scope<'a>,
    ) -> EvalResult<Value<'a>> {
        let Some(op) = BinOp::from_symbol(operator) else {
            return Err(EvalError::Syntax(format!("Unsupported operator {}", operator)));
        };
        let left = self.evaluate(left, scope)?;
        if op.is_short_circuit() {
            let keep_left = match op {
                BinOp::Or => left.is_truthy(),
                BinOp::And => !left.is_truthy(),
                _ => !left.is_nullish(),
            };
            return if keep_left {
                Ok(left)
            } else {
                self.evaluate(right, scope)
            };
        }
        let right = self.evaluate(right, scope)?;
        Ok(apply_binop(op, &left, &right))
    }

    fn eval_assignment<'a>(
        &self,
        operator: &str,
        left: &Expr,
        right: &Expr,
        scope: &mut Scope<'a>,
    ) -> EvalResult<Value<'a>> {
        let Expr::Identifier { name } = left else {
            return Err(EvalError::Syntax("Invalid left-hand side in assignment".to_string()));
        };

        let value = if operator == "=" {
            self.evaluate(right, scope)?
        } else {
            let symbol = operator.strip_suffix('=').unwrap_or(operator);
            let Some(op) = BinOp::from_symbol(symbol) else {
                return Err(EvalError::Syntax(format!("Unsupported operator {}", operator)));
            };
            let current = lookup(name, scope)?;
            if op.is_short_circuit() {
                let keep = match op {
                    BinOp::Or => current.is_truthy(),
                    BinOp::And => !current.is_truthy(),
                    _ => !current.is_nullish(),
                };
                if keep {
                    return Ok(current);
                }
                self.evaluate(right, scope)?
            } else {
                let right = self.evaluate(right, scope)?;
                apply_binop(op, &current, &right)
            }
        };

        scope.set(name.clone(), value.clone());
        Ok(value)
    }

    fn eval_update<'a>(
        &self,
        operator: &str,
        argument: &Expr,
        prefix: bool,
        scope: &mut Scope<'a>,
    ) -> EvalResult<Value<'a>> {
        let Expr::Identifier { name } = argument else {
            let position = if prefix { "prefix" } else { "postfix" };
            return Err(EvalError::Syntax(format!(
                "Invalid left-hand side expression in {} operation",
                position
            )));
        };
        let old = lookup(name, scope)?.to_number();
        let new = if operator == "++" { old + 1.0 } else { old - 1.0 };
        scope.set(name.clone(), Value::Number(new));
        Ok(Value::Number(if prefix { new } else { old }))
    }
}

fn eval_literal<'a>(literal: &Literal) -> EvalResult<Value<'a>> {
    Ok(match literal {
        Literal::Null => Value::Null,
        Literal::Undefined => Value::Undefined,
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Regex { pattern, flags } => {
            let regex = RegexValue::new(pattern, flags).map_err(EvalError::Syntax)?;
            Value::Regex(Arc::new(regex))
        }
    })
}

fn lookup<'a>(name: &str, scope: &Scope<'a>) -> EvalResult<Value<'a>> {
    if let Some(value) = scope.get(name) {
        return Ok(value.clone());
    }
    if BLOCKED_PROPERTIES.contains(&name) {
        return Err(EvalError::Type(format!("Cannot access blocked name '{}'", name)));
    }
    Err(EvalError::Reference(format!("{} is not defined", name)))
}

/// Property key for a computed member access.
pub fn property_key(value: &Value<'_>) -> String {
    match value {
        Value::Number(n) => number_to_string(*n),
        other => other.to_js_string(),
    }
}

fn array_index(key: &str) -> Option<usize> {
    let index = key.parse::<usize>().ok()?;
    (index.to_string() == key).then_some(index)
}

fn has_own_property(object: &Value<'_>, key: &str) -> bool {
    match object {
        Value::Json(JsonValue::Object(map)) => map.contains_key(key),
        Value::Json(JsonValue::Array(items)) => {
            key == "length" || array_index(key).is_some_and(|i| i < items.len())
        }
        Value::Array(items) => key == "length" || array_index(key).is_some_and(|i| i < items.len()),
        Value::String(s) => key == "length" || array_index(key).is_some_and(|i| i < s.chars().count()),
        _ => false,
    }
}

/// Reads `key` from `object`. Methods come back bound to `object`.
pub fn get_property<'a>(object: Value<'a>, key: &str) -> EvalResult<Value<'a>> {
    if object.is_nullish() {
        return Err(EvalError::Type(format!(
            "Cannot read properties of {} (reading '{}')",
            object.to_js_string(),
            key
        )));
    }
    if BLOCKED_PROPERTIES.contains(&key) && !has_own_property(&object, key) {
        return Err(EvalError::Type(format!(
            "Cannot read properties of {} (reading '{}')",
            object.to_js_string(),
            key
        )));
    }

    let own = match &object {
        Value::Json(json) => {
            let json: &'a JsonValue = *json;
            match json {
                JsonValue::Object(map) => map.get(key).map(Value::from_json),
                JsonValue::Array(items) if key == "length" => Some(Value::Number(items.len() as f64)),
                JsonValue::Array(items) => array_index(key)
                    .and_then(|i| items.get(i))
                    .map(Value::from_json),
                _ => None,
            }
        }
        Value::Array(items) if key == "length" => Some(Value::Number(items.len() as f64)),
        Value::Array(items) => array_index(key).and_then(|i| items.get(i)).cloned(),
        Value::String(s) if key == "length" => Some(Value::Number(s.chars().count() as f64)),
        Value::String(s) => array_index(key)
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string())),
        Value::Regex(re) => match key {
            "source" => Some(Value::String(re.source.clone())),
            "flags" => Some(Value::String(re.flags.clone())),
            "global" => Some(Value::Boolean(re.is_global())),
            _ => None,
        },
        _ => None,
    };
    if let Some(value) = own {
        return Ok(value);
    }

    Ok(match methods::lookup(&object, key) {
        Some(name) => Value::Method {
            receiver: Box::new(object),
            name,
        },
        None => Value::Undefined,
    })
}

pub fn apply_binop<'a>(op: BinOp, left: &Value<'a>, right: &Value<'a>) -> Value<'a> {
    let num = |n: f64| Value::Number(n);
    match op {
        BinOp::Or => {
            if left.is_truthy() {
                left.clone()
            } else {
                right.clone()
            }
        }
        BinOp::And => {
            if left.is_truthy() {
                right.clone()
            } else {
                left.clone()
            }
        }
        BinOp::NullCoalesce => {
            if left.is_nullish() {
                right.clone()
            } else {
                left.clone()
            }
        }
        BinOp::BitOr => num(f64::from(left.to_int32() | right.to_int32())),
        BinOp::BitXor => num(f64::from(left.to_int32() ^ right.to_int32())),
        BinOp::BitAnd => num(f64::from(left.to_int32() & right.to_int32())),
        BinOp::ShiftLeft => num(f64::from(
            left.to_int32().wrapping_shl(right.to_uint32() & 31),
        )),
        BinOp::ShiftRight => num(f64::from(left.to_int32() >> (right.to_uint32() & 31))),
        BinOp::UnsignedShiftRight => num(f64::from(left.to_uint32() >> (right.to_uint32() & 31))),
        BinOp::Equal => Value::Boolean(left.loose_eq(right)),
        BinOp::NotEqual => Value::Boolean(!left.loose_eq(right)),
        BinOp::StrictEqual => Value::Boolean(left.strict_eq(right)),
        BinOp::StrictNotEqual => Value::Boolean(!left.strict_eq(right)),
        BinOp::LessThan => Value::Boolean(left.compare(right) == Some(Ordering::Less)),
        BinOp::GreaterThan => Value::Boolean(left.compare(right) == Some(Ordering::Greater)),
        BinOp::LessEqual => Value::Boolean(matches!(
            left.compare(right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinOp::GreaterEqual => Value::Boolean(matches!(
            left.compare(right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinOp::Add => left.add(right),
        BinOp::Subtract => num(left.to_number() - right.to_number()),
        BinOp::Multiply => num(left.to_number() * right.to_number()),
        BinOp::Divide => num(left.to_number() / right.to_number()),
        BinOp::Modulo => num(left.to_number() % right.to_number()),
        BinOp::Power => {
            let exponent = right.to_number();
            if exponent.is_nan() {
                num(f64::NAN)
            } else {
                num(left.to_number().powf(exponent))
            }
        }
    }
}

/// Source-like text for a callee, used in "is not a function" errors.
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Identifier { name } => name.clone(),
        Expr::This => "this".to_string(),
        Expr::Member {
            computed: false,
            object,
            property,
            ..
        } => format!("{}.{}", describe(object), describe(property)),
        Expr::Member {
            computed: true,
            object,
            property,
            ..
        } => format!("{}[{}]", describe(object), describe(property)),
        Expr::Literal { raw, .. } => raw.clone(),
        Expr::Call { callee, .. } => format!("{}(...)", describe(callee)),
        other => other.type_name().to_string(),
    }
}
