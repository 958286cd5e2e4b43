use serde::Serialize;

use crate::ast::Literal;

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Each variant carries only the fields relevant to it. Nodes are built once
/// by the parser; plugins may rebuild them while parsing (see the ternary
/// precedence repair), never afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    /// Bare name, resolved against the evaluation scope
    ///
    /// # Example
    /// ```text
    /// user
    /// ```
    #[serde(rename = "Identifier")]
    Identifier { name: String },

    /// Literal value together with its source text
    ///
    /// # Examples
    /// ```text
    /// 42
    /// "hello"
    /// /ab+c/i
    /// ```
    #[serde(rename = "Literal")]
    Literal { value: Literal, raw: String },

    /// The configured `this` keyword
    #[serde(rename = "ThisExpression")]
    This,

    /// Array literal; `None` marks an elision (`[1,,2]`)
    #[serde(rename = "ArrayExpression")]
    Array { elements: Vec<Option<Expr>> },

    /// Several top-level expressions separated by `;` or `,`
    #[serde(rename = "Compound")]
    Compound { body: Vec<Expr> },

    /// Parenthesised comma list
    ///
    /// # Example
    /// ```text
    /// (a, b)
    /// ```
    #[serde(rename = "SequenceExpression")]
    Sequence { expressions: Vec<Expr> },

    /// Property access
    ///
    /// # Examples
    /// ```text
    /// user.name        // computed: false
    /// roles[0]         // computed: true
    /// user?.name       // optional: true
    /// ```
    #[serde(rename = "MemberExpression")]
    Member {
        computed: bool,
        object: Box<Expr>,
        property: Box<Expr>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        optional: bool,
    },

    /// Function or method call
    #[serde(rename = "CallExpression")]
    Call {
        arguments: Vec<Expr>,
        callee: Box<Expr>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        optional: bool,
    },

    /// Prefix unary operator (`-x`, `!x`, `typeof x`)
    #[serde(rename = "UnaryExpression")]
    Unary {
        operator: String,
        argument: Box<Expr>,
        prefix: bool,
    },

    /// Binary operator; the operator string is whatever the grammar's
    /// binary table matched
    #[serde(rename = "BinaryExpression")]
    Binary {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `test ? consequent : alternate`
    #[serde(rename = "ConditionalExpression")]
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },

    /// `=`, `+=`, `??=`, ... (assignment plugin)
    #[serde(rename = "AssignmentExpression")]
    Assignment {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `++x`, `x--` (assignment plugin)
    #[serde(rename = "UpdateExpression")]
    Update {
        operator: String,
        argument: Box<Expr>,
        prefix: bool,
    },
}

impl Expr {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expr::Identifier { name: name.into() }
    }

    pub fn number(value: f64) -> Self {
        Expr::Literal {
            value: Literal::Number(value),
            raw: value.to_string(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        let value = value.into();
        Expr::Literal {
            raw: format!("\"{}\"", value),
            value: Literal::String(value),
        }
    }

    pub fn binary(operator: impl Into<String>, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            operator: operator.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn member(object: Expr, name: impl Into<String>) -> Self {
        Expr::Member {
            computed: false,
            object: Box::new(object),
            property: Box::new(Expr::identifier(name)),
            optional: false,
        }
    }

    /// Node type name as it appears in the serialized tree.
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::Identifier { .. } => "Identifier",
            Expr::Literal { .. } => "Literal",
            Expr::This => "ThisExpression",
            Expr::Array { .. } => "ArrayExpression",
            Expr::Compound { .. } => "Compound",
            Expr::Sequence { .. } => "SequenceExpression",
            Expr::Member { .. } => "MemberExpression",
            Expr::Call { .. } => "CallExpression",
            Expr::Unary { .. } => "UnaryExpression",
            Expr::Binary { .. } => "BinaryExpression",
            Expr::Conditional { .. } => "ConditionalExpression",
            Expr::Assignment { .. } => "AssignmentExpression",
            Expr::Update { .. } => "UpdateExpression",
        }
    }

    /// Operator carried by the node, if any.
    pub fn operator(&self) -> Option<&str> {
        match self {
            Expr::Unary { operator, .. }
            | Expr::Binary { operator, .. }
            | Expr::Assignment { operator, .. }
            | Expr::Update { operator, .. } => Some(operator),
            _ => None,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Identifier { .. } | Expr::Literal { .. } | Expr::This => Vec::new(),
            Expr::Array { elements } => elements.iter().flatten().collect(),
            Expr::Compound { body } => body.iter().collect(),
            Expr::Sequence { expressions } => expressions.iter().collect(),
            Expr::Member {
                object, property, ..
            } => vec![&**object, &**property],
            Expr::Call {
                arguments, callee, ..
            } => std::iter::once(&**callee).chain(arguments).collect(),
            Expr::Unary { argument, .. } | Expr::Update { argument, .. } => vec![&**argument],
            Expr::Binary { left, right, .. } | Expr::Assignment { left, right, .. } => {
                vec![&**left, &**right]
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => vec![&**test, &**consequent, &**alternate],
        }
    }

    /// Number of nodes on the longest root-to-leaf path. Walks with an
    /// explicit stack so arbitrarily deep trees can be measured.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children().into_iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Rebuilds the node with `f` applied to every direct child.
    pub fn map_children<F>(self, mut f: F) -> Expr
    where
        F: FnMut(Expr) -> Expr,
    {
        match self {
            Expr::Identifier { .. } | Expr::Literal { .. } | Expr::This => self,
            Expr::Array { elements } => Expr::Array {
                elements: elements
                    .into_iter()
                    .map(|e| e.map(&mut f))
                    .collect(),
            },
            Expr::Compound { body } => Expr::Compound {
                body: body.into_iter().map(&mut f).collect(),
            },
            Expr::Sequence { expressions } => Expr::Sequence {
                expressions: expressions
                    .into_iter()
                    .map(&mut f)
                    .collect(),
            },
            Expr::Member {
                computed,
                object,
                property,
                optional,
            } => Expr::Member {
                computed,
                object: Box::new(f(*object)),
                property: Box::new(f(*property)),
                optional,
            },
            Expr::Call {
                arguments,
                callee,
                optional,
            } => Expr::Call {
                arguments: arguments
                    .into_iter()
                    .map(&mut f)
                    .collect(),
                callee: Box::new(f(*callee)),
                optional,
            },
            Expr::Unary {
                operator,
                argument,
                prefix,
            } => Expr::Unary {
                operator,
                argument: Box::new(f(*argument)),
                prefix,
            },
            Expr::Binary {
                operator,
                left,
                right,
            } => Expr::Binary {
                operator,
                left: Box::new(f(*left)),
                right: Box::new(f(*right)),
            },
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => Expr::Conditional {
                test: Box::new(f(*test)),
                consequent: Box::new(f(*consequent)),
                alternate: Box::new(f(*alternate)),
            },
            Expr::Assignment {
                operator,
                left,
                right,
            } => Expr::Assignment {
                operator,
                left: Box::new(f(*left)),
                right: Box::new(f(*right)),
            },
            Expr::Update {
                operator,
                argument,
                prefix,
            } => Expr::Update {
                operator,
                argument: Box::new(f(*argument)),
                prefix,
            },
        }
    }
}
