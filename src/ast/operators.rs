//! Default operator tables and the typed operators the evaluator knows.
//!
//! The parser works from string tables held in
//! [`GrammarConfig`](crate::grammar::GrammarConfig) so plugins can extend
//! them; the evaluator maps the matched strings back onto [`BinOp`] and
//! [`UnaryOp`].

/// Unary operators every grammar starts with.
pub const DEFAULT_UNARY_OPS: &[&str] = &["-", "!", "~", "+"];

/// Binary operators every grammar starts with; higher binds tighter.
pub const DEFAULT_BINARY_OPS: &[(&str, f64)] = &[
    ("||", 1.0),
    ("??", 1.0),
    ("&&", 2.0),
    ("|", 3.0),
    ("^", 4.0),
    ("&", 5.0),
    ("==", 6.0),
    ("!=", 6.0),
    ("===", 6.0),
    ("!==", 6.0),
    ("<", 7.0),
    (">", 7.0),
    ("<=", 7.0),
    (">=", 7.0),
    ("<<", 8.0),
    (">>", 8.0),
    (">>>", 8.0),
    ("+", 9.0),
    ("-", 9.0),
    ("*", 10.0),
    ("/", 10.0),
    ("%", 10.0),
    ("**", 11.0),
];

pub const DEFAULT_RIGHT_ASSOCIATIVE: &[&str] = &["**"];

/// Characters accepted in identifiers besides ASCII letters and digits.
pub const DEFAULT_IDENTIFIER_CHARS: &[char] = &['$', '_'];

pub const DEFAULT_THIS_KEYWORD: &str = "this";

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    /// `||`
    Or,
    /// `&&`
    And,
    /// `??`
    NullCoalesce,

    // Bitwise
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&`
    BitAnd,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `>>>`
    UnsignedShiftRight,

    // Comparison
    /// Loose equality (`==`)
    Equal,
    /// Loose inequality (`!=`)
    NotEqual,
    /// Strict equality (`===`)
    StrictEqual,
    /// Strict inequality (`!==`)
    StrictNotEqual,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `**`
    Power,
}

impl BinOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        use BinOp::*;
        Some(match symbol {
            "||" => Or,
            "&&" => And,
            "??" => NullCoalesce,
            "|" => BitOr,
            "^" => BitXor,
            "&" => BitAnd,
            "<<" => ShiftLeft,
            ">>" => ShiftRight,
            ">>>" => UnsignedShiftRight,
            "==" => Equal,
            "!=" => NotEqual,
            "===" => StrictEqual,
            "!==" => StrictNotEqual,
            "<" => LessThan,
            ">" => GreaterThan,
            "<=" => LessEqual,
            ">=" => GreaterEqual,
            "+" => Add,
            "-" => Subtract,
            "*" => Multiply,
            "/" => Divide,
            "%" => Modulo,
            "**" => Power,
            _ => return None,
        })
    }

    /// Operators whose right operand is only evaluated on demand.
    pub fn is_short_circuit(self) -> bool {
        matches!(self, BinOp::Or | BinOp::And | BinOp::NullCoalesce)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Negate,
    /// `+`
    Plus,
    /// `!`
    Not,
    /// `~`
    BitNot,
    /// `typeof`
    TypeOf,
}

impl UnaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "-" => UnaryOp::Negate,
            "+" => UnaryOp::Plus,
            "!" => UnaryOp::Not,
            "~" => UnaryOp::BitNot,
            "typeof" => UnaryOp::TypeOf,
            _ => return None,
        })
    }
}
