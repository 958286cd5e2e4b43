//! # Expression Abstract Syntax Tree
//!
//! Nodes produced by [`crate::parser::Parser`] and consumed by
//! [`crate::evaluator::Evaluator`].
//!
//! - **[expressions]** - the [`Expr`] tagged union, one variant per node type
//! - **[literal]** - literal values carried by `Literal` nodes
//! - **[operators]** - default operator tables and the typed operator enums
//!   the evaluator dispatches on
//!
//! Nodes serialize with a `type` tag using the conventional names
//! (`BinaryExpression`, `MemberExpression`, ...), so a parsed tree can be
//! printed as JSON:
//!
//! ```text
//! a.b + 1
//! {"type":"BinaryExpression","operator":"+","left":{"type":"MemberExpression",...},"right":{"type":"Literal","value":1.0,"raw":"1"}}
//! ```
pub mod expressions;
pub mod literal;
pub mod operators;

pub use expressions::Expr;
pub use literal::Literal;
pub use operators::{BinOp, UnaryOp};
