//! Parse fully parenthesized expressions into a binary tree, then evaluate
//! or differentiate them symbolically.
//!
//! ```rust
//! use derivatives::{ops, parse};
//!
//! let tree = parse("( x / ( z + 1 ) )").unwrap();
//! let derivative = tree.derivative("z").unwrap();
//!
//! assert_eq!(ops::simplify(&derivative).to_string(), "-x/(z + 1)**2");
//! ```

#[cfg(test)]
#[macro_use]
extern crate approx;
#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod calculus;
mod expr;
pub mod ops;
mod parse;
mod tree;

pub use calculus::{derivative, evaluate, PowerRule, DEFAULT_VARIABLE};
pub use expr::{BinaryOperation, Builtin, Expression, Symbol};
pub use num_bigint::BigInt;
pub use ops::EvaluationError;
pub use parse::{
    parse, parse_bytes, parse_tokens, MalformedKind, ParseError, Token,
};
pub use tree::{ExpressionTree, Function, NodeId, NodeRef, Value};
