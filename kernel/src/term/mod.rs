//! Term module: expressions, parsing, equations.
//!
//! Depends only on `proof::hash` for fingerprints.

pub mod equation;
pub mod expr;
pub mod parse;

pub use equation::Equation;
pub use expr::{Address, Expr};
pub use parse::ParseError;
