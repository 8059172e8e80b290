//! Equations: the goal of a proof search.

use super::expr::Expr;
use super::parse::ParseError;
use crate::proof::hash::{canonical_hash, ContentHash, HashDomain};

/// A pair of expressions asserted equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}

/// Failure to parse `"<lhs> = <rhs>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquationParseError {
    /// The text does not contain exactly one `=`.
    SeparatorCount { found: usize },
    /// One side failed to parse.
    Side {
        side: &'static str,
        error: ParseError,
    },
}

impl std::fmt::Display for EquationParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SeparatorCount { found } => {
                write!(f, "expected exactly one '=', found {found}")
            }
            Self::Side { side, error } => write!(f, "{side}: {error}"),
        }
    }
}

impl std::error::Error for EquationParseError {}

impl Equation {
    #[must_use]
    pub fn new(lhs: Expr, rhs: Expr) -> Self {
        Self { lhs, rhs }
    }

    /// Parse `"<lhs> = <rhs>"`.
    ///
    /// # Errors
    ///
    /// Returns [`EquationParseError`] if the separator is missing or
    /// repeated, or if either side is not a valid expression.
    pub fn parse(text: &str) -> Result<Self, EquationParseError> {
        let found = text.matches('=').count();
        let Some((left, right)) = text.split_once('=').filter(|_| found == 1) else {
            return Err(EquationParseError::SeparatorCount { found });
        };
        let lhs = Expr::parse(left).map_err(|error| EquationParseError::Side {
            side: "lhs",
            error,
        })?;
        let rhs = Expr::parse(right).map_err(|error| EquationParseError::Side {
            side: "rhs",
            error,
        })?;
        Ok(Self { lhs, rhs })
    }

    /// `true` if both sides are syntactically identical.
    #[must_use]
    pub fn is_reflexive(&self) -> bool {
        self.lhs == self.rhs
    }

    /// Content fingerprint of the canonical text form.
    #[must_use]
    pub fn fingerprint(&self) -> ContentHash {
        canonical_hash(HashDomain::Equation, self.to_string().as_bytes())
    }
}

impl std::fmt::Display for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}
