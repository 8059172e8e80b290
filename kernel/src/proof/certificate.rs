//! Proof terms: checkable certificates for an equation.
//!
//! A proof rewrites both sides of the equation toward a common `meeting`
//! expression. Checking replays every step against the rule table, so a
//! proof is only as trusted as the table it is checked against.

use crate::proof::canon::{canonical_json_bytes, CanonError};
use crate::proof::hash::{canonical_hash, ContentHash, HashDomain};
use crate::rules::rewrite::{apply_rewrite, RewriteError, RewriteHow};
use crate::rules::rule::RuleTable;
use crate::term::{Equation, Expr};

/// Which side of the equation a step rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Lhs,
    Rhs,
}

impl Side {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Lhs => Self::Rhs,
            Self::Rhs => Self::Lhs,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lhs => "lhs",
            Self::Rhs => "rhs",
        }
    }
}

/// One rewrite applied to one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofStep {
    pub side: Side,
    pub how: RewriteHow,
    pub before: Expr,
    pub after: Expr,
}

/// Certificate that `equation.lhs` and `equation.rhs` rewrite to `meeting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofTerm {
    pub equation: Equation,
    /// Steps rewriting the left side, in application order.
    pub lhs_steps: Vec<ProofStep>,
    /// Steps rewriting the right side, in application order.
    pub rhs_steps: Vec<ProofStep>,
    /// The expression both sides reach.
    pub meeting: Expr,
}

/// Why a proof term failed to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// A step was recorded under the wrong side list.
    SideMismatch { index: usize, expected: Side },
    /// A step's `before` is not the previous step's `after` (or the root).
    BrokenChain { side: Side, index: usize },
    /// Replaying a step failed.
    Replay {
        side: Side,
        index: usize,
        error: RewriteError,
    },
    /// Replaying a step produced a different expression than recorded.
    ResultMismatch { side: Side, index: usize },
    /// A side does not end at the meeting expression.
    MissesMeeting { side: Side },
}

impl std::fmt::Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SideMismatch { index, expected } => {
                write!(f, "step {index} is not tagged {}", expected.as_str())
            }
            Self::BrokenChain { side, index } => {
                write!(f, "{} step {index} does not continue the chain", side.as_str())
            }
            Self::Replay { side, index, error } => {
                write!(f, "{} step {index} failed to replay: {error}", side.as_str())
            }
            Self::ResultMismatch { side, index } => {
                write!(f, "{} step {index} replays to a different expression", side.as_str())
            }
            Self::MissesMeeting { side } => {
                write!(f, "{} side does not reach the meeting expression", side.as_str())
            }
        }
    }
}

impl std::error::Error for CheckError {}

/// Failure to decode a proof term from JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofDecodeError {
    pub detail: String,
}

impl std::fmt::Display for ProofDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed proof term: {}", self.detail)
    }
}

impl std::error::Error for ProofDecodeError {}

impl ProofTerm {
    /// The trivial proof of `lhs = lhs`.
    #[must_use]
    pub fn reflexive(equation: Equation) -> Self {
        let meeting = equation.lhs.clone();
        Self {
            equation,
            lhs_steps: Vec::new(),
            rhs_steps: Vec::new(),
            meeting,
        }
    }

    /// Total number of rewrite steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lhs_steps.len() + self.rhs_steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replay every step against `table`.
    ///
    /// # Errors
    ///
    /// Returns the first [`CheckError`] found.
    pub fn check(&self, table: &RuleTable) -> Result<(), CheckError> {
        check_side(&self.equation.lhs, &self.lhs_steps, Side::Lhs, &self.meeting, table)?;
        check_side(&self.equation.rhs, &self.rhs_steps, Side::Rhs, &self.meeting, table)
    }

    /// JSON projection used in result artifacts.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "equation": {
                "lhs": self.equation.lhs.to_string(),
                "rhs": self.equation.rhs.to_string(),
            },
            "lhs_steps": self.lhs_steps.iter().map(step_to_json).collect::<Vec<_>>(),
            "meeting": self.meeting.to_string(),
            "rhs_steps": self.rhs_steps.iter().map(step_to_json).collect::<Vec<_>>(),
        })
    }

    /// Decode the projection produced by [`ProofTerm::to_json_value`].
    ///
    /// # Errors
    ///
    /// Returns [`ProofDecodeError`] on any missing or malformed field.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, ProofDecodeError> {
        let equation = Equation::new(
            expr_field(&value["equation"], "lhs")?,
            expr_field(&value["equation"], "rhs")?,
        );
        Ok(Self {
            equation,
            lhs_steps: steps_field(value, "lhs_steps")?,
            rhs_steps: steps_field(value, "rhs_steps")?,
            meeting: expr_field(value, "meeting")?,
        })
    }

    /// Digest of the canonical JSON projection.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if canonical serialization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = canonical_json_bytes(&self.to_json_value())?;
        Ok(canonical_hash(HashDomain::ProofTerm, &bytes))
    }
}

fn check_side(
    root: &Expr,
    steps: &[ProofStep],
    side: Side,
    meeting: &Expr,
    table: &RuleTable,
) -> Result<(), CheckError> {
    let mut current = root;
    for (index, step) in steps.iter().enumerate() {
        if step.side != side {
            return Err(CheckError::SideMismatch {
                index,
                expected: side,
            });
        }
        if step.before != *current {
            return Err(CheckError::BrokenChain { side, index });
        }
        let replayed = apply_rewrite(current, table, &step.how)
            .map_err(|error| CheckError::Replay { side, index, error })?;
        if replayed != step.after {
            return Err(CheckError::ResultMismatch { side, index });
        }
        current = &step.after;
    }
    if current != meeting {
        return Err(CheckError::MissesMeeting { side });
    }
    Ok(())
}

fn step_to_json(step: &ProofStep) -> serde_json::Value {
    serde_json::json!({
        "address": step.how.address,
        "after": step.after.to_string(),
        "before": step.before.to_string(),
        "entry": step.how.entry,
        "occurrence": step.how.occurrence,
        "side": step.side.as_str(),
    })
}

fn decode_err(detail: String) -> ProofDecodeError {
    ProofDecodeError { detail }
}

fn expr_field(value: &serde_json::Value, key: &str) -> Result<Expr, ProofDecodeError> {
    let text = value[key]
        .as_str()
        .ok_or_else(|| decode_err(format!("missing string field {key:?}")))?;
    Expr::parse(text).map_err(|e| decode_err(format!("{key}: {e}")))
}

fn usize_field(value: &serde_json::Value, key: &str) -> Result<usize, ProofDecodeError> {
    value[key]
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| decode_err(format!("missing integer field {key:?}")))
}

fn steps_field(value: &serde_json::Value, key: &str) -> Result<Vec<ProofStep>, ProofDecodeError> {
    let items = value[key]
        .as_array()
        .ok_or_else(|| decode_err(format!("missing array field {key:?}")))?;
    items
        .iter()
        .map(|item| {
            let side = match item["side"].as_str() {
                Some("lhs") => Side::Lhs,
                Some("rhs") => Side::Rhs,
                other => return Err(decode_err(format!("bad side {other:?}"))),
            };
            let address = item["address"]
                .as_array()
                .ok_or_else(|| decode_err("missing array field \"address\"".into()))?
                .iter()
                .map(|n| {
                    n.as_u64()
                        .and_then(|n| usize::try_from(n).ok())
                        .ok_or_else(|| decode_err("non-integer address component".into()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ProofStep {
                side,
                how: RewriteHow {
                    entry: usize_field(item, "entry")?,
                    address,
                    occurrence: usize_field(item, "occurrence")?,
                },
                before: expr_field(item, "before")?,
                after: expr_field(item, "after")?,
            })
        })
        .collect()
}
