//! Rewrite enumeration and single-step replay.

use super::matching::{instantiate, match_pattern};
use super::rule::{RuleEntry, RuleTable};
use crate::term::{Address, Expr};

/// How a rewrite step was performed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RewriteHow {
    /// Index into the [`RuleTable`].
    pub entry: usize,
    /// Address of the rewritten subterm.
    pub address: Address,
    /// Zero-based index of this match among all matches of `entry` in
    /// preorder.
    pub occurrence: usize,
}

/// A single rewrite of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub result: Expr,
    pub how: RewriteHow,
}

/// Failure to replay a rewrite step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// The entry index is outside the table.
    UnknownEntry { entry: usize, table_len: usize },
    /// The address does not exist in the expression.
    BadAddress { address: Address },
    /// The entry's pattern does not match the subterm at the address.
    NoMatch { entry: usize, address: Address },
    /// The recorded occurrence disagrees with the address.
    OccurrenceMismatch { recorded: usize, actual: usize },
}

impl std::fmt::Display for RewriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEntry { entry, table_len } => {
                write!(f, "rule entry {entry} out of range (table has {table_len})")
            }
            Self::BadAddress { address } => write!(f, "no subterm at address {address:?}"),
            Self::NoMatch { entry, address } => {
                write!(f, "rule entry {entry} does not match at address {address:?}")
            }
            Self::OccurrenceMismatch { recorded, actual } => {
                write!(f, "recorded occurrence {recorded}, actual occurrence {actual}")
            }
        }
    }
}

impl std::error::Error for RewriteError {}

/// Rewrite the subterm at `address` with `entry`, if the pattern matches.
fn rewrite_at(expr: &Expr, entry: &RuleEntry, address: &[usize]) -> Option<Expr> {
    let subject = expr.subterm(address)?;
    let bindings = match_pattern(entry.pattern(), subject)?;
    let replacement = instantiate(entry.template(), &bindings)?;
    expr.replace_at(address, replacement)
}

/// Enumerate every single-step rewrite of `expr` under `table`.
///
/// Order: table entries in order, then preorder positions. Rewrites whose
/// result equals `expr` are dropped but still count toward `occurrence`.
#[must_use]
pub fn enumerate_rewrites(expr: &Expr, table: &RuleTable) -> Vec<Rewrite> {
    let positions = expr.positions();
    let mut out = Vec::new();
    for (entry_index, entry) in table.entries().iter().enumerate() {
        let mut occurrence = 0;
        for (address, _) in &positions {
            let Some(result) = rewrite_at(expr, entry, address) else {
                continue;
            };
            if result != *expr {
                out.push(Rewrite {
                    result,
                    how: RewriteHow {
                        entry: entry_index,
                        address: address.clone(),
                        occurrence,
                    },
                });
            }
            occurrence += 1;
        }
    }
    out
}

/// Replay one rewrite step.
///
/// # Errors
///
/// Returns [`RewriteError`] if the step does not describe a valid rewrite
/// of `expr`.
pub fn apply_rewrite(expr: &Expr, table: &RuleTable, how: &RewriteHow) -> Result<Expr, RewriteError> {
    let entry = table.get(how.entry).ok_or(RewriteError::UnknownEntry {
        entry: how.entry,
        table_len: table.len(),
    })?;
    if expr.subterm(&how.address).is_none() {
        return Err(RewriteError::BadAddress {
            address: how.address.clone(),
        });
    }
    let result = rewrite_at(expr, entry, &how.address).ok_or_else(|| RewriteError::NoMatch {
        entry: how.entry,
        address: how.address.clone(),
    })?;

    let actual = expr
        .positions()
        .into_iter()
        .take_while(|(address, _)| *address != how.address)
        .filter(|(address, _)| rewrite_at(expr, entry, address).is_some())
        .count();
    if actual != how.occurrence {
        return Err(RewriteError::OccurrenceMismatch {
            recorded: how.occurrence,
            actual,
        });
    }
    Ok(result)
}
