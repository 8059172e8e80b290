//! Rendering a found proof into a tactic-style script.
//!
//! Explaining is a reporting side effect of a successful run. It never
//! changes the result.

use rewrite_kernel::proof::certificate::{ProofStep, ProofTerm};
use rewrite_kernel::rules::RuleTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplainError {
    /// A step refers to an entry the table does not have.
    UnknownEntry { entry: usize },
    /// Explainer-specific failure.
    Failed { detail: String },
}

impl std::fmt::Display for ExplainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEntry { entry } => write!(f, "proof refers to unknown rule entry {entry}"),
            Self::Failed { detail } => f.write_str(detail),
        }
    }
}

impl std::error::Error for ExplainError {}

/// Renders a proof and the number of iterations it took into a description.
pub trait Explainer {
    /// # Errors
    ///
    /// Returns [`ExplainError`] if the proof cannot be rendered.
    fn explain(
        &self,
        proof: &ProofTerm,
        steps: u64,
        table: &RuleTable,
        using_conv: bool,
    ) -> Result<String, ExplainError>;
}

/// One line per rewrite.
///
/// Plain mode: `nth_rewrite_lhs 2 [← mul_assoc]` (occurrence is 1-based).
/// Conv mode: `conv_lhs { arg 1, arg 2, rw [← mul_assoc] }`, navigating by
/// 1-based argument positions. Reversed entries get the `← ` arrow.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProofScriptExplainer;

impl ProofScriptExplainer {
    fn render_step(
        step: &ProofStep,
        table: &RuleTable,
        using_conv: bool,
    ) -> Result<String, ExplainError> {
        let entry = table
            .get(step.how.entry)
            .ok_or(ExplainError::UnknownEntry {
                entry: step.how.entry,
            })?;
        let arrow = if entry.reversed { "← " } else { "" };
        let rule = format!("[{arrow}{}]", entry.rule.name);
        let side = step.side.as_str();
        if !using_conv {
            return Ok(format!("nth_rewrite_{side} {} {rule}", step.how.occurrence + 1));
        }
        let mut parts: Vec<String> = step
            .how
            .address
            .iter()
            .map(|i| format!("arg {}", i + 1))
            .collect();
        parts.push(format!("rw {rule}"));
        Ok(format!("conv_{side} {{ {} }}", parts.join(", ")))
    }
}

impl Explainer for ProofScriptExplainer {
    fn explain(
        &self,
        proof: &ProofTerm,
        steps: u64,
        table: &RuleTable,
        using_conv: bool,
    ) -> Result<String, ExplainError> {
        let mut lines = vec![format!(
            "-- {} rewrite(s) found in {steps} iteration(s)",
            proof.len()
        )];
        if proof.is_empty() {
            lines.push("refl".into());
        }
        for step in proof.lhs_steps.iter().chain(&proof.rhs_steps) {
            lines.push(Self::render_step(step, table, using_conv)?);
        }
        Ok(lines.join("\n"))
    }
}
