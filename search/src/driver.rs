//! The bounded search loop.
//!
//! [`run`] instantiates a strategy, builds the [`SearchState`], and calls
//! `step` until the strategy solves the equation, runs out of work, or the
//! iteration budget is spent. Running out is a normal [`SearchResultV1::Failure`];
//! only configuration errors, strategy errors and panics are
//! [`SearchError`]s.

use std::panic::{catch_unwind, AssertUnwindSafe};

use rewrite_kernel::proof::certificate::ProofTerm;
use rewrite_kernel::rules::RuleTable;
use rewrite_kernel::term::Equation;

use crate::bfs::default_strategy;
use crate::config::SearchConfigV1;
use crate::contract::{StepOutcome, StrategyFactory};
use crate::error::{PanicStage, SearchError};
use crate::explain::{Explainer, ProofScriptExplainer};
use crate::graph::{SearchGraphV1, TerminationV1};
use crate::state::SearchState;
use crate::trace::{NullTraceSink, TraceEvent, TraceSink};

/// Driver lifecycle. `Solved` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Initializing,
    Searching,
    Solved,
    Failed,
}

impl Phase {
    /// Move to `to` if the transition is legal.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidTransition`] otherwise.
    pub fn advance(self, to: Phase) -> Result<Phase, SearchError> {
        let legal = matches!(
            (self, to),
            (Phase::Idle, Phase::Initializing)
                | (Phase::Initializing, Phase::Searching)
                | (Phase::Searching, Phase::Solved | Phase::Failed)
        );
        if legal {
            Ok(to)
        } else {
            Err(SearchError::InvalidTransition { from: self, to })
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Solved | Phase::Failed)
    }
}

/// Why a run ended without a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReasonV1 {
    Exhausted,
    MaxIterationsExceeded,
}

impl FailureReasonV1 {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::MaxIterationsExceeded => "max iterations exceeded",
        }
    }
}

impl std::fmt::Display for FailureReasonV1 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResultV1 {
    /// `steps` is the number of `step` calls made.
    Success { proof: ProofTerm, steps: u64 },
    Failure { reason: FailureReasonV1 },
}

impl SearchResultV1 {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            Self::Success { proof, steps } => serde_json::json!({
                "proof": proof.to_json_value(),
                "status": "success",
                "steps": steps,
            }),
            Self::Failure { reason } => serde_json::json!({
                "reason": reason.as_str(),
                "status": "failure",
            }),
        }
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub result: SearchResultV1,
    /// Rendered proof, present on success when `explain` is set.
    pub explanation: Option<String>,
    pub graph: SearchGraphV1,
    /// Number of `step` calls made.
    pub steps: u64,
    pub phase: Phase,
}

fn guarded<T>(stage: PanicStage, f: impl FnOnce() -> T) -> Result<T, SearchError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|_| SearchError::StrategyPanicked { stage })
}

/// Run one search.
///
/// # Errors
///
/// Returns [`SearchError`] for an invalid config, a strategy init or step
/// failure, a strategy panic, or an explain failure. No partial outcome is
/// produced in those cases.
pub fn run(
    config: &SearchConfigV1,
    factory: &dyn StrategyFactory,
    equation: Equation,
    table: RuleTable,
    explainer: &dyn Explainer,
    sink: &mut dyn TraceSink,
) -> Result<SearchOutcome, SearchError> {
    config.validate()?;
    let mut phase = Phase::Idle.advance(Phase::Initializing)?;

    let mut strategy = guarded(PanicStage::Init, || factory.instantiate())?;
    guarded(PanicStage::Init, || strategy.init(config))??;

    let mut state = SearchState::new(equation, table);
    if config.trace_rules {
        for (index, entry) in state.table().entries().iter().enumerate() {
            sink.on_event(&TraceEvent::RuleListed {
                index,
                name: entry.rule.name.clone(),
                reversed: entry.reversed,
                pattern: entry.pattern().to_string(),
                template: entry.template().to_string(),
            });
        }
    }

    let (left_root, right_root) = state.roots();
    guarded(PanicStage::Startup, || {
        strategy.startup(&mut state, left_root, right_root)
    })??;
    phase = phase.advance(Phase::Searching)?;
    if config.trace {
        sink.on_event(&TraceEvent::Startup {
            strategy_id: strategy.strategy_id().to_string(),
            lhs: state.equation().lhs.to_string(),
            rhs: state.equation().rhs.to_string(),
        });
    }

    let mut steps: u64 = 0;
    let result = if let Some(proof) = state.solve_trivially() {
        SearchResultV1::Success { proof, steps }
    } else {
        let mut last_exhausted = false;
        loop {
            if steps >= config.max_iterations {
                let reason = if last_exhausted {
                    FailureReasonV1::Exhausted
                } else {
                    FailureReasonV1::MaxIterationsExceeded
                };
                break SearchResultV1::Failure { reason };
            }
            let outcome = guarded(PanicStage::Step, || strategy.step(&mut state, config))??;
            steps += 1;
            state.record_iteration();
            if config.trace {
                sink.on_event(&TraceEvent::Step {
                    iteration: steps,
                    outcome: outcome.kind(),
                    vertices: state.vertices().len(),
                    edges: state.edges().len(),
                });
            }
            match outcome {
                StepOutcome::Solved(proof) => {
                    state.seal();
                    break SearchResultV1::Success { proof, steps };
                }
                StepOutcome::Exhausted if !config.exhaustive => {
                    break SearchResultV1::Failure {
                        reason: FailureReasonV1::Exhausted,
                    };
                }
                StepOutcome::Exhausted => last_exhausted = true,
                StepOutcome::Continue => last_exhausted = false,
            }
        }
    };

    let termination = match &result {
        SearchResultV1::Success { .. } => TerminationV1::Solved {
            edge: state.solving_edge().map(|e| e.0),
        },
        SearchResultV1::Failure {
            reason: FailureReasonV1::Exhausted,
        } => TerminationV1::Exhausted,
        SearchResultV1::Failure {
            reason: FailureReasonV1::MaxIterationsExceeded,
        } => TerminationV1::MaxIterationsExceeded,
    };
    phase = phase.advance(if result.is_success() {
        Phase::Solved
    } else {
        Phase::Failed
    })?;

    let graph = SearchGraphV1::from_state(
        &state,
        config,
        strategy.strategy_id(),
        strategy.report(),
        termination,
    )?;
    if config.trace_summary {
        sink.on_event(&TraceEvent::Summary {
            termination: termination.as_str(),
            stats: *state.stats(),
            vertices: state.vertices().len(),
            edges: state.edges().len(),
        });
    }

    let explanation = match &result {
        SearchResultV1::Success { proof, steps } if config.explain => Some(explainer.explain(
            proof,
            *steps,
            state.table(),
            config.explain_using_conv,
        )?),
        _ => None,
    };

    Ok(SearchOutcome {
        result,
        explanation,
        graph,
        steps,
        phase,
    })
}

/// [`run`] with the breadth-first strategy, the proof-script explainer, and
/// no tracing.
///
/// # Errors
///
/// See [`run`].
pub fn run_default(
    config: &SearchConfigV1,
    equation: Equation,
    table: RuleTable,
) -> Result<SearchOutcome, SearchError> {
    run(
        config,
        &default_strategy(),
        equation,
        table,
        &ProofScriptExplainer,
        &mut NullTraceSink,
    )
}
