//! Strategy contract: the pluggable search algorithm.
//!
//! The driver knows nothing about how a strategy explores the rewrite
//! graph. A strategy owns its private state in `self`; the driver lends it
//! the [`SearchState`] mutably for the duration of one call.
//!
//! # Contract
//!
//! - `init` is called exactly once, before any `SearchState` exists.
//! - `startup` is called exactly once, after both roots are registered.
//! - `step` is called at most `max_iterations` times. It must make bounded
//!   progress and return; the driver owns the loop.
//! - A strategy that returns [`StepOutcome::Solved`] should have called
//!   [`SearchState::mark_solved`]; the driver seals the state either way.

use rewrite_kernel::proof::certificate::ProofTerm;

use crate::config::SearchConfigV1;
use crate::state::{SearchState, StateError, VertexId};

/// Result of one `step` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Progress was made; call `step` again.
    Continue,
    /// A proof was found.
    Solved(ProofTerm),
    /// No further expansion is possible.
    Exhausted,
}

impl StepOutcome {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::Solved(_) => "solved",
            Self::Exhausted => "exhausted",
        }
    }
}

/// The strategy could not be initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyInitError {
    /// A strategy parameter is out of range.
    InvalidParameter { detail: String },
    /// The strategy cannot run under the given configuration.
    Unsupported { detail: String },
}

impl std::fmt::Display for StrategyInitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter { detail } => write!(f, "invalid parameter: {detail}"),
            Self::Unsupported { detail } => write!(f, "unsupported: {detail}"),
        }
    }
}

impl std::error::Error for StrategyInitError {}

/// Hard failure inside `startup` or `step`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// The search state rejected an operation.
    State(StateError),
    /// Strategy-specific failure.
    Failed { detail: String },
}

impl std::fmt::Display for StrategyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State(e) => write!(f, "search state: {e}"),
            Self::Failed { detail } => f.write_str(detail),
        }
    }
}

impl std::error::Error for StrategyError {}

impl From<StateError> for StrategyError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}

/// Strategy-reported counters recorded in the search graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrategyReport {
    /// Largest frontier size observed.
    pub frontier_high_water: u64,
    /// Vertices popped but not expanded because of a depth limit.
    pub depth_limited: u64,
    /// Vertices dropped from the frontier by pruning.
    pub pruned: u64,
}

/// A pluggable search algorithm.
pub trait Strategy {
    /// Stable identifier recorded in the search graph.
    fn strategy_id(&self) -> &str;

    /// Prepare internal state for a run under `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyInitError`] if the strategy cannot run.
    fn init(&mut self, config: &SearchConfigV1) -> Result<(), StrategyInitError>;

    /// Seed initial expansion candidates from the two roots.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError`] on a hard failure.
    fn startup(
        &mut self,
        state: &mut SearchState,
        left_root: VertexId,
        right_root: VertexId,
    ) -> Result<(), StrategyError>;

    /// Make one unit of progress.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError`] on a hard failure. The run is aborted.
    fn step(
        &mut self,
        state: &mut SearchState,
        config: &SearchConfigV1,
    ) -> Result<StepOutcome, StrategyError>;

    /// Counters for the audit graph.
    fn report(&self) -> StrategyReport {
        StrategyReport::default()
    }
}

/// Produces a fresh strategy instance per run.
pub trait StrategyFactory {
    fn instantiate(&self) -> Box<dyn Strategy>;
}

impl<F> StrategyFactory for F
where
    F: Fn() -> Box<dyn Strategy>,
{
    fn instantiate(&self) -> Box<dyn Strategy> {
        self()
    }
}
