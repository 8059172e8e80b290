//! Typed search errors.
//!
//! `SearchError` covers fatal failures only. Running out of iterations or
//! exhausting the search space are normal outcomes, expressed as
//! [`crate::driver::SearchResultV1::Failure`].

use crate::contract::{StrategyError, StrategyInitError};
use crate::driver::Phase;
use crate::explain::ExplainError;

/// Strategy callback in which a panic was caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicStage {
    Init,
    Startup,
    Step,
}

impl PanicStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Startup => "startup",
            Self::Step => "step",
        }
    }
}

/// Fatal failure of a search run. No result or graph is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Configuration rejected before any search work started.
    InvalidConfig { detail: String },
    /// The strategy failed to initialize.
    StrategyInit(StrategyInitError),
    /// `startup` or `step` reported a hard error.
    Strategy(StrategyError),
    /// A strategy callback panicked.
    StrategyPanicked { stage: PanicStage },
    /// The driver attempted an illegal phase transition.
    InvalidTransition { from: Phase, to: Phase },
    /// The explain routine could not render the proof.
    Explain(ExplainError),
    /// Canonical serialization of an audit record failed.
    Serialization { detail: String },
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig { detail } => write!(f, "invalid config: {detail}"),
            Self::StrategyInit(e) => write!(f, "strategy init failed: {e}"),
            Self::Strategy(e) => write!(f, "strategy failed: {e}"),
            Self::StrategyPanicked { stage } => {
                write!(f, "strategy panicked during {}", stage.as_str())
            }
            Self::InvalidTransition { from, to } => {
                write!(f, "illegal phase transition {from:?} -> {to:?}")
            }
            Self::Explain(e) => write!(f, "explain failed: {e}"),
            Self::Serialization { detail } => write!(f, "serialization failed: {detail}"),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<StrategyInitError> for SearchError {
    fn from(e: StrategyInitError) -> Self {
        Self::StrategyInit(e)
    }
}

impl From<StrategyError> for SearchError {
    fn from(e: StrategyError) -> Self {
        Self::Strategy(e)
    }
}

impl From<ExplainError> for SearchError {
    fn from(e: ExplainError) -> Self {
        Self::Explain(e)
    }
}
