//! Scripted strategies for driver contract tests.
//!
//! A [`ScriptedFactory`] hands out strategies that replay a fixed list of
//! step outcomes and count every callback into shared [`CallCounts`].

use std::cell::Cell;
use std::rc::Rc;

use rewrite_kernel::proof::certificate::ProofTerm;
use rewrite_search::config::SearchConfigV1;
use rewrite_search::contract::{
    StepOutcome, Strategy, StrategyError, StrategyFactory, StrategyInitError,
};
use rewrite_search::state::{SearchState, VertexId};

/// What a scripted step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scripted {
    Continue,
    /// Return a reflexive proof of the current equation.
    Solve,
    Exhausted,
    Fail,
    Panic,
}

/// Where, if anywhere, the strategy misbehaves outside `step`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sabotage {
    #[default]
    None,
    InitError,
    InitPanic,
    StartupError,
    StartupPanic,
}

#[derive(Debug, Default)]
pub struct CallCounts {
    pub instantiated: Cell<u64>,
    pub init: Cell<u64>,
    pub startup: Cell<u64>,
    pub step: Cell<u64>,
}

fn bump(cell: &Cell<u64>) {
    cell.set(cell.get() + 1);
}

/// Builds [`ScriptedStrategy`] instances sharing one [`CallCounts`].
///
/// After the script runs out the last entry repeats; an empty script means
/// `Continue` forever.
#[derive(Debug, Clone)]
pub struct ScriptedFactory {
    pub script: Vec<Scripted>,
    pub sabotage: Sabotage,
    pub counts: Rc<CallCounts>,
}

impl ScriptedFactory {
    #[must_use]
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script,
            sabotage: Sabotage::None,
            counts: Rc::new(CallCounts::default()),
        }
    }

    #[must_use]
    pub fn always(outcome: Scripted) -> Self {
        Self::new(vec![outcome])
    }

    #[must_use]
    pub fn with_sabotage(mut self, sabotage: Sabotage) -> Self {
        self.sabotage = sabotage;
        self
    }

    #[must_use]
    pub fn steps(&self) -> u64 {
        self.counts.step.get()
    }
}

impl StrategyFactory for ScriptedFactory {
    fn instantiate(&self) -> Box<dyn Strategy> {
        bump(&self.counts.instantiated);
        Box::new(ScriptedStrategy {
            script: self.script.clone(),
            sabotage: self.sabotage,
            counts: Rc::clone(&self.counts),
            cursor: 0,
        })
    }
}

#[derive(Debug)]
pub struct ScriptedStrategy {
    script: Vec<Scripted>,
    sabotage: Sabotage,
    counts: Rc<CallCounts>,
    cursor: usize,
}

impl Strategy for ScriptedStrategy {
    fn strategy_id(&self) -> &str {
        "scripted.v1"
    }

    fn init(&mut self, _config: &SearchConfigV1) -> Result<(), StrategyInitError> {
        bump(&self.counts.init);
        match self.sabotage {
            Sabotage::InitError => Err(StrategyInitError::Unsupported {
                detail: "scripted init failure".into(),
            }),
            Sabotage::InitPanic => panic!("scripted init panic"),
            _ => Ok(()),
        }
    }

    fn startup(
        &mut self,
        _state: &mut SearchState,
        _left_root: VertexId,
        _right_root: VertexId,
    ) -> Result<(), StrategyError> {
        bump(&self.counts.startup);
        match self.sabotage {
            Sabotage::StartupError => Err(StrategyError::Failed {
                detail: "scripted startup failure".into(),
            }),
            Sabotage::StartupPanic => panic!("scripted startup panic"),
            _ => Ok(()),
        }
    }

    fn step(
        &mut self,
        state: &mut SearchState,
        _config: &SearchConfigV1,
    ) -> Result<StepOutcome, StrategyError> {
        bump(&self.counts.step);
        let action = self
            .script
            .get(self.cursor)
            .or_else(|| self.script.last())
            .copied()
            .unwrap_or(Scripted::Continue);
        self.cursor += 1;
        match action {
            Scripted::Continue => Ok(StepOutcome::Continue),
            Scripted::Solve => Ok(StepOutcome::Solved(ProofTerm::reflexive(
                state.equation().clone(),
            ))),
            Scripted::Exhausted => Ok(StepOutcome::Exhausted),
            Scripted::Fail => Err(StrategyError::Failed {
                detail: "scripted step failure".into(),
            }),
            Scripted::Panic => panic!("scripted step panic"),
        }
    }
}
