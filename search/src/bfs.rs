//! Bidirectional breadth-first strategy.
//!
//! Both roots share one [`DepthFrontier`], so the two trees grow in
//! lockstep by depth. Each `step` expands exactly one vertex.

use crate::config::SearchConfigV1;
use crate::contract::{
    StepOutcome, Strategy, StrategyError, StrategyFactory, StrategyInitError, StrategyReport,
};
use crate::frontier::DepthFrontier;
use crate::state::{Discovery, SearchState, VertexId};

pub const BFS_STRATEGY_ID: &str = "bfs.bidirectional.v1";

/// Strategy-private limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BfsConfigV1 {
    /// Vertices at this depth or deeper are never expanded.
    pub max_depth: u32,
    /// Frontier is pruned back to this many entries after each step.
    pub max_frontier: u64,
}

impl Default for BfsConfigV1 {
    fn default() -> Self {
        Self {
            max_depth: 50,
            max_frontier: 100_000,
        }
    }
}

#[derive(Debug)]
pub struct BreadthFirstStrategy {
    config: BfsConfigV1,
    frontier: DepthFrontier,
    depth_limited: u64,
    pruned: u64,
}

impl BreadthFirstStrategy {
    #[must_use]
    pub fn new(config: BfsConfigV1) -> Self {
        Self {
            config,
            frontier: DepthFrontier::new(),
            depth_limited: 0,
            pruned: 0,
        }
    }

    fn enqueue(&mut self, state: &SearchState, id: VertexId) -> Result<(), StrategyError> {
        let depth = state.vertex(id)?.depth;
        self.frontier.push(id, depth);
        Ok(())
    }
}

impl Strategy for BreadthFirstStrategy {
    fn strategy_id(&self) -> &str {
        BFS_STRATEGY_ID
    }

    fn init(&mut self, _config: &SearchConfigV1) -> Result<(), StrategyInitError> {
        if self.config.max_depth == 0 {
            return Err(StrategyInitError::InvalidParameter {
                detail: "max_depth must be positive".into(),
            });
        }
        if self.config.max_frontier == 0 {
            return Err(StrategyInitError::InvalidParameter {
                detail: "max_frontier must be positive".into(),
            });
        }
        Ok(())
    }

    fn startup(
        &mut self,
        state: &mut SearchState,
        left_root: VertexId,
        right_root: VertexId,
    ) -> Result<(), StrategyError> {
        self.enqueue(state, left_root)?;
        self.enqueue(state, right_root)
    }

    fn step(
        &mut self,
        state: &mut SearchState,
        config: &SearchConfigV1,
    ) -> Result<StepOutcome, StrategyError> {
        let Some(current) = self.frontier.pop() else {
            return Ok(StepOutcome::Exhausted);
        };
        if state.vertex(current)?.depth >= self.config.max_depth {
            self.depth_limited += 1;
            return Ok(StepOutcome::Continue);
        }

        let mut bridges = Vec::new();
        for rewrite in state.expand(current)? {
            match state.discover(current, rewrite)? {
                Discovery::New(id) => self.enqueue(state, id)?,
                Discovery::Duplicate(_) => {}
                Discovery::Bridge(edge) => bridges.push(edge),
            }
        }

        let chosen = if config.optimal {
            let costed = bridges
                .into_iter()
                .map(|edge| state.bridge_cost(edge).map(|cost| (edge, cost)))
                .collect::<Result<Vec<_>, _>>()?;
            // min_by_key keeps the first of equal minima.
            costed.into_iter().min_by_key(|&(_, cost)| cost).map(|(edge, _)| edge)
        } else {
            bridges.first().copied()
        };
        if let Some(edge) = chosen {
            return Ok(StepOutcome::Solved(state.mark_solved(edge)?));
        }

        let cap = usize::try_from(self.config.max_frontier).unwrap_or(usize::MAX);
        let pruned = self.frontier.prune_to(cap).len();
        self.pruned += u64::try_from(pruned).unwrap_or(u64::MAX);
        Ok(StepOutcome::Continue)
    }

    fn report(&self) -> StrategyReport {
        StrategyReport {
            frontier_high_water: self.frontier.high_water(),
            depth_limited: self.depth_limited,
            pruned: self.pruned,
        }
    }
}

/// Builds a fresh [`BreadthFirstStrategy`] per run.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreadthFirstFactory {
    pub config: BfsConfigV1,
}

impl StrategyFactory for BreadthFirstFactory {
    fn instantiate(&self) -> Box<dyn Strategy> {
        Box::new(BreadthFirstStrategy::new(self.config))
    }
}

/// The strategy used when the caller does not supply one.
#[must_use]
pub fn default_strategy() -> BreadthFirstFactory {
    BreadthFirstFactory::default()
}
