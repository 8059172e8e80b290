//! `SearchGraphV1`: audit-grade record of a search run.
//!
//! Built once from the final [`SearchState`]. Vertices and edges keep their
//! creation order, so two runs of a deterministic strategy produce
//! identical canonical bytes.

use rewrite_kernel::proof::canon::{canonical_json_bytes, CanonError};
use rewrite_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};

use crate::config::SearchConfigV1;
use crate::contract::StrategyReport;
use crate::error::SearchError;
use crate::state::{SearchState, SearchStatistics};

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationV1 {
    /// A proof was found. `edge` is the bridging edge, `None` when both
    /// sides were equal from the start.
    Solved { edge: Option<usize> },
    /// The strategy ran out of work.
    Exhausted,
    /// The iteration budget ran out.
    MaxIterationsExceeded,
}

impl TerminationV1 {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solved { .. } => "solved",
            Self::Exhausted => "exhausted",
            Self::MaxIterationsExceeded => "max_iterations_exceeded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphVertexV1 {
    pub id: usize,
    pub expr: String,
    pub fingerprint: String,
    pub side: &'static str,
    pub parent_edge: Option<usize>,
    pub depth: u32,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdgeV1 {
    pub id: usize,
    pub from: usize,
    pub to: usize,
    pub entry: usize,
    pub address: Vec<usize>,
    pub occurrence: usize,
}

/// Snapshot bindings and counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchGraphMetadata {
    pub equation: String,
    pub equation_fingerprint: String,
    pub rule_table_digest: String,
    pub config_digest: String,
    pub strategy_id: String,

    pub stats: SearchStatistics,
    pub report: StrategyReport,
    pub termination: TerminationV1,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchGraphV1 {
    pub vertices: Vec<GraphVertexV1>,
    pub edges: Vec<GraphEdgeV1>,
    pub metadata: SearchGraphMetadata,
}

impl SearchGraphV1 {
    /// Snapshot `state` at the end of a run.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Serialization`] if a digest cannot be computed.
    pub fn from_state(
        state: &SearchState,
        config: &SearchConfigV1,
        strategy_id: &str,
        report: StrategyReport,
        termination: TerminationV1,
    ) -> Result<Self, SearchError> {
        let rule_table_digest = state
            .table()
            .digest()
            .map_err(|e| SearchError::Serialization {
                detail: e.to_string(),
            })?;
        let config_digest = config.digest()?;

        let vertices = state
            .vertices()
            .iter()
            .map(|v| GraphVertexV1 {
                id: v.id.0,
                expr: v.expr.to_string(),
                fingerprint: v.fingerprint.as_str().to_string(),
                side: v.side.as_str(),
                parent_edge: v.parent.map(|e| e.0),
                depth: v.depth,
                expanded: v.expanded,
            })
            .collect();
        let edges = state
            .edges()
            .iter()
            .map(|e| GraphEdgeV1 {
                id: e.id.0,
                from: e.from.0,
                to: e.to.0,
                entry: e.how.entry,
                address: e.how.address.clone(),
                occurrence: e.how.occurrence,
            })
            .collect();

        Ok(Self {
            vertices,
            edges,
            metadata: SearchGraphMetadata {
                equation: state.equation().to_string(),
                equation_fingerprint: state.equation().fingerprint().as_str().to_string(),
                rule_table_digest: rule_table_digest.as_str().to_string(),
                config_digest: config_digest.as_str().to_string(),
                strategy_id: strategy_id.to_string(),
                stats: *state.stats(),
                report,
                termination,
            },
        })
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if canonical serialization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "edges": self.edges.iter().map(edge_to_json).collect::<Vec<_>>(),
            "metadata": metadata_to_json(&self.metadata),
            "vertices": self.vertices.iter().map(vertex_to_json).collect::<Vec<_>>(),
        })
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if canonical serialization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        Ok(canonical_hash(
            HashDomain::SearchGraph,
            &self.to_canonical_json_bytes()?,
        ))
    }
}

fn vertex_to_json(v: &GraphVertexV1) -> serde_json::Value {
    serde_json::json!({
        "depth": v.depth,
        "expanded": v.expanded,
        "expr": v.expr,
        "fingerprint": v.fingerprint,
        "id": v.id,
        "parent_edge": v.parent_edge,
        "side": v.side,
    })
}

fn edge_to_json(e: &GraphEdgeV1) -> serde_json::Value {
    serde_json::json!({
        "address": e.address,
        "entry": e.entry,
        "from": e.from,
        "id": e.id,
        "occurrence": e.occurrence,
        "to": e.to,
    })
}

fn metadata_to_json(m: &SearchGraphMetadata) -> serde_json::Value {
    let solving_edge = match m.termination {
        TerminationV1::Solved { edge } => edge,
        _ => None,
    };
    serde_json::json!({
        "config_digest": m.config_digest,
        "equation": m.equation,
        "equation_fingerprint": m.equation_fingerprint,
        "rule_table_digest": m.rule_table_digest,
        "stats": {
            "bridges": m.stats.bridges,
            "depth_limited": m.report.depth_limited,
            "duplicates": m.stats.duplicates,
            "expansions": m.stats.expansions,
            "frontier_high_water": m.report.frontier_high_water,
            "iterations": m.stats.iterations,
            "pruned": m.report.pruned,
            "rule_applications": m.stats.rule_applications,
        },
        "solving_edge": solving_edge,
        "strategy_id": m.strategy_id,
        "termination": m.termination.as_str(),
    })
}
