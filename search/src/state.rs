//! `SearchState`: the mutable rewrite graph of one search run.
//!
//! Two trees grow from the roots of the equation, one per side. Vertices
//! are deduplicated by expression fingerprint across both trees, so
//! rediscovering an expression that the other side already reached closes
//! the proof.
//!
//! Once a solution is marked the graph is sealed and every mutating method
//! returns [`StateError::Sealed`].

use std::collections::BTreeMap;

use rewrite_kernel::proof::certificate::{ProofStep, ProofTerm, Side};
use rewrite_kernel::proof::hash::ContentHash;
use rewrite_kernel::rules::{enumerate_rewrites, Rewrite, RewriteHow, RuleTable};
use rewrite_kernel::term::{Equation, Expr};

/// Index of a vertex in [`SearchState::vertices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// Index of an edge in [`SearchState::edges`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// A discovered expression.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    pub expr: Expr,
    pub fingerprint: ContentHash,
    /// The root this vertex was first reached from.
    pub side: Side,
    /// Edge from the parent (`None` for roots).
    pub parent: Option<EdgeId>,
    /// Rewrite steps from the root.
    pub depth: u32,
    /// Whether rewrites of this vertex have been enumerated.
    pub expanded: bool,
}

/// A rewrite step between two vertices.
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub from: VertexId,
    pub to: VertexId,
    pub how: RewriteHow,
}

/// What [`SearchState::discover`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    /// A new vertex was created on the same side as its parent.
    New(VertexId),
    /// The expression was already reached from the same side.
    Duplicate(VertexId),
    /// The expression was already reached from the other side; the
    /// returned edge connects the two trees.
    Bridge(EdgeId),
}

/// Running counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Driver iterations (`step` calls).
    pub iterations: u64,
    /// Vertices whose rewrites were enumerated.
    pub expansions: u64,
    /// Rewrites produced by expansions.
    pub rule_applications: u64,
    /// Rewrites that led to an already-known vertex on the same side.
    pub duplicates: u64,
    /// Rewrites that connected the two trees.
    pub bridges: u64,
}

/// Rejected state operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The graph is sealed because a solution was marked.
    Sealed,
    UnknownVertex { id: usize },
    UnknownEdge { id: usize },
    /// The edge does not connect the two trees.
    NotABridge { id: usize },
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sealed => write!(f, "search state is sealed"),
            Self::UnknownVertex { id } => write!(f, "unknown vertex {id}"),
            Self::UnknownEdge { id } => write!(f, "unknown edge {id}"),
            Self::NotABridge { id } => write!(f, "edge {id} does not connect both sides"),
        }
    }
}

impl std::error::Error for StateError {}

/// The rewrite graph, rule table, solution marker, and statistics of a run.
#[derive(Debug, Clone)]
pub struct SearchState {
    equation: Equation,
    table: RuleTable,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    /// Hex fingerprint -> vertex.
    index: BTreeMap<String, VertexId>,
    left_root: VertexId,
    right_root: VertexId,
    solving_edge: Option<EdgeId>,
    sealed: bool,
    stats: SearchStatistics,
}

impl SearchState {
    /// Register the left root, then the right root.
    ///
    /// If both sides are the same expression the right root aliases the
    /// left one (see [`SearchState::is_trivially_solved`]).
    #[must_use]
    pub fn new(equation: Equation, table: RuleTable) -> Self {
        let mut state = Self {
            equation,
            table,
            vertices: Vec::new(),
            edges: Vec::new(),
            index: BTreeMap::new(),
            left_root: VertexId(0),
            right_root: VertexId(0),
            solving_edge: None,
            sealed: false,
            stats: SearchStatistics::default(),
        };
        let lhs = state.equation.lhs.clone();
        let rhs = state.equation.rhs.clone();
        state.left_root = state.insert_vertex(lhs, Side::Lhs, None, 0);
        let rhs_fp = rhs.fingerprint();
        state.right_root = match state.index.get(rhs_fp.hex_digest()) {
            Some(&existing) => existing,
            None => state.insert_vertex(rhs, Side::Rhs, None, 0),
        };
        state
    }

    fn insert_vertex(&mut self, expr: Expr, side: Side, parent: Option<EdgeId>, depth: u32) -> VertexId {
        let id = VertexId(self.vertices.len());
        let fingerprint = expr.fingerprint();
        self.index.insert(fingerprint.hex_digest().to_string(), id);
        self.vertices.push(Vertex {
            id,
            expr,
            fingerprint,
            side,
            parent,
            depth,
            expanded: false,
        });
        id
    }

    fn insert_edge(&mut self, from: VertexId, to: VertexId, how: RewriteHow) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge { id, from, to, how });
        id
    }

    #[must_use]
    pub fn equation(&self) -> &Equation {
        &self.equation
    }

    #[must_use]
    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// `(left_root, right_root)`.
    #[must_use]
    pub fn roots(&self) -> (VertexId, VertexId) {
        (self.left_root, self.right_root)
    }

    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// # Errors
    ///
    /// Returns [`StateError::UnknownVertex`] for an out-of-range id.
    pub fn vertex(&self, id: VertexId) -> Result<&Vertex, StateError> {
        self.vertices
            .get(id.0)
            .ok_or(StateError::UnknownVertex { id: id.0 })
    }

    /// # Errors
    ///
    /// Returns [`StateError::UnknownEdge`] for an out-of-range id.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge, StateError> {
        self.edges
            .get(id.0)
            .ok_or(StateError::UnknownEdge { id: id.0 })
    }

    /// Look up a vertex by expression.
    #[must_use]
    pub fn find(&self, expr: &Expr) -> Option<VertexId> {
        self.index.get(expr.fingerprint().hex_digest()).copied()
    }

    #[must_use]
    pub fn stats(&self) -> &SearchStatistics {
        &self.stats
    }

    /// Count one driver iteration.
    pub fn record_iteration(&mut self) {
        self.stats.iterations += 1;
    }

    /// Both sides are the same expression.
    #[must_use]
    pub fn is_trivially_solved(&self) -> bool {
        self.left_root == self.right_root
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// The edge that closed the proof, if one was marked.
    #[must_use]
    pub fn solving_edge(&self) -> Option<EdgeId> {
        self.solving_edge
    }

    /// Seal the graph without marking an edge. Idempotent.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Enumerate the rewrites of `id` and mark it expanded.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Sealed`] after a solution was marked, or
    /// [`StateError::UnknownVertex`].
    pub fn expand(&mut self, id: VertexId) -> Result<Vec<Rewrite>, StateError> {
        if self.sealed {
            return Err(StateError::Sealed);
        }
        let vertex = self
            .vertices
            .get_mut(id.0)
            .ok_or(StateError::UnknownVertex { id: id.0 })?;
        let rewrites = enumerate_rewrites(&vertex.expr, &self.table);
        vertex.expanded = true;
        self.stats.expansions += 1;
        self.stats.rule_applications += rewrites.len() as u64;
        Ok(rewrites)
    }

    /// Record the result of rewriting `from`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Sealed`] after a solution was marked, or
    /// [`StateError::UnknownVertex`].
    pub fn discover(&mut self, from: VertexId, rewrite: Rewrite) -> Result<Discovery, StateError> {
        if self.sealed {
            return Err(StateError::Sealed);
        }
        let (side, depth) = {
            let parent = self.vertex(from)?;
            (parent.side, parent.depth)
        };
        let Some(existing) = self.find(&rewrite.result) else {
            let edge = EdgeId(self.edges.len());
            let to = self.insert_vertex(rewrite.result, side, Some(edge), depth.saturating_add(1));
            self.insert_edge(from, to, rewrite.how);
            return Ok(Discovery::New(to));
        };
        if self.vertices[existing.0].side == side {
            self.stats.duplicates += 1;
            return Ok(Discovery::Duplicate(existing));
        }
        self.stats.bridges += 1;
        Ok(Discovery::Bridge(self.insert_edge(from, existing, rewrite.how)))
    }

    /// Number of rewrite steps in the proof a bridge would produce.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownEdge`] or [`StateError::NotABridge`].
    pub fn bridge_cost(&self, id: EdgeId) -> Result<u64, StateError> {
        let edge = self.edge(id)?;
        let from = self.vertex(edge.from)?;
        let to = self.vertex(edge.to)?;
        if from.side == to.side {
            return Err(StateError::NotABridge { id: id.0 });
        }
        Ok(u64::from(from.depth) + 1 + u64::from(to.depth))
    }

    /// Steps from the root of `id`'s tree down to `id`.
    fn path_from_root(&self, id: VertexId) -> Result<Vec<ProofStep>, StateError> {
        let mut steps = Vec::new();
        let mut current = self.vertex(id)?;
        while let Some(edge_id) = current.parent {
            let edge = self.edge(edge_id)?;
            let parent = self.vertex(edge.from)?;
            steps.push(ProofStep {
                side: current.side,
                how: edge.how.clone(),
                before: parent.expr.clone(),
                after: current.expr.clone(),
            });
            current = parent;
        }
        steps.reverse();
        Ok(steps)
    }

    /// Build the proof term closed by a bridge edge without sealing.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownEdge`] or [`StateError::NotABridge`].
    pub fn proof_for_bridge(&self, id: EdgeId) -> Result<ProofTerm, StateError> {
        self.bridge_cost(id)?;
        let edge = self.edge(id)?;
        let from = self.vertex(edge.from)?;
        let to = self.vertex(edge.to)?;

        let mut near = self.path_from_root(edge.from)?;
        near.push(ProofStep {
            side: from.side,
            how: edge.how.clone(),
            before: from.expr.clone(),
            after: to.expr.clone(),
        });
        let far = self.path_from_root(edge.to)?;

        let (lhs_steps, rhs_steps) = match from.side {
            Side::Lhs => (near, far),
            Side::Rhs => (far, near),
        };
        Ok(ProofTerm {
            equation: self.equation.clone(),
            lhs_steps,
            rhs_steps,
            meeting: to.expr.clone(),
        })
    }

    /// Mark `id` as the solving edge, seal the graph, and return the proof.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Sealed`] if already sealed, or the errors of
    /// [`SearchState::proof_for_bridge`].
    pub fn mark_solved(&mut self, id: EdgeId) -> Result<ProofTerm, StateError> {
        if self.sealed {
            return Err(StateError::Sealed);
        }
        let proof = self.proof_for_bridge(id)?;
        self.solving_edge = Some(id);
        self.sealed = true;
        Ok(proof)
    }

    /// If both sides coincide, seal and return the reflexive proof.
    pub fn solve_trivially(&mut self) -> Option<ProofTerm> {
        if !self.is_trivially_solved() {
            return None;
        }
        self.sealed = true;
        Some(ProofTerm::reflexive(self.equation.clone()))
    }
}
