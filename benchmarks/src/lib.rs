//! Shared helpers for the rewrite benchmark suites.

use rewrite_harness::fixture::SearchFixtureV1;
use rewrite_kernel::rules::RuleTable;
use rewrite_kernel::term::{Equation, Expr};
use rewrite_search::config::SearchConfigV1;
use rewrite_search::driver::{run_default, SearchOutcome};

/// Inputs for calling the driver directly, bypassing fixture decoding and
/// bundle assembly.
pub struct SearchSetup {
    pub config: SearchConfigV1,
    pub equation: Equation,
    pub table: RuleTable,
}

/// Resolve a fixture's config and rule table once.
///
/// # Panics
///
/// Panics if the fixture is invalid. Benchmark setup failures are fatal.
#[must_use]
pub fn prepare_search_setup(fixture: &SearchFixtureV1) -> SearchSetup {
    SearchSetup {
        config: fixture.search_config().expect("search_config"),
        equation: fixture.equation.clone(),
        table: fixture.table().expect("table"),
    }
}

/// Run the default strategy on a prepared setup.
///
/// # Panics
///
/// Panics if the driver returns an error.
#[must_use]
pub fn run_search_only(setup: &SearchSetup) -> SearchOutcome {
    run_default(&setup.config, setup.equation.clone(), setup.table.clone()).expect("search")
}

/// `mul(...mul(mul(x0, x1), x2)..., xn)`: a left-nested product of `n + 1`
/// atoms. Every inner `mul` is a redex for associativity.
#[must_use]
pub fn left_nested_product(n: usize) -> Expr {
    (1..=n).fold(Expr::atom("x0"), |acc, i| {
        Expr::app("mul", vec![acc, Expr::atom(&format!("x{i}"))])
    })
}

/// Number of vertices and edges in the outcome's graph, as JSON.
#[must_use]
pub fn graph_size(outcome: &SearchOutcome) -> serde_json::Value {
    serde_json::json!({
        "edges": outcome.graph.edges.len(),
        "vertices": outcome.graph.vertices.len(),
    })
}
