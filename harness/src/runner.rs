//! Fixture runner: drives one search and packages the artifacts.
//!
//! # Pipeline
//!
//! ```text
//! fixture → search_config() + table()
//!   → driver::run (buffered trace, proof-script explainer)
//!   → canonical JSON for fixture, config, graph, result
//!   → build_bundle
//! ```
//!
//! `trace.log` and `explanation.txt` are observational; everything else is
//! normative.

use rewrite_kernel::proof::canon::canonical_json_bytes;
use rewrite_search::bfs::default_strategy;
use rewrite_search::contract::StrategyFactory;
use rewrite_search::driver::{run, SearchOutcome};
use rewrite_search::error::SearchError;
use rewrite_search::explain::ProofScriptExplainer;
use rewrite_search::trace::BufferedTraceSink;

use crate::bundle::{
    build_bundle, ArtifactBundleV1, BundleBuildError, CONFIG_ARTIFACT, EXPLANATION_ARTIFACT,
    FIXTURE_ARTIFACT, RESULT_ARTIFACT, SEARCH_GRAPH_ARTIFACT, TRACE_ARTIFACT,
};
use crate::fixture::{FixtureError, SearchFixtureV1};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    Fixture(FixtureError),
    Search(SearchError),
    CanonFailed { detail: String },
    BundleFailed(BundleBuildError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixture(e) => write!(f, "{e}"),
            Self::Search(e) => write!(f, "search: {e}"),
            Self::CanonFailed { detail } => write!(f, "canonical JSON error: {detail}"),
            Self::BundleFailed(e) => write!(f, "bundle: {e}"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<FixtureError> for RunError {
    fn from(e: FixtureError) -> Self {
        Self::Fixture(e)
    }
}

impl From<SearchError> for RunError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

/// A finished fixture run: the driver outcome and its bundle.
#[derive(Debug, Clone)]
pub struct FixtureRun {
    pub outcome: SearchOutcome,
    pub bundle: ArtifactBundleV1,
}

/// Run `fixture` with the default strategy and return its bundle.
///
/// # Errors
///
/// Returns [`RunError`] if the fixture is invalid, the search fails fatally,
/// or an artifact cannot be serialized.
pub fn run_fixture(fixture: &SearchFixtureV1) -> Result<ArtifactBundleV1, RunError> {
    Ok(run_fixture_with(fixture, &default_strategy())?.bundle)
}

/// Run `fixture` with an explicit strategy factory.
///
/// # Errors
///
/// See [`run_fixture`].
pub fn run_fixture_with(
    fixture: &SearchFixtureV1,
    factory: &dyn StrategyFactory,
) -> Result<FixtureRun, RunError> {
    let config = fixture.search_config()?;
    let table = fixture.table()?;

    let mut trace = BufferedTraceSink::new();
    let outcome = run(
        &config,
        factory,
        fixture.equation.clone(),
        table,
        &ProofScriptExplainer,
        &mut trace,
    )?;

    let canon = |value: &serde_json::Value| {
        canonical_json_bytes(value).map_err(|e| RunError::CanonFailed {
            detail: e.to_string(),
        })
    };
    let fixture_bytes = fixture.to_canonical_json_bytes()?;
    let config_bytes = canon(&config.to_json_value())?;
    let graph_bytes = outcome
        .graph
        .to_canonical_json_bytes()
        .map_err(|e| RunError::CanonFailed {
            detail: e.to_string(),
        })?;
    let graph_digest = outcome.graph.digest().map_err(|e| RunError::CanonFailed {
        detail: e.to_string(),
    })?;
    let result_bytes = canon(&serde_json::json!({
        "fixture_digest": fixture.digest()?.as_str(),
        "fixture_id": fixture.fixture_id,
        "result": outcome.result.to_json_value(),
        "search_graph_digest": graph_digest.as_str(),
        "steps": outcome.steps,
    }))?;

    let mut artifacts = vec![
        (FIXTURE_ARTIFACT.to_string(), fixture_bytes, true),
        (CONFIG_ARTIFACT.to_string(), config_bytes, true),
        (SEARCH_GRAPH_ARTIFACT.to_string(), graph_bytes, true),
        (RESULT_ARTIFACT.to_string(), result_bytes, true),
        (TRACE_ARTIFACT.to_string(), trace.to_text().into_bytes(), false),
    ];
    if let Some(text) = &outcome.explanation {
        let mut text = text.clone();
        text.push('\n');
        artifacts.push((EXPLANATION_ARTIFACT.to_string(), text.into_bytes(), false));
    }
    let bundle = build_bundle(artifacts).map_err(RunError::BundleFailed)?;

    Ok(FixtureRun { outcome, bundle })
}
