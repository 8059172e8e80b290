//! Runs catalog fixtures and prints deterministic key=value lines for
//! cross-process comparison.
//!
//! Usage: `search_fixture [fixture_id ...]` (all catalog fixtures when no
//! ids are given).

use rewrite_harness::bundle::{RESULT_ARTIFACT, SEARCH_GRAPH_ARTIFACT};
use rewrite_harness::catalog::{all_fixtures, fixture_by_id};
use rewrite_harness::runner::run_fixture;

fn main() {
    let ids: Vec<String> = std::env::args().skip(1).collect();
    let fixtures = if ids.is_empty() {
        all_fixtures()
    } else {
        ids.iter()
            .map(|id| fixture_by_id(id).unwrap_or_else(|| panic!("unknown fixture {id}")))
            .collect()
    };

    for fixture in fixtures {
        let bundle = run_fixture(&fixture).expect("fixture run failed");
        let result: serde_json::Value = serde_json::from_slice(
            &bundle
                .get(RESULT_ARTIFACT)
                .expect("missing result.json")
                .content,
        )
        .expect("invalid result JSON");
        let graph: serde_json::Value = serde_json::from_slice(
            &bundle
                .get(SEARCH_GRAPH_ARTIFACT)
                .expect("missing search_graph.json")
                .content,
        )
        .expect("invalid graph JSON");

        let status = result["result"]["status"].as_str().expect("missing status");
        let proof_len = ["lhs_steps", "rhs_steps"]
            .iter()
            .map(|k| {
                result["result"]["proof"][k]
                    .as_array()
                    .map_or(0, Vec::len)
            })
            .sum::<usize>();

        println!("fixture={}", fixture.fixture_id);
        println!("bundle_digest={}", bundle.digest.as_str());
        println!(
            "search_graph_digest={}",
            result["search_graph_digest"].as_str().expect("missing graph digest")
        );
        println!("status={status}");
        println!(
            "termination={}",
            graph["metadata"]["termination"].as_str().expect("missing termination")
        );
        println!("steps={}", result["steps"]);
        println!("proof_len={proof_len}");
        println!("vertices={}", graph["vertices"].as_array().map_or(0, Vec::len));
        println!("artifact_count={}", bundle.artifacts.len());
    }
}
