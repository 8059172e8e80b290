//! Breadth-first strategy over the fixture catalog.
//!
//! Every catalog fixture has a pinned outcome. Every proof found must
//! replay against the fixture's own rule table.

use rewrite_harness::bundle::{verify_bundle, EXPLANATION_ARTIFACT, TRACE_ARTIFACT};
use rewrite_harness::catalog::{all_fixtures, fixture_by_id};
use rewrite_harness::runner::{run_fixture_with, FixtureRun};
use rewrite_search::bfs::{default_strategy, BFS_STRATEGY_ID};
use rewrite_search::driver::{FailureReasonV1, SearchResultV1};
use rewrite_search::graph::TerminationV1;

fn run(id: &str) -> FixtureRun {
    let fixture = fixture_by_id(id).unwrap();
    run_fixture_with(&fixture, &default_strategy()).unwrap()
}

#[test]
fn catalog_outcomes_are_pinned() {
    let expected = [
        ("monoid.unit_cancel", "solved"),
        ("monoid.assoc_shift", "solved"),
        ("monoid.reflexive", "solved"),
        ("monoid.distinct_atoms", "exhausted"),
        ("group.inv_inv_cancel", "solved"),
        ("group.mul_inv_cancel_left", "solved"),
        ("group.capped", "max_iterations_exceeded"),
        ("monoid_zero.absorb", "solved"),
    ];
    assert_eq!(expected.len(), all_fixtures().len());
    for (id, termination) in expected {
        let run = run(id);
        assert_eq!(
            run.outcome.graph.metadata.termination.as_str(),
            termination,
            "{id}"
        );
        assert_eq!(run.outcome.graph.metadata.strategy_id, BFS_STRATEGY_ID);
        verify_bundle(&run.bundle).unwrap_or_else(|e| panic!("{id}: {e}"));
    }
}

#[test]
fn every_proof_replays_against_its_table() {
    for fixture in all_fixtures() {
        let run = run_fixture_with(&fixture, &default_strategy()).unwrap();
        if let SearchResultV1::Success { proof, .. } = &run.outcome.result {
            assert_eq!(proof.equation, fixture.equation, "{}", fixture.fixture_id);
            proof
                .check(&fixture.table().unwrap())
                .unwrap_or_else(|e| panic!("{}: {e}", fixture.fixture_id));
        }
    }
}

#[test]
fn assoc_shift_solves_in_one_step() {
    let run = run("monoid.assoc_shift");
    let SearchResultV1::Success { proof, steps } = &run.outcome.result else {
        panic!("expected success");
    };
    assert_eq!(*steps, 1);
    assert_eq!(proof.len(), 1);
}

#[test]
fn unit_cancel_meets_in_the_middle() {
    let run = run("monoid.unit_cancel");
    let SearchResultV1::Success { proof, steps } = &run.outcome.result else {
        panic!("expected success");
    };
    assert_eq!(*steps, 2);
    assert_eq!(proof.lhs_steps.len(), 1);
    assert_eq!(proof.rhs_steps.len(), 1);
    assert_eq!(proof.meeting.to_string(), "a");
    assert!(matches!(
        run.outcome.graph.metadata.termination,
        TerminationV1::Solved { edge: Some(_) }
    ));
}

#[test]
fn reflexive_fixture_takes_no_steps() {
    let run = run("monoid.reflexive");
    assert_eq!(run.outcome.steps, 0);
    let explanation = run.bundle.get(EXPLANATION_ARTIFACT).unwrap();
    let text = String::from_utf8(explanation.content.clone()).unwrap();
    assert!(text.contains("refl"), "{text}");
}

#[test]
fn distinct_atoms_exhaust_before_the_cap() {
    let run = run("monoid.distinct_atoms");
    assert_eq!(
        run.outcome.result,
        SearchResultV1::Failure {
            reason: FailureReasonV1::Exhausted
        }
    );
    assert!(run.outcome.steps < 50);
}

#[test]
fn capped_fixture_traces_every_step() {
    let run = run("group.capped");
    assert_eq!(run.outcome.steps, 25);
    let trace = String::from_utf8(run.bundle.get(TRACE_ARTIFACT).unwrap().content.clone())
        .unwrap();
    assert_eq!(trace.lines().filter(|l| l.starts_with("step ")).count(), 25);
    assert!(trace.lines().next().unwrap().starts_with("startup "));
}

#[test]
fn plain_explanation_uses_occurrence_rewrites() {
    let run = run("group.mul_inv_cancel_left");
    let text = run.outcome.explanation.unwrap();
    assert!(text.contains("nth_rewrite_"), "{text}");
    assert!(!text.contains("conv_"), "{text}");
}
