//! Bundle verification: tampered search artifacts are rejected.
//!
//! Each negative case rebuilds the bundle through `build_bundle` so hashes,
//! manifest, and digest stay consistent and only the targeted semantic check
//! can fire.

use rewrite_harness::bundle::{
    build_bundle, verify_bundle, ArtifactBundleV1, BundleVerifyError, CONFIG_ARTIFACT,
    FIXTURE_ARTIFACT, RESULT_ARTIFACT, SEARCH_GRAPH_ARTIFACT, TRACE_ARTIFACT,
};
use rewrite_harness::catalog::fixture_by_id;
use rewrite_harness::runner::run_fixture;

use lock_tests::bundle_test_helpers::{
    rebuild_with_modified_graph, rebuild_with_modified_json, rebuild_without_artifact,
};

fn solved_bundle() -> ArtifactBundleV1 {
    run_fixture(&fixture_by_id("monoid.unit_cancel").unwrap()).unwrap()
}

fn failed_bundle() -> ArtifactBundleV1 {
    run_fixture(&fixture_by_id("monoid.distinct_atoms").unwrap()).unwrap()
}

#[test]
fn untouched_bundles_verify() {
    verify_bundle(&solved_bundle()).unwrap();
    verify_bundle(&failed_bundle()).unwrap();
}

#[test]
fn raw_content_edit_breaks_content_hash() {
    let mut bundle = solved_bundle();
    let artifact = bundle.artifacts.get_mut(RESULT_ARTIFACT).unwrap();
    artifact.content.push(b' ');
    assert!(matches!(
        verify_bundle(&bundle),
        Err(BundleVerifyError::ContentHashMismatch { .. })
    ));
}

#[test]
fn wrong_meeting_fails_proof_check() {
    let bundle = rebuild_with_modified_json(&solved_bundle(), RESULT_ARTIFACT, |v| {
        v["result"]["proof"]["meeting"] = "b".into();
    });
    assert!(matches!(
        verify_bundle(&bundle),
        Err(BundleVerifyError::ProofCheckFailed { .. })
    ));
}

#[test]
fn proof_for_other_equation_is_rejected() {
    let bundle = rebuild_with_modified_json(&solved_bundle(), RESULT_ARTIFACT, |v| {
        v["result"]["proof"]["equation"]["lhs"] = "mul(b, one)".into();
    });
    assert_eq!(
        verify_bundle(&bundle),
        Err(BundleVerifyError::ProofEquationMismatch)
    );
}

#[test]
fn undecodable_proof_is_rejected() {
    let bundle = rebuild_with_modified_json(&solved_bundle(), RESULT_ARTIFACT, |v| {
        v["result"]["proof"]["lhs_steps"] = serde_json::json!("nope");
    });
    assert!(matches!(
        verify_bundle(&bundle),
        Err(BundleVerifyError::ProofDecodeFailed { .. })
    ));
}

#[test]
fn status_flip_contradicts_termination() {
    let bundle = rebuild_with_modified_json(&solved_bundle(), RESULT_ARTIFACT, |v| {
        v["result"] = serde_json::json!({"reason": "exhausted", "status": "failure"});
    });
    assert!(matches!(
        verify_bundle(&bundle),
        Err(BundleVerifyError::StatusMismatch { .. })
    ));
}

#[test]
fn graph_termination_flip_is_rejected() {
    let bundle = rebuild_with_modified_graph(&failed_bundle(), |g| {
        g["metadata"]["termination"] = "solved".into();
    });
    assert!(matches!(
        verify_bundle(&bundle),
        Err(BundleVerifyError::StatusMismatch { .. })
    ));
}

#[test]
fn edited_fixture_breaks_fixture_binding() {
    let bundle = rebuild_with_modified_json(&solved_bundle(), FIXTURE_ARTIFACT, |v| {
        v["fixture_id"] = "renamed".into();
    });
    assert!(matches!(
        verify_bundle(&bundle),
        Err(BundleVerifyError::BindingMismatch {
            field: "fixture_digest",
            ..
        })
    ));
}

#[test]
fn edited_graph_breaks_graph_binding() {
    let bundle = rebuild_with_modified_json(&solved_bundle(), SEARCH_GRAPH_ARTIFACT, |v| {
        v["vertices"] = serde_json::json!([]);
    });
    assert!(matches!(
        verify_bundle(&bundle),
        Err(BundleVerifyError::BindingMismatch {
            field: "search_graph_digest",
            ..
        })
    ));
}

#[test]
fn stale_rule_table_digest_is_rejected() {
    let bundle = rebuild_with_modified_graph(&solved_bundle(), |g| {
        g["metadata"]["rule_table_digest"] = "sha256:00".into();
    });
    assert!(matches!(
        verify_bundle(&bundle),
        Err(BundleVerifyError::BindingMismatch {
            field: "rule_table_digest",
            ..
        })
    ));
}

#[test]
fn edited_config_breaks_config_binding() {
    let bundle = rebuild_with_modified_json(&solved_bundle(), CONFIG_ARTIFACT, |v| {
        v["max_iterations"] = 1.into();
    });
    assert!(matches!(
        verify_bundle(&bundle),
        Err(BundleVerifyError::BindingMismatch {
            field: "config_digest",
            ..
        })
    ));
}

#[test]
fn missing_graph_is_reported() {
    let bundle = rebuild_without_artifact(&solved_bundle(), SEARCH_GRAPH_ARTIFACT);
    assert_eq!(
        verify_bundle(&bundle),
        Err(BundleVerifyError::ArtifactMissing {
            name: SEARCH_GRAPH_ARTIFACT
        })
    );
}

#[test]
fn observational_edit_keeps_digest() {
    let original = solved_bundle();
    let artifacts = original
        .artifacts
        .values()
        .map(|a| {
            let content = if a.name == TRACE_ARTIFACT {
                b"rewritten trace\n".to_vec()
            } else {
                a.content.clone()
            };
            (a.name.clone(), content, a.normative)
        })
        .collect();
    let rebuilt = build_bundle(artifacts).unwrap();
    verify_bundle(&rebuilt).unwrap();
    assert_eq!(rebuilt.digest, original.digest);
    assert_ne!(rebuilt.manifest, original.manifest);
}
