//! In-memory artifact bundle: the output of a fixture run.
//!
//! No file I/O in this module; see [`crate::bundle_dir`] for persistence.
//!
//! # Normative vs observational artifacts
//!
//! Normative artifacts participate in the bundle digest. Observational ones
//! (`explanation.txt`, `trace.log`) are listed in the manifest but excluded
//! from the digest basis, so changing how diagnostics are rendered never
//! changes the digest.
//!
//! # Search bindings
//!
//! When a bundle carries `result.json`, [`verify_bundle`] also checks that
//! the search artifacts agree with each other and replays the stored proof
//! against the rule table rebuilt from `fixture.json`.

use std::collections::BTreeMap;

use rewrite_kernel::proof::canon::{canonical_json_bytes, is_canonical_json};
use rewrite_kernel::proof::certificate::ProofTerm;
use rewrite_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};

use crate::fixture::SearchFixtureV1;

pub const FIXTURE_ARTIFACT: &str = "fixture.json";
pub const CONFIG_ARTIFACT: &str = "config.json";
pub const SEARCH_GRAPH_ARTIFACT: &str = "search_graph.json";
pub const RESULT_ARTIFACT: &str = "result.json";
pub const EXPLANATION_ARTIFACT: &str = "explanation.txt";
pub const TRACE_ARTIFACT: &str = "trace.log";

/// A single artifact in the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    /// Logical filename (e.g., `"result.json"`).
    pub name: String,
    pub content: Vec<u8>,
    /// `canonical_hash(HashDomain::BundleArtifact, content)`.
    pub content_hash: ContentHash,
    pub normative: bool,
}

#[derive(Debug, Clone)]
pub struct ArtifactBundleV1 {
    /// Artifacts by logical name, sorted.
    pub artifacts: BTreeMap<String, BundleArtifact>,
    /// Canonical JSON listing every artifact with its normative flag.
    pub manifest: Vec<u8>,
    /// Canonical JSON listing normative artifact hashes only.
    pub digest_basis: Vec<u8>,
    /// `canonical_hash(HashDomain::BundleDigest, digest_basis)`.
    pub digest: ContentHash,
}

impl ArtifactBundleV1 {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BundleArtifact> {
        self.artifacts.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleBuildError {
    CanonError { detail: String },
    /// Two inputs share a name.
    DuplicateArtifact { name: String },
}

impl std::fmt::Display for BundleBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CanonError { detail } => write!(f, "canonical JSON error: {detail}"),
            Self::DuplicateArtifact { name } => write!(f, "duplicate artifact {name}"),
        }
    }
}

impl std::error::Error for BundleBuildError {}

/// Assemble a bundle from `(name, content, normative)` triples.
///
/// # Errors
///
/// Returns [`BundleBuildError`] on a duplicate name or a canonical JSON
/// failure.
pub fn build_bundle(
    artifacts: Vec<(String, Vec<u8>, bool)>,
) -> Result<ArtifactBundleV1, BundleBuildError> {
    let mut map = BTreeMap::new();
    for (name, content, normative) in artifacts {
        if map.contains_key(&name) {
            return Err(BundleBuildError::DuplicateArtifact { name });
        }
        let content_hash = canonical_hash(HashDomain::BundleArtifact, &content);
        map.insert(
            name.clone(),
            BundleArtifact {
                name,
                content,
                content_hash,
                normative,
            },
        );
    }

    let manifest =
        manifest_bytes(&map).map_err(|detail| BundleBuildError::CanonError { detail })?;
    let digest_basis =
        digest_basis_bytes(&map).map_err(|detail| BundleBuildError::CanonError { detail })?;
    let digest = canonical_hash(HashDomain::BundleDigest, &digest_basis);

    Ok(ArtifactBundleV1 {
        artifacts: map,
        manifest,
        digest_basis,
        digest,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleVerifyError {
    ContentHashMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },
    ManifestMismatch,
    ManifestNotCanonical,
    DigestBasisMismatch,
    DigestBasisNotCanonical,
    DigestMismatch { expected: String, actual: String },
    /// A normative `.json` artifact is not canonical.
    ArtifactNotCanonical { artifact: String },
    CanonError { detail: String },
    /// `result.json` is present but a companion search artifact is not.
    ArtifactMissing { name: &'static str },
    ArtifactNotJson { artifact: &'static str, detail: String },
    FixtureInvalid { detail: String },
    /// A field in `result.json` or the graph metadata disagrees with the
    /// value recomputed from the other artifacts.
    BindingMismatch {
        field: &'static str,
        declared: String,
        recomputed: String,
    },
    /// `result.json` status disagrees with the graph termination.
    StatusMismatch { status: String, termination: String },
    ProofDecodeFailed { detail: String },
    /// The proof proves a different equation than the fixture states.
    ProofEquationMismatch,
    /// Replaying the proof against the fixture's rule table failed.
    ProofCheckFailed { detail: String },
}

impl std::fmt::Display for BundleVerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContentHashMismatch {
                artifact,
                expected,
                actual,
            } => write!(f, "{artifact}: content hash {actual} != declared {expected}"),
            Self::ManifestMismatch => f.write_str("manifest does not match artifacts"),
            Self::ManifestNotCanonical => f.write_str("manifest is not canonical JSON"),
            Self::DigestBasisMismatch => f.write_str("digest basis does not match artifacts"),
            Self::DigestBasisNotCanonical => f.write_str("digest basis is not canonical JSON"),
            Self::DigestMismatch { expected, actual } => {
                write!(f, "bundle digest {actual} != declared {expected}")
            }
            Self::ArtifactNotCanonical { artifact } => {
                write!(f, "{artifact} is not canonical JSON")
            }
            Self::CanonError { detail } => write!(f, "canonical JSON error: {detail}"),
            Self::ArtifactMissing { name } => write!(f, "missing artifact {name}"),
            Self::ArtifactNotJson { artifact, detail } => {
                write!(f, "{artifact} is not JSON: {detail}")
            }
            Self::FixtureInvalid { detail } => write!(f, "invalid fixture: {detail}"),
            Self::BindingMismatch {
                field,
                declared,
                recomputed,
            } => write!(f, "{field}: declared {declared}, recomputed {recomputed}"),
            Self::StatusMismatch {
                status,
                termination,
            } => write!(f, "result status {status} contradicts termination {termination}"),
            Self::ProofDecodeFailed { detail } => write!(f, "proof decode failed: {detail}"),
            Self::ProofEquationMismatch => f.write_str("proof is for a different equation"),
            Self::ProofCheckFailed { detail } => write!(f, "proof check failed: {detail}"),
        }
    }
}

impl std::error::Error for BundleVerifyError {}

/// Verify the internal consistency of a bundle.
///
/// 1. Each artifact's `content_hash` matches its content.
/// 2. `manifest` and `digest_basis` match the projections recomputed from
///    the artifacts and are canonical.
/// 3. `digest` matches `digest_basis`.
/// 4. Normative `.json` artifacts are canonical.
/// 5. If `result.json` is present, the search bindings hold (see
///    [`verify_search_bindings`]).
///
/// # Errors
///
/// Returns the first [`BundleVerifyError`] encountered.
pub fn verify_bundle(bundle: &ArtifactBundleV1) -> Result<(), BundleVerifyError> {
    for artifact in bundle.artifacts.values() {
        let recomputed = canonical_hash(HashDomain::BundleArtifact, &artifact.content);
        if recomputed != artifact.content_hash {
            return Err(BundleVerifyError::ContentHashMismatch {
                artifact: artifact.name.clone(),
                expected: artifact.content_hash.as_str().to_string(),
                actual: recomputed.as_str().to_string(),
            });
        }
    }

    let expected_manifest = manifest_bytes(&bundle.artifacts)
        .map_err(|detail| BundleVerifyError::CanonError { detail })?;
    if expected_manifest != bundle.manifest {
        return Err(BundleVerifyError::ManifestMismatch);
    }
    if !is_canonical_json(&bundle.manifest) {
        return Err(BundleVerifyError::ManifestNotCanonical);
    }

    let expected_basis = digest_basis_bytes(&bundle.artifacts)
        .map_err(|detail| BundleVerifyError::CanonError { detail })?;
    if expected_basis != bundle.digest_basis {
        return Err(BundleVerifyError::DigestBasisMismatch);
    }
    if !is_canonical_json(&bundle.digest_basis) {
        return Err(BundleVerifyError::DigestBasisNotCanonical);
    }

    let recomputed_digest = canonical_hash(HashDomain::BundleDigest, &bundle.digest_basis);
    if recomputed_digest != bundle.digest {
        return Err(BundleVerifyError::DigestMismatch {
            expected: bundle.digest.as_str().to_string(),
            actual: recomputed_digest.as_str().to_string(),
        });
    }

    for artifact in bundle.artifacts.values() {
        let is_json = std::path::Path::new(&artifact.name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if artifact.normative && is_json && !is_canonical_json(&artifact.content) {
            return Err(BundleVerifyError::ArtifactNotCanonical {
                artifact: artifact.name.clone(),
            });
        }
    }

    if bundle.artifacts.contains_key(RESULT_ARTIFACT) {
        verify_search_bindings(bundle)?;
    }
    Ok(())
}

/// Cross-check the search artifacts of a fixture run.
///
/// - `result.json` `fixture_digest` matches `fixture.json`, and
///   `search_graph_digest` matches `search_graph.json`.
/// - Graph metadata `rule_table_digest` matches the table rebuilt from the
///   fixture, and `config_digest` matches `config.json`.
/// - The result status agrees with the graph termination.
/// - On success, the proof is for the fixture's equation and replays
///   against the rebuilt rule table.
///
/// # Errors
///
/// Returns the first [`BundleVerifyError`] encountered.
pub fn verify_search_bindings(bundle: &ArtifactBundleV1) -> Result<(), BundleVerifyError> {
    let fixture_artifact = required(bundle, FIXTURE_ARTIFACT)?;
    let config_artifact = required(bundle, CONFIG_ARTIFACT)?;
    let graph_artifact = required(bundle, SEARCH_GRAPH_ARTIFACT)?;
    let result = parse_json(required(bundle, RESULT_ARTIFACT)?, RESULT_ARTIFACT)?;
    let graph = parse_json(graph_artifact, SEARCH_GRAPH_ARTIFACT)?;

    let fixture = SearchFixtureV1::from_json_bytes(&fixture_artifact.content).map_err(|e| {
        BundleVerifyError::FixtureInvalid {
            detail: e.to_string(),
        }
    })?;
    let table = fixture
        .table()
        .map_err(|e| BundleVerifyError::FixtureInvalid {
            detail: e.to_string(),
        })?;

    let fixture_digest = canonical_hash(HashDomain::SearchFixture, &fixture_artifact.content);
    check_binding("fixture_digest", &result["fixture_digest"], &fixture_digest)?;
    let graph_digest = canonical_hash(HashDomain::SearchGraph, &graph_artifact.content);
    check_binding("search_graph_digest", &result["search_graph_digest"], &graph_digest)?;

    let metadata = &graph["metadata"];
    let table_digest = table
        .digest()
        .map_err(|e| BundleVerifyError::CanonError {
            detail: e.to_string(),
        })?;
    check_binding("rule_table_digest", &metadata["rule_table_digest"], &table_digest)?;
    let config_digest = canonical_hash(HashDomain::SearchConfig, &config_artifact.content);
    check_binding("config_digest", &metadata["config_digest"], &config_digest)?;

    let status = result["result"]["status"].as_str().unwrap_or("<missing>");
    let termination = metadata["termination"].as_str().unwrap_or("<missing>");
    let coherent = matches!(
        (status, termination),
        ("success", "solved") | ("failure", "exhausted" | "max_iterations_exceeded")
    );
    if !coherent {
        return Err(BundleVerifyError::StatusMismatch {
            status: status.to_string(),
            termination: termination.to_string(),
        });
    }

    if status == "success" {
        let proof = ProofTerm::from_json_value(&result["result"]["proof"]).map_err(|e| {
            BundleVerifyError::ProofDecodeFailed {
                detail: e.to_string(),
            }
        })?;
        if proof.equation != fixture.equation {
            return Err(BundleVerifyError::ProofEquationMismatch);
        }
        proof
            .check(&table)
            .map_err(|e| BundleVerifyError::ProofCheckFailed {
                detail: e.to_string(),
            })?;
    }
    Ok(())
}

fn required<'a>(
    bundle: &'a ArtifactBundleV1,
    name: &'static str,
) -> Result<&'a BundleArtifact, BundleVerifyError> {
    bundle
        .get(name)
        .ok_or(BundleVerifyError::ArtifactMissing { name })
}

fn parse_json(
    artifact: &BundleArtifact,
    name: &'static str,
) -> Result<serde_json::Value, BundleVerifyError> {
    serde_json::from_slice(&artifact.content).map_err(|e| BundleVerifyError::ArtifactNotJson {
        artifact: name,
        detail: e.to_string(),
    })
}

fn check_binding(
    field: &'static str,
    declared: &serde_json::Value,
    recomputed: &ContentHash,
) -> Result<(), BundleVerifyError> {
    let declared = declared.as_str().unwrap_or("<missing>");
    if declared != recomputed.as_str() {
        return Err(BundleVerifyError::BindingMismatch {
            field,
            declared: declared.to_string(),
            recomputed: recomputed.as_str().to_string(),
        });
    }
    Ok(())
}

fn manifest_bytes(artifacts: &BTreeMap<String, BundleArtifact>) -> Result<Vec<u8>, String> {
    let entries: Vec<serde_json::Value> = artifacts
        .values()
        .map(|a| {
            serde_json::json!({
                "content_hash": a.content_hash.as_str(),
                "name": a.name,
                "normative": a.normative,
            })
        })
        .collect();
    canonical_json_bytes(&serde_json::json!({
        "artifacts": entries,
        "schema_version": "rewrite_bundle.v1",
    }))
    .map_err(|e| e.to_string())
}

fn digest_basis_bytes(artifacts: &BTreeMap<String, BundleArtifact>) -> Result<Vec<u8>, String> {
    let entries: Vec<serde_json::Value> = artifacts
        .values()
        .filter(|a| a.normative)
        .map(|a| {
            serde_json::json!({
                "content_hash": a.content_hash.as_str(),
                "name": a.name,
            })
        })
        .collect();
    canonical_json_bytes(&serde_json::json!({
        "artifacts": entries,
        "schema_version": "rewrite_bundle_digest_basis.v1",
    }))
    .map_err(|e| e.to_string())
}
