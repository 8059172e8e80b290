//! On-disk bundle directories.
//!
//! # Layout
//!
//! ```text
//! <dir>/
//!   bundle_manifest.json       canonical JSON, every artifact
//!   bundle_digest_basis.json   canonical JSON, normative artifacts only
//!   bundle_digest.txt          "sha256:..."
//!   fixture.json               normative
//!   config.json                normative
//!   search_graph.json          normative
//!   result.json                normative
//!   explanation.txt            observational, solved runs with explain
//!   trace.log                  observational
//! ```
//!
//! The manifest is the source of truth for which files belong. Reading is
//! fail-closed: missing declared files, undeclared extra files, and a stale
//! `bundle_digest.txt` are all errors.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rewrite_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};

use crate::bundle::{verify_bundle, ArtifactBundleV1, BundleArtifact, BundleVerifyError};

const MANIFEST_FILE: &str = "bundle_manifest.json";
const DIGEST_BASIS_FILE: &str = "bundle_digest_basis.json";
const DIGEST_FILE: &str = "bundle_digest.txt";
const RESERVED_FILES: [&str; 3] = [MANIFEST_FILE, DIGEST_BASIS_FILE, DIGEST_FILE];
const MANIFEST_SCHEMA: &str = "rewrite_bundle.v1";
const TEMP_PREFIX: &str = ".partial_";

#[derive(Debug)]
pub enum BundleDirWriteError {
    Io { detail: String },
    /// An artifact name would escape the directory or clash with metadata.
    InvalidArtifactName { name: String },
}

impl std::fmt::Display for BundleDirWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::InvalidArtifactName { name } => write!(f, "invalid artifact name {name:?}"),
        }
    }
}

impl std::error::Error for BundleDirWriteError {}

#[derive(Debug)]
pub enum BundleDirReadError {
    Io { detail: String },
    MissingMetadata { filename: String },
    MissingArtifact { name: String },
    ExtraFile { name: String },
    ManifestParseError { detail: String },
    ManifestVersionMismatch { found: String },
    ManifestEntryInvalid { detail: String },
    /// `bundle_digest.txt` does not match the digest of the stored basis.
    DigestMismatch { stored: String, recomputed: String },
}

impl std::fmt::Display for BundleDirReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::MissingMetadata { filename } => write!(f, "missing metadata file {filename}"),
            Self::MissingArtifact { name } => write!(f, "missing artifact {name}"),
            Self::ExtraFile { name } => write!(f, "undeclared file {name}"),
            Self::ManifestParseError { detail } => write!(f, "manifest parse error: {detail}"),
            Self::ManifestVersionMismatch { found } => {
                write!(f, "unsupported manifest schema {found:?}")
            }
            Self::ManifestEntryInvalid { detail } => write!(f, "manifest entry invalid: {detail}"),
            Self::DigestMismatch { stored, recomputed } => {
                write!(f, "stored digest {stored} != recomputed {recomputed}")
            }
        }
    }
}

impl std::error::Error for BundleDirReadError {}

#[derive(Debug)]
pub enum BundleDirVerifyError {
    Read(BundleDirReadError),
    Verify(BundleVerifyError),
}

impl std::fmt::Display for BundleDirVerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read(e) => write!(f, "read: {e}"),
            Self::Verify(e) => write!(f, "verify: {e}"),
        }
    }
}

impl std::error::Error for BundleDirVerifyError {}

fn io_write(context: &str, e: &std::io::Error) -> BundleDirWriteError {
    BundleDirWriteError::Io {
        detail: format!("{context}: {e}"),
    }
}

fn io_read(context: &str, e: &std::io::Error) -> BundleDirReadError {
    BundleDirReadError::Io {
        detail: format!("{context}: {e}"),
    }
}

/// Write `bundle` into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`BundleDirWriteError`] on I/O failure or an artifact name that is
/// not a plain file name.
pub fn write_bundle_dir(bundle: &ArtifactBundleV1, dir: &Path) -> Result<(), BundleDirWriteError> {
    std::fs::create_dir_all(dir).map_err(|e| io_write("create_dir_all", &e))?;
    for artifact in bundle.artifacts.values() {
        let plain = Path::new(&artifact.name).file_name().and_then(|n| n.to_str())
            == Some(artifact.name.as_str());
        if !plain
            || RESERVED_FILES.contains(&artifact.name.as_str())
            || artifact.name.starts_with(TEMP_PREFIX)
        {
            return Err(BundleDirWriteError::InvalidArtifactName {
                name: artifact.name.clone(),
            });
        }
        write_via_rename(dir, &artifact.name, &artifact.content)?;
    }
    write_via_rename(dir, MANIFEST_FILE, &bundle.manifest)?;
    write_via_rename(dir, DIGEST_BASIS_FILE, &bundle.digest_basis)?;
    write_via_rename(dir, DIGEST_FILE, bundle.digest.as_str().as_bytes())
}

/// Read a bundle directory back into memory.
///
/// Content hashes come from the manifest; [`verify_bundle`] (or
/// [`verify_bundle_dir`]) checks them against the file contents.
///
/// # Errors
///
/// Returns [`BundleDirReadError`] on any layout violation.
pub fn read_bundle_dir(dir: &Path) -> Result<ArtifactBundleV1, BundleDirReadError> {
    let manifest = read_metadata(dir, MANIFEST_FILE)?;
    let digest_basis = read_metadata(dir, DIGEST_BASIS_FILE)?;
    let stored_digest = read_metadata(dir, DIGEST_FILE)?;

    let value: serde_json::Value = serde_json::from_slice(&manifest).map_err(|e| {
        BundleDirReadError::ManifestParseError {
            detail: e.to_string(),
        }
    })?;
    let schema = value["schema_version"].as_str().unwrap_or_default();
    if schema != MANIFEST_SCHEMA {
        return Err(BundleDirReadError::ManifestVersionMismatch {
            found: schema.to_string(),
        });
    }
    let entries = value["artifacts"]
        .as_array()
        .ok_or_else(|| BundleDirReadError::ManifestParseError {
            detail: "\"artifacts\" is not an array".into(),
        })?;

    let mut artifacts = BTreeMap::new();
    for entry in entries {
        let name = entry["name"]
            .as_str()
            .ok_or_else(|| BundleDirReadError::ManifestEntryInvalid {
                detail: "entry without \"name\"".into(),
            })?
            .to_string();
        let invalid = |what: &str| BundleDirReadError::ManifestEntryInvalid {
            detail: format!("{name}: {what}"),
        };
        let content_hash = entry["content_hash"]
            .as_str()
            .and_then(ContentHash::parse)
            .ok_or_else(|| invalid("bad or missing \"content_hash\""))?;
        let normative = entry["normative"]
            .as_bool()
            .ok_or_else(|| invalid("missing \"normative\""))?;
        let content = std::fs::read(dir.join(&name))
            .map_err(|_| BundleDirReadError::MissingArtifact { name: name.clone() })?;
        artifacts.insert(
            name.clone(),
            BundleArtifact {
                name,
                content,
                content_hash,
                normative,
            },
        );
    }

    for file in list_files(dir)? {
        if !artifacts.contains_key(&file) && !RESERVED_FILES.contains(&file.as_str()) {
            return Err(BundleDirReadError::ExtraFile { name: file });
        }
    }

    let digest = canonical_hash(HashDomain::BundleDigest, &digest_basis);
    let stored = String::from_utf8_lossy(&stored_digest).trim().to_string();
    if stored != digest.as_str() {
        return Err(BundleDirReadError::DigestMismatch {
            stored,
            recomputed: digest.as_str().to_string(),
        });
    }

    Ok(ArtifactBundleV1 {
        artifacts,
        manifest,
        digest_basis,
        digest,
    })
}

/// Read `dir` and run [`verify_bundle`] on it, including proof replay.
///
/// # Errors
///
/// Returns [`BundleDirVerifyError`] on read failure or integrity mismatch.
pub fn verify_bundle_dir(dir: &Path) -> Result<ArtifactBundleV1, BundleDirVerifyError> {
    let bundle = read_bundle_dir(dir).map_err(BundleDirVerifyError::Read)?;
    verify_bundle(&bundle).map_err(BundleDirVerifyError::Verify)?;
    Ok(bundle)
}

/// Write to a temp file in `dir`, then rename into place.
fn write_via_rename(dir: &Path, name: &str, content: &[u8]) -> Result<(), BundleDirWriteError> {
    let temp = dir.join(format!("{TEMP_PREFIX}{name}"));
    let target = dir.join(name);
    std::fs::write(&temp, content).map_err(|e| io_write(&format!("write {}", temp.display()), &e))?;
    std::fs::rename(&temp, &target)
        .map_err(|e| io_write(&format!("rename to {}", target.display()), &e))
}

fn read_metadata(dir: &Path, filename: &str) -> Result<Vec<u8>, BundleDirReadError> {
    std::fs::read(dir.join(filename)).map_err(|_| BundleDirReadError::MissingMetadata {
        filename: filename.to_string(),
    })
}

/// Regular files in `dir`, skipping leftovers from interrupted writes.
fn list_files(dir: &Path) -> Result<BTreeSet<String>, BundleDirReadError> {
    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_read("read_dir", &e))? {
        let entry = entry.map_err(|e| io_read("dir entry", &e))?;
        let file_type = entry.file_type().map_err(|e| io_read("file_type", &e))?;
        if !file_type.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if !name.starts_with(TEMP_PREFIX) {
                files.insert(name.to_string());
            }
        }
    }
    Ok(files)
}
