//! Hash domain governance lock tests.
//!
//! Proves:
//! 1. Canonical domain set has expected count
//! 2. All domain byte strings are unique
//! 3. All domains are null-terminated and follow `REWRITE::*::V1\0`
//! 4. `canonical_hash` equals `sha256(domain || data)` computed independently
//! 5. No raw `REWRITE::` domain literals in production source outside
//!    `hash_domain.rs`

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rewrite_kernel::proof::hash::{canonical_hash, HashDomain};
use sha2::{Digest, Sha256};

#[test]
fn hash_domain_canonical_set_count() {
    assert_eq!(
        HashDomain::ALL.len(),
        9,
        "expected 9 domain variants; if you added a new domain, update this count"
    );
}

#[test]
fn hash_domain_all_unique_bytes() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        assert!(
            seen.insert(domain.as_bytes()),
            "duplicate domain bytes: {domain}"
        );
    }
}

#[test]
fn hash_domain_naming_convention() {
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(bytes.starts_with(b"REWRITE::"), "{domain} prefix");
        assert!(bytes.ends_with(b"::V1\0"), "{domain} suffix");
        assert_eq!(
            bytes.iter().filter(|&&b| b == 0).count(),
            1,
            "{domain} has an interior NUL"
        );
    }
}

#[test]
fn canonical_hash_matches_independent_sha256() {
    let data = br#"{"lhs":"a","rhs":"b"}"#;
    for domain in HashDomain::ALL {
        let mut hasher = Sha256::new();
        hasher.update(domain.as_bytes());
        hasher.update(data);
        let expected = format!("sha256:{}", hex::encode(hasher.finalize()));
        assert_eq!(canonical_hash(*domain, data).as_str(), expected, "{domain}");
    }
}

#[test]
fn same_data_differs_across_domains() {
    let digests: BTreeSet<String> = HashDomain::ALL
        .iter()
        .map(|d| canonical_hash(*d, b"x").as_str().to_string())
        .collect();
    assert_eq!(digests.len(), HashDomain::ALL.len());
}

/// Scan kernel/, search/, harness/ source for `b"REWRITE::` literals.
/// The only file allowed to contain them is `hash_domain.rs`.
#[test]
fn no_raw_domain_literals_outside_authority() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let pattern = "b\"REWRITE::";
    let authority_file = "hash_domain.rs";
    let mut violations = Vec::new();

    for crate_dir in ["kernel", "search", "harness"] {
        for path in walkdir(&root.join(crate_dir).join("src")) {
            if path.extension().and_then(|e| e.to_str()) != Some("rs") {
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()) == Some(authority_file) {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            for (i, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if !trimmed.starts_with("//") && trimmed.contains(pattern) {
                    violations.push(format!("  {}:{}: {}", path.display(), i + 1, trimmed));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "raw REWRITE:: domain literals found outside {authority_file}:\n{}",
        violations.join("\n")
    );
}

fn walkdir(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                results.extend(walkdir(&path));
            } else {
                results.push(path);
            }
        }
    }
    results
}
