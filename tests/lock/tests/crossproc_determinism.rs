//! Cross-process determinism.
//!
//! Spawns the fixture binaries under four environment variants and asserts
//! identical output. Search results must not depend on process-level state
//! (cwd, locale, env vars, hash seeds).

use std::path::{Path, PathBuf};
use std::process::Command;

use rewrite_harness::bundle_dir::verify_bundle_dir;
use rewrite_harness::catalog::{all_fixtures, fixture_by_id};

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

/// `cargo test` puts test binaries in `target/<profile>/deps/`; the fixture
/// binaries live one level up.
fn binary_path(name: &str) -> PathBuf {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push(name);
    path
}

fn run_variant(bin: &str, args: &[&str], work_dir: &str, env_overrides: &[(&str, &str)]) -> String {
    let bin = binary_path(bin);
    let mut command = Command::new(&bin);
    command.args(args).current_dir(work_dir);
    command
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!(
            "failed to spawn {} (work_dir={work_dir}, overrides={env_overrides:?}): {e}",
            bin.display()
        )
    });
    assert!(
        output.status.success(),
        "{} exited with {}: stderr={}",
        bin.display(),
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

/// Runs `f` under baseline, alternate cwd, C locale, and noise env; asserts
/// every variant matches the baseline and returns it.
fn assert_four_variants(f: impl Fn(&str, &[(&str, &str)]) -> String) -> String {
    let root = workspace_root();
    let baseline = f(&root, &[]);

    let alt_cwd = if cfg!(target_os = "windows") {
        "C:\\"
    } else {
        "/tmp"
    };
    assert_eq!(baseline, f(alt_cwd, &[]), "output differs when cwd is {alt_cwd}");
    assert_eq!(
        baseline,
        f(&root, &[("LC_ALL", "C"), ("LANG", "C")]),
        "output differs when LC_ALL=C LANG=C"
    );
    assert_eq!(
        baseline,
        f(
            &root,
            &[
                ("REWRITE_NOISE", "should_not_matter"),
                ("TZ", "America/New_York"),
                ("HOME", "/nonexistent"),
            ],
        ),
        "output differs with spurious env vars"
    );
    baseline
}

#[test]
fn catalog_output_identical_across_env_variants() {
    let baseline =
        assert_four_variants(|cwd, env| run_variant("search_fixture", &[], cwd, env));

    assert_eq!(
        baseline.lines().filter(|l| l.starts_with("fixture=")).count(),
        all_fixtures().len()
    );
    assert!(baseline.contains("bundle_digest=sha256:"));
    assert!(baseline.contains("termination=max_iterations_exceeded"));
}

#[test]
fn selected_fixture_matches_in_process_run() {
    let output = run_variant(
        "search_fixture",
        &["monoid.unit_cancel"],
        &workspace_root(),
        &[],
    );
    let bundle =
        rewrite_harness::runner::run_fixture(&fixture_by_id("monoid.unit_cancel").unwrap())
            .unwrap();
    assert!(output.starts_with("fixture=monoid.unit_cancel\n"));
    assert!(
        output.contains(&format!("bundle_digest={}\n", bundle.digest.as_str())),
        "{output}"
    );
    assert!(output.contains("status=success\n"));
}

#[test]
fn fixture_file_bundles_identical_across_env_variants() {
    let scratch = tempfile::tempdir().unwrap();
    let fixture = fixture_by_id("group.inv_inv_cancel").unwrap();
    let fixture_path = scratch.path().join("fixture.json");
    std::fs::write(&fixture_path, fixture.to_canonical_json_bytes().unwrap()).unwrap();
    let fixture_arg = fixture_path.to_string_lossy().to_string();

    let counter = std::cell::Cell::new(0_u32);
    let baseline = assert_four_variants(|cwd, env| {
        counter.set(counter.get() + 1);
        let out_dir = scratch.path().join(format!("bundle_{}", counter.get()));
        let out_arg = out_dir.to_string_lossy().to_string();
        let stdout = run_variant("run_fixture", &[&fixture_arg, &out_arg], cwd, env);
        verify_bundle_dir(&out_dir).unwrap();
        stdout
    });
    assert!(baseline.starts_with("bundle_digest=sha256:"));
}
