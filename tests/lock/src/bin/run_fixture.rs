//! Runs one fixture JSON file and writes its bundle directory.
//!
//! Usage: `run_fixture <fixture.json> <out_dir>`
//!
//! Prints the bundle digest and result status; the explanation (if any) and
//! any error go to stderr. Exit code 0 on a verified bundle, 1 on any
//! failure, 2 on bad usage.

use std::path::Path;
use std::process::ExitCode;

use rewrite_harness::bundle::EXPLANATION_ARTIFACT;
use rewrite_harness::bundle_dir::{verify_bundle_dir, write_bundle_dir};
use rewrite_harness::fixture::SearchFixtureV1;
use rewrite_harness::runner::run_fixture;

fn run(fixture_path: &Path, out_dir: &Path) -> Result<(), String> {
    let bytes = std::fs::read(fixture_path)
        .map_err(|e| format!("read {}: {e}", fixture_path.display()))?;
    let fixture = SearchFixtureV1::from_json_bytes(&bytes).map_err(|e| e.to_string())?;
    let bundle = run_fixture(&fixture).map_err(|e| e.to_string())?;
    write_bundle_dir(&bundle, out_dir).map_err(|e| e.to_string())?;
    let bundle = verify_bundle_dir(out_dir).map_err(|e| e.to_string())?;

    println!("bundle_digest={}", bundle.digest.as_str());
    if let Some(explanation) = bundle.get(EXPLANATION_ARTIFACT) {
        eprint!("{}", String::from_utf8_lossy(&explanation.content));
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let [_, fixture_path, out_dir] = args.as_slice() else {
        eprintln!("usage: run_fixture <fixture.json> <out_dir>");
        return ExitCode::from(2);
    };
    match run(Path::new(fixture_path), Path::new(out_dir)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
