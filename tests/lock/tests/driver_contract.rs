//! Driver contract tests with scripted strategies.
//!
//! Proves:
//! 1. `step` is never called more than `max_iterations` times
//! 2. A solved step stops the loop immediately
//! 3. Init and startup failures abort before any `step` call
//! 4. `Exhausted` stops the loop unless `exhaustive` is set
//! 5. Strategy panics surface as `StrategyPanicked` with the right stage
//! 6. A trivially true equation never calls `step`
//! 7. Two runs with the same inputs produce the same graph digest

use rewrite_kernel::rules::rule::{RewriteRule, RuleTable};
use rewrite_kernel::term::{Equation, Expr};
use rewrite_search::config::SearchConfigV1;
use rewrite_search::driver::{run, FailureReasonV1, Phase, SearchResultV1};
use rewrite_search::error::{PanicStage, SearchError};
use rewrite_search::explain::ProofScriptExplainer;
use rewrite_search::trace::{BufferedTraceSink, NullTraceSink};

use lock_tests::scripted::{Sabotage, Scripted, ScriptedFactory};

fn equation() -> Equation {
    Equation::parse("mul(a, one) = b").unwrap()
}

fn table() -> RuleTable {
    RuleTable::bidirectional(vec![RewriteRule::new(
        "mul_one",
        Expr::parse("mul(?a, one)").unwrap(),
        Expr::var("a"),
    )])
}

fn config(max_iterations: u64) -> SearchConfigV1 {
    SearchConfigV1 {
        max_iterations,
        ..SearchConfigV1::default()
    }
}

fn run_scripted(
    config: &SearchConfigV1,
    factory: &ScriptedFactory,
) -> Result<rewrite_search::driver::SearchOutcome, SearchError> {
    run(
        config,
        factory,
        equation(),
        table(),
        &ProofScriptExplainer,
        &mut NullTraceSink,
    )
}

#[test]
fn continue_forever_hits_step_cap_exactly() {
    let factory = ScriptedFactory::always(Scripted::Continue);
    let outcome = run_scripted(&config(3), &factory).unwrap();
    assert_eq!(factory.steps(), 3);
    assert_eq!(outcome.steps, 3);
    assert_eq!(
        outcome.result,
        SearchResultV1::Failure {
            reason: FailureReasonV1::MaxIterationsExceeded
        }
    );
    assert_eq!(outcome.phase, Phase::Failed);
    assert_eq!(
        outcome.result.to_json_value()["reason"],
        "max iterations exceeded"
    );
}

#[test]
fn step_cap_holds_for_every_budget() {
    for cap in [1_u64, 2, 7, 40] {
        let factory = ScriptedFactory::always(Scripted::Continue);
        let outcome = run_scripted(&config(cap), &factory).unwrap();
        assert_eq!(factory.steps(), cap);
        assert_eq!(outcome.graph.metadata.stats.iterations, cap);
    }
}

#[test]
fn solved_stops_immediately() {
    let factory = ScriptedFactory::new(vec![Scripted::Continue, Scripted::Solve]);
    let outcome = run_scripted(&config(100), &factory).unwrap();
    assert_eq!(factory.steps(), 2);
    assert!(outcome.result.is_success());
    assert_eq!(outcome.phase, Phase::Solved);
    let SearchResultV1::Success { steps, .. } = outcome.result else {
        panic!("expected success");
    };
    assert_eq!(steps, 2);
}

#[test]
fn init_failure_skips_startup_and_step() {
    let factory =
        ScriptedFactory::always(Scripted::Continue).with_sabotage(Sabotage::InitError);
    let err = run_scripted(&config(10), &factory).unwrap_err();
    assert!(matches!(err, SearchError::StrategyInit(_)), "{err:?}");
    assert_eq!(factory.counts.init.get(), 1);
    assert_eq!(factory.counts.startup.get(), 0);
    assert_eq!(factory.steps(), 0);
}

#[test]
fn startup_failure_skips_step() {
    let factory =
        ScriptedFactory::always(Scripted::Continue).with_sabotage(Sabotage::StartupError);
    let err = run_scripted(&config(10), &factory).unwrap_err();
    assert!(matches!(err, SearchError::Strategy(_)), "{err:?}");
    assert_eq!(factory.counts.startup.get(), 1);
    assert_eq!(factory.steps(), 0);
}

#[test]
fn exhausted_stops_when_not_exhaustive() {
    let factory = ScriptedFactory::new(vec![
        Scripted::Continue,
        Scripted::Exhausted,
        Scripted::Continue,
    ]);
    let outcome = run_scripted(&config(10), &factory).unwrap();
    assert_eq!(factory.steps(), 2);
    assert_eq!(
        outcome.result,
        SearchResultV1::Failure {
            reason: FailureReasonV1::Exhausted
        }
    );
}

#[test]
fn exhaustive_runs_to_cap_and_reports_exhausted() {
    let factory = ScriptedFactory::always(Scripted::Exhausted);
    let cfg = SearchConfigV1 {
        exhaustive: true,
        ..config(5)
    };
    let outcome = run_scripted(&cfg, &factory).unwrap();
    assert_eq!(factory.steps(), 5);
    assert_eq!(
        outcome.result,
        SearchResultV1::Failure {
            reason: FailureReasonV1::Exhausted
        }
    );
}

#[test]
fn exhaustive_reports_cap_when_last_step_made_progress() {
    let factory = ScriptedFactory::new(vec![Scripted::Exhausted, Scripted::Continue]);
    let cfg = SearchConfigV1 {
        exhaustive: true,
        ..config(4)
    };
    let outcome = run_scripted(&cfg, &factory).unwrap();
    assert_eq!(factory.steps(), 4);
    assert_eq!(
        outcome.result,
        SearchResultV1::Failure {
            reason: FailureReasonV1::MaxIterationsExceeded
        }
    );
}

#[test]
fn step_failure_is_a_strategy_error() {
    let factory = ScriptedFactory::new(vec![Scripted::Continue, Scripted::Fail]);
    let err = run_scripted(&config(10), &factory).unwrap_err();
    assert!(matches!(err, SearchError::Strategy(_)), "{err:?}");
    assert_eq!(factory.steps(), 2);
}

#[test]
fn panics_are_caught_per_stage() {
    let cases = [
        (
            ScriptedFactory::always(Scripted::Continue).with_sabotage(Sabotage::InitPanic),
            PanicStage::Init,
        ),
        (
            ScriptedFactory::always(Scripted::Continue).with_sabotage(Sabotage::StartupPanic),
            PanicStage::Startup,
        ),
        (ScriptedFactory::always(Scripted::Panic), PanicStage::Step),
    ];
    for (factory, stage) in cases {
        let err = run_scripted(&config(10), &factory).unwrap_err();
        assert_eq!(err, SearchError::StrategyPanicked { stage });
    }
}

#[test]
fn trivial_equation_never_steps() {
    let factory = ScriptedFactory::always(Scripted::Panic);
    let outcome = run(
        &config(10),
        &factory,
        Equation::parse("mul(a, b) = mul(a, b)").unwrap(),
        table(),
        &ProofScriptExplainer,
        &mut NullTraceSink,
    )
    .unwrap();
    assert_eq!(factory.steps(), 0);
    assert_eq!(factory.counts.startup.get(), 1);
    let SearchResultV1::Success { proof, steps } = outcome.result else {
        panic!("expected success");
    };
    assert_eq!(steps, 0);
    assert!(proof.is_empty());
}

#[test]
fn invalid_config_never_instantiates() {
    let factory = ScriptedFactory::always(Scripted::Continue);
    let err = run_scripted(&config(0), &factory).unwrap_err();
    assert!(matches!(err, SearchError::InvalidConfig { .. }));
    assert_eq!(factory.counts.instantiated.get(), 0);
}

#[test]
fn repeated_runs_are_identical() {
    let cfg = SearchConfigV1 {
        trace: true,
        ..config(6)
    };
    let mut digests = Vec::new();
    let mut traces = Vec::new();
    for _ in 0..2 {
        let factory = ScriptedFactory::new(vec![Scripted::Continue, Scripted::Solve]);
        let mut sink = BufferedTraceSink::new();
        let outcome = run(
            &cfg,
            &factory,
            equation(),
            table(),
            &ProofScriptExplainer,
            &mut sink,
        )
        .unwrap();
        digests.push(outcome.graph.digest().unwrap());
        traces.push(sink.to_text());
    }
    assert_eq!(digests[0], digests[1]);
    assert_eq!(traces[0], traces[1]);
    assert!(traces[0].contains("strategy=scripted.v1"));
}
