// ABOUTME: End-to-end pipeline scenarios over fake collaborator toolsets.
// ABOUTME: Covers rollout ceilings, endpoint discovery, fail-fast, and cleanup.

mod support;

use std::sync::atomic::Ordering;
use std::time::Duration;

use anodos::orchestrator::Orchestrator;
use anodos::output::{Output, OutputMode};
use anodos::pipeline::{Outcome, PipelineContext, StageError, run_stages};
use anodos::types::BuildId;

use support::Fakes;

fn quiet() -> Output {
    Output::new(OutputMode::Quiet)
}

fn context() -> PipelineContext {
    PipelineContext::new(BuildId::new("42").unwrap())
}

/// Scenario A: the rollout completes well inside its ceiling; Deploy succeeds
/// and Expose runs afterwards.
#[tokio::test]
async fn rollout_within_ceiling_proceeds_to_expose() {
    let mut config = support::test_config();
    config.rollout_timeout = Duration::from_millis(300);

    let fakes = Fakes {
        rollout_duration: Duration::from_millis(120),
        ..Fakes::default()
    };
    let orchestrator = Orchestrator::new(config, fakes.toolset());

    let outcome = orchestrator
        .run(BuildId::new("42").unwrap(), &mut quiet())
        .await;

    assert_eq!(outcome, Outcome::Succeeded);
    let entries = fakes.log.entries();
    let rollout = entries
        .iter()
        .position(|e| e == "workloads.rollout myapp complete")
        .expect("rollout should complete");
    let expose = entries
        .iter()
        .position(|e| e.starts_with("routing.apply"))
        .expect("ingress should be applied");
    assert!(rollout < expose, "expose must follow the rollout: {entries:?}");
}

/// Scenario B: the hostname appears on the fifth probe; the endpoint is
/// recorded and every configured smoke path is checked.
#[tokio::test]
async fn endpoint_discovered_on_fifth_probe() {
    let config = support::test_config();
    let fakes = Fakes {
        hostname_ready_at: 5,
        ..Fakes::default()
    };
    let orchestrator = Orchestrator::new(config, fakes.toolset());

    let outcome = orchestrator
        .run(BuildId::new("42").unwrap(), &mut quiet())
        .await;

    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(fakes.routing_attempts.load(Ordering::SeqCst), 5);
    let entries = fakes.log.entries();
    assert!(entries.contains(&"probe http://lb.example.com/".to_string()));
    assert!(entries.contains(&"probe http://lb.example.com/health".to_string()));
}

/// Scenario C: a failed push aborts the run before Configure; cleanup still
/// removes the locally-built tags.
#[tokio::test]
async fn failed_push_skips_later_stages_but_cleans_up() {
    let config = support::test_config();
    let fakes = Fakes {
        fail_push: true,
        ..Fakes::default()
    };
    let orchestrator = Orchestrator::new(config, fakes.toolset());
    let mut cx = context();

    let failure = run_stages(&orchestrator.stages(), &mut cx, &quiet())
        .await
        .expect_err("push failure must abort the run");
    orchestrator.cleanup(&mut cx).await;

    assert_eq!(failure.stage, "Publish");
    assert_eq!(cx.outcome(), Outcome::Failed);

    let log = &fakes.log;
    assert!(!log.any_with_prefix("cluster."), "Configure must not run");
    assert!(!log.any_with_prefix("workloads."), "Deploy must not run");
    assert!(!log.any_with_prefix("routing."), "Expose must not run");
    assert_eq!(
        log.count_with_prefix("images.remove"),
        2,
        "both local tags are removed"
    );
}

/// Cleanup runs exactly once per invocation when every stage succeeds.
#[tokio::test]
async fn cleanup_runs_exactly_once_on_success() {
    let config = support::test_config();
    let fakes = Fakes::default();
    let orchestrator = Orchestrator::new(config, fakes.toolset());

    let outcome = orchestrator
        .run(BuildId::new("42").unwrap(), &mut quiet())
        .await;

    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(fakes.log.count_with_prefix("images.remove"), 2);
    assert_eq!(
        fakes.log.entries().first().map(String::as_str),
        Some("images.build registry.example.com/team/myapp:42")
    );
}

/// A build failure leaves nothing to clean up, but the run still reports a
/// failed outcome.
#[tokio::test]
async fn build_failure_has_nothing_to_remove() {
    let config = support::test_config();
    let fakes = Fakes {
        fail_build: true,
        ..Fakes::default()
    };
    let orchestrator = Orchestrator::new(config, fakes.toolset());

    let outcome = orchestrator
        .run(BuildId::new("42").unwrap(), &mut quiet())
        .await;

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(fakes.log.count_with_prefix("images.remove"), 0);
}

/// A rollout exceeding its ceiling fails the Deploy stage.
#[tokio::test]
async fn rollout_exceeding_ceiling_fails_deploy() {
    let mut config = support::test_config();
    config.rollout_timeout = Duration::from_millis(50);

    let fakes = Fakes {
        rollout_duration: Duration::from_millis(200),
        ..Fakes::default()
    };
    let orchestrator = Orchestrator::new(config, fakes.toolset());
    let mut cx = context();

    let failure = run_stages(&orchestrator.stages(), &mut cx, &quiet())
        .await
        .expect_err("rollout timeout must fail the run");

    assert_eq!(failure.stage, "Deploy");
    assert!(!fakes.log.any_with_prefix("routing."), "Expose must not run");
}

/// A hostname that never appears fails the Verify stage with a timeout.
#[tokio::test]
async fn endpoint_never_provisioned_times_out() {
    let mut config = support::test_config();
    config.endpoint.deadline = Duration::from_millis(50);
    config.endpoint.interval = Duration::from_millis(10);

    let fakes = Fakes {
        hostname_ready_at: u32::MAX,
        ..Fakes::default()
    };
    let orchestrator = Orchestrator::new(config, fakes.toolset());
    let mut cx = context();

    let failure = run_stages(&orchestrator.stages(), &mut cx, &quiet())
        .await
        .expect_err("endpoint discovery must time out");

    assert_eq!(failure.stage, "Verify");
    assert!(matches!(failure.reason, StageError::EndpointTimeout { .. }));
    assert!(!fakes.log.any_with_prefix("probe "), "no smoke checks on timeout");
}

/// Smoke-check failures are collected as warnings and never gate the run.
#[tokio::test]
async fn smoke_failures_do_not_fail_the_run() {
    let config = support::test_config();
    let fakes = Fakes {
        probe_fail: true,
        ..Fakes::default()
    };
    let orchestrator = Orchestrator::new(config, fakes.toolset());
    let mut cx = context();

    run_stages(&orchestrator.stages(), &mut cx, &quiet())
        .await
        .expect("probe failures must not abort the run");

    assert_eq!(cx.outcome(), Outcome::Succeeded);
    assert_eq!(cx.diagnostics().warnings().len(), 2);
    assert_eq!(cx.endpoint(), Some("lb.example.com"));
}

/// An error-status smoke response is a warning, not a failure.
#[tokio::test]
async fn smoke_error_status_is_a_warning() {
    let config = support::test_config();
    let fakes = Fakes {
        probe_status: 503,
        ..Fakes::default()
    };
    let orchestrator = Orchestrator::new(config, fakes.toolset());
    let mut cx = context();

    run_stages(&orchestrator.stages(), &mut cx, &quiet())
        .await
        .expect("bad status must not abort the run");

    assert_eq!(cx.outcome(), Outcome::Succeeded);
    assert_eq!(cx.diagnostics().warnings().len(), 2);
}

/// Running cleanup twice on an already-cleaned state only accumulates cleanup
/// warnings; the outcome never changes and nothing crashes.
#[tokio::test]
async fn cleanup_is_idempotent_and_never_masks_outcome() {
    let config = support::test_config();
    let fakes = Fakes {
        fail_remove: true,
        ..Fakes::default()
    };
    let orchestrator = Orchestrator::new(config, fakes.toolset());
    let mut cx = context();

    run_stages(&orchestrator.stages(), &mut cx, &quiet())
        .await
        .expect("run should succeed");
    assert_eq!(cx.outcome(), Outcome::Succeeded);

    orchestrator.cleanup(&mut cx).await;
    orchestrator.cleanup(&mut cx).await;

    assert_eq!(cx.outcome(), Outcome::Succeeded);
    assert_eq!(cx.diagnostics().warnings().len(), 4);
    assert!(
        cx.diagnostics()
            .warnings()
            .iter()
            .all(|w| w.kind == anodos::diagnostics::WarningKind::Cleanup)
    );
}

/// The versioned tag, never "latest", is substituted into the deployment
/// manifest.
#[tokio::test]
async fn deploy_pins_the_versioned_tag() {
    let config = support::test_config();
    let fakes = Fakes::default();
    let orchestrator = Orchestrator::new(config, fakes.toolset());

    let outcome = orchestrator
        .run(BuildId::new("20240101120000").unwrap(), &mut quiet())
        .await;

    assert_eq!(outcome, Outcome::Succeeded);
    let entries = fakes.log.entries();
    assert!(
        entries.iter().any(|e| e
            == "workloads.apply_with_image k8s/deployment.yaml IMAGE_TAG registry.example.com/team/myapp:20240101120000"),
        "deployment must be pinned to the versioned tag: {entries:?}"
    );
    assert!(
        !entries
            .iter()
            .any(|e| e.starts_with("workloads.apply_with_image") && e.ends_with(":latest")),
        "latest must never be applied"
    );
}
