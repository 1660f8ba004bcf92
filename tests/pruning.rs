//! Integration tests for the pruning pipeline.
//!
//! All tests run against the in-memory cluster fake - no live cluster or
//! Docker required. Scheduler timing tests use tokio's paused clock.
//!
//! # Test Organization
//! - `happy_*` - aliases within budget, clean pruning runs
//! - `failure_*` - injected cluster failures and their isolation
//! - `scheduler_*` - ticking semantics and shutdown

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use index_warden::{
    AliasConfig, AliasOutcome, ClusterClient, ClusterConfig, InMemoryCluster, Warden, WardenConfig,
};

// =============================================================================
// Helpers
// =============================================================================

fn config(aliases: &[(&str, &str)], poll_interval: u64) -> WardenConfig {
    WardenConfig {
        cluster: ClusterConfig {
            url: "http://localhost:9200".to_string(),
            username: "test".to_string(),
            password: "test".to_string(),
            ca_cert_path: None,
            skip_tls_verify: false,
        },
        aliases: aliases
            .iter()
            .map(|(name, max_size)| AliasConfig {
                name: name.to_string(),
                max_size: max_size.to_string(),
            })
            .collect(),
        poll_interval,
    }
}

fn warden(cluster: &Arc<InMemoryCluster>, cfg: &WardenConfig, dry_run: bool) -> Warden {
    let client: Arc<dyn ClusterClient> = cluster.clone();
    Warden::new(cfg, client, dry_run).expect("valid test config")
}

fn removed_for(outcome: &AliasOutcome) -> Vec<String> {
    match outcome {
        AliasOutcome::Pruned { removed, .. } => removed.clone(),
        other => panic!("expected Pruned outcome, got {:?}", other),
    }
}

// =============================================================================
// Happy Path - decisions and eviction
// =============================================================================

#[tokio::test]
async fn happy_within_budget_deletes_nothing() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_alias("logs", &[("logs-000001", 20_000), ("logs-000002", 30_000)]);

    let cfg = config(&[("logs", "50KB")], 60);
    let report = warden(&cluster, &cfg, false).run_cycle().await;

    // Total 50_000 equals the budget exactly; strict comparison means no
    // pruning is triggered.
    assert!(matches!(
        report.outcomes[0],
        AliasOutcome::WithinBudget {
            total_bytes: 50_000,
            budget_bytes: 50_000,
            ..
        }
    ));
    assert!(cluster.deletions().is_empty());
}

#[tokio::test]
async fn happy_prunes_oldest_named_indices_first() {
    let cluster = Arc::new(InMemoryCluster::new());
    // Registered out of name order on purpose; eviction must sort.
    cluster.add_alias(
        "logs",
        &[("b", 30_000), ("a", 40_000), ("c", 20_000)],
    );

    let cfg = config(&[("logs", "50KB")], 60);
    let report = warden(&cluster, &cfg, false).run_cycle().await;

    // 90_000 total vs 50_000 budget: deleting "a" (40_000) lands exactly
    // on budget, so "b" and "c" survive.
    assert_eq!(removed_for(&report.outcomes[0]), vec!["a"]);
    assert_eq!(cluster.deletions(), vec!["a"]);
    let mut survivors = cluster.alias_members("logs");
    survivors.sort();
    assert_eq!(survivors, vec!["b", "c"]);
}

#[tokio::test]
async fn happy_dry_run_plans_identically_without_deleting() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_alias(
        "logs",
        &[("b", 30_000), ("a", 40_000), ("c", 20_000)],
    );

    let cfg = config(&[("logs", "50KB")], 60);
    let report = warden(&cluster, &cfg, true).run_cycle().await;

    assert_eq!(removed_for(&report.outcomes[0]), vec!["a"]);
    assert!(cluster.deletions().is_empty());
}

#[tokio::test]
async fn happy_second_cycle_after_prune_is_idempotent() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_alias(
        "logs",
        &[("b", 30_000), ("a", 40_000), ("c", 20_000)],
    );

    let cfg = config(&[("logs", "50KB")], 60);
    let w = warden(&cluster, &cfg, false);

    let first = w.run_cycle().await;
    assert_eq!(first.removed_indices(), 1);

    // The fake applied the deletion, so the re-measured total is 50_000,
    // within budget: nothing further to do.
    let second = w.run_cycle().await;
    assert!(matches!(
        second.outcomes[0],
        AliasOutcome::WithinBudget { .. }
    ));
    assert_eq!(cluster.deletions(), vec!["a"]);
}

#[tokio::test]
async fn happy_unmeasured_index_is_excluded_from_total() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_alias("logs", &[("logs-000001", 40_000)]);
    cluster.add_unmeasured_index("logs", "logs-frozen");

    let cfg = config(&[("logs", "50KB")], 60);
    let report = warden(&cluster, &cfg, false).run_cycle().await;

    // The unmeasured member contributes zero bytes, keeping the alias
    // under budget; the soft failure never aborts the cycle.
    assert!(matches!(
        report.outcomes[0],
        AliasOutcome::WithinBudget {
            total_bytes: 40_000,
            ..
        }
    ));
}

#[tokio::test]
async fn happy_exhausting_members_while_over_budget_succeeds() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_alias("logs", &[("a", 10_000), ("b", 10_000)]);

    let cfg = config(&[("logs", "1KB")], 60);
    let report = warden(&cluster, &cfg, false).run_cycle().await;

    // Everything goes and the alias is still notionally over budget;
    // that is a successful outcome, re-checked next cycle.
    assert_eq!(removed_for(&report.outcomes[0]), vec!["a", "b"]);
    assert_eq!(report.failures(), 0);
}

// =============================================================================
// Failure Scenarios - isolation and abort semantics
// =============================================================================

#[tokio::test]
async fn failure_one_bad_stats_call_aborts_the_alias_without_deletions() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_alias(
        "logs",
        &[
            ("logs-000001", 50_000),
            ("logs-000002", 50_000),
            ("logs-000003", 50_000),
            ("logs-000004", 50_000),
            ("logs-000005", 50_000),
        ],
    );
    cluster.fail_stats("logs-000003");

    // Wildly over budget, but the inspection must fail before any
    // eviction decision is made.
    let cfg = config(&[("logs", "1KB")], 60);
    let report = warden(&cluster, &cfg, false).run_cycle().await;

    assert_eq!(report.failures(), 1);
    assert!(cluster.deletions().is_empty());
}

#[tokio::test]
async fn failure_is_isolated_to_the_failing_alias() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_alias("broken", &[("broken-000001", 10_000)]);
    cluster.fail_resolve("broken");
    cluster.add_alias("healthy", &[("healthy-000001", 60_000)]);

    let cfg = config(&[("broken", "1KB"), ("healthy", "50KB")], 60);
    let report = warden(&cluster, &cfg, false).run_cycle().await;

    // "broken" fails, "healthy" in the same tick is still fully
    // processed and pruned.
    assert!(report.outcomes[0].is_failure());
    assert_eq!(removed_for(&report.outcomes[1]), vec!["healthy-000001"]);
    assert_eq!(cluster.deletions(), vec!["healthy-000001"]);
}

#[tokio::test]
async fn failure_mid_eviction_keeps_prior_deletions_and_later_aliases() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_alias("logs", &[("a", 10_000), ("b", 10_000), ("c", 10_000)]);
    cluster.fail_delete("b");
    cluster.add_alias("other", &[("other-000001", 60_000)]);

    let cfg = config(&[("logs", "1KB"), ("other", "50KB")], 60);
    let report = warden(&cluster, &cfg, false).run_cycle().await;

    // "a" was deleted before the failure and is not rolled back; the
    // eviction aborts at "b"; "other" still gets its turn.
    assert!(report.outcomes[0].is_failure());
    assert_eq!(cluster.deletions(), vec!["a", "other-000001"]);
}

#[tokio::test]
async fn failure_unknown_alias_is_a_resolution_error() {
    let cluster = Arc::new(InMemoryCluster::new());

    let cfg = config(&[("ghost", "1GB")], 60);
    let report = warden(&cluster, &cfg, false).run_cycle().await;

    assert_eq!(report.failures(), 1);
    assert_eq!(report.outcomes[0].alias(), "ghost");
}

// =============================================================================
// Scheduler - ticking semantics and shutdown
// =============================================================================

#[tokio::test(start_paused = true)]
async fn scheduler_waits_one_full_interval_before_first_evaluation() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_alias("logs", &[("logs-000001", 40_000), ("logs-000002", 30_000)]);

    let cfg = config(&[("logs", "50KB")], 60);
    let w = Arc::new(warden(&cluster, &cfg, false));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn({
        let w = w.clone();
        async move { w.run(shutdown_rx).await }
    });

    // Just shy of one interval: no evaluation yet.
    tokio::time::sleep(Duration::from_secs(59)).await;
    assert!(cluster.deletions().is_empty());

    // Cross the interval boundary: the first cycle fires and prunes.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(cluster.deletions(), vec!["logs-000001"]);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn scheduler_stops_on_shutdown_before_any_tick() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_alias("logs", &[("logs-000001", 60_000)]);

    let cfg = config(&[("logs", "1KB")], 60);
    let w = Arc::new(warden(&cluster, &cfg, false));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn({
        let w = w.clone();
        async move { w.run(shutdown_rx).await }
    });

    tokio::time::sleep(Duration::from_secs(10)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    // Stopped before the first tick ever fired.
    assert!(cluster.deletions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn scheduler_stops_when_shutdown_sender_drops() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_alias("logs", &[("logs-000001", 10_000)]);

    let cfg = config(&[("logs", "1GB")], 60);
    let w = Arc::new(warden(&cluster, &cfg, false));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn({
        let w = w.clone();
        async move { w.run(shutdown_rx).await }
    });

    drop(shutdown_tx);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn scheduler_keeps_ticking_after_a_failing_cycle() {
    let cluster = Arc::new(InMemoryCluster::new());
    cluster.add_alias("logs", &[("logs-000001", 60_000)]);
    cluster.fail_stats("logs-000001");

    let cfg = config(&[("logs", "50KB")], 60);
    let w = Arc::new(warden(&cluster, &cfg, false));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn({
        let w = w.clone();
        async move { w.run(shutdown_rx).await }
    });

    // Two full intervals with a persistently failing alias: the loop
    // must survive both cycles.
    tokio::time::sleep(Duration::from_secs(121)).await;

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
    assert!(cluster.deletions().is_empty());
}
