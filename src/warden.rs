//! The scheduler loop.
//!
//! A [`Warden`] owns the resolved alias targets and drives the per-alias
//! pipeline (inspect, decide, evict) on a fixed interval until told to
//! stop. Each alias's outcome is captured as a value in a
//! [`CycleReport`] rather than allowed to propagate - one alias's
//! failure never aborts the tick or the loop.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::cluster::ClusterClient;
use crate::config::{ConfigError, WardenConfig};
use crate::inspector::inspect;
use crate::pruner::{evict, needs_pruning, PruneError};
use crate::snapshot::AliasTarget;

/// Result of evaluating one alias in one cycle.
#[derive(Debug)]
pub enum AliasOutcome {
    /// Aggregate size at or under budget; nothing to do.
    WithinBudget {
        alias: String,
        total_bytes: i64,
        budget_bytes: i64,
    },
    /// Over budget; eviction ran to completion. `removed` holds the
    /// index names acted on (simulated in dry-run), oldest name first.
    Pruned {
        alias: String,
        total_bytes: i64,
        budget_bytes: i64,
        removed: Vec<String>,
    },
    /// Inspection or eviction failed; the error was logged and the tick
    /// moved on to the next alias.
    Failed { alias: String, error: PruneError },
}

impl AliasOutcome {
    pub fn alias(&self) -> &str {
        match self {
            Self::WithinBudget { alias, .. }
            | Self::Pruned { alias, .. }
            | Self::Failed { alias, .. } => alias,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// All per-alias outcomes from one tick, in configured order.
#[derive(Debug)]
pub struct CycleReport {
    pub outcomes: Vec<AliasOutcome>,
}

impl CycleReport {
    #[must_use]
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// Indices removed (or simulated) across all aliases this tick.
    #[must_use]
    pub fn removed_indices(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                AliasOutcome::Pruned { removed, .. } => removed.len(),
                _ => 0,
            })
            .sum()
    }
}

pub struct Warden {
    targets: Vec<AliasTarget>,
    client: Arc<dyn ClusterClient>,
    interval: Duration,
    dry_run: bool,
}

impl Warden {
    /// Build a warden from validated configuration. Budget strings are
    /// parsed here, once; a bad size is fatal before the loop starts.
    pub fn new(
        config: &WardenConfig,
        client: Arc<dyn ClusterClient>,
        dry_run: bool,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            targets: config.targets()?,
            client,
            interval: Duration::from_secs(config.poll_interval),
            dry_run,
        })
    }

    /// Run until the shutdown channel fires (or its sender drops).
    ///
    /// Ticking semantics: the first evaluation happens one full interval
    /// after start, not immediately. An in-flight cycle finishes before
    /// shutdown is honored; no new tick begins after it.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            aliases = self.targets.len(),
            interval_secs = self.interval.as_secs(),
            dry_run = self.dry_run,
            "warden started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // An interval's first tick completes immediately; consume it so
        // evaluation starts one full interval in.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("shutdown requested, stopping scheduler");
                        break;
                    }
                }
            }
        }
    }

    /// Evaluate every configured alias once, strictly in order.
    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();
        let mut outcomes = Vec::with_capacity(self.targets.len());

        for target in &self.targets {
            let outcome = self.process_alias(target).await;
            if let AliasOutcome::Failed { alias, error } = &outcome {
                crate::metrics::record_prune_error(alias, error.stage());
                error!(alias = %alias, error = %error, "alias processing failed");
            }
            outcomes.push(outcome);
        }

        crate::metrics::record_cycle_duration(started.elapsed());
        let report = CycleReport { outcomes };
        debug!(
            aliases = report.outcomes.len(),
            failures = report.failures(),
            removed = report.removed_indices(),
            "cycle complete"
        );
        report
    }

    async fn process_alias(&self, target: &AliasTarget) -> AliasOutcome {
        let snapshot = match inspect(self.client.as_ref(), &target.name).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                return AliasOutcome::Failed {
                    alias: target.name.clone(),
                    error,
                }
            }
        };

        crate::metrics::set_alias_bytes(&target.name, snapshot.total_bytes);
        crate::metrics::set_alias_budget_bytes(&target.name, target.max_size_bytes);

        if !needs_pruning(&snapshot, target.max_size_bytes) {
            debug!(
                alias = %target.name,
                total_bytes = snapshot.total_bytes,
                budget_bytes = target.max_size_bytes,
                "alias within budget"
            );
            return AliasOutcome::WithinBudget {
                alias: target.name.clone(),
                total_bytes: snapshot.total_bytes,
                budget_bytes: target.max_size_bytes,
            };
        }

        warn!(
            alias = %target.name,
            total_bytes = snapshot.total_bytes,
            budget = %target.max_size,
            budget_bytes = target.max_size_bytes,
            "alias over budget"
        );

        let total_bytes = snapshot.total_bytes;
        match evict(
            self.client.as_ref(),
            snapshot.indices,
            total_bytes,
            target.max_size_bytes,
            self.dry_run,
        )
        .await
        {
            Ok(removed) => {
                crate::metrics::record_indices_removed(&target.name, removed.len(), self.dry_run);
                AliasOutcome::Pruned {
                    alias: target.name.clone(),
                    total_bytes,
                    budget_bytes: target.max_size_bytes,
                    removed,
                }
            }
            Err(error) => AliasOutcome::Failed {
                alias: target.name.clone(),
                error,
            },
        }
    }
}
