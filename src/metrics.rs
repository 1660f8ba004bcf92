// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for index-warden.
//!
//! Uses the `metrics` crate for backend-agnostic collection; the
//! embedding process chooses the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `index_warden_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//! - `_bytes` suffix for size gauges
//!
//! # Labels
//! - `alias`: the configured alias name
//! - `stage`: resolve, stats, delete
//! - `mode`: real, dry_run

use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Record how long one full evaluation cycle took.
pub fn record_cycle_duration(duration: Duration) {
    histogram!("index_warden_cycle_seconds").record(duration.as_secs_f64());
}

/// Set the last observed aggregate size for an alias.
pub fn set_alias_bytes(alias: &str, bytes: i64) {
    gauge!(
        "index_warden_alias_bytes",
        "alias" => alias.to_string()
    )
    .set(bytes as f64);
}

/// Set the configured budget for an alias (exported once per cycle so
/// dashboards can plot observed vs budget without config access).
pub fn set_alias_budget_bytes(alias: &str, bytes: i64) {
    gauge!(
        "index_warden_alias_budget_bytes",
        "alias" => alias.to_string()
    )
    .set(bytes as f64);
}

/// Record indices removed (or simulated in dry-run) for an alias.
pub fn record_indices_removed(alias: &str, count: usize, dry_run: bool) {
    counter!(
        "index_warden_indices_removed_total",
        "alias" => alias.to_string(),
        "mode" => if dry_run { "dry_run" } else { "real" }
    )
    .increment(count as u64);
}

/// Record a per-alias pipeline failure, tagged with the stage it died in.
pub fn record_prune_error(alias: &str, stage: &'static str) {
    counter!(
        "index_warden_errors_total",
        "alias" => alias.to_string(),
        "stage" => stage
    )
    .increment(1);
}
