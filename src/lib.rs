//! # index-warden
//!
//! An operational control loop that keeps search-cluster index aliases
//! under a configured disk-size budget. On a fixed interval it measures
//! each alias's aggregate on-disk size and deletes the oldest-named
//! member indices until the alias is back under budget.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Warden (scheduler)                      │
//! │  • Fires one evaluation cycle per poll interval             │
//! │  • Iterates aliases in configured order, sequentially       │
//! │  • Per-alias failures isolated as CycleReport outcomes      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ per alias
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Inspector → Pruner                       │
//! │  • Resolve alias, fetch per-index store sizes               │
//! │  • Strict threshold check against the byte budget           │
//! │  • Evict oldest-named indices until back under budget       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  ClusterClient (seam)                       │
//! │  • HttpCluster: Elasticsearch-compatible REST API           │
//! │  • InMemoryCluster: failure-injecting fake for tests        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use index_warden::{HttpCluster, Warden, WardenConfig};
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WardenConfig::load("./config.yaml")?;
//!     config.validate()?;
//!
//!     let cluster = HttpCluster::new(&config.cluster)?;
//!     cluster.ping().await?;
//!
//!     let warden = Warden::new(&config, Arc::new(cluster), false)?;
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     warden.run(shutdown_rx).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Behavior notes
//!
//! - Eviction order is ascending lexicographic by index name; it
//!   approximates "oldest first" only when index names embed sortable
//!   timestamps or sequence numbers.
//! - Byte accounting during eviction trusts the sizes observed at
//!   snapshot time; the next cycle re-measures from the cluster.
//! - Dry-run mode computes and logs the same eviction plan without
//!   issuing any delete calls.

pub mod cluster;
pub mod config;
pub mod inspector;
pub mod metrics;
pub mod pruner;
pub mod resilience;
pub mod snapshot;
pub mod units;
pub mod warden;

pub use cluster::{ClusterClient, ClusterError, HttpCluster, InMemoryCluster};
pub use config::{AliasConfig, ClusterConfig, ConfigError, WardenConfig};
pub use inspector::inspect;
pub use pruner::{evict, needs_pruning, PruneError};
pub use resilience::retry::RetryConfig;
pub use snapshot::{AliasSnapshot, AliasTarget, IndexSnapshot};
pub use units::{parse_size, SizeParseError};
pub use warden::{AliasOutcome, CycleReport, Warden};
