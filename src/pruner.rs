//! Budget decision and eviction.
//!
//! [`needs_pruning`] is the threshold check; [`evict`] removes (or
//! simulates removing) the oldest-named indices until the alias is back
//! under budget. Both also lend their error type, [`PruneError`], to the
//! inspection stage so one enum describes everything that can go wrong
//! for a single alias in a single cycle.

use thiserror::Error;
use tracing::info;

use crate::cluster::{ClusterClient, ClusterError};
use crate::snapshot::{AliasSnapshot, IndexSnapshot};

/// Everything that can fail while evaluating one alias in one cycle.
#[derive(Error, Debug)]
pub enum PruneError {
    #[error("failed to resolve alias '{alias}'")]
    AliasResolution {
        alias: String,
        #[source]
        source: ClusterError,
    },
    #[error("failed to fetch stats for index '{index}'")]
    Stats {
        index: String,
        #[source]
        source: ClusterError,
    },
    #[error("failed to delete index '{index}'")]
    Deletion {
        index: String,
        #[source]
        source: ClusterError,
    },
}

impl PruneError {
    /// Pipeline stage label for metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::AliasResolution { .. } => "resolve",
            Self::Stats { .. } => "stats",
            Self::Deletion { .. } => "delete",
        }
    }
}

/// Whether the alias exceeds its budget. Strict: a total exactly equal
/// to the budget does not trigger pruning.
#[must_use]
pub fn needs_pruning(snapshot: &AliasSnapshot, budget_bytes: i64) -> bool {
    snapshot.total_bytes > budget_bytes
}

/// Delete indices, oldest name first, until `current_bytes` is at or
/// under `budget_bytes`. Returns the names acted on, in order.
///
/// Names sort ascending lexicographically - "oldest first" only insofar
/// as the caller's index naming embeds sortable timestamps or sequence
/// numbers, which is a convention this function assumes, not enforces.
///
/// The running size trusts each index's previously observed size rather
/// than re-querying after every deletion, so the post-deletion total is
/// an estimate for "how many more to delete", not a re-synchronized
/// cluster figure. Exhausting the list while still over budget is not an
/// error: the next cycle re-measures and tries again.
///
/// A delete failure aborts immediately with [`PruneError::Deletion`];
/// indices already deleted in this run stay deleted.
pub async fn evict(
    client: &dyn ClusterClient,
    mut indices: Vec<IndexSnapshot>,
    mut current_bytes: i64,
    budget_bytes: i64,
    dry_run: bool,
) -> Result<Vec<String>, PruneError> {
    indices.sort_by(|a, b| a.name.cmp(&b.name));

    let mut removed = Vec::new();
    for index in indices {
        if current_bytes <= budget_bytes {
            break;
        }

        if dry_run {
            info!(index = %index.name, size_bytes = index.size_bytes, "would delete index");
        } else {
            client
                .delete_index(&index.name)
                .await
                .map_err(|source| PruneError::Deletion {
                    index: index.name.clone(),
                    source,
                })?;
            info!(index = %index.name, size_bytes = index.size_bytes, "deleted index");
        }

        current_bytes -= index.size_bytes;
        removed.push(index.name);
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::InMemoryCluster;

    fn index(name: &str, size_bytes: i64) -> IndexSnapshot {
        IndexSnapshot {
            name: name.to_string(),
            size_bytes,
        }
    }

    fn snapshot(indices: Vec<IndexSnapshot>) -> AliasSnapshot {
        AliasSnapshot::new("logs".to_string(), indices)
    }

    #[test]
    fn test_needs_pruning_is_strict() {
        let snap = snapshot(vec![index("a", 50)]);
        assert!(!needs_pruning(&snap, 50));
        assert!(needs_pruning(&snap, 49));
        assert!(!needs_pruning(&snap, 51));
    }

    #[tokio::test]
    async fn test_evicts_name_sorted_until_under_budget() {
        let cluster = InMemoryCluster::new();
        cluster.add_alias("logs", &[("b", 30), ("a", 40), ("c", 20)]);

        let indices = vec![index("b", 30), index("a", 40), index("c", 20)];
        let removed = evict(&cluster, indices, 90, 50, false).await.unwrap();

        // Deleting "a" (40 bytes) brings 90 down to 50, which is within
        // budget; "b" and "c" are never touched.
        assert_eq!(removed, vec!["a"]);
        assert_eq!(cluster.deletions(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_dry_run_issues_no_deletes_but_same_plan() {
        let cluster = InMemoryCluster::new();
        cluster.add_alias("logs", &[("b", 30), ("a", 40), ("c", 20)]);

        let indices = vec![index("b", 30), index("a", 40), index("c", 20)];
        let removed = evict(&cluster, indices, 90, 50, true).await.unwrap();

        assert_eq!(removed, vec!["a"]);
        assert!(cluster.deletions().is_empty());
    }

    #[tokio::test]
    async fn test_already_under_budget_deletes_nothing() {
        let cluster = InMemoryCluster::new();
        let removed = evict(&cluster, vec![index("a", 40)], 40, 40, false)
            .await
            .unwrap();
        assert!(removed.is_empty());
        assert!(cluster.deletions().is_empty());
    }

    #[tokio::test]
    async fn test_exhausting_indices_over_budget_is_success() {
        let cluster = InMemoryCluster::new();
        cluster.add_alias("logs", &[("a", 10), ("b", 10)]);

        let indices = vec![index("a", 10), index("b", 10)];
        // Even deleting everything leaves 80 > 50; prune what we can.
        let removed = evict(&cluster, indices, 100, 50, false).await.unwrap();

        assert_eq!(removed, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_delete_failure_aborts_without_rollback() {
        let cluster = InMemoryCluster::new();
        cluster.add_alias("logs", &[("a", 10), ("b", 10), ("c", 10)]);
        cluster.fail_delete("b");

        let indices = vec![index("a", 10), index("b", 10), index("c", 10)];
        let err = evict(&cluster, indices, 30, 0, false).await.unwrap_err();

        assert!(matches!(err, PruneError::Deletion { ref index, .. } if index == "b"));
        // "a" was deleted before the failure and stays deleted.
        assert_eq!(cluster.deletions(), vec!["a"]);
    }

    #[test]
    fn test_stage_labels() {
        let err = PruneError::Stats {
            index: "a".to_string(),
            source: ClusterError::Transport("boom".to_string()),
        };
        assert_eq!(err.stage(), "stats");
    }
}
