//! Per-cycle data model.
//!
//! Each evaluation cycle builds a fresh [`AliasSnapshot`] from cluster
//! statistics, decides against the alias's budget, and drops the snapshot
//! when the cycle ends. Nothing here is shared across ticks.

/// One cluster index and its on-disk size at observation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSnapshot {
    pub name: String,
    /// Store size in bytes. Zero when the stats response lacked the size
    /// field (such indices are excluded from the alias total).
    pub size_bytes: i64,
}

/// Point-in-time view of an alias's member indices.
///
/// `total_bytes` always equals the sum of the members' `size_bytes`;
/// the constructor is the only way to build one.
#[derive(Debug, Clone)]
pub struct AliasSnapshot {
    pub name: String,
    pub indices: Vec<IndexSnapshot>,
    pub total_bytes: i64,
}

impl AliasSnapshot {
    pub fn new(name: String, indices: Vec<IndexSnapshot>) -> Self {
        let total_bytes = indices.iter().map(|i| i.size_bytes).sum();
        Self {
            name,
            indices,
            total_bytes,
        }
    }
}

/// A configured alias with its budget resolved to bytes.
///
/// Built once from configuration at startup; immutable for the life of
/// the process. The raw `max_size` string is kept for log output.
#[derive(Debug, Clone)]
pub struct AliasTarget {
    pub name: String,
    pub max_size: String,
    pub max_size_bytes: i64,
}
