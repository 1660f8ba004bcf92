use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterError {
    /// The request never produced a usable response (connection refused,
    /// timeout, malformed body).
    #[error("transport error: {0}")]
    Transport(String),
    /// The cluster answered with a non-success status.
    #[error("cluster returned HTTP {status} for {endpoint}: {reason}")]
    Api {
        status: u16,
        endpoint: String,
        reason: String,
    },
}

/// Capability the pruning pipeline consumes.
///
/// All three calls are blocking network operations from the pipeline's
/// point of view; any timeout policy lives in the implementation.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Resolve an alias to its current member index names. The returned
    /// set carries no ordering guarantee.
    async fn resolve_alias(&self, alias: &str) -> Result<Vec<String>, ClusterError>;

    /// Fetch one index's on-disk store size in bytes.
    ///
    /// `Ok(None)` means the cluster answered but the response shape
    /// lacked the size field (possible for unusual index states) - the
    /// caller treats this as a soft skip, not a failure.
    async fn index_store_bytes(&self, index: &str) -> Result<Option<i64>, ClusterError>;

    /// Delete a single index.
    async fn delete_index(&self, index: &str) -> Result<(), ClusterError>;
}
