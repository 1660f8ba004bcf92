//! Alias inspection.
//!
//! Resolves an alias to its member indices and annotates each with its
//! on-disk size, producing a fresh [`AliasSnapshot`] for the cycle.
//!
//! Failure policy (the defensive split):
//! - alias resolution or a failed stats call aborts the whole inspection
//!   with no partial snapshot - a single unreachable index means the
//!   alias's totals cannot be trusted this cycle;
//! - a stats response that merely lacks the size field soft-skips that
//!   index (recorded with size 0, excluded from the total, warned).

use tracing::warn;

use crate::cluster::ClusterClient;
use crate::pruner::PruneError;
use crate::snapshot::{AliasSnapshot, IndexSnapshot};

pub async fn inspect(
    client: &dyn ClusterClient,
    alias: &str,
) -> Result<AliasSnapshot, PruneError> {
    let names = client
        .resolve_alias(alias)
        .await
        .map_err(|source| PruneError::AliasResolution {
            alias: alias.to_string(),
            source,
        })?;

    let mut indices = Vec::with_capacity(names.len());
    for name in names {
        match client.index_store_bytes(&name).await {
            Ok(Some(size_bytes)) => indices.push(IndexSnapshot { name, size_bytes }),
            Ok(None) => {
                warn!(index = %name, "stats response missing store size, excluding from total");
                indices.push(IndexSnapshot {
                    name,
                    size_bytes: 0,
                });
            }
            Err(source) => return Err(PruneError::Stats { index: name, source }),
        }
    }

    Ok(AliasSnapshot::new(alias.to_string(), indices))
}
