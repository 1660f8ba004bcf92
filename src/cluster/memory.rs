//! In-memory cluster fake.
//!
//! Backs the unit and integration tests: aliases map to index sets,
//! indices carry a size (or none, to simulate a stats response without
//! the size field), and each operation can be made to fail per name.
//! Deletions are recorded in call order so tests can assert eviction
//! sequences exactly.

use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use super::traits::{ClusterClient, ClusterError};

#[derive(Default)]
pub struct InMemoryCluster {
    aliases: DashMap<String, Vec<String>>,
    /// Index name -> size. An index present in an alias but absent here
    /// reports `Ok(None)` from stats.
    sizes: DashMap<String, i64>,
    fail_resolve: DashSet<String>,
    fail_stats: DashSet<String>,
    fail_delete: DashSet<String>,
    deleted: Mutex<Vec<String>>,
}

impl InMemoryCluster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias with its member indices and sizes.
    pub fn add_alias(&self, alias: &str, indices: &[(&str, i64)]) {
        let names = indices.iter().map(|(name, _)| name.to_string()).collect();
        self.aliases.insert(alias.to_string(), names);
        for (name, size) in indices {
            self.sizes.insert(name.to_string(), *size);
        }
    }

    /// Add a member whose stats response will lack the size field.
    pub fn add_unmeasured_index(&self, alias: &str, index: &str) {
        self.aliases
            .entry(alias.to_string())
            .or_default()
            .push(index.to_string());
    }

    /// Make alias resolution fail with a transport error.
    pub fn fail_resolve(&self, alias: &str) {
        self.fail_resolve.insert(alias.to_string());
    }

    /// Make the stats call for one index fail with a transport error.
    pub fn fail_stats(&self, index: &str) {
        self.fail_stats.insert(index.to_string());
    }

    /// Make deletion of one index fail with a transport error.
    pub fn fail_delete(&self, index: &str) {
        self.fail_delete.insert(index.to_string());
    }

    /// Deletions observed so far, in call order.
    pub fn deletions(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// Current member names of an alias (deletions already applied).
    pub fn alias_members(&self, alias: &str) -> Vec<String> {
        self.aliases
            .get(alias)
            .map(|members| members.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ClusterClient for InMemoryCluster {
    async fn resolve_alias(&self, alias: &str) -> Result<Vec<String>, ClusterError> {
        if self.fail_resolve.contains(alias) {
            return Err(ClusterError::Transport(format!(
                "injected resolve failure for '{}'",
                alias
            )));
        }
        match self.aliases.get(alias) {
            Some(members) => Ok(members.clone()),
            None => Err(ClusterError::Api {
                status: 404,
                endpoint: format!("/_alias/{}", alias),
                reason: "alias not found".to_string(),
            }),
        }
    }

    async fn index_store_bytes(&self, index: &str) -> Result<Option<i64>, ClusterError> {
        if self.fail_stats.contains(index) {
            return Err(ClusterError::Transport(format!(
                "injected stats failure for '{}'",
                index
            )));
        }
        Ok(self.sizes.get(index).map(|size| *size))
    }

    async fn delete_index(&self, index: &str) -> Result<(), ClusterError> {
        if self.fail_delete.contains(index) {
            return Err(ClusterError::Transport(format!(
                "injected delete failure for '{}'",
                index
            )));
        }
        self.sizes.remove(index);
        for mut members in self.aliases.iter_mut() {
            members.retain(|name| name != index);
        }
        self.deleted.lock().unwrap().push(index.to_string());
        Ok(())
    }
}
