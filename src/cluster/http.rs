//! Elasticsearch-compatible REST implementation of [`ClusterClient`].
//!
//! Three endpoints are used, nothing more:
//! - `GET /_alias/{name}` - alias membership
//! - `GET /{index}/_stats/store` - on-disk size, store metric only
//! - `DELETE /{index}` - index removal
//!
//! Stats requests are filtered to the `store` metric to keep the payload
//! minimal; the size is read from
//! `indices.{index}.total.store.size_in_bytes`.

use async_trait::async_trait;
use reqwest::{Certificate, Client, Response};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::ClusterConfig;
use crate::resilience::retry::{retry, RetryConfig};

use super::traits::{ClusterClient, ClusterError};

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
const MAX_IDLE_PER_HOST: usize = 10;
const ERROR_BODY_LIMIT: usize = 256;

pub struct HttpCluster {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpCluster {
    /// Build a client from cluster configuration.
    ///
    /// A custom CA certificate re-enables verification even when
    /// `skip_tls_verify` is set, mirroring the precedence operators
    /// expect: an explicit CA always wins.
    pub fn new(cfg: &ClusterConfig) -> Result<Self, ClusterError> {
        let mut skip_verify = cfg.skip_tls_verify;
        if skip_verify {
            warn!("TLS verification is disabled");
        }

        let mut builder = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST);

        if let Some(ref ca_path) = cfg.ca_cert_path {
            let pem = std::fs::read(ca_path).map_err(|e| {
                ClusterError::Transport(format!("reading CA certificate {}: {}", ca_path, e))
            })?;
            let cert = Certificate::from_pem(&pem).map_err(|e| {
                ClusterError::Transport(format!("parsing CA certificate {}: {}", ca_path, e))
            })?;
            builder = builder.add_root_certificate(cert);
            skip_verify = false;
        }

        if skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| ClusterError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.url.trim_end_matches('/').to_string(),
            username: cfg.username.clone(),
            password: cfg.password.clone(),
        })
    }

    /// Probe cluster reachability, retrying with the startup policy so a
    /// misconfigured endpoint fails fast instead of wedging the daemon.
    pub async fn ping(&self) -> Result<(), ClusterError> {
        retry("cluster_connect", &RetryConfig::startup(), || async {
            self.get_json("/").await.map(|_| ())
        })
        .await?;
        info!(url = %self.base_url, "cluster is reachable");
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> Result<Value, ClusterError> {
        let endpoint = self.endpoint(path);
        let response = self
            .http
            .get(&endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| ClusterError::Transport(e.to_string()))?;

        let response = Self::check_status(endpoint, response).await?;
        response
            .json()
            .await
            .map_err(|e| ClusterError::Transport(format!("parsing response: {}", e)))
    }

    /// Turn a non-success response into an [`ClusterError::Api`] carrying
    /// a bounded slice of the body for the logs.
    async fn check_status(endpoint: String, response: Response) -> Result<Response, ClusterError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut reason = response.text().await.unwrap_or_default();
        if reason.is_empty() {
            reason = status.canonical_reason().unwrap_or("unknown").to_string();
        }
        if reason.len() > ERROR_BODY_LIMIT {
            let mut end = ERROR_BODY_LIMIT;
            while !reason.is_char_boundary(end) {
                end -= 1;
            }
            reason.truncate(end);
        }

        Err(ClusterError::Api {
            status: status.as_u16(),
            endpoint,
            reason,
        })
    }
}

#[async_trait]
impl ClusterClient for HttpCluster {
    async fn resolve_alias(&self, alias: &str) -> Result<Vec<String>, ClusterError> {
        let body = self.get_json(&format!("/_alias/{}", alias)).await?;
        match body.as_object() {
            Some(map) => Ok(map.keys().cloned().collect()),
            None => Err(ClusterError::Transport(format!(
                "unexpected alias response shape for '{}'",
                alias
            ))),
        }
    }

    async fn index_store_bytes(&self, index: &str) -> Result<Option<i64>, ClusterError> {
        let body = self.get_json(&format!("/{}/_stats/store", index)).await?;

        // Same navigation the stats API documents; a missing key at any
        // level is the soft "no size for this index" case.
        let size = body
            .get("indices")
            .and_then(|v| v.get(index))
            .and_then(|v| v.get("total"))
            .and_then(|v| v.get("store"))
            .and_then(|v| v.get("size_in_bytes"))
            .and_then(Value::as_i64);

        Ok(size)
    }

    async fn delete_index(&self, index: &str) -> Result<(), ClusterError> {
        let endpoint = self.endpoint(&format!("/{}", index));
        let response = self
            .http
            .delete(&endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| ClusterError::Transport(e.to_string()))?;

        Self::check_status(endpoint, response).await.map(|_| ())
    }
}
