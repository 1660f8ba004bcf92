//! Cluster access layer.
//!
//! The pipeline talks to the search cluster exclusively through the
//! [`ClusterClient`] trait so the pruning logic stays testable without a
//! live cluster.
//!
//! - `traits.rs` - the capability seam and its error type
//! - `http.rs`   - Elasticsearch-compatible REST implementation
//! - `memory.rs` - in-memory fake with failure injection, for tests

pub mod http;
pub mod memory;
pub mod traits;

pub use http::HttpCluster;
pub use memory::InMemoryCluster;
pub use traits::{ClusterClient, ClusterError};
