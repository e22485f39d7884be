//! Port store capability and its backends.
//!
//! The pipeline only ever talks to [`PortStore::bulk_upsert`]; the HTTP API
//! additionally uses [`PortStore::get`]. Which backend sits behind the trait
//! is wired at process start.

use async_trait::async_trait;

use crate::domain::{Port, Ports};
use crate::error::Result;

pub mod http;
pub mod memory;

/// Capability consumed by the ingestion pipeline and the HTTP API.
#[async_trait]
pub trait PortStore: Send + Sync {
    /// Look up a single port by id.
    ///
    /// Returns [`crate::Error::PortNotFound`] when the id is unknown.
    async fn get(&self, id: &str) -> Result<Port>;

    /// Insert-or-replace every port in the batch, keyed by id.
    ///
    /// Idempotent per port id, and safe to call concurrently with distinct
    /// batches.
    async fn bulk_upsert(&self, ports: Ports) -> Result<()>;
}
