//! # portstream
//!
//! `portstream` ingests a large catalog of ports stored as a single JSON
//! object (keyed by port id) and delivers it to a store in bounded-size
//! batches, without ever holding the whole file in memory.
//!
//! ## Features
//!
//! - Streams the top-level JSON object entry by entry; the container key
//!   always overrides the id embedded in the payload.
//! - Accumulates decoded ports into fixed-size batches and upserts each
//!   batch from its own concurrently running delivery task.
//! - Stops reading at the first decode failure, delivery failure or
//!   cancellation, but always drains in-flight deliveries before reporting
//!   a single terminal result.
//! - Pluggable store backends: an in-memory map and an HTTP client for a
//!   remote portstream server, behind one `PortStore` trait.
//! - An axum HTTP API (`GET /ports/{id}`, `POST /ports/bulk-upsert`) over
//!   the same trait.
//!
//! ## Usage
//!
//! To ingest a file into an in-memory store:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use portstream::ingest::Ingestor;
//! use portstream::store::memory::MemoryStore;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemoryStore::new());
//!     let ingestor = Ingestor::new(store).with_batch_size(50);
//!
//!     let result = ingestor.run("ports.json", CancellationToken::new()).await;
//!     println!("{result:?}");
//! }
//! ```
//!
//! ## Modules
//!
//! - `decode`: streaming decoder for the catalog file.
//! - `batch`: fixed-size batch accumulation.
//! - `ingest`: the pipeline coordinator.
//! - `store`: the `PortStore` capability and its backends.
//! - `server`: the HTTP API.

pub mod batch;
pub mod config;
pub mod decode;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod server;
pub mod store;

pub use error::{Error, Result};
