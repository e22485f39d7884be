//! The ingestion pipeline: streaming decode, batching and concurrent
//! delivery to a [`PortStore`].
//!
//! ```text
//! (file) --> PortStream --> BatchBuffer --+--> delivery task --> store
//!                 |                       +--> delivery task --> store
//!              driver                            ...
//! ```
//!
//! One driver loop decodes and batches strictly sequentially; every full
//! batch is handed to its own delivery task, which runs concurrently with
//! the driver's continued reading and with other deliveries. The driver
//! stops reading at the first decode failure, the first reported delivery
//! failure, or cancellation, and in every case waits for all in-flight
//! deliveries to finish before reporting one terminal [`PipelineResult`].

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::batch::BatchBuffer;
use crate::decode::PortStream;
use crate::domain::Ports;
use crate::error::Error;
use crate::store::PortStore;

/// Batch size used when none is configured.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Terminal outcome of one ingestion run.
#[derive(Debug)]
pub enum PipelineResult {
    /// Every record reached the store.
    Completed,
    /// The first decode or delivery failure observed. Reads stopped at that
    /// point but already-dispatched deliveries were drained.
    Failed(Error),
    /// Cancellation stopped the run before end of input. A failure captured
    /// before or during the drain is carried alongside, so the caller can
    /// decide which of the two matters more.
    Cancelled { error: Option<Error> },
}

impl PipelineResult {
    pub fn is_completed(&self) -> bool {
        matches!(self, PipelineResult::Completed)
    }
}

/// Drives the decode -> batch -> deliver pipeline against a store.
pub struct Ingestor<S> {
    store: Arc<S>,
    batch_size: usize,
}

impl<S: PortStore + 'static> Ingestor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the number of ports per delivered batch.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Stream the catalog at `path` into the store.
    ///
    /// Cancelling `shutdown` stops further reads at the next loop iteration;
    /// work already handed to a delivery task always runs to completion.
    pub async fn run(&self, path: impl AsRef<Path>, shutdown: CancellationToken) -> PipelineResult {
        let path = path.as_ref();
        info!(filepath = %path.display(), batch_size = self.batch_size, "processing ports file");

        let mut stream = match PortStream::open(path) {
            Ok(stream) => stream,
            Err(e) => return PipelineResult::Failed(e),
        };

        let mut buffer = BatchBuffer::new(self.batch_size);
        let mut deliveries: JoinSet<()> = JoinSet::new();
        // Failure reports travel over an unbounded channel: a delivery task
        // must never block on reporting, even after the driver stopped
        // listening.
        let (err_tx, mut err_rx) = mpsc::unbounded_channel();

        let mut first_error: Option<Error> = None;
        let mut cancelled = false;
        let mut end_of_stream = false;

        while !cancelled && first_error.is_none() && !end_of_stream {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    warn!("cancellation observed, draining in-flight deliveries");
                    cancelled = true;
                }

                Some(e) = err_rx.recv() => {
                    first_error = Some(e);
                }

                next = stream.next() => match next {
                    None => end_of_stream = true,
                    Some(Err(e)) => first_error = Some(e),
                    Some(Ok(port)) => {
                        if let Some(batch) = buffer.push(port) {
                            self.dispatch(&mut deliveries, &err_tx, batch);
                        }
                    }
                },
            }
        }

        // Dropping the stream stops the decoder reading any further.
        drop(stream);

        // The final partial batch goes out only after a clean end of input.
        if end_of_stream {
            if let Some(batch) = buffer.finish() {
                self.dispatch(&mut deliveries, &err_tx, batch);
            }
        }

        // Started work is never aborted mid-flight: wait out every delivery
        // regardless of why the loop stopped.
        while deliveries.join_next().await.is_some() {}

        // A failure reported while draining still beats "completed".
        while let Ok(e) = err_rx.try_recv() {
            first_error.get_or_insert(e);
        }

        match (cancelled, first_error) {
            (true, error) => PipelineResult::Cancelled { error },
            (false, Some(e)) => PipelineResult::Failed(e),
            (false, None) => PipelineResult::Completed,
        }
    }

    fn dispatch(
        &self,
        deliveries: &mut JoinSet<()>,
        err_tx: &mpsc::UnboundedSender<Error>,
        batch: Ports,
    ) {
        debug!(count = batch.len(), "dispatching batch");

        let store = Arc::clone(&self.store);
        let err_tx = err_tx.clone();

        deliveries.spawn(async move {
            if let Err(e) = store.bulk_upsert(batch).await {
                let _ = err_tx.send(e);
            }
        });
    }
}
