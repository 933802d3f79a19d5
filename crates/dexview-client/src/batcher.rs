//! Time-windowed coalescing of single-id requests.
//!
//! # Design
//! - One worker task owns the queue; callers talk to it over an unbounded
//!   channel and wait on a oneshot for their own result.
//! - A batch closes when it reaches `max_batch` or when `delay` has elapsed
//!   since its first request, whichever comes first.
//! - Requests arriving while a batch is in flight stay queued and form the
//!   next batch.
//! - Results are positional. A short result list rejects the unmatched tail
//!   with [`ClientError::NotFound`]; a failed bulk call rejects every caller
//!   in the batch with the same error.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::timer::Timer;

/// Resolves a list of ids to positional results in one logical call.
#[async_trait]
pub trait BulkFetch<T>: Send + Sync + 'static {
    /// Fetch `ids`, returning one result per id in input order.
    async fn fetch_many(&self, ids: Vec<u32>) -> ClientResult<Vec<T>>;
}

/// Dispatch thresholds for a [`RequestBatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Queue length that triggers an immediate dispatch.
    pub max_batch: usize,
    /// Window measured from the first queued request.
    pub delay: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_batch: 20,
            delay: Duration::from_millis(100),
        }
    }
}

struct PendingRequest<T> {
    id: u32,
    reply: oneshot::Sender<ClientResult<T>>,
}

/// Handle for enqueuing requests on a batch worker.
pub struct RequestBatcher<T> {
    sender: mpsc::UnboundedSender<PendingRequest<T>>,
    dispatches: Arc<AtomicU64>,
}

impl<T> Clone for RequestBatcher<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            dispatches: Arc::clone(&self.dispatches),
        }
    }
}

impl<T> std::fmt::Debug for RequestBatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBatcher")
            .field("dispatches", &self.dispatches.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> RequestBatcher<T> {
    /// Start a batch worker on the current tokio runtime.
    ///
    /// The worker exits once every handle has been dropped and the queue
    /// drains.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn<F>(fetcher: F, settings: BatchSettings, timer: Arc<dyn Timer>) -> Self
    where
        F: BulkFetch<T>,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let dispatches = Arc::new(AtomicU64::new(0));
        let settings = BatchSettings {
            max_batch: settings.max_batch.max(1),
            ..settings
        };
        tokio::spawn(run_worker(
            receiver,
            fetcher,
            settings,
            timer,
            Arc::clone(&dispatches),
        ));
        Self { sender, dispatches }
    }

    /// Enqueue `id` and wait for its share of the batch result.
    ///
    /// # Errors
    ///
    /// Returns the batch failure, [`ClientError::NotFound`] when the batch
    /// produced no result for this position, or
    /// [`ClientError::BatcherClosed`] if the worker is gone.
    pub async fn request(&self, id: u32) -> ClientResult<T> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(PendingRequest { id, reply })
            .map_err(|_| ClientError::BatcherClosed)?;
        response.await.map_err(|_| ClientError::BatcherClosed)?
    }

    /// Number of bulk calls issued so far.
    #[must_use]
    pub fn dispatch_count(&self) -> u64 {
        self.dispatches.load(Ordering::Relaxed)
    }
}

async fn run_worker<T, F>(
    mut receiver: mpsc::UnboundedReceiver<PendingRequest<T>>,
    fetcher: F,
    settings: BatchSettings,
    timer: Arc<dyn Timer>,
    dispatches: Arc<AtomicU64>,
) where
    T: Send + 'static,
    F: BulkFetch<T>,
{
    while let Some(first) = receiver.recv().await {
        let mut batch = Vec::with_capacity(settings.max_batch);
        batch.push(first);
        let mut window = timer.sleep(settings.delay);
        while batch.len() < settings.max_batch {
            tokio::select! {
                biased;
                () = &mut window => break,
                next = receiver.recv() => match next {
                    Some(request) => batch.push(request),
                    None => break,
                },
            }
        }
        dispatches.fetch_add(1, Ordering::Relaxed);
        dispatch(&fetcher, batch).await;
    }
    debug!("request batcher drained");
}

async fn dispatch<T, F>(fetcher: &F, batch: Vec<PendingRequest<T>>)
where
    F: BulkFetch<T>,
{
    let ids: Vec<u32> = batch.iter().map(|request| request.id).collect();
    debug!(size = ids.len(), "dispatching batch");
    match fetcher.fetch_many(ids).await {
        Ok(results) => {
            let mut results = results.into_iter();
            for request in batch {
                let outcome = results
                    .next()
                    .ok_or(ClientError::NotFound { id: request.id });
                // Caller may have gone away; its result is simply discarded.
                let _ = request.reply.send(outcome);
            }
        }
        Err(err) => {
            warn!(error = %err, size = batch.len(), "batch request failed");
            for request in batch {
                let _ = request.reply.send(Err(err.clone()));
            }
        }
    }
}

/// Fetch `ids` in chunks of `chunk_size`.
///
/// Requests within a chunk run concurrently; chunks run one after another.
/// Output order matches `ids`.
///
/// # Errors
///
/// Returns the first failure, abandoning the remaining chunks.
pub async fn fetch_in_chunks<T, F, Fut>(
    ids: &[u32],
    chunk_size: usize,
    fetch_one: F,
) -> ClientResult<Vec<T>>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let mut results = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(chunk_size.max(1)) {
        let fetched = try_join_all(chunk.iter().map(|id| fetch_one(*id))).await?;
        results.extend(fetched);
    }
    Ok(results)
}
