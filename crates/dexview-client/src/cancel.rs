//! Per-key supersession of in-flight requests.
//!
//! Each key carries a generation counter on a `watch` channel. Starting a
//! request bumps the generation, which wakes and cancels whatever was still
//! running under the same key. A result is delivered only while its
//! generation is current, so a completed-but-superseded response is dropped
//! even if it raced past the wake-up.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Registry of cancellation keys.
#[derive(Debug, Default)]
pub struct CancellationRegistry {
    keys: Mutex<HashMap<String, watch::Sender<u64>>>,
}

impl CancellationRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request under `key`, superseding any request already running.
    pub fn begin(&self, key: &str) -> RequestTicket {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = keys
            .entry(key.to_string())
            .or_insert_with(|| watch::channel(0).0);
        sender.send_modify(|generation| *generation += 1);
        let generation = *sender.borrow();
        debug!(key, generation, "request started");
        RequestTicket {
            key: key.to_string(),
            generation,
            receiver: sender.subscribe(),
        }
    }

    /// Cancel whatever is running under `key` without starting anything new.
    pub fn cancel(&self, key: &str) {
        let keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(sender) = keys.get(key) {
            sender.send_modify(|generation| *generation += 1);
        }
    }

    /// Current generation for `key` (zero when never used).
    #[must_use]
    pub fn generation(&self, key: &str) -> u64 {
        let keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        keys.get(key).map_or(0, |sender| *sender.borrow())
    }
}

/// Handle tying one request to its key's generation.
#[derive(Debug)]
pub struct RequestTicket {
    key: String,
    generation: u64,
    receiver: watch::Receiver<u64>,
}

impl RequestTicket {
    /// Generation assigned to this request.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no newer request has started under the same key.
    #[must_use]
    pub fn is_current(&self) -> bool {
        *self.receiver.borrow() == self.generation
    }

    /// Drive `request` until it completes or is superseded.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Canceled`] when a newer request under the same
    /// key started first, otherwise whatever `request` produced.
    pub async fn run<T, F>(self, request: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let generation = self.generation;
        let mut watcher = self.receiver.clone();
        tokio::select! {
            outcome = request => {
                if self.is_current() {
                    outcome
                } else {
                    debug!(key = %self.key, generation, "discarding superseded response");
                    Err(ClientError::Canceled)
                }
            }
            _ = watcher.wait_for(|current| *current != generation) => {
                debug!(key = %self.key, generation, "request superseded");
                Err(ClientError::Canceled)
            }
        }
    }
}
