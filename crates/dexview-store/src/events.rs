//! Change notifications between storage contexts.
//!
//! Every backend handle owns an origin id. Writes publish a
//! [`StorageEvent`] on a shared `tokio::broadcast` channel, and each
//! subscription skips events published by its own origin, mirroring how a
//! browser only fires storage events in *other* tabs.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dexview_models::Theme;
use tokio::sync::broadcast;
use tracing::warn;

const DEFAULT_CAPACITY: usize = 64;

/// A key changed in some storage context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Key that was written or removed.
    pub key: String,
    /// Origin id of the writing context.
    pub origin: u64,
}

/// Higher-level change published by [`crate::PersonalizationStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonalizationEvent {
    /// The favorites set changed; carries the ids in insertion order.
    FavoritesChanged {
        /// Favorite ids after the change.
        ids: Vec<u32>,
    },
    /// A note changed (`None` when the change came from another context).
    NotesChanged {
        /// Id whose note changed, when known.
        id: Option<u32>,
    },
    /// The theme preference changed.
    ThemeChanged(Theme),
}

/// Broadcast channel shared by every context of one backend.
#[derive(Debug, Clone)]
pub(crate) struct StorageBus {
    sender: broadcast::Sender<StorageEvent>,
    next_origin: Arc<AtomicU64>,
}

impl StorageBus {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self {
            sender,
            next_origin: Arc::new(AtomicU64::new(1)),
        }
    }

    pub(crate) fn allocate_origin(&self) -> u64 {
        self.next_origin.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn publish(&self, key: &str, origin: u64) {
        // No subscribers is not an error.
        let _ = self.sender.send(StorageEvent {
            key: key.to_string(),
            origin,
        });
    }

    pub(crate) fn subscribe(&self, origin: u64) -> StorageSubscription {
        StorageSubscription {
            receiver: self.sender.subscribe(),
            origin,
        }
    }
}

/// Receives storage events from every context except its own.
#[derive(Debug)]
pub struct StorageSubscription {
    receiver: broadcast::Receiver<StorageEvent>,
    origin: u64,
}

impl StorageSubscription {
    /// Next foreign event, or `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.origin == self.origin => {}
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "storage subscriber lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn own_events_are_skipped() {
        let bus = StorageBus::new();
        let mine = bus.allocate_origin();
        let theirs = bus.allocate_origin();
        let mut subscription = bus.subscribe(mine);

        bus.publish("app-theme", mine);
        bus.publish("pokemon-notes", theirs);

        let event = subscription.recv().await.expect("event");
        assert_eq!(
            event,
            StorageEvent {
                key: "pokemon-notes".into(),
                origin: theirs
            }
        );
    }

    #[tokio::test]
    async fn closed_bus_ends_subscription() {
        let bus = StorageBus::new();
        let mut subscription = bus.subscribe(1);
        drop(bus);
        assert_eq!(subscription.recv().await, None);
    }
}
