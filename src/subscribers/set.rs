//! # SubscriberSet: non-blocking fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`SnapshotMessage`] to multiple subscribers
//! **without awaiting** their processing, so the scheduler never waits on an
//! observer.
//!
//! ## What it guarantees
//! - `emit(msg)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and logged (isolation).
//!
//! ## What it does **not** guarantee
//! - No global ordering across different subscribers.
//! - No retries on per-subscriber queue overflow (messages are dropped for that
//!   subscriber).
//!
//! ## Diagram
//! ```text
//!    emit(SnapshotMessage)
//!        │                        (Arc-clone per subscriber)
//!        ├────────────────► [queue S1] ─► worker S1 ─► on_snapshot()
//!        ├────────────────► [queue S2] ─► worker S2 ─► on_snapshot()
//!        └────────────────► [queue SN] ─► worker SN ─► on_snapshot()
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::error::panic_message;
use crate::snapshot::SnapshotMessage;

use super::Subscribe;

struct SubscriberChannel {
    id: u64,
    name: &'static str,
    sender: mpsc::Sender<Arc<SnapshotMessage>>,
    worker: JoinHandle<()>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    default_capacity: usize,
    next_id: u64,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    ///
    /// `default_capacity` applies to subscribers whose
    /// [`queue_capacity`](Subscribe::queue_capacity) is `0`.
    ///
    /// # Panics
    /// Spawning workers requires a Tokio runtime when `subs` is non-empty.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, default_capacity: usize) -> Self {
        let mut set = Self {
            channels: Vec::with_capacity(subs.len()),
            default_capacity: default_capacity.max(1),
            next_id: 0,
        };
        for sub in subs {
            set.add(sub);
        }
        set
    }

    /// Attaches one subscriber and spawns its worker. Returns its id.
    ///
    /// # Panics
    /// Must be called inside a Tokio runtime.
    pub fn add(&mut self, sub: Arc<dyn Subscribe>) -> u64 {
        let cap = match sub.queue_capacity() {
            0 => self.default_capacity,
            n => n,
        };
        let name = sub.name();
        let (tx, mut rx) = mpsc::channel::<Arc<SnapshotMessage>>(cap);

        let worker = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let fut = sub.on_snapshot(msg.as_ref());
                if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                    tracing::error!(
                        subscriber = sub.name(),
                        info = %panic_message(panic_err.as_ref()),
                        "subscriber panicked"
                    );
                }
            }
        });

        let id = self.next_id;
        self.next_id += 1;
        self.channels.push(SubscriberChannel {
            id,
            name,
            sender: tx,
            worker,
        });
        id
    }

    /// Detaches a subscriber. Its worker drains what is already queued, then exits.
    ///
    /// Returns `false` if the id is unknown.
    pub fn remove(&mut self, id: u64) -> bool {
        let Some(pos) = self.channels.iter().position(|c| c.id == id) else {
            return false;
        };
        let channel = self.channels.remove(pos);
        tracing::debug!(subscriber = channel.name, "subscriber detached");
        true
    }

    /// Fan-out one message to all subscribers (non-blocking).
    ///
    /// If a subscriber's queue is **full** or **closed**, the message is dropped for
    /// it and a warning is logged with the subscriber's name.
    pub fn emit(&self, msg: SnapshotMessage) {
        let msg = Arc::new(msg);
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&msg)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        subscriber = channel.name,
                        kind = msg.as_label(),
                        "snapshot dropped: queue full"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::warn!(
                        subscriber = channel.name,
                        kind = msg.as_label(),
                        "snapshot dropped: worker closed"
                    );
                }
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        for channel in self.channels {
            drop(channel.sender);
            let _ = channel.worker.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(Arc<AtomicUsize>);

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_snapshot(&self, _msg: &SnapshotMessage) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Panicker;

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_snapshot(&self, _msg: &SnapshotMessage) {
            panic!("subscriber blew up");
        }

        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    #[tokio::test]
    async fn delivers_to_every_subscriber_and_survives_panics() {
        let seen = Arc::new(AtomicUsize::new(0));
        let set = SubscriberSet::new(
            vec![
                Arc::new(Panicker) as Arc<dyn Subscribe>,
                Arc::new(Counter(seen.clone())),
            ],
            8,
        );
        assert_eq!(set.len(), 2);

        set.emit(SnapshotMessage::StepLimitExceeded { limit: 1 });
        set.emit(SnapshotMessage::StepLimitExceeded { limit: 2 });
        set.shutdown().await;

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_set_is_empty() {
        let set = SubscriberSet::new(Vec::new(), 8);
        assert!(set.is_empty());
        set.emit(SnapshotMessage::StepLimitExceeded { limit: 1 });
        set.shutdown().await;
    }

    #[tokio::test]
    async fn removed_subscriber_stops_receiving() {
        let kept = Arc::new(AtomicUsize::new(0));
        let gone = Arc::new(AtomicUsize::new(0));
        let mut set =
            SubscriberSet::new(vec![Arc::new(Counter(kept.clone())) as Arc<dyn Subscribe>], 8);
        let id = set.add(Arc::new(Counter(gone.clone())));
        assert_eq!(set.len(), 2);

        set.emit(SnapshotMessage::StepLimitExceeded { limit: 1 });
        assert!(set.remove(id));
        assert!(!set.remove(id));
        set.emit(SnapshotMessage::StepLimitExceeded { limit: 2 });
        set.shutdown().await;

        assert_eq!(kept.load(Ordering::SeqCst), 2);
        // the detached worker may or may not have drained its queue yet
        assert!(gone.load(Ordering::SeqCst) <= 1);
    }
}
