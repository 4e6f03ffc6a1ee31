//! Fan-out of controller events to subscribers.
//!
//! Each subscriber owns a bounded queue drained by its own task, so publishing
//! never blocks and never runs subscriber code inside a critical section.

use std::sync::Arc;

use runwarden_model::Event;
use runwarden_observe::Subscribe;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{error, trace};

struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Cheap-to-clone event publisher.
#[derive(Clone, Default)]
pub struct Bus {
    lanes: Arc<Vec<Lane>>,
}

impl Bus {
    /// Start one delivery task per subscriber.
    ///
    /// Must be called from within a tokio runtime when `subscribers` is non-empty.
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let lanes = subscribers
            .into_iter()
            .map(|sub| {
                let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
                let name = sub.name();
                tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        sub.on_event(&event).await;
                    }
                    trace!(subscriber = name, "subscriber lane closed");
                });
                Lane { name, tx }
            })
            .collect();
        Self {
            lanes: Arc::new(lanes),
        }
    }

    /// Bus without subscribers; publishing is a no-op.
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn publish(&self, event: Event) {
        if self.lanes.is_empty() {
            return;
        }
        let event = Arc::new(event);
        for lane in self.lanes.iter() {
            match lane.tx.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(TrySendError::Full(ev)) => error!(
                    subscriber = lane.name,
                    kind = ?ev.kind,
                    "event dropped for a subscriber (queue full)"
                ),
                Err(TrySendError::Closed(ev)) => error!(
                    subscriber = lane.name,
                    kind = ?ev.kind,
                    "event dropped for a subscriber (worker closed)"
                ),
            }
        }
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.publish(event);
        }
    }

    pub fn subscribers(&self) -> usize {
        self.lanes.len()
    }
}
