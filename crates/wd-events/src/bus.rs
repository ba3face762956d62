use crate::types::EventRecord;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::broadcast;
use ulid::Ulid;

/// In-process broadcast bus. Sequence numbers are assigned at publish time
/// and are monotonic for the lifetime of the bus.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventRecord>,
    next_seq: Arc<AtomicI64>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            next_seq: Arc::new(AtomicI64::new(1)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }

    /// Stamps id and seq, then broadcasts. A send error only means there are
    /// no subscribers; the stamped record is returned either way.
    pub fn publish(&self, mut event: EventRecord) -> EventRecord {
        event.id = format!("evt_{}", Ulid::new());
        event.seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let _ = self.sender.send(event.clone());
        event
    }
}
