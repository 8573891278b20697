use std::sync::Arc;
use tokio::sync::broadcast;

/// Outcome of a connection attempt, published by the link worker.
#[derive(Debug, Clone)]
pub enum LinkEvent {
    /// The port opened and all six pins were claimed. The finished link
    /// is waiting in the handoff slot.
    Connected { port: String },
    /// No matching device was found, the port could not be opened, or a
    /// pin claim failed.
    ConnectFailed { reason: String },
}

/// Broadcast topic with bounded capacity.
/// Events hop from the link worker to the UI thread, so they travel as `Arc`s.
#[derive(Debug, Clone)]
pub struct LinkBus {
    tx: broadcast::Sender<Arc<LinkEvent>>,
}

impl LinkBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: LinkEvent) {
        let _ = self.tx.send(Arc::new(event));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<LinkEvent>> {
        self.tx.subscribe()
    }
}
