//! Best-effort fan-out from the one authoritative writer to all connected
//! clients. Wraps a tokio broadcast channel behind publish/subscribe so the
//! transport stays swappable without touching game logic.

use crate::protocol::ServerMessage;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct Fanout {
    tx: broadcast::Sender<ServerMessage>,
}

impl Fanout {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Fire-and-forget delivery. No receivers connected is fine; a lagging
    /// receiver drops old messages and catches up via the periodic snapshot.
    pub fn publish(&self, msg: ServerMessage) {
        let _ = self.tx.send(msg);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Fanout {
    fn default() -> Self {
        Self::new(100)
    }
}
