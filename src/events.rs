use tokio::sync::broadcast;

/// Advisory notifications about decree progress on one node.
///
/// Observability only: nothing in the protocol reads these back, and a node
/// with no subscribers behaves identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecreeEvent {
    /// An accept quorum was reached; `value` is the decree of this cluster.
    DecreeCommitted { proposal: u64, value: String },
    /// A proposal round ended without a decree.
    RoundAbandoned {
        phase: RoundPhase,
        responses: usize,
        needed: usize,
    },
    /// This node processed a learn notification.
    ValueLearned { value: String },
}

/// Which phase a round was in when it was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Prepare,
    Accept,
}

#[derive(Clone)]
pub struct DecreeEventBus {
    sender: broadcast::Sender<DecreeEvent>,
}

impl DecreeEventBus {
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DecreeEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: DecreeEvent) {
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }
}

impl Default for DecreeEventBus {
    fn default() -> Self {
        Self::new(128)
    }
}
