//! In-process fan-out of media activity events.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::trace;

use sp_core::events::MediaActivityEvent;
use sp_core::ports::MediaActivityEventPort;

const DEFAULT_CAPACITY: usize = 256;

/// Event port backed by a tokio broadcast channel.
///
/// Slow subscribers lag and lose the oldest events; the engine never waits on them.
pub struct BroadcastMediaEventBus {
    tx: broadcast::Sender<MediaActivityEvent>,
}

impl BroadcastMediaEventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MediaActivityEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastMediaEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl MediaActivityEventPort for BroadcastMediaEventBus {
    async fn emit(&self, event: MediaActivityEvent) {
        let name = event.name();
        // No subscriber is fine.
        match self.tx.send(event) {
            Ok(receivers) => trace!(event = name, receivers, "Media activity event published"),
            Err(broadcast::error::SendError(_)) => trace!(event = name, "No media activity subscribers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_core::activity::ActivationState;
    use sp_core::ids::SpaceId;

    fn deactivated() -> MediaActivityEvent {
        MediaActivityEvent::Deactivated {
            space_id: SpaceId::from("living"),
            activity_key: None,
            state: ActivationState::Deactivated,
            warnings: Vec::new(),
            timestamp_ms: 7,
        }
    }

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let bus = BroadcastMediaEventBus::new(4);
        let mut rx = bus.subscribe();

        bus.emit(deactivated()).await;

        assert_eq!(rx.recv().await.unwrap(), deactivated());
    }

    #[tokio::test]
    async fn emitting_without_subscribers_is_fine() {
        let bus = BroadcastMediaEventBus::default();
        bus.emit(deactivated()).await;
    }
}
