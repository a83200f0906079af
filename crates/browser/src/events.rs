//! Event Bus - Simple event system for navigator lifecycle events
//!
//! Design: Type-safe events with a broadcast channel underneath.
//! No dynamic dispatch overhead - use enums, not trait objects.

use crate::cdp::CdpNodeId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Everything observable about a live navigation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PageEvent {
    Connected { endpoint: String },
    Disconnected,
    TabOpened { target_id: String },
    TabSwitched { target_id: String },
    Navigated { url: String },
    /// An error element was matched and its scroll requested
    ErrorRevealed { node: CdpNodeId, scroll_target: f64 },
    /// The deferred focus landed
    FocusApplied { node: CdpNodeId },
    /// The deferred focus could not be applied; the reveal itself
    /// already succeeded by then
    FocusSkipped { node: CdpNodeId, reason: String },
}

/// Simple event bus using a tokio broadcast channel
///
/// Clones publish into the same channel, so one bus can be handed to
/// background tasks.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PageEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    /// Publish an event
    pub fn publish(&self, event: PageEvent) {
        let _ = self.tx.send(event); // Ignore error if no subscribers
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(PageEvent::Navigated {
            url: "https://example.com/checkout".to_string(),
        });

        match rx.recv().await {
            Ok(PageEvent::Navigated { url }) => {
                assert_eq!(url, "https://example.com/checkout");
            }
            other => panic!("Expected Navigated event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_clones_share_the_channel() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let clone = bus.clone();
        clone.publish(PageEvent::FocusApplied { node: 12 });

        assert!(matches!(
            rx.recv().await,
            Ok(PageEvent::FocusApplied { node: 12 })
        ));
    }
}
