//! Notification hook adapters.

use crate::ports::ConnectionNotifier;
use shared_bus::{ConnectionEvent, InMemoryEventBus};
use std::sync::Arc;
use tracing::debug;

/// Publishes events onto the shared event bus without waiting.
///
/// The broadcast send happens inline, so events leave in commit order and
/// a subscriber never sees an accept before the request it resolves.
#[derive(Clone)]
pub struct BusNotifier {
    bus: Arc<InMemoryEventBus>,
}

impl BusNotifier {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }
}

impl ConnectionNotifier for BusNotifier {
    fn notify(&self, event: ConnectionEvent) {
        let name = event.name();
        let receivers = self.bus.send(event);
        debug!(event = name, receivers, "Notification published");
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ConnectionNotifier for NoopNotifier {
    fn notify(&self, event: ConnectionEvent) {
        debug!(event = event.name(), "Notification discarded");
    }
}
