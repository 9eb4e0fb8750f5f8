use shared::EventListeners;
use tokio::sync::mpsc;

use crate::transport::sctp_state::SctpState;

/// Events emitted by the transport object itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShmTransportEvent {
    /// The worker reported a data-channel layer state change.
    SctpStateChange(SctpState),
}

/// Structural lifecycle events emitted on the observer channel.
///
/// `Close` is emitted by the transport exactly once when it reaches its
/// terminal state. The producer/consumer events are announced by the owning
/// layer above this crate when it attaches objects to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    Close,
    NewProducer(String),
    NewConsumer(String),
    NewDataProducer(String),
    NewDataConsumer(String),
    SctpStateChange(SctpState),
}

/// Secondary event surface, separate from the transport's own events, for
/// structural lifecycle notifications.
///
/// Emission never blocks: listeners receive over unbounded channels and
/// detach by dropping their receiver. `emit` is public so the owning layer
/// can announce its producer/consumer events on the same surface.
#[derive(Default)]
pub struct ShmTransportObserver {
    listeners: EventListeners<ObserverEvent>,
}

impl ShmTransportObserver {
    pub(crate) fn new() -> Self {
        ShmTransportObserver::default()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ObserverEvent> {
        self.listeners.subscribe()
    }

    pub fn emit(&self, event: ObserverEvent) {
        self.listeners.emit(event);
    }
}
