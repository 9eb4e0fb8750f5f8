use std::sync::Arc;

use tokio::sync::mpsc;

use crate::worker::channel::Channel;
use crate::worker::message::{Notification, WorkerMessage};
use crate::worker::registry::HandleRegistry;

/// Consumes the unordered, un-acknowledged stream of worker messages and
/// routes each one: responses to the [`Channel`] pending map, notifications
/// through the [`HandleRegistry`] to the owning transport.
///
/// Notification dispatch is synchronous and completes before the next message
/// is taken from the stream, so notifications for the same target id are
/// handled strictly in arrival order. No ordering is guaranteed across
/// different target ids beyond what the stream itself provides.
pub struct Demultiplexer {
    stream: mpsc::UnboundedReceiver<WorkerMessage>,
    channel: Channel,
    registry: Arc<HandleRegistry>,
}

impl Demultiplexer {
    pub fn new(
        stream: mpsc::UnboundedReceiver<WorkerMessage>,
        channel: Channel,
        registry: Arc<HandleRegistry>,
    ) -> Self {
        Demultiplexer {
            stream,
            channel,
            registry,
        }
    }

    /// Runs until the worker side of the link closes.
    pub async fn run(mut self) {
        while let Some(message) = self.stream.recv().await {
            match message {
                WorkerMessage::Response(response) => self.channel.handle_response(response),
                WorkerMessage::Notification(notification) => self.dispatch(notification),
            }
        }
        log::debug!("worker message stream ended");
    }

    /// Convenience for embedders running on tokio.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    fn dispatch(&self, notification: Notification) {
        match self.registry.lookup(&notification.target_id) {
            Some(transport) => transport.handle_notification(notification),
            None => {
                // Expected after a local close: the worker may still have
                // notifications in flight for an id we already tore down.
                log::debug!(
                    "no handler for notification, dropped [targetId:{}, event:{}]",
                    notification.target_id,
                    notification.event
                );
            }
        }
    }
}
