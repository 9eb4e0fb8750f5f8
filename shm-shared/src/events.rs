use std::sync::Mutex;

use tokio::sync::mpsc;

/// Registered-listener set for one event channel.
///
/// Listeners subscribe and receive events over unbounded channels, so emission
/// never blocks the emitting path. The set does not manage listener lifetime:
/// a listener detaches by dropping its receiver, and its sender is pruned on
/// the next emission.
pub struct EventListeners<E> {
    senders: Mutex<Vec<mpsc::UnboundedSender<E>>>,
}

impl<E> EventListeners<E> {
    pub fn new() -> Self {
        EventListeners {
            senders: Mutex::new(Vec::new()),
        }
    }

    /// Registers a new listener and returns its receiving end.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<E> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut senders = self.senders.lock().unwrap();
        senders.push(tx);
        rx
    }

    /// Number of currently registered listeners, including ones that have
    /// detached but have not been pruned yet.
    pub fn len(&self) -> usize {
        self.senders.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Clone> EventListeners<E> {
    /// Delivers `event` to every live listener, pruning detached ones.
    pub fn emit(&self, event: E) {
        let mut senders = self.senders.lock().unwrap();
        senders.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl<E> Default for EventListeners<E> {
    fn default() -> Self {
        EventListeners::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_emit_reaches_every_listener() {
        let listeners: EventListeners<u32> = EventListeners::new();
        let mut a = listeners.subscribe();
        let mut b = listeners.subscribe();

        listeners.emit(7);

        assert_eq!(a.recv().await, Some(7));
        assert_eq!(b.recv().await, Some(7));
    }

    #[tokio::test]
    async fn test_detached_listener_is_pruned() {
        let listeners: EventListeners<u32> = EventListeners::new();
        let mut a = listeners.subscribe();
        let b = listeners.subscribe();
        drop(b);

        listeners.emit(1);
        listeners.emit(2);

        assert_eq!(listeners.len(), 1);
        assert_eq!(a.recv().await, Some(1));
        assert_eq!(a.recv().await, Some(2));
    }

    #[test]
    fn test_emit_without_listeners_is_noop() {
        let listeners: EventListeners<u32> = EventListeners::new();
        listeners.emit(42);
        assert!(listeners.is_empty());
    }
}
