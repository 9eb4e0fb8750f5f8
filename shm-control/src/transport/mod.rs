pub mod event;
pub mod options;
pub mod sctp_state;
pub mod state;
pub mod stats;


use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::transport::event::{ObserverEvent, ShmTransportEvent, ShmTransportObserver};
use crate::transport::options::{ShmConnectParameters, ShmTransportOptions};
use crate::transport::sctp_state::SctpState;
use crate::transport::state::ShmTransportState;
use crate::worker::channel::Channel;
use crate::worker::message::{Notification, RequestMethod};
use crate::worker::registry::HandleRegistry;
use shared::error::{Error, Result};
use shared::EventListeners;

/// Control object mirroring one worker-side shared-memory transport.
///
/// The worker owns the data plane (the RTP/RTX/data-channel traffic relayed
/// through the shared-memory segment); this object owns the handle, the
/// lifecycle, and the event and statistics surfaces. Cloning yields another
/// handle to the same transport.
#[derive(Clone)]
pub struct ShmTransport {
    inner: Arc<ShmTransportInner>,
}

impl std::fmt::Debug for ShmTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShmTransport")
            .field("id", &self.inner.id)
            .finish_non_exhaustive()
    }
}

pub(crate) struct ShmTransportInner {
    id: String,
    options: ShmTransportOptions,
    channel: Channel,
    registry: Arc<HandleRegistry>,
    state: Mutex<ShmTransportState>,
    sctp_state: Mutex<Option<SctpState>>,
    events: EventListeners<ShmTransportEvent>,
    observer: ShmTransportObserver,
}

/// Payload of the worker's `sctpstatechange` notification.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SctpStateChangeData {
    sctp_state: SctpState,
}

impl ShmTransport {
    /// Creates the local mirror. The caller (the router) is responsible for
    /// registering the returned transport in the handle registry.
    pub(crate) fn new(
        id: String,
        options: ShmTransportOptions,
        channel: Channel,
        registry: Arc<HandleRegistry>,
    ) -> Self {
        ShmTransport {
            inner: Arc::new(ShmTransportInner {
                id,
                options,
                channel,
                registry,
                state: Mutex::new(ShmTransportState::Open),
                sctp_state: Mutex::new(None),
                events: EventListeners::new(),
                observer: ShmTransportObserver::new(),
            }),
        }
    }

    pub(crate) fn inner(&self) -> &Arc<ShmTransportInner> {
        &self.inner
    }

    /// Stable transport id, assigned at creation and immutable.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn state(&self) -> ShmTransportState {
        *self.inner.state.lock().unwrap()
    }

    pub fn closed(&self) -> bool {
        self.state() == ShmTransportState::Closed
    }

    /// Data-channel layer state, once the worker has reported one.
    pub fn sctp_state(&self) -> Option<SctpState> {
        *self.inner.sctp_state.lock().unwrap()
    }

    /// Opaque application metadata supplied at construction.
    pub fn app_data(&self) -> &Value {
        &self.inner.options.app_data
    }

    /// Shared-memory segment name hint supplied at construction.
    pub fn shm_name(&self) -> &str {
        &self.inner.options.shm_name
    }

    /// Subscribes to the transport's own events (`sctpstatechange`).
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ShmTransportEvent> {
        self.inner.events.subscribe()
    }

    /// Observer channel for structural lifecycle events.
    pub fn observer(&self) -> &ShmTransportObserver {
        &self.inner.observer
    }

    /// Provides the remote shared-memory segment name to the worker.
    ///
    /// Valid only while `open`; succeeding moves the transport to
    /// `connected`. On failure the state stays `open` and the error surfaces
    /// to the caller, which may retry. A second `connect`, or one racing a
    /// close, fails with `ErrInvalidState`.
    pub async fn connect(&self, parameters: ShmConnectParameters) -> Result<()> {
        log::debug!("connect() [transportId:{}, shm:{}]", self.id(), parameters.shm);

        {
            let state = self.inner.state.lock().unwrap();
            if *state != ShmTransportState::Open {
                return Err(Error::ErrInvalidState(state.to_string()));
            }
        }

        let data = serde_json::to_value(&parameters)?;
        self.inner
            .channel
            .request(RequestMethod::TransportConnect, self.id(), data)
            .await?;

        let mut state = self.inner.state.lock().unwrap();
        if *state != ShmTransportState::Open {
            // A close won the race against the round trip; the terminal state
            // stands.
            return Err(Error::ErrInvalidState(state.to_string()));
        }
        *state = ShmTransportState::Connected;

        Ok(())
    }

    /// Closes the transport.
    ///
    /// Idempotent: once `closed`, further calls are no-ops. The worker close
    /// command is best-effort; a failure to notify the worker is logged,
    /// never raised, because the local object still reaches `closed`. Emits
    /// `close` on the observer exactly once.
    pub fn close(&self) {
        log::debug!("close() [transportId:{}]", self.id());
        self.inner.close(true);
    }

    /// Bulk-teardown variant invoked by the owning router: identical to
    /// [`close`](ShmTransport::close) except that no worker close command is
    /// issued, since the worker is tearing the whole router down as part of
    /// the same operation.
    pub(crate) fn router_closed(&self) {
        log::debug!("router_closed() [transportId:{}]", self.id());
        self.inner.close(false);
    }
}

impl ShmTransportInner {
    /// Terminal transition shared by `close` and `router_closed`. The first
    /// caller to leave a non-terminal state wins; later callers observe the
    /// guard and perform no further side effects.
    fn close(&self, notify_worker: bool) {
        {
            let mut state = self.state.lock().unwrap();
            match *state {
                ShmTransportState::Closing | ShmTransportState::Closed => return,
                _ => *state = ShmTransportState::Closing,
            }
        }

        if notify_worker {
            self.channel
                .request_detached(RequestMethod::TransportClose, &self.id, Value::Null);
        }

        {
            let mut state = self.state.lock().unwrap();
            *state = ShmTransportState::Closed;
        }

        // Unregister last, after all state transitions, so an in-flight
        // notification for this id resolves to a consistent, already-closed
        // handle rather than a half-torn-down one.
        self.registry.unregister(&self.id);

        self.observer.emit(ObserverEvent::Close);
    }

    fn closed(&self) -> bool {
        *self.state.lock().unwrap() == ShmTransportState::Closed
    }

    /// Handles one worker notification addressed to this transport. Called by
    /// the demultiplexer; never suspends, and a malformed payload is logged
    /// and dropped without affecting later envelopes.
    pub(crate) fn handle_notification(&self, notification: Notification) {
        if self.closed() {
            log::debug!(
                "notification on closed transport, dropped [transportId:{}, event:{}]",
                self.id,
                notification.event
            );
            return;
        }

        match notification.event.as_str() {
            "sctpstatechange" => {
                let data: SctpStateChangeData = match serde_json::from_value(notification.data) {
                    Ok(data) => data,
                    Err(err) => {
                        log::error!(
                            "malformed sctpstatechange notification, dropped [transportId:{}]: {err}",
                            self.id
                        );
                        return;
                    }
                };

                {
                    let mut sctp_state = self.sctp_state.lock().unwrap();
                    *sctp_state = Some(data.sctp_state);
                }

                self.events
                    .emit(ShmTransportEvent::SctpStateChange(data.sctp_state));
                self.observer
                    .emit(ObserverEvent::SctpStateChange(data.sctp_state));
            }
            event => {
                log::error!(
                    "ignoring unknown notification event \"{event}\" [transportId:{}]",
                    self.id
                );
            }
        }
    }
}
