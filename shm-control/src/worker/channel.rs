use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::worker::message::{ChannelRequest, ChannelResponse, RequestMethod};
use shared::error::{Error, Result};

/// A request the channel is still waiting on.
enum PendingRequest {
    /// A caller is awaiting the correlated response.
    Awaited(oneshot::Sender<Result<Value>>),
    /// Fire-and-forget: a failure is logged, never surfaced.
    Detached {
        method: RequestMethod,
        handler_id: String,
    },
}

struct ChannelInner {
    sink: mpsc::UnboundedSender<ChannelRequest>,
    /// Pending response waiters: request id -> waiter. A response resolves
    /// exactly one entry; responses with no entry are logged and dropped.
    pending: Mutex<HashMap<u32, PendingRequest>>,
    next_id: AtomicU32,
}

/// Correlated request/response channel to the worker.
///
/// Every request carries a fresh id; the matching [`ChannelResponse`] resolves
/// it exactly once. The channel only sends; inbound responses are fed back by
/// the demultiplexer via [`Channel::handle_response`]. Requests from multiple
/// transports interleave freely, each independently correlated.
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

impl Channel {
    /// Creates a channel writing requests into `sink`. The embedder owns the
    /// worker pipe and forwards what it reads from `sink` to the worker.
    pub fn new(sink: mpsc::UnboundedSender<ChannelRequest>) -> Self {
        Channel {
            inner: Arc::new(ChannelInner {
                sink,
                pending: Mutex::new(HashMap::new()),
                next_id: AtomicU32::new(1),
            }),
        }
    }

    /// Sends a request and awaits its correlated response.
    ///
    /// Resolves with the response payload, or fails with
    /// `ErrWorkerCommandFailed` when the worker rejects the command and
    /// `ErrChannelClosed` when the link goes away before the response arrives.
    pub async fn request(
        &self,
        method: RequestMethod,
        handler_id: &str,
        data: Value,
    ) -> Result<Value> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        log::debug!("request() [method:{method}, id:{id}, handlerId:{handler_id}]");

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.inner.pending.lock().unwrap();
            pending.insert(id, PendingRequest::Awaited(tx));
        }

        let request = ChannelRequest {
            id,
            method,
            handler_id: handler_id.to_owned(),
            data,
        };
        if self.inner.sink.send(request).is_err() {
            self.inner.pending.lock().unwrap().remove(&id);
            return Err(Error::ErrChannelClosed);
        }

        match rx.await {
            Ok(result) => result,
            // The demultiplexer dropped the waiter without resolving it; the
            // link is gone.
            Err(_) => Err(Error::ErrChannelClosed),
        }
    }

    /// Sends a request whose response nobody awaits. Used for best-effort
    /// commands such as the worker close: a failure must not prevent local
    /// teardown, so it is logged when the response (if any) arrives.
    pub fn request_detached(&self, method: RequestMethod, handler_id: &str, data: Value) {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        log::debug!("request_detached() [method:{method}, id:{id}, handlerId:{handler_id}]");

        {
            let mut pending = self.inner.pending.lock().unwrap();
            pending.insert(
                id,
                PendingRequest::Detached {
                    method,
                    handler_id: handler_id.to_owned(),
                },
            );
        }

        let request = ChannelRequest {
            id,
            method,
            handler_id: handler_id.to_owned(),
            data,
        };
        if self.inner.sink.send(request).is_err() {
            self.inner.pending.lock().unwrap().remove(&id);
            log::warn!(
                "request_detached() failed, channel closed [method:{method}, handlerId:{handler_id}]"
            );
        }
    }

    /// Routes a worker response to its pending waiter. Called by the
    /// demultiplexer only.
    pub(crate) fn handle_response(&self, response: ChannelResponse) {
        let waiter = {
            let mut pending = self.inner.pending.lock().unwrap();
            pending.remove(&response.id)
        };

        match waiter {
            Some(PendingRequest::Awaited(tx)) => {
                let result = if response.accepted {
                    Ok(response.data)
                } else {
                    Err(Error::ErrWorkerCommandFailed(response.failure()))
                };
                // The caller may have abandoned the result; that is fine, the
                // command already ran to completion on the worker side.
                let _ = tx.send(result);
            }
            Some(PendingRequest::Detached { method, handler_id }) => {
                if !response.accepted {
                    log::warn!(
                        "detached request failed [method:{method}, handlerId:{handler_id}]: {}",
                        response.failure()
                    );
                }
            }
            None => {
                log::debug!("response with no pending request, dropped [id:{}]", response.id);
            }
        }
    }

    /// Number of requests still waiting on a response.
    pub fn pending_len(&self) -> usize {
        self.inner.pending.lock().unwrap().len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_request_resolves_with_response_payload() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let channel = Channel::new(tx);

        let responder = channel.clone();
        let request = tokio::spawn(async move {
            responder
                .request(RequestMethod::TransportConnect, "t1", json!({ "shm": "seg" }))
                .await
        });

        let sent = rx.recv().await.unwrap();
        assert_eq!(sent.method, RequestMethod::TransportConnect);
        assert_eq!(sent.handler_id, "t1");

        channel.handle_response(ChannelResponse {
            id: sent.id,
            accepted: true,
            error: None,
            reason: None,
            data: json!({ "ok": true }),
        });

        let result = request.await.unwrap().unwrap();
        assert_eq!(result, json!({ "ok": true }));
        assert_eq!(channel.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_rejected_request_surfaces_worker_error() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let channel = Channel::new(tx);

        let responder = channel.clone();
        let request = tokio::spawn(async move {
            responder
                .request(RequestMethod::TransportGetStats, "t1", Value::Null)
                .await
        });

        let sent = rx.recv().await.unwrap();
        channel.handle_response(ChannelResponse {
            id: sent.id,
            accepted: false,
            error: Some("Error".to_owned()),
            reason: Some("no such transport".to_owned()),
            data: Value::Null,
        });

        let err = request.await.unwrap().unwrap_err();
        assert_eq!(
            err,
            Error::ErrWorkerCommandFailed("Error: no such transport".to_owned())
        );
    }

    #[tokio::test]
    async fn test_request_on_closed_link_fails_immediately() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let channel = Channel::new(tx);

        let err = channel
            .request(RequestMethod::TransportConnect, "t1", Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err, Error::ErrChannelClosed);
        assert_eq!(channel.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_uncorrelated_response_is_dropped() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let channel = Channel::new(tx);

        channel.handle_response(ChannelResponse {
            id: 999,
            accepted: true,
            error: None,
            reason: None,
            data: Value::Null,
        });
        assert_eq!(channel.pending_len(), 0);
    }

    #[tokio::test]
    async fn test_detached_request_failure_is_not_surfaced() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let channel = Channel::new(tx);

        channel.request_detached(RequestMethod::TransportClose, "t1", Value::Null);
        let sent = rx.recv().await.unwrap();
        assert_eq!(sent.method, RequestMethod::TransportClose);

        // A failure response only logs; pending entry is consumed.
        channel.handle_response(ChannelResponse {
            id: sent.id,
            accepted: false,
            error: Some("Error".to_owned()),
            reason: None,
            data: Value::Null,
        });
        assert_eq!(channel.pending_len(), 0);
    }
}
