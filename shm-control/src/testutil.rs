//! In-process fake worker for scenario tests: records every channel request
//! and answers over the same message stream the demultiplexer consumes, so
//! tests exercise the real correlation and dispatch paths.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::worker::channel::Channel;
use crate::worker::demux::Demultiplexer;
use crate::worker::message::{
    ChannelRequest, ChannelResponse, Notification, RequestMethod, WorkerMessage,
};
use crate::worker::registry::HandleRegistry;

pub(crate) struct FakeWorker {
    pub(crate) channel: Channel,
    pub(crate) registry: Arc<HandleRegistry>,
    requests: Arc<Mutex<Vec<ChannelRequest>>>,
    rejected: Arc<Mutex<Vec<RequestMethod>>>,
    worker_tx: mpsc::UnboundedSender<WorkerMessage>,
}

impl FakeWorker {
    pub(crate) fn new() -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<ChannelRequest>();
        let (worker_tx, worker_rx) = mpsc::unbounded_channel::<WorkerMessage>();

        let channel = Channel::new(request_tx);
        let registry = Arc::new(HandleRegistry::new());
        Demultiplexer::new(worker_rx, channel.clone(), registry.clone()).spawn();

        let requests: Arc<Mutex<Vec<ChannelRequest>>> = Arc::new(Mutex::new(Vec::new()));
        let rejected: Arc<Mutex<Vec<RequestMethod>>> = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let reject_list = rejected.clone();
        let responder_tx = worker_tx.clone();
        tokio::spawn(async move {
            while let Some(request) = request_rx.recv().await {
                recorded.lock().unwrap().push(request.clone());

                let accepted = !reject_list.lock().unwrap().contains(&request.method);
                let response = if accepted {
                    ChannelResponse {
                        id: request.id,
                        accepted: true,
                        error: None,
                        reason: None,
                        data: canned_data(&request),
                    }
                } else {
                    ChannelResponse {
                        id: request.id,
                        accepted: false,
                        error: Some("Error".to_owned()),
                        reason: Some("rejected by test worker".to_owned()),
                        data: Value::Null,
                    }
                };
                let _ = responder_tx.send(WorkerMessage::Response(response));
            }
        });

        FakeWorker {
            channel,
            registry,
            requests,
            rejected,
            worker_tx,
        }
    }

    /// Makes the worker reject every subsequent request with this method.
    pub(crate) fn reject(&self, method: RequestMethod) {
        self.rejected.lock().unwrap().push(method);
    }

    pub(crate) fn accept_all(&self) {
        self.rejected.lock().unwrap().clear();
    }

    /// Methods of every request seen so far, in arrival order.
    pub(crate) fn methods(&self) -> Vec<RequestMethod> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.method)
            .collect()
    }

    pub(crate) fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Pushes a worker-originated notification into the message stream.
    pub(crate) fn notify(&self, target_id: &str, event: &str, data: Value) {
        let _ = self
            .worker_tx
            .send(WorkerMessage::Notification(Notification {
                target_id: target_id.to_owned(),
                event: event.to_owned(),
                data,
            }));
    }
}

fn canned_data(request: &ChannelRequest) -> Value {
    match request.method {
        RequestMethod::TransportGetStats => json!([{
            "timestamp": 1_700_000_000_123u64,
            "bytesReceived": 9000,
            "recvBitrate": 96000,
            "bytesSent": 4500,
            "sendBitrate": 48000,
            "categories": {
                "rtp": {
                    "bytesReceived": 8000,
                    "recvBitrate": 80000,
                    "bytesSent": 4000,
                    "sendBitrate": 40000
                },
                "rtx": {
                    "bytesReceived": 900,
                    "recvBitrate": 14000,
                    "bytesSent": 450,
                    "sendBitrate": 7000
                },
                "probation": {
                    "bytesReceived": 100,
                    "recvBitrate": 2000,
                    "bytesSent": 50,
                    "sendBitrate": 1000
                }
            },
            "shm": "/media-shm",
            "writer": 1
        }]),
        _ => Value::Null,
    }
}

/// Lets the fake worker's responder and the demultiplexer drain their queues.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
