use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Methods understood by the worker's control channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestMethod {
    #[serde(rename = "router.createShmTransport")]
    RouterCreateShmTransport,
    #[serde(rename = "router.close")]
    RouterClose,
    #[serde(rename = "transport.connect")]
    TransportConnect,
    #[serde(rename = "transport.getStats")]
    TransportGetStats,
    #[serde(rename = "transport.close")]
    TransportClose,
}

const ROUTER_CREATE_SHM_TRANSPORT_STR: &str = "router.createShmTransport";
const ROUTER_CLOSE_STR: &str = "router.close";
const TRANSPORT_CONNECT_STR: &str = "transport.connect";
const TRANSPORT_GET_STATS_STR: &str = "transport.getStats";
const TRANSPORT_CLOSE_STR: &str = "transport.close";

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            RequestMethod::RouterCreateShmTransport => ROUTER_CREATE_SHM_TRANSPORT_STR,
            RequestMethod::RouterClose => ROUTER_CLOSE_STR,
            RequestMethod::TransportConnect => TRANSPORT_CONNECT_STR,
            RequestMethod::TransportGetStats => TRANSPORT_GET_STATS_STR,
            RequestMethod::TransportClose => TRANSPORT_CLOSE_STR,
        };
        write!(f, "{s}")
    }
}

/// A single correlated request sent to the worker.
///
/// `handler_id` is the stable handle of the worker-side object the request
/// addresses; `id` correlates the request with exactly one [`ChannelResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRequest {
    pub id: u32,
    pub method: RequestMethod,
    pub handler_id: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

/// The worker's reply to exactly one [`ChannelRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResponse {
    pub id: u32,
    pub accepted: bool,
    /// Error kind reported by the worker when `accepted` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl ChannelResponse {
    /// Human-readable failure description, composed from `error` and `reason`.
    pub fn failure(&self) -> String {
        match (&self.error, &self.reason) {
            (Some(error), Some(reason)) => format!("{error}: {reason}"),
            (Some(error), None) => error.clone(),
            (None, Some(reason)) => reason.clone(),
            (None, None) => "unknown worker error".to_owned(),
        }
    }
}

/// An out-of-band event pushed by the worker, addressed by target id.
///
/// Transient: consumed exactly once by the demultiplexer, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub target_id: String,
    pub event: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

/// Everything the worker pushes over its side of the link. Responses and
/// notifications arrive interleaved on the same stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkerMessage {
    Response(ChannelResponse),
    Notification(Notification),
}
