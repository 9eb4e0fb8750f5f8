use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Listening address descriptor for the worker-side transport.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportListenIp {
    pub ip: String,
    /// Address announced to the remote side instead of `ip`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announced_ip: Option<String>,
}

impl TransportListenIp {
    pub fn new(ip: &str) -> Self {
        TransportListenIp {
            ip: ip.to_owned(),
            announced_ip: None,
        }
    }

    pub fn with_announced_ip(mut self, announced_ip: &str) -> Self {
        self.announced_ip = Some(announced_ip.to_owned());
        self
    }
}

/// Configuration accepted at transport construction.
///
/// `app_data` is opaque application metadata: it is stored on the control
/// object and passed through unvalidated, never sent to the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShmTransportOptions {
    pub listen_ip: TransportListenIp,
    /// Shared-memory segment name hint for the worker-side writer.
    pub shm_name: String,
    /// Log name handed to the shm writer library.
    pub log_name: String,
    /// Log verbosity for the shm writer library, passed through as-is.
    pub log_level: u8,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub app_data: Value,
}

impl ShmTransportOptions {
    pub fn new(listen_ip: TransportListenIp, shm_name: &str) -> Self {
        ShmTransportOptions {
            listen_ip,
            shm_name: shm_name.to_owned(),
            log_name: String::new(),
            log_level: 0,
            app_data: Value::Null,
        }
    }

    pub fn with_log_name(mut self, log_name: &str) -> Self {
        self.log_name = log_name.to_owned();
        self
    }

    pub fn with_log_level(mut self, log_level: u8) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn with_app_data(mut self, app_data: Value) -> Self {
        self.app_data = app_data;
        self
    }
}

/// The shared-memory segment name supplied by the remote peer.
///
/// Write-once: accepted only while the transport is `open`; a second
/// `connect` is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShmConnectParameters {
    pub shm: String,
}
