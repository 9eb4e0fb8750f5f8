use serde::{Deserialize, Serialize};

use crate::transport::ShmTransport;
use shared::error::{Error, Result};

/// One traffic category's counters as the worker reports them: byte totals
/// and instantaneous bitrates per direction. Bitrates are derived by the
/// remote engine; this side never recomputes or smooths them.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCounter {
    pub bytes_received: u64,
    pub recv_bitrate: u32,
    pub bytes_sent: u64,
    pub send_bitrate: u32,
}

/// Per-category counter table keyed by traffic class.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCounterTable {
    #[serde(default)]
    pub rtp: RawCounter,
    #[serde(default)]
    pub rtx: RawCounter,
    #[serde(default)]
    pub probation: RawCounter,
}

/// A raw statistics entry exactly as reported by the worker for one
/// transport: transport-wide totals plus the per-category table, the
/// shared-memory segment descriptor and optional bandwidth estimates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransportStat {
    pub timestamp: u64,
    pub bytes_received: u64,
    pub recv_bitrate: u32,
    pub bytes_sent: u64,
    pub send_bitrate: u32,
    #[serde(default)]
    pub categories: RawCounterTable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_outgoing_bitrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_incoming_bitrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_incoming_bitrate: Option<u32>,
    pub shm: String,
    /// Shm writer status, passed through untouched.
    pub writer: u32,
}

/// Discriminator carried in every [`ShmTransportStat`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShmTransportStatType {
    #[serde(rename = "shm-transport")]
    ShmTransport,
}

/// A point-in-time statistics snapshot in the stable public shape.
///
/// Immutable once produced; `get_stats` yields a fresh sample on every call.
/// The optional bandwidth fields are omitted, not zeroed, when the worker
/// does not report them, so "unmeasured" stays distinguishable from
/// "measured as zero".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShmTransportStat {
    #[serde(rename = "type")]
    pub typ: ShmTransportStatType,
    pub transport_id: String,
    pub timestamp: u64,
    pub bytes_received: u64,
    pub recv_bitrate: u32,
    pub bytes_sent: u64,
    pub send_bitrate: u32,
    pub rtp_bytes_received: u64,
    pub rtp_recv_bitrate: u32,
    pub rtp_bytes_sent: u64,
    pub rtp_send_bitrate: u32,
    pub rtx_bytes_received: u64,
    pub rtx_recv_bitrate: u32,
    pub rtx_bytes_sent: u64,
    pub rtx_send_bitrate: u32,
    pub probation_bytes_received: u64,
    pub probation_recv_bitrate: u32,
    pub probation_bytes_sent: u64,
    pub probation_send_bitrate: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_outgoing_bitrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_incoming_bitrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_incoming_bitrate: Option<u32>,
    pub shm: String,
    pub writer: u32,
}

/// Reshapes one raw worker entry into the public record, tagging it with the
/// transport's own id and the shm discriminator. Pure: no recomputation, no
/// unit conversion, no caching.
fn normalize_one(transport_id: &str, raw: RawTransportStat) -> ShmTransportStat {
    ShmTransportStat {
        typ: ShmTransportStatType::ShmTransport,
        transport_id: transport_id.to_owned(),
        timestamp: raw.timestamp,
        bytes_received: raw.bytes_received,
        recv_bitrate: raw.recv_bitrate,
        bytes_sent: raw.bytes_sent,
        send_bitrate: raw.send_bitrate,
        rtp_bytes_received: raw.categories.rtp.bytes_received,
        rtp_recv_bitrate: raw.categories.rtp.recv_bitrate,
        rtp_bytes_sent: raw.categories.rtp.bytes_sent,
        rtp_send_bitrate: raw.categories.rtp.send_bitrate,
        rtx_bytes_received: raw.categories.rtx.bytes_received,
        rtx_recv_bitrate: raw.categories.rtx.recv_bitrate,
        rtx_bytes_sent: raw.categories.rtx.bytes_sent,
        rtx_send_bitrate: raw.categories.rtx.send_bitrate,
        probation_bytes_received: raw.categories.probation.bytes_received,
        probation_recv_bitrate: raw.categories.probation.recv_bitrate,
        probation_bytes_sent: raw.categories.probation.bytes_sent,
        probation_send_bitrate: raw.categories.probation.send_bitrate,
        available_outgoing_bitrate: raw.available_outgoing_bitrate,
        available_incoming_bitrate: raw.available_incoming_bitrate,
        max_incoming_bitrate: raw.max_incoming_bitrate,
        shm: raw.shm,
        writer: raw.writer,
    }
}

/// Parses the worker's `transport.getStats` payload and normalizes every
/// entry. The payload must be an array of raw entries.
pub(crate) fn normalize_stats(
    transport_id: &str,
    data: serde_json::Value,
) -> Result<Vec<ShmTransportStat>> {
    let raw: Vec<RawTransportStat> =
        serde_json::from_value(data).map_err(|e| Error::ErrMalformedResponse(e.to_string()))?;
    Ok(raw
        .into_iter()
        .map(|entry| normalize_one(transport_id, entry))
        .collect())
}

impl ShmTransport {
    /// Requests a fresh statistics snapshot from the worker.
    ///
    /// Fails with `ErrTransportClosed` on a closed transport without issuing
    /// any channel round trip; a worker-side failure surfaces as
    /// `ErrWorkerCommandFailed`.
    pub async fn get_stats(&self) -> Result<Vec<ShmTransportStat>> {
        log::debug!("get_stats() [transportId:{}]", self.id());

        if self.closed() {
            return Err(Error::ErrTransportClosed);
        }

        let data = self
            .inner()
            .channel
            .request(
                crate::worker::message::RequestMethod::TransportGetStats,
                self.id(),
                serde_json::Value::Null,
            )
            .await?;

        normalize_stats(self.id(), data)
    }
}
