use std::fmt;

use serde::{Deserialize, Serialize};

/// State of the data-channel (SCTP) layer, reported by the worker via
/// `sctpstatechange` notifications, independently of the RTP transport state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SctpState {
    New,
    Connecting,
    Connected,
    Failed,
    Closed,
}

const SCTP_STATE_NEW_STR: &str = "new";
const SCTP_STATE_CONNECTING_STR: &str = "connecting";
const SCTP_STATE_CONNECTED_STR: &str = "connected";
const SCTP_STATE_FAILED_STR: &str = "failed";
const SCTP_STATE_CLOSED_STR: &str = "closed";

impl fmt::Display for SctpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            SctpState::New => SCTP_STATE_NEW_STR,
            SctpState::Connecting => SCTP_STATE_CONNECTING_STR,
            SctpState::Connected => SCTP_STATE_CONNECTED_STR,
            SctpState::Failed => SCTP_STATE_FAILED_STR,
            SctpState::Closed => SCTP_STATE_CLOSED_STR,
        };
        write!(f, "{s}")
    }
}
