use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`ShmTransport`](crate::transport::ShmTransport).
///
/// ```text
/// Open → Connected
///  any → Closing → Closed
/// ```
///
/// `Open` is the initial state; `connect` moves it to `Connected`. Any
/// non-terminal state reaches `Closed` through `Closing` on a local close or
/// on the owning router's bulk teardown. No transition leaves `Closed`.
///
/// The state is produced only by local transitions; it never arrives over the
/// wire.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShmTransportState {
    /// Created and registered, not yet connected to a shared-memory segment.
    #[default]
    Open,
    /// The remote segment name was accepted by the worker.
    Connected,
    /// A terminal transition is in progress.
    Closing,
    /// Terminal. The handle is unregistered and all commands are rejected.
    Closed,
}

const TRANSPORT_STATE_OPEN_STR: &str = "open";
const TRANSPORT_STATE_CONNECTED_STR: &str = "connected";
const TRANSPORT_STATE_CLOSING_STR: &str = "closing";
const TRANSPORT_STATE_CLOSED_STR: &str = "closed";

impl fmt::Display for ShmTransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            ShmTransportState::Open => TRANSPORT_STATE_OPEN_STR,
            ShmTransportState::Connected => TRANSPORT_STATE_CONNECTED_STR,
            ShmTransportState::Closing => TRANSPORT_STATE_CLOSING_STR,
            ShmTransportState::Closed => TRANSPORT_STATE_CLOSED_STR,
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_transport_state_string() {
        let tests = vec![
            (ShmTransportState::Open, "open"),
            (ShmTransportState::Connected, "connected"),
            (ShmTransportState::Closing, "closing"),
            (ShmTransportState::Closed, "closed"),
        ];

        for (state, expected_string) in tests {
            assert_eq!(state.to_string(), expected_string)
        }
    }

    #[test]
    fn test_transport_state_default_is_open() {
        assert_eq!(ShmTransportState::default(), ShmTransportState::Open);
    }
}
