#![allow(dead_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the control bridge.
///
/// Command-path errors (`ErrInvalidState`, `ErrWorkerCommandFailed`,
/// `ErrChannelClosed`, `ErrTransportClosed`, `ErrMalformedResponse`) are
/// returned to whoever awaited the operation. Notification-path failures never
/// reach a caller; they are logged and scoped to the offending envelope.
#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The operation is not valid in the current lifecycle state, e.g. a
    /// second `connect` or a `connect` after close. Carries the state the
    /// object was in when the operation was rejected.
    #[error("invalid state: {0}")]
    ErrInvalidState(String),
    /// A handle id is already registered. Treated as a programming or
    /// configuration error, fatal to the creation attempt.
    #[error("duplicate handle: {0}")]
    ErrDuplicateHandle(String),
    /// The worker rejected a command or failed to execute it.
    #[error("worker command failed: {0}")]
    ErrWorkerCommandFailed(String),
    /// The worker link went away before the correlated response arrived.
    #[error("worker channel closed")]
    ErrChannelClosed,
    /// The transport is already closed.
    #[error("transport closed")]
    ErrTransportClosed,
    /// A worker notification payload could not be parsed. Logged and dropped,
    /// scoped to one envelope.
    #[error("malformed notification: {0}")]
    ErrMalformedNotification(String),
    /// A worker response payload did not have the expected shape.
    #[error("malformed response: {0}")]
    ErrMalformedResponse(String),
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_display() {
        let tests = vec![
            (
                Error::ErrInvalidState("connected".to_owned()),
                "invalid state: connected",
            ),
            (
                Error::ErrDuplicateHandle("t1".to_owned()),
                "duplicate handle: t1",
            ),
            (Error::ErrChannelClosed, "worker channel closed"),
            (Error::ErrTransportClosed, "transport closed"),
        ];

        for (err, expected) in tests {
            assert_eq!(err.to_string(), expected);
        }
    }
}
