use std::time::Duration;
use thiserror::Error;

/// Failure surfaced by a transport implementation.
///
/// Transports own framing, handshake, and reconnection; everything they can
/// report up to the dissemination layer collapses into these two cases.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    #[error("remote call failed: {0}")]
    CallFailed(String),
}

/// Errors produced by the dissemination layer.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("peer {0} is not connected")]
    NotConnected(String),

    #[error("{queue} queue full for peer {peer}")]
    QueueFull {
        peer: String,
        queue: &'static str,
    },

    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("unknown peer {0}")]
    PeerUnknown(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unexpected response: expected {0}")]
    UnexpectedResponse(&'static str),

    #[error("config error: {0}")]
    Config(String),
}
