use thiserror::Error;

use crate::swarm::SwarmId;

/// Reasons an incoming connection failed to classify into a swarm.
///
/// These never leave the listener; they are logged and the socket is closed.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// Network I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer hung up before sending a full handshake.
    #[error("connection closed")]
    ConnectionClosed,

    /// The length byte or protocol name did not match.
    #[error("invalid protocol header")]
    InvalidProtocol,

    /// The handshake did not arrive within the configured timeout.
    #[error("timeout")]
    Timeout,

    /// The listener is shutting down.
    #[error("interrupted")]
    Interrupted,

    /// No swarm is registered for this info hash.
    #[error("unknown swarm {0}")]
    UnknownSwarm(SwarmId),
}

impl HandshakeError {
    pub(crate) fn from_read(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            HandshakeError::ConnectionClosed
        } else {
            HandshakeError::Io(err)
        }
    }
}
