//! Inbound side of the peer handshake (BEP-3).
//!
//! Decoding of the fixed 68-byte handshake prefix, the reader that pulls it
//! off an accepted socket, and the [`IncomingPeer`] that a classified
//! connection becomes.

mod error;
mod handshake;
mod incoming;
mod peer_id;
mod transport;

pub use error::HandshakeError;
pub use handshake::{is_protocol_header, Handshake};
pub use incoming::IncomingPeer;
pub use peer_id::PeerId;
pub use transport::read_handshake;

#[cfg(test)]
mod tests;
