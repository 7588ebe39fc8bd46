//! Incoming peer listener.
//!
//! Owns the listening TCP socket, accepts inbound peers, reads enough of each
//! handshake to learn which swarm it is for, and hands the connection to
//! that swarm's [`SwarmHandle`](crate::swarm::SwarmHandle).
//!
//! ```text
//! listen -> accept -> dispatching set -> handshake -> registry lookup
//!                                                      |-> offer to swarm
//!                                                      '-> close
//! ```
//!
//! Two independent locks are involved: the swarm registry and the set of
//! peers still handshaking. They are never held at the same time.

mod acceptor;
mod config;
mod dispatching;
mod error;

pub use acceptor::{IncomingPeerListener, PendingPeer};
pub use config::ListenerConfig;
pub use error::ListenerError;
