//! Protocol constants and tuning parameters.
//!
//! Wire values for the BitTorrent handshake plus the defaults used by the
//! incoming peer listener.

use std::time::Duration;

// ============================================================================
// Handshake
// ============================================================================

/// Protocol identifier sent in the handshake
pub const PROTOCOL_STRING: &[u8] = b"BitTorrent protocol";

/// Length prefix of the protocol identifier
pub const PROTOCOL_STRING_LEN: u8 = 19;

/// Length byte plus protocol identifier
pub const PROTOCOL_HEADER_LEN: usize = 1 + PROTOCOL_STRING.len();

/// Size of the reserved extension bytes
pub const RESERVED_LEN: usize = 8;

/// Size of an info hash or peer id
pub const ID_LEN: usize = 20;

/// Total handshake size in bytes
pub const HANDSHAKE_LEN: usize = PROTOCOL_HEADER_LEN + RESERVED_LEN + ID_LEN + ID_LEN;

// ============================================================================
// Ports
// ============================================================================

/// Default BitTorrent listen port
pub const DEFAULT_PORT: u16 = 6881;

/// Highest port probed when the requested one is taken
pub const LAST_PORT: u16 = 65534;

// ============================================================================
// Timeouts
// ============================================================================

/// Time a freshly accepted peer has to send its handshake
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause after a non-fatal accept error
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

// ============================================================================
// Queues
// ============================================================================

/// Default capacity of a [`PeerQueue`](crate::swarm::PeerQueue)
pub const DEFAULT_PEER_QUEUE_CAPACITY: usize = 64;
