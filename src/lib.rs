//! btlisten - incoming BitTorrent peer acceptor
//!
//! Listens for inbound peer connections, reads the BEP-3 handshake far enough
//! to learn which torrent each connection is for, and hands the connection to
//! the matching running swarm.
//!
//! # Modules
//!
//! - [`listener`] - Port binding, the accept loop, dispatch and shutdown
//! - [`swarm`] - Swarm identifiers, the swarm handle trait and registry
//! - [`peer`] - Handshake decoding and the classified incoming peer
//! - [`constants`] - Protocol values and defaults
//!
//! # Example
//!
//! ```no_run
//! use btlisten::constants::DEFAULT_PORT;
//! use btlisten::{IncomingPeerListener, PeerQueue, SwarmId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let listener = IncomingPeerListener::bind(DEFAULT_PORT).await?;
//!
//! let info_dict = b"d6:lengthi1024e4:name8:test.bin12:piece lengthi16384e6:pieces0:e";
//! let (queue, mut peers) = PeerQueue::with_default_capacity(SwarmId::from_info_bytes(info_dict));
//! listener.register(queue);
//! listener.start()?;
//!
//! while let Some(peer) = peers.recv().await {
//!     println!("incoming peer {} for {}", peer.addr(), peer.swarm_id());
//! }
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod listener;
pub mod peer;
pub mod swarm;

pub use listener::{IncomingPeerListener, ListenerConfig, ListenerError, PendingPeer};
pub use peer::{Handshake, HandshakeError, IncomingPeer, PeerId};
pub use swarm::{PeerQueue, SwarmHandle, SwarmId, SwarmRegistry};
