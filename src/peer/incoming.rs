use super::handshake::Handshake;
use super::peer_id::PeerId;
use crate::swarm::{SwarmHandle, SwarmId};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpStream;

/// An inbound connection whose handshake named a registered swarm.
///
/// The 68 handshake bytes have already been consumed from the stream; the
/// next byte read is the remote's first wire message. Replying with our own
/// handshake is up to the swarm that receives the peer.
pub struct IncomingPeer {
    stream: TcpStream,
    addr: SocketAddr,
    handshake: Handshake,
    sequence: u64,
    accepted_at: Instant,
    swarm: Option<Arc<dyn SwarmHandle>>,
}

impl IncomingPeer {
    pub(crate) fn new(
        stream: TcpStream,
        addr: SocketAddr,
        handshake: Handshake,
        sequence: u64,
        accepted_at: Instant,
    ) -> Self {
        Self {
            stream,
            addr,
            handshake,
            sequence,
            accepted_at,
            swarm: None,
        }
    }

    pub(crate) fn bind_swarm(&mut self, swarm: Arc<dyn SwarmHandle>) {
        self.swarm = Some(swarm);
    }

    /// The remote socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The full handshake the remote sent, reserved bytes untouched.
    pub fn handshake(&self) -> &Handshake {
        &self.handshake
    }

    pub fn swarm_id(&self) -> SwarmId {
        self.handshake.swarm_id()
    }

    pub fn remote_peer_id(&self) -> PeerId {
        self.handshake.remote_peer_id()
    }

    /// Position of this connection in the listener's accept order, starting at 1.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn accepted_at(&self) -> Instant {
        self.accepted_at
    }

    /// The swarm this peer was dispatched to.
    pub fn swarm(&self) -> Option<&Arc<dyn SwarmHandle>> {
        self.swarm.as_ref()
    }

    pub fn stream(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    pub fn into_stream(self) -> TcpStream {
        self.stream
    }

    pub fn into_parts(self) -> (TcpStream, Handshake) {
        (self.stream, self.handshake)
    }
}

impl fmt::Debug for IncomingPeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingPeer")
            .field("addr", &self.addr)
            .field("swarm_id", &self.swarm_id())
            .field("peer_id", &self.remote_peer_id())
            .field("sequence", &self.sequence)
            .finish()
    }
}
