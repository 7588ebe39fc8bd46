use super::id::SwarmId;
use crate::peer::IncomingPeer;

/// A running swarm as seen by the listener.
///
/// `offer` is called while the listener holds its dispatching-set lock, so
/// it must hand the peer off without blocking (an enqueue, not I/O). A swarm
/// that is tearing down may simply drop the peer, which closes its socket.
pub trait SwarmHandle: Send + Sync {
    /// Must stay the same for the lifetime of the handle.
    fn swarm_id(&self) -> SwarmId;

    fn offer(&self, peer: IncomingPeer);
}
