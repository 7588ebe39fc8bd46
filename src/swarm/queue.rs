use super::handle::SwarmHandle;
use super::id::SwarmId;
use crate::constants::DEFAULT_PEER_QUEUE_CAPACITY;
use crate::peer::IncomingPeer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// A [`SwarmHandle`] that forwards offered peers into a bounded channel.
///
/// The swarm's peer manager owns the receiving end. When the channel is
/// full, or the receiver is gone because the swarm is shutting down, the peer
/// is dropped and its socket closed.
///
/// # Examples
///
/// ```no_run
/// use btlisten::listener::IncomingPeerListener;
/// use btlisten::swarm::{PeerQueue, SwarmId};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let listener = IncomingPeerListener::bind(6881).await?;
/// let (queue, mut peers) = PeerQueue::new(SwarmId::new([1u8; 20]), 32);
/// listener.register(queue);
/// listener.start()?;
///
/// while let Some(peer) = peers.recv().await {
///     println!("peer {} joined swarm {}", peer.addr(), peer.swarm_id());
/// }
/// # Ok(())
/// # }
/// ```
pub struct PeerQueue {
    swarm_id: SwarmId,
    sender: mpsc::Sender<IncomingPeer>,
    offered: AtomicU64,
    dropped: AtomicU64,
}

impl PeerQueue {
    pub fn new(swarm_id: SwarmId, capacity: usize) -> (Arc<Self>, mpsc::Receiver<IncomingPeer>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let queue = Arc::new(Self {
            swarm_id,
            sender,
            offered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        });
        (queue, receiver)
    }

    pub fn with_default_capacity(swarm_id: SwarmId) -> (Arc<Self>, mpsc::Receiver<IncomingPeer>) {
        Self::new(swarm_id, DEFAULT_PEER_QUEUE_CAPACITY)
    }

    /// Peers successfully enqueued.
    pub fn offered(&self) -> u64 {
        self.offered.load(Ordering::Relaxed)
    }

    /// Peers discarded because the queue was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl SwarmHandle for PeerQueue {
    fn swarm_id(&self) -> SwarmId {
        self.swarm_id
    }

    fn offer(&self, peer: IncomingPeer) {
        match self.sender.try_send(peer) {
            Ok(()) => {
                self.offered.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(peer)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Peer queue for {} is full, dropping {}",
                    self.swarm_id,
                    peer.addr()
                );
            }
            Err(TrySendError::Closed(peer)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Swarm {} is gone, dropping {}",
                    self.swarm_id,
                    peer.addr()
                );
            }
        }
    }
}
