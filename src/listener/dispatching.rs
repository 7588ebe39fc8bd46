use crate::peer::IncomingPeer;
use crate::swarm::SwarmHandle;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// An accepted connection still waiting for its handshake.
///
/// The socket itself lives in the handshake task; the set only keeps what is
/// needed to stop and join that task.
pub(crate) struct DispatchingPeer {
    addr: SocketAddr,
    accepted_at: Instant,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl DispatchingPeer {
    pub(crate) fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub(crate) fn accepted_at(&self) -> Instant {
        self.accepted_at
    }

    /// Tells the handshake task to give up. Safe to call more than once.
    pub(crate) fn interrupt(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    pub(crate) async fn join(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

struct DispatchState {
    peers: HashMap<u64, DispatchingPeer>,
    closed: bool,
}

/// Connections that have been accepted but not yet classified into a swarm.
///
/// Entries are keyed by the accept sequence number. Once [`close`] has run,
/// nothing new is admitted and nothing still in flight can be handed off.
///
/// [`close`]: DispatchingPeers::close
pub(crate) struct DispatchingPeers {
    state: Mutex<DispatchState>,
}

impl DispatchingPeers {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(DispatchState {
                peers: HashMap::new(),
                closed: false,
            }),
        }
    }

    /// Spawns the handshake task through `spawn` and records it under `key`.
    ///
    /// The entry is inserted in the same critical section as the spawn, so the
    /// task can never try to remove itself before it is present. Returns
    /// `false` without calling `spawn` once the set is closed.
    pub(crate) fn admit<F>(
        &self,
        key: u64,
        addr: SocketAddr,
        accepted_at: Instant,
        stop: oneshot::Sender<()>,
        spawn: F,
    ) -> bool
    where
        F: FnOnce() -> JoinHandle<()>,
    {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        let task = spawn();
        state.peers.insert(
            key,
            DispatchingPeer {
                addr,
                accepted_at,
                stop: Some(stop),
                task: Some(task),
            },
        );
        true
    }

    /// Drops the entry for a peer that failed to classify.
    pub(crate) fn remove(&self, key: u64) -> bool {
        self.state.lock().peers.remove(&key).is_some()
    }

    /// Removes the peer and offers it to `swarm` as one step.
    ///
    /// No other caller can observe the peer both here and in the swarm. If the
    /// entry is already gone (the listener was interrupted) the peer is handed
    /// back instead of being offered.
    pub(crate) fn hand_off(
        &self,
        key: u64,
        swarm: Arc<dyn SwarmHandle>,
        mut peer: IncomingPeer,
    ) -> Result<(), IncomingPeer> {
        let mut state = self.state.lock();
        if state.peers.remove(&key).is_none() {
            return Err(peer);
        }
        peer.bind_swarm(Arc::clone(&swarm));
        swarm.offer(peer);
        Ok(())
    }

    /// Closes the set and returns every entry still in it.
    pub(crate) fn close(&self) -> Vec<DispatchingPeer> {
        let mut state = self.state.lock();
        state.closed = true;
        state.peers.drain().map(|(_, peer)| peer).collect()
    }

    /// Signals one in-flight peer to stop without removing it.
    pub(crate) fn interrupt(&self, key: u64) -> bool {
        match self.state.lock().peers.get_mut(&key) {
            Some(peer) => {
                peer.interrupt();
                true
            }
            None => false,
        }
    }

    /// Remote addresses and accept times of the peers still handshaking.
    pub(crate) fn snapshot(&self) -> Vec<(u64, SocketAddr, Instant)> {
        self.state
            .lock()
            .peers
            .iter()
            .map(|(key, peer)| (*key, peer.addr(), peer.accepted_at()))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().peers.len()
    }
}
