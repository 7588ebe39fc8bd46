use super::config::ListenerConfig;
use super::dispatching::DispatchingPeers;
use super::error::ListenerError;
use crate::constants::LAST_PORT;
use crate::peer::{read_handshake, Handshake, HandshakeError, IncomingPeer};
use crate::swarm::{SwarmHandle, SwarmId, SwarmRegistry};
use parking_lot::Mutex;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// A connection that is still sending its handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPeer {
    /// Accept sequence number, starting at 1.
    pub sequence: u64,
    pub addr: SocketAddr,
    pub accepted_at: Instant,
}

enum RunState {
    Bound(TcpListener),
    Running(JoinHandle<()>),
    Stopped,
}

/// State reachable from the accept loop and every handshake task.
///
/// Handshake tasks hold this rather than the listener itself, so nothing they
/// keep alive refers back to the accept loop.
struct Shared {
    registry: Arc<SwarmRegistry>,
    dispatching: DispatchingPeers,
    received: AtomicU64,
    config: ListenerConfig,
}

/// Accepts inbound peer connections and routes each to the swarm named in
/// its handshake.
///
/// # Lifecycle
///
/// 1. [`bind`](Self::bind) claims the first free port at or above the
///    requested one.
/// 2. Swarms are [`register`](Self::register)ed at any time.
/// 3. [`start`](Self::start) spawns the accept loop. Each connection gets its
///    own handshake task; once the info hash is read the peer is offered to
///    the matching swarm, or closed if there is none.
/// 4. [`interrupt`](Self::interrupt) closes the listening socket, stops every
///    peer still handshaking and waits for all of those tasks to finish.
///
/// # Examples
///
/// ```no_run
/// use btlisten::listener::IncomingPeerListener;
/// use btlisten::swarm::{PeerQueue, SwarmId};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let listener = IncomingPeerListener::bind(6881).await?;
/// println!("listening on port {}", listener.effective_port());
///
/// let swarm_id = SwarmId::from_hex("c12fe1c06bba254a9dc9f519b335aa7c1367a88a").unwrap();
/// let (queue, mut peers) = PeerQueue::new(swarm_id, 32);
/// listener.register(queue.clone());
/// listener.start()?;
///
/// if let Some(peer) = peers.recv().await {
///     println!("{} wants {}", peer.remote_peer_id(), peer.swarm_id());
/// }
///
/// listener.unregister(queue.as_ref());
/// listener.interrupt().await;
/// # Ok(())
/// # }
/// ```
pub struct IncomingPeerListener {
    shared: Arc<Shared>,
    state: Mutex<RunState>,
    shutdown: watch::Sender<bool>,
    local_addr: SocketAddr,
}

impl IncomingPeerListener {
    /// Binds to `port`, or the next free port above it, with default settings.
    pub async fn bind(port: u16) -> Result<Self, ListenerError> {
        Self::bind_with_config(port, ListenerConfig::default()).await
    }

    /// Binds to the first free port in `port..=config.last_port`.
    ///
    /// Port 0 lets the operating system pick.
    pub async fn bind_with_config(
        port: u16,
        config: ListenerConfig,
    ) -> Result<Self, ListenerError> {
        let registry = Arc::new(SwarmRegistry::new());
        Self::bind_with_registry(port, config, registry).await
    }

    /// Like [`bind_with_config`](Self::bind_with_config), but shares an
    /// existing registry with the caller.
    pub async fn bind_with_registry(
        port: u16,
        config: ListenerConfig,
        registry: Arc<SwarmRegistry>,
    ) -> Result<Self, ListenerError> {
        debug!("Binding incoming peer listener");

        let listener = bind_port_range(config.bind_ip, port, config.last_port).await?;
        let local_addr = listener.local_addr()?;

        info!("Listening for incoming peers on {}", local_addr);

        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            shared: Arc::new(Shared {
                registry,
                dispatching: DispatchingPeers::new(),
                received: AtomicU64::new(0),
                config,
            }),
            state: Mutex::new(RunState::Bound(listener)),
            shutdown,
            local_addr,
        })
    }

    /// The port that was actually bound.
    pub fn effective_port(&self) -> u16 {
        self.local_addr.port()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of connections accepted so far.
    pub fn received_connections(&self) -> u64 {
        self.shared.received.load(Ordering::Relaxed)
    }

    /// Number of accepted connections whose handshake is still outstanding.
    pub fn dispatching_peers(&self) -> usize {
        self.shared.dispatching.len()
    }

    pub fn pending_peers(&self) -> Vec<PendingPeer> {
        let mut pending: Vec<_> = self
            .shared
            .dispatching
            .snapshot()
            .into_iter()
            .map(|(sequence, addr, accepted_at)| PendingPeer {
                sequence,
                addr,
                accepted_at,
            })
            .collect();
        pending.sort_by_key(|p| p.sequence);
        pending
    }

    /// Stops the handshake of a single pending peer, closing its connection.
    pub fn interrupt_peer(&self, sequence: u64) -> bool {
        self.shared.dispatching.interrupt(sequence)
    }

    pub fn registry(&self) -> &Arc<SwarmRegistry> {
        &self.shared.registry
    }

    pub fn register(&self, swarm: Arc<dyn SwarmHandle>) {
        self.shared.registry.register(swarm);
    }

    pub fn unregister(&self, swarm: &dyn SwarmHandle) {
        self.shared.registry.unregister(swarm);
    }

    pub fn is_registered(&self, id: &SwarmId) -> bool {
        self.shared.registry.contains(id)
    }

    pub fn registered_swarms(&self) -> usize {
        self.shared.registry.len()
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.state.lock(), RunState::Running(_))
    }

    /// Spawns the accept loop on the current tokio runtime.
    pub fn start(&self) -> Result<(), ListenerError> {
        let mut state = self.state.lock();
        let listener = match std::mem::replace(&mut *state, RunState::Stopped) {
            RunState::Bound(listener) => listener,
            RunState::Running(task) => {
                *state = RunState::Running(task);
                return Err(ListenerError::AlreadyStarted);
            }
            RunState::Stopped => return Err(ListenerError::Shutdown),
        };

        let shared = Arc::clone(&self.shared);
        let shutdown = self.shutdown.subscribe();
        *state = RunState::Running(tokio::spawn(shared.accept_loop(listener, shutdown)));
        Ok(())
    }

    /// Shuts the listener down.
    ///
    /// The listening socket is closed first, so no connection can join the
    /// dispatching set while it is being drained. Every peer still handshaking
    /// is then signalled and joined; when this returns none of their sockets
    /// remain open. Calling it again is a no-op.
    pub async fn interrupt(&self) {
        let accept_task = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, RunState::Stopped) {
                RunState::Running(task) => Some(task),
                RunState::Bound(_) | RunState::Stopped => None,
            }
        };
        self.shutdown.send_replace(true);

        if let Some(task) = accept_task {
            info!("Interrupting incoming peer listener on {}", self.local_addr);
            let _ = task.await;
        }

        let mut peers = self.shared.dispatching.close();
        if peers.is_empty() {
            return;
        }

        debug!("Interrupting {} dispatching peers", peers.len());
        for peer in &mut peers {
            peer.interrupt();
        }
        for peer in peers {
            peer.join().await;
        }
    }
}

impl std::fmt::Debug for IncomingPeerListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncomingPeerListener")
            .field("local_addr", &self.local_addr)
            .field("received_connections", &self.received_connections())
            .field("dispatching_peers", &self.dispatching_peers())
            .finish()
    }
}

impl Shared {
    async fn accept_loop(
        self: Arc<Self>,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            let accepted = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, addr)) => self.admit(stream, addr),
                Err(e) => {
                    warn!("Failed to accept incoming peer: {}", e);
                    if !wait_backoff(&mut shutdown, self.config.accept_error_backoff).await {
                        break;
                    }
                }
            }
        }

        drop(listener);
        info!(
            "Incoming peer listener stopped after {} connections",
            self.received.load(Ordering::Relaxed)
        );
    }

    fn admit(self: &Arc<Self>, stream: TcpStream, addr: SocketAddr) {
        let sequence = self.received.fetch_add(1, Ordering::Relaxed) + 1;
        let accepted_at = Instant::now();
        let (stop_tx, stop_rx) = oneshot::channel();

        let shared = Arc::clone(self);
        let admitted = self
            .dispatching
            .admit(sequence, addr, accepted_at, stop_tx, move || {
                tokio::spawn(shared.run_peer(sequence, stream, addr, accepted_at, stop_rx))
            });

        if admitted {
            debug!("Accepted peer {} (#{})", addr, sequence);
        } else {
            debug!("Dropping peer {}: listener is shutting down", addr);
        }
    }

    async fn run_peer(
        self: Arc<Self>,
        sequence: u64,
        mut stream: TcpStream,
        addr: SocketAddr,
        accepted_at: Instant,
        mut stop: oneshot::Receiver<()>,
    ) {
        let handshake = tokio::select! {
            biased;
            _ = &mut stop => Err(HandshakeError::Interrupted),
            handshake = read_handshake(&mut stream, self.config.handshake_timeout) => handshake,
        };

        let result = match handshake {
            Ok(handshake) => self.dispatch(sequence, stream, addr, handshake, accepted_at),
            Err(e) => {
                drop(stream);
                Err(e)
            }
        };

        match result {
            Ok(id) => debug!("Dispatched peer {} to swarm {}", addr, id),
            Err(e) => {
                self.dispatching.remove(sequence);
                debug!("Closed incoming peer {}: {}", addr, e);
            }
        }
    }

    /// Offers a handshaken peer to the swarm its info hash names.
    ///
    /// On failure the connection has already been closed and the caller only
    /// has to drop the dispatching entry.
    fn dispatch(
        &self,
        sequence: u64,
        stream: TcpStream,
        addr: SocketAddr,
        handshake: Handshake,
        accepted_at: Instant,
    ) -> Result<SwarmId, HandshakeError> {
        let id = handshake.swarm_id();
        let swarm = self
            .registry
            .lookup(&id)
            .ok_or(HandshakeError::UnknownSwarm(id))?;

        let peer = IncomingPeer::new(stream, addr, handshake, sequence, accepted_at);
        self.dispatching
            .hand_off(sequence, swarm, peer)
            .map_err(|_| HandshakeError::Interrupted)?;

        Ok(id)
    }
}

/// Sleeps for `backoff`, returning `false` as soon as shutdown is signalled.
pub(super) async fn wait_backoff(
    shutdown: &mut watch::Receiver<bool>,
    backoff: Duration,
) -> bool {
    tokio::select! {
        biased;
        _ = shutdown.changed() => false,
        _ = sleep(backoff) => true,
    }
}

async fn bind_port_range(
    ip: IpAddr,
    first: u16,
    last: u16,
) -> Result<TcpListener, ListenerError> {
    if first == 0 {
        return Ok(TcpListener::bind(SocketAddr::new(ip, 0)).await?);
    }
    let last = last.min(LAST_PORT);

    for port in first..=last {
        match TcpListener::bind(SocketAddr::new(ip, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) => debug!("Cannot bind port {}: {}", port, e),
        }
    }

    error!("Cannot bind the incoming socket on any port in {}..={}", first, last);
    Err(ListenerError::Bind {
        first_port: first,
        last_port: last,
    })
}
