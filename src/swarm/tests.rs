use super::*;
use crate::peer::{Handshake, IncomingPeer};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::{TcpListener, TcpStream};

struct NamedSwarm {
    id: SwarmId,
    name: &'static str,
}

impl SwarmHandle for NamedSwarm {
    fn swarm_id(&self) -> SwarmId {
        self.id
    }

    fn offer(&self, _peer: IncomingPeer) {}
}

fn named(id: u8, name: &'static str) -> Arc<NamedSwarm> {
    Arc::new(NamedSwarm {
        id: SwarmId::new([id; 20]),
        name,
    })
}

async fn loopback_peer(info_hash: [u8; 20]) -> (IncomingPeer, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap())
        .await
        .unwrap();
    let (stream, addr) = listener.accept().await.unwrap();
    let peer = IncomingPeer::new(
        stream,
        addr,
        Handshake::new(info_hash, [0xAA; 20]),
        1,
        Instant::now(),
    );
    (peer, client)
}

#[test]
fn test_swarm_id_hex() {
    let hex = "0123456789abcdef0123456789abcdef01234567";
    let id = SwarmId::from_hex(hex).unwrap();
    assert_eq!(id.to_hex(), hex);
    assert_eq!(id.to_string(), hex);
    assert!(SwarmId::from_hex("0123").is_none());
    assert!(SwarmId::from_hex("zz23456789abcdef0123456789abcdef01234567").is_none());
    assert!(SwarmId::from_hex(&"+a".repeat(20)).is_none());
    assert!(SwarmId::from_hex("-123456789abcdef0123456789abcdef01234567").is_none());
}

#[test]
fn test_swarm_id_from_info_bytes() {
    // SHA-1 of the empty string.
    let id = SwarmId::from_info_bytes(b"");
    assert_eq!(id.to_hex(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");

    let a = SwarmId::from_info_bytes(b"d4:name4:testee");
    let b = SwarmId::from_info_bytes(b"d4:name4:testee");
    assert_eq!(a, b);
}

#[test]
fn test_swarm_id_equality_is_by_content() {
    let bytes = [7u8; 20];
    let a = SwarmId::from_bytes(&bytes).unwrap();
    let b = SwarmId::from(bytes);
    assert_eq!(a, b);

    let mut map = std::collections::HashMap::new();
    map.insert(a, "a");
    assert_eq!(map.get(&b), Some(&"a"));
    assert!(SwarmId::from_bytes(&bytes[..19]).is_none());
}

#[test]
fn test_registry_register_lookup() {
    let registry = SwarmRegistry::new();
    assert!(registry.is_empty());

    let swarm = named(1, "first");
    assert!(registry.register(swarm.clone()).is_none());

    let found = registry.lookup(&SwarmId::new([1u8; 20])).unwrap();
    assert_eq!(found.swarm_id(), swarm.id);
    assert!(registry.lookup(&SwarmId::new([2u8; 20])).is_none());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_registry_register_overwrites() {
    let registry = SwarmRegistry::new();
    let first = named(1, "first");
    let second = named(1, "second");

    registry.register(first.clone());
    let replaced = registry.register(second.clone()).unwrap();
    assert_eq!(replaced.swarm_id(), first.id);
    assert_eq!(registry.len(), 1);
    assert_eq!(second.name, "second");

    let current = registry.lookup(&SwarmId::new([1u8; 20])).unwrap();
    let current_ptr = Arc::as_ptr(&current) as *const u8;
    assert_eq!(current_ptr, Arc::as_ptr(&second) as *const u8);
    assert_eq!(first.name, "first");
}

#[test]
fn test_registry_unregister() {
    let registry = SwarmRegistry::new();
    let swarm = named(3, "third");

    registry.register(swarm.clone());
    assert!(registry.contains(&swarm.id));

    assert!(registry.unregister(swarm.as_ref()).is_some());
    assert!(!registry.contains(&swarm.id));
    assert!(registry.unregister(swarm.as_ref()).is_none());
}

#[tokio::test]
async fn test_peer_queue_delivers() {
    let id = SwarmId::new([4u8; 20]);
    let (queue, mut rx) = PeerQueue::new(id, 4);
    let (peer, _client) = loopback_peer([4u8; 20]).await;

    queue.offer(peer);
    assert_eq!(queue.offered(), 1);

    let received = rx.recv().await.unwrap();
    assert_eq!(received.swarm_id(), id);
    assert_eq!(received.sequence(), 1);
}

#[tokio::test]
async fn test_peer_queue_drops_when_full() {
    let (queue, _rx) = PeerQueue::new(SwarmId::new([5u8; 20]), 1);
    let (first, _c1) = loopback_peer([5u8; 20]).await;
    let (second, _c2) = loopback_peer([5u8; 20]).await;

    queue.offer(first);
    queue.offer(second);
    assert_eq!(queue.offered(), 1);
    assert_eq!(queue.dropped(), 1);
}

#[tokio::test]
async fn test_peer_queue_drops_when_closed() {
    let (queue, rx) = PeerQueue::new(SwarmId::new([6u8; 20]), 4);
    drop(rx);
    assert!(queue.is_closed());

    let (peer, mut client) = loopback_peer([6u8; 20]).await;
    queue.offer(peer);
    assert_eq!(queue.dropped(), 1);

    use tokio::io::AsyncReadExt;
    let mut buf = [0u8; 1];
    let n = client.read(&mut buf).await.unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_peer_queue_default_capacity() {
    let id = SwarmId::new([7u8; 20]);
    let (queue, _rx) = PeerQueue::with_default_capacity(id);

    for _ in 0..crate::constants::DEFAULT_PEER_QUEUE_CAPACITY {
        let (peer, _client) = loopback_peer([7u8; 20]).await;
        queue.offer(peer);
    }
    assert_eq!(queue.offered(), crate::constants::DEFAULT_PEER_QUEUE_CAPACITY as u64);
    assert_eq!(queue.dropped(), 0);

    let (extra, _client) = loopback_peer([7u8; 20]).await;
    queue.offer(extra);
    assert_eq!(queue.dropped(), 1);
}

#[tokio::test]
async fn test_incoming_peer_into_parts() {
    let (peer, mut client) = loopback_peer([8u8; 20]).await;
    let (mut stream, handshake) = peer.into_parts();
    assert_eq!(handshake.swarm_id(), SwarmId::new([8u8; 20]));
    assert_eq!(handshake.peer_id, [0xAA; 20]);

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    client.write_all(b"ping").await.unwrap();
    let mut buf = [0u8; 4];
    stream.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"ping");
}
