use super::*;
use crate::constants::HANDSHAKE_LEN;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn sample_handshake() -> Handshake {
    let mut reserved = [0u8; 8];
    reserved[5] = 0x10;
    reserved[7] = 0x05;
    Handshake::new([1u8; 20], *b"-UT3500-abcdefghijkl").with_reserved(reserved)
}

#[test]
fn test_handshake_layout() {
    let encoded = sample_handshake().encode();
    assert_eq!(encoded.len(), HANDSHAKE_LEN);
    assert_eq!(encoded[0], 0x13);
    assert_eq!(&encoded[1..20], b"BitTorrent protocol");
    assert_eq!(encoded[25], 0x10);
    assert_eq!(&encoded[28..48], &[1u8; 20]);
    assert_eq!(&encoded[48..68], b"-UT3500-abcdefghijkl");
}

#[test]
fn test_handshake_reserved_bits() {
    let handshake = Handshake::decode(&sample_handshake().encode()).unwrap();
    assert!(handshake.supports_extension_protocol());
    assert!(handshake.supports_fast_extension());
    assert!(handshake.supports_dht());

    let plain = Handshake::new([0u8; 20], [0u8; 20]);
    assert!(!plain.supports_extension_protocol());
    assert!(!plain.supports_fast_extension());
    assert!(!plain.supports_dht());
}

#[test]
fn test_handshake_rejects_bad_length_byte() {
    let mut data = sample_handshake().encode().to_vec();
    data[0] = 0x00;
    assert!(matches!(
        Handshake::decode(&data),
        Err(HandshakeError::InvalidProtocol)
    ));
}

#[test]
fn test_handshake_rejects_bad_protocol_name() {
    let mut data = sample_handshake().encode().to_vec();
    data[1] = b'b';
    assert!(matches!(
        Handshake::decode(&data),
        Err(HandshakeError::InvalidProtocol)
    ));
}

#[test]
fn test_handshake_rejects_short_input() {
    let data = sample_handshake().encode();
    assert!(Handshake::decode(&data[..47]).is_err());
}

#[test]
fn test_peer_id_client() {
    let handshake = sample_handshake();
    let peer_id = handshake.remote_peer_id();
    assert_eq!(peer_id.client_id(), Some("UT3500"));
    assert_eq!(peer_id.to_string(), "-UT3500-abcdefghijkl");

    let opaque = PeerId([0xAA; 20]);
    assert_eq!(opaque.client_id(), None);
    assert!(opaque.to_string().starts_with("%aa%aa"));
    assert!(PeerId::from_bytes(&[0u8; 19]).is_none());
}

#[tokio::test]
async fn test_read_handshake_stops_at_prefix() {
    let (mut client, mut server) = tokio::io::duplex(256);
    let handshake = sample_handshake();

    client.write_all(&handshake.encode()).await.unwrap();
    client.write_all(b"\x00\x00\x00\x01\x02").await.unwrap();

    let received = read_handshake(&mut server, Some(Duration::from_secs(5)))
        .await
        .unwrap();
    assert_eq!(received, handshake);
    assert_eq!(received.swarm_id().as_bytes(), &[1u8; 20]);

    let mut rest = [0u8; 5];
    server.read_exact(&mut rest).await.unwrap();
    assert_eq!(&rest, b"\x00\x00\x00\x01\x02");
}

#[tokio::test]
async fn test_read_handshake_rejects_garbage_early() {
    let (mut client, mut server) = tokio::io::duplex(256);

    // Only the 20-byte header is sent; the reader must not wait for more.
    client.write_all(&[0u8; 20]).await.unwrap();

    let result = read_handshake(&mut server, Some(Duration::from_secs(5))).await;
    assert!(matches!(result, Err(HandshakeError::InvalidProtocol)));
}

#[tokio::test]
async fn test_read_handshake_truncated() {
    let (mut client, mut server) = tokio::io::duplex(256);

    client.write_all(&sample_handshake().encode()[..40]).await.unwrap();
    drop(client);

    let result = read_handshake(&mut server, None).await;
    assert!(matches!(result, Err(HandshakeError::ConnectionClosed)));
}

#[tokio::test]
async fn test_read_handshake_timeout() {
    let (mut client, mut server) = tokio::io::duplex(256);

    client.write_all(b"\x13BitTorrent proto").await.unwrap();

    let result = read_handshake(&mut server, Some(Duration::from_millis(50))).await;
    assert!(matches!(result, Err(HandshakeError::Timeout)));
    drop(client);
}
