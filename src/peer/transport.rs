use super::error::HandshakeError;
use super::handshake::{is_protocol_header, Handshake};
use crate::constants::{HANDSHAKE_LEN, PROTOCOL_HEADER_LEN};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

/// Reads exactly one handshake from `stream`.
///
/// The protocol header is checked as soon as its 20 bytes arrive, so garbage
/// is rejected without waiting for the rest. No byte past offset 68 is
/// consumed, leaving the stream positioned at the first wire message.
pub async fn read_handshake<R>(
    stream: &mut R,
    limit: Option<Duration>,
) -> Result<Handshake, HandshakeError>
where
    R: AsyncRead + Unpin,
{
    match limit {
        Some(limit) => timeout(limit, read_exact_handshake(stream))
            .await
            .map_err(|_| HandshakeError::Timeout)?,
        None => read_exact_handshake(stream).await,
    }
}

async fn read_exact_handshake<R>(stream: &mut R) -> Result<Handshake, HandshakeError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; HANDSHAKE_LEN];

    stream
        .read_exact(&mut buf[..PROTOCOL_HEADER_LEN])
        .await
        .map_err(HandshakeError::from_read)?;

    if !is_protocol_header(&buf[..PROTOCOL_HEADER_LEN]) {
        return Err(HandshakeError::InvalidProtocol);
    }

    stream
        .read_exact(&mut buf[PROTOCOL_HEADER_LEN..])
        .await
        .map_err(HandshakeError::from_read)?;

    Handshake::decode(&buf)
}
