use super::error::HandshakeError;
use super::peer_id::PeerId;
use crate::constants::{
    HANDSHAKE_LEN, ID_LEN, PROTOCOL_HEADER_LEN, PROTOCOL_STRING, PROTOCOL_STRING_LEN,
    RESERVED_LEN,
};
use crate::swarm::SwarmId;
use bytes::{BufMut, Bytes, BytesMut};

const RESERVED_OFFSET: usize = PROTOCOL_HEADER_LEN;
const INFO_HASH_OFFSET: usize = RESERVED_OFFSET + RESERVED_LEN;
const PEER_ID_OFFSET: usize = INFO_HASH_OFFSET + ID_LEN;

/// The 68-byte prefix that opens every peer connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub reserved: [u8; 8],
    pub info_hash: [u8; 20],
    pub peer_id: [u8; 20],
}

impl Handshake {
    pub fn new(info_hash: [u8; 20], peer_id: [u8; 20]) -> Self {
        Self {
            reserved: [0u8; 8],
            info_hash,
            peer_id,
        }
    }

    pub fn with_reserved(mut self, reserved: [u8; 8]) -> Self {
        self.reserved = reserved;
        self
    }

    pub fn swarm_id(&self) -> SwarmId {
        SwarmId(self.info_hash)
    }

    pub fn remote_peer_id(&self) -> PeerId {
        PeerId(self.peer_id)
    }

    pub fn supports_extension_protocol(&self) -> bool {
        (self.reserved[5] & 0x10) != 0
    }

    pub fn supports_fast_extension(&self) -> bool {
        (self.reserved[7] & 0x04) != 0
    }

    pub fn supports_dht(&self) -> bool {
        (self.reserved[7] & 0x01) != 0
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HANDSHAKE_LEN);
        buf.put_u8(PROTOCOL_STRING_LEN);
        buf.put_slice(PROTOCOL_STRING);
        buf.put_slice(&self.reserved);
        buf.put_slice(&self.info_hash);
        buf.put_slice(&self.peer_id);
        buf.freeze()
    }

    pub fn decode(data: &[u8]) -> Result<Self, HandshakeError> {
        if data.len() < HANDSHAKE_LEN {
            return Err(HandshakeError::ConnectionClosed);
        }

        if !is_protocol_header(&data[..PROTOCOL_HEADER_LEN]) {
            return Err(HandshakeError::InvalidProtocol);
        }

        let mut reserved = [0u8; 8];
        reserved.copy_from_slice(&data[RESERVED_OFFSET..INFO_HASH_OFFSET]);

        let mut info_hash = [0u8; 20];
        info_hash.copy_from_slice(&data[INFO_HASH_OFFSET..PEER_ID_OFFSET]);

        let mut peer_id = [0u8; 20];
        peer_id.copy_from_slice(&data[PEER_ID_OFFSET..HANDSHAKE_LEN]);

        Ok(Self {
            reserved,
            info_hash,
            peer_id,
        })
    }
}

/// Checks the length byte and protocol name at the start of a handshake.
pub fn is_protocol_header(header: &[u8]) -> bool {
    header.len() == PROTOCOL_HEADER_LEN
        && header[0] == PROTOCOL_STRING_LEN
        && &header[1..] == PROTOCOL_STRING
}
