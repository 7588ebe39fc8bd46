use std::fmt;

/// The 20-byte id a remote peer announces in its handshake.
///
/// The listener never interprets it; it is carried on the
/// [`IncomingPeer`](super::IncomingPeer) so the receiving swarm can detect
/// duplicate or self connections.
///
/// # Format
///
/// Most clients use the Azureus style `-XX0000-<random>`, where `XX` names
/// the client and `0000` is its version. Other ids are treated as opaque.
///
/// # Examples
///
/// ```
/// use btlisten::peer::PeerId;
///
/// let peer_id = PeerId::from_bytes(b"-UT3500-abcdefghijkl").unwrap();
/// assert_eq!(peer_id.client_id(), Some("UT3500"));
/// assert_eq!(peer_id.to_string(), "-UT3500-abcdefghijkl");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(pub [u8; 20]);

impl PeerId {
    /// Creates a peer ID from a 20-byte slice.
    ///
    /// Returns `None` if the slice is not exactly 20 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let id: [u8; 20] = bytes.try_into().ok()?;
        Some(Self(id))
    }

    /// Returns the raw 20-byte peer ID.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the client tag of an Azureus-style id.
    ///
    /// For `-UT3500-...` this is `UT3500` (uTorrent 3.5.0.0). Ids that do not
    /// follow the `-XXXXXX-` layout yield `None`.
    pub fn client_id(&self) -> Option<&str> {
        if self.0[0] == b'-' && self.0[7] == b'-' {
            std::str::from_utf8(&self.0[1..7]).ok()
        } else {
            None
        }
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.client_id() {
            Some(client) => write!(f, "PeerId({})", client),
            None => write!(f, "PeerId({:02x?})", &self.0[..8]),
        }
    }
}

/// Prints printable id bytes as-is and percent-escapes the rest, the way
/// trackers expect them in announce URLs.
impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|byte| {
            if byte.is_ascii_alphanumeric() || *byte == b'-' {
                write!(f, "{}", *byte as char)
            } else {
                write!(f, "%{:02x}", byte)
            }
        })
    }
}
