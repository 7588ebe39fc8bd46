use crate::constants::{ACCEPT_ERROR_BACKOFF, HANDSHAKE_TIMEOUT, LAST_PORT};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Tuning for an [`IncomingPeerListener`](super::IncomingPeerListener).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Address the listening socket binds to.
    pub bind_ip: IpAddr,
    /// Highest port tried when scanning upward from the requested one.
    pub last_port: u16,
    /// Limit on how long an accepted peer may take to send its handshake.
    /// `None` waits until the peer hangs up or the listener is interrupted.
    pub handshake_timeout: Option<Duration>,
    /// Sleep after a non-fatal accept error.
    pub accept_error_backoff: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            last_port: LAST_PORT,
            handshake_timeout: Some(HANDSHAKE_TIMEOUT),
            accept_error_backoff: ACCEPT_ERROR_BACKOFF,
        }
    }
}

impl ListenerConfig {
    pub fn with_bind_ip(mut self, ip: IpAddr) -> Self {
        self.bind_ip = ip;
        self
    }

    pub fn with_last_port(mut self, port: u16) -> Self {
        self.last_port = port.min(LAST_PORT);
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_accept_error_backoff(mut self, backoff: Duration) -> Self {
        self.accept_error_backoff = backoff;
        self
    }
}
