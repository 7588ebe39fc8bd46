use thiserror::Error;

/// Errors surfaced by the incoming peer listener.
///
/// Per-connection failures never show up here; they are logged and the
/// connection is closed.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Every port in the scan range was unavailable.
    #[error("cannot bind any port in {first_port}..={last_port}")]
    Bind { first_port: u16, last_port: u16 },

    /// `start` was called on a listener that is already accepting.
    #[error("listener already started")]
    AlreadyStarted,

    /// `start` was called after `interrupt`.
    #[error("listener has been shut down")]
    Shutdown,

    /// Network I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
