use std::io;

/// Errors raised while moving lines over a socket.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listener could not be bound.
    #[error("bind to {addr} failed: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Accepting a new peer failed.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),

    /// Writing a line failed.
    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    /// A line took longer than the write timeout.
    #[error("write timed out")]
    WriteTimeout,

    /// Reading from the socket failed.
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    /// The peer sent a line longer than the configured limit.
    #[error("line exceeds {0} bytes")]
    LineTooLong(usize),
}
