//! Socket layer for Mosaic.
//!
//! The server talks to clients through the [`Transport`] (listener side)
//! and [`Connection`] (one peer) traits. The only implementation is
//! [`LineTransport`]: plain TCP where one message is one line of UTF-8
//! terminated by `\n`. What the lines mean is the protocol crate's
//! business.

#![allow(async_fn_in_trait)]

mod error;
mod line;

pub use error::TransportError;
pub use line::{LineConnection, LineTransport, DEFAULT_MAX_LINE_BYTES};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique number for an accepted connection, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocates the next id. Ids start at 1 and never repeat.
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Listener side: hands out one [`Connection`] per peer.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next peer.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Stops handing out connections.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// One peer that exchanges whole messages.
///
/// `send` and `recv` may be awaited from different tasks at the same time.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Writes one message; the transport adds the framing.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Reads the next message with framing removed, or `Ok(None)` once
    /// the peer has closed its side.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Shuts down our sending side. The peer sees end of stream.
    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;
}
