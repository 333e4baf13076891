//! Newline-delimited TCP transport.

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Longest accepted line, newline excluded.
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

/// A TCP [`Transport`] where each message is one line of text.
pub struct LineTransport {
    listener: TcpListener,
    max_line_bytes: usize,
}

impl LineTransport {
    /// Binds a new line transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        tracing::info!(addr, "line transport listening");
        Ok(Self {
            listener,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        })
    }

    /// Sets the longest line a peer may send before its connection fails.
    pub fn max_line_bytes(mut self, limit: usize) -> Self {
        self.max_line_bytes = limit;
        self
    }

    /// Returns the bound address (useful after binding to port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for LineTransport {
    type Connection = LineConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Accept)?;
        // Small JSON lines; don't let Nagle batch them.
        let _ = stream.set_nodelay(true);

        let id = ConnectionId::next();
        tracing::debug!(%id, %peer, "accepted TCP connection");

        let (read_half, write_half) = stream.into_split();
        Ok(LineConnection {
            id,
            peer,
            reader: Mutex::new(BufReader::new(read_half)),
            writer: Mutex::new(write_half),
            max_line_bytes: self.max_line_bytes,
        })
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        tracing::info!("line transport no longer accepting");
        Ok(())
    }
}

/// One TCP connection speaking newline-delimited messages.
///
/// Reading and writing use separate halves behind separate locks, so a
/// reader blocked on `recv` never holds up a writer.
pub struct LineConnection {
    id: ConnectionId,
    peer: SocketAddr,
    reader: Mutex<BufReader<OwnedReadHalf>>,
    writer: Mutex<OwnedWriteHalf>,
    max_line_bytes: usize,
}

impl LineConnection {
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for LineConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let mut writer = self.writer.lock().await;
        writer.write_all(data).await.map_err(TransportError::Write)?;
        writer.write_all(b"\n").await.map_err(TransportError::Write)?;
        writer.flush().await.map_err(TransportError::Write)
    }

    /// Reads the next non-blank line. A trailing `\r` is stripped. A final
    /// line without a newline is still delivered before `None`.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut reader = self.reader.lock().await;
        loop {
            let mut line = Vec::new();
            let limit = self.max_line_bytes as u64 + 1;
            let n = (&mut *reader)
                .take(limit)
                .read_until(b'\n', &mut line)
                .await
                .map_err(TransportError::Read)?;
            if n == 0 {
                return Ok(None);
            }

            if line.last() == Some(&b'\n') {
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
            } else if line.len() > self.max_line_bytes {
                return Err(TransportError::LineTooLong(self.max_line_bytes));
            }

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Ok(Some(line));
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::Write)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
