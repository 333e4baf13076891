//! `MosaicServer` builder and accept loop.
//!
//! This is the entry point for running a Mosaic game server. It ties the
//! layers together: line transport → JSON codec → connection handler →
//! room actors.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mosaic_protocol::{Codec, JsonCodec};
use mosaic_room::{RoomConfig, RoomManager};
use mosaic_transport::{LineTransport, Transport, DEFAULT_MAX_LINE_BYTES};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::handler::handle_connection;
use crate::MosaicError;

/// Address the server listens on unless told otherwise.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// How long one outbound line may take to write before the peer is
/// dropped.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Server settings. Built up by [`MosaicServerBuilder`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,

    /// Upper bound for writing one line to a client.
    pub write_timeout: Duration,

    /// Longest line a client may send.
    pub max_line_bytes: usize,

    /// Settings applied to every room.
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            room: RoomConfig::default(),
        }
    }
}

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The room
/// registry sits behind one lock so login and leave are atomic.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Mosaic server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), mosaic::MosaicError> {
/// use mosaic::prelude::*;
///
/// let server = MosaicServer::builder()
///     .bind("127.0.0.1:9000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct MosaicServerBuilder {
    config: ServerConfig,
}

impl MosaicServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Starts from an existing config.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind = addr.to_string();
        self
    }

    /// Sets the per-line write timeout.
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = timeout;
        self
    }

    /// Sets the longest accepted client line.
    pub fn max_line_bytes(mut self, limit: usize) -> Self {
        self.config.max_line_bytes = limit;
        self
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` over `LineTransport`.
    pub async fn build(self) -> Result<MosaicServer<JsonCodec>, MosaicError> {
        let transport = LineTransport::bind(&self.config.bind)
            .await?
            .max_line_bytes(self.config.max_line_bytes);

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomManager::with_config(self.config.room.clone())),
            codec: JsonCodec,
            config: self.config,
        });

        Ok(MosaicServer { transport, state })
    }
}

impl Default for MosaicServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Mosaic game server.
///
/// Call [`run()`](Self::run) or [`run_until()`](Self::run_until) to start
/// accepting connections.
pub struct MosaicServer<C: Codec> {
    transport: LineTransport,
    state: Arc<ServerState<C>>,
}

impl MosaicServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> MosaicServerBuilder {
        MosaicServerBuilder::new()
    }
}

impl<C: Codec> MosaicServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), MosaicError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` resolves.
    ///
    /// On shutdown the listener stops, every connection task is aborted
    /// and every room actor is told to stop.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), MosaicError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Mosaic server running");

        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,

                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        connections.spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },

                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        tracing::info!(connections = connections.len(), "Mosaic server shutting down");
        connections.abort_all();
        while connections.join_next().await.is_some() {}

        self.state.rooms.lock().await.shutdown_all().await;
        self.transport.shutdown().await?;
        Ok(())
    }
}
