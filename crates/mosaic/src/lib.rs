//! # Mosaic
//!
//! Authoritative server for a four-player tile-drafting board game.
//!
//! Clients connect over TCP and exchange one JSON object per line. They
//! log into a named room, mark themselves ready, and once every user in
//! the room (at least two) is ready the room deals a game. From then on
//! the server is the single source of truth: it validates each move,
//! scores the rounds and announces the rankings.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mosaic::prelude::*;
//!
//! # async fn demo() -> Result<(), MosaicError> {
//! let server = MosaicServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::MosaicError;
pub use mosaic_transport::DEFAULT_MAX_LINE_BYTES;
pub use server::{
    MosaicServer, MosaicServerBuilder, ServerConfig, DEFAULT_BIND, DEFAULT_WRITE_TIMEOUT,
};

/// Convenience re-exports for building a server or a client of one.
pub mod prelude {
    pub use crate::{MosaicError, MosaicServer, MosaicServerBuilder, ServerConfig};
    pub use mosaic_protocol::{ClientMessage, Codec, JsonCodec, ServerMessage};
    pub use mosaic_room::{RoomConfig, RoomPhase};
}
