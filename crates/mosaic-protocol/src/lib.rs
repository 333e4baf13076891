//! Wire protocol for Mosaic.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Recipient`]) -
//!   the messages, one JSON object per line.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) - how messages become
//!   bytes and back.
//! - **Errors** ([`ProtocolError`]) - what can go wrong on the way.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (lines of bytes) and rooms
//! (game state). It knows nothing about sockets or rooms; it only knows
//! the message catalogue and the integer conventions for `collect place`
//! and `place location`.
//!
//! ```text
//! Transport (line) → Protocol (ClientMessage) → Room (Game)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    collect_place, collect_source, place_location, place_target, BoardContent, ClientMessage,
    LoggedUser, PlayerRanking, Recipient, ServerMessage, WallCell, FLOOR_LOCATION, TABLE_PLACE,
};
