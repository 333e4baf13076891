//! Rooms for the Mosaic server.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! user list and, once everyone is ready, one [`mosaic_engine::Game`].
//!
//! # Key types
//!
//! - [`RoomManager`] - creates rooms on first login, destroys them when empty
//! - [`RoomHandle`] - send commands to a running room actor
//! - [`RoomPhase`] - waiting for start / ongoing game
//! - [`RoomConfig`] - player limits and queue sizes

mod config;
mod error;
mod logic;
mod manager;
mod room;

pub use config::{RoomConfig, RoomPhase};
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{PlayerSender, RoomHandle, RoomInfo};
