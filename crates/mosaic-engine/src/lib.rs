//! Rules engine for Mosaic, a tile-drafting board game for 2 to 4 players.
//!
//! This crate has no I/O. The server's room actors and the hotseat demo
//! both drive the same [`Game`] and react to the [`GameEvent`]s it returns.
//!
//! # Key types
//!
//! - [`Game`] - one match: turn order, drafting, round resolution
//! - [`PlayerBoard`] - wall, pattern lines, floor line, score
//! - [`FactoryDisplays`] / [`GameTable`] - where tiles are drafted from
//! - [`Bag`] / [`Lid`] - tile supply
//! - [`GameEvent`] - what happened, for whoever is presenting the game
//! - [`MoveError`] - why a move was refused

mod board;
mod error;
mod event;
mod factory;
mod game;
mod ranking;
mod supply;
mod tile;

pub use board::{
    FloorLine, PatternLine, Placement, PlayerBoard, Wall, WallTiling, COLOR_BONUS,
    COLUMN_BONUS, FLOOR_CAPACITY, FLOOR_PENALTY, ROW_BONUS,
};
pub use error::{EngineError, MoveError};
pub use event::{BoardUpdate, CollectSource, GameEvent, PlaceTarget};
pub use factory::{FactoryDisplays, GameTable, Take, DISPLAY_CAPACITY};
pub use game::{Game, GamePhase, MAX_PLAYERS, MIN_PLAYERS};
pub use ranking::rank_players;
pub use supply::{draw_for_display, Bag, Lid};
pub use tile::{wall_color, Tile, BOARD_SIZE, COLORS, TILES_PER_COLOR, WALL_ORDER};
