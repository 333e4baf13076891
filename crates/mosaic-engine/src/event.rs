//! Events emitted by [`Game`](crate::Game) operations.
//!
//! The engine never talks to clients. Every successful operation returns
//! the events it produced, in order, and the caller decides who hears
//! about them (the room actor on a server, the terminal in hotseat play).

use crate::Tile;

/// Where a player collects tiles from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectSource {
    /// The shared table center.
    Table,
    /// A factory display by index.
    Display(usize),
}

/// Where a player puts their collected tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceTarget {
    FloorLine,
    /// A pattern line by row index.
    PatternLine(usize),
}

/// One board's changes from a round's wall tiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardUpdate {
    /// Wall cells placed this round, as `(row, column)`.
    pub placed: Vec<(usize, usize)>,
    /// Score after the round (and after end bonuses on the final round).
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// `player` took `tiles` from `source`.
    TilesCollected {
        player: usize,
        source: CollectSource,
        tile_index: usize,
        tiles: Vec<Tile>,
        took_start_marker: bool,
    },

    /// `player` placed their selection.
    ///
    /// `target` is the target that actually received the tiles. A pattern
    /// line request becomes `FloorLine` when no line could take the color.
    TilesPlaced {
        player: usize,
        target: PlaceTarget,
        pattern_line: Vec<Tile>,
        floor_line: Vec<Tile>,
    },

    /// The turn passed to `current_player`.
    TurnChanged { current_player: usize },

    /// Wall tiling ran. One entry per board, in player order.
    WallsAndScoresUpdated { boards: Vec<BoardUpdate> },

    /// A new round began with freshly filled displays.
    RoundStarted {
        displays: Vec<Vec<Tile>>,
        current_player: usize,
    },

    /// The game is over. `rankings[i]` is player `i`'s rank (1 is best).
    GameEnded { rankings: Vec<u32> },
}
