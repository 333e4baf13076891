//! Error types for the rules engine.
//!
//! [`MoveError`] covers everything a player can do wrong. The room layer
//! turns every variant into an `invalid move` reply and leaves the game
//! untouched. [`EngineError`] covers setup and supply failures.

/// A player action that the rules reject.
///
/// Returning one of these guarantees that no game state was mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// Only the current player may collect or place.
    #[error("player {player} acted out of turn (current player is {current})")]
    NotYourTurn { player: usize, current: usize },

    /// The game has already ended.
    #[error("the game is over")]
    GameOver,

    /// No factory display with this index.
    #[error("display {0} does not exist")]
    InvalidDisplayIndex(usize),

    /// Tile index is out of range or points at the start marker.
    #[error("tile index {0} is not a collectable tile")]
    InvalidTileIndex(usize),

    /// Pattern line index outside `0..5`.
    #[error("pattern line {0} does not exist")]
    InvalidRow(usize),

    /// The wall row already holds the collected color.
    #[error("wall row {0} already holds this color")]
    WallConflict(usize),

    /// The pattern line already holds its full capacity of this color.
    #[error("pattern line {0} is full")]
    LineFull(usize),

    /// The pattern line holds a different color.
    #[error("pattern line {0} holds a different color")]
    ColorMismatch(usize),
}

/// Errors from game setup and the tile supply.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Games are for two to four players.
    #[error("a game needs 2 to 4 players, got {0}")]
    InvalidPlayerCount(usize),

    /// Tried to draw from an empty bag or lid.
    #[error("tile supply is empty")]
    EmptySupply,
}
