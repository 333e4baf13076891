//! Room configuration and phase.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room on a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Minimum ready users required to start a game.
    pub min_players: usize,

    /// Maximum users allowed in the room.
    pub max_players: usize,

    /// Capacity of each user's outbound message queue. A user whose queue
    /// is full when the room broadcasts gets disconnected.
    pub outbound_queue: usize,

    /// Capacity of the room actor's command channel.
    pub command_queue: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: mosaic_engine::MIN_PLAYERS,
            max_players: mosaic_engine::MAX_PLAYERS,
            outbound_queue: 64,
            command_queue: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// Whether a room is gathering users or running a game.
///
/// ```text
/// WaitingForStart --all ready (>= 2)--> OngoingGame
///        ^                                   |
///        +--------- a user leaves -----------+
/// ```
///
/// A finished game keeps the room in `OngoingGame` until a restart vote
/// passes or someone leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomPhase {
    WaitingForStart,
    OngoingGame,
}

impl RoomPhase {
    /// Returns `true` if the room is accepting new users.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::WaitingForStart)
    }

    /// Returns `true` if a game exists in the room.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::OngoingGame)
    }
}

impl fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingForStart => write!(f, "WaitingForStart"),
            Self::OngoingGame => write!(f, "OngoingGame"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_phase_is_joinable() {
        assert!(RoomPhase::WaitingForStart.is_joinable());
        assert!(!RoomPhase::OngoingGame.is_joinable());
    }

    #[test]
    fn test_room_phase_is_active() {
        assert!(!RoomPhase::WaitingForStart.is_active());
        assert!(RoomPhase::OngoingGame.is_active());
    }

    #[test]
    fn test_room_phase_display() {
        assert_eq!(RoomPhase::WaitingForStart.to_string(), "WaitingForStart");
        assert_eq!(RoomPhase::OngoingGame.to_string(), "OngoingGame");
    }

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.min_players, 2);
        assert_eq!(config.max_players, 4);
        assert_eq!(config.outbound_queue, 64);
    }
}
