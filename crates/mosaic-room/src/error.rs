//! Error types for the room layer.
//!
//! The first three variants are login refusals. Their messages are sent
//! to clients verbatim as the `cause` of `login failed`.

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room exists and its game has started.
    #[error("The room name is used and the game in the corresponding room has started.")]
    GameInProgress(String),

    /// The room already holds the maximum number of users.
    #[error("The room is full.")]
    RoomFull(String),

    /// Somebody in the room already uses this nickname.
    #[error("The nickname has been used in room.")]
    NicknameTaken(String),

    /// The user is not in this room.
    #[error("user {0} not in room {1}")]
    NotInRoom(String, String),

    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(String),

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(String),
}

impl RoomError {
    /// Returns `true` for errors that answer a login with `login failed`.
    pub fn is_login_refusal(&self) -> bool {
        matches!(
            self,
            Self::GameInProgress(_) | Self::RoomFull(_) | Self::NicknameTaken(_)
        )
    }
}
