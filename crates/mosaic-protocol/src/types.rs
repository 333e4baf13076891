//! Message types for Mosaic's wire format.
//!
//! Every line on a Mosaic connection is one JSON object whose `"type"`
//! field names the message kind. Field names are part of the client
//! contract and contain spaces (`"room name"`, `"tile index"`), so every
//! field below carries an explicit `#[serde(rename)]`.
//!
//! Tiles are encoded by [`mosaic_engine::Tile`] itself (`"RED"`, ...,
//! `"START"`); this module only adds the message envelopes and the
//! integer conventions for sources and targets.

use serde::{Deserialize, Serialize};

use mosaic_engine::{BoardUpdate, CollectSource, PlaceTarget, Tile};

// ---------------------------------------------------------------------------
// Integer conventions
// ---------------------------------------------------------------------------

/// `collect place` value that means "the table".
pub const TABLE_PLACE: i32 = -1;

/// `place location` value that means "the floor line".
pub const FLOOR_LOCATION: i32 = -1;

/// Maps a wire `collect place` to a source. `-1` is the table, any other
/// non-negative value is a display index. Anything else is `None`.
pub fn collect_source(place: i32) -> Option<CollectSource> {
    match place {
        TABLE_PLACE => Some(CollectSource::Table),
        n if n >= 0 => Some(CollectSource::Display(n as usize)),
        _ => None,
    }
}

/// Inverse of [`collect_source`].
pub fn collect_place(source: CollectSource) -> i32 {
    match source {
        CollectSource::Table => TABLE_PLACE,
        CollectSource::Display(n) => n as i32,
    }
}

/// Maps a wire `place location` to a target. `-1` is the floor line, any
/// other non-negative value is a pattern line row. Anything else is `None`.
pub fn place_target(location: i32) -> Option<PlaceTarget> {
    match location {
        FLOOR_LOCATION => Some(PlaceTarget::FloorLine),
        n if n >= 0 => Some(PlaceTarget::PatternLine(n as usize)),
        _ => None,
    }
}

/// Inverse of [`place_target`].
pub fn place_location(target: PlaceTarget) -> i32 {
    match target {
        PlaceTarget::FloorLine => FLOOR_LOCATION,
        PlaceTarget::PatternLine(row) => row as i32,
    }
}

// ---------------------------------------------------------------------------
// Recipient - who should receive a message?
// ---------------------------------------------------------------------------

/// Who a [`ServerMessage`] is for, by nickname. Nicknames are unique
/// within a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Everyone in the room.
    All,
    /// One user.
    Player(String),
    /// Everyone except this user, usually the one who acted.
    AllExcept(String),
}

impl Recipient {
    /// Returns `true` if `nick` should receive the message.
    pub fn includes(&self, nick: &str) -> bool {
        match self {
            Self::All => true,
            Self::Player(p) => p == nick,
            Self::AllExcept(p) => p != nick,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload pieces
// ---------------------------------------------------------------------------

/// An entry of `logged users` in `login success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedUser {
    pub nick: String,
    #[serde(rename = "is ready for game")]
    pub is_ready: bool,
}

/// One wall cell placed during a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallCell {
    #[serde(rename = "row of wall")]
    pub row: usize,
    #[serde(rename = "column of wall")]
    pub column: usize,
}

/// One board's entry in `update walls and scores`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardContent {
    #[serde(rename = "updated wall")]
    pub updated_wall: Vec<WallCell>,
    #[serde(rename = "updated score")]
    pub updated_score: u32,
}

impl From<&BoardUpdate> for BoardContent {
    fn from(update: &BoardUpdate) -> Self {
        Self {
            updated_wall: update
                .placed
                .iter()
                .map(|&(row, column)| WallCell { row, column })
                .collect(),
            updated_score: update.score,
        }
    }
}

/// One player's entry in `end of game`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRanking {
    #[serde(rename = "player id")]
    pub player_id: usize,
    pub ranking: u32,
}

// ---------------------------------------------------------------------------
// ClientMessage
// ---------------------------------------------------------------------------

/// Everything a client may send.
///
/// `#[serde(tag = "type")]` gives the internally tagged form the clients
/// speak: `{"type": "collect tiles", "collect place": -1, "tile index": 2}`.
/// Unknown types and missing fields fail to decode, which the server
/// treats as a protocol violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Join (or create) a room under a nickname.
    #[serde(rename = "login")]
    Login {
        nick: String,
        #[serde(rename = "room name")]
        room_name: String,
    },

    #[serde(rename = "ready for game")]
    ReadyForGame,

    #[serde(rename = "not ready for game")]
    NotReadyForGame,

    /// Take tiles. `collect place` is `-1` for the table, otherwise a
    /// display index. `tile index` is signed on the wire so a negative
    /// value is an invalid move rather than an undecodable line.
    #[serde(rename = "collect tiles")]
    CollectTiles {
        #[serde(rename = "collect place")]
        collect_place: i32,
        #[serde(rename = "tile index")]
        tile_index: i32,
    },

    /// Place the held tiles. `place location` is `-1` for the floor line,
    /// otherwise a pattern line row.
    #[serde(rename = "place tiles request")]
    PlaceTiles {
        #[serde(rename = "place location")]
        place_location: i32,
    },

    /// Propose a restart. Counts as the sender's own yes vote.
    #[serde(rename = "restart request")]
    RestartRequest,

    #[serde(rename = "reply to restart request")]
    RestartReply { reply: bool },

    /// Leave. The server closes the connection.
    #[serde(rename = "quit game")]
    QuitGame,
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// Everything the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// To the new user: the users who were already in the room.
    #[serde(rename = "login success")]
    LoginSuccess {
        #[serde(rename = "logged users")]
        logged_users: Vec<LoggedUser>,
    },

    #[serde(rename = "login failed")]
    LoginFailed { cause: String },

    #[serde(rename = "user joined")]
    UserJoined { nick: String },

    /// A user left a room that had no game running.
    #[serde(rename = "user left room")]
    UserLeftRoom { nick: String },

    /// A user left mid-game. The game is discarded and everyone is
    /// back to not ready.
    #[serde(rename = "user left game")]
    UserLeftGame { nick: String },

    #[serde(rename = "ready for game")]
    ReadyForGame { nick: String },

    #[serde(rename = "not ready for game")]
    NotReadyForGame { nick: String },

    #[serde(rename = "game start")]
    GameStart {
        #[serde(rename = "factory displays")]
        factory_displays: Vec<Vec<Tile>>,
        #[serde(rename = "current player")]
        current_player: usize,
    },

    /// A restart vote passed and a fresh game began.
    #[serde(rename = "restart")]
    Restart {
        #[serde(rename = "factory displays")]
        factory_displays: Vec<Vec<Tile>>,
        #[serde(rename = "current player")]
        current_player: usize,
    },

    #[serde(rename = "start next round")]
    StartNextRound {
        #[serde(rename = "factory displays")]
        factory_displays: Vec<Vec<Tile>>,
        #[serde(rename = "current player")]
        current_player: usize,
    },

    #[serde(rename = "turn")]
    Turn {
        #[serde(rename = "current player")]
        current_player: usize,
    },

    #[serde(rename = "somebody collected tiles")]
    SomebodyCollectedTiles {
        nick: String,
        #[serde(rename = "collect place")]
        collect_place: i32,
        #[serde(rename = "tile index")]
        tile_index: usize,
    },

    /// To the actor: the placement was accepted.
    #[serde(rename = "valid move")]
    ValidMove {
        #[serde(rename = "place location")]
        place_location: i32,
        #[serde(rename = "tiles added on pattern line")]
        pattern_line_tiles: Vec<Tile>,
        #[serde(rename = "tiles added on floor line")]
        floor_line_tiles: Vec<Tile>,
    },

    #[serde(rename = "somebody placed tiles")]
    SomebodyPlacedTiles {
        nick: String,
        #[serde(rename = "place location")]
        place_location: i32,
        #[serde(rename = "tiles added on pattern line")]
        pattern_line_tiles: Vec<Tile>,
        #[serde(rename = "tiles added on floor line")]
        floor_line_tiles: Vec<Tile>,
    },

    /// To the actor: the move broke a rule. Nothing changed.
    #[serde(rename = "invalid move")]
    InvalidMove,

    #[serde(rename = "update walls and scores")]
    UpdateWallsAndScores {
        #[serde(rename = "updated content")]
        updated_content: Vec<BoardContent>,
    },

    #[serde(rename = "end of game")]
    EndOfGame { rankings: Vec<PlayerRanking> },

    /// To everyone but the proposer.
    #[serde(rename = "restart request")]
    RestartRequest { nick: String },

    #[serde(rename = "restart rejected")]
    RestartRejected,
}
