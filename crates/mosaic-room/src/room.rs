//! Room actor: an isolated Tokio task that owns one room.
//!
//! Each room runs in its own task and is the only owner of its users and
//! its [`Game`]. Everything that changes the room (joins, leaves, ready
//! flags, moves, restart votes) arrives as a [`RoomCommand`] on one
//! channel and is handled to completion before the next, so two players
//! can never act on the same state at once.

use mosaic_engine::{Game, GameEvent};
use mosaic_protocol::{
    collect_source, place_target, ClientMessage, LoggedUser, Recipient, ServerMessage,
};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use crate::logic;
use crate::{RoomConfig, RoomError, RoomPhase};

/// Channel sender for delivering outbound messages to one connection.
///
/// Bounded: the room never waits on a slow reader. See [`RoomConfig`].
pub type PlayerSender = mpsc::Sender<ServerMessage>;

/// Commands sent to a room actor through its channel.
///
/// Variants with a `oneshot::Sender` expect an answer; the caller awaits
/// it on the matching receiver.
pub(crate) enum RoomCommand {
    /// Add a user to the room.
    Join {
        nick: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Remove a user. Replies with the number of users left.
    Leave {
        nick: String,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    /// Deliver a client message from a user.
    Message { nick: String, msg: ClientMessage },

    /// Request a snapshot of room metadata.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Stop the actor.
    Shutdown,
}

/// A snapshot of room metadata (not the game itself).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub name: String,
    pub phase: RoomPhase,
    /// Users in join order, with their ready flags.
    pub users: Vec<LoggedUser>,
    pub max_players: usize,
}

/// Handle to a running room actor.
///
/// Cheap to clone. The `RoomManager` holds one per room and each logged
/// in connection keeps its own copy for routing game messages.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    name: String,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sends a join request to the room.
    ///
    /// On success the actor has already queued `login success` for the new
    /// user and `user joined` for everyone else.
    pub async fn join(&self, nick: &str, sender: PlayerSender) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                nick: nick.to_string(),
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Sends a leave request and returns how many users remain.
    pub async fn leave(&self, nick: &str) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                nick: nick.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Sends a client message to the room (fire-and-forget).
    pub async fn send_message(&self, nick: &str, msg: ClientMessage) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Message {
                nick: nick.to_string(),
                msg,
            })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Requests the current room info.
    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.name.clone())
    }
}

/// A user in the room. Index in the user list is the player index in the
/// game.
struct User {
    nick: String,
    ready: bool,
    restart_vote: bool,
    /// `None` once the connection has gone away or was evicted.
    sender: Option<PlayerSender>,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    name: String,
    config: RoomConfig,
    users: Vec<User>,
    game: Option<Game>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room = %self.name, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    nick,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(nick, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { nick, reply } => {
                    let result = self.handle_leave(&nick);
                    let _ = reply.send(result);
                }
                RoomCommand::Message { nick, msg } => {
                    self.handle_message(&nick, msg);
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room = %self.name, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room = %self.name, "room actor stopped");
    }

    fn phase(&self) -> RoomPhase {
        if self.game.is_some() {
            RoomPhase::OngoingGame
        } else {
            RoomPhase::WaitingForStart
        }
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    fn handle_join(&mut self, nick: String, sender: PlayerSender) -> Result<(), RoomError> {
        if !self.phase().is_joinable() {
            return Err(RoomError::GameInProgress(self.name.clone()));
        }
        if self.users.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.name.clone()));
        }
        if self.index_of(&nick).is_some() {
            return Err(RoomError::NicknameTaken(self.name.clone()));
        }

        let logged_users = self.logged_users();
        self.users.push(User {
            nick: nick.clone(),
            ready: false,
            restart_vote: false,
            sender: Some(sender),
        });
        tracing::info!(
            room = %self.name,
            %nick,
            users = self.users.len(),
            "user joined"
        );

        self.dispatch(vec![
            (
                Recipient::Player(nick.clone()),
                ServerMessage::LoginSuccess { logged_users },
            ),
            (
                Recipient::AllExcept(nick.clone()),
                ServerMessage::UserJoined { nick },
            ),
        ]);
        Ok(())
    }

    fn handle_leave(&mut self, nick: &str) -> Result<usize, RoomError> {
        let idx = self
            .index_of(nick)
            .ok_or_else(|| RoomError::NotInRoom(nick.to_string(), self.name.clone()))?;
        self.users.remove(idx);

        let left_game = self.game.take().is_some();
        tracing::info!(
            room = %self.name,
            %nick,
            users = self.users.len(),
            left_game,
            "user left"
        );

        if self.users.is_empty() {
            return Ok(0);
        }

        let nick = nick.to_string();
        if left_game {
            for user in &mut self.users {
                user.ready = false;
                user.restart_vote = false;
            }
            tracing::info!(room = %self.name, "game abandoned");
            self.dispatch(vec![(Recipient::All, ServerMessage::UserLeftGame { nick })]);
        } else {
            self.dispatch(vec![(Recipient::All, ServerMessage::UserLeftRoom { nick })]);
        }
        Ok(self.users.len())
    }

    // -----------------------------------------------------------------------
    // Client messages
    // -----------------------------------------------------------------------

    fn handle_message(&mut self, nick: &str, msg: ClientMessage) {
        let Some(player) = self.index_of(nick) else {
            tracing::warn!(room = %self.name, %nick, "message from non-member, ignoring");
            return;
        };

        match msg {
            ClientMessage::ReadyForGame => self.set_ready(player, true),
            ClientMessage::NotReadyForGame => self.set_ready(player, false),
            ClientMessage::CollectTiles {
                collect_place,
                tile_index,
            } => {
                let index = usize::try_from(tile_index).ok();
                let result = match (self.game.as_mut(), collect_source(collect_place), index) {
                    (Some(game), Some(source), Some(index)) => {
                        game.collect(player, source, index).map_err(|e| e.to_string())
                    }
                    (None, _, _) => Err("no game in progress".to_string()),
                    (_, None, _) => Err(format!("bad collect place {collect_place}")),
                    (_, _, None) => Err(format!("bad tile index {tile_index}")),
                };
                self.finish_move(player, result);
            }
            ClientMessage::PlaceTiles { place_location } => {
                let result = match (self.game.as_mut(), place_target(place_location)) {
                    (Some(game), Some(target)) => {
                        game.place(player, target).map_err(|e| e.to_string())
                    }
                    (None, _) => Err("no game in progress".to_string()),
                    (_, None) => Err(format!("bad place location {place_location}")),
                };
                self.finish_move(player, result);
            }
            ClientMessage::RestartRequest => self.handle_restart_request(player),
            ClientMessage::RestartReply { reply } => self.handle_restart_reply(player, reply),
            ClientMessage::Login { .. } | ClientMessage::QuitGame => {
                tracing::debug!(room = %self.name, %nick, "session message reached room, ignoring");
            }
        }
    }

    fn set_ready(&mut self, player: usize, ready: bool) {
        if self.game.is_some() {
            tracing::debug!(room = %self.name, player, "ready flag change during game, ignoring");
            return;
        }
        self.users[player].ready = ready;
        let nick = self.users[player].nick.clone();
        let msg = if ready {
            ServerMessage::ReadyForGame { nick }
        } else {
            ServerMessage::NotReadyForGame { nick }
        };
        self.dispatch(vec![(Recipient::All, msg)]);

        if ready {
            self.maybe_start_game();
        }
    }

    fn maybe_start_game(&mut self) {
        if self.users.len() < self.config.min_players || !self.users.iter().all(|u| u.ready) {
            return;
        }
        let Some(game) = self.new_game() else { return };
        let msg = logic::game_start(&game);
        self.game = Some(game);
        tracing::info!(room = %self.name, players = self.users.len(), "game started");
        self.dispatch(vec![(Recipient::All, msg)]);
    }

    /// Applies the outcome of a collect or place: events on success,
    /// `invalid move` to the actor on failure.
    fn finish_move(&mut self, player: usize, result: Result<Vec<GameEvent>, String>) {
        let nick = self.users[player].nick.clone();
        match result {
            Ok(events) => {
                let nicks = self.nicks();
                let mut msgs = Vec::new();
                for event in events {
                    if let GameEvent::GameEnded { rankings } = &event {
                        tracing::info!(room = %self.name, ?rankings, "game finished");
                    }
                    msgs.extend(logic::event_messages(event, &nicks));
                }
                self.dispatch(msgs);
            }
            Err(reason) => {
                tracing::debug!(room = %self.name, %nick, %reason, "move rejected");
                self.dispatch(vec![(Recipient::Player(nick), ServerMessage::InvalidMove)]);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Restart voting
    // -----------------------------------------------------------------------

    fn handle_restart_request(&mut self, player: usize) {
        if self.game.is_none() {
            tracing::debug!(room = %self.name, player, "restart request without a game, ignoring");
            return;
        }
        self.users[player].restart_vote = true;
        let nick = self.users[player].nick.clone();
        self.dispatch(vec![(
            Recipient::AllExcept(nick.clone()),
            ServerMessage::RestartRequest { nick },
        )]);
        self.maybe_restart();
    }

    fn handle_restart_reply(&mut self, player: usize, reply: bool) {
        if self.game.is_none() {
            tracing::debug!(room = %self.name, player, "restart reply without a game, ignoring");
            return;
        }
        if reply {
            self.users[player].restart_vote = true;
            self.maybe_restart();
        } else {
            self.clear_restart_votes();
            tracing::info!(room = %self.name, player, "restart rejected");
            self.dispatch(vec![(Recipient::All, ServerMessage::RestartRejected)]);
        }
    }

    fn maybe_restart(&mut self) {
        if !self.users.iter().all(|u| u.restart_vote) {
            return;
        }
        self.clear_restart_votes();
        let Some(game) = self.new_game() else { return };
        let msg = logic::restart(&game);
        self.game = Some(game);
        tracing::info!(room = %self.name, "game restarted");
        self.dispatch(vec![(Recipient::All, msg)]);
    }

    fn clear_restart_votes(&mut self) {
        for user in &mut self.users {
            user.restart_vote = false;
        }
    }

    fn new_game(&self) -> Option<Game> {
        match Game::new(self.users.len()) {
            Ok(game) => Some(game),
            Err(e) => {
                tracing::error!(room = %self.name, error = %e, "could not create game");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Delivery
    // -----------------------------------------------------------------------

    /// Dispatches outbound messages to the correct recipients.
    fn dispatch(&mut self, msgs: Vec<(Recipient, ServerMessage)>) {
        for (recipient, msg) in msgs {
            for idx in 0..self.users.len() {
                if recipient.includes(&self.users[idx].nick) {
                    self.send_to(idx, msg.clone());
                }
            }
        }
    }

    /// Queues a message for one user without waiting. A full queue means
    /// the peer stopped reading: its sender is dropped, which closes the
    /// connection and brings the user back through the leave path.
    fn send_to(&mut self, idx: usize, msg: ServerMessage) {
        let user = &mut self.users[idx];
        let Some(sender) = &user.sender else { return };
        match sender.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(room = %self.name, nick = %user.nick, "outbound queue full, dropping connection");
                user.sender = None;
            }
            Err(TrySendError::Closed(_)) => {
                user.sender = None;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    fn index_of(&self, nick: &str) -> Option<usize> {
        self.users.iter().position(|u| u.nick == nick)
    }

    fn nicks(&self) -> Vec<String> {
        self.users.iter().map(|u| u.nick.clone()).collect()
    }

    fn logged_users(&self) -> Vec<LoggedUser> {
        self.users
            .iter()
            .map(|u| LoggedUser {
                nick: u.nick.clone(),
                is_ready: u.ready,
            })
            .collect()
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            name: self.name.clone(),
            phase: self.phase(),
            users: self.logged_users(),
            max_players: self.config.max_players,
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
pub(crate) fn spawn_room(name: String, config: RoomConfig) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.command_queue);

    let actor = RoomActor {
        name: name.clone(),
        config,
        users: Vec::new(),
        game: None,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { name, sender: tx }
}
