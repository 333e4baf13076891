//! Per-connection handler: login and message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a writer task that drains the connection's outbound queue. The
//! flow is:
//!   1. Receive lines, decode each into a `ClientMessage`
//!   2. `login` → room lookup-or-create and join under the registry lock
//!   3. Everything else → forwarded to the user's room actor
//!   4. Disconnect, `quit game`, a bad line or an evicted writer → leave,
//!      awaited before the socket is closed

use std::sync::Arc;

use mosaic_protocol::{ClientMessage, Codec, ProtocolError, ServerMessage};
use mosaic_room::{PlayerSender, RoomHandle};
use mosaic_transport::{Connection, LineConnection, TransportError};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::MosaicError;

/// Takes a user out of their room.
///
/// The normal exit path calls [`LeaveGuard::leave`] and waits for the room
/// to let go of the nickname. If the task is aborted or panics first,
/// `Drop` spawns the same leave as a fire-and-forget task.
struct LeaveGuard<C: Codec> {
    membership: Option<(String, String)>,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> LeaveGuard<C> {
    fn new(state: &Arc<ServerState<C>>, room: String, nick: String) -> Self {
        Self {
            membership: Some((room, nick)),
            state: Arc::clone(state),
        }
    }

    /// Leaves now and disarms the guard.
    async fn leave(mut self) {
        if let Some((room, nick)) = self.membership.take() {
            leave_room(&self.state, &room, &nick).await;
        }
    }
}

impl<C: Codec> Drop for LeaveGuard<C> {
    fn drop(&mut self) {
        let Some((room, nick)) = self.membership.take() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let state = Arc::clone(&self.state);
        runtime.spawn(async move { leave_room(&state, &room, &nick).await });
    }
}

async fn leave_room<C: Codec>(state: &ServerState<C>, room: &str, nick: &str) {
    let mut rooms = state.rooms.lock().await;
    if let Err(e) = rooms.leave(room, nick).await {
        tracing::debug!(%room, %nick, error = %e, "leave after disconnect failed");
    }
}

/// Where a connection stands.
enum Session<C: Codec> {
    /// Not in a room yet. Holds the outbound queue so `login failed`
    /// can be delivered.
    LoggedOut { outbound: PlayerSender },

    /// In a room. The room owns the outbound queue now; once it lets go
    /// the writer task ends and so does the connection.
    LoggedIn {
        room: RoomHandle,
        nick: String,
        guard: LeaveGuard<C>,
    },
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: LineConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), MosaicError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let (outbound, inbox) = mpsc::channel(state.config.room.outbound_queue);
    let mut writer = tokio::spawn(write_loop(Arc::clone(&conn), inbox, Arc::clone(&state)));
    let mut session = Session::LoggedOut { outbound };

    let result = tokio::select! {
        read = read_loop(&conn, &state, &mut session) => read,
        written = &mut writer => match written {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "writer task failed");
                Ok(())
            }
        },
    };

    writer.abort();
    // The nickname is free again before the peer sees end of stream.
    if let Session::LoggedIn { guard, .. } = session {
        guard.leave().await;
    }
    let _ = conn.close().await;
    tracing::debug!(%conn_id, "connection closed");
    result
}

/// Reads client lines until the peer goes away or breaks the protocol.
async fn read_loop<C: Codec>(
    conn: &LineConnection,
    state: &Arc<ServerState<C>>,
    session: &mut Session<C>,
) -> Result<(), MosaicError> {
    let conn_id = conn.id();

    loop {
        let data = match conn.recv().await? {
            Some(data) => data,
            None => {
                tracing::info!(%conn_id, "connection closed by peer");
                return Ok(());
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode line, closing");
                return Err(e.into());
            }
        };

        match msg {
            ClientMessage::QuitGame => {
                tracing::info!(%conn_id, "client quit");
                return Ok(());
            }

            ClientMessage::Login { nick, room_name } => {
                let Session::LoggedOut { outbound } = &*session else {
                    tracing::debug!(%conn_id, %nick, "already logged in, ignoring login");
                    continue;
                };
                if let Some(next) = login(state, conn, outbound, room_name, nick).await? {
                    *session = next;
                }
            }

            msg => match &*session {
                Session::LoggedOut { .. } => {
                    tracing::debug!(%conn_id, ?msg, "game message before login, closing");
                    return Err(ProtocolError::InvalidMessage(
                        "game message before login".into(),
                    )
                    .into());
                }
                Session::LoggedIn { room, nick, .. } => {
                    room.send_message(nick, msg).await?;
                }
            },
        }
    }
}

/// Joins (or creates) the named room. Returns the new session on success;
/// a refusal is answered with `login failed` and leaves the connection
/// logged out.
async fn login<C: Codec>(
    state: &Arc<ServerState<C>>,
    conn: &LineConnection,
    outbound: &PlayerSender,
    room_name: String,
    nick: String,
) -> Result<Option<Session<C>>, MosaicError> {
    let conn_id = conn.id();
    let joined = {
        let mut rooms = state.rooms.lock().await;
        rooms.login(&room_name, &nick, outbound.clone()).await
    };

    match joined {
        Ok(room) => {
            tracing::info!(%conn_id, room = %room_name, %nick, "logged in");
            Ok(Some(Session::LoggedIn {
                room,
                guard: LeaveGuard::new(state, room_name, nick.clone()),
                nick,
            }))
        }
        Err(e) if e.is_login_refusal() => {
            tracing::info!(%conn_id, room = %room_name, %nick, cause = %e, "login refused");
            let refusal = ServerMessage::LoginFailed {
                cause: e.to_string(),
            };
            // A closed queue means the writer already ended the connection.
            let _ = outbound.send(refusal).await;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Writes queued messages to the socket, one line each. Ends when every
/// sender is gone or a write fails or stalls.
async fn write_loop<C: Codec>(
    conn: Arc<LineConnection>,
    mut inbox: mpsc::Receiver<ServerMessage>,
    state: Arc<ServerState<C>>,
) -> Result<(), MosaicError> {
    let timeout = state.config.write_timeout;
    while let Some(msg) = inbox.recv().await {
        let bytes = state.codec.encode(&msg)?;
        match tokio::time::timeout(timeout, conn.send(&bytes)).await {
            Ok(sent) => sent?,
            Err(_) => {
                tracing::warn!(conn_id = %conn.id(), "write timed out, dropping connection");
                return Err(TransportError::WriteTimeout.into());
            }
        }
    }
    tracing::debug!(conn_id = %conn.id(), "outbound queue closed");
    Ok(())
}
