//! Room manager: creates rooms on demand, routes logins, and destroys
//! rooms once their last user leaves.

use std::collections::HashMap;

use crate::room::spawn_room;
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Manages all active rooms, keyed by room name.
///
/// The server keeps one `RoomManager` behind a single lock, so finding a
/// room, creating it and joining it happen as one step: two concurrent
/// logins for the same new room name always end up in the same room.
pub struct RoomManager {
    rooms: HashMap<String, RoomHandle>,
    config: RoomConfig,
}

impl RoomManager {
    /// Creates a new, empty room manager with the default room config.
    pub fn new() -> Self {
        Self::with_config(RoomConfig::default())
    }

    /// Creates a manager whose rooms all use `config`.
    pub fn with_config(config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Logs `nick` into the room called `room_name`.
    ///
    /// A room that does not exist yet is created. On success the returned
    /// handle is the user's route for game messages. On refusal the room is
    /// left as it was, except that a room created for this login alone is
    /// destroyed again.
    pub async fn login(
        &mut self,
        room_name: &str,
        nick: &str,
        sender: PlayerSender,
    ) -> Result<RoomHandle, RoomError> {
        let created = !self.rooms.contains_key(room_name);
        let handle = match self.rooms.get(room_name) {
            Some(handle) => handle.clone(),
            None => {
                let handle = spawn_room(room_name.to_string(), self.config.clone());
                self.rooms.insert(room_name.to_string(), handle.clone());
                tracing::info!(room = %room_name, "room created");
                handle
            }
        };

        match handle.join(nick, sender).await {
            Ok(()) => Ok(handle),
            Err(e) => {
                if created {
                    let _ = self.destroy_room(room_name).await;
                }
                Err(e)
            }
        }
    }

    /// Removes `nick` from `room_name`, destroying the room if that was the
    /// last user.
    pub async fn leave(&mut self, room_name: &str, nick: &str) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .get(room_name)
            .ok_or_else(|| RoomError::NotFound(room_name.to_string()))?;

        let remaining = match handle.leave(nick).await {
            Ok(remaining) => remaining,
            Err(RoomError::Unavailable(_)) => 0,
            Err(e) => return Err(e),
        };

        if remaining == 0 {
            self.destroy_room(room_name).await?;
        }
        Ok(())
    }

    /// Returns info about a specific room.
    pub async fn get_room_info(&self, room_name: &str) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(room_name)
            .ok_or_else(|| RoomError::NotFound(room_name.to_string()))?;
        handle.get_info().await
    }

    /// Shuts down a room and forgets it.
    pub async fn destroy_room(&mut self, room_name: &str) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(room_name)
            .ok_or_else(|| RoomError::NotFound(room_name.to_string()))?;

        let _ = handle.shutdown().await;

        tracing::info!(room = %room_name, "room destroyed");
        Ok(())
    }

    /// Shuts down every room. Used on server shutdown.
    pub async fn shutdown_all(&mut self) {
        for (name, handle) in self.rooms.drain() {
            let _ = handle.shutdown().await;
            tracing::debug!(room = %name, "room shut down");
        }
    }

    /// Returns the number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all active room names.
    pub fn room_names(&self) -> Vec<String> {
        self.rooms.keys().cloned().collect()
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new()
    }
}
