use std::collections::BTreeMap;

use pong_shared::config::ArenaConfig;
use pong_shared::protocol::{GameStateMsg, RejectReason};
use thiserror::Error;

use crate::participant::ParticipantId;
use crate::room::{PlayerState, Room};

/// Why a registry operation left state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("room not found")]
    RoomNotFound,
    #[error("participant not in room")]
    ParticipantNotFound,
    #[error("paddle position is not finite")]
    InvalidPaddlePosition,
}

impl From<RegistryError> for RejectReason {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::RoomNotFound => RejectReason::RoomNotFound,
            RegistryError::ParticipantNotFound => RejectReason::ParticipantNotFound,
            RegistryError::InvalidPaddlePosition => RejectReason::InvalidPaddlePosition,
        }
    }
}

/// All rooms, owned by the game loop task.
///
/// Rooms are created on first join and live for the rest of the process,
/// even after their last participant leaves.
pub struct RoomRegistry {
    rooms: BTreeMap<String, Room>,
    arena: ArenaConfig,
}

impl RoomRegistry {
    pub fn new(arena: ArenaConfig) -> Self {
        Self {
            rooms: BTreeMap::new(),
            arena,
        }
    }

    /// Add `participant` to `room_id`, creating the room if needed.
    /// Returns the room snapshot to broadcast.
    pub fn join(&mut self, room_id: &str, participant: &ParticipantId) -> GameStateMsg {
        let arena = &self.arena;
        let room = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Room::new(arena));

        room.players.insert(
            participant.clone(),
            PlayerState {
                paddle_y: arena.paddle_start_y,
                score: 0,
            },
        );
        room.snapshot()
    }

    /// Set the paddle offset verbatim. No clamping is applied.
    pub fn move_paddle(
        &mut self,
        room_id: &str,
        participant: &ParticipantId,
        paddle_y: f64,
    ) -> Result<(), RegistryError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or(RegistryError::RoomNotFound)?;
        let player = room
            .players
            .get_mut(participant)
            .ok_or(RegistryError::ParticipantNotFound)?;
        if !paddle_y.is_finite() {
            return Err(RegistryError::InvalidPaddlePosition);
        }
        player.paddle_y = paddle_y;
        Ok(())
    }

    /// Remove `participant` from every room. Returns the rooms it was in.
    pub fn leave(&mut self, participant: &ParticipantId) -> Vec<String> {
        self.rooms
            .iter_mut()
            .filter_map(|(room_id, room)| {
                room.players
                    .remove(participant)
                    .map(|_| room_id.clone())
            })
            .collect()
    }

    /// Advance every ball by one step and return each room's snapshot in
    /// room-id order.
    pub fn tick(&mut self) -> Vec<(String, GameStateMsg)> {
        let height = self.arena.height;
        self.rooms
            .iter_mut()
            .map(|(room_id, room)| {
                room.ball.step(height);
                (room_id.clone(), room.snapshot())
            })
            .collect()
    }

    pub fn snapshot(&self, room_id: &str) -> Option<GameStateMsg> {
        self.rooms.get(room_id).map(Room::snapshot)
    }

    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn contains_room(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
