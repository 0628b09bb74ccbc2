use crate::config::ServerConfig;
use crate::participant::{ParticipantId, ParticipantIds};
use crate::registry::{RegistryError, RoomRegistry};
use axum::extract::ws::Utf8Bytes;
use pong_shared::protocol::{GameStateMsg, ServerMsg};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Commands from client connections to the game loop
pub enum GameCommand {
    Connect {
        response: oneshot::Sender<ParticipantId>,
    },
    JoinRoom {
        participant: ParticipantId,
        room_id: String,
    },
    PaddleMove {
        participant: ParticipantId,
        room_id: String,
        paddle_y: f64,
        response: oneshot::Sender<Result<(), RegistryError>>,
    },
    Disconnect {
        participant: ParticipantId,
    },
}

/// Serialized `gameState` frames keyed by room id
pub type RoomFrames = BTreeMap<String, Utf8Bytes>;

/// Broadcasts from game loop to all connections. Each connection forwards
/// only the rooms it has joined.
///
/// A tick is a single message however many rooms exist, so the channel
/// capacity bounds ticks in flight rather than rooms.
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    Tick(Arc<RoomFrames>),
    Joined { room_id: String, frame: Utf8Bytes },
}

/// Run the main game loop. Owns all room state.
pub async fn run_game_loop(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<GameBroadcast>,
    server_config: ServerConfig,
) {
    let mut registry = RoomRegistry::new(server_config.arena);
    let mut ids = ParticipantIds::new(server_config.id_seed);

    let tick_duration = Duration::from_secs_f64(1.0 / server_config.tick_rate_hz as f64);
    let mut tick_interval = tokio::time::interval(tick_duration);
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let frames: RoomFrames = registry
                    .tick()
                    .into_iter()
                    .filter_map(|(room_id, state)| Some((room_id, encode_state(state)?)))
                    .collect();
                // No subscribers is not an error; rooms keep ticking while empty
                let _ = broadcast_tx.send(GameBroadcast::Tick(Arc::new(frames)));
            }

            cmd = cmd_rx.recv() => {
                // All senders dropped: the server is shutting down
                let Some(cmd) = cmd else { break };
                handle_command(&mut registry, &mut ids, &broadcast_tx, cmd);
            }
        }
    }

    tracing::info!("Game loop ended with {} rooms", registry.room_count());
}

fn handle_command(
    registry: &mut RoomRegistry,
    ids: &mut ParticipantIds,
    broadcast_tx: &broadcast::Sender<GameBroadcast>,
    cmd: GameCommand,
) {
    match cmd {
        GameCommand::Connect { response } => {
            let id = ids.allocate();
            if response.send(id.clone()).is_err() {
                // Connection went away before learning its id
                ids.release(&id);
            }
        }
        GameCommand::JoinRoom {
            participant,
            room_id,
        } => {
            let state = registry.join(&room_id, &participant);
            tracing::info!(
                "Participant {} joined room {} ({} players)",
                participant,
                room_id,
                state.players.len()
            );
            if let Some(frame) = encode_state(state) {
                let _ = broadcast_tx.send(GameBroadcast::Joined { room_id, frame });
            }
        }
        GameCommand::PaddleMove {
            participant,
            room_id,
            paddle_y,
            response,
        } => {
            let result = registry.move_paddle(&room_id, &participant, paddle_y);
            if let Err(e) = &result {
                tracing::debug!(
                    "Ignored paddle move from {} in room {}: {}",
                    participant,
                    room_id,
                    e
                );
            }
            let _ = response.send(result);
        }
        GameCommand::Disconnect { participant } => {
            let rooms = registry.leave(&participant);
            ids.release(&participant);
            tracing::info!("Participant {} left rooms {:?}", participant, rooms);
        }
    }
}

/// Serialize a snapshot once so every connection can share the bytes.
fn encode_state(state: GameStateMsg) -> Option<Utf8Bytes> {
    match serde_json::to_string(&ServerMsg::GameState(state)) {
        Ok(json) => Some(json.into()),
        Err(e) => {
            tracing::error!("Failed to serialize game state: {}", e);
            None
        }
    }
}
