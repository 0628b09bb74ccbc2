use std::collections::HashSet;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::game_loop::{GameBroadcast, GameCommand};
use pong_shared::protocol::{ClientMsg, RejectedMsg, ServerMsg, YourIdMsg};

/// Text frames longer than this close the connection
pub const MAX_MESSAGE_SIZE: usize = 1024;
/// Unparseable frames tolerated before the connection is closed
pub const MAX_PARSE_ERRORS: u32 = 5;

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub game_tx: mpsc::Sender<GameCommand>,
    pub broadcast_tx: broadcast::Sender<GameBroadcast>,
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, app_state))
}

async fn send_msg(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sink.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            true
        }
    }
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut sink, mut stream) = socket.split();

    // Subscribe before joining anything so the join snapshot is not missed
    let mut broadcast_rx = app_state.broadcast_tx.subscribe();

    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .game_tx
        .send(GameCommand::Connect { response: resp_tx })
        .await
        .is_err()
    {
        tracing::error!("Failed to send Connect command");
        return;
    }

    let my_id = match resp_rx.await {
        Ok(id) => id,
        Err(_) => {
            tracing::error!("Failed to receive participant id");
            return;
        }
    };

    tracing::info!("Participant {} connected", my_id);

    let greeted = send_msg(
        &mut sink,
        &ServerMsg::YourId(YourIdMsg {
            id: my_id.to_string(),
        }),
    )
    .await;

    if !greeted {
        let _ = app_state
            .game_tx
            .send(GameCommand::Disconnect { participant: my_id })
            .await;
        return;
    }

    let mut joined: HashSet<String> = HashSet::new();
    let mut parse_errors: u32 = 0;

    loop {
        tokio::select! {
            // Client -> Server
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let text = text.as_str();
                        if text.len() > MAX_MESSAGE_SIZE {
                            tracing::warn!(
                                "Participant {} sent oversized message ({} bytes), closing",
                                my_id,
                                text.len()
                            );
                            break;
                        }

                        let client_msg = match serde_json::from_str::<ClientMsg>(text) {
                            Ok(m) => m,
                            Err(e) => {
                                parse_errors += 1;
                                tracing::warn!("Participant {} sent invalid message: {}", my_id, e);
                                if parse_errors > MAX_PARSE_ERRORS {
                                    tracing::warn!("Participant {} exceeded parse error limit, closing", my_id);
                                    break;
                                }
                                continue;
                            }
                        };

                        match client_msg {
                            ClientMsg::JoinGame { room_id } => {
                                joined.insert(room_id.clone());
                                if app_state.game_tx.send(GameCommand::JoinRoom {
                                    participant: my_id.clone(),
                                    room_id,
                                }).await.is_err() {
                                    tracing::error!("Failed to send JoinRoom command");
                                    break;
                                }
                            }
                            ClientMsg::PaddleMove { room_id, paddle_y } => {
                                let (resp_tx, resp_rx) = oneshot::channel();
                                if app_state.game_tx.send(GameCommand::PaddleMove {
                                    participant: my_id.clone(),
                                    room_id,
                                    paddle_y,
                                    response: resp_tx,
                                }).await.is_err() {
                                    tracing::error!("Failed to send PaddleMove command");
                                    break;
                                }
                                if let Ok(Err(e)) = resp_rx.await {
                                    let rejected = ServerMsg::Rejected(RejectedMsg { reason: e.into() });
                                    if !send_msg(&mut sink, &rejected).await {
                                        break;
                                    }
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("Participant {} socket error: {}", my_id, e);
                        break;
                    }
                    _ => {} // Ignore ping/pong/binary
                }
            }

            // Server -> Client (broadcast)
            result = broadcast_rx.recv() => {
                match result {
                    Ok(GameBroadcast::Tick(frames)) => {
                        let mut sent = true;
                        for room_id in &joined {
                            if let Some(frame) = frames.get(room_id) {
                                sent = sink.send(Message::Text(frame.clone())).await.is_ok();
                                if !sent {
                                    break;
                                }
                            }
                        }
                        if !sent {
                            break;
                        }
                    }
                    Ok(GameBroadcast::Joined { room_id, frame }) => {
                        if !joined.contains(&room_id) {
                            continue; // Not a room this client joined
                        }
                        if sink.send(Message::Text(frame)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Participant {} lagged by {} messages", my_id, n);
                        // Continue - every tick carries full state, dropping is fine
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    // Cleanup on disconnect
    let _ = app_state
        .game_tx
        .send(GameCommand::Disconnect {
            participant: my_id.clone(),
        })
        .await;
    tracing::info!("Participant {} disconnected", my_id);
}
