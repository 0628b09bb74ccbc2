use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "yourId")]
    YourId(YourIdMsg),
    #[serde(rename = "gameState")]
    GameState(GameStateMsg),
    #[serde(rename = "rejected")]
    Rejected(RejectedMsg),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
pub struct YourIdMsg {
    pub id: String,
}

/// Full room snapshot, sent on join and on every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
pub struct GameStateMsg {
    pub players: BTreeMap<String, PlayerWire>,
    pub ball: BallWire,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PlayerWire {
    pub paddle_y: f64,
    pub score: u32,
}

/// Ball position and velocity. Velocity is part of the payload even though
/// renderers only need the position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
pub struct BallWire {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
pub struct RejectedMsg {
    pub reason: RejectReason,
}

/// Why a client request left room state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    RoomNotFound,
    ParticipantNotFound,
    InvalidPaddlePosition,
}

// === Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(tag = "type")]
pub enum ClientMsg {
    #[serde(rename = "joinGame")]
    JoinGame {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    #[serde(rename = "paddleMove")]
    PaddleMove {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(rename = "paddleY")]
        paddle_y: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> GameStateMsg {
        let mut players = BTreeMap::new();
        players.insert(
            "abc".to_string(),
            PlayerWire {
                paddle_y: 150.0,
                score: 0,
            },
        );
        GameStateMsg {
            players,
            ball: BallWire {
                x: 300.0,
                y: 200.0,
                vx: 3.0,
                vy: 3.0,
            },
        }
    }

    #[test]
    fn game_state_wire_shape() {
        let msg = ServerMsg::GameState(sample_state());
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "gameState");
        assert_eq!(value["players"]["abc"]["paddleY"], 150.0);
        assert_eq!(value["players"]["abc"]["score"], 0);
        assert_eq!(value["ball"]["x"], 300.0);
        assert_eq!(value["ball"]["vy"], 3.0);
    }

    #[test]
    fn game_state_roundtrip() {
        let json = serde_json::to_string(&ServerMsg::GameState(sample_state())).unwrap();
        match serde_json::from_str::<ServerMsg>(&json).unwrap() {
            ServerMsg::GameState(state) => assert_eq!(state, sample_state()),
            other => panic!("Expected GameState, got {:?}", other),
        }
    }

    #[test]
    fn your_id_wire_shape() {
        let msg = ServerMsg::YourId(YourIdMsg {
            id: "xyz".to_string(),
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"yourId","id":"xyz"}"#);
    }

    #[test]
    fn rejected_reason_is_camel_case() {
        let msg = ServerMsg::Rejected(RejectedMsg {
            reason: RejectReason::ParticipantNotFound,
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"rejected","reason":"participantNotFound"}"#);
    }

    #[test]
    fn client_join_game_parses() {
        let parsed: ClientMsg = serde_json::from_str(r#"{"type":"joinGame","roomId":"room1"}"#).unwrap();
        match parsed {
            ClientMsg::JoinGame { room_id } => assert_eq!(room_id, "room1"),
            other => panic!("Expected JoinGame, got {:?}", other),
        }
    }

    #[test]
    fn client_paddle_move_parses_integer_and_negative() {
        let parsed: ClientMsg =
            serde_json::from_str(r#"{"type":"paddleMove","roomId":"room1","paddleY":-40}"#).unwrap();
        match parsed {
            ClientMsg::PaddleMove { room_id, paddle_y } => {
                assert_eq!(room_id, "room1");
                assert!((paddle_y - (-40.0)).abs() < 1e-9);
            }
            other => panic!("Expected PaddleMove, got {:?}", other),
        }
    }

    #[test]
    fn client_unknown_type_rejected() {
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"ball_escaped","vx":1,"vy":2}"#).is_err());
    }
}
