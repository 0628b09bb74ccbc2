use std::collections::BTreeMap;

use pong_shared::config::ArenaConfig;
use pong_shared::protocol::{BallWire, GameStateMsg, PlayerWire};

use crate::participant::ParticipantId;

/// Ball state. Units are arena units per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl Ball {
    pub fn spawn(arena: &ArenaConfig) -> Self {
        Self {
            x: arena.ball_start_x,
            y: arena.ball_start_y,
            vx: arena.ball_vx,
            vy: arena.ball_vy,
        }
    }

    /// Advance one tick. Only the horizontal walls at 0 and `height` reflect;
    /// the ball is free to leave the arena sideways.
    pub fn step(&mut self, height: f64) {
        self.x += self.vx;
        self.y += self.vy;

        if self.y <= 0.0 || self.y >= height {
            self.vy = -self.vy;
        }
    }

    pub fn to_wire(&self) -> BallWire {
        BallWire {
            x: self.x,
            y: self.y,
            vx: self.vx,
            vy: self.vy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    /// Unclamped vertical paddle offset
    pub paddle_y: f64,
    pub score: u32,
}

impl PlayerState {
    pub fn to_wire(&self) -> PlayerWire {
        PlayerWire {
            paddle_y: self.paddle_y,
            score: self.score,
        }
    }
}

/// One isolated game session.
#[derive(Debug, Clone)]
pub struct Room {
    pub players: BTreeMap<ParticipantId, PlayerState>,
    pub ball: Ball,
}

impl Room {
    pub fn new(arena: &ArenaConfig) -> Self {
        Self {
            players: BTreeMap::new(),
            ball: Ball::spawn(arena),
        }
    }

    pub fn snapshot(&self) -> GameStateMsg {
        GameStateMsg {
            players: self
                .players
                .iter()
                .map(|(id, p)| (id.to_string(), p.to_wire()))
                .collect(),
            ball: self.ball.to_wire(),
        }
    }
}
