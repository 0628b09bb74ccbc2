//! Room-based pong server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod config;
pub mod game_loop;
pub mod participant;
pub mod registry;
pub mod room;
pub mod ws;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

/// Build the HTTP router serving the WebSocket endpoint at `/ws`.
pub fn router(app_state: ws::AppState) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
