//! Health check
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "busy": false }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::print::print_label;
use crate::core::ServerState;

/// POST on `/health` prints like any other path
pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health).post(print_label))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// A print job holds the gate
    busy: bool,
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        busy: state.gate.is_held(),
    })
}
