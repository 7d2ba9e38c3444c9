//! Print endpoint
//!
//! Any path accepts the print POST; the browser extension posts to the
//! server root. `/health` routes its POST here too.

use axum::{
    Router,
    body::{self, Body},
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use http::StatusCode;
use shared::{ApiResponse, AppError, PrintRequest};
use tracing::{info, warn};

use super::json_response;
use crate::core::ServerState;
use crate::pipeline::JobOutcome;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", post(print_label))
        .route("/{*path}", post(print_label))
}

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// POST: admit, parse, run, answer
///
/// The body is read only after admission, so a busy server answers
/// without reading it.
pub async fn print_label(State(state): State<ServerState>, body: Body) -> Response {
    let Some(permit) = state.gate.try_acquire() else {
        info!("Rejected print request, a job is running");
        return json_response(AppError::busy().http_status(), None);
    };

    let parsed = match body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => PrintRequest::from_json_slice(&bytes),
        Err(e) => Err(AppError::invalid_request(format!(
            "Could not read request body: {}",
            e
        ))),
    };

    let request = match parsed {
        Ok(request) => request,
        Err(e) => {
            permit.release();
            warn!(error = %e, "Invalid print request");
            return error_response(e);
        }
    };

    match state.pipeline.run_guarded(permit, request).await {
        JobOutcome::Success => json_response(StatusCode::OK, Some(ApiResponse::success())),
        JobOutcome::Failure(failure) => error_response(failure.into()),
    }
}

fn error_response(err: AppError) -> Response {
    err.into_response()
}
