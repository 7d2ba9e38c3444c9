//! HTTP API
//!
//! | Path | Method | Purpose |
//! |------|--------|---------|
//! | any | POST | print a label for `{"url", "trailing_blank"}` |
//! | any | OPTIONS | CORS preflight, answered by the CORS layer |
//! | /health | GET | liveness and whether a job is running |
//! | /health | POST | prints, same as any other path |

pub mod health;
pub mod print;

use axum::{Router, body::Body, middleware, response::Response};
use http::{HeaderValue, Method, StatusCode, header};
use shared::ApiResponse;
use tower_http::cors::{Any, CorsLayer};

use crate::core::ServerState;

async fn log_request(request: http::Request<Body>, next: middleware::Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());

    response
}

/// CORS for the browser extension: any origin, JSON POSTs
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Build the router with state attached
pub fn build_app(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(print::router())
        // CORS answers every OPTIONS before routing
        .layer(cors_layer())
        // Request logging - outermost
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// JSON response, `None` for an empty body
pub(crate) fn json_response(status: StatusCode, body: Option<ApiResponse>) -> Response {
    let body = match body {
        Some(message) => match serde_json::to_vec(&message) {
            Ok(bytes) => Body::from(bytes),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode response");
                Body::empty()
            }
        },
        None => Body::empty(),
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
