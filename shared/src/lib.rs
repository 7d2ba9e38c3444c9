//! Shared types for the label print daemon
//!
//! Types `label-server` shares with its HTTP clients: the request and
//! product models, the unified error codes and the JSON message body every
//! endpoint answers with.

pub mod error;
pub mod models;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{PrintRequest, ProductRecord};
