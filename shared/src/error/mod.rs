//! Unified error system for the label print daemon
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by pipeline stage
//! - [`AppError`]: Error type with code and message
//! - [`ApiResponse`]: The `{"message": ...}` body returned to clients
//!
//! # Error Code Ranges
//!
//! - 0xxx: General / request errors
//! - 1xxx: Admission errors (gate contention)
//! - 2xxx: Fetch errors
//! - 3xxx: Render errors
//! - 4xxx: Print errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::with_message(ErrorCode::FetchFailed, "connection refused");
//! assert_eq!(err.http_status(), http::StatusCode::INTERNAL_SERVER_ERROR);
//!
//! let body = ApiResponse::from(err);
//! assert_eq!(body.message, "connection refused");
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
