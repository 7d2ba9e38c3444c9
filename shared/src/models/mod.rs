//! Data models
//!
//! Transient per-job values: nothing here outlives one pipeline run.

pub mod print_request;
pub mod product;

// Re-exports
pub use print_request::*;
pub use product::*;
