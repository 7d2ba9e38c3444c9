//! Product page scraper
//!
//! - [`extract`] - pulls product fields out of a product page
//! - [`fetcher`] - HTTP fetching with 503 retries and an image cache

pub mod extract;
pub mod fetcher;

pub use extract::{ProductPage, parse_product_page};
pub use fetcher::HttpProductFetcher;

use shared::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid product URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },

    #[error("No product found on {0}")]
    ProductNotFound(String),

    #[error("Could not parse product page: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Upstream could not be reached or kept failing
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ProductNotFound(_) => ErrorCode::ProductNotFound,
            Self::Status { status: 503, .. } => ErrorCode::UpstreamUnavailable,
            Self::Http(e) if e.is_connect() || e.is_timeout() => ErrorCode::UpstreamUnavailable,
            _ => ErrorCode::FetchFailed,
        }
    }
}
