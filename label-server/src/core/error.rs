use thiserror::Error;

/// Startup and serving errors
///
/// Request-level failures never surface here; they are answered as
/// HTTP responses by the handlers.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Printer setup failed: {0}")]
    Printer(#[from] label_printer::PrintError),

    #[error("Fetcher setup failed: {0}")]
    Fetcher(#[from] crate::scraper::FetchError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
