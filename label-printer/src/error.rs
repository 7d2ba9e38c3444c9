//! Label printing errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrintError {
    /// Printer refused or dropped the connection
    #[error("Printer unreachable: {0}")]
    Connection(String),

    #[error("Printer did not respond in time: {0}")]
    Timeout(String),

    #[error("Printer setup invalid: {0}")]
    InvalidConfig(String),

    /// Spooler command missing or exited unsuccessfully
    #[error("Print command failed: {0}")]
    Command(String),

    #[error("Label image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Label font unusable: {0}")]
    Font(String),

    #[error("Cannot encode barcode: {0}")]
    Barcode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PrintError {
    /// Whether the printer itself could not be reached
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }
}

pub type PrintResult<T> = Result<T, PrintError>;
