//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Admission errors
/// - 2xxx: Fetch errors
/// - 3xxx: Render errors
/// - 4xxx: Print errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Admission errors (1xxx)
    Admission,
    /// Fetch errors (2xxx)
    Fetch,
    /// Render errors (3xxx)
    Render,
    /// Print errors (4xxx)
    Print,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Admission,
            2000..3000 => Self::Fetch,
            3000..4000 => Self::Render,
            4000..5000 => Self::Print,
            _ => Self::System,
        }
    }

    /// Whether errors in this category come from a pipeline stage
    pub fn is_pipeline(&self) -> bool {
        matches!(self, Self::Fetch | Self::Render | Self::Print)
    }
}

impl ErrorCode {
    /// Get the category of this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
