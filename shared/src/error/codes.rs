//! Unified error codes
//!
//! Error codes are organized by the pipeline stage that raises them:
//! - 0xxx: General / request errors
//! - 1xxx: Admission errors
//! - 2xxx: Fetch errors
//! - 3xxx: Render errors
//! - 4xxx: Print errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values so the browser client and logs share one
/// numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format (body is not JSON, wrong field type)
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Admission ====================
    /// A print job is already running
    Busy = 1001,

    // ==================== 2xxx: Fetch ====================
    /// Fetching the product page failed
    FetchFailed = 2001,
    /// The page did not contain a product
    ProductNotFound = 2002,
    /// Upstream kept answering 503
    UpstreamUnavailable = 2003,

    // ==================== 3xxx: Render ====================
    /// Rendering the label failed
    RenderFailed = 3001,
    /// A font or image asset is missing
    AssetMissing = 3002,

    // ==================== 4xxx: Print ====================
    /// Sending the document to the printer failed
    PrintFailed = 4001,
    /// The printer could not be reached
    PrinterNotAvailable = 4002,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    TimeoutError = 9002,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Success",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",

            // Admission
            ErrorCode::Busy => "Already processing a print job",

            // Fetch
            ErrorCode::FetchFailed => "Failed to fetch product page",
            ErrorCode::ProductNotFound => "No product found on page",
            ErrorCode::UpstreamUnavailable => "Product site unavailable",

            // Render
            ErrorCode::RenderFailed => "Failed to render label",
            ErrorCode::AssetMissing => "Label asset is missing",

            // Print
            ErrorCode::PrintFailed => "Failed to print label",
            ErrorCode::PrinterNotAvailable => "Printer is not available",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),

            1001 => Ok(ErrorCode::Busy),

            2001 => Ok(ErrorCode::FetchFailed),
            2002 => Ok(ErrorCode::ProductNotFound),
            2003 => Ok(ErrorCode::UpstreamUnavailable),

            3001 => Ok(ErrorCode::RenderFailed),
            3002 => Ok(ErrorCode::AssetMissing),

            4001 => Ok(ErrorCode::PrintFailed),
            4002 => Ok(ErrorCode::PrinterNotAvailable),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::Busy.code(), 1001);
        assert_eq!(ErrorCode::FetchFailed.code(), 2001);
        assert_eq!(ErrorCode::RenderFailed.code(), 3001);
        assert_eq!(ErrorCode::PrintFailed.code(), 4001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_u16() {
        assert_eq!(ErrorCode::try_from(1001), Ok(ErrorCode::Busy));
        assert_eq!(ErrorCode::try_from(3002), Ok(ErrorCode::AssetMissing));
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::ProductNotFound).unwrap();
        assert_eq!(json, "2002");
        let code: ErrorCode = serde_json::from_str("4002").unwrap();
        assert_eq!(code, ErrorCode::PrinterNotAvailable);
        assert!(serde_json::from_str::<ErrorCode>("4242").is_err());
    }

    #[test]
    fn test_success_message() {
        assert!(ErrorCode::Success.is_success());
        assert_eq!(ErrorCode::Success.message(), "Success");
    }
}
