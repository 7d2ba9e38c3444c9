//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    ///
    /// Busy and bad input share 409: the browser extension only knows
    /// "409 means do not retry right now".
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 409 Conflict
            Self::Busy | Self::InvalidRequest | Self::InvalidFormat | Self::RequiredField => {
                StatusCode::CONFLICT
            }

            // 500 Internal Server Error
            Self::Unknown
            | Self::FetchFailed
            | Self::ProductNotFound
            | Self::UpstreamUnavailable
            | Self::RenderFailed
            | Self::AssetMissing
            | Self::PrintFailed
            | Self::PrinterNotAvailable
            | Self::InternalError
            | Self::TimeoutError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
        assert_eq!(ErrorCode::Busy.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::RequiredField.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::ProductNotFound.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::PrinterNotAvailable.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
