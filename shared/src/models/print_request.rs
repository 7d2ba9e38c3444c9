//! Print request model

use crate::error::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};

/// One label print request, as posted by the browser extension
///
/// ```json
/// { "url": "https://topsale.am/product/.../20713/", "trailing_blank": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintRequest {
    pub url: String,
    /// Feed one blank page after the label
    pub trailing_blank: bool,
}

/// `trailing_blank` as it appears on the wire: the extension sends `1`/`0`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TrailingBlankFlag {
    Bool(bool),
    Number(f64),
}

impl From<TrailingBlankFlag> for bool {
    fn from(flag: TrailingBlankFlag) -> Self {
        match flag {
            TrailingBlankFlag::Bool(b) => b,
            TrailingBlankFlag::Number(n) => n != 0.0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPrintRequest {
    url: Option<String>,
    trailing_blank: Option<TrailingBlankFlag>,
}

impl PrintRequest {
    pub fn new(url: impl Into<String>, trailing_blank: bool) -> Self {
        Self {
            url: url.into(),
            trailing_blank,
        }
    }

    /// Parse a raw request body
    ///
    /// Both fields are required; `null` counts as missing.
    pub fn from_json_slice(body: &[u8]) -> AppResult<Self> {
        let raw: RawPrintRequest = serde_json::from_slice(body).map_err(|e| {
            AppError::with_message(
                ErrorCode::InvalidFormat,
                format!("Malformed request body: {}", e),
            )
        })?;

        let url = raw.url.ok_or_else(|| AppError::required_field("url"))?;
        let trailing_blank = raw
            .trailing_blank
            .ok_or_else(|| AppError::required_field("trailing_blank"))?;

        Ok(Self {
            url,
            trailing_blank: trailing_blank.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_flag() {
        let req =
            PrintRequest::from_json_slice(br#"{"url":"https://a.b/c","trailing_blank":true}"#)
                .unwrap();
        assert_eq!(req, PrintRequest::new("https://a.b/c", true));
    }

    #[test]
    fn test_parse_numeric_flag() {
        let req = PrintRequest::from_json_slice(br#"{"url":"u","trailing_blank":1}"#).unwrap();
        assert!(req.trailing_blank);
        let req = PrintRequest::from_json_slice(br#"{"url":"u","trailing_blank":0}"#).unwrap();
        assert!(!req.trailing_blank);
    }

    #[test]
    fn test_missing_fields() {
        let err = PrintRequest::from_json_slice(br#"{"trailing_blank":false}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert!(err.message.contains("url"));

        let err = PrintRequest::from_json_slice(br#"{"url":"u"}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert!(err.message.contains("trailing_blank"));

        let err =
            PrintRequest::from_json_slice(br#"{"url":"u","trailing_blank":null}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    #[test]
    fn test_malformed_body() {
        for body in [&b""[..], b"not json", b"[1,2]", br#"{"url":5,"trailing_blank":true}"#] {
            let err = PrintRequest::from_json_slice(body).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidFormat, "body: {:?}", body);
        }
    }

    #[test]
    fn test_string_flag_is_rejected() {
        let err = PrintRequest::from_json_slice(br#"{"url":"u","trailing_blank":"yes"}"#)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }
}
