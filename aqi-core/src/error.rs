//! Failure kinds surfaced by the API client and the response decoder.

use thiserror::Error;

/// Closed set of ways a fetch can fail.
///
/// Every failure in [`crate::client`] or [`crate::decode`] is reported as
/// exactly one of these. Nothing is retried internally.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchError {
    #[error("configured API host cannot form a valid request URL")]
    InvalidUrl,

    #[error("request failed")]
    RequestFailed,

    #[error("response body could not be decoded")]
    DecodingFailed,

    #[error("API quota exceeded")]
    OverQuota,

    #[error("API key rejected")]
    InvalidKey,

    #[error("unknown error")]
    UnknownError,

    #[error("response body was empty")]
    InvalidData,
}

impl FetchError {
    /// Stable upper-case identifier, e.g. `"OVER_QUOTA"`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "INVALID_URL",
            Self::RequestFailed => "REQUEST_FAILED",
            Self::DecodingFailed => "DECODING_FAILED",
            Self::OverQuota => "OVER_QUOTA",
            Self::InvalidKey => "INVALID_KEY",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::InvalidData => "INVALID_DATA",
        }
    }

    /// User-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrl => "The API host in your configuration is not valid.".to_string(),
            Self::RequestFailed => {
                "Could not reach the air-quality service. Check your connection.".to_string()
            }
            Self::DecodingFailed => "The air-quality service sent an unexpected response.".to_string(),
            Self::OverQuota => "Request quota exceeded. Please try again later.".to_string(),
            Self::InvalidKey => "Your API token was rejected. Please check your configuration.".to_string(),
            Self::UnknownError => "An unknown error occurred.".to_string(),
            Self::InvalidData => "The air-quality service returned no data.".to_string(),
        }
    }

    pub const fn all() -> &'static [FetchError] {
        &[
            Self::InvalidUrl,
            Self::RequestFailed,
            Self::DecodingFailed,
            Self::OverQuota,
            Self::InvalidKey,
            Self::UnknownError,
            Self::InvalidData,
        ]
    }
}
