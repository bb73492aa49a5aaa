//! Turns a raw feed body into an [`AirQualityReading`] or a [`FetchError`].
//!
//! The feed wraps everything in `{"status": ..., "data": ...}`. A status of
//! `"error"` is a logical API failure even though the transport succeeded;
//! its message is found either at `data.message`, as a bare string in `data`,
//! or in a top-level `message` field.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{error::FetchError, model::AirQualityReading};

const ERROR_STATUS: &str = "error";
const OVER_QUOTA: &str = "Over quota";
const INVALID_KEY: &str = "Invalid key";

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    status: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    data: Option<ErrorData>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorData {
    Nested { message: String },
    Bare(String),
}

impl ErrorEnvelope {
    fn message(self) -> Option<String> {
        match self.data {
            Some(ErrorData::Nested { message }) | Some(ErrorData::Bare(message)) => Some(message),
            None => self.message,
        }
    }
}

/// Decode a raw response body.
///
/// Malformed JSON or a success payload that doesn't match the schema gives
/// [`FetchError::DecodingFailed`]. Error envelopes map to
/// [`FetchError::OverQuota`], [`FetchError::InvalidKey`] or
/// [`FetchError::UnknownError`]; an error envelope without a readable message
/// is [`FetchError::DecodingFailed`].
pub fn decode(raw_body: &str) -> Result<AirQualityReading, FetchError> {
    let envelope: FeedEnvelope = serde_json::from_str(raw_body).map_err(|e| {
        warn!(error = %e, "feed body is not a valid envelope");
        FetchError::DecodingFailed
    })?;

    if envelope.status == ERROR_STATUS {
        return Err(classify_api_error(raw_body));
    }

    serde_json::from_value(envelope.data).map_err(|e| {
        warn!(status = %envelope.status, error = %e, "feed data does not match the reading schema");
        FetchError::DecodingFailed
    })
}

fn classify_api_error(raw_body: &str) -> FetchError {
    let message = match serde_json::from_str::<ErrorEnvelope>(raw_body).map(ErrorEnvelope::message) {
        Ok(Some(message)) => message,
        Ok(None) => {
            warn!("API error envelope carries no message");
            return FetchError::DecodingFailed;
        }
        Err(e) => {
            warn!(error = %e, "API error envelope could not be parsed");
            return FetchError::DecodingFailed;
        }
    };

    debug!(%message, "API reported a logical error");

    match message.as_str() {
        OVER_QUOTA => FetchError::OverQuota,
        INVALID_KEY => FetchError::InvalidKey,
        _ => FetchError::UnknownError,
    }
}
