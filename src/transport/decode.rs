use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, ErrorCode, Result};

/// Error body returned with non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    request_id: String,
}

/// Maps a terminal response to a payload or an [`Error`].
///
/// A 2xx with a zero-length body yields `Ok(None)`. Whitespace is not empty
/// and fails as malformed JSON.
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<Option<T>> {
    if !status.is_success() {
        return Err(decode_error(status, body));
    }
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some).map_err(|e| {
        Error::with_cause(
            ErrorCode::Unknown,
            "failed to unmarshal response body",
            e,
            status,
        )
    })
}

/// Like [`decode`], with an empty body becoming `T::default()`.
pub fn decode_into_default<T: DeserializeOwned + Default>(
    status: StatusCode,
    body: &[u8],
) -> Result<T> {
    decode(status, body).map(Option::unwrap_or_default)
}

fn decode_error(status: StatusCode, body: &[u8]) -> Error {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(env) if !env.code.is_empty() || !env.message.is_empty() => {
            let code = if env.code.is_empty() {
                ErrorCode::Unknown
            } else {
                ErrorCode::from(env.code)
            };
            Error::with_request_id(code, env.message, env.request_id, status)
        }
        _ => Error::new(
            ErrorCode::Unknown,
            format!(
                "unexpected {} response: {}",
                status.as_u16(),
                String::from_utf8_lossy(body)
            ),
            status,
        ),
    }
}
