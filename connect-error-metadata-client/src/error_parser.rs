//! Error response parsing for Connect protocol.
//!
//! Parses JSON error responses from Connect servers into [`ClientError`].

use bytes::Bytes;
use connect_error_metadata_core::Code;
use http::StatusCode;
use serde::Deserialize;

use crate::ClientError;

/// Parse the body of a non-2xx unary response.
///
/// Connect protocol error responses have the format:
/// ```json
/// {
///   "code": "unimplemented",
///   "message": "unimplemented",
///   "details": []
/// }
/// ```
///
/// If the body cannot be parsed as a Connect error, the code is derived from
/// the HTTP status instead.
pub(crate) fn parse_error_response(status: StatusCode, body: &Bytes) -> ClientError {
    match serde_json::from_slice::<ErrorResponseJson>(body) {
        Ok(error_json) => {
            let code = error_json
                .code
                .as_deref()
                .and_then(|code| code.parse().ok())
                .unwrap_or_else(|| Code::from_http_status(status));

            match error_json.message {
                Some(message) => ClientError::new(code, message),
                None => ClientError::from_code(code),
            }
        }
        Err(_) => {
            let code = Code::from_http_status(status);
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("Unknown error")
            } else {
                std::str::from_utf8(body).unwrap_or("Unknown error")
            };
            ClientError::new(code, message)
        }
    }
}

/// JSON structure for Connect error responses. `details` is accepted and ignored.
#[derive(Deserialize)]
struct ErrorResponseJson {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}
