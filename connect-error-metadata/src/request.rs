//! Extractor for Connect unary requests.
use crate::error::ConnectError;
use axum::{
    extract::{FromRequest, Request},
    http::{HeaderMap, Method},
};
use bytes::Bytes;
use connect_error_metadata_core::{
    CONNECT_PROTOCOL_VERSION, CONNECT_PROTOCOL_VERSION_HEADER, Code, RequestProtocol,
};
use prost::Message;
use serde::de::DeserializeOwned;

/// Largest request body accepted before decoding.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Connect request wrapper for extracting a single message from an HTTP request.
#[derive(Debug, Clone)]
pub struct ConnectRequest<T>(pub T);

impl<T> ConnectRequest<T> {
    /// Extract the inner message.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<S, T> FromRequest<S> for ConnectRequest<T>
where
    S: Send + Sync,
    T: Message + DeserializeOwned + Default,
{
    type Rejection = ConnectError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if req.method() != Method::POST {
            return Err(ConnectError::new(
                Code::Unimplemented,
                "HTTP method not supported",
            ));
        }

        validate_protocol_version(req.headers())?;
        let protocol = validate_content_type(req.headers())?;

        let body = axum::body::to_bytes(req.into_body(), DEFAULT_MAX_MESSAGE_SIZE)
            .await
            .map_err(|e| {
                ConnectError::new(
                    Code::ResourceExhausted,
                    format!("failed to read request body: {e}"),
                )
            })?;

        decode_message(&body, protocol).map(ConnectRequest)
    }
}

/// The version header is optional, but when present it must be "1".
pub(crate) fn validate_protocol_version(headers: &HeaderMap) -> Result<(), ConnectError> {
    let Some(value) = headers.get(CONNECT_PROTOCOL_VERSION_HEADER) else {
        return Ok(());
    };
    let version = value.to_str().unwrap_or_default();
    if version != CONNECT_PROTOCOL_VERSION {
        return Err(ConnectError::new_invalid_argument(format!(
            "connect-protocol-version must be \"{CONNECT_PROTOCOL_VERSION}\": got \"{version}\""
        )));
    }
    Ok(())
}

pub(crate) fn validate_content_type(headers: &HeaderMap) -> Result<RequestProtocol, ConnectError> {
    match RequestProtocol::from_headers(headers) {
        RequestProtocol::Unknown => Err(ConnectError::new(
            Code::Unknown,
            "unsupported content-type",
        )),
        RequestProtocol::ConnectStream => Err(ConnectError::new(
            Code::Unknown,
            "streaming content-type not allowed for unary RPC",
        )),
        protocol => Ok(protocol),
    }
}

fn decode_message<T>(body: &Bytes, protocol: RequestProtocol) -> Result<T, ConnectError>
where
    T: Message + DeserializeOwned + Default,
{
    if protocol.is_proto() {
        T::decode(body.as_ref()).map_err(|e| {
            ConnectError::new_invalid_argument(format!("failed to decode protobuf message: {e}"))
        })
    } else {
        serde_json::from_slice(body).map_err(|e| {
            ConnectError::new_invalid_argument(format!("failed to decode JSON message: {e}"))
        })
    }
}
