//! Response types for Connect.
use crate::error::{ConnectError, internal_error_response};
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use connect_error_metadata_core::{RequestProtocol, TRAILER_PREFIX};
use prost::Message;
use serde::Serialize;

/// Response wrapper for Connect RPC handlers.
///
/// Besides the message, a response may carry header metadata and trailer
/// metadata. Unary trailers travel as `trailer-` prefixed headers.
#[derive(Debug, Clone)]
pub struct ConnectResponse<T> {
    inner: T,
    headers: HeaderMap,
    trailers: HeaderMap,
}

impl<T> ConnectResponse<T> {
    /// Create a new ConnectResponse wrapping the given value.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            headers: HeaderMap::new(),
            trailers: HeaderMap::new(),
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Extract the inner value from the ConnectResponse wrapper.
    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn trailers(&self) -> &HeaderMap {
        &self.trailers
    }

    /// Append header metadata. Invalid names or values are dropped.
    pub fn with_header<K: AsRef<str>, V: AsRef<str>>(mut self, key: K, value: V) -> Self {
        append_meta(&mut self.headers, key.as_ref(), value.as_ref());
        self
    }

    /// Append trailer metadata. Invalid names or values are dropped.
    pub fn with_trailer<K: AsRef<str>, V: AsRef<str>>(mut self, key: K, value: V) -> Self {
        append_meta(&mut self.trailers, key.as_ref(), value.as_ref());
        self
    }
}

fn append_meta(map: &mut HeaderMap, key: &str, value: &str) {
    match (
        HeaderName::from_bytes(key.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            map.append(name, value);
        }
        _ => {
            tracing::debug!(key, "invalid response metadata, dropped");
        }
    }
}

impl<T> ConnectResponse<T>
where
    T: Message + Serialize,
{
    /// Encode the response with the encoding of the request it answers.
    pub(crate) fn into_response_with_protocol(self, protocol: RequestProtocol) -> Response {
        let body: Bytes = if protocol.is_proto() {
            Bytes::from(self.inner.encode_to_vec())
        } else {
            match serde_json::to_vec(&self.inner) {
                Ok(bytes) => Bytes::from(bytes),
                Err(_) => return internal_error_response(protocol.error_content_type()),
            }
        };

        let mut response = match Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static(protocol.response_content_type()),
            )
            .body(Body::from(body))
        {
            Ok(response) => response,
            Err(_) => return internal_error_response(protocol.error_content_type()),
        };

        let headers = response.headers_mut();
        headers.extend(self.headers);

        let mut current: Option<HeaderName> = None;
        for (name, value) in self.trailers {
            if let Some(name) = name {
                current = Some(name);
            }
            let Some(name) = current.as_ref() else {
                continue;
            };
            let prefixed = format!("{TRAILER_PREFIX}{}", name.as_str());
            if let Ok(prefixed) = HeaderName::from_bytes(prefixed.as_bytes()) {
                headers.append(prefixed, value);
            }
        }

        response
    }
}

impl<T> IntoResponse for ConnectResponse<T>
where
    T: Message + Serialize,
{
    fn into_response(self) -> Response {
        self.into_response_with_protocol(RequestProtocol::default())
    }
}

// So that `Result<ConnectResponse<T>, ConnectError>` can be returned from handlers.
impl<T> From<ConnectResponse<T>> for Result<ConnectResponse<T>, ConnectError> {
    fn from(res: ConnectResponse<T>) -> Self {
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[derive(Clone, PartialEq, ::prost::Message, serde::Serialize)]
    struct Pong {
        #[prost(string, tag = "1")]
        text: String,
    }

    fn pong() -> Pong {
        Pong {
            text: "hi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_json_response() {
        let response = ConnectResponse::new(pong())
            .into_response_with_protocol(RequestProtocol::ConnectUnaryJson);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"text":"hi"}"#);
    }

    #[tokio::test]
    async fn test_proto_response() {
        let response = ConnectResponse::new(pong())
            .into_response_with_protocol(RequestProtocol::ConnectUnaryProto);

        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/proto"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(Pong::decode(body).unwrap(), pong());
    }

    #[test]
    fn test_trailers_are_prefixed() {
        let response = ConnectResponse::new(pong())
            .with_header("custom-key", "value")
            .with_trailer("x-checksum", "a")
            .with_trailer("x-checksum", "b")
            .with_trailer("bad key", "dropped")
            .into_response();

        let headers = response.headers();
        assert_eq!(headers.get("custom-key").unwrap(), "value");
        let trailers: Vec<_> = headers.get_all("trailer-x-checksum").iter().collect();
        assert_eq!(trailers, vec!["a", "b"]);
        assert!(headers.get("x-checksum").is_none());
    }
}
