//! Connect RPC client implementation.

use bytes::Bytes;
use connect_error_metadata_core::{
    APPLICATION_JSON, APPLICATION_PROTO, CONNECT_PROTOCOL_VERSION,
    CONNECT_PROTOCOL_VERSION_HEADER, Metadata,
};
use http::{HeaderValue, Method, Request, header};
use http_body_util::{BodyExt, Full};
use prost::Message;
use serde::{Serialize, de::DeserializeOwned};
use tracing::Instrument;

use crate::ClientError;
use crate::builder::ClientBuilder;
use crate::error_parser::parse_error_response;
use crate::response::ConnectResponse;
use crate::transport::HyperTransport;

/// Connect unary client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ConnectClient {
    transport: HyperTransport,
    base_url: String,
    use_proto: bool,
}

impl ConnectClient {
    /// Create a builder for a client targeting `base_url`.
    pub fn builder<S: Into<String>>(base_url: S) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    pub(crate) fn new(transport: HyperTransport, base_url: String, use_proto: bool) -> Self {
        Self {
            transport,
            base_url,
            use_proto,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_proto(&self) -> bool {
        self.use_proto
    }

    fn encoding_name(&self) -> &'static str {
        if self.use_proto { "proto" } else { "json" }
    }

    fn unary_content_type(&self) -> &'static str {
        if self.use_proto {
            APPLICATION_PROTO
        } else {
            APPLICATION_JSON
        }
    }

    fn encode_message<T: Message + Serialize>(&self, message: &T) -> Result<Bytes, ClientError> {
        if self.use_proto {
            Ok(Bytes::from(message.encode_to_vec()))
        } else {
            serde_json::to_vec(message)
                .map(Bytes::from)
                .map_err(|e| ClientError::Encode(format!("failed to encode JSON message: {e}")))
        }
    }

    fn decode_message<T>(&self, body: &Bytes) -> Result<T, ClientError>
    where
        T: Message + DeserializeOwned + Default,
    {
        if self.use_proto {
            T::decode(body.as_ref())
                .map_err(|e| ClientError::Decode(format!("failed to decode protobuf message: {e}")))
        } else {
            serde_json::from_slice(body)
                .map_err(|e| ClientError::Decode(format!("failed to decode JSON message: {e}")))
        }
    }

    /// Make a unary RPC call.
    ///
    /// `procedure` is the path below the base URL, e.g. `helloworld.Greeter/SayHello`.
    /// On a non-2xx response the returned [`ClientError::Status`] carries the
    /// response's header and trailer metadata.
    pub async fn call_unary<Req, Res>(
        &self,
        procedure: &str,
        request: &Req,
    ) -> Result<ConnectResponse<Res>, ClientError>
    where
        Req: Message + Serialize,
        Res: Message + DeserializeOwned + Default,
    {
        let span = tracing::info_span!(
            "rpc.call",
            rpc.method = %procedure,
            rpc.type = "unary",
            rpc.encoding = %self.encoding_name(),
        );
        self.unary_inner(procedure, request).instrument(span).await
    }

    async fn unary_inner<Req, Res>(
        &self,
        procedure: &str,
        request: &Req,
    ) -> Result<ConnectResponse<Res>, ClientError>
    where
        Req: Message + Serialize,
        Res: Message + DeserializeOwned + Default,
    {
        let body = self.encode_message(request)?;

        // Strip leading slash from procedure to avoid double slashes
        let procedure = procedure.strip_prefix('/').unwrap_or(procedure);
        let url = format!("{}/{}", self.base_url, procedure);

        let req = Request::builder()
            .method(Method::POST)
            .uri(&url)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static(self.unary_content_type()),
            )
            .header(
                CONNECT_PROTOCOL_VERSION_HEADER,
                HeaderValue::from_static(CONNECT_PROTOCOL_VERSION),
            )
            .body(Full::new(body))
            .map_err(|e| ClientError::Protocol(format!("failed to build request: {}", e)))?;

        let response = self.transport.request(req).await?;

        let status = response.status();
        let (parts, body) = response.into_parts();
        let body_bytes = body
            .collect()
            .await
            .map_err(|e| ClientError::Transport(format!("failed to read response body: {}", e)))?
            .to_bytes();
        let (header, trailer) = Metadata::split_unary(parts.headers);

        if !status.is_success() {
            let err = parse_error_response(status, &body_bytes);
            tracing::debug!(%status, code = %err.code(), "call failed");
            return Err(err.with_metadata(header, trailer));
        }

        let message = self.decode_message::<Res>(&body_bytes)?;
        Ok(ConnectResponse::new(message, header, trailer))
    }
}
