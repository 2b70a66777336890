//! Protocol detection for Connect unary calls.

/// The expected Connect protocol version.
pub const CONNECT_PROTOCOL_VERSION: &str = "1";

/// Header name for Connect protocol version.
pub const CONNECT_PROTOCOL_VERSION_HEADER: &str = "connect-protocol-version";

/// Prefix under which Connect unary responses carry trailer metadata.
pub const TRAILER_PREFIX: &str = "trailer-";

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_PROTO: &str = "application/proto";

/// Protocol variant detected from the incoming request.
///
/// Streaming variants are recognized only so that they can be rejected with a
/// precise error; this binding serves unary calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestProtocol {
    /// Connect unary with JSON encoding (`application/json`)
    #[default]
    ConnectUnaryJson,

    /// Connect unary with protobuf encoding (`application/proto`)
    ConnectUnaryProto,

    /// Connect streaming (`application/connect+json` or `application/connect+proto`)
    ConnectStream,

    /// Unknown or unsupported content-type.
    Unknown,
}

impl RequestProtocol {
    /// Detect protocol from a Content-Type header value.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("application/connect+") {
            Self::ConnectStream
        } else if content_type.starts_with(APPLICATION_PROTO) {
            Self::ConnectUnaryProto
        } else if content_type.starts_with(APPLICATION_JSON) {
            Self::ConnectUnaryJson
        } else {
            Self::Unknown
        }
    }

    /// Detect protocol from request headers. A missing Content-Type is `Unknown`.
    pub fn from_headers(headers: &http::HeaderMap) -> Self {
        headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(Self::from_content_type)
            .unwrap_or(Self::Unknown)
    }

    /// Response Content-Type for successful responses.
    pub fn response_content_type(&self) -> &'static str {
        match self {
            Self::ConnectUnaryProto => APPLICATION_PROTO,
            Self::ConnectUnaryJson | Self::ConnectStream | Self::Unknown => APPLICATION_JSON,
        }
    }

    /// Response Content-Type for error responses. Unary errors are always JSON.
    pub fn error_content_type(&self) -> &'static str {
        APPLICATION_JSON
    }

    /// Whether to encode message bodies as protobuf (vs JSON).
    pub fn is_proto(&self) -> bool {
        matches!(self, Self::ConnectUnaryProto)
    }
}
