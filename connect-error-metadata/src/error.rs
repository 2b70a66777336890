//! [`ConnectError`] and its unary wire form: a JSON body plus metadata headers.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use connect_error_metadata_core::{Code, ErrorResponseBody, RequestProtocol};

/// An error that captures the key pieces of information for a Connect RPC:
/// a code, an optional message, and metadata sent as HTTP headers.
#[derive(Clone, Debug)]
pub struct ConnectError {
    code: Code,
    message: Option<String>,
    meta: Option<HeaderMap>,
}

impl ConnectError {
    /// Create a new error with a code and message.
    pub fn new<S: Into<String>>(code: Code, message: S) -> Self {
        Self {
            code,
            message: Some(message.into()),
            meta: None,
        }
    }

    /// Create a new error with just a code.
    pub fn from_code(code: Code) -> Self {
        Self {
            code,
            message: None,
            meta: None,
        }
    }

    /// Create an invalid argument error.
    pub fn new_invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    /// Get the error code.
    pub fn code(&self) -> Code {
        self.code
    }

    /// Get the error message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Get the metadata headers, if any.
    pub fn meta(&self) -> Option<&HeaderMap> {
        self.meta.as_ref()
    }

    /// Get mutable access to metadata headers.
    /// Lazily initializes the HeaderMap if not present.
    pub fn meta_mut(&mut self) -> &mut HeaderMap {
        self.meta.get_or_insert_with(HeaderMap::new)
    }

    /// Add a metadata header. Repeated keys append rather than replace.
    ///
    /// Entries that are not valid HTTP header names or values are dropped.
    pub fn with_meta<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let key_str = key.as_ref();
        let val_str = value.as_ref();

        match HeaderName::from_bytes(key_str.as_bytes()) {
            Ok(name) => match HeaderValue::from_str(val_str) {
                Ok(val) => {
                    self.meta_mut().append(name, val);
                }
                Err(e) => {
                    tracing::debug!(
                        key = key_str,
                        value = val_str,
                        error = %e,
                        "invalid header value, metadata dropped"
                    );
                }
            },
            Err(e) => {
                tracing::debug!(
                    key = key_str,
                    error = %e,
                    "invalid header name, metadata dropped"
                );
            }
        }
        self
    }

    /// Convert this error into a unary HTTP response.
    ///
    /// The body is always JSON. Metadata entries are appended to the response
    /// headers after the protocol headers are set.
    pub(crate) fn into_response_with_protocol(self, protocol: RequestProtocol) -> Response {
        let status_code = self.code.http_status();
        let content_type = protocol.error_content_type();

        let body = ErrorResponseBody {
            code: self.code,
            message: self.message,
        };
        let bytes = match body.to_json() {
            Ok(bytes) => bytes,
            Err(_) => return internal_error_response(content_type),
        };

        let mut response = Response::builder()
            .status(status_code)
            .header(header::CONTENT_TYPE, HeaderValue::from_static(content_type))
            .body(Body::from(bytes))
            .unwrap_or_else(|_| internal_error_response(content_type));

        if let Some(meta) = self.meta {
            let headers = response.headers_mut();
            headers.extend(meta);
        }

        response
    }
}

impl std::fmt::Display for ConnectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)?;
        if let Some(msg) = &self.message {
            write!(f, ": {}", msg)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConnectError {}

impl IntoResponse for ConnectError {
    fn into_response(self) -> Response {
        // Handler wrappers use into_response_with_protocol(); unary errors are
        // JSON either way.
        self.into_response_with_protocol(RequestProtocol::default())
    }
}

impl From<std::convert::Infallible> for ConnectError {
    fn from(infallible: std::convert::Infallible) -> Self {
        match infallible {}
    }
}

/// The gRPC form of a Connect error. Metadata travels with the status, so a
/// gRPC caller sees the same entries a Connect caller gets as headers.
#[cfg(feature = "tonic")]
impl From<ConnectError> for ::tonic::Status {
    fn from(err: ConnectError) -> Self {
        let code: ::tonic::Code = err.code.into();
        let message = err.message.unwrap_or_default();
        match err.meta {
            Some(meta) => ::tonic::Status::with_metadata(
                code,
                message,
                ::tonic::metadata::MetadataMap::from_headers(meta),
            ),
            None => ::tonic::Status::new(code, message),
        }
    }
}

/// Create a safe 500 Internal Server Error response.
///
/// Used when serialization fails and no proper ConnectError response can be
/// produced.
pub(crate) fn internal_error_response(content_type: &'static str) -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, HeaderValue::from_static(content_type))
        .body(Body::from(ErrorResponseBody::INTERNAL_FALLBACK))
        .unwrap_or_else(|_| {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
}
