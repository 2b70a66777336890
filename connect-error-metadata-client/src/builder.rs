//! Builder for [`ConnectClient`].

use crate::ClientError;
use crate::client::ConnectClient;
use crate::transport::HyperTransport;

/// Builder for creating a [`ConnectClient`].
///
/// # Example
///
/// ```ignore
/// let client = ConnectClient::builder("http://localhost:8080")
///     .use_proto()
///     .build()?;
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    /// Base URL for the service (e.g., "http://localhost:8080").
    base_url: String,
    /// Use protobuf encoding (true) or JSON encoding (false).
    use_proto: bool,
    http2_prior_knowledge: bool,
}

impl ClientBuilder {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            use_proto: false, // Default to JSON for broader compatibility
            http2_prior_knowledge: false,
        }
    }

    /// Use protobuf encoding for requests and responses.
    pub fn use_proto(mut self) -> Self {
        self.use_proto = true;
        self
    }

    /// Speak HTTP/2 without negotiation.
    pub fn http2_prior_knowledge(mut self) -> Self {
        self.http2_prior_knowledge = true;
        self
    }

    /// Build the client. Fails if the base URL is not an absolute http URL.
    pub fn build(self) -> Result<ConnectClient, ClientError> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        let uri: http::Uri = base_url
            .parse()
            .map_err(|e| ClientError::Protocol(format!("invalid base url {base_url:?}: {e}")))?;
        if uri.scheme_str() != Some("http") || uri.host().is_none() {
            return Err(ClientError::Protocol(format!(
                "base url must be an absolute http url: {base_url:?}"
            )));
        }

        let transport = HyperTransport::new(self.http2_prior_knowledge);
        Ok(ConnectClient::new(transport, base_url, self.use_proto))
    }
}
