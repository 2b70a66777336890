//! Response types for Connect client.
//!
//! This module provides the [`ConnectResponse`] type which wraps RPC responses
//! along with the header and trailer metadata from the server.

use connect_error_metadata_core::Metadata;
use std::ops::Deref;

/// Response wrapper for Connect RPC client calls.
///
/// # Example
///
/// ```ignore
/// let response = client.call_unary::<Req, Res>("pkg.Service/Method", &req).await?;
///
/// // Access the response directly via Deref
/// println!("Name: {}", response.name);
///
/// if let Some(value) = response.trailer().get("x-checksum") {
///     println!("checksum: {value}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConnectResponse<T> {
    inner: T,
    header: Metadata,
    trailer: Metadata,
}

impl<T> ConnectResponse<T> {
    /// Create a new ConnectResponse with the given value and metadata.
    pub fn new(inner: T, header: Metadata, trailer: Metadata) -> Self {
        Self {
            inner,
            header,
            trailer,
        }
    }

    /// Extract the inner value, discarding metadata.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Response headers, excluding `trailer-` entries.
    pub fn header(&self) -> &Metadata {
        &self.header
    }

    /// Response trailers, with the `trailer-` prefix removed.
    pub fn trailer(&self) -> &Metadata {
        &self.trailer
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Decompose into inner value, header and trailer metadata.
    pub fn into_parts(self) -> (T, Metadata, Metadata) {
        (self.inner, self.header, self.trailer)
    }
}

impl<T> Deref for ConnectResponse<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
