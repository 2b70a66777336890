//! Client-side Connect protocol error types.
//!
//! This module provides [`ClientError`], the error type for Connect RPC client operations.

use connect_error_metadata_core::{Code, Metadata};

/// Client-side Connect protocol error variants.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ClientError {
    /// A status error returned by the server, together with the header and
    /// trailer metadata of the response that carried it.
    #[error("{}", status_text(.code, .message))]
    Status {
        code: Code,
        message: Option<String>,
        header: Metadata,
        trailer: Metadata,
    },

    /// Transport-level error (connection failed, body read failed, etc.).
    #[error("transport error: {0}")]
    Transport(String),

    /// Message encoding error.
    #[error("encode error: {0}")]
    Encode(String),

    /// Message decoding error.
    #[error("decode error: {0}")]
    Decode(String),

    /// Protocol error (bad URL, unexpected content-type, etc.).
    #[error("protocol error: {0}")]
    Protocol(String),
}

fn status_text(code: &Code, message: &Option<String>) -> String {
    match message {
        Some(message) if !message.is_empty() => format!("{code}: {message}"),
        _ => code.to_string(),
    }
}

impl ClientError {
    /// Create a new status error with a code and message and no metadata.
    pub fn new<S: Into<String>>(code: Code, message: S) -> Self {
        ClientError::Status {
            code,
            message: Some(message.into()),
            header: Metadata::empty(),
            trailer: Metadata::empty(),
        }
    }

    /// Create a new status error with just a code.
    pub fn from_code(code: Code) -> Self {
        ClientError::Status {
            code,
            message: None,
            header: Metadata::empty(),
            trailer: Metadata::empty(),
        }
    }

    /// Attach response metadata. Has no effect on non-status errors.
    pub fn with_metadata(mut self, new_header: Metadata, new_trailer: Metadata) -> Self {
        if let ClientError::Status {
            header, trailer, ..
        } = &mut self
        {
            *header = new_header;
            *trailer = new_trailer;
        }
        self
    }

    /// Get the error code.
    ///
    /// For non-Status variants, returns an appropriate code:
    /// - Transport: `Unavailable`
    /// - Encode/Decode: `Internal`
    /// - Protocol: `InvalidArgument`
    pub fn code(&self) -> Code {
        match self {
            ClientError::Status { code, .. } => *code,
            ClientError::Transport(_) => Code::Unavailable,
            ClientError::Encode(_) | ClientError::Decode(_) => Code::Internal,
            ClientError::Protocol(_) => Code::InvalidArgument,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> Option<&str> {
        match self {
            ClientError::Status { message, .. } => message.as_deref(),
            ClientError::Transport(msg)
            | ClientError::Encode(msg)
            | ClientError::Decode(msg)
            | ClientError::Protocol(msg) => Some(msg),
        }
    }

    /// Header metadata of the failed response, `None` for non-status errors.
    pub fn header(&self) -> Option<&Metadata> {
        match self {
            ClientError::Status { header, .. } => Some(header),
            _ => None,
        }
    }

    /// Trailer metadata of the failed response, `None` for non-status errors.
    pub fn trailer(&self) -> Option<&Metadata> {
        match self {
            ClientError::Status { trailer, .. } => Some(trailer),
            _ => None,
        }
    }

    /// Returns true if the server answered (as opposed to a local failure).
    pub fn is_status(&self) -> bool {
        matches!(self, ClientError::Status { .. })
    }
}
