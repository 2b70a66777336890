//! # Connect error metadata
//!
//! A minimal [Connect](https://connectrpc.com/) unary binding for
//! [Axum](https://github.com/tokio-rs/axum) built around one convention:
//! a handler error can carry metadata, and that metadata reaches the caller
//! as HTTP response headers.
//!
//! Handlers are plain `async fn`s taking a [`ConnectRequest`] and returning
//! `Result<ConnectResponse<T>, ConnectError>`; [`post_connect`] turns one into
//! an axum `MethodRouter`.
//!
//! With the `tonic` feature, a [`ConnectError`] converts into a
//! `tonic::Status` that keeps its metadata, and [`ContentTypeSwitch`] serves a
//! tonic service next to the Connect router on one listener.
//!
//! ```rust,ignore
//! async fn say_hello(
//!     ConnectRequest(_req): ConnectRequest<HelloRequest>,
//! ) -> Result<ConnectResponse<HelloReply>, ConnectError> {
//!     Err(ConnectError::new(Code::Unimplemented, "unimplemented").with_meta("custom-key", "value"))
//! }
//!
//! let app = axum::Router::new().route("/helloworld.Greeter/SayHello", post_connect(say_hello));
//! ```

pub mod error;
pub mod handler;
pub mod request;
pub mod response;
#[cfg(feature = "tonic")]
pub mod tonic;

pub use connect_error_metadata_core::{Code, Metadata, RequestProtocol};
pub use error::ConnectError;
pub use handler::{ConnectHandlerWrapper, post_connect};
pub use request::ConnectRequest;
pub use response::ConnectResponse;
#[cfg(feature = "tonic")]
pub use tonic::ContentTypeSwitch;

// Re-export several crates
pub use prost;
pub use serde;

pub mod prelude {
    //! The most common types for writing Connect handlers.
    pub use crate::error::ConnectError;
    pub use crate::handler::post_connect;
    pub use crate::request::ConnectRequest;
    pub use crate::response::ConnectResponse;
    pub use connect_error_metadata_core::Code;
}
