//! Connect unary client built on hyper.
//!
//! The client surfaces response metadata on both paths: a successful
//! [`ConnectResponse`] and a failed call's [`ClientError::Status`] each carry the
//! response's header metadata and its trailer metadata (`trailer-` headers).
//!
//! ```rust,ignore
//! use connect_error_metadata_client::{ClientError, ConnectClient};
//!
//! let client = ConnectClient::builder("http://127.0.0.1:8080").build()?;
//! match client
//!     .call_unary::<HelloRequest, HelloReply>("helloworld.Greeter/SayHello", &HelloRequest::default())
//!     .await
//! {
//!     Ok(reply) => println!("{}", reply.message),
//!     Err(err) => println!("{err} header: {:?}", err.header()),
//! }
//! ```

mod builder;
mod client;
mod error;
mod error_parser;
mod response;
mod transport;

pub use builder::ClientBuilder;
pub use client::ConnectClient;
pub use connect_error_metadata_core::{Code, Metadata};
pub use error::ClientError;
pub use response::ConnectResponse;
