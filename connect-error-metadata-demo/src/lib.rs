//! Demonstrates that metadata attached to an RPC error reaches the caller,
//! over a Connect binding and over a gRPC binding.
//!
//! Both `SayHello` handlers fail with `unimplemented` and attach
//! [`METADATA_KEY`]`: `[`METADATA_VALUE`]; [`demo::run`] starts one binding,
//! calls it, records what each client saw and tears the server down again.
//! The Connect server also answers gRPC on the same port, so the tonic client
//! observes both servers.

pub mod config;
pub mod connect;
pub mod demo;
pub mod grpc;
pub mod pb;

pub use config::{ConfigError, ConnectEncoding, DemoConfig};
pub use demo::{Client, Observation, Transport};

/// Metadata key attached to every `SayHello` error.
pub const METADATA_KEY: &str = "custom-key";

/// Metadata value attached to every `SayHello` error.
pub const METADATA_VALUE: &str = "value";

/// Message of every `SayHello` error.
pub const UNIMPLEMENTED_MESSAGE: &str = "unimplemented";
