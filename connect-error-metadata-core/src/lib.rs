//! Core protocol types shared by the Connect server, the Connect client and
//! the demonstration binary.
//!
//! ## Modules
//!
//! - [`error`]: Protocol status codes and the JSON error body
//! - [`protocol`]: Content-type detection and protocol header constants
//! - [`metadata`]: Header/trailer metadata as seen by callers

mod error;
mod metadata;
mod protocol;

pub use error::*;
pub use metadata::*;
pub use protocol::*;
