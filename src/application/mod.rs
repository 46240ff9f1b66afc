//! Application layer: archive framing and decode use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod archive;
pub mod error;
pub mod error_ext;
pub mod services;

pub use archive::Archive;
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
