//! Domain layer: the message tree and its codec
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod codes;
pub mod decoder;
pub mod error;
pub mod stats;

pub use arena::{MsgNode, MsgTree, NodeKind, Side};
pub use builder::{TreeBuilder, DEFAULT_INTERNAL_MARKER};
pub use codes::{CodeEntry, CodeTable};
pub use decoder::{Decoded, Decoder, Symbols, TrailingPolicy};
pub use error::{DomainError, DomainResult};
pub use stats::{format_one_decimal, round1, Statistics, DEFAULT_BASELINE_BITS};
