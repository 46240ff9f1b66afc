//! msgtree: archived message reconstruction.
//!
//! An archive holds the preorder shape code of a binary prefix-code tree and
//! a bit string encoded with it. The crate rebuilds the tree without
//! recursion, lists each leaf's code and decodes the bit string.
//!
//! Layers, innermost first:
//! - `domain`: tree, builder, code table, decoder, statistics (no I/O)
//! - `application`: archive framing and the decode service
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: argument parsing, output and exit codes

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
