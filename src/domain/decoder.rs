//! Bit-driven decoding against a message tree.

use std::iter::FusedIterator;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::{MsgTree, Side};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::stats::{Statistics, DEFAULT_BASELINE_BITS};

/// What to do with bits left over after the last complete leaf path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingPolicy {
    /// A partial path at the end is an error
    #[default]
    Strict,
    /// A partial path at the end is dropped
    Lenient,
}

/// Decoded message with its statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub message: String,
    pub stats: Statistics,
}

/// Decodes bit strings against a borrowed tree.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    tree: &'a MsgTree,
    trailing: TrailingPolicy,
    baseline_bits: u32,
}

impl<'a> Decoder<'a> {
    pub fn new(tree: &'a MsgTree) -> Self {
        Self {
            tree,
            trailing: TrailingPolicy::default(),
            baseline_bits: DEFAULT_BASELINE_BITS,
        }
    }

    pub fn with_trailing(mut self, trailing: TrailingPolicy) -> Self {
        self.trailing = trailing;
        self
    }

    pub fn with_baseline_bits(mut self, baseline_bits: u32) -> Self {
        self.baseline_bits = baseline_bits;
        self
    }

    /// Lazily decode `bits`, one character per leaf reached.
    pub fn symbols<I>(&self, bits: I) -> Symbols<'a, I::IntoIter>
    where
        I: IntoIterator<Item = char>,
    {
        Symbols {
            tree: self.tree,
            bits: bits.into_iter(),
            current: self.tree.root(),
            position: 0,
            path_start: 0,
            decoded: 0,
            trailing: self.trailing,
            done: false,
        }
    }

    /// Decode a whole bit string and compute its statistics.
    ///
    /// # Errors
    /// - `InvalidInput` if `bits` is empty
    /// - `InvalidBit` for anything but `0`/`1`
    /// - `MalformedBitstream` if a bit leads into a missing child
    /// - `TrailingBits` if the string ends mid-path under the strict policy
    #[instrument(level = "debug", skip(self, bits), fields(bits = bits.len()))]
    pub fn decode(&self, bits: &str) -> DomainResult<Decoded> {
        if bits.is_empty() {
            return Err(DomainError::InvalidInput("bit string is empty".to_string()));
        }

        let message = self.symbols(bits.chars()).collect::<DomainResult<String>>()?;
        let total_characters = message.chars().count();
        debug!(total_characters, "decoded");

        Ok(Decoded {
            stats: Statistics::with_baseline(bits.len(), total_characters, self.baseline_bits),
            message,
        })
    }
}

/// Streaming decoder returned by [`Decoder::symbols`].
///
/// Yields each character as soon as its leaf is reached. Fused after the
/// first error.
#[derive(Debug)]
pub struct Symbols<'a, I> {
    tree: &'a MsgTree,
    bits: I,
    current: Index,
    position: usize,
    path_start: usize,
    decoded: usize,
    trailing: TrailingPolicy,
    done: bool,
}

impl<I> Symbols<'_, I> {
    fn fail(&mut self, err: DomainError) -> Option<DomainResult<char>> {
        self.done = true;
        Some(Err(err))
    }

    /// Number of characters emitted so far.
    pub fn decoded(&self) -> usize {
        self.decoded
    }
}

impl<I: Iterator<Item = char>> Iterator for Symbols<'_, I> {
    type Item = DomainResult<char>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while let Some(bit) = self.bits.next() {
            let position = self.position;
            self.position += 1;

            let Some(side) = Side::from_bit(bit) else {
                return self.fail(DomainError::InvalidBit {
                    position,
                    found: bit,
                });
            };
            let Some(next) = self.tree.child(self.current, side) else {
                return self.fail(DomainError::MalformedBitstream {
                    position,
                    decoded: self.decoded,
                });
            };

            match self.tree.get_node(next).and_then(|n| n.kind.symbol()) {
                Some(symbol) => {
                    self.current = self.tree.root();
                    self.decoded += 1;
                    self.path_start = self.position;
                    return Some(Ok(symbol));
                }
                None => self.current = next,
            }
        }

        self.done = true;
        if self.current == self.tree.root() {
            return None;
        }
        match self.trailing {
            TrailingPolicy::Strict => Some(Err(DomainError::TrailingBits {
                position: self.path_start,
                decoded: self.decoded,
            })),
            TrailingPolicy::Lenient => {
                debug!(
                    dropped = self.position - self.path_start,
                    "ignoring partial path at end of bit string"
                );
                None
            }
        }
    }
}

impl<I: Iterator<Item = char>> FusedIterator for Symbols<'_, I> {}
