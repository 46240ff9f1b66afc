//! Archive framing: a shape code and a bit string separated by the last newline.
//!
//! The shape code may itself contain newline leaves, so only the final line
//! break separates the two parts.

use std::str::FromStr;

use tracing::instrument;

use crate::application::{ApplicationError, ApplicationResult};

/// The two inputs of a decode run, as read from an archive file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// Preorder shape code of the message tree
    pub shape_code: String,
    /// Encoded message, `0`/`1` characters
    pub bits: String,
}

impl Archive {
    pub fn new(shape_code: impl Into<String>, bits: impl Into<String>) -> Self {
        Self {
            shape_code: shape_code.into(),
            bits: bits.into(),
        }
    }

    /// Split archive content into shape code and bit string.
    ///
    /// The content is trimmed first; everything before the last newline is the
    /// shape code, everything after it (trimmed) is the bit string. A `\r`
    /// directly before that newline is dropped.
    #[instrument(level = "debug", skip(content), fields(len = content.len()))]
    pub fn parse(content: &str) -> ApplicationResult<Self> {
        let content = content.trim();
        let split = content
            .rfind('\n')
            .ok_or_else(|| ApplicationError::MalformedArchive {
                message: "expected shape code and bit string on separate lines".to_string(),
            })?;

        let shape_code = &content[..split];
        let shape_code = shape_code.strip_suffix('\r').unwrap_or(shape_code);
        let bits = content[split + 1..].trim();

        Ok(Self::new(shape_code, bits))
    }
}

impl FromStr for Archive {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
