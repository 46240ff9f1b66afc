//! Archive decoding service
//!
//! Reads an archive, rebuilds its message tree and decodes the bit string.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{Archive, ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{CodeTable, Decoded, Decoder, MsgTree, TrailingPolicy, TreeBuilder};
use crate::infrastructure::traits::FileSystem;

/// Everything one decode run produces.
#[derive(Debug, Clone)]
pub struct DecodeReport {
    /// Leaf codes in traversal order
    pub codes: CodeTable,
    /// Decoded message and statistics
    pub decoded: Decoded,
}

/// Printable label for a leaf character.
///
/// With `escape` set, `\n`, `\r` and `\t` are shown as escapes so a code
/// table entry stays on one line.
pub fn symbol_label(symbol: char, escape: bool) -> String {
    match symbol {
        '\n' | '\r' | '\t' if escape => symbol.escape_default().to_string(),
        _ => symbol.to_string(),
    }
}

impl DecodeReport {
    /// Code table section: header plus one `<char>\t<code>` line per leaf.
    pub fn render_codes(&self, escape: bool) -> String {
        let lines: String = self
            .codes
            .iter()
            .map(|entry| format!("{}\t{}\n", symbol_label(entry.symbol, escape), entry.code))
            .collect();
        format!("Character Code\n-------------------------\n{lines}")
    }

    /// Message and statistics sections.
    pub fn render_message(&self) -> String {
        format!(
            "MESSAGE:\n{}\nSTATISTICS:\n-----------------------\n{}\n",
            self.decoded.message, self.decoded.stats
        )
    }

    /// Full report in the classic layout.
    pub fn render(&self, escape: bool) -> String {
        format!("{}\n{}", self.render_codes(escape), self.render_message())
    }
}

/// Service for decoding archives.
pub struct DecodeService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl DecodeService {
    /// Create a new decode service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Read and split an archive file.
    ///
    /// The file is read in one go; nothing stays open afterwards.
    #[instrument(level = "debug", skip(self))]
    pub fn load_archive(&self, path: &Path) -> ApplicationResult<Archive> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::ArchiveNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read archive", path)?;
        debug!("load_archive: {} bytes from {}", content.len(), path.display());
        Archive::parse(&content)
    }

    /// Rebuild the message tree with the configured marker.
    #[instrument(level = "debug", skip(self, shape_code))]
    pub fn build_tree(&self, shape_code: &str) -> ApplicationResult<MsgTree> {
        let tree = TreeBuilder::with_marker(self.settings.internal_marker).build(shape_code)?;
        if !tree.is_complete() {
            warn!("shape code leaves internal nodes without two children; some bit paths cannot decode");
        }
        Ok(tree)
    }

    /// Decode an already loaded archive.
    ///
    /// `trailing` overrides the configured policy when given.
    #[instrument(level = "debug", skip(self, archive))]
    pub fn decode_archive(
        &self,
        archive: &Archive,
        trailing: Option<TrailingPolicy>,
    ) -> ApplicationResult<DecodeReport> {
        let tree = self.build_tree(&archive.shape_code)?;
        let codes = CodeTable::from_tree(&tree);
        let decoded = Decoder::new(&tree)
            .with_trailing(trailing.unwrap_or(self.settings.trailing))
            .with_baseline_bits(self.settings.baseline_bits)
            .decode(&archive.bits)?;

        info!(
            leaves = codes.len(),
            characters = decoded.stats.total_characters,
            "archive decoded"
        );
        Ok(DecodeReport { codes, decoded })
    }

    /// Load, rebuild and decode an archive file.
    pub fn decode_file(
        &self,
        path: &Path,
        trailing: Option<TrailingPolicy>,
    ) -> ApplicationResult<DecodeReport> {
        let archive = self.load_archive(path)?;
        self.decode_archive(&archive, trailing)
    }

    /// Code table of an archive's tree, without decoding its message.
    pub fn code_table_file(&self, path: &Path) -> ApplicationResult<CodeTable> {
        let archive = self.load_archive(path)?;
        let tree = self.build_tree(&archive.shape_code)?;
        Ok(CodeTable::from_tree(&tree))
    }

    /// The rebuilt tree of an archive, for display.
    pub fn tree_file(&self, path: &Path) -> ApplicationResult<MsgTree> {
        let archive = self.load_archive(path)?;
        self.build_tree(&archive.shape_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_label_escapes_control_chars() {
        assert_eq!(symbol_label('\n', true), "\\n");
        assert_eq!(symbol_label('\t', true), "\\t");
        assert_eq!(symbol_label('\n', false), "\n");
        assert_eq!(symbol_label(' ', true), " ");
        assert_eq!(symbol_label('é', true), "é");
    }
}
