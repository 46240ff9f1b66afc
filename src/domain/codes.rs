//! Code table: the root-to-leaf path of every leaf in a message tree.

use std::fmt;

use tracing::instrument;

use crate::domain::arena::{MsgTree, Side};
use crate::domain::error::{DomainError, DomainResult};

/// A leaf character and its path from the root (`0` = left, `1` = right).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub symbol: char,
    pub code: String,
}

impl fmt::Display for CodeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.symbol, self.code)
    }
}

/// Leaf codes in depth-first preorder (left before right).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    entries: Vec<CodeEntry>,
}

impl CodeTable {
    /// Walk the tree and collect one entry per leaf.
    ///
    /// Absent children simply end their branch. A lone leaf root gets the
    /// empty code.
    #[instrument(level = "debug", skip(tree))]
    pub fn from_tree(tree: &MsgTree) -> Self {
        let mut entries = Vec::new();
        let mut stack = vec![(tree.root(), String::new())];

        while let Some((idx, path)) = stack.pop() {
            let Some(node) = tree.get_node(idx) else {
                continue;
            };
            if let Some(symbol) = node.kind.symbol() {
                entries.push(CodeEntry {
                    symbol,
                    code: path.clone(),
                });
            }
            for side in [Side::Right, Side::Left] {
                if let Some(child) = node.child(side) {
                    let mut child_path = path.clone();
                    child_path.push(side.bit());
                    stack.push((child, child_path));
                }
            }
        }

        Self { entries }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CodeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Code of the first leaf holding `symbol`.
    pub fn lookup(&self, symbol: char) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.code.as_str())
    }

    /// Concatenate the codes of every character in `message`.
    pub fn encode(&self, message: &str) -> DomainResult<String> {
        let mut bits = String::new();
        for c in message.chars() {
            let code = self.lookup(c).ok_or(DomainError::UnknownSymbol(c))?;
            bits.push_str(code);
        }
        Ok(bits)
    }

    /// No code is a prefix of another one.
    pub fn is_prefix_free(&self) -> bool {
        let mut codes: Vec<&str> = self.entries.iter().map(|e| e.code.as_str()).collect();
        codes.sort_unstable();
        // After sorting, a prefix sorts directly before some code it prefixes
        codes.windows(2).all(|pair| !pair[1].starts_with(pair[0]))
    }
}

impl<'a> IntoIterator for &'a CodeTable {
    type Item = &'a CodeEntry;
    type IntoIter = std::slice::Iter<'a, CodeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
