//! Tree builder for reconstructing a message tree from its preorder shape code.

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::domain::arena::{MsgTree, NodeKind, Side};
use crate::domain::error::{DomainError, DomainResult};

/// Shape-code character marking an internal node.
pub const DEFAULT_INTERNAL_MARKER: char = '^';

/// Constructs message trees from preorder shape codes.
///
/// The shape code lists every node in preorder: the marker character is a
/// branch point, anything else is a leaf holding that character.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    marker: char,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            marker: DEFAULT_INTERNAL_MARKER,
        }
    }

    pub fn with_marker(marker: char) -> Self {
        Self { marker }
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    fn kind_of(&self, c: char) -> NodeKind {
        if c == self.marker {
            NodeKind::Internal
        } else {
            NodeKind::Leaf(c)
        }
    }

    /// Build a tree from a shape code without recursion.
    ///
    /// The stack holds internal nodes still waiting for their right child.
    /// After a leaf is attached the builder pops back to the nearest such
    /// ancestor and switches to right insertion.
    #[instrument(level = "debug", skip(self, shape_code), fields(len = shape_code.len()))]
    pub fn build(&self, shape_code: &str) -> DomainResult<MsgTree> {
        let mut chars = shape_code.chars();
        let first = chars
            .next()
            .ok_or_else(|| DomainError::encoding(0, "shape code is empty"))?;

        let mut tree = MsgTree::new(self.kind_of(first));
        let mut stack: Vec<Index> = vec![tree.root()];
        let mut current = tree.root();
        let mut side = Side::Left;

        for (position, c) in chars.enumerate().map(|(i, c)| (i + 1, c)) {
            let parent = tree
                .get_node(current)
                .ok_or_else(|| DomainError::encoding(position, "insertion point lost"))?;
            if parent.is_leaf() {
                return Err(DomainError::encoding(
                    position,
                    format!("character {c:?} at {position} would hang below a leaf"),
                ));
            }
            if parent.child(side).is_some() {
                return Err(DomainError::encoding(
                    position,
                    format!("tree already complete, unexpected {c:?} at {position}"),
                ));
            }

            let kind = self.kind_of(c);
            let node = tree.attach(current, side, kind);
            trace!(?kind, ?side, position, "attached");

            match kind {
                NodeKind::Internal => {
                    stack.push(node);
                    current = node;
                    side = Side::Left;
                }
                NodeKind::Leaf(_) => {
                    if let Some(pending) = stack.pop() {
                        current = pending;
                    }
                    side = Side::Right;
                }
            }
        }

        debug!(
            nodes = tree.len(),
            leaves = tree.leaf_count(),
            pending = stack.len(),
            "tree built"
        );
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preorder(tree: &MsgTree) -> String {
        tree.iter()
            .map(|(_, node)| node.kind.symbol().unwrap_or('^'))
            .collect()
    }

    #[test]
    fn test_build_balanced_tree() {
        let tree = TreeBuilder::new().build("^^ab^cd").unwrap();
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.depth(), 3);
        assert!(tree.is_complete());
        assert_eq!(preorder(&tree), "^^ab^cd");
    }

    #[test]
    fn test_build_right_leaning_tree() {
        let tree = TreeBuilder::new().build("^a^^bcd").unwrap();
        assert_eq!(preorder(&tree), "^a^^bcd");
        assert_eq!(tree.depth(), 4);
        assert!(tree.is_complete());
    }

    #[test]
    fn test_empty_shape_code_fails() {
        let err = TreeBuilder::new().build("").unwrap_err();
        assert!(matches!(err, DomainError::InvalidEncoding { position: 0, .. }));
    }

    #[test]
    fn test_single_leaf() {
        let tree = TreeBuilder::new().build("x").unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root_node().kind, NodeKind::Leaf('x'));
    }

    #[test]
    fn test_child_below_leaf_root_fails() {
        let err = TreeBuilder::new().build("xy").unwrap_err();
        assert!(matches!(err, DomainError::InvalidEncoding { position: 1, .. }));
    }

    #[test]
    fn test_extra_characters_after_complete_tree_fail() {
        let err = TreeBuilder::new().build("^abc").unwrap_err();
        assert!(matches!(err, DomainError::InvalidEncoding { position: 3, .. }));
    }

    #[test]
    fn test_truncated_shape_code_builds_incomplete_tree() {
        let tree = TreeBuilder::new().build("^^ab").unwrap();
        assert!(!tree.is_complete());
        assert_eq!(tree.child(tree.root(), Side::Right), None);
    }

    #[test]
    fn test_custom_marker() {
        let tree = TreeBuilder::with_marker('*').build("*^*ab").unwrap();
        assert_eq!(tree.leaf_count(), 3);
        let left = tree.child(tree.root(), Side::Left).unwrap();
        assert_eq!(tree.get_node(left).unwrap().kind, NodeKind::Leaf('^'));
    }
}
