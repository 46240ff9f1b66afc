use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::instrument;

/// Branch taken from a node: `0` walks left, `1` walks right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Map a bit character to a side, `None` for anything but `0`/`1`.
    pub fn from_bit(bit: char) -> Option<Self> {
        match bit {
            '0' => Some(Side::Left),
            '1' => Some(Side::Right),
            _ => None,
        }
    }

    pub fn bit(self) -> char {
        match self {
            Side::Left => '0',
            Side::Right => '1',
        }
    }
}

/// Payload of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Branch point, never decoded
    Internal,
    /// Decodable character
    Leaf(char),
}

impl NodeKind {
    pub fn symbol(&self) -> Option<char> {
        match self {
            NodeKind::Internal => None,
            NodeKind::Leaf(c) => Some(*c),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Internal => write!(f, "^"),
            NodeKind::Leaf(c) => write!(f, "{:?}", c),
        }
    }
}

/// Node in the arena-backed message tree.
#[derive(Debug)]
pub struct MsgNode {
    /// Internal branch or leaf character
    pub kind: NodeKind,
    /// Index of the `0` child in the arena
    pub left: Option<Index>,
    /// Index of the `1` child in the arena
    pub right: Option<Index>,
}

impl MsgNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            left: None,
            right: None,
        }
    }

    pub fn child(&self, side: Side) -> Option<Index> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }
}

/// Arena-based binary tree used as a prefix-code table.
///
/// The arena owns every node; parents refer to their children by index only,
/// so the structure is a strict tree with no back-references. A tree always
/// has a root.
#[derive(Debug)]
pub struct MsgTree {
    arena: Arena<MsgNode>,
    root: Index,
}

impl MsgTree {
    pub fn new(root: NodeKind) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(MsgNode::new(root));
        Self { arena, root }
    }

    /// Insert a node and hang it below `parent` on the given side.
    ///
    /// Callers make sure the slot is free and `parent` is internal.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn attach(&mut self, parent: Index, side: Side, kind: NodeKind) -> Index {
        let node_idx = self.arena.insert(MsgNode::new(kind));
        if let Some(parent) = self.arena.get_mut(parent) {
            match side {
                Side::Left => parent.left = Some(node_idx),
                Side::Right => parent.right = Some(node_idx),
            }
        }
        node_idx
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn root_node(&self) -> &MsgNode {
        &self.arena[self.root]
    }

    pub fn get_node(&self, idx: Index) -> Option<&MsgNode> {
        self.arena.get(idx)
    }

    /// Child of `idx` on `side`, `None` if absent or `idx` is a leaf.
    pub fn child(&self, idx: Index, side: Side) -> Option<Index> {
        self.get_node(idx).and_then(|node| node.child(side))
    }

    /// Number of nodes, internal and leaves.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.iter().filter(|(_, node)| node.is_leaf()).count()
    }

    /// Every internal node has both children.
    ///
    /// A shape code that stops early yields an incomplete tree; decoding
    /// against it fails only when a bit walks into a missing slot.
    #[instrument(level = "debug", skip(self))]
    pub fn is_complete(&self) -> bool {
        self.iter()
            .filter(|(_, node)| !node.is_leaf())
            .all(|(_, node)| node.left.is_some() && node.right.is_some())
    }

    /// Height in nodes: a lone root has depth 1.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1)];

        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.get_node(idx) {
                for child in [node.left, node.right].into_iter().flatten() {
                    stack.push((child, depth + 1));
                }
            }
        }

        max_depth
    }

    /// Preorder iterator: node first, then the left subtree, then the right.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Render the tree for display, each child labelled with its branch bit.
    ///
    /// Built bottom-up from the postorder walk so deep trees do not recurse.
    #[instrument(level = "debug", skip(self))]
    pub fn to_termtree(&self) -> Tree<String> {
        let mut done: HashMap<Index, Tree<String>> = HashMap::new();

        for (idx, node) in self.iter_postorder() {
            let mut tree = Tree::new(node.kind.to_string());
            for side in [Side::Left, Side::Right] {
                if let Some(mut child) = node.child(side).and_then(|c| done.remove(&c)) {
                    child.root = format!("{} {}", side.bit(), child.root);
                    tree.leaves.push(child);
                }
            }
            done.insert(idx, tree);
        }

        done.remove(&self.root)
            .unwrap_or_else(|| Tree::new(self.root_node().kind.to_string()))
    }
}

pub struct TreeIterator<'a> {
    tree: &'a MsgTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a MsgTree) -> Self {
        Self {
            tree,
            stack: vec![tree.root()],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a MsgNode);

    fn next(&mut self) -> Option<Self::Item> {
        let current_idx = self.stack.pop()?;
        let node = self.tree.get_node(current_idx)?;
        // Right first so the left subtree is visited first
        self.stack.extend(node.right);
        self.stack.extend(node.left);
        Some((current_idx, node))
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a MsgTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a MsgTree) -> Self {
        Self {
            tree,
            stack: vec![(tree.root(), false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a MsgNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if visited {
                    return Some((current_idx, node));
                }
                self.stack.push((current_idx, true));
                if let Some(right) = node.right {
                    self.stack.push((right, false));
                }
                if let Some(left) = node.left {
                    self.stack.push((left, false));
                }
            }
        }
        None
    }
}
