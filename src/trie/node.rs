use std::fmt;
use std::sync::Arc;

use array_init::array_init;

use crate::trie::encode::{nibble_to_key, Nibble, Nibbles};

/// Shared, immutable reference to a trie node
pub type NodeRef<V> = Arc<PatriciaNode<V>>;

/// Child slots of a branch, one per nibble value
pub type Children<V> = [Option<NodeRef<V>>; 16];

/// Node types in the Merkle Patricia Trie
///
/// Nodes are never mutated once built. Insert and delete rebuild the nodes on the touched
/// path and share every other subtree with the previous trie through `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatriciaNode<V> {
    /// Terminal node holding the remainder of a key and its value
    Leaf {
        /// Remaining key nibbles, never empty
        key_end: Nibbles,
        /// Value stored at this leaf
        value: V,
    },

    /// Path compression over a run of nibbles shared by every key below
    Extension {
        /// Shared nibble prefix, never empty
        shared_prefix: Nibbles,
        /// The single child, never itself an extension
        next_node: NodeRef<V>,
    },

    /// Sixteen-way branch with an optional value for a key ending exactly here
    Branch {
        /// Children nodes (one for each hex digit)
        children: Children<V>,
        /// Value stored at this branch (if any)
        value: Option<V>,
    },
}

/// Create a child array with no children
pub fn empty_children<V>() -> Children<V> {
    array_init(|_| None)
}

impl<V> PatriciaNode<V> {
    /// Create a new leaf node
    pub fn leaf(key_end: Nibbles, value: V) -> Self {
        assert!(!key_end.is_empty(), "leaf key must not be empty");
        PatriciaNode::Leaf { key_end, value }
    }

    /// Create a new extension node
    pub fn extension(shared_prefix: Nibbles, next_node: NodeRef<V>) -> Self {
        assert!(!shared_prefix.is_empty(), "extension prefix must not be empty");
        PatriciaNode::Extension { shared_prefix, next_node }
    }

    /// Create a new branch node
    pub fn branch(children: Children<V>, value: Option<V>) -> Self {
        PatriciaNode::Branch { children, value }
    }

    /// Create a new branch node with no children or value
    pub fn empty_branch() -> Self {
        PatriciaNode::Branch {
            children: empty_children(),
            value: None,
        }
    }

    /// Node holding `value` for a key whose remaining path is `rest`.
    ///
    /// An empty remainder cannot be a leaf, so the value sits on a childless branch.
    pub fn terminal(rest: Nibbles, value: V) -> Self {
        if rest.is_empty() {
            PatriciaNode::Branch {
                children: empty_children(),
                value: Some(value),
            }
        } else {
            PatriciaNode::leaf(rest, value)
        }
    }

    /// Get the value from a node if it's a leaf or branch with value
    pub fn value(&self) -> Option<&V> {
        match self {
            PatriciaNode::Leaf { value, .. } => Some(value),
            PatriciaNode::Branch { value, .. } => value.as_ref(),
            PatriciaNode::Extension { .. } => None,
        }
    }

    /// Get a child of a branch node
    pub fn branch_child(&self, nibble: Nibble) -> Option<&NodeRef<V>> {
        match self {
            PatriciaNode::Branch { children, .. } => {
                children.get(nibble as usize).and_then(|c| c.as_ref())
            }
            _ => None,
        }
    }

    /// Occupied child slots of a branch, in nibble order
    pub fn branch_children(&self) -> Vec<(Nibble, &NodeRef<V>)> {
        match self {
            PatriciaNode::Branch { children, .. } => children
                .iter()
                .enumerate()
                .filter_map(|(i, c)| c.as_ref().map(|c| (i as Nibble, c)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Number of children (branch slots, or 1 for an extension)
    pub fn child_count(&self) -> usize {
        match self {
            PatriciaNode::Leaf { .. } => 0,
            PatriciaNode::Extension { .. } => 1,
            PatriciaNode::Branch { children, .. } => children.iter().filter(|c| c.is_some()).count(),
        }
    }

    /// True for a branch with neither children nor value (the empty trie root)
    pub fn is_empty_branch(&self) -> bool {
        matches!(self, PatriciaNode::Branch { value: None, .. }) && self.child_count() == 0
    }

    /// True for a branch that only carries a value
    pub fn is_value_only_branch(&self) -> bool {
        matches!(self, PatriciaNode::Branch { value: Some(_), .. }) && self.child_count() == 0
    }

    /// Get the node type as a string
    pub fn node_type(&self) -> &'static str {
        match self {
            PatriciaNode::Leaf { .. } => "leaf",
            PatriciaNode::Extension { .. } => "extension",
            PatriciaNode::Branch { .. } => "branch",
        }
    }

    /// Check the structural invariants on this node as a trie root, recursively.
    ///
    /// - no branch has exactly one child and no value
    /// - no branch below the root is empty
    /// - extension prefixes and leaf keys are non-empty
    /// - an extension never points at another extension, a leaf, or a value-only branch
    pub fn is_canonical(&self) -> bool {
        if self.is_empty_branch() {
            return true;
        }
        self.is_canonical_below()
    }

    fn is_canonical_below(&self) -> bool {
        match self {
            PatriciaNode::Leaf { key_end, .. } => !key_end.is_empty(),
            PatriciaNode::Extension { shared_prefix, next_node } => {
                if shared_prefix.is_empty() {
                    return false;
                }
                match next_node.as_ref() {
                    PatriciaNode::Extension { .. } | PatriciaNode::Leaf { .. } => false,
                    child if child.child_count() == 0 => false,
                    child => child.is_canonical_below(),
                }
            }
            PatriciaNode::Branch { children, value } => {
                let count = self.child_count();
                if count == 0 && value.is_none() {
                    return false;
                }
                if count == 1 && value.is_none() {
                    return false;
                }
                children.iter().flatten().all(|c| c.is_canonical_below())
            }
        }
    }

    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        match self {
            PatriciaNode::Leaf { .. } => 1,
            PatriciaNode::Extension { next_node, .. } => 1 + next_node.node_count(),
            PatriciaNode::Branch { children, .. } => {
                1 + children.iter().flatten().map(|c| c.node_count()).sum::<usize>()
            }
        }
    }
}

impl<V: fmt::Debug> PatriciaNode<V> {
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize, label: &str) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            PatriciaNode::Leaf { key_end, value } => {
                writeln!(f, "{}{}Leaf [{}] = {:?}", indent, label, key_end, value)
            }
            PatriciaNode::Extension { shared_prefix, next_node } => {
                writeln!(f, "{}{}Extension [{}]", indent, label, shared_prefix)?;
                next_node.fmt_tree(f, depth + 1, "")
            }
            PatriciaNode::Branch { children, value } => {
                match value {
                    Some(v) => writeln!(f, "{}{}Branch = {:?}", indent, label, v)?,
                    None => writeln!(f, "{}{}Branch", indent, label)?,
                }
                for (i, child) in children.iter().enumerate() {
                    if let Some(child) = child {
                        let label = format!("{}: ", nibble_to_key(i as Nibble));
                        child.fmt_tree(f, depth + 1, &label)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl<V: fmt::Debug> fmt::Display for PatriciaNode<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0, "")
    }
}
