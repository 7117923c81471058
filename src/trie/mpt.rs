use std::fmt;
use std::sync::Arc;

use log::{debug, trace};
use serde::Serialize;

use crate::crypto::hash::{Hash, HashFunction};
use crate::trie::compress::canonicalize;
use crate::trie::encode::{common_prefix_len, Nibble, Nibbles};
use crate::trie::error::TrieResult;
use crate::trie::hasher::node_hash;
use crate::trie::node::{empty_children, NodeRef, PatriciaNode};

/// Persistent Merkle Patricia Trie
///
/// Every `insert` and `delete` returns a new trie and leaves `self` untouched. The new root
/// shares every subtree off the mutated path with the old one, so keeping old versions
/// around costs only the rebuilt path.
#[derive(Debug, Clone)]
pub struct PatriciaTrie<V> {
    /// Root node of the trie
    root: NodeRef<V>,
    /// Number of distinct keys stored
    size: usize,
}

impl<V> PatriciaTrie<V> {
    /// Create a new empty trie
    pub fn new() -> Self {
        Self {
            root: Arc::new(PatriciaNode::empty_branch()),
            size: 0,
        }
    }

    /// Root node of the trie
    pub fn root(&self) -> &NodeRef<V> {
        &self.root
    }

    /// Number of distinct keys stored
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Look up the node holding the value for `key`.
    ///
    /// Returns the matching leaf or value-bearing branch. Keys that are not valid hex
    /// cannot be stored, so they are reported as absent.
    pub fn query(&self, key: &str) -> Option<&PatriciaNode<V>> {
        let nibbles = Nibbles::from_hex(key).ok()?;
        self.query_nibbles(&nibbles)
    }

    /// Look up the node holding the value for a nibble path
    pub fn query_nibbles(&self, key: &Nibbles) -> Option<&PatriciaNode<V>> {
        let mut node: &PatriciaNode<V> = &self.root;
        let mut rest: &[Nibble] = key.as_slice();

        loop {
            match node {
                PatriciaNode::Branch { children, value } => match rest.split_first() {
                    None => return value.as_ref().map(|_| node),
                    Some((&nibble, tail)) => {
                        node = children[nibble as usize].as_deref()?;
                        rest = tail;
                    }
                },
                PatriciaNode::Extension { shared_prefix, next_node } => {
                    let prefix = shared_prefix.as_slice();
                    if common_prefix_len(prefix, rest) < prefix.len() {
                        return None;
                    }
                    rest = &rest[prefix.len()..];
                    node = next_node.as_ref();
                }
                PatriciaNode::Leaf { key_end, .. } => {
                    let matched = common_prefix_len(key_end.as_slice(), rest);
                    return (matched == key_end.len() && matched == rest.len()).then_some(node);
                }
            }
        }
    }

    /// Get the value stored under `key`
    pub fn get(&self, key: &str) -> Option<&V> {
        self.query(key).and_then(|node| node.value())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.query(key).is_some()
    }

    /// Every stored key (as lowercase hex, no prefix) with its value, in nibble order
    pub fn entries(&self) -> Vec<(String, &V)> {
        let mut out = Vec::with_capacity(self.size);
        collect_entries(&self.root, Nibbles::new(), &mut out);
        out.into_iter().map(|(path, value)| (path.to_hex(), value)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (String, &V)> {
        self.entries().into_iter()
    }

    /// Check the structural invariants of the whole trie
    pub fn is_canonical(&self) -> bool {
        self.root.is_canonical()
    }

    /// Total number of nodes reachable from the root
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }
}

impl<V: Clone> PatriciaTrie<V> {
    /// Build a trie from key/value pairs, inserted in order
    pub fn from_entries<K, I>(entries: I) -> TrieResult<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut trie = Self::new();
        for (key, value) in entries {
            trie = trie.insert(key.as_ref(), value)?;
        }
        Ok(trie)
    }

    /// Insert a key-value pair, returning the new trie
    pub fn insert(&self, key: &str, value: V) -> TrieResult<Self> {
        let nibbles = Nibbles::from_hex(key)?;
        Ok(self.insert_nibbles(&nibbles, value))
    }

    /// Insert a value under a nibble path, returning the new trie
    pub fn insert_nibbles(&self, key: &Nibbles, value: V) -> Self {
        let existed = self.query_nibbles(key).is_some();
        let root = insert_at(&self.root, key.as_slice(), value);
        let size = if existed { self.size } else { self.size + 1 };

        debug!("inserted key [{}] (existed: {}, size: {})", key, existed, size);
        Self { root, size }
    }

    /// Delete a key, returning the new trie; absent or malformed keys leave it unchanged
    pub fn delete(&self, key: &str) -> Self {
        match Nibbles::from_hex(key) {
            Ok(nibbles) => self.delete_nibbles(&nibbles),
            Err(_) => self.clone(),
        }
    }

    /// Delete a nibble path, returning the new trie
    pub fn delete_nibbles(&self, key: &Nibbles) -> Self {
        if self.query_nibbles(key).is_none() {
            trace!("delete of absent key [{}] is a no-op", key);
            return self.clone();
        }

        let size = self.size - 1;
        debug!("deleted key [{}] (size: {})", key, size);
        match delete_at(&self.root, key.as_slice()) {
            Some(root) => Self { root, size },
            None => Self::new(),
        }
    }
}

impl<V: Serialize> PatriciaTrie<V> {
    /// Root hash over the canonical serialization of every node
    pub fn calculate_root_hash<H: HashFunction + ?Sized>(&self, hasher: &H) -> TrieResult<Hash> {
        node_hash(&self.root, hasher)
    }
}

impl<V> Default for PatriciaTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Display for PatriciaTrie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PatriciaTrie (size: {})", self.size)?;
        write!(f, "{}", self.root)
    }
}

/// Wrap `node` in an extension over `prefix`, unless the prefix is empty
fn wrap<V: Clone>(prefix: &[Nibble], node: NodeRef<V>) -> NodeRef<V> {
    if prefix.is_empty() {
        node
    } else {
        canonicalize(PatriciaNode::extension(Nibbles::from_raw(prefix.to_vec()), node))
    }
}

fn terminal<V>(rest: &[Nibble], value: V) -> NodeRef<V> {
    Arc::new(PatriciaNode::terminal(Nibbles::from_raw(rest.to_vec()), value))
}

/// Merge `value` under the remaining path `rest` into `node`
fn insert_at<V: Clone>(node: &NodeRef<V>, rest: &[Nibble], value: V) -> NodeRef<V> {
    match node.as_ref() {
        PatriciaNode::Branch { children, value: existing } => match rest.split_first() {
            None => canonicalize(PatriciaNode::branch(children.clone(), Some(value))),
            Some((&nibble, tail)) => {
                let mut children = children.clone();
                let slot = nibble as usize;
                let child = match &children[slot] {
                    Some(child) => insert_at(child, tail, value),
                    None => terminal(tail, value),
                };
                children[slot] = Some(child);
                canonicalize(PatriciaNode::branch(children, existing.clone()))
            }
        },

        PatriciaNode::Extension { shared_prefix, next_node } => {
            let prefix = shared_prefix.as_slice();
            let matched = common_prefix_len(prefix, rest);

            if matched == prefix.len() {
                // The whole prefix is on the key's path
                let child = insert_at(next_node, &rest[matched..], value);
                return canonicalize(PatriciaNode::extension(shared_prefix.clone(), child));
            }

            // Split the extension where the key diverges
            trace!("splitting extension [{}] at {}", shared_prefix, matched);
            let mut children = empty_children();
            let old_rest = &prefix[matched + 1..];
            let old_child = if old_rest.is_empty() {
                next_node.clone()
            } else {
                canonicalize(PatriciaNode::extension(
                    Nibbles::from_raw(old_rest.to_vec()),
                    next_node.clone(),
                ))
            };
            children[prefix[matched] as usize] = Some(old_child);

            let branch_value = if rest.len() == matched {
                Some(value)
            } else {
                children[rest[matched] as usize] = Some(terminal(&rest[matched + 1..], value));
                None
            };

            let branch = canonicalize(PatriciaNode::branch(children, branch_value));
            wrap(&prefix[..matched], branch)
        }

        PatriciaNode::Leaf { key_end, value: old_value } => {
            let key = key_end.as_slice();
            let matched = common_prefix_len(key, rest);

            if matched == key.len() && matched == rest.len() {
                return Arc::new(PatriciaNode::leaf(key_end.clone(), value));
            }

            // One key is a prefix of the other, or they diverge after `matched` nibbles
            let mut children = empty_children();
            let mut branch_value = None;

            if matched == key.len() {
                branch_value = Some(old_value.clone());
            } else {
                children[key[matched] as usize] = Some(terminal(&key[matched + 1..], old_value.clone()));
            }

            if matched == rest.len() {
                branch_value = Some(value);
            } else {
                children[rest[matched] as usize] = Some(terminal(&rest[matched + 1..], value));
            }

            let branch = canonicalize(PatriciaNode::branch(children, branch_value));
            wrap(&rest[..matched], branch)
        }
    }
}

/// Remove the value under `rest` from `node`; `None` means the subtree is gone
fn delete_at<V: Clone>(node: &NodeRef<V>, rest: &[Nibble]) -> Option<NodeRef<V>> {
    match node.as_ref() {
        PatriciaNode::Branch { children, value } => match rest.split_first() {
            None => {
                if value.is_none() {
                    return Some(node.clone());
                }
                if node.child_count() == 0 {
                    return None;
                }
                Some(canonicalize(PatriciaNode::branch(children.clone(), None)))
            }
            Some((&nibble, tail)) => {
                let slot = nibble as usize;
                let child = match &children[slot] {
                    Some(child) => child,
                    None => return Some(node.clone()),
                };

                let mut children = children.clone();
                children[slot] = delete_at(child, tail);

                if value.is_none() && children.iter().all(Option::is_none) {
                    return None;
                }
                Some(canonicalize(PatriciaNode::branch(children, value.clone())))
            }
        },

        PatriciaNode::Extension { shared_prefix, next_node } => {
            let prefix = shared_prefix.as_slice();
            if !rest.starts_with(prefix) {
                return Some(node.clone());
            }

            let child = delete_at(next_node, &rest[prefix.len()..])?;
            Some(canonicalize(PatriciaNode::extension(shared_prefix.clone(), child)))
        }

        PatriciaNode::Leaf { key_end, .. } => {
            if key_end.as_slice() == rest {
                None
            } else {
                Some(node.clone())
            }
        }
    }
}

fn collect_entries<'a, V>(node: &'a PatriciaNode<V>, path: Nibbles, out: &mut Vec<(Nibbles, &'a V)>) {
    match node {
        PatriciaNode::Leaf { key_end, value } => out.push((path.concat(key_end), value)),
        PatriciaNode::Extension { shared_prefix, next_node } => {
            collect_entries(next_node, path.concat(shared_prefix), out)
        }
        PatriciaNode::Branch { children, value } => {
            if let Some(value) = value {
                out.push((path.clone(), value));
            }
            for (i, child) in children.iter().enumerate() {
                if let Some(child) = child {
                    let mut child_path = path.clone();
                    child_path.push(i as Nibble);
                    collect_entries(child, child_path, out);
                }
            }
        }
    }
}
