//! Canonical serialization and hashing of trie nodes.
//!
//! Every node is serialized as a tagged tuple and hashed bottom-up:
//!
//! - branch: `("branch", value or null, {nibble key: child digest})`
//! - extension: `("ext", shared prefix, child digest)`
//! - leaf: `("leaf", key end, value)`
//!
//! Paths are rendered as hex strings and child digests as 64-character hex. The tuple is
//! encoded with bincode, which is deterministic and length-prefixes every field.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::crypto::hash::{Hash, HashFunction};
use crate::trie::encode::nibble_to_key;
use crate::trie::error::{TrieError, TrieResult};
use crate::trie::node::PatriciaNode;

const BRANCH_TAG: &str = "branch";
const EXTENSION_TAG: &str = "ext";
const LEAF_TAG: &str = "leaf";

/// Serialize a node to its canonical byte form; child digests are computed recursively
pub fn serialize_node<V, H>(node: &PatriciaNode<V>, hasher: &H) -> TrieResult<Vec<u8>>
where
    V: Serialize,
    H: HashFunction + ?Sized,
{
    let encoded = match node {
        PatriciaNode::Branch { children, value } => {
            let mut child_hashes = BTreeMap::new();
            for (i, child) in children.iter().enumerate() {
                if let Some(child) = child {
                    let key = nibble_to_key(i as u8).to_string();
                    child_hashes.insert(key, node_hash(child, hasher)?.to_hex());
                }
            }
            bincode::serialize(&(BRANCH_TAG, value.as_ref(), child_hashes))
        }
        PatriciaNode::Extension { shared_prefix, next_node } => {
            let child_hash = node_hash(next_node, hasher)?.to_hex();
            bincode::serialize(&(EXTENSION_TAG, shared_prefix.to_hex(), child_hash))
        }
        PatriciaNode::Leaf { key_end, value } => {
            bincode::serialize(&(LEAF_TAG, key_end.to_hex(), value))
        }
    };

    encoded.map_err(|e| TrieError::Serialization(e.to_string()))
}

/// Hash of a node: `H(serialize(node))`
pub fn node_hash<V, H>(node: &PatriciaNode<V>, hasher: &H) -> TrieResult<Hash>
where
    V: Serialize,
    H: HashFunction + ?Sized,
{
    let bytes = serialize_node(node, hasher)?;
    Ok(hasher.hash(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::{Keccak256Hasher, Sha256Hasher};
    use crate::trie::encode::Nibbles;
    use crate::trie::node::empty_children;
    use std::sync::Arc;

    fn nibbles(hex: &str) -> Nibbles {
        Nibbles::from_hex(hex).unwrap()
    }

    #[test]
    fn test_leaf_hash_is_hash_of_tuple() {
        let leaf = PatriciaNode::leaf(nibbles("a1"), "v".to_string());
        let expected_bytes = bincode::serialize(&("leaf", "a1".to_string(), "v".to_string())).unwrap();

        assert_eq!(serialize_node(&leaf, &Sha256Hasher).unwrap(), expected_bytes);
        assert_eq!(node_hash(&leaf, &Sha256Hasher).unwrap(), Sha256Hasher.hash(&expected_bytes));
    }

    #[test]
    fn test_node_kinds_hash_differently() {
        let leaf = Arc::new(PatriciaNode::leaf(nibbles("1"), 1u64));
        let ext = PatriciaNode::extension(nibbles("1"), leaf.clone());
        let mut children = empty_children();
        children[1] = Some(leaf.clone());
        let branch = PatriciaNode::branch(children, None);

        let leaf_hash = node_hash(leaf.as_ref(), &Sha256Hasher).unwrap();
        let ext_hash = node_hash(&ext, &Sha256Hasher).unwrap();
        let branch_hash = node_hash(&branch, &Sha256Hasher).unwrap();

        assert_ne!(leaf_hash, ext_hash);
        assert_ne!(leaf_hash, branch_hash);
        assert_ne!(ext_hash, branch_hash);
    }

    #[test]
    fn test_branch_value_changes_hash() {
        let with_none: PatriciaNode<u64> = PatriciaNode::branch(empty_children(), None);
        let with_zero = PatriciaNode::branch(empty_children(), Some(0u64));
        assert_ne!(
            node_hash(&with_none, &Sha256Hasher).unwrap(),
            node_hash(&with_zero, &Sha256Hasher).unwrap()
        );
    }

    #[test]
    fn test_child_change_propagates() {
        let mut a = empty_children();
        a[2] = Some(Arc::new(PatriciaNode::leaf(nibbles("ff"), "x")));
        a[3] = Some(Arc::new(PatriciaNode::leaf(nibbles("ff"), "y")));
        let mut b = a.clone();
        b[3] = Some(Arc::new(PatriciaNode::leaf(nibbles("ff"), "z")));

        let hash_a = node_hash(&PatriciaNode::branch(a, None), &Sha256Hasher).unwrap();
        let hash_b = node_hash(&PatriciaNode::branch(b, None), &Sha256Hasher).unwrap();
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn test_algorithm_is_pluggable() {
        let leaf = PatriciaNode::leaf(nibbles("abc"), "v");
        assert_ne!(
            node_hash(&leaf, &Sha256Hasher).unwrap(),
            node_hash(&leaf, &Keccak256Hasher).unwrap()
        );
    }
}
