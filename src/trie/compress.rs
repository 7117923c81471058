//! Structural normalization of trie nodes.
//!
//! After every mutation the trie is brought back to its canonical shape, which depends only on
//! the stored key/value set:
//!
//! - a branch with one child and no value collapses into an extension over that child
//! - an extension over an extension merges the two prefixes
//! - an extension over a leaf, or over a branch that only holds a value, becomes one leaf

use std::sync::Arc;

use log::trace;

use crate::trie::encode::{Nibble, Nibbles};
use crate::trie::node::{Children, NodeRef, PatriciaNode};

/// Normalize a single node whose children are already canonical.
///
/// Insert and delete call this on every node they rebuild, bottom-up along the touched
/// path; untouched subtrees are canonical already and are shared as-is.
pub fn canonicalize<V: Clone>(node: PatriciaNode<V>) -> NodeRef<V> {
    match node {
        PatriciaNode::Leaf { .. } => Arc::new(node),
        PatriciaNode::Extension { shared_prefix, next_node } => merge_extension(shared_prefix, next_node),
        PatriciaNode::Branch { children, value } => {
            if value.is_none() {
                if let Some((nibble, child)) = single_child(&children) {
                    trace!("collapsing single-child branch at nibble {:x}", nibble);
                    return merge_extension(Nibbles::single(nibble), child);
                }
            }
            Arc::new(PatriciaNode::Branch { children, value })
        }
    }
}

/// The only occupied slot of a branch, if exactly one is occupied
fn single_child<V>(children: &Children<V>) -> Option<(Nibble, NodeRef<V>)> {
    let mut occupied = children
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.as_ref().map(|c| (i as Nibble, c.clone())));

    match (occupied.next(), occupied.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

/// Build the canonical form of `Extension { prefix, child }` for a canonical `child`
fn merge_extension<V: Clone>(prefix: Nibbles, child: NodeRef<V>) -> NodeRef<V> {
    let merged = match child.as_ref() {
        PatriciaNode::Extension { shared_prefix, next_node } => {
            trace!("merging extension [{}] with [{}]", prefix, shared_prefix);
            Some(PatriciaNode::extension(prefix.concat(shared_prefix), next_node.clone()))
        }
        PatriciaNode::Leaf { key_end, value } => {
            Some(PatriciaNode::leaf(prefix.concat(key_end), value.clone()))
        }
        PatriciaNode::Branch { children, value: Some(value) } if children.iter().all(Option::is_none) => {
            Some(PatriciaNode::leaf(prefix.clone(), value.clone()))
        }
        PatriciaNode::Branch { .. } => None,
    };

    match merged {
        Some(node) => Arc::new(node),
        None => Arc::new(PatriciaNode::extension(prefix, child)),
    }
}

/// Recursively compress a whole subtree, children before parents
pub fn compress<V: Clone>(node: &NodeRef<V>) -> NodeRef<V> {
    match node.as_ref() {
        PatriciaNode::Leaf { .. } => node.clone(),
        PatriciaNode::Extension { shared_prefix, next_node } => {
            let child = compress(next_node);
            merge_extension(shared_prefix.clone(), child)
        }
        PatriciaNode::Branch { children, value } => {
            let mut compressed = children.clone();
            for slot in compressed.iter_mut() {
                if let Some(child) = slot {
                    *child = compress(child);
                }
            }
            canonicalize(PatriciaNode::Branch {
                children: compressed,
                value: value.clone(),
            })
        }
    }
}
