//! Persistent Merkle Patricia Trie keyed by hex strings.

pub mod compress;
pub mod encode;
pub mod error;
pub mod hasher;
pub mod mpt;
pub mod node;

pub use compress::{canonicalize, compress};
pub use encode::{Nibble, Nibbles};
pub use error::{TrieError, TrieResult};
pub use hasher::{node_hash, serialize_node};
pub use mpt::PatriciaTrie;
pub use node::{NodeRef, PatriciaNode};
