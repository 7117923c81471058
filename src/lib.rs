// Vibecoin Trie - Merkle Patricia Trie and binary Merkle tree for VibeCoin state and block data

pub mod config;
pub mod crypto;
pub mod merkle;
pub mod trie;

// Re-export main components for easier access
pub use config::{Config, HashAlgorithm};
pub use crypto::{Hash, HashFunction, Keccak256Hasher, Sha256Hasher};
pub use merkle::{MerkleError, MerkleNode, MerkleProof, MerkleProofStep, MerkleTree};
pub use trie::{Nibbles, PatriciaNode, PatriciaTrie, TrieError};

// Initialize logging
pub fn init_logger() {
    env_logger::init();
}

/// Initialize logging, ignoring an already-installed logger
pub fn try_init_logger() {
    let _ = env_logger::builder().is_test(cfg!(test)).try_init();
}
