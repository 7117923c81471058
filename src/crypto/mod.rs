// VibeCoin Cryptography Module
//
// This module provides the hashing primitive consumed by the trie and the Merkle tree:
// - 32-byte digests with hex rendering
// - SHA-256 and Keccak-256 implementations behind a common trait
// - Pair combination for Merkle parents and proof steps

pub mod hash;

// Re-export main components for easier access
pub use hash::{keccak256, sha256, Hash, HashAlgorithm, HashFunction, Keccak256Hasher, Sha256Hasher, HASH_LENGTH};
