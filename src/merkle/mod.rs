//! Binary Merkle tree over an ordered batch of records, with inclusion proofs.

pub mod error;
pub mod proof;
pub mod tree;

pub use error::{MerkleError, MerkleResult};
pub use proof::{generate_proof, validate_proof, MerkleProof, MerkleProofStep};
pub use tree::{MerkleNode, MerkleStats, MerkleTree};
