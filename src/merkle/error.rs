use thiserror::Error;

/// Merkle tree error types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// A tree needs at least one record
    #[error("Cannot build a Merkle tree from an empty batch")]
    EmptyInput,

    /// Proof requested for a leaf that does not exist
    #[error("Leaf index {index} out of bounds (max {max})")]
    IndexOutOfBounds {
        index: usize,
        max: usize,
    },

    /// Recomputed root does not match the trusted root
    #[error("Invalid proof: expected root {expected}, got {actual}")]
    InvalidProof {
        expected: String,
        actual: String,
    },

    /// A record could not be serialized into a leaf
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type MerkleResult<T> = Result<T, MerkleError>;
