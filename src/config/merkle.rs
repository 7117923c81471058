use serde::{Deserialize, Serialize};

/// Merkle tree builder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleConfig {
    /// Minimum number of nodes on a level before pairs are hashed in parallel
    pub parallel_threshold: usize,
}

impl Default for MerkleConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 1024,
        }
    }
}
