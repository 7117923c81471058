use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::crypto::hash::HashAlgorithm;

/// Hashing configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashConfig {
    /// Digest algorithm used by the trie hasher and the Merkle builder
    pub algorithm: HashAlgorithm,
}

impl std::str::FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "keccak256" | "keccak-256" => Ok(HashAlgorithm::Keccak256),
            other => Err(ConfigError::UnknownAlgorithm(other.to_string())),
        }
    }
}
