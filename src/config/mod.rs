use serde::{Serialize, Deserialize};
use std::fs;
use std::path::Path;
use log::info;
use thiserror::Error;

mod hash;
mod merkle;

pub use hash::HashConfig;
pub use merkle::MerkleConfig;
pub use crate::crypto::hash::HashAlgorithm;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the config file
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered as TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Unknown hash algorithm name
    #[error("Unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main configuration for the trie and Merkle tree library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Hashing configuration
    #[serde(default)]
    pub hash: HashConfig,

    /// Merkle tree builder configuration
    #[serde(default)]
    pub merkle: MerkleConfig,
}

impl Config {
    /// Parse a configuration from TOML text; missing sections take their defaults
    pub fn from_toml_str(config_str: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(config_str)?)
    }

    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&config_str)?;

        info!("Loaded config from {:?} (hash: {})", path, config.hash.algorithm);
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let config_str = toml::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    /// Generate a default configuration file if it doesn't exist
    pub fn generate_default<P: AsRef<Path>>(path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        if path.exists() {
            info!("Config file already exists at {:?}", path);
            return Ok(());
        }

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        Config::default().save(path)?;

        info!("Generated default config at {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip() {
        let config = Config {
            hash: HashConfig { algorithm: HashAlgorithm::Keccak256 },
            merkle: MerkleConfig { parallel_threshold: 8 },
        };

        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("algorithm = \"keccak256\""));
        assert_eq!(Config::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::from_toml_str("[hash]\nalgorithm = \"keccak256\"\n").unwrap();
        assert_eq!(config.hash.algorithm, HashAlgorithm::Keccak256);
        assert_eq!(config.merkle, MerkleConfig::default());

        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let err = Config::from_toml_str("[hash]\nalgorithm = \"md5\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
