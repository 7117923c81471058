use thiserror::Error;

/// Trie error types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrieError {
    /// Key contains a character that is not a hex digit
    #[error("Invalid key {key:?}: {character:?} is not a hex digit")]
    InvalidKey {
        key: String,
        character: char,
    },

    /// Canonical node serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for trie operations
pub type TrieResult<T> = std::result::Result<T, TrieError>;
