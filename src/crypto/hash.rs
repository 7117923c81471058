use sha2::{Digest, Sha256};
use sha3::Keccak256;
use serde::{Serialize, Deserialize};
use std::fmt;

/// Length of a digest in bytes
pub const HASH_LENGTH: usize = 32;

/// Compute SHA-256 hash of data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Compute Keccak-256 hash of data (the pre-standard SHA-3 variant used by Ethereum)
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Supported hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha256,
    Keccak256,
}

impl HashAlgorithm {
    /// Name used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Keccak256 => "keccak256",
        }
    }

    /// Get a hasher implementing this algorithm
    pub fn hasher(&self) -> Box<dyn HashFunction> {
        match self {
            HashAlgorithm::Sha256 => Box::new(Sha256Hasher),
            HashAlgorithm::Keccak256 => Box::new(Keccak256Hasher),
        }
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        HashAlgorithm::Sha256
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A 32-byte hash value
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Hash([u8; HASH_LENGTH]);

impl Hash {
    /// Create a new hash from bytes
    pub fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse a hash from 64 hex characters, with or without a `0x` prefix
    pub fn from_hex(hex_str: &str) -> Option<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str).ok()?;
        if bytes.len() != HASH_LENGTH {
            return None;
        }

        let mut hash = [0u8; HASH_LENGTH];
        hash.copy_from_slice(&bytes);
        Some(Self(hash))
    }

    /// Get the hash as bytes
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Lowercase hex digest, no scheme prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First `len` hex characters of the digest, for display
    pub fn short(&self, len: usize) -> String {
        let mut s = self.to_hex();
        s.truncate(len);
        s
    }

    /// Create a zero hash (all zeros)
    pub fn zero() -> Self {
        Self([0u8; HASH_LENGTH])
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_LENGTH]> for Hash {
    fn from(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Collision-resistant hash function consumed by the trie hasher and the Merkle builder.
///
/// `combine` hashes the concatenation of the two hex digests, so a parent digest can be
/// recomputed by anyone holding only the rendered child digests.
pub trait HashFunction: Send + Sync {
    /// Hash arbitrary bytes
    fn hash(&self, data: &[u8]) -> Hash;

    /// The algorithm this function implements
    fn algorithm(&self) -> HashAlgorithm;

    /// Hash two digests into a parent digest
    fn combine(&self, left: &Hash, right: &Hash) -> Hash {
        let mut joined = String::with_capacity(HASH_LENGTH * 4);
        joined.push_str(&left.to_hex());
        joined.push_str(&right.to_hex());
        self.hash(joined.as_bytes())
    }
}

impl<T: HashFunction + ?Sized> HashFunction for &T {
    fn hash(&self, data: &[u8]) -> Hash {
        (**self).hash(data)
    }

    fn algorithm(&self) -> HashAlgorithm {
        (**self).algorithm()
    }

    fn combine(&self, left: &Hash, right: &Hash) -> Hash {
        (**self).combine(left, right)
    }
}

impl<T: HashFunction + ?Sized> HashFunction for Box<T> {
    fn hash(&self, data: &[u8]) -> Hash {
        (**self).hash(data)
    }

    fn algorithm(&self) -> HashAlgorithm {
        (**self).algorithm()
    }

    fn combine(&self, left: &Hash, right: &Hash) -> Hash {
        (**self).combine(left, right)
    }
}

/// SHA-256 hashing primitive
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl HashFunction for Sha256Hasher {
    fn hash(&self, data: &[u8]) -> Hash {
        Hash(sha256(data))
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }
}

/// Keccak-256 hashing primitive
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256Hasher;

impl HashFunction for Keccak256Hasher {
    fn hash(&self, data: &[u8]) -> Hash {
        Hash(keccak256(data))
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Keccak256
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        // Test vector from https://www.di-mgt.com.au/sha_testvectors.html
        let input = b"abc";
        let expected = hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad").unwrap();

        let result = sha256(input);
        assert_eq!(result.to_vec(), expected);
    }

    #[test]
    fn test_keccak256() {
        // Keccak-256 of the empty string
        let expected = "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";
        assert_eq!(Keccak256Hasher.hash(b"").to_hex(), expected);
        assert_ne!(Keccak256Hasher.hash(b"abc"), Sha256Hasher.hash(b"abc"));
    }

    #[test]
    fn test_hex_rendering() {
        let hash = Sha256Hasher.hash(b"vibecoin");
        let hex = hash.to_hex();

        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(format!("{}", hash), hex);
        assert_eq!(Hash::from_hex(&hex), Some(hash));
        assert_eq!(Hash::from_hex(&format!("0x{}", hex)), Some(hash));
        assert_eq!(Hash::from_hex("abcd"), None);
        assert_eq!(hash.short(16).len(), 16);
    }

    #[test]
    fn test_combine_hashes_hex_concatenation() {
        let left = Sha256Hasher.hash(b"left");
        let right = Sha256Hasher.hash(b"right");

        let joined = format!("{}{}", left, right);
        assert_eq!(Sha256Hasher.combine(&left, &right), Sha256Hasher.hash(joined.as_bytes()));

        // Order matters
        assert_ne!(Sha256Hasher.combine(&left, &right), Sha256Hasher.combine(&right, &left));
    }

    #[test]
    fn test_boxed_hasher_delegates() {
        let boxed = HashAlgorithm::Keccak256.hasher();
        assert_eq!(boxed.algorithm(), HashAlgorithm::Keccak256);
        assert_eq!(boxed.hash(b"data"), Keccak256Hasher.hash(b"data"));
    }
}
