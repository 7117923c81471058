//! Nibble encoding for trie keys.
//!
//! Keys arrive as hex strings (optionally `0x`-prefixed); every hex character becomes one
//! nibble, and the trie branches sixteen ways on each nibble.

use std::fmt;

use crate::trie::error::{TrieError, TrieResult};

/// Nibble is a 4-bit value (0-15)
pub type Nibble = u8;

/// Hex digit used as the canonical name of a branch slot
pub fn nibble_to_key(nibble: Nibble) -> char {
    assert!(nibble < 16, "invalid nibble: {}", nibble);
    char::from_digit(nibble as u32, 16).unwrap_or('?')
}

/// Decode a single hex character into a nibble
pub fn hex_char_to_nibble(c: char) -> Option<Nibble> {
    c.to_digit(16).map(|d| d as Nibble)
}

/// Ordered sequence of nibbles, used both as a key remainder and as a node path segment
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Nibbles {
    data: Vec<Nibble>,
}

impl Nibbles {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Convert a hex string key into nibbles, stripping an optional `0x` prefix
    pub fn from_hex(key: &str) -> TrieResult<Self> {
        let digits = key.strip_prefix("0x").unwrap_or(key);
        let mut data = Vec::with_capacity(digits.len());

        for c in digits.chars() {
            match hex_char_to_nibble(c) {
                Some(nibble) => data.push(nibble),
                None => {
                    return Err(TrieError::InvalidKey {
                        key: key.to_string(),
                        character: c,
                    })
                }
            }
        }

        Ok(Self { data })
    }

    /// Split every byte into its high and low nibble
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut data = Vec::with_capacity(bytes.len() * 2);
        for &byte in bytes {
            data.push(byte >> 4);
            data.push(byte & 0x0F);
        }
        Self { data }
    }

    /// Wrap raw nibble values; panics if any value is not a nibble
    pub fn from_raw(data: Vec<Nibble>) -> Self {
        assert!(data.iter().all(|&n| n < 16), "nibble out of range in {:?}", data);
        Self { data }
    }

    /// Single-nibble sequence
    pub fn single(nibble: Nibble) -> Self {
        Self::from_raw(vec![nibble])
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Nibble at `index`, if in range
    pub fn get(&self, index: usize) -> Option<Nibble> {
        self.data.get(index).copied()
    }

    pub fn first(&self) -> Option<Nibble> {
        self.data.first().copied()
    }

    pub fn as_slice(&self) -> &[Nibble] {
        &self.data
    }

    /// Nibbles from `start` to the end
    pub fn slice_from(&self, start: usize) -> Self {
        Self { data: self.data[start..].to_vec() }
    }

    /// Nibbles in `start..end`
    pub fn slice(&self, start: usize, end: usize) -> Self {
        Self { data: self.data[start..end].to_vec() }
    }

    /// Length of the longest shared prefix, bounded by the shorter sequence
    pub fn common_prefix_len(&self, other: &Nibbles) -> usize {
        common_prefix_len(&self.data, &other.data)
    }

    /// `self ++ other`
    pub fn concat(&self, other: &Nibbles) -> Self {
        let mut data = Vec::with_capacity(self.len() + other.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(&other.data);
        Self { data }
    }

    /// `[nibble] ++ self`
    pub fn prepend(&self, nibble: Nibble) -> Self {
        assert!(nibble < 16, "invalid nibble: {}", nibble);
        let mut data = Vec::with_capacity(self.len() + 1);
        data.push(nibble);
        data.extend_from_slice(&self.data);
        Self { data }
    }

    pub fn push(&mut self, nibble: Nibble) {
        assert!(nibble < 16, "invalid nibble: {}", nibble);
        self.data.push(nibble);
    }

    /// Lowercase hex rendering, one character per nibble
    pub fn to_hex(&self) -> String {
        self.data.iter().map(|&n| nibble_to_key(n)).collect()
    }
}

/// Length of the longest shared prefix of two nibble slices
pub fn common_prefix_len(a: &[Nibble], b: &[Nibble]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

impl fmt::Debug for Nibbles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nibbles({})", self.to_hex())
    }
}

impl fmt::Display for Nibbles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
