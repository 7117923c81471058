use std::fmt;
use std::sync::Arc;

use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::MerkleConfig;
use crate::crypto::hash::{Hash, HashFunction};
use crate::merkle::error::{MerkleError, MerkleResult};

/// Number of hex characters shown per digest when rendering a tree
const DISPLAY_DIGEST_LEN: usize = 16;

/// Node of a binary Merkle tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MerkleNode {
    /// Leaf over one serialized record
    Leaf {
        hash: Hash,
        value: Vec<u8>,
    },

    /// Parent of two nodes; on an odd level the last node is paired with itself
    Branch {
        hash: Hash,
        left: Arc<MerkleNode>,
        right: Arc<MerkleNode>,
    },
}

impl MerkleNode {
    pub fn hash(&self) -> &Hash {
        match self {
            MerkleNode::Leaf { hash, .. } => hash,
            MerkleNode::Branch { hash, .. } => hash,
        }
    }

    /// Serialized record of a leaf
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            MerkleNode::Leaf { value, .. } => Some(value),
            MerkleNode::Branch { .. } => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, MerkleNode::Leaf { .. })
    }

    fn leaf<H: HashFunction + ?Sized>(value: Vec<u8>, hasher: &H) -> Self {
        MerkleNode::Leaf {
            hash: hasher.hash(&value),
            value,
        }
    }

    /// Parent of `pair[0]` and `pair[1]`, or of `pair[0]` with itself
    fn parent<H: HashFunction + ?Sized>(pair: &[Arc<MerkleNode>], hasher: &H) -> Arc<MerkleNode> {
        let left = pair[0].clone();
        let right = pair.get(1).unwrap_or(&pair[0]).clone();
        Arc::new(MerkleNode::Branch {
            hash: hasher.combine(left.hash(), right.hash()),
            left,
            right,
        })
    }
}

/// Summary of a built tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MerkleStats {
    pub leaf_count: usize,
    pub height: usize,
    pub root_hash: Hash,
    /// Number of steps in every inclusion proof
    pub proof_size: usize,
}

impl fmt::Display for MerkleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Merkle Tree Statistics")?;
        writeln!(f, "  Leaves:     {}", self.leaf_count)?;
        writeln!(f, "  Height:     {}", self.height)?;
        writeln!(f, "  Root hash:  {}", self.root_hash)?;
        write!(f, "  Proof size: {}", self.proof_size)
    }
}

/// Immutable binary Merkle tree built once from a batch of records
#[derive(Debug, Clone)]
pub struct MerkleTree {
    root: Arc<MerkleNode>,
    leaves: Vec<Arc<MerkleNode>>,
    data_blocks: Vec<Vec<u8>>,
    height: usize,
}

impl MerkleTree {
    /// Build a tree over already-serialized records
    pub fn build<B, H>(blocks: &[B], hasher: &H) -> MerkleResult<Self>
    where
        B: AsRef<[u8]>,
        H: HashFunction + ?Sized,
    {
        Self::build_with_config(blocks, hasher, &MerkleConfig::default())
    }

    /// Build a tree, hashing wide levels in parallel above `config.parallel_threshold`
    pub fn build_with_config<B, H>(blocks: &[B], hasher: &H, config: &MerkleConfig) -> MerkleResult<Self>
    where
        B: AsRef<[u8]>,
        H: HashFunction + ?Sized,
    {
        if blocks.is_empty() {
            return Err(MerkleError::EmptyInput);
        }

        let data_blocks: Vec<Vec<u8>> = blocks.iter().map(|b| b.as_ref().to_vec()).collect();
        let leaves: Vec<Arc<MerkleNode>> = data_blocks
            .iter()
            .map(|data| Arc::new(MerkleNode::leaf(data.clone(), hasher)))
            .collect();

        let mut level = leaves.clone();
        let mut height = 0;
        while level.len() > 1 {
            level = if level.len() >= config.parallel_threshold {
                level.par_chunks(2).map(|pair| MerkleNode::parent(pair, hasher)).collect()
            } else {
                level.chunks(2).map(|pair| MerkleNode::parent(pair, hasher)).collect()
            };
            height += 1;
        }

        let root = level.swap_remove(0);
        debug!(
            "built Merkle tree over {} leaves (height {}, root {})",
            leaves.len(),
            height,
            root.hash().short(DISPLAY_DIGEST_LEN)
        );

        Ok(Self {
            root,
            leaves,
            data_blocks,
            height,
        })
    }

    /// Build a tree over records serialized as JSON
    pub fn from_records<R, H>(records: &[R], hasher: &H) -> MerkleResult<Self>
    where
        R: Serialize,
        H: HashFunction + ?Sized,
    {
        let blocks = records
            .iter()
            .map(serde_json::to_vec)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| MerkleError::Serialization(e.to_string()))?;
        Self::build(&blocks, hasher)
    }

    pub fn root(&self) -> &Arc<MerkleNode> {
        &self.root
    }

    pub fn root_hash(&self) -> &Hash {
        self.root.hash()
    }

    /// Root digest as 64 hex characters
    pub fn get_root_hash(&self) -> String {
        self.root.hash().to_hex()
    }

    pub fn leaves(&self) -> &[Arc<MerkleNode>] {
        &self.leaves
    }

    pub fn data_blocks(&self) -> &[Vec<u8>] {
        &self.data_blocks
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Number of levels above the leaves; 0 for a single-leaf tree
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn statistics(&self) -> MerkleStats {
        MerkleStats {
            leaf_count: self.leaf_count(),
            height: self.height,
            root_hash: *self.root_hash(),
            proof_size: self.height,
        }
    }
}

fn fmt_subtree(f: &mut fmt::Formatter<'_>, node: &MerkleNode, depth: usize, label: &str) -> fmt::Result {
    let indent = "  ".repeat(depth);
    let digest = node.hash().short(DISPLAY_DIGEST_LEN);
    match node {
        MerkleNode::Leaf { value, .. } => {
            writeln!(f, "{}{}{} ({})", indent, label, digest, String::from_utf8_lossy(value))
        }
        MerkleNode::Branch { left, right, .. } => {
            writeln!(f, "{}{}{}", indent, label, digest)?;
            fmt_subtree(f, left, depth + 1, "L--- ")?;
            if !Arc::ptr_eq(left, right) {
                fmt_subtree(f, right, depth + 1, "R--- ")?;
            }
            Ok(())
        }
    }
}

impl fmt::Display for MerkleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_subtree(f, &self.root, 0, "Root: ")
    }
}
