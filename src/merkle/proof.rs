use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::crypto::hash::{Hash, HashFunction};
use crate::merkle::error::{MerkleError, MerkleResult};
use crate::merkle::tree::{MerkleNode, MerkleTree};

/// One level of an inclusion proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProofStep {
    /// Digest of the node paired with the running hash at this level
    pub sibling_hash: Hash,
    /// True if the sibling sits on the left of the running hash
    pub is_left_sibling: bool,
}

/// Inclusion proof for one record, steps ordered from the leaf up to the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub steps: Vec<MerkleProofStep>,
    pub data_index: usize,
    pub data: Vec<u8>,
}

impl MerkleProof {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fold the steps over `H(data)` to get the root this proof commits to
    pub fn compute_root<H: HashFunction + ?Sized>(&self, hasher: &H) -> Hash {
        self.steps.iter().fold(hasher.hash(&self.data), |current, step| {
            if step.is_left_sibling {
                hasher.combine(&step.sibling_hash, &current)
            } else {
                hasher.combine(&current, &step.sibling_hash)
            }
        })
    }

    /// Check this proof against a trusted root
    pub fn validate<H: HashFunction + ?Sized>(&self, root: &Hash, hasher: &H) -> MerkleResult<()> {
        validate_proof(self, root, hasher)
    }
}

/// Build the inclusion proof for the leaf at `index`.
///
/// Walks down from the root along the bits of `index`; each level records the node
/// on the other side of the path. A leaf paired with itself gets its own digest as sibling.
pub fn generate_proof(tree: &MerkleTree, index: usize) -> MerkleResult<MerkleProof> {
    let leaf_count = tree.leaf_count();
    if index >= leaf_count {
        return Err(MerkleError::IndexOutOfBounds {
            index,
            max: leaf_count - 1,
        });
    }

    let mut steps = Vec::with_capacity(tree.height());
    let mut node: &MerkleNode = tree.root();
    for level in (0..tree.height()).rev() {
        let (left, right) = match node {
            MerkleNode::Branch { left, right, .. } => (left, right),
            MerkleNode::Leaf { .. } => unreachable!("leaf above level 0 in a tree of height {}", tree.height()),
        };

        if (index >> level) & 1 == 1 {
            steps.push(MerkleProofStep {
                sibling_hash: *left.hash(),
                is_left_sibling: true,
            });
            node = right.as_ref();
        } else {
            steps.push(MerkleProofStep {
                sibling_hash: *right.hash(),
                is_left_sibling: false,
            });
            node = left.as_ref();
        }
    }
    steps.reverse();

    debug!("generated proof for leaf {} ({} steps)", index, steps.len());
    Ok(MerkleProof {
        steps,
        data_index: index,
        data: tree.data_blocks()[index].clone(),
    })
}

/// Verify `proof` against `root`; fails with both digests on mismatch
pub fn validate_proof<H: HashFunction + ?Sized>(proof: &MerkleProof, root: &Hash, hasher: &H) -> MerkleResult<()> {
    let computed = proof.compute_root(hasher);
    if &computed == root {
        Ok(())
    } else {
        warn!("proof for leaf {} does not match root {}", proof.data_index, root.short(16));
        Err(MerkleError::InvalidProof {
            expected: root.to_hex(),
            actual: computed.to_hex(),
        })
    }
}

impl MerkleTree {
    /// Inclusion proof for the leaf at `index`
    pub fn generate_proof(&self, index: usize) -> MerkleResult<MerkleProof> {
        generate_proof(self, index)
    }
}
