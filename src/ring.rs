//! Consistent-hash ring mapping a key to an ordered list of candidate replicas.
//!
//! One point per node, no virtual nodes. Hashing is FNV-1a 32-bit.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RingError {
    #[error("nodes {0} and {1} hash to the same value")]
    HashCollision(String, String),
}

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// FNV-1a over the UTF-8 bytes of `data`. Deterministic across process restarts and independent
/// of process-local state, as required by the ring's hash contract.
pub fn hash32(data: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in data.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// An immutable ring built once at proxy startup from a static node list.
pub struct Ring {
    sorted: Vec<(u32, String)>,
}

impl Ring {
    pub fn new(nodes: impl IntoIterator<Item = String>) -> Result<Self, RingError> {
        let mut lookup: HashMap<u32, String> = HashMap::new();
        let mut sorted: Vec<(u32, String)> = Vec::new();

        for node in nodes {
            let h = hash32(&node);
            match lookup.get(&h) {
                Some(existing) if existing == &node => continue, // duplicate entry, harmless
                Some(existing) => {
                    return Err(RingError::HashCollision(existing.clone(), node));
                }
                None => {
                    lookup.insert(h, node.clone());
                    sorted.push((h, node));
                }
            }
        }
        sorted.sort_by_key(|(h, _)| *h);

        Ok(Self { sorted })
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Returns up to `n` distinct nodes, walking forward from the first hash `>= hash(key)` and
    /// wrapping around. With one point per node "distinct" is automatic, but the dedup pass is
    /// kept so the algorithm stays correct if virtual nodes are ever added.
    pub fn get_nodes(&self, key: &str, n: usize) -> Vec<String> {
        if self.sorted.is_empty() || n == 0 {
            return Vec::new();
        }

        let h = hash32(key);
        let start = self.sorted.partition_point(|(node_hash, _)| *node_hash < h);

        let mut seen = HashSet::with_capacity(n);
        let mut result = Vec::with_capacity(n.min(self.sorted.len()));
        for offset in 0..self.sorted.len() {
            let (_, node) = &self.sorted[(start + offset) % self.sorted.len()];
            if seen.insert(node.as_str()) {
                result.push(node.clone());
                if result.len() == n {
                    break;
                }
            }
        }
        result
    }
}
