use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::hashing::{HashAlgorithm, meets_difficulty};
use super::{GENESIS_DATA, GENESIS_PREVIOUS_HASH};

/// A single block in the chain holding a free-form text payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64, // Unix seconds (UTC), microsecond resolution
    pub data: String,
    pub previous_hash: String,
    pub nonce: u64,   // Proof-of-Work nonce
    pub hash: String, // Cached hash of the block
    pub difficulty: u32,
}

/// Current time as fractional Unix seconds.
pub fn now_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

impl Block {
    /// Create the genesis block (first block in the chain). It is never mined.
    pub fn genesis(algorithm: HashAlgorithm) -> Self {
        Self::new_with_timestamp(
            0,
            GENESIS_PREVIOUS_HASH.to_string(),
            GENESIS_DATA.to_string(),
            0,
            now_timestamp(),
            algorithm,
        )
    }

    /// Create a new block (not mined yet). Hand it to the miner to perform PoW.
    pub fn new(
        index: u64,
        previous_hash: String,
        data: String,
        difficulty: u32,
        algorithm: HashAlgorithm,
    ) -> Self {
        Self::new_with_timestamp(index, previous_hash, data, difficulty, now_timestamp(), algorithm)
    }

    pub fn new_with_timestamp(
        index: u64,
        previous_hash: String,
        data: String,
        difficulty: u32,
        timestamp: f64,
        algorithm: HashAlgorithm,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            data,
            previous_hash,
            nonce: 0,
            hash: String::new(),
            difficulty,
        };
        block.hash = block.compute_hash(algorithm);
        block
    }

    /// Bytes fed to the digest: `index`, `timestamp`, `data`, `previous_hash`
    /// and `nonce` as text, in that order, with no separators. Changing this
    /// invalidates every stored hash.
    pub fn preimage(&self) -> String {
        self.preimage_with_nonce(self.nonce)
    }

    pub(crate) fn preimage_with_nonce(&self, nonce: u64) -> String {
        format!(
            "{}{}{}{}{}",
            self.index, self.timestamp, self.data, self.previous_hash, nonce
        )
    }

    /// Hash of the block's current fields (the stored `hash` is not an input).
    pub fn compute_hash(&self, algorithm: HashAlgorithm) -> String {
        algorithm.digest(self.preimage().as_bytes())
    }

    /// Validate that the cached `hash` matches the content and satisfies the
    /// block's own difficulty. (Does NOT validate chain linkage.)
    pub fn is_valid(&self, algorithm: HashAlgorithm) -> bool {
        self.hash == self.compute_hash(algorithm) && meets_difficulty(&self.hash, self.difficulty)
    }

    /// Short form used in log lines.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..16).unwrap_or(&self.hash)
    }
}
