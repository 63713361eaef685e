use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::hashing::HashAlgorithm;
use super::{Block, Blockchain};
use crate::error::{ChainError, Result};

/// Persisted form of a chain: metadata plus the ordered block records,
/// written and read verbatim by the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub name: String,
    pub saved_at: String, // RFC 3339
    pub algorithm: HashAlgorithm,
    pub difficulty: u32,
    pub chain: Vec<Block>,
}

impl ChainSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot. Anything that cannot become a chain is `CorruptSnapshot`.
    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: ChainSnapshot =
            serde_json::from_str(text).map_err(|e| ChainError::CorruptSnapshot(e.to_string()))?;
        if snapshot.chain.is_empty() {
            return Err(ChainError::CorruptSnapshot("chain has no blocks".into()));
        }
        Ok(snapshot)
    }
}

impl Blockchain {
    /// Dump the chain as-is, including any tampered blocks.
    pub fn to_snapshot(&self, name: impl Into<String>) -> ChainSnapshot {
        ChainSnapshot {
            name: name.into(),
            saved_at: Utc::now().to_rfc3339(),
            algorithm: self.algorithm,
            difficulty: self.difficulty,
            chain: self.chain.clone(),
        }
    }

    /// Rebuild a chain from a snapshot. Stored hashes are kept, not recomputed;
    /// run `validate()` to find out whether they still hold.
    pub fn from_snapshot(snapshot: ChainSnapshot) -> Result<Self> {
        Blockchain::from_blocks(snapshot.chain, snapshot.algorithm, snapshot.difficulty)
    }
}
