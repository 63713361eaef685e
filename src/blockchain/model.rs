use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::Block;
use super::hashing::HashAlgorithm;
use super::miner::{self, MiningControl};
use super::validation::{ValidationReport, validate_blocks};
use crate::error::{ChainError, Result};

/// Simple in-memory blockchain with Proof-of-Work.
#[derive(Debug, Clone)]
///
/// Blocks are only added by mining; the tamper simulator is the one writer
/// allowed to touch a stored block.
pub struct Blockchain {
    pub(super) chain: Vec<Block>,
    pub(super) difficulty: u32,
    pub(super) algorithm: HashAlgorithm,
}

/// Summary of a chain for listings and API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub length: usize,
    pub difficulty: u32,
    pub algorithm: HashAlgorithm,
    pub digest_bits: usize,
    pub genesis_hash: String,
    pub latest_hash: String,
}

impl Blockchain {
    /// Initialize a new blockchain with a genesis block.
    pub fn new(algorithm: HashAlgorithm, difficulty: u32) -> Self {
        let genesis = Block::genesis(algorithm);
        info!(
            "Genesis block created: {}... ({}, difficulty {})",
            genesis.short_hash(),
            algorithm,
            difficulty
        );
        Self {
            chain: vec![genesis],
            difficulty,
            algorithm,
        }
    }

    /// Rebuild a chain from stored blocks without re-mining anything.
    pub(crate) fn from_blocks(
        blocks: Vec<Block>,
        algorithm: HashAlgorithm,
        difficulty: u32,
    ) -> Result<Self> {
        if blocks.is_empty() {
            return Err(ChainError::CorruptSnapshot("chain has no blocks".into()));
        }
        Ok(Self {
            chain: blocks,
            difficulty,
            algorithm,
        })
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn get(&self, index: usize) -> Result<&Block> {
        self.chain.get(index).ok_or(ChainError::IndexOutOfRange {
            index,
            len: self.chain.len(),
        })
    }

    pub(super) fn block_mut(&mut self, index: usize) -> Result<&mut Block> {
        let len = self.chain.len();
        self.chain
            .get_mut(index)
            .ok_or(ChainError::IndexOutOfRange { index, len })
    }

    /// Mine and append a new block carrying `data`.
    pub fn append(&mut self, data: impl Into<String>) -> Result<&Block> {
        self.append_with(data, &MiningControl::unbounded())
    }

    /// Like [`Blockchain::append`] but the search stops when `control` trips,
    /// leaving the chain unchanged.
    pub fn append_with(
        &mut self,
        data: impl Into<String>,
        control: &MiningControl,
    ) -> Result<&Block> {
        let index = self.chain.len() as u64;
        let prev_hash = self.last_block().hash.clone();

        let mut block = Block::new(index, prev_hash, data.into(), self.difficulty, self.algorithm);
        miner::seal(&mut block, self.algorithm, control)?;
        debug!("Appending block #{} ({}...)", block.index, block.short_hash());

        self.chain.push(block);
        Ok(self.last_block())
    }

    /// Validate the entire chain: hashes, linkage and PoW.
    pub fn validate(&self) -> ValidationReport {
        let report = validate_blocks(&self.chain, self.algorithm);
        if report.is_valid {
            debug!("Chain of {} blocks is valid", self.chain.len());
        } else {
            info!(
                "Chain invalid: {} violation(s), first at block #{:?}",
                report.violations.len(),
                report.first_broken_index
            );
        }
        report
    }

    pub fn is_valid_chain(&self) -> bool {
        self.validate().is_valid
    }

    pub fn info(&self) -> ChainInfo {
        ChainInfo {
            length: self.chain.len(),
            difficulty: self.difficulty,
            algorithm: self.algorithm,
            digest_bits: self.algorithm.digest_bits(),
            genesis_hash: self.chain[0].hash.clone(),
            latest_hash: self.last_block().hash.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false: a chain holds at least its genesis block.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn set_difficulty(&mut self, difficulty: u32) {
        // NOTE: Changing difficulty affects future blocks only.
        self.difficulty = difficulty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::validation::{Violation, ViolationKind};
    use crate::blockchain::{GENESIS_DATA, tamper};
    use std::time::Duration;

    #[test]
    fn new_chain_has_only_genesis() {
        let bc = Blockchain::new(HashAlgorithm::Sha256, 3);
        assert_eq!(bc.len(), 1);
        assert!(!bc.is_empty());
        assert_eq!(bc.chain[0].data, GENESIS_DATA);
        assert_eq!(bc.chain[0].previous_hash, "0");
        assert_eq!(bc.chain[0].difficulty, 0);
        assert!(bc.validate().is_valid);
    }

    #[test]
    fn append_links_and_mines() {
        let mut bc = Blockchain::new(HashAlgorithm::Sha256, 2);
        let genesis_hash = bc.chain[0].hash.clone();
        let block = bc.append("A").unwrap().clone();
        assert_eq!(block.index, 1);
        assert_eq!(block.previous_hash, genesis_hash);
        assert_eq!(block.difficulty, 2);
        assert!(block.hash.starts_with("00"));
        assert_eq!(bc.chain[0].hash, genesis_hash);
    }

    #[test]
    fn two_block_scenario_then_tamper() {
        let mut bc = Blockchain::new(HashAlgorithm::Sha256, 2);
        bc.append("A").unwrap();
        bc.append("B").unwrap();

        assert_eq!(bc.len(), 3);
        assert_eq!(bc.chain[2].previous_hash, bc.chain[1].hash);
        assert!(bc.chain[1].hash.starts_with("00"));
        assert!(bc.chain[2].hash.starts_with("00"));
        let report = bc.validate();
        assert!(report.is_valid);
        assert!(report.violations.is_empty());

        tamper::tamper(&mut bc, 1, "A-tampered").unwrap();
        let report = bc.validate();
        assert!(!report.is_valid);
        assert_eq!(report.first_broken_index, Some(1));
        assert_eq!(
            report.violations,
            vec![
                Violation { index: 1, kind: ViolationKind::HashMismatch },
                Violation { index: 2, kind: ViolationKind::LinkBroken },
            ]
        );
    }

    #[test]
    fn every_algorithm_builds_valid_chains() {
        for algorithm in HashAlgorithm::ALL {
            let mut bc = Blockchain::new(algorithm, 1);
            bc.append("x").unwrap();
            bc.append("y").unwrap();
            assert!(bc.is_valid_chain(), "{algorithm}");
            assert_eq!(bc.info().digest_bits, algorithm.digest_bits());
            assert_eq!(bc.last_block().hash.len(), algorithm.hex_len());
        }
    }

    #[test]
    fn difficulty_change_affects_future_blocks_only() {
        let mut bc = Blockchain::new(HashAlgorithm::Sha3_256, 1);
        bc.append("one").unwrap();
        bc.set_difficulty(2);
        bc.append("two").unwrap();
        assert_eq!(bc.chain[1].difficulty, 1);
        assert_eq!(bc.chain[2].difficulty, 2);
        assert!(bc.chain[2].hash.starts_with("00"));
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn cancelled_append_leaves_chain_untouched() {
        let mut bc = Blockchain::new(HashAlgorithm::Sha256, 64);
        let control = MiningControl::with_timeout(Duration::ZERO);
        let err = bc.append_with("never", &control).unwrap_err();
        assert!(matches!(err, ChainError::MiningCancelled { .. }));
        assert_eq!(bc.len(), 1);
    }

    #[test]
    fn lookup_out_of_range() {
        let bc = Blockchain::new(HashAlgorithm::Sha256, 1);
        assert!(bc.get(0).is_ok());
        assert!(matches!(
            bc.get(3),
            Err(ChainError::IndexOutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn info_reports_ends() {
        let mut bc = Blockchain::new(HashAlgorithm::Blake2b, 1);
        bc.append("tip").unwrap();
        let info = bc.info();
        assert_eq!(info.length, 2);
        assert_eq!(info.algorithm, HashAlgorithm::Blake2b);
        assert_eq!(info.genesis_hash, bc.chain[0].hash);
        assert_eq!(info.latest_hash, bc.chain[1].hash);
    }
}
