use serde::Serialize;

use super::GENESIS_PREVIOUS_HASH;
use super::block::Block;
use super::hashing::{HashAlgorithm, meets_difficulty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    /// Stored hash differs from the hash recomputed from the block's fields.
    HashMismatch,
    /// `previous_hash` differs from the preceding block's stored hash, or the
    /// preceding block is itself broken. At index 0, the genesis sentinel is
    /// missing.
    LinkBroken,
    /// Stored hash lacks the leading zeros its difficulty requires.
    DifficultyNotMet,
    /// Block's `index` differs from its position in the chain.
    IndexOutOfSequence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub index: usize,
    pub kind: ViolationKind,
}

/// Outcome of a full-chain walk. A failed validation is a normal result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub first_broken_index: Option<usize>,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            is_valid: violations.is_empty(),
            first_broken_index: violations.first().map(|v| v.index),
            violations,
        }
    }

    pub fn kinds_at(&self, index: usize) -> Vec<ViolationKind> {
        self.violations
            .iter()
            .filter(|v| v.index == index)
            .map(|v| v.kind)
            .collect()
    }
}

/// Check every block: hash recomputation, linkage to its predecessor and the
/// difficulty predicate. Read-only; reports all violations in block order.
///
/// A block whose hash no longer matches its contents breaks trust in every
/// descendant, so each block after it is reported as `LinkBroken` too.
pub fn validate_blocks(blocks: &[Block], algorithm: HashAlgorithm) -> ValidationReport {
    let mut violations = Vec::new();
    let mut previous_intact = true;

    for (i, block) in blocks.iter().enumerate() {
        let mut intact = true;

        if block.index != i as u64 {
            violations.push(Violation {
                index: i,
                kind: ViolationKind::IndexOutOfSequence,
            });
        }

        if block.hash != block.compute_hash(algorithm) {
            intact = false;
            violations.push(Violation {
                index: i,
                kind: ViolationKind::HashMismatch,
            });
        }

        let linked = match i {
            0 => block.previous_hash == GENESIS_PREVIOUS_HASH,
            _ => previous_intact && block.previous_hash == blocks[i - 1].hash,
        };
        if !linked {
            intact = false;
            violations.push(Violation {
                index: i,
                kind: ViolationKind::LinkBroken,
            });
        }

        if !meets_difficulty(&block.hash, block.difficulty) {
            violations.push(Violation {
                index: i,
                kind: ViolationKind::DifficultyNotMet,
            });
        }

        previous_intact = intact;
    }

    ValidationReport::from_violations(violations)
}
