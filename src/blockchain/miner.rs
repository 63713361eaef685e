use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info};

use super::block::Block;
use super::hashing::{HashAlgorithm, meets_difficulty};
use crate::error::{ChainError, Result};

/// How often (in nonces) a progress line is logged.
const PROGRESS_INTERVAL: u64 = 100_000;

/// How often (in attempts) the deadline and cancel token are polled.
const CONTROL_POLL_INTERVAL: u64 = 4_096;

/// Result of a successful PoW search.
#[derive(Debug, Clone, PartialEq)]
pub struct MiningOutcome {
    pub nonce: u64,
    pub hash: String,
    pub attempts: u64,
    pub elapsed: Duration,
}

/// Shareable flag that asks an in-flight search to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Caller-side bounds for a search. The default is unbounded.
#[derive(Debug, Clone, Default)]
pub struct MiningControl {
    pub deadline: Option<Instant>,
    pub cancel: Option<CancelToken>,
}

impl MiningControl {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn should_stop(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Search for the first nonce (starting at the skeleton's nonce) whose hash has
/// `difficulty` leading zero hex characters. Unbounded.
pub fn mine(skeleton: &Block, algorithm: HashAlgorithm, difficulty: u32) -> Result<MiningOutcome> {
    mine_with(skeleton, algorithm, difficulty, &MiningControl::unbounded())
}

/// Same search as [`mine`], stopping with `MiningCancelled` once `control`
/// trips. The skeleton is never modified.
pub fn mine_with(
    skeleton: &Block,
    algorithm: HashAlgorithm,
    difficulty: u32,
    control: &MiningControl,
) -> Result<MiningOutcome> {
    let start = Instant::now();
    let mut nonce = skeleton.nonce;
    let mut attempts: u64 = 0;

    debug!(
        "Mining block #{} with {} (target {} leading zeros)",
        skeleton.index, algorithm, difficulty
    );

    loop {
        let hash = algorithm.digest(skeleton.preimage_with_nonce(nonce).as_bytes());
        attempts = attempts.saturating_add(1);

        if meets_difficulty(&hash, difficulty) {
            let elapsed = start.elapsed();
            info!(
                "Block #{} mined with {}: nonce={} hash={} in {:.3}s",
                skeleton.index,
                algorithm,
                nonce,
                hash,
                elapsed.as_secs_f64()
            );
            return Ok(MiningOutcome {
                nonce,
                hash,
                attempts,
                elapsed,
            });
        }

        if nonce > 0 && nonce % PROGRESS_INTERVAL == 0 {
            debug!("  trying nonce {} - hash {}...", nonce, &hash[..16.min(hash.len())]);
        }

        if attempts % CONTROL_POLL_INTERVAL == 0 && control.should_stop() {
            debug!(
                "Mining block #{} stopped after {} attempts",
                skeleton.index, attempts
            );
            return Err(ChainError::MiningCancelled { attempts });
        }

        nonce = nonce.checked_add(1).ok_or(ChainError::MiningOverflow)?;
    }
}

/// Mine `block` at its own difficulty and store the winning nonce and hash.
pub fn seal(block: &mut Block, algorithm: HashAlgorithm, control: &MiningControl) -> Result<MiningOutcome> {
    let outcome = mine_with(block, algorithm, block.difficulty, control)?;
    block.nonce = outcome.nonce;
    block.hash = outcome.hash.clone();
    Ok(outcome)
}
