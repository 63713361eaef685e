//! Side-by-side runs of the five digest algorithms: PoW cost at a fixed
//! difficulty, and the avalanche behaviour of each digest.

use std::thread;

use log::info;
use serde::Serialize;

use super::block::{Block, now_timestamp};
use super::hashing::HashAlgorithm;
use super::miner::{self, MiningControl};
use super::GENESIS_PREVIOUS_HASH;
use crate::error::Result;

/// Payload mined by every comparison run unless the caller supplies one.
pub const COMPARISON_DATA: &str = "Test Block - Comparing hash algorithms";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub algorithm: HashAlgorithm,
    pub nonce: u64,
    pub hash: String,
    pub hash_bits: usize,
    pub attempts: u64,
    pub elapsed_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub difficulty: u32,
    pub results: Vec<ComparisonResult>,
    /// Same runs, quickest first.
    pub results_sorted: Vec<ComparisonResult>,
    pub fastest: Option<ComparisonResult>,
    pub slowest: Option<ComparisonResult>,
}

impl ComparisonSummary {
    fn new(difficulty: u32, results: Vec<ComparisonResult>) -> Self {
        let mut results_sorted = results.clone();
        results_sorted.sort_by(|a, b| a.elapsed_secs.total_cmp(&b.elapsed_secs));
        Self {
            difficulty,
            fastest: results_sorted.first().cloned(),
            slowest: results_sorted.last().cloned(),
            results,
            results_sorted,
        }
    }
}

/// Mine the same block skeleton once per algorithm, in the order given.
pub fn compare(
    algorithms: &[HashAlgorithm],
    difficulty: u32,
    data: &str,
) -> Result<ComparisonSummary> {
    compare_with(algorithms, difficulty, data, &MiningControl::unbounded())
}

/// [`compare`] with every run bounded by `control`.
pub fn compare_with(
    algorithms: &[HashAlgorithm],
    difficulty: u32,
    data: &str,
    control: &MiningControl,
) -> Result<ComparisonSummary> {
    let timestamp = now_timestamp();
    let results = run_trials(algorithms, difficulty, data, timestamp, control)?;
    info!(
        "Compared {} algorithms at difficulty {}",
        results.len(),
        difficulty
    );
    Ok(ComparisonSummary::new(difficulty, results))
}

/// Trials are independent, so each one gets its own thread.
fn run_trials(
    algorithms: &[HashAlgorithm],
    difficulty: u32,
    data: &str,
    timestamp: f64,
    control: &MiningControl,
) -> Result<Vec<ComparisonResult>> {
    thread::scope(|scope| {
        let handles: Vec<_> = algorithms
            .iter()
            .map(|&algorithm| {
                scope.spawn(move || {
                    let skeleton = Block::new_with_timestamp(
                        1,
                        GENESIS_PREVIOUS_HASH.to_string(),
                        data.to_string(),
                        difficulty,
                        timestamp,
                        algorithm,
                    );
                    miner::mine_with(&skeleton, algorithm, difficulty, control).map(|outcome| {
                        ComparisonResult {
                            algorithm,
                            nonce: outcome.nonce,
                            hash: outcome.hash,
                            hash_bits: algorithm.digest_bits(),
                            attempts: outcome.attempts,
                            elapsed_secs: outcome.elapsed.as_secs_f64(),
                        }
                    })
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AvalancheQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl AvalancheQuality {
    /// Grade by how similar two digests are; ideal is half the bits shared.
    pub fn grade(similarity_pct: f64) -> Self {
        if (45.0..=55.0).contains(&similarity_pct) {
            AvalancheQuality::Excellent
        } else if (40.0..=60.0).contains(&similarity_pct) {
            AvalancheQuality::Good
        } else if (30.0..=70.0).contains(&similarity_pct) {
            AvalancheQuality::Fair
        } else {
            AvalancheQuality::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvalancheEntry {
    pub algorithm: HashAlgorithm,
    pub hash_a: String,
    pub hash_b: String,
    pub changed_bits: u32,
    pub total_bits: u32,
    pub similarity_pct: f64,
    pub quality: AvalancheQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvalancheReport {
    pub input_a: String,
    pub input_b: String,
    pub input_similarity_pct: f64,
    pub results: Vec<AvalancheEntry>,
}

/// Hash both inputs with each algorithm and measure how many digest bits flip.
pub fn avalanche(algorithms: &[HashAlgorithm], input_a: &str, input_b: &str) -> AvalancheReport {
    let results = algorithms
        .iter()
        .map(|&algorithm| {
            let hash_a = algorithm.digest(input_a.as_bytes());
            let hash_b = algorithm.digest(input_b.as_bytes());
            let (changed_bits, total_bits) = bit_difference(&hash_a, &hash_b);
            let similarity_pct = if total_bits == 0 {
                0.0
            } else {
                round2(f64::from(total_bits - changed_bits) / f64::from(total_bits) * 100.0)
            };
            AvalancheEntry {
                algorithm,
                hash_a,
                hash_b,
                changed_bits,
                total_bits,
                similarity_pct,
                quality: AvalancheQuality::grade(similarity_pct),
            }
        })
        .collect();

    AvalancheReport {
        input_a: input_a.to_string(),
        input_b: input_b.to_string(),
        input_similarity_pct: string_similarity(input_a, input_b),
        results,
    }
}

/// Count differing bits between two hex strings, right-aligned so a shorter
/// string is treated as zero-padded. Returns `(changed, total)`.
pub fn bit_difference(a: &str, b: &str) -> (u32, u32) {
    let width = a.len().max(b.len());
    let nibbles = |s: &str| -> Vec<u32> {
        let pad = width - s.len();
        std::iter::repeat_n(0, pad)
            .chain(s.chars().map(|c| c.to_digit(16).unwrap_or(0)))
            .collect()
    };
    let changed = nibbles(a)
        .iter()
        .zip(nibbles(b).iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum();
    (changed, width as u32 * 4)
}

/// Levenshtein similarity between two strings, as a percentage.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 100.0;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            row[j + 1] = if ca == cb {
                prev[j]
            } else {
                1 + prev[j].min(prev[j + 1]).min(row[j])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    let distance = prev[b.len()];

    round2((1.0 - distance as f64 / max_len as f64) * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_keeps_supplied_order() {
        let order = [
            HashAlgorithm::Blake2b,
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha3_512,
        ];
        let summary = compare(&order, 1, COMPARISON_DATA).unwrap();
        let got: Vec<_> = summary.results.iter().map(|r| r.algorithm).collect();
        assert_eq!(got, order);
        assert_eq!(summary.difficulty, 1);
    }

    #[test]
    fn every_result_meets_difficulty() {
        let summary = compare(&HashAlgorithm::ALL, 2, "same payload").unwrap();
        assert_eq!(summary.results.len(), 5);
        for r in &summary.results {
            assert!(r.hash.starts_with("00"), "{}: {}", r.algorithm, r.hash);
            assert_eq!(r.hash.len() * 4, r.hash_bits);
        }
        let fastest = summary.fastest.unwrap();
        let slowest = summary.slowest.unwrap();
        assert!(fastest.elapsed_secs <= slowest.elapsed_secs);

        let sorted = &summary.results_sorted;
        assert_eq!(sorted.len(), 5);
        assert!(sorted.windows(2).all(|w| w[0].elapsed_secs <= w[1].elapsed_secs));
        assert_eq!(sorted[0], fastest);
        assert_eq!(sorted[4], slowest);
    }

    #[test]
    fn empty_comparison() {
        let summary = compare(&[], 3, "x").unwrap();
        assert!(summary.results.is_empty());
        assert!(summary.fastest.is_none());
        assert!(summary.results_sorted.is_empty());
    }

    #[test]
    fn avalanche_changes_most_characters() {
        let report = avalanche(&HashAlgorithm::ALL, "Hello World", "Hello World!");
        assert_eq!(report.results.len(), 5);
        for entry in &report.results {
            let differing = entry
                .hash_a
                .chars()
                .zip(entry.hash_b.chars())
                .filter(|(x, y)| x != y)
                .count();
            assert!(differing * 2 > entry.hash_a.len(), "{}", entry.algorithm);
            assert!(entry.changed_bits * 4 > entry.total_bits, "{}", entry.algorithm);
            assert!(entry.changed_bits * 4 < entry.total_bits * 3, "{}", entry.algorithm);
        }
    }

    #[test]
    fn identical_inputs_are_fully_similar() {
        let report = avalanche(&[HashAlgorithm::Sha256], "same", "same");
        assert_eq!(report.results[0].changed_bits, 0);
        assert_eq!(report.results[0].similarity_pct, 100.0);
        assert_eq!(report.results[0].quality, AvalancheQuality::Poor);
        assert_eq!(report.input_similarity_pct, 100.0);
    }

    #[test]
    fn bit_difference_counts_nibbles() {
        assert_eq!(bit_difference("0f", "00"), (4, 8));
        assert_eq!(bit_difference("ff", "ff"), (0, 8));
        assert_eq!(bit_difference("1", "01"), (0, 8));
    }

    #[test]
    fn levenshtein_similarity() {
        assert_eq!(string_similarity("", ""), 100.0);
        assert_eq!(string_similarity("abc", ""), 0.0);
        assert_eq!(string_similarity("cat", "dog"), 0.0);
        assert_eq!(string_similarity("Hello World", "Hello World!"), 91.67);
    }

    #[test]
    fn quality_grades() {
        assert_eq!(AvalancheQuality::grade(50.0), AvalancheQuality::Excellent);
        assert_eq!(AvalancheQuality::grade(42.0), AvalancheQuality::Good);
        assert_eq!(AvalancheQuality::grade(65.0), AvalancheQuality::Fair);
        assert_eq!(AvalancheQuality::grade(90.0), AvalancheQuality::Poor);
    }
}
