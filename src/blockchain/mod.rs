pub mod block;
pub mod compare;
pub mod hashing;
pub mod miner;
pub mod model;
pub mod snapshot;
pub mod tamper;
pub mod validation;

pub use block::Block;
pub use hashing::HashAlgorithm;
pub use model::{Blockchain, ChainInfo};
pub use validation::{ValidationReport, Violation, ViolationKind};

/// Default Proof-of-Work difficulty (number of leading zeros).
pub const DEFAULT_DIFFICULTY: u32 = 3;

/// Payload of every genesis block.
pub const GENESIS_DATA: &str = "Genesis Block - The beginning of the blockchain";

/// `previous_hash` sentinel carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Difficulty bound applied to requests (keep low in dev to avoid long waits).
pub const DIFF_MAX: u32 = 6;
