use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Block index {index} out of range (chain length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Nonce space exhausted while mining")]
    MiningOverflow,

    #[error("Mining cancelled after {attempts} attempts")]
    MiningCancelled { attempts: u64 },

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Blockchain not found: {0}")]
    ChainNotFound(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("Invalid snapshot name: {0}")]
    InvalidName(String),

    #[error("Difficulty {requested} too high (max {max})")]
    DifficultyTooHigh { requested: u32, max: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChainError>;
