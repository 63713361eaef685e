use std::fmt;
use std::str::FromStr;

use blake2::Blake2b512;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use sha3::{Sha3_256, Sha3_512};

use crate::error::ChainError;

/// Digest algorithms a chain can be built on. Fixed for the chain's lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
    Sha3_256,
    Sha3_512,
    Blake2b,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 5] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
        HashAlgorithm::Sha3_256,
        HashAlgorithm::Sha3_512,
        HashAlgorithm::Blake2b,
    ];

    /// Canonical lowercase name, as stored in snapshots.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Sha3_256 => "sha3-256",
            HashAlgorithm::Sha3_512 => "sha3-512",
            HashAlgorithm::Blake2b => "blake2b",
        }
    }

    pub fn digest_bits(self) -> usize {
        match self {
            HashAlgorithm::Sha256 | HashAlgorithm::Sha3_256 => 256,
            HashAlgorithm::Sha512 | HashAlgorithm::Sha3_512 | HashAlgorithm::Blake2b => 512,
        }
    }

    /// Length of the hex-encoded digest (4 bits per character).
    pub fn hex_len(self) -> usize {
        self.digest_bits() / 4
    }

    /// Hash `bytes` and return the lowercase hex digest.
    pub fn digest(self, bytes: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
            HashAlgorithm::Sha512 => hex::encode(Sha512::digest(bytes)),
            HashAlgorithm::Sha3_256 => hex::encode(Sha3_256::digest(bytes)),
            HashAlgorithm::Sha3_512 => hex::encode(Sha3_512::digest(bytes)),
            HashAlgorithm::Blake2b => hex::encode(Blake2b512::digest(bytes)),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ChainError;

    /// Accepts the canonical names case-insensitively, plus `sha-256` / `sha-512`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(HashAlgorithm::Sha512),
            "sha3-256" | "sha3_256" => Ok(HashAlgorithm::Sha3_256),
            "sha3-512" | "sha3_512" => Ok(HashAlgorithm::Sha3_512),
            "blake2b" => Ok(HashAlgorithm::Blake2b),
            _ => Err(ChainError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl TryFrom<String> for HashAlgorithm {
    type Error = ChainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HashAlgorithm> for String {
    fn from(algorithm: HashAlgorithm) -> Self {
        algorithm.name().to_string()
    }
}

/// True when the first `difficulty` hex characters of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}
