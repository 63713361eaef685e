use serde::{Deserialize, Serialize};

use crate::blockchain::miner::MiningControl;
use crate::blockchain::validation::ValidationReport;
use crate::blockchain::{Block, ChainInfo, DEFAULT_DIFFICULTY, HashAlgorithm};
use crate::config::Settings;
use crate::error::{ChainError, Result};
use crate::registry::ChainRegistry;
use crate::store::{HistoryEntry, HistoryStore};

/// Shared application state: live chains, the snapshot store and settings.
pub struct AppState {
    pub registry: ChainRegistry,
    pub store: HistoryStore,
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self> {
        Ok(Self {
            registry: ChainRegistry::new(),
            store: HistoryStore::open(&settings.history_dir)?,
            settings,
        })
    }

    /// Bounds applied to every mining request served by the API.
    pub fn mining_control(&self) -> MiningControl {
        match self.settings.mining_timeout {
            Some(timeout) => MiningControl::with_timeout(timeout),
            None => MiningControl::unbounded(),
        }
    }

    pub fn check_difficulty(&self, requested: u32) -> Result<u32> {
        let max = self.settings.max_difficulty;
        if requested > max {
            return Err(ChainError::DifficultyTooHigh { requested, max });
        }
        Ok(requested)
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Deserialize)]
pub struct CreateChainRequest {
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

fn default_difficulty() -> u32 {
    DEFAULT_DIFFICULTY
}

fn default_algorithm() -> String {
    HashAlgorithm::default().name().to_string()
}

#[derive(Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub message: String,
    pub info: ChainInfo,
}

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub session_id: &'a str,
    pub info: ChainInfo,
    pub chain: &'a [Block],
}

#[derive(Deserialize)]
pub struct AppendRequest {
    pub data: String,
}

#[derive(Serialize, Deserialize)]
pub struct MineResponse {
    pub block: Block,
    pub elapsed_secs: f64,
    pub length: usize,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    #[serde(flatten)]
    pub report: ValidationReport,
    pub length: usize,
    pub difficulty: u32,
}

#[derive(Deserialize)]
pub struct TamperRequest {
    pub index: usize,
    pub data: String,
}

#[derive(Serialize, Deserialize)]
pub struct TamperResponse {
    pub index: usize,
    pub previous_data: String,
    pub data: String,
    pub hash: String,
}

/// Payload substituted by the tamper demonstration unless one is supplied.
pub const DEMO_TAMPER_DATA: &str = "HACKED DATA - This has been modified!";

#[derive(Deserialize)]
pub struct TamperDemoRequest {
    #[serde(default = "default_demo_index")]
    pub index: usize,
    #[serde(default = "default_demo_data")]
    pub data: String,
}

fn default_demo_index() -> usize {
    1
}

fn default_demo_data() -> String {
    DEMO_TAMPER_DATA.to_string()
}

#[derive(Serialize, Deserialize)]
pub struct DifficultyResponse {
    pub difficulty: u32,
}

#[derive(Deserialize)]
pub struct SetDifficultyRequest {
    pub difficulty: u32,
}

#[derive(Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct AlgorithmInfo {
    pub name: HashAlgorithm,
    pub digest_bits: usize,
}

/* ---------- History API Models ---------- */

#[derive(Deserialize, Default)]
pub struct SaveRequest {
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct SaveResponse {
    pub name: String,
    pub filename: String,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[derive(Deserialize)]
pub struct LoadRequest {
    pub filename: String,
}

/* ---------- Comparison API Models ---------- */

#[derive(Deserialize)]
pub struct CompareQuery {
    pub difficulty: Option<u32>,
    pub data: Option<String>,
}

#[derive(Deserialize)]
pub struct AvalancheQuery {
    pub input1: Option<String>,
    pub input2: Option<String>,
}
