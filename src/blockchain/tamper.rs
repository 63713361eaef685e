use log::warn;
use serde::Serialize;

use super::model::Blockchain;
use super::validation::ValidationReport;
use crate::error::Result;

/// Overwrite the payload of a stored block without recomputing its hash or
/// re-mining. Returns the data that was replaced.
pub fn tamper(chain: &mut Blockchain, index: usize, new_data: impl Into<String>) -> Result<String> {
    let block = chain.block_mut(index)?;
    let previous = std::mem::replace(&mut block.data, new_data.into());
    warn!(
        "Block #{} data overwritten without re-mining (hash {}... kept)",
        index,
        block.short_hash()
    );
    Ok(previous)
}

/// Before/after contrast produced by [`demonstrate`].
#[derive(Debug, Clone, Serialize)]
pub struct TamperDemo {
    pub index: usize,
    pub original_data: String,
    pub tampered_data: String,
    pub stored_hash: String,
    pub recomputed_hash: String,
    pub before: ValidationReport,
    pub after: ValidationReport,
}

/// Validate, tamper with block `index`, validate again, then put the original
/// data back. The chain is left exactly as it was found.
pub fn demonstrate(
    chain: &mut Blockchain,
    index: usize,
    new_data: impl Into<String>,
) -> Result<TamperDemo> {
    let tampered_data = new_data.into();
    let before = chain.validate();

    let original_data = tamper(chain, index, tampered_data.clone())?;
    let block = chain.get(index)?;
    let stored_hash = block.hash.clone();
    let recomputed_hash = block.compute_hash(chain.algorithm());
    let after = chain.validate();

    chain.block_mut(index)?.data = original_data.clone();

    Ok(TamperDemo {
        index,
        original_data,
        tampered_data,
        stored_hash,
        recomputed_hash,
        before,
        after,
    })
}
