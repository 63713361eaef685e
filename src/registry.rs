use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, info};
use uuid::Uuid;

use crate::blockchain::{Blockchain, HashAlgorithm};
use crate::error::{ChainError, Result};

pub type SharedChain = Arc<Mutex<Blockchain>>;

/// Live chains keyed by session id. Starts empty; entries come from create
/// and load operations and leave only through `remove` or `clear`.
///
/// Each chain sits behind its own mutex so mining on one chain never blocks
/// another; the map lock is only held for lookups and inserts.
#[derive(Debug, Default)]
pub struct ChainRegistry {
    chains: Mutex<HashMap<String, SharedChain>>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh chain (genesis only) and register it.
    pub fn create(&self, algorithm: HashAlgorithm, difficulty: u32) -> (String, SharedChain) {
        self.insert(Blockchain::new(algorithm, difficulty))
    }

    pub fn insert(&self, chain: Blockchain) -> (String, SharedChain) {
        let id = Uuid::new_v4().simple().to_string();
        let shared = Arc::new(Mutex::new(chain));
        self.chains
            .lock()
            .expect("mutex poisoned")
            .insert(id.clone(), Arc::clone(&shared));
        info!("Registered chain {}", id);
        (id, shared)
    }

    pub fn get(&self, id: &str) -> Result<SharedChain> {
        self.chains
            .lock()
            .expect("mutex poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| ChainError::ChainNotFound(id.to_string()))
    }

    /// Drop a chain. Returns whether it was present.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self
            .chains
            .lock()
            .expect("mutex poisoned")
            .remove(id)
            .is_some();
        debug!("Remove chain {} (present={})", id, removed);
        removed
    }

    pub fn clear(&self) {
        self.chains.lock().expect("mutex poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.chains.lock().expect("mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
