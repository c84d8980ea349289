//! Pool registry: the pair-to-pool mapping.
//!
//! Entries are created lazily on first reference and never removed; an
//! emptied pool remains addressable and can be re-funded. Each pool sits
//! behind its own mutex so mutating operations on the same pair serialize
//! while different pairs proceed in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use types::PairKey;

use crate::pool::Pool;

/// Registry failures. Lookup never fails; only snapshots can.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("snapshot serialization: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Owns every pool record, keyed by canonical pair.
pub struct PoolRegistry {
    pools: DashMap<PairKey, Arc<Mutex<Pool>>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self {
            pools: DashMap::new(),
        }
    }

    /// Returns the pool for `pair`, inserting a zero-initialized record on
    /// first reference. Never fails.
    pub fn get_or_create(&self, pair: PairKey) -> Arc<Mutex<Pool>> {
        self.pools
            .entry(pair)
            .or_insert_with(|| {
                debug!("registering pool {}", pair);
                Arc::new(Mutex::new(Pool::new(pair)))
            })
            .clone()
    }

    /// Read-only lookup; `None` if the pair has never been referenced.
    /// Price queries use this so a read cannot create state.
    pub fn get(&self, pair: &PairKey) -> Option<Arc<Mutex<Pool>>> {
        self.pools.get(pair).map(|entry| entry.clone())
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Serializes every pool record. Taken under each pool's own lock, so a
    /// snapshot never observes a half-applied operation.
    pub fn snapshot(&self) -> Result<Vec<u8>, RegistryError> {
        let pools: Vec<Pool> = self
            .pools
            .iter()
            .map(|entry| entry.value().lock().clone())
            .collect();
        Ok(bincode::serialize(&pools)?)
    }

    /// Replaces the registry contents with a previously taken snapshot.
    pub fn restore(&self, snapshot: &[u8]) -> Result<(), RegistryError> {
        let pools: Vec<Pool> = bincode::deserialize(snapshot)?;
        self.pools.clear();
        for pool in pools {
            self.pools
                .insert(pool.pair(), Arc::new(Mutex::new(pool)));
        }
        debug!("restored {} pools from snapshot", self.pools.len());
        Ok(())
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
