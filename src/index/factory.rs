//! Builds a fully-wired [IndexManager] and [ChunkManager] from loosely
//! typed string parameters, the way a config file or CLI flag set would
//! hand them in.

use std::collections::HashMap;

use crate::chunk::{ChunkManager, RotationPolicy};
use crate::error::{Error, Result};
use crate::index::kv::{KvConfig, DEFAULT_BUDGET_BYTES};
use crate::index::manager::IndexManager;
use crate::index::sparse::{SourceSparseIndexer, TimeSparseIndexer, DEFAULT_SPARSITY};
use crate::kv_extract::CombinedExtractor;

const PARAM_TIME_SPARSITY: &str = "timeSparsity";
const PARAM_KV_BUDGET: &str = "kvBudget";
const PARAM_CHUNK_MAX_RECORDS: &str = "chunkMaxRecords";
const PARAM_CHUNK_MAX_BYTES: &str = "chunkMaxBytes";

const DEFAULT_CHUNK_MAX_RECORDS: u64 = 100_000;
const DEFAULT_CHUNK_MAX_BYTES: u64 = 64 * 1024 * 1024;

/// Parses `params`, ignoring unknown keys, and builds a ready-to-use
/// [ChunkManager] paired with an [IndexManager].
///
/// Every recognised value must parse as a positive integer; anything else
/// is reported via [Error::InvalidConfig] naming the offending key.
pub fn build(params: &HashMap<String, String>) -> Result<(ChunkManager, IndexManager)> {
    let time_sparsity = positive_u64(params, PARAM_TIME_SPARSITY, DEFAULT_SPARSITY)?;
    let kv_budget = positive_u64(params, PARAM_KV_BUDGET, DEFAULT_BUDGET_BYTES as u64)? as usize;
    let chunk_max_records = positive_u64(params, PARAM_CHUNK_MAX_RECORDS, DEFAULT_CHUNK_MAX_RECORDS)?;
    let chunk_max_bytes = positive_u64(params, PARAM_CHUNK_MAX_BYTES, DEFAULT_CHUNK_MAX_BYTES)?;

    let chunks = ChunkManager::new(RotationPolicy {
        max_records: chunk_max_records,
        max_bytes: chunk_max_bytes,
    });

    let indexes = IndexManager::new(
        Default::default(),
        Default::default(),
        crate::index::kv::KvIndexer::new(KvConfig {
            budget_bytes: kv_budget,
            extractor: CombinedExtractor::default_logfmt(),
        }),
        TimeSparseIndexer::new(time_sparsity),
        SourceSparseIndexer::new(),
    );

    Ok((chunks, indexes))
}

fn positive_u64(params: &HashMap<String, String>, key: &'static str, default: u64) -> Result<u64> {
    match params.get(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<u64>() {
            Ok(0) => Err(Error::InvalidConfig(format!("{key} must be positive, got 0"))),
            Ok(value) => Ok(value),
            Err(_) => Err(Error::InvalidConfig(format!("{key} is not a valid positive integer: {raw:?}"))),
        },
    }
}

#[cfg(test)]
#[path = "factory_test.rs"]
mod factory_test;
