//! Sparse checkpoint indexes for range acceleration: one over time, one
//! over source. Both trade precision for a tiny footprint — a lookup
//! yields the nearest checkpoint at or before the query, and callers
//! linear-scan forward from there.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use log::info;

use crate::chunk::ChunkManager;
use crate::error::{Error, Result};
use crate::ids::{ChunkId, SourceId};
use crate::index::entry::{SourceCheckpoint, TimeCheckpoint};
use crate::index::{CancelToken, Indexer};

pub const DEFAULT_SPARSITY: u64 = 1000;

/// Checkpoints every `sparsity`-th record, ordered by timestamp.
#[derive(Debug)]
pub struct TimeSparseIndexer {
    sparsity: u64,
    checkpoints: Mutex<HashMap<ChunkId, Vec<TimeCheckpoint>>>,
}

impl TimeSparseIndexer {
    pub fn new(sparsity: u64) -> TimeSparseIndexer {
        TimeSparseIndexer {
            sparsity: sparsity.max(1),
            checkpoints: Mutex::new(HashMap::new()),
        }
    }

    /// Greatest checkpoint with `ts <= query`, if any have been built.
    pub fn floor(&self, chunk_id: ChunkId, query: DateTime<Utc>) -> Option<TimeCheckpoint> {
        let guard = self.checkpoints.lock().expect("time sparse index lock poisoned");
        let checkpoints = guard.get(&chunk_id)?;
        match checkpoints.binary_search_by(|c| c.ts.cmp(&query)) {
            Ok(i) => Some(checkpoints[i]),
            Err(0) => None,
            Err(i) => Some(checkpoints[i - 1]),
        }
    }
}

impl Default for TimeSparseIndexer {
    fn default() -> TimeSparseIndexer {
        TimeSparseIndexer::new(DEFAULT_SPARSITY)
    }
}

impl Indexer for TimeSparseIndexer {
    fn name(&self) -> &'static str {
        "time_sparse"
    }

    fn build(&self, chunks: &ChunkManager, chunk_id: ChunkId, cancel: &CancelToken) -> Result<()> {
        let meta = chunks.meta(chunk_id)?;
        if !meta.sealed {
            return Err(Error::NotSealed(chunk_id));
        }

        let mut checkpoints = Vec::new();
        let mut cursor = chunks.open_cursor(chunk_id)?;
        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let record_ref = match cursor.next() {
                Ok(r) => r,
                Err(Error::NoMoreRecords) => break,
                Err(e) => return Err(e),
            };
            if record_ref.pos % self.sparsity == 0 {
                checkpoints.push(TimeCheckpoint {
                    ts: record_ref.record.ingest_ts,
                    pos: record_ref.pos,
                });
            }
        }
        checkpoints.sort_by_key(|c| c.ts);

        let count = checkpoints.len();
        self.checkpoints
            .lock()
            .expect("time sparse index lock poisoned")
            .insert(chunk_id, checkpoints);
        info!(target: "chunkdex::index::sparse", "built {count} time checkpoints for chunk {chunk_id}");
        Ok(())
    }

    fn delete(&self, chunk_id: ChunkId) {
        self.checkpoints
            .lock()
            .expect("time sparse index lock poisoned")
            .remove(&chunk_id);
    }

    fn index_size(&self, chunk_id: ChunkId) -> Option<usize> {
        self.checkpoints
            .lock()
            .expect("time sparse index lock poisoned")
            .get(&chunk_id)
            .map(|c| c.len())
    }

    fn is_built(&self, chunk_id: ChunkId) -> bool {
        self.checkpoints
            .lock()
            .expect("time sparse index lock poisoned")
            .contains_key(&chunk_id)
    }
}

/// Per-source checkpoints: the position each distinct source first becomes
/// active at, plus every position after which it reappears following a
/// run of some other source (a "becomes active again" transition).
#[derive(Debug)]
pub struct SourceSparseIndexer {
    checkpoints: Mutex<HashMap<ChunkId, Vec<SourceCheckpoint>>>,
}

impl SourceSparseIndexer {
    pub fn new() -> SourceSparseIndexer {
        SourceSparseIndexer {
            checkpoints: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, chunk_id: ChunkId, source_id: SourceId) -> Option<Vec<u64>> {
        let guard = self.checkpoints.lock().expect("source sparse index lock poisoned");
        guard
            .get(&chunk_id)?
            .iter()
            .find(|c| c.source_id == source_id)
            .map(|c| c.positions.clone())
    }
}

impl Default for SourceSparseIndexer {
    fn default() -> SourceSparseIndexer {
        SourceSparseIndexer::new()
    }
}

impl Indexer for SourceSparseIndexer {
    fn name(&self) -> &'static str {
        "source_sparse"
    }

    fn build(&self, chunks: &ChunkManager, chunk_id: ChunkId, cancel: &CancelToken) -> Result<()> {
        let meta = chunks.meta(chunk_id)?;
        if !meta.sealed {
            return Err(Error::NotSealed(chunk_id));
        }

        let mut by_source: HashMap<SourceId, Vec<u64>> = HashMap::new();
        let mut seen_sources: HashSet<SourceId> = HashSet::new();
        let mut last_source: Option<SourceId> = None;

        let mut cursor = chunks.open_cursor(chunk_id)?;
        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let record_ref = match cursor.next() {
                Ok(r) => r,
                Err(Error::NoMoreRecords) => break,
                Err(e) => return Err(e),
            };
            let Some(source_id) = record_ref.record.source_id else {
                last_source = None;
                continue;
            };
            let became_active = last_source != Some(source_id);
            if became_active {
                seen_sources.insert(source_id);
                by_source.entry(source_id).or_default().push(record_ref.pos);
            }
            last_source = Some(source_id);
        }

        let mut checkpoints: Vec<SourceCheckpoint> = by_source
            .into_iter()
            .map(|(source_id, positions)| SourceCheckpoint { source_id, positions })
            .collect();
        checkpoints.sort_by_key(|c| c.source_id.to_string());

        let count = checkpoints.len();
        self.checkpoints
            .lock()
            .expect("source sparse index lock poisoned")
            .insert(chunk_id, checkpoints);
        info!(target: "chunkdex::index::sparse", "built {count} source checkpoints for chunk {chunk_id}");
        Ok(())
    }

    fn delete(&self, chunk_id: ChunkId) {
        self.checkpoints
            .lock()
            .expect("source sparse index lock poisoned")
            .remove(&chunk_id);
    }

    fn index_size(&self, chunk_id: ChunkId) -> Option<usize> {
        self.checkpoints
            .lock()
            .expect("source sparse index lock poisoned")
            .get(&chunk_id)
            .map(|c| c.len())
    }

    fn is_built(&self, chunk_id: ChunkId) -> bool {
        self.checkpoints
            .lock()
            .expect("source sparse index lock poisoned")
            .contains_key(&chunk_id)
    }
}

#[cfg(test)]
#[path = "sparse_test.rs"]
mod sparse_test;
