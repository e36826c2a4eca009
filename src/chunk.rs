//! Append-only, rotating chunk storage.
//!
//! A [ChunkManager] holds one *active* chunk at a time plus any number of
//! *sealed* chunks. Appends always land in the active chunk; once its
//! rotation policy trips (record count or byte size), the active chunk is
//! sealed and a fresh one takes over. Sealed chunks never mutate again and
//! are the only chunks indexers are allowed to build from.
//!
//! This mirrors the rotate-on-limit behaviour of the teacher crate's
//! journal manager, but chunks live in memory rather than as files on disk.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::ChunkId;
use crate::record::{Pos, Record, RecordRef};

/// Rotation policy for the active chunk.
#[derive(Debug, Clone, Copy)]
pub struct RotationPolicy {
    pub max_records: u64,
    pub max_bytes: u64,
}

impl Default for RotationPolicy {
    fn default() -> RotationPolicy {
        RotationPolicy {
            max_records: 100_000,
            max_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Point-in-time metadata for a chunk. Immutable once `sealed` is true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub id: ChunkId,
    pub created_at: DateTime<Utc>,
    pub record_count: u64,
    pub size_bytes: u64,
    pub sealed: bool,
    pub first_ts: Option<DateTime<Utc>>,
    pub last_ts: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct Chunk {
    meta: ChunkMeta,
    records: Vec<Record>,
}

impl Chunk {
    fn new(id: ChunkId) -> Chunk {
        Chunk {
            meta: ChunkMeta {
                id,
                created_at: Utc::now(),
                record_count: 0,
                size_bytes: 0,
                sealed: false,
                first_ts: None,
                last_ts: None,
            },
            records: Vec::new(),
        }
    }

    fn append(&mut self, record: Record) -> Pos {
        let pos = self.meta.record_count;
        self.meta.record_count += 1;
        self.meta.size_bytes += record.raw_bytes.len() as u64;
        self.meta.first_ts.get_or_insert(record.ingest_ts);
        self.meta.last_ts = Some(record.ingest_ts);
        self.records.push(record);
        pos
    }

    fn should_rotate(&self, policy: &RotationPolicy) -> bool {
        self.meta.record_count >= policy.max_records || self.meta.size_bytes >= policy.max_bytes
    }
}

/// In-memory, forward-only iterator over a sealed chunk's records.
///
/// A `Cursor` owns no external resource (the chunk lives in an `Arc` shared
/// with the manager), but it still follows the single-threaded,
/// forward-only, release-on-exit contract indexers are written against so
/// that swapping in a disk-backed chunk manager later needs no indexer
/// changes.
pub struct Cursor {
    chunk: Arc<ChunkSnapshot>,
    next: usize,
}

#[derive(Debug)]
struct ChunkSnapshot {
    meta: ChunkMeta,
    records: Vec<Record>,
}

impl Cursor {
    /// Advance the cursor, returning the next `(Record, pos)` pair or
    /// `Error::NoMoreRecords` once the stream is exhausted.
    pub fn next(&mut self) -> Result<RecordRef> {
        if self.next >= self.chunk.records.len() {
            return Err(Error::NoMoreRecords);
        }
        let pos = self.next as Pos;
        let record = self.chunk.records[self.next].clone();
        self.next += 1;
        Ok(RecordRef { record, pos })
    }
}

/// Append-only record store with rotation, sealing and cursor iteration.
#[derive(Debug)]
pub struct ChunkManager {
    policy: RotationPolicy,
    active: RwLock<Chunk>,
    sealed: RwLock<HashMap<ChunkId, Arc<ChunkSnapshot>>>,
}

impl ChunkManager {
    pub fn new(policy: RotationPolicy) -> ChunkManager {
        ChunkManager {
            policy,
            active: RwLock::new(Chunk::new(ChunkId::new())),
            sealed: RwLock::new(HashMap::new()),
        }
    }

    /// Append a record to the active chunk, rotating (sealing the current
    /// active chunk and starting a fresh one) if the policy trips.
    ///
    /// Returns the id of the chunk the record landed in and its position.
    pub fn append(&self, record: Record) -> (ChunkId, Pos) {
        let mut active = self.active.write().expect("chunk manager lock poisoned");
        let pos = active.append(record);
        let id = active.meta.id;
        if active.should_rotate(&self.policy) {
            self.rotate(&mut active);
        }
        (id, pos)
    }

    /// Force the active chunk to seal and a new one to begin, regardless of
    /// whether the rotation policy has tripped.
    pub fn seal_active(&self) -> ChunkId {
        let mut active = self.active.write().expect("chunk manager lock poisoned");
        let id = active.meta.id;
        self.rotate(&mut active);
        id
    }

    fn rotate(&self, active: &mut Chunk) {
        let mut fresh = Chunk::new(ChunkId::new());
        std::mem::swap(active, &mut fresh);
        let mut sealed_meta = fresh.meta;
        sealed_meta.sealed = true;
        let snapshot = Arc::new(ChunkSnapshot {
            meta: sealed_meta,
            records: fresh.records,
        });
        self.sealed
            .write()
            .expect("chunk manager lock poisoned")
            .insert(snapshot.meta.id, snapshot);
    }

    pub fn meta(&self, chunk_id: ChunkId) -> Result<ChunkMeta> {
        if let Some(snapshot) = self.sealed.read().expect("lock poisoned").get(&chunk_id) {
            return Ok(snapshot.meta.clone());
        }
        let active = self.active.read().expect("lock poisoned");
        if active.meta.id == chunk_id {
            return Ok(active.meta.clone());
        }
        Err(Error::ChunkNotFound(chunk_id))
    }

    /// Open a cursor over a sealed chunk. Errors with `NotSealed` if the
    /// chunk exists but is still active, `ChunkNotFound` if unknown.
    pub fn open_cursor(&self, chunk_id: ChunkId) -> Result<Cursor> {
        if let Some(snapshot) = self.sealed.read().expect("lock poisoned").get(&chunk_id) {
            return Ok(Cursor {
                chunk: Arc::clone(snapshot),
                next: 0,
            });
        }
        let active = self.active.read().expect("lock poisoned");
        if active.meta.id == chunk_id {
            return Err(Error::NotSealed(chunk_id));
        }
        Err(Error::ChunkNotFound(chunk_id))
    }
}

impl Default for ChunkManager {
    fn default() -> ChunkManager {
        ChunkManager::new(RotationPolicy::default())
    }
}

#[cfg(test)]
#[path = "chunk_test.rs"]
mod chunk_test;
