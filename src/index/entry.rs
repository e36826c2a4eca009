//! Entry shapes published by the indexer family.
//!
//! All of these are ordered sequences, sorted lexicographically by their
//! key, so callers can binary-search them. `positions` is always strictly
//! ascending with no duplicates (spec invariant #1).

use chrono::{DateTime, Utc};

use crate::ids::SourceId;
use crate::record::Pos;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEntry {
    pub token: String,
    pub positions: Vec<Pos>,
}

/// Shared shape for attribute-key and free-text-key indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub key: String,
    pub positions: Vec<Pos>,
}

/// Shared shape for attribute-value and free-text-value indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueEntry {
    pub value: String,
    pub positions: Vec<Pos>,
}

/// Shared shape for attribute-(key,value) and free-text-(key,value) indexes.
/// Sorted by `key` then by `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KVEntry {
    pub key: String,
    pub value: String,
    pub positions: Vec<Pos>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeCheckpoint {
    pub ts: DateTime<Utc>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCheckpoint {
    pub source_id: SourceId,
    pub positions: Vec<Pos>,
}

/// Status of the free-text KV indexer's published lists for one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KVStatus {
    Complete,
    Capped,
}
