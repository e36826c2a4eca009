//! Opaque identifiers.
//!
//! [ChunkId] and [SourceId] are order-agnostic 128-bit tokens: callers may
//! compare them for equality and hash them, nothing more. Backing them with
//! [uuid::Uuid] keeps generation collision-free across concurrent receivers
//! without any shared counter.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkId(Uuid);

impl ChunkId {
    pub fn new() -> ChunkId {
        ChunkId(Uuid::new_v4())
    }
}

impl Default for ChunkId {
    fn default() -> ChunkId {
        ChunkId::new()
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(Uuid);

impl SourceId {
    pub fn new() -> SourceId {
        SourceId(Uuid::new_v4())
    }
}

impl Default for SourceId {
    fn default() -> SourceId {
        SourceId::new()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "ids_test.rs"]
mod ids_test;
