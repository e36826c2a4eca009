//! `chunkdex` is a chunk-and-index storage engine for ingested log
//! records.
//!
//! Records land in an append-only [ChunkManager], which seals chunks by
//! a rotation policy (record count or byte size) and hands sealed chunks
//! to a family of per-chunk indexers — token, attribute, free-text
//! key=value, and time/source sparse checkpoints — orchestrated by an
//! [IndexManager]. Everything downstream of ingestion (chunks, cursors,
//! indexers) is read-only: a sealed chunk never mutates, and an indexer
//! either has a complete published index for a chunk or it doesn't.
//!
//! This crate stops at indexing. Receivers, query planning, and any
//! outward-facing protocol are someone else's module.

pub mod chunk;
pub mod error;
pub mod ids;
pub mod index;
pub mod kv_extract;
pub mod record;
pub mod tokenize;

pub use chunk::{ChunkManager, ChunkMeta, Cursor, RotationPolicy};
pub use error::{Error, Result};
pub use ids::{ChunkId, SourceId};
pub use index::{CancelToken, IndexManager, Indexer};
pub use kv_extract::{CombinedExtractor, KeyValue, KvExtractor, LogfmtExtractor};
pub use record::{Pos, Record, RecordRef};
pub use tokenize::tokenize;

/// Installs `env_logger` as the `log` subscriber for the current test
/// binary, once. Tests that want to see `log::info!`/`warn!` output from
/// the library under test call this first; production callers wire up
/// their own subscriber instead.
#[cfg(test)]
pub(crate) fn ensure_env_logger_initialized() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
