//! The per-chunk indexer family and the manager that orchestrates them.
//!
//! Every indexer satisfies the small capability set spec.md calls out:
//! `Name` + `Build`. Index-specific lookups (`get_key`, `get_kv`, ...) are
//! exposed on the concrete indexer types and called by [manager::IndexManager]
//! through references it owns, rather than through one god-trait — matching
//! spec.md §9's "tagged variants or distinct interface slots" guidance.

pub mod attribute;
pub mod cancel;
pub mod entry;
pub mod factory;
pub mod kv;
pub mod manager;
pub mod sparse;
pub mod token;

pub use cancel::CancelToken;
pub use manager::IndexManager;

use crate::chunk::ChunkManager;
use crate::error::Result;
use crate::ids::ChunkId;

/// Capability every indexer the [manager::IndexManager] orchestrates must
/// provide.
pub trait Indexer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Build (or idempotently rebuild) this indexer's entries for a sealed
    /// chunk. Must publish nothing on failure.
    fn build(&self, chunks: &ChunkManager, chunk_id: ChunkId, cancel: &CancelToken) -> Result<()>;

    /// Remove any published state for a chunk. Never fails on a chunk that
    /// was never built.
    fn delete(&self, chunk_id: ChunkId);

    /// Number of entries currently published for a chunk, `None` if unbuilt.
    fn index_size(&self, chunk_id: ChunkId) -> Option<usize>;

    fn is_built(&self, chunk_id: ChunkId) -> bool;
}
