//! Orchestrates one instance of each concrete indexer behind a single
//! `BuildIndexes` call per chunk, and exposes typed lookups for each.

use rayon::prelude::*;

use crate::chunk::ChunkManager;
use crate::error::{Error, Result};
use crate::ids::ChunkId;
use crate::index::attribute::AttributeIndexer;
use crate::index::cancel::CancelToken;
use crate::index::kv::KvIndexer;
use crate::index::sparse::{SourceSparseIndexer, TimeSparseIndexer};
use crate::index::token::TokenIndexer;
use crate::index::Indexer;

/// Owns one of each indexer and builds them concurrently for a chunk.
///
/// `BuildIndexes` fans the five indexers out over a `rayon` scope. If any
/// indexer fails, the first failure observed is returned wrapped in
/// [Error::IndexBuildFailed] naming the offending indexer; indexers that
/// already finished keep whatever they published — a partial build is
/// still useful and `BuildIndexes` is idempotent, so a retry simply
/// rebuilds in place.
#[derive(Debug)]
pub struct IndexManager {
    pub token: TokenIndexer,
    pub attribute: AttributeIndexer,
    pub kv: KvIndexer,
    pub time_sparse: TimeSparseIndexer,
    pub source_sparse: SourceSparseIndexer,
}

impl IndexManager {
    pub fn new(token: TokenIndexer, attribute: AttributeIndexer, kv: KvIndexer, time_sparse: TimeSparseIndexer, source_sparse: SourceSparseIndexer) -> IndexManager {
        IndexManager {
            token,
            attribute,
            kv,
            time_sparse,
            source_sparse,
        }
    }

    fn indexers(&self) -> Vec<&dyn Indexer> {
        vec![
            &self.token,
            &self.attribute,
            &self.kv,
            &self.time_sparse,
            &self.source_sparse,
        ]
    }

    /// Build every indexer for a sealed chunk. Runs the five builds
    /// concurrently; returns the first error encountered, if any.
    pub fn build_indexes(&self, chunks: &ChunkManager, chunk_id: ChunkId, cancel: &CancelToken) -> Result<()> {
        self.indexers()
            .into_par_iter()
            .map(|indexer| {
                indexer.build(chunks, chunk_id, cancel).map_err(|source| Error::IndexBuildFailed {
                    indexer: indexer.name(),
                    source: Box::new(source),
                })
            })
            .find_map_first(|r| r.err())
            .map_or(Ok(()), Err)
    }

    /// Best-effort teardown of every indexer's published state for a chunk.
    pub fn delete_indexes(&self, chunk_id: ChunkId) {
        for indexer in self.indexers() {
            indexer.delete(chunk_id);
        }
    }

    /// `true` once every indexer reports built state for the chunk.
    pub fn indexes_complete(&self, chunk_id: ChunkId) -> bool {
        self.indexers().into_iter().all(|indexer| indexer.is_built(chunk_id))
    }

    /// Diagnostic entry counts per indexer name, `None` where unbuilt.
    pub fn index_sizes(&self, chunk_id: ChunkId) -> Vec<(&'static str, Option<usize>)> {
        self.indexers()
            .into_iter()
            .map(|indexer| (indexer.name(), indexer.index_size(chunk_id)))
            .collect()
    }

    pub fn open_token_index(&self, chunk_id: ChunkId) -> Result<&TokenIndexer> {
        if self.token.is_built(chunk_id) {
            Ok(&self.token)
        } else {
            Err(Error::IndexNotFound("token", chunk_id))
        }
    }

    pub fn open_attribute_index(&self, chunk_id: ChunkId) -> Result<&AttributeIndexer> {
        if self.attribute.is_built(chunk_id) {
            Ok(&self.attribute)
        } else {
            Err(Error::IndexNotFound("attribute", chunk_id))
        }
    }

    pub fn open_kv_index(&self, chunk_id: ChunkId) -> Result<&KvIndexer> {
        if self.kv.is_built(chunk_id) {
            Ok(&self.kv)
        } else {
            Err(Error::IndexNotFound("kv", chunk_id))
        }
    }

    pub fn open_time_sparse_index(&self, chunk_id: ChunkId) -> Result<&TimeSparseIndexer> {
        if self.time_sparse.is_built(chunk_id) {
            Ok(&self.time_sparse)
        } else {
            Err(Error::IndexNotFound("time_sparse", chunk_id))
        }
    }

    pub fn open_source_sparse_index(&self, chunk_id: ChunkId) -> Result<&SourceSparseIndexer> {
        if self.source_sparse.is_built(chunk_id) {
            Ok(&self.source_sparse)
        } else {
            Err(Error::IndexNotFound("source_sparse", chunk_id))
        }
    }
}

impl Default for IndexManager {
    fn default() -> IndexManager {
        IndexManager::new(
            TokenIndexer::default(),
            AttributeIndexer::default(),
            KvIndexer::default(),
            TimeSparseIndexer::default(),
            SourceSparseIndexer::default(),
        )
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;
