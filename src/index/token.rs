//! Per-chunk inverted index: token → sorted, deduped record positions.

use std::collections::hash_map::Entry as MapEntry;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use log::info;

use crate::chunk::ChunkManager;
use crate::error::{Error, Result};
use crate::ids::ChunkId;
use crate::index::entry::TokenEntry;
use crate::index::{CancelToken, Indexer};
use crate::tokenize::tokenize;

/// Builds and serves the per-chunk token → positions index.
#[derive(Debug)]
pub struct TokenIndexer {
    entries: Mutex<HashMap<ChunkId, Vec<TokenEntry>>>,
}

impl TokenIndexer {
    pub fn new() -> TokenIndexer {
        TokenIndexer {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Current snapshot for a chunk, `present = false` if never built.
    pub fn get(&self, chunk_id: ChunkId) -> (Vec<TokenEntry>, bool) {
        match self.entries.lock().expect("token index lock poisoned").get(&chunk_id) {
            Some(entries) => (entries.clone(), true),
            None => (Vec::new(), false),
        }
    }
}

impl Default for TokenIndexer {
    fn default() -> TokenIndexer {
        TokenIndexer::new()
    }
}

impl Indexer for TokenIndexer {
    fn name(&self) -> &'static str {
        "token"
    }

    fn build(&self, chunks: &ChunkManager, chunk_id: ChunkId, cancel: &CancelToken) -> Result<()> {
        let meta = chunks.meta(chunk_id)?;
        if !meta.sealed {
            return Err(Error::NotSealed(chunk_id));
        }

        let mut postings: HashMap<String, Vec<u64>> = HashMap::new();
        let mut cursor = chunks.open_cursor(chunk_id)?;
        let mut seen = HashSet::new();
        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let record_ref = match cursor.next() {
                Ok(r) => r,
                Err(Error::NoMoreRecords) => break,
                Err(e) => return Err(e),
            };
            seen.clear();
            for token in tokenize(&record_ref.record.raw_bytes) {
                if seen.insert(token.clone()) {
                    match postings.entry(token) {
                        MapEntry::Occupied(mut e) => e.get_mut().push(record_ref.pos),
                        MapEntry::Vacant(e) => {
                            e.insert(vec![record_ref.pos]);
                        }
                    }
                }
            }
        }

        let mut entries: Vec<TokenEntry> = postings
            .into_iter()
            .map(|(token, positions)| TokenEntry { token, positions })
            .collect();
        entries.sort_by(|a, b| a.token.cmp(&b.token));

        let count = entries.len();
        self.entries
            .lock()
            .expect("token index lock poisoned")
            .insert(chunk_id, entries);
        info!(target: "chunkdex::index::token", "built {count} token entries for chunk {chunk_id}");
        Ok(())
    }

    fn delete(&self, chunk_id: ChunkId) {
        self.entries.lock().expect("token index lock poisoned").remove(&chunk_id);
    }

    fn index_size(&self, chunk_id: ChunkId) -> Option<usize> {
        self.entries
            .lock()
            .expect("token index lock poisoned")
            .get(&chunk_id)
            .map(|entries| entries.len())
    }

    fn is_built(&self, chunk_id: ChunkId) -> bool {
        self.entries.lock().expect("token index lock poisoned").contains_key(&chunk_id)
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;
