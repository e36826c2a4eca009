//! Three indexes built from each record's structured `attrs`: key, value,
//! and (key,value), all case-folded to lowercase.

use std::collections::hash_map::Entry as MapEntry;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use log::info;

use crate::chunk::ChunkManager;
use crate::error::{Error, Result};
use crate::ids::ChunkId;
use crate::index::entry::{KVEntry, KeyEntry, ValueEntry};
use crate::index::{CancelToken, Indexer};

#[derive(Debug, Default, Clone)]
struct Published {
    keys: Vec<KeyEntry>,
    values: Vec<ValueEntry>,
    kvs: Vec<KVEntry>,
}

/// Builds and serves the attribute key/value/(key,value) index triple.
///
/// All three lists for a chunk are installed under the same critical
/// section so a reader observing any one of them observes all three.
#[derive(Debug)]
pub struct AttributeIndexer {
    published: Mutex<HashMap<ChunkId, Published>>,
}

impl AttributeIndexer {
    pub fn new() -> AttributeIndexer {
        AttributeIndexer {
            published: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_keys(&self, chunk_id: ChunkId) -> (Vec<KeyEntry>, bool) {
        self.snapshot(chunk_id, |p| p.keys.clone())
    }

    pub fn get_values(&self, chunk_id: ChunkId) -> (Vec<ValueEntry>, bool) {
        self.snapshot(chunk_id, |p| p.values.clone())
    }

    pub fn get_kvs(&self, chunk_id: ChunkId) -> (Vec<KVEntry>, bool) {
        self.snapshot(chunk_id, |p| p.kvs.clone())
    }

    fn snapshot<T>(&self, chunk_id: ChunkId, extract: impl FnOnce(&Published) -> T) -> (T, bool)
    where
        T: Default,
    {
        match self.published.lock().expect("attribute index lock poisoned").get(&chunk_id) {
            Some(p) => (extract(p), true),
            None => (T::default(), false),
        }
    }
}

impl Default for AttributeIndexer {
    fn default() -> AttributeIndexer {
        AttributeIndexer::new()
    }
}

impl Indexer for AttributeIndexer {
    fn name(&self) -> &'static str {
        "attribute"
    }

    fn build(&self, chunks: &ChunkManager, chunk_id: ChunkId, cancel: &CancelToken) -> Result<()> {
        let meta = chunks.meta(chunk_id)?;
        if !meta.sealed {
            return Err(Error::NotSealed(chunk_id));
        }

        let mut keys: HashMap<String, Vec<u64>> = HashMap::new();
        let mut values: HashMap<String, Vec<u64>> = HashMap::new();
        let mut kvs: HashMap<(String, String), Vec<u64>> = HashMap::new();

        let mut cursor = chunks.open_cursor(chunk_id)?;
        let mut seen_keys = HashSet::new();
        let mut seen_values = HashSet::new();
        let mut seen_kvs = HashSet::new();
        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let record_ref = match cursor.next() {
                Ok(r) => r,
                Err(Error::NoMoreRecords) => break,
                Err(e) => return Err(e),
            };
            seen_keys.clear();
            seen_values.clear();
            seen_kvs.clear();
            for (key, value) in record_ref.record.attrs.iter() {
                let key = key.to_lowercase();
                let value = value.to_lowercase();
                if seen_keys.insert(key.clone()) {
                    bump(&mut keys, key.clone(), record_ref.pos);
                }
                if seen_values.insert(value.clone()) {
                    bump(&mut values, value.clone(), record_ref.pos);
                }
                if seen_kvs.insert((key.clone(), value.clone())) {
                    match kvs.entry((key, value)) {
                        MapEntry::Occupied(mut e) => e.get_mut().push(record_ref.pos),
                        MapEntry::Vacant(e) => {
                            e.insert(vec![record_ref.pos]);
                        }
                    }
                }
            }
        }

        let mut key_entries: Vec<KeyEntry> = keys
            .into_iter()
            .map(|(key, positions)| KeyEntry { key, positions })
            .collect();
        key_entries.sort_by(|a, b| a.key.cmp(&b.key));

        let mut value_entries: Vec<ValueEntry> = values
            .into_iter()
            .map(|(value, positions)| ValueEntry { value, positions })
            .collect();
        value_entries.sort_by(|a, b| a.value.cmp(&b.value));

        let mut kv_entries: Vec<KVEntry> = kvs
            .into_iter()
            .map(|((key, value), positions)| KVEntry { key, value, positions })
            .collect();
        kv_entries.sort_by(|a, b| (a.key.as_str(), a.value.as_str()).cmp(&(b.key.as_str(), b.value.as_str())));

        let counts = (key_entries.len(), value_entries.len(), kv_entries.len());
        self.published.lock().expect("attribute index lock poisoned").insert(
            chunk_id,
            Published {
                keys: key_entries,
                values: value_entries,
                kvs: kv_entries,
            },
        );
        info!(
            target: "chunkdex::index::attribute",
            "built {}/{}/{} key/value/kv entries for chunk {chunk_id}",
            counts.0, counts.1, counts.2
        );
        Ok(())
    }

    fn delete(&self, chunk_id: ChunkId) {
        self.published.lock().expect("attribute index lock poisoned").remove(&chunk_id);
    }

    fn index_size(&self, chunk_id: ChunkId) -> Option<usize> {
        self.published
            .lock()
            .expect("attribute index lock poisoned")
            .get(&chunk_id)
            .map(|p| p.keys.len() + p.values.len() + p.kvs.len())
    }

    fn is_built(&self, chunk_id: ChunkId) -> bool {
        self.published.lock().expect("attribute index lock poisoned").contains_key(&chunk_id)
    }
}

fn bump(map: &mut HashMap<String, Vec<u64>>, key: String, pos: u64) {
    match map.entry(key) {
        MapEntry::Occupied(mut e) => e.get_mut().push(pos),
        MapEntry::Vacant(e) => {
            e.insert(vec![pos]);
        }
    }
}

#[cfg(test)]
#[path = "attribute_test.rs"]
mod attribute_test;
