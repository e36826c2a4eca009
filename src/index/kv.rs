//! Free-text `key=value` index, budget-admission controlled.
//!
//! Approximates an inverted index over unbounded free-text content inside
//! `raw_bytes`, bounded by a byte budget meant to match a serialised
//! on-disk footprint (see the cost constants below), with hard cardinality
//! caps to keep pathological input from exhausting memory. Key, value and
//! (key,value) candidates are admitted from three independently-sorted
//! candidate lists against the *same* budget — cheap key-only entries
//! routinely survive even when the (key,value) list is full.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use log::{info, warn};

use crate::chunk::ChunkManager;
use crate::error::{Error, Result};
use crate::ids::ChunkId;
use crate::index::entry::{KVEntry, KVStatus, KeyEntry, ValueEntry};
use crate::index::{CancelToken, Indexer};
use crate::kv_extract::CombinedExtractor;
use crate::record::Pos;

pub const STRING_LEN: usize = 2;
pub const POSTING_OFFSET: usize = 4;
pub const POSTING_COUNT: usize = 4;
pub const POSITION_SIZE: usize = 4;
pub const HEADER_SIZE: usize = 10;

pub const MAX_UNIQUE_KEYS: usize = 10_000;
pub const MAX_VALUES_PER_KEY: usize = 1_000;
pub const MAX_TOTAL_ENTRIES: usize = 100_000;

pub const DEFAULT_BUDGET_BYTES: usize = 10 * 1024 * 1024;

pub fn key_cost(key: &str, n: usize) -> usize {
    STRING_LEN + key.len() + POSTING_OFFSET + POSTING_COUNT + POSITION_SIZE * n
}

pub fn value_cost(value: &str, n: usize) -> usize {
    STRING_LEN + value.len() + POSTING_OFFSET + POSTING_COUNT + POSITION_SIZE * n
}

pub fn kv_cost(key: &str, value: &str, n: usize) -> usize {
    STRING_LEN + key.len() + STRING_LEN + value.len() + POSTING_OFFSET + POSTING_COUNT + POSITION_SIZE * n
}

/// Tunables for [KvIndexer].
#[derive(Debug)]
pub struct KvConfig {
    pub budget_bytes: usize,
    pub extractor: CombinedExtractor,
}

impl Default for KvConfig {
    fn default() -> KvConfig {
        KvConfig {
            budget_bytes: DEFAULT_BUDGET_BYTES,
            extractor: CombinedExtractor::default_logfmt(),
        }
    }
}

#[derive(Debug, Default, Clone)]
struct Candidate {
    frequency: u64,
    positions: Vec<Pos>,
}

#[derive(Debug, Default, Clone)]
struct Published {
    keys: Vec<KeyEntry>,
    values: Vec<ValueEntry>,
    kvs: Vec<KVEntry>,
    status: Option<KVStatus>,
}

#[derive(Debug)]
pub struct KvIndexer {
    config: KvConfig,
    published: Mutex<HashMap<ChunkId, Published>>,
}

impl KvIndexer {
    pub fn new(config: KvConfig) -> KvIndexer {
        KvIndexer {
            config,
            published: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_keys(&self, chunk_id: ChunkId) -> Option<(Vec<KeyEntry>, KVStatus)> {
        self.published
            .lock()
            .expect("kv index lock poisoned")
            .get(&chunk_id)
            .and_then(|p| p.status.map(|s| (p.keys.clone(), s)))
    }

    pub fn get_values(&self, chunk_id: ChunkId) -> Option<(Vec<ValueEntry>, KVStatus)> {
        self.published
            .lock()
            .expect("kv index lock poisoned")
            .get(&chunk_id)
            .and_then(|p| p.status.map(|s| (p.values.clone(), s)))
    }

    pub fn get_kvs(&self, chunk_id: ChunkId) -> Option<(Vec<KVEntry>, KVStatus)> {
        self.published
            .lock()
            .expect("kv index lock poisoned")
            .get(&chunk_id)
            .and_then(|p| p.status.map(|s| (p.kvs.clone(), s)))
    }
}

impl Default for KvIndexer {
    fn default() -> KvIndexer {
        KvIndexer::new(KvConfig::default())
    }
}

impl Indexer for KvIndexer {
    fn name(&self) -> &'static str {
        "kv"
    }

    fn build(&self, chunks: &ChunkManager, chunk_id: ChunkId, cancel: &CancelToken) -> Result<()> {
        let meta = chunks.meta(chunk_id)?;
        if !meta.sealed {
            return Err(Error::NotSealed(chunk_id));
        }

        let mut key_candidates: HashMap<String, Candidate> = HashMap::new();
        let mut value_candidates: HashMap<String, Candidate> = HashMap::new();
        let mut kv_candidates: HashMap<(String, String), Candidate> = HashMap::new();
        let mut values_per_key: HashMap<String, HashSet<String>> = HashMap::new();
        let mut capped = false;

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
            if capped {
                continue; // drain the cursor without collecting further candidates
            }

            let pairs = self.config.extractor.extract(&record_ref.record.raw_bytes);
            let mut seen_pairs = HashSet::new();
            let mut distinct_pairs = Vec::new();
            for pair in pairs {
                if seen_pairs.insert((pair.key.clone(), pair.value.clone())) {
                    distinct_pairs.push(pair);
                }
            }

            let mut touched_keys = HashSet::new();
            let mut touched_values = HashSet::new();
            for pair in &distinct_pairs {
                let is_new_key = !key_candidates.contains_key(&pair.key);
                if is_new_key && key_candidates.len() + 1 > MAX_UNIQUE_KEYS {
                    capped = true;
                    break;
                }

                let values_for_key = values_per_key.entry(pair.key.clone()).or_default();
                let is_new_value_for_key = !values_for_key.contains(&pair.value);
                if is_new_value_for_key && values_for_key.len() + 1 > MAX_VALUES_PER_KEY {
                    capped = true;
                    break;
                }

                let is_new_kv = !kv_candidates.contains_key(&(pair.key.clone(), pair.value.clone()));
                if is_new_kv && kv_candidates.len() + 1 > MAX_TOTAL_ENTRIES {
                    capped = true;
                    break;
                }

                values_for_key.insert(pair.value.clone());
                let c = kv_candidates
                    .entry((pair.key.clone(), pair.value.clone()))
                    .or_default();
                c.frequency += 1;
                c.positions.push(record_ref.pos);

                touched_keys.insert(pair.key.clone());
                touched_values.insert(pair.value.clone());
            }

            if capped {
                continue;
            }
            for key in touched_keys {
                let c = key_candidates.entry(key).or_default();
                c.frequency += 1;
                c.positions.push(record_ref.pos);
            }
            for value in touched_values {
                let c = value_candidates.entry(value).or_default();
                c.frequency += 1;
                c.positions.push(record_ref.pos);
            }
        }

        let published = if capped {
            warn!(
                target: "chunkdex::index::kv",
                "chunk {chunk_id} tripped a free-text KV hard cap; publishing empty indexes"
            );
            Published {
                keys: Vec::new(),
                values: Vec::new(),
                kvs: Vec::new(),
                status: Some(KVStatus::Capped),
            }
        } else {
            let budget = self.config.budget_bytes;

            let mut key_ranked: Vec<(String, Candidate)> = key_candidates.into_iter().collect();
            key_ranked.sort_by(|(ak, ac), (bk, bc)| {
                bc.frequency
                    .cmp(&ac.frequency)
                    .then_with(|| key_cost(ak, ac.positions.len()).cmp(&key_cost(bk, bc.positions.len())))
                    .then_with(|| ak.as_bytes().cmp(bk.as_bytes()))
            });
            let keys = admit(key_ranked, budget, |k, c| key_cost(k, c.positions.len()))
                .into_iter()
                .map(|(key, c)| KeyEntry { key, positions: c.positions })
                .collect::<Vec<_>>();
            let mut keys = keys;
            keys.sort_by(|a, b| a.key.cmp(&b.key));

            let mut value_ranked: Vec<(String, Candidate)> = value_candidates.into_iter().collect();
            value_ranked.sort_by(|(av, ac), (bv, bc)| {
                bc.frequency
                    .cmp(&ac.frequency)
                    .then_with(|| value_cost(av, ac.positions.len()).cmp(&value_cost(bv, bc.positions.len())))
                    .then_with(|| av.as_bytes().cmp(bv.as_bytes()))
            });
            let mut values = admit(value_ranked, budget, |v, c| value_cost(v, c.positions.len()))
                .into_iter()
                .map(|(value, c)| ValueEntry { value, positions: c.positions })
                .collect::<Vec<_>>();
            values.sort_by(|a, b| a.value.cmp(&b.value));

            let mut kv_ranked: Vec<((String, String), Candidate)> = kv_candidates.into_iter().collect();
            kv_ranked.sort_by(|((ak, av), ac), ((bk, bv), bc)| {
                bc.frequency
                    .cmp(&ac.frequency)
                    .then_with(|| {
                        kv_cost(ak, av, ac.positions.len()).cmp(&kv_cost(bk, bv, bc.positions.len()))
                    })
                    .then_with(|| (ak.as_bytes(), av.as_bytes()).cmp(&(bk.as_bytes(), bv.as_bytes())))
            });
            let mut kvs = admit(kv_ranked, budget, |(k, v), c| kv_cost(k, v, c.positions.len()))
                .into_iter()
                .map(|((key, value), c)| KVEntry { key, value, positions: c.positions })
                .collect::<Vec<_>>();
            kvs.sort_by(|a, b| (a.key.as_str(), a.value.as_str()).cmp(&(b.key.as_str(), b.value.as_str())));

            info!(
                target: "chunkdex::index::kv",
                "built {}/{}/{} key/value/kv free-text entries for chunk {chunk_id}",
                keys.len(), values.len(), kvs.len()
            );
            Published {
                keys,
                values,
                kvs,
                status: Some(KVStatus::Complete),
            }
        };

        self.published
            .lock()
            .expect("kv index lock poisoned")
            .insert(chunk_id, published);
        Ok(())
    }

    fn delete(&self, chunk_id: ChunkId) {
        self.published.lock().expect("kv index lock poisoned").remove(&chunk_id);
    }

    fn index_size(&self, chunk_id: ChunkId) -> Option<usize> {
        self.published
            .lock()
            .expect("kv index lock poisoned")
            .get(&chunk_id)
            .map(|p| p.keys.len() + p.values.len() + p.kvs.len())
    }

    fn is_built(&self, chunk_id: ChunkId) -> bool {
        self.published.lock().expect("kv index lock poisoned").contains_key(&chunk_id)
    }
}

/// Admit ranked candidates while `header + sum(cost) <= budget`, stopping
/// (and silently discarding the remainder) at the first overflow.
fn admit<K>(ranked: Vec<(K, Candidate)>, budget: usize, cost: impl Fn(&K, &Candidate) -> usize) -> Vec<(K, Candidate)> {
    let mut running_total = HEADER_SIZE;
    let mut admitted = Vec::new();
    for (key, candidate) in ranked {
        let entry_cost = cost(&key, &candidate);
        if running_total + entry_cost > budget {
            break;
        }
        running_total += entry_cost;
        admitted.push((key, candidate));
    }
    admitted
}

#[cfg(test)]
#[path = "kv_test.rs"]
mod kv_test;
