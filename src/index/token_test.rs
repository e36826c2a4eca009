use super::*;
use crate::chunk::RotationPolicy;
use crate::record::Record;
use proptest::prelude::*;

proptest! {
    #[test]
    fn entries_stay_sorted_and_positions_deduped(words in proptest::collection::vec("[a-z]{2,6}", 1..30)) {
        let mgr = ChunkManager::new(RotationPolicy {
            max_records: u64::MAX,
            max_bytes: u64::MAX,
        });
        for word in &words {
            mgr.append(Record::new(format!("{word} {word}")));
        }
        let chunk_id = mgr.seal_active();
        let indexer = TokenIndexer::new();
        indexer.build(&mgr, chunk_id, &CancelToken::new()).unwrap();
        let (entries, _) = indexer.get(chunk_id);

        let tokens: Vec<&str> = entries.iter().map(|e| e.token.as_str()).collect();
        let mut sorted = tokens.clone();
        sorted.sort();
        prop_assert_eq!(tokens, sorted);

        for entry in &entries {
            let mut positions = entry.positions.clone();
            positions.dedup();
            prop_assert_eq!(positions.len(), entry.positions.len());
            prop_assert!(entry.positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

fn sealed_chunk(records: Vec<&str>) -> (ChunkManager, ChunkId) {
    let mgr = ChunkManager::new(RotationPolicy {
        max_records: u64::MAX,
        max_bytes: u64::MAX,
    });
    let mut id = None;
    for r in records {
        id = Some(mgr.append(Record::new(r)).0);
    }
    let id = id.expect("at least one record");
    mgr.seal_active();
    (mgr, id)
}

#[test]
fn token_dedup_within_record() {
    crate::ensure_env_logger_initialized();
    let (mgr, chunk_id) = sealed_chunk(vec!["error error error multiple errors"]);
    let indexer = TokenIndexer::new();
    indexer.build(&mgr, chunk_id, &CancelToken::new()).unwrap();
    let (entries, present) = indexer.get(chunk_id);
    assert!(present);
    let error_entry = entries.iter().find(|e| e.token == "error").unwrap();
    assert_eq!(error_entry.positions, vec![0]);
    let errors_entry = entries.iter().find(|e| e.token == "errors").unwrap();
    assert_eq!(errors_entry.positions, vec![0]);
}

#[test]
fn entries_sorted_ascending_by_token() {
    let (mgr, chunk_id) = sealed_chunk(vec!["zeta alpha", "beta"]);
    let indexer = TokenIndexer::new();
    indexer.build(&mgr, chunk_id, &CancelToken::new()).unwrap();
    let (entries, _) = indexer.get(chunk_id);
    let tokens: Vec<&str> = entries.iter().map(|e| e.token.as_str()).collect();
    let mut sorted = tokens.clone();
    sorted.sort();
    assert_eq!(tokens, sorted);
}

#[test]
fn build_on_unsealed_chunk_fails() {
    let mgr = ChunkManager::default();
    let (chunk_id, _) = mgr.append(Record::new("hi"));
    let indexer = TokenIndexer::new();
    assert!(matches!(
        indexer.build(&mgr, chunk_id, &CancelToken::new()),
        Err(Error::NotSealed(_))
    ));
    assert!(!indexer.is_built(chunk_id));
}

#[test]
fn rebuild_is_idempotent() {
    let (mgr, chunk_id) = sealed_chunk(vec!["alpha beta", "gamma alpha"]);
    let indexer = TokenIndexer::new();
    indexer.build(&mgr, chunk_id, &CancelToken::new()).unwrap();
    let (first, _) = indexer.get(chunk_id);
    indexer.build(&mgr, chunk_id, &CancelToken::new()).unwrap();
    let (second, _) = indexer.get(chunk_id);
    assert_eq!(first, second);
}

#[test]
fn cancelled_build_publishes_nothing() {
    let (mgr, chunk_id) = sealed_chunk(vec!["a bb", "c dd"]);
    let indexer = TokenIndexer::new();
    let cancel = CancelToken::new();
    cancel.cancel();
    assert!(matches!(
        indexer.build(&mgr, chunk_id, &cancel),
        Err(Error::Cancelled)
    ));
    assert!(!indexer.is_built(chunk_id));
}
