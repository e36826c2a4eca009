use super::*;
use crate::chunk::RotationPolicy;
use crate::record::Record;
use chrono::Duration;

fn sealed_chunk_with_times(count: u64) -> (ChunkManager, ChunkId, DateTime<Utc>) {
    let mgr = ChunkManager::new(RotationPolicy {
        max_records: u64::MAX,
        max_bytes: u64::MAX,
    });
    let base = Utc::now();
    let mut id = None;
    for i in 0..count {
        let ts = base + Duration::seconds(i as i64);
        id = Some(mgr.append(Record::new("x").with_ts(ts)).0);
    }
    let id = id.expect("at least one record");
    mgr.seal_active();
    (mgr, id, base)
}

#[test]
fn checkpoints_every_sparsity_records() {
    crate::ensure_env_logger_initialized();
    let (mgr, chunk_id, _) = sealed_chunk_with_times(25);
    let indexer = TimeSparseIndexer::new(10);
    indexer.build(&mgr, chunk_id, &CancelToken::new()).unwrap();
    assert_eq!(indexer.index_size(chunk_id), Some(3)); // positions 0, 10, 20
}

#[test]
fn floor_returns_greatest_checkpoint_at_or_before_query() {
    let (mgr, chunk_id, base) = sealed_chunk_with_times(25);
    let indexer = TimeSparseIndexer::new(10);
    indexer.build(&mgr, chunk_id, &CancelToken::new()).unwrap();

    let query = base + Duration::seconds(15);
    let checkpoint = indexer.floor(chunk_id, query).unwrap();
    assert_eq!(checkpoint.pos, 10);

    let before_all = base - Duration::seconds(1);
    assert!(indexer.floor(chunk_id, before_all).is_none());
}

#[test]
fn source_checkpoints_mark_activation_transitions() {
    let mgr = ChunkManager::default();
    let s1 = SourceId::new();
    let s2 = SourceId::new();
    mgr.append(Record::new("a").with_source(s1));
    mgr.append(Record::new("b").with_source(s1));
    mgr.append(Record::new("c").with_source(s2));
    mgr.append(Record::new("d").with_source(s1));
    let chunk_id = mgr.seal_active();

    let indexer = SourceSparseIndexer::new();
    indexer.build(&mgr, chunk_id, &CancelToken::new()).unwrap();
    let s1_positions = indexer.get(chunk_id, s1).unwrap();
    assert_eq!(s1_positions, vec![0, 3]);
    let s2_positions = indexer.get(chunk_id, s2).unwrap();
    assert_eq!(s2_positions, vec![2]);
}

#[test]
fn build_on_unsealed_chunk_fails() {
    let mgr = ChunkManager::default();
    let (chunk_id, _) = mgr.append(Record::new("hi"));
    let indexer = TimeSparseIndexer::default();
    assert!(matches!(
        indexer.build(&mgr, chunk_id, &CancelToken::new()),
        Err(Error::NotSealed(_))
    ));
}
