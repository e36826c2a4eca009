use super::*;
use crate::chunk::RotationPolicy;
use crate::record::Record;

fn sealed_chunk(records: Vec<Record>) -> (ChunkManager, ChunkId) {
    let mgr = ChunkManager::new(RotationPolicy {
        max_records: u64::MAX,
        max_bytes: u64::MAX,
    });
    let mut id = None;
    for r in records {
        id = Some(mgr.append(r).0);
    }
    let id = id.expect("at least one record");
    mgr.seal_active();
    (mgr, id)
}

#[test]
fn basic_attribute_build() {
    crate::ensure_env_logger_initialized();
    let (mgr, chunk_id) = sealed_chunk(vec![
        Record::new("").with_attr("env", "prod").with_attr("host", "s1"),
        Record::new("").with_attr("env", "dev").with_attr("host", "s2"),
        Record::new("").with_attr("env", "prod").with_attr("host", "s3"),
    ]);
    let indexer = AttributeIndexer::new();
    indexer.build(&mgr, chunk_id, &CancelToken::new()).unwrap();

    let (keys, _) = indexer.get_keys(chunk_id);
    let env_key = keys.iter().find(|e| e.key == "env").unwrap();
    assert_eq!(env_key.positions, vec![0, 1, 2]);

    let (values, _) = indexer.get_values(chunk_id);
    let prod_value = values.iter().find(|e| e.value == "prod").unwrap();
    assert_eq!(prod_value.positions, vec![0, 2]);
    let dev_value = values.iter().find(|e| e.value == "dev").unwrap();
    assert_eq!(dev_value.positions, vec![1]);

    let (kvs, _) = indexer.get_kvs(chunk_id);
    let env_prod = kvs.iter().find(|e| e.key == "env" && e.value == "prod").unwrap();
    assert_eq!(env_prod.positions, vec![0, 2]);
}

#[test]
fn case_folding_collapses_variants() {
    let (mgr, chunk_id) = sealed_chunk(vec![
        Record::new("").with_attr("ENV", "PROD"),
        Record::new("").with_attr("env", "prod"),
        Record::new("").with_attr("Env", "Prod"),
    ]);
    let indexer = AttributeIndexer::new();
    indexer.build(&mgr, chunk_id, &CancelToken::new()).unwrap();

    let (keys, _) = indexer.get_keys(chunk_id);
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].positions, vec![0, 1, 2]);

    let (kvs, _) = indexer.get_kvs(chunk_id);
    assert_eq!(kvs.len(), 1);
    assert_eq!(kvs[0].positions, vec![0, 1, 2]);
}

#[test]
fn empty_attrs_still_counts_as_built() {
    let (mgr, chunk_id) = sealed_chunk(vec![Record::new("no attrs here")]);
    let indexer = AttributeIndexer::new();
    indexer.build(&mgr, chunk_id, &CancelToken::new()).unwrap();
    let (keys, present) = indexer.get_keys(chunk_id);
    assert!(present);
    assert!(keys.is_empty());
}

#[test]
fn atomic_publication_across_all_three() {
    let (mgr, chunk_id) = sealed_chunk(vec![Record::new("").with_attr("a", "b")]);
    let indexer = AttributeIndexer::new();
    assert!(!indexer.get_keys(chunk_id).1);
    indexer.build(&mgr, chunk_id, &CancelToken::new()).unwrap();
    assert!(indexer.get_keys(chunk_id).1);
    assert!(indexer.get_values(chunk_id).1);
    assert!(indexer.get_kvs(chunk_id).1);
}
