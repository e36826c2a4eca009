use super::*;
use std::collections::HashSet;

#[test]
fn chunk_ids_are_unique_and_hashable() {
    let mut seen = HashSet::new();
    for _ in 0..1000 {
        assert!(seen.insert(ChunkId::new()));
    }
}

#[test]
fn equality_is_the_only_required_relation() {
    let a = ChunkId::new();
    let b = a;
    assert_eq!(a, b);
    assert_ne!(a, ChunkId::new());
}
