// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use merge_sort_core::{chunk_sizes, partition, AlgorithmError};

fn items(len: usize) -> Vec<String> {
    (0..len).map(|i| format!("item-{:03}", i)).collect()
}

// ============================================================
// chunk_sizes tests
// ============================================================

#[test]
fn test_sizes_even_split() {
    assert_eq!(chunk_sizes(8, 4).unwrap(), vec![2, 2, 2, 2]);
}

#[test]
fn test_sizes_uneven_split_keeps_remainder() {
    assert_eq!(chunk_sizes(10, 4).unwrap(), vec![3, 3, 2, 2]);
    assert_eq!(chunk_sizes(7, 4).unwrap(), vec![2, 2, 2, 1]);
}

#[test]
fn test_sizes_fewer_items_than_parallelism() {
    assert_eq!(chunk_sizes(3, 4).unwrap(), vec![1, 1, 1]);
    assert_eq!(chunk_sizes(1, 4).unwrap(), vec![1]);
}

#[test]
fn test_sizes_empty_input_yields_no_chunks() {
    assert!(chunk_sizes(0, 4).unwrap().is_empty());
}

#[test]
fn test_sizes_reject_zero_parallelism() {
    assert_eq!(chunk_sizes(5, 0), Err(AlgorithmError::InvalidParallelism));
}

#[test]
fn test_sizes_are_balanced_for_many_lengths() {
    for len in 0..60 {
        for parallelism in 1..9 {
            let sizes = chunk_sizes(len, parallelism).unwrap();
            assert_eq!(sizes.iter().sum::<usize>(), len);
            assert_eq!(sizes.len(), parallelism.min(len));
            assert!(sizes.iter().all(|size| *size > 0));
            if let (Some(max), Some(min)) = (sizes.iter().max(), sizes.iter().min()) {
                assert!(max - min <= 1, "unbalanced split {:?}", sizes);
            }
        }
    }
}

// ============================================================
// partition tests
// ============================================================

#[test]
fn test_partition_concatenation_reproduces_input() {
    for len in [0, 1, 3, 4, 5, 7, 10, 33] {
        let input = items(len);
        let chunks = partition("run", input.clone(), 4).unwrap();

        let rebuilt: Vec<String> = chunks.iter().flat_map(|c| c.items.clone()).collect();
        assert_eq!(rebuilt, input, "len {}", len);
    }
}

#[test]
fn test_partition_indices_are_contiguous_from_zero() {
    let chunks = partition("run-7", items(10), 4).unwrap();

    let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert!(chunks.iter().all(|c| c.run_id == "run-7"));
}

#[test]
fn test_partition_preserves_input_order_per_chunk() {
    let chunks = partition("run", items(10), 4).unwrap();

    assert_eq!(chunks[0].items, vec!["item-000", "item-001", "item-002"]);
    assert_eq!(chunks[3].items, vec!["item-008", "item-009"]);
}

#[test]
fn test_partition_never_emits_empty_chunks() {
    let chunks = partition("run", items(2), 4).unwrap();

    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| !c.is_empty()));
}
