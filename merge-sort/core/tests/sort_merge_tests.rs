// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use merge_sort_core::{
    merge_sort, merge_sorted_chunks, merge_two, name_generator::generate_names, partition,
    sort_chunk, AlgorithmError, Chunk, SortedChunk,
};
use rand::{rngs::StdRng, SeedableRng};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn sorted_chunk(index: usize, values: &[&str]) -> SortedChunk {
    SortedChunk {
        run_id: "run".to_string(),
        index,
        items: strings(values),
    }
}

// ============================================================
// 2-way merge tests
// ============================================================

#[test]
fn test_merge_two_interleaves() {
    let merged = merge_two(strings(&["a", "c", "e"]), strings(&["b", "d"]));
    assert_eq!(merged, strings(&["a", "b", "c", "d", "e"]));
}

#[test]
fn test_merge_two_appends_remainder() {
    assert_eq!(merge_two(vec![], strings(&["x"])), strings(&["x"]));
    assert_eq!(merge_two(strings(&["x", "y"]), vec![]), strings(&["x", "y"]));
}

#[test]
fn test_merge_two_keeps_equal_items() {
    let merged = merge_two(strings(&["Bob", "bob"]), strings(&["Bob"]));
    assert_eq!(merged, strings(&["Bob", "Bob", "bob"]));
}

// ============================================================
// sort worker tests
// ============================================================

#[test]
fn test_merge_sort_uses_ordinal_order() {
    let sorted = merge_sort(strings(&["banana", "Apple", "apple", "Zed", "éclair"]));
    assert_eq!(sorted, strings(&["Apple", "Zed", "apple", "banana", "éclair"]));
}

#[test]
fn test_merge_sort_handles_trivial_inputs() {
    assert!(merge_sort(vec![]).is_empty());
    assert_eq!(merge_sort(strings(&["only"])), strings(&["only"]));
}

#[test]
fn test_sort_chunk_keeps_index_and_run() {
    let chunk = Chunk::new("run-1", 3, strings(&["c", "a", "b"]));
    let sorted = sort_chunk(chunk);

    assert_eq!(sorted.index, 3);
    assert_eq!(sorted.run_id, "run-1");
    assert_eq!(sorted.items, strings(&["a", "b", "c"]));
}

#[test]
fn test_sort_chunk_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(11);
    let chunk = Chunk::new("run", 0, generate_names(&mut rng, 200));

    let first = sort_chunk(chunk.clone());
    let second = sort_chunk(chunk);
    assert_eq!(first, second);
}

#[test]
fn test_sort_chunk_keeps_duplicates() {
    let chunk = Chunk::new("run", 0, strings(&["b", "a", "b", "a"]));
    assert_eq!(sort_chunk(chunk).items, strings(&["a", "a", "b", "b"]));
}

// ============================================================
// merge reducer tests
// ============================================================

#[test]
fn test_reducer_merges_example() {
    let result =
        merge_sorted_chunks(vec![sorted_chunk(0, &["b"]), sorted_chunk(1, &["a", "c"])], 2)
            .unwrap();

    assert_eq!(result.items, strings(&["a", "b", "c"]));
    assert_eq!(result.len(), 3);
}

#[test]
fn test_reducer_ignores_arrival_order() {
    let in_order = merge_sorted_chunks(
        vec![
            sorted_chunk(0, &["a", "d"]),
            sorted_chunk(1, &["b", "e"]),
            sorted_chunk(2, &["c"]),
        ],
        3,
    )
    .unwrap();
    let shuffled = merge_sorted_chunks(
        vec![
            sorted_chunk(2, &["c"]),
            sorted_chunk(0, &["a", "d"]),
            sorted_chunk(1, &["b", "e"]),
        ],
        3,
    )
    .unwrap();

    assert_eq!(in_order, shuffled);
    assert!(in_order.is_sorted());
}

#[test]
fn test_reducer_empty_input_short_circuits() {
    let result = merge_sorted_chunks(vec![], 0).unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_reducer_signals_missing_chunks() {
    let err = merge_sorted_chunks(vec![sorted_chunk(0, &["a"]), sorted_chunk(2, &["c"])], 4)
        .unwrap_err();

    assert_eq!(
        err,
        AlgorithmError::IncompleteInput {
            expected: 4,
            missing: vec![1, 3],
        }
    );
}

#[test]
fn test_reducer_rejects_out_of_range_chunk() {
    let err = merge_sorted_chunks(vec![sorted_chunk(5, &["a"])], 2).unwrap_err();
    assert_eq!(
        err,
        AlgorithmError::UnexpectedChunk {
            index: 5,
            expected: 2
        }
    );
}

#[test]
fn test_reducer_tolerates_duplicate_delivery() {
    let result = merge_sorted_chunks(
        vec![
            sorted_chunk(0, &["a", "c"]),
            sorted_chunk(1, &["b"]),
            sorted_chunk(1, &["b"]),
        ],
        2,
    )
    .unwrap();

    assert_eq!(result.items, strings(&["a", "b", "c"]));
}

// ============================================================
// round trip: partition -> sort each -> merge
// ============================================================

#[test]
fn test_pipeline_matches_direct_sort() {
    let mut rng = StdRng::seed_from_u64(42);

    for len in [0usize, 1, 2, 3, 4, 7, 10, 64, 257] {
        for parallelism in [1usize, 2, 4, 5] {
            let input = generate_names(&mut rng, len);

            let chunks = partition("run", input.clone(), parallelism).unwrap();
            let expected_chunks = chunks.len();
            let sorted: Vec<SortedChunk> = chunks.into_iter().map(sort_chunk).collect();
            let result = merge_sorted_chunks(sorted, expected_chunks).unwrap();

            let mut direct = input;
            direct.sort();
            assert_eq!(result.items, direct, "len {} parallelism {}", len, parallelism);
        }
    }
}
