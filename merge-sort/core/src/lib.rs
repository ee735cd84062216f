// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod algorithm_error;
pub use algorithm_error::AlgorithmError;

mod chunk;
pub use chunk::{Chunk, SortedChunk, SortedResult};

pub mod name_generator;
pub use name_generator::{DataGenerator, FakeNameGenerator};

mod partitioner;
pub use partitioner::{chunk_sizes, partition};

mod two_way_merge;
pub use two_way_merge::merge_two;

mod sort_worker;
pub use sort_worker::{merge_sort, sort_chunk};

mod merge_reducer;
pub use merge_reducer::merge_sorted_chunks;
