// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod flat_file_history_store;
pub use flat_file_history_store::FlatFileHistoryStore;

mod flat_file_result_store;
pub use flat_file_result_store::FlatFileResultStore;

fn io_error(e: std::io::Error) -> workflow_core::StoreError {
    workflow_core::StoreError::Internal(e.to_string())
}
