// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::cli::Backend;
use std::{path::Path, sync::Arc};
use workflow_core::{HistoryStore, InMemoryHistoryStore, InMemoryResultStore, ResultStore};
use workflow_store_flat_file::{FlatFileHistoryStore, FlatFileResultStore};
use workflow_store_sled_db::{open_db, SledDbHistoryStore, SledDbResultStore};

pub struct Stores {
    pub history: Arc<dyn HistoryStore>,
    pub results: Arc<dyn ResultStore>,
}

pub async fn open_stores(backend: Backend, data_dir: &Path) -> anyhow::Result<Stores> {
    let stores = match backend {
        Backend::InMemory => Stores {
            history: Arc::new(InMemoryHistoryStore::new()),
            results: Arc::new(InMemoryResultStore::new()),
        },
        Backend::FlatFile => Stores {
            history: Arc::new(FlatFileHistoryStore::new(data_dir.join("history")).await?),
            results: Arc::new(FlatFileResultStore::new(data_dir.join("records.jsonl")).await?),
        },
        Backend::Sled => {
            let db = open_db(data_dir.join("sled"))?;
            Stores {
                history: Arc::new(SledDbHistoryStore::new(&db)?),
                results: Arc::new(SledDbResultStore::new(&db)?),
            }
        }
    };

    tracing::info!(backend = ?backend, data_dir = %data_dir.display(), "stores opened");
    Ok(stores)
}
