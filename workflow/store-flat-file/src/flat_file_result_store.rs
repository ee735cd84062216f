// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::io_error;
use async_trait::async_trait;
use std::{collections::BTreeMap, path::PathBuf, sync::Arc};
use tokio::{
    fs::{self, File, OpenOptions},
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter},
    sync::Mutex,
};
use workflow_core::{ResultStore, StoreError, StoredRecord};

type Table = BTreeMap<(String, String), StoredRecord>;

/// Result table kept as one JSON line per record.
///
/// Every write rewrites the whole file through a temporary sibling and a rename,
/// so readers never observe a half-written table.
#[derive(Clone)]
pub struct FlatFileResultStore {
    file_path: PathBuf,
    mutex: Arc<Mutex<()>>,
}

impl FlatFileResultStore {
    pub async fn new(file_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let file_path = file_path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        if fs::metadata(&file_path).await.is_err() {
            File::create(&file_path).await.map_err(io_error)?;
        }

        Ok(Self {
            file_path,
            mutex: Arc::new(Mutex::new(())),
        })
    }

    async fn load(&self) -> Result<Table, StoreError> {
        let file = File::open(&self.file_path).await.map_err(io_error)?;
        let mut lines = BufReader::new(file).lines();

        let mut table = Table::new();
        while let Some(line) = lines.next_line().await.map_err(io_error)? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<StoredRecord>(&line) {
                Ok(record) => {
                    table.insert(
                        (record.partition_key.clone(), record.row_key.clone()),
                        record,
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed record line");
                }
            }
        }
        Ok(table)
    }

    async fn save(&self, table: &Table) -> Result<(), StoreError> {
        let tmp_path = self.file_path.with_extension("tmp");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .await
            .map_err(io_error)?;

        let mut writer = BufWriter::new(file);
        for record in table.values() {
            let mut line = serde_json::to_string(record)?;
            line.push('\n');
            writer.write_all(line.as_bytes()).await.map_err(io_error)?;
        }
        writer.flush().await.map_err(io_error)?;
        writer.get_ref().sync_all().await.map_err(io_error)?;

        fs::rename(&tmp_path, &self.file_path)
            .await
            .map_err(io_error)
    }
}

#[async_trait]
impl ResultStore for FlatFileResultStore {
    async fn upsert(&self, record: StoredRecord) -> Result<(), StoreError> {
        self.upsert_all(vec![record]).await
    }

    async fn get(&self, partition_key: &str, row_key: &str) -> Result<StoredRecord, StoreError> {
        let _lock = self.mutex.lock().await;
        self.load()
            .await?
            .remove(&(partition_key.to_string(), row_key.to_string()))
            .ok_or_else(|| StoreError::KeyNotFound(format!("{}/{}", partition_key, row_key)))
    }

    async fn scan(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let _lock = self.mutex.lock().await;
        Ok(self.load().await?.into_values().collect())
    }

    async fn upsert_all(&self, records: Vec<StoredRecord>) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let _lock = self.mutex.lock().await;
        let mut table = self.load().await?;
        for record in records {
            table.insert(
                (record.partition_key.clone(), record.row_key.clone()),
                record,
            );
        }
        self.save(&table).await
    }
}
