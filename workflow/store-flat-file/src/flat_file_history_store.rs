// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::io_error;
use async_trait::async_trait;
use fs2::FileExt;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{
    fs::{self, File, OpenOptions},
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter},
    sync::Mutex,
    task::spawn_blocking,
};
use workflow_core::{HistoryEvent, HistoryStore, RunId, StoreError};

const EXTENSION: &str = "jsonl";
const LOCK_EXTENSION: &str = "lock";

/// One JSON-lines file per run under `dir`, named `<run_id>.jsonl`.
///
/// Appends hold an exclusive OS lock on `<run_id>.lock`, so store instances in
/// other processes see the same sequence check. The in-process mutex keeps tasks
/// of one instance from parking blocking threads on that lock.
#[derive(Clone)]
pub struct FlatFileHistoryStore {
    dir: PathBuf,
    mutex: Arc<Mutex<()>>,
}

/// Held for the duration of one append; the OS lock is released on drop
struct RunLock(std::fs::File);

impl RunLock {
    async fn acquire(path: PathBuf) -> Result<Self, StoreError> {
        spawn_blocking(move || -> std::io::Result<Self> {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&path)?;
            FileExt::lock_exclusive(&file)?;
            Ok(Self(file))
        })
        .await
        .map_err(|e| StoreError::Internal(format!("Task panicked: {:?}", e)))?
        .map_err(io_error)
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.0) {
            tracing::warn!(error = %e, "failed to release history lock");
        }
    }
}

impl FlatFileHistoryStore {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(io_error)?;

        Ok(Self {
            dir,
            mutex: Arc::new(Mutex::new(())),
        })
    }

    /// `None` for identifiers that cannot be a file name
    fn run_path(&self, run_id: &RunId, extension: &str) -> Option<PathBuf> {
        let id = run_id.as_str();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.dir.join(format!("{}.{}", id, extension)))
    }

    async fn read_file(path: &Path) -> Result<Vec<HistoryEvent>, StoreError> {
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(e)),
        };

        let mut lines = BufReader::new(file).lines();
        let mut events = Vec::new();
        while let Some(line) = lines.next_line().await.map_err(io_error)? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryEvent>(&line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping malformed history line"
                    );
                }
            }
        }
        Ok(events)
    }

    /// A crash mid-append can leave a last line without its newline. A complete
    /// event gets its newline back; a partial one is cut off, so the next
    /// append starts on a line of its own.
    async fn repair_tail(path: &Path) -> Result<(), StoreError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_error(e)),
        };
        if matches!(bytes.last(), None | Some(b'\n')) {
            return Ok(());
        }

        let keep = bytes
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |i| i + 1);
        let mut file = OpenOptions::new()
            .append(true)
            .open(path)
            .await
            .map_err(io_error)?;

        if serde_json::from_slice::<HistoryEvent>(&bytes[keep..]).is_ok() {
            file.write_all(b"\n").await.map_err(io_error)?;
        } else {
            tracing::warn!(
                path = %path.display(),
                bytes = bytes.len() - keep,
                "truncating torn history line"
            );
            file.set_len(keep as u64).await.map_err(io_error)?;
        }
        file.sync_data().await.map_err(io_error)
    }
}

#[async_trait]
impl HistoryStore for FlatFileHistoryStore {
    async fn append(&self, event: HistoryEvent) -> Result<(), StoreError> {
        let invalid = || {
            StoreError::Internal(format!("run id '{}' is not a valid file name", event.run_id))
        };
        let path = self.run_path(&event.run_id, EXTENSION).ok_or_else(invalid)?;
        let lock_path = self
            .run_path(&event.run_id, LOCK_EXTENSION)
            .ok_or_else(invalid)?;

        let _guard = self.mutex.lock().await;
        let _lock = RunLock::acquire(lock_path).await?;

        Self::repair_tail(&path).await?;
        let expected = Self::read_file(&path).await?.len() as u64;
        if event.sequence != expected {
            return Err(StoreError::SequenceConflict {
                expected,
                actual: event.sequence,
            });
        }

        let mut line = serde_json::to_string(&event)?;
        line.push('\n');

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(line.as_bytes()).await.map_err(io_error)?;
        writer.flush().await.map_err(io_error)?;
        writer.get_ref().sync_data().await.map_err(io_error)?;

        Ok(())
    }

    async fn read(&self, run_id: &RunId) -> Result<Vec<HistoryEvent>, StoreError> {
        let Some(path) = self.run_path(run_id, EXTENSION) else {
            return Ok(Vec::new());
        };
        let _guard = self.mutex.lock().await;
        Self::read_file(&path).await
    }

    async fn list_runs(&self) -> Result<Vec<RunId>, StoreError> {
        let _guard = self.mutex.lock().await;
        let mut entries = fs::read_dir(&self.dir).await.map_err(io_error)?;

        let mut runs = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                runs.push(RunId::new(stem));
            }
        }
        runs.sort();
        Ok(runs)
    }
}
