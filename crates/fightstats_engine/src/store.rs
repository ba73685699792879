use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::sink::{DocumentStore, StoreError};

/// File-backed document store: one JSON-lines file per destination under a
/// data directory. Inserts rewrite the whole file through a temp file and
/// an atomic rename, so readers never observe a half-written batch.
#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    dir: PathBuf,
}

impl JsonLinesStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn destination_path(&self, destination: &str) -> PathBuf {
        self.dir.join(format!("{destination}.jsonl"))
    }

    /// Ensure the data directory exists; create it if missing.
    fn ensure_dir(&self) -> Result<(), StoreError> {
        if self.dir.exists() {
            let meta = fs::metadata(&self.dir)?;
            if !meta.is_dir() {
                return Err(StoreError::Unavailable(
                    "data path is not a directory".to_string(),
                ));
            }
        } else {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for JsonLinesStore {
    async fn delete_all(&self, destination: &str) -> Result<(), StoreError> {
        let target = self.destination_path(destination);
        if target.exists() {
            fs::remove_file(&target)?;
        }
        Ok(())
    }

    async fn insert_many(
        &self,
        destination: &str,
        records: Vec<serde_json::Value>,
    ) -> Result<usize, StoreError> {
        self.ensure_dir()?;
        let target = self.destination_path(destination);

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        // Inserts append: carry existing records over into the new file.
        if target.exists() {
            let existing = fs::read(&target)?;
            tmp.write_all(&existing)?;
        }
        for record in &records {
            let line = serde_json::to_string(record)?;
            tmp.write_all(line.as_bytes())?;
            tmp.write_all(b"\n")?;
        }
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Replace any existing file to keep the batch atomic.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|err| StoreError::Io(err.error))?;
        Ok(records.len())
    }
}
