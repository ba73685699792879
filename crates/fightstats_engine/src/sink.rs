use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;

/// A named destination that can be bulk-replaced. The crawler depends on
/// exactly these two operations and nothing else about the store.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Remove every record in `destination`.
    async fn delete_all(&self, destination: &str) -> Result<(), StoreError>;

    /// Insert `records` into `destination` as one batch, returning how many
    /// were written.
    async fn insert_many(
        &self,
        destination: &str,
        records: Vec<serde_json::Value>,
    ) -> Result<usize, StoreError>;
}

/// Failure inside a document store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record encoding failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the bulk replace as a whole.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The new dataset was empty; the delete step was refused.
    #[error("empty dataset; refusing to replace '{destination}'")]
    EmptyDataset { destination: String },
    #[error("record encoding failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Replaces the destination's contents with `records`: delete all existing
/// records, then insert the new set as one batch.
///
/// An empty dataset is refused before the delete step runs, so a failed
/// crawl can never silently wipe a destination. The caller keeps ownership
/// of `records`, so retrying just the sink after a store failure needs no
/// re-crawl.
pub async fn replace_all<T: Serialize>(
    store: &dyn DocumentStore,
    destination: &str,
    records: &[T],
) -> Result<usize, SinkError> {
    if records.is_empty() {
        return Err(SinkError::EmptyDataset {
            destination: destination.to_string(),
        });
    }

    let documents = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    store.delete_all(destination).await?;
    let inserted = store.insert_many(destination, documents).await?;
    log::info!("Replaced '{destination}' with {inserted} records");
    Ok(inserted)
}

/// Mutex-guarded map store, used by tests and as a drop-in fake.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: Mutex<HashMap<String, Vec<serde_json::Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of `destination`.
    pub fn records(&self, destination: &str) -> Vec<serde_json::Value> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(destination)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryStore {
    async fn delete_all(&self, destination: &str) -> Result<(), StoreError> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(destination);
        Ok(())
    }

    async fn insert_many(
        &self,
        destination: &str,
        records: Vec<serde_json::Value>,
    ) -> Result<usize, StoreError> {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let inserted = records.len();
        collections
            .entry(destination.to_string())
            .or_default()
            .extend(records);
        Ok(inserted)
    }
}
