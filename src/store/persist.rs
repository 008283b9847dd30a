//! Store Persistence Module
//!
//! Handles saving and loading the survey collections to/from disk with atomic
//! writes so the store survives app restarts. A missing file is treated as an
//! empty collection.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{AccessPoint, Beacon, AP_COLLECTION, BEACON_COLLECTION};
use crate::util;

/// On-disk layout version
const PERSIST_VERSION: u32 = 1;

/// Store persistence manager
pub struct StoreStorage {
    /// Base directory for collection files
    storage_dir: PathBuf,
}

impl StoreStorage {
    /// Create a new persistence manager rooted at `storage_dir`
    pub fn new(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();

        // Create directory if it doesn't exist
        if !storage_dir.exists() {
            fs::create_dir_all(&storage_dir).map_err(|e| {
                StoreError::IoError(format!("Failed to create storage directory: {}", e))
            })?;
        }

        Ok(Self { storage_dir })
    }

    /// Get file path for a collection
    fn collection_path(&self, collection: &str) -> PathBuf {
        self.storage_dir.join(format!("{}.json", collection))
    }

    /// Get temporary file path for atomic writes
    fn temp_path(&self, collection: &str) -> PathBuf {
        self.storage_dir.join(format!("{}.tmp", collection))
    }

    /// Save the beacon collection to disk (atomic write)
    pub fn save_beacons(&self, records: &[Beacon]) -> Result<(), StoreError> {
        self.save_collection(BEACON_COLLECTION, records)
    }

    /// Load the beacon collection from disk
    pub fn load_beacons(&self) -> Result<Vec<Beacon>, StoreError> {
        self.load_collection(BEACON_COLLECTION)
    }

    /// Save the access point collection to disk (atomic write)
    pub fn save_access_points(&self, records: &[AccessPoint]) -> Result<(), StoreError> {
        self.save_collection(AP_COLLECTION, records)
    }

    /// Load the access point collection from disk
    pub fn load_access_points(&self) -> Result<Vec<AccessPoint>, StoreError> {
        self.load_collection(AP_COLLECTION)
    }

    fn save_collection<T: Serialize + Clone>(
        &self,
        collection: &str,
        records: &[T],
    ) -> Result<(), StoreError> {
        let path = self.collection_path(collection);
        let temp_path = self.temp_path(collection);

        let persistable = CollectionPersist {
            version: PERSIST_VERSION,
            records: records.to_vec(),
            saved_at: util::common::epoch_secs(),
        };
        let json = serde_json::to_string_pretty(&persistable).map_err(|e| {
            StoreError::SerializationError(format!(
                "Failed to serialize {} collection: {}",
                collection, e
            ))
        })?;

        // Atomic write: write to temp file first
        {
            let mut file = fs::File::create(&temp_path)
                .map_err(|e| StoreError::IoError(format!("Failed to create temp file: {}", e)))?;
            file.write_all(json.as_bytes())
                .map_err(|e| StoreError::IoError(format!("Failed to write temp file: {}", e)))?;
            file.sync_all()
                .map_err(|e| StoreError::IoError(format!("Failed to sync temp file: {}", e)))?;
        }

        // Rename temp to final (atomic on most filesystems)
        fs::rename(&temp_path, &path)
            .map_err(|e| StoreError::IoError(format!("Failed to rename temp file: {}", e)))?;

        tracing::debug!("Saved {} collection to {}", collection, path.display());
        Ok(())
    }

    fn load_collection<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, StoreError> {
        let path = self.collection_path(collection);

        if !path.exists() {
            tracing::debug!("No saved {} collection found, starting fresh", collection);
            return Ok(Vec::new());
        }

        let json = fs::read_to_string(&path).map_err(|e| {
            StoreError::IoError(format!("Failed to read {} collection: {}", collection, e))
        })?;

        let persistable: CollectionPersist<T> = serde_json::from_str(&json).map_err(|e| {
            StoreError::DeserializationError(format!(
                "Failed to deserialize {} collection: {}",
                collection, e
            ))
        })?;

        tracing::info!(
            "Loaded {} collection: {} records",
            collection,
            persistable.records.len()
        );
        Ok(persistable.records)
    }
}

/// Persistable collection wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionPersist<T> {
    version: u32,
    records: Vec<T>,
    saved_at: u64,
}

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}
