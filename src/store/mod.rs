//! Observable local store for survey sightings
//!
//! The store is snapshot-oriented: every mutation publishes the complete new
//! collection over a watch channel, and a fresh subscriber immediately sees
//! the current one. Snapshots are `Arc<Vec<_>>`, so observers and the
//! exporter share the same immutable data without copying.
//!
//! A store is constructed explicitly and handed to whoever needs data access;
//! there is no global instance.

pub mod persist;

pub use persist::{StoreError, StoreStorage};

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};

use crate::models::{AccessPoint, Beacon};

/// Immutable full-collection snapshot shared between observers
pub type Snapshot<T> = Arc<Vec<T>>;

/// A live collection that publishes a full snapshot on every mutation
pub struct LiveTable<T> {
    tx: watch::Sender<Snapshot<T>>,
}

impl<T: Clone> LiveTable<T> {
    /// Create an empty table
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Snapshot::default());
        Self { tx }
    }

    /// Create a table seeded with existing records
    pub fn with_records(records: Vec<T>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(records));
        Self { tx }
    }

    /// Append one record and publish the new snapshot
    pub fn insert(&self, record: T) {
        self.tx.send_modify(|snapshot| {
            let mut records = snapshot.as_ref().clone();
            records.push(record);
            *snapshot = Arc::new(records);
        });
    }

    /// Append a batch of records and publish a single new snapshot
    pub fn insert_many(&self, batch: Vec<T>) {
        if batch.is_empty() {
            return;
        }
        self.tx.send_modify(|snapshot| {
            let mut records = snapshot.as_ref().clone();
            records.extend(batch);
            *snapshot = Arc::new(records);
        });
    }

    /// Drop every record and publish the empty snapshot
    pub fn clear(&self) {
        self.tx.send_modify(|snapshot| *snapshot = Snapshot::default());
    }

    /// Subscribe to snapshot updates
    ///
    /// The receiver starts at the current snapshot, so the first read needs
    /// no prior mutation.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.tx.subscribe()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Snapshot<T> {
        self.tx.borrow().clone()
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    /// Whether the table holds no records
    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }
}

impl<T: Clone> Default for LiveTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Local store holding the two survey collections
pub struct SurveyStore {
    /// Live beacon collection
    beacons: LiveTable<Beacon>,
    /// Live access point collection
    access_points: LiveTable<AccessPoint>,
    /// Persistence backend, None for in-memory stores
    storage: Option<Arc<StoreStorage>>,
    /// Last save timestamp for debouncing
    last_save: RwLock<Instant>,
    /// Auto-save debounce period
    save_interval: Duration,
}

impl SurveyStore {
    /// Default debounce period between autosaves
    pub const DEFAULT_SAVE_INTERVAL: Duration = Duration::from_secs(5);

    /// Create an in-memory store with no persistence
    pub fn new() -> Self {
        Self {
            beacons: LiveTable::new(),
            access_points: LiveTable::new(),
            storage: None,
            last_save: RwLock::new(Instant::now()),
            save_interval: Self::DEFAULT_SAVE_INTERVAL,
        }
    }

    /// Create a store persisted under `storage_dir`, loading any existing collections
    pub fn with_storage(storage_dir: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        let storage = StoreStorage::new(storage_dir)?;

        let beacons = storage.load_beacons()?;
        let access_points = storage.load_access_points()?;

        Ok(Self {
            beacons: LiveTable::with_records(beacons),
            access_points: LiveTable::with_records(access_points),
            storage: Some(Arc::new(storage)),
            last_save: RwLock::new(Instant::now()),
            save_interval: Self::DEFAULT_SAVE_INTERVAL,
        })
    }

    /// Override the autosave debounce period
    pub fn with_save_interval(mut self, save_interval: Duration) -> Self {
        self.save_interval = save_interval;
        self
    }

    /// Live beacon collection
    pub fn beacons(&self) -> &LiveTable<Beacon> {
        &self.beacons
    }

    /// Live access point collection
    pub fn access_points(&self) -> &LiveTable<AccessPoint> {
        &self.access_points
    }

    /// Insert a batch of beacon sightings
    pub fn insert_beacons(&self, batch: Vec<Beacon>) {
        self.beacons.insert_many(batch);
    }

    /// Insert a batch of access point sightings
    pub fn insert_access_points(&self, batch: Vec<AccessPoint>) {
        self.access_points.insert_many(batch);
    }

    /// Clear both collections and persist the empty state
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        self.beacons.clear();
        self.access_points.clear();
        self.force_save().await
    }

    /// Save both collections to disk (with debouncing)
    pub async fn save_if_needed(&self) -> Result<(), StoreError> {
        let storage = match &self.storage {
            Some(s) => s,
            None => return Ok(()), // No persistence configured
        };

        // Check if enough time has passed since last save
        let mut last_save = self.last_save.write().await;
        if last_save.elapsed() < self.save_interval {
            return Ok(()); // Skip save (debounce)
        }

        storage.save_beacons(&self.beacons.snapshot())?;
        storage.save_access_points(&self.access_points.snapshot())?;

        *last_save = Instant::now();
        Ok(())
    }

    /// Save both collections immediately (bypass debouncing)
    pub async fn force_save(&self) -> Result<(), StoreError> {
        let storage = match &self.storage {
            Some(s) => s,
            None => return Ok(()),
        };

        storage.save_beacons(&self.beacons.snapshot())?;
        storage.save_access_points(&self.access_points.snapshot())?;

        let mut last_save = self.last_save.write().await;
        *last_save = Instant::now();

        tracing::debug!("Force saved both collections");
        Ok(())
    }
}

impl Default for SurveyStore {
    fn default() -> Self {
        Self::new()
    }
}
