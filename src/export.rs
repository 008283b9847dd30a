//! JSON export of the survey collections
//!
//! Exports run on the blocking pool and report their outcome through a
//! [`ExportReport`] instead of an error: a failed collection is logged and
//! recorded, never raised, so one bad path cannot take down a survey session.
//! Every successfully written file also emits a user-facing notice.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::models::{AccessPoint, Beacon, AP_COLLECTION, BEACON_COLLECTION};
use crate::store::Snapshot;
use crate::util;

/// Directory created under the export root to hold the JSON files
pub const EXPORT_DIR_NAME: &str = "radiolog";

/// Notice broadcast after each successfully written file
pub const EXPORT_NOTICE: &str = "Dati esportati nella cartella \"radiolog\"";

/// Outcome of one export pass over both collections
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// Files written, in export order
    pub written: Vec<PathBuf>,
    /// Collections that could not be written
    pub failed: Vec<ExportFailure>,
}

impl ExportReport {
    /// True when every collection reached disk
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One collection that failed to export
#[derive(Debug, Clone)]
pub struct ExportFailure {
    pub collection: &'static str,
    pub reason: ExportError,
}

/// Export errors, recorded in the report rather than raised
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    #[error("Failed to create export directory: {0}")]
    Directory(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Failed to write export file: {0}")]
    Io(String),

    #[error("Export worker failed: {0}")]
    Worker(String),
}

/// Writes collection snapshots as timestamped JSON files
pub struct SnapshotExporter {
    export_root: PathBuf,
    notices: broadcast::Sender<String>,
}

impl SnapshotExporter {
    pub fn new(export_root: impl Into<PathBuf>, notices: broadcast::Sender<String>) -> Self {
        Self {
            export_root: export_root.into(),
            notices,
        }
    }

    /// Export both collections, beacons first
    ///
    /// The file work runs on the blocking pool; the returned report lists
    /// what was written and what failed.
    pub async fn export_all(
        &self,
        beacons: Snapshot<Beacon>,
        access_points: Snapshot<AccessPoint>,
    ) -> ExportReport {
        let export_dir = self.export_root.join(EXPORT_DIR_NAME);
        let notices = self.notices.clone();

        let worker = tokio::task::spawn_blocking(move || {
            let mut report = ExportReport::default();
            write_collection(&export_dir, BEACON_COLLECTION, &beacons, &notices, &mut report);
            write_collection(&export_dir, AP_COLLECTION, &access_points, &notices, &mut report);
            report
        });

        match worker.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Export worker failed: {}", e);
                ExportReport {
                    written: Vec::new(),
                    failed: vec![
                        ExportFailure {
                            collection: BEACON_COLLECTION,
                            reason: ExportError::Worker(e.to_string()),
                        },
                        ExportFailure {
                            collection: AP_COLLECTION,
                            reason: ExportError::Worker(e.to_string()),
                        },
                    ],
                }
            }
        }
    }
}

fn write_collection<T: Serialize>(
    export_dir: &Path,
    collection: &'static str,
    records: &[T],
    notices: &broadcast::Sender<String>,
    report: &mut ExportReport,
) {
    match try_write(export_dir, collection, records) {
        Ok(path) => {
            tracing::info!("Exported {} records to {}", records.len(), path.display());
            let _ = notices.send(EXPORT_NOTICE.to_string());
            report.written.push(path);
        }
        Err(reason) => {
            tracing::error!("Failed to export {} collection: {}", collection, reason);
            report.failed.push(ExportFailure { collection, reason });
        }
    }
}

fn try_write<T: Serialize>(
    export_dir: &Path,
    collection: &str,
    records: &[T],
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(export_dir).map_err(|e| ExportError::Directory(e.to_string()))?;

    let json = serde_json::to_string_pretty(records)
        .map_err(|e| ExportError::Serialization(format!("{}: {}", collection, e)))?;

    let path = export_dir.join(format!("{}_{}.json", collection, util::common::epoch_millis()));
    // Single-shot write; a crash mid-write can leave a truncated file
    std::fs::write(&path, json).map_err(|e| ExportError::Io(format!("{}: {}", collection, e)))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn beacon(minor: u16) -> Beacon {
        Beacon::new(Uuid::new_v4(), 1, minor, -50)
    }

    #[tokio::test]
    async fn test_export_writes_both_collections() {
        let dir = tempdir().unwrap();
        let (tx, mut notices) = broadcast::channel(8);
        let exporter = SnapshotExporter::new(dir.path(), tx);

        let beacons: Snapshot<Beacon> = Arc::new(vec![beacon(1), beacon(2)]);
        let access_points: Snapshot<AccessPoint> = Arc::new(Vec::new());

        let report = exporter.export_all(beacons, access_points).await;

        assert!(report.is_complete());
        assert_eq!(report.written.len(), 2);

        let beacon_name = report.written[0].file_name().unwrap().to_str().unwrap();
        assert!(beacon_name.starts_with("beacon_"));
        assert!(beacon_name.ends_with(".json"));

        let exported: Vec<Beacon> =
            serde_json::from_str(&std::fs::read_to_string(&report.written[0]).unwrap()).unwrap();
        assert_eq!(exported.len(), 2);

        let empty: Vec<AccessPoint> =
            serde_json::from_str(&std::fs::read_to_string(&report.written[1]).unwrap()).unwrap();
        assert!(empty.is_empty());

        assert_eq!(notices.recv().await.unwrap(), EXPORT_NOTICE);
        assert_eq!(notices.recv().await.unwrap(), EXPORT_NOTICE);
    }

    #[tokio::test]
    async fn test_files_land_in_the_named_directory() {
        let dir = tempdir().unwrap();
        let (tx, _notices) = broadcast::channel(8);
        let exporter = SnapshotExporter::new(dir.path(), tx);

        let report = exporter
            .export_all(Arc::new(vec![beacon(1)]), Arc::new(Vec::new()))
            .await;

        for path in &report.written {
            assert_eq!(path.parent().unwrap(), dir.path().join(EXPORT_DIR_NAME));
        }
    }

    #[tokio::test]
    async fn test_export_captures_the_snapshot_at_the_action() {
        let dir = tempdir().unwrap();
        let (tx, _notices) = broadcast::channel(8);
        let exporter = SnapshotExporter::new(dir.path(), tx);

        let table = crate::store::LiveTable::with_records(vec![beacon(1)]);
        let held = table.snapshot();
        // Sightings arriving after the action do not join the export
        table.insert(beacon(2));

        let report = exporter.export_all(held, Arc::new(Vec::new())).await;

        let exported: Vec<Beacon> =
            serde_json::from_str(&std::fs::read_to_string(&report.written[0]).unwrap()).unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_swallowed() {
        let dir = tempdir().unwrap();
        // A file where the export directory should go makes create_dir_all fail
        std::fs::write(dir.path().join(EXPORT_DIR_NAME), b"blocked").unwrap();

        let (tx, mut notices) = broadcast::channel(8);
        let exporter = SnapshotExporter::new(dir.path(), tx);

        let report = exporter
            .export_all(Arc::new(vec![beacon(1)]), Arc::new(Vec::new()))
            .await;

        assert!(!report.is_complete());
        assert_eq!(report.failed.len(), 2);
        assert!(report.written.is_empty());
        assert!(notices.try_recv().is_err());
    }
}
