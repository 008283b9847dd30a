//! RadioLog SDK - supervised radio survey collection
//!
//! Library for running field surveys of nearby radio signals:
//! - Background services sampling BLE beacons and WiFi access points
//! - Observable local store publishing full snapshots on every change
//! - JSON export of both collections with user-facing notices
//! - Permission gating against a host-provided capability surface
//!
//! Radio scanning itself stays behind the [`services::SignalSource`] seam, so
//! the SDK runs the same on a workstation (simulated sources) and on device.

pub mod config;
pub mod export;
#[cfg(feature = "android")]
pub mod ffi;
pub mod models;
pub mod observer;
pub mod permissions;
pub mod screen;
pub mod services;
pub mod store;
pub mod util;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;

use crate::config::SurveyConfig;
use crate::export::{ExportReport, SnapshotExporter};
use crate::models::{AccessPoint, Beacon};
use crate::permissions::{PermissionGate, PermissionHost};
use crate::screen::SurveyScreen;
use crate::services::{
    ServiceController, SignalSource, SimulatedBeaconField, SimulatedWifiNeighborhood,
};
use crate::store::SurveyStore;

/// Main SDK entry point for radio survey sessions
pub struct RadioLogSDK {
    config: SurveyConfig,
    host: Arc<dyn PermissionHost>,
    store: Arc<SurveyStore>,
    services: Arc<ServiceController>,
    exporter: Arc<SnapshotExporter>,
    notices: broadcast::Sender<String>,
}

impl RadioLogSDK {
    /// Create the SDK with default settings and simulated radio sources
    pub async fn new(host: Arc<dyn PermissionHost>) -> Result<Self, RadioLogError> {
        Self::with_config(SurveyConfig::default(), host).await
    }

    /// Create the SDK with explicit settings and simulated radio sources
    pub async fn with_config(
        config: SurveyConfig,
        host: Arc<dyn PermissionHost>,
    ) -> Result<Self, RadioLogError> {
        Self::with_sources(
            config,
            host,
            SimulatedBeaconField::new(8),
            SimulatedWifiNeighborhood::new(12),
        )
        .await
    }

    /// Create the SDK with caller-provided radio sources
    pub async fn with_sources<B, W>(
        config: SurveyConfig,
        host: Arc<dyn PermissionHost>,
        beacon_source: B,
        wifi_source: W,
    ) -> Result<Self, RadioLogError>
    where
        B: SignalSource<Record = Beacon> + 'static,
        W: SignalSource<Record = AccessPoint> + 'static,
    {
        let store = match &config.store_dir {
            Some(dir) => SurveyStore::with_storage(dir)?,
            None => SurveyStore::new(),
        }
        .with_save_interval(config.auto_save_interval());
        let store = Arc::new(store);

        let services = Arc::new(ServiceController::spawn(
            store.clone(),
            beacon_source,
            wifi_source,
            config.beacon_sample_interval(),
            config.wifi_sample_interval(),
        ));

        let (notices, _) = broadcast::channel(config.notice_capacity);
        let exporter = Arc::new(SnapshotExporter::new(
            config.export_root.clone(),
            notices.clone(),
        ));

        tracing::info!("RadioLog SDK initialized");

        Ok(Self {
            config,
            host,
            store,
            services,
            exporter,
            notices,
        })
    }

    /// Build a survey screen wired to this SDK's services
    pub fn new_screen(&self) -> SurveyScreen {
        let gate = PermissionGate::with_request_id(
            self.host.clone(),
            self.config.permission_request_id,
        );
        SurveyScreen::new(
            self.store.clone(),
            self.services.clone(),
            self.exporter.clone(),
            gate,
        )
    }

    /// Shared handle to the survey store
    pub fn store(&self) -> Arc<SurveyStore> {
        self.store.clone()
    }

    /// Subscribe to user-facing notices such as export confirmations
    pub fn subscribe_notices(&self) -> broadcast::Receiver<String> {
        self.notices.subscribe()
    }

    /// Start both collection services
    pub fn start_collection(&self) {
        self.services.start_collection();
    }

    /// Stop both collection services
    pub fn stop_collection(&self) {
        self.services.stop_collection();
    }

    /// Export the store's current snapshots
    ///
    /// Exports started from a screen use that screen's observed snapshots
    /// instead; this entry point reads the store directly.
    pub async fn export_all(&self) -> ExportReport {
        self.exporter
            .export_all(self.store.beacons().snapshot(), self.store.access_points().snapshot())
            .await
    }

    /// Wipe both collections and persist the empty state
    pub async fn clear_all(&self) -> Result<(), RadioLogError> {
        Ok(self.store.clear_all().await?)
    }

    /// Number of beacons currently in the store
    pub fn beacon_count(&self) -> usize {
        self.store.beacons().len()
    }

    /// Number of access points currently in the store
    pub fn ap_count(&self) -> usize {
        self.store.access_points().len()
    }

    /// Stop collection, abort the services and flush the store
    pub async fn shutdown(&self) -> Result<(), RadioLogError> {
        self.stop_collection();
        self.services.shutdown();
        self.store.force_save().await?;
        tracing::info!("RadioLog SDK shut down");
        Ok(())
    }
}

/// Top-level SDK error
#[derive(Error, Debug)]
pub enum RadioLogError {
    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Screen error: {0}")]
    Screen(#[from] screen::ScreenError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),
}
