//! The survey screen
//!
//! Supervises one survey session: shell activation, permission prompting, live
//! observation of both collections, and the user-triggered export and clean
//! actions. Collection itself runs in the background services; the screen only
//! steers them.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::export::{ExportReport, SnapshotExporter};
use crate::observer::DataObserver;
use crate::permissions::{PermissionGate, PermissionRequest};
use crate::screen::{activate, Activation, LayoutId, Screen, ScreenError};
use crate::services::ServiceController;
use crate::store::SurveyStore;

const SURVEY_LAYOUT: LayoutId = LayoutId(1);

/// Everything that happened during [`SurveyScreen::activate`]
#[derive(Debug)]
pub struct ScreenActivation {
    /// Whether the shell was set up or skipped over a missing layout
    pub shell: Activation,
    /// The permission prompt handed to the host, when anything was missing
    pub permission_request: Option<PermissionRequest>,
}

/// Screen supervising collection, observation, export and cleanup
pub struct SurveyScreen {
    layout_id: LayoutId,
    store: Arc<SurveyStore>,
    services: Arc<ServiceController>,
    exporter: Arc<SnapshotExporter>,
    gate: PermissionGate,
    observer: DataObserver,
    subscriptions: Vec<JoinHandle<()>>,
    bound: bool,
    toolbar_ready: bool,
}

impl SurveyScreen {
    pub fn new(
        store: Arc<SurveyStore>,
        services: Arc<ServiceController>,
        exporter: Arc<SnapshotExporter>,
        gate: PermissionGate,
    ) -> Self {
        Self {
            layout_id: SURVEY_LAYOUT,
            store,
            services,
            exporter,
            gate,
            observer: DataObserver::new(),
            subscriptions: Vec::new(),
            bound: false,
            toolbar_ready: false,
        }
    }

    /// Override the layout id, mainly to exercise the zero-layout path
    pub fn with_layout_id(mut self, layout_id: LayoutId) -> Self {
        self.layout_id = layout_id;
        self
    }

    /// Bring the screen up: shell, permission prompt, then observers
    ///
    /// A skipped shell only skips the shell; permissions are still checked
    /// and the observers still attach, so the screen keeps tracking data.
    pub fn activate(&mut self) -> Result<ScreenActivation, ScreenError> {
        let shell = activate(self)?;
        let permission_request = self.gate.ask_for_permissions();
        self.init_observers();

        Ok(ScreenActivation {
            shell,
            permission_request,
        })
    }

    fn init_observers(&mut self) {
        self.release_subscriptions();
        self.subscriptions.push(self.observer.observe_beacons(&self.store));
        self.subscriptions
            .push(self.observer.observe_access_points(&self.store));
    }

    fn release_subscriptions(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.abort();
        }
    }

    /// Tear the screen down, releasing every live subscription
    pub fn deactivate(&mut self) {
        tracing::debug!("Deactivating survey screen");
        self.release_subscriptions();
    }

    /// Start both collection services
    pub fn start_collection(&self) {
        tracing::debug!("Starting foreground collection");
        self.services.start_collection();
    }

    /// Stop both collection services
    pub fn stop_collection(&self) {
        tracing::debug!("Stopping foreground collection");
        self.services.stop_collection();
    }

    /// Export what this screen currently observes
    ///
    /// The screen exports its observer's snapshots rather than re-querying
    /// the store, so the files match what the user is looking at.
    pub fn export_data(&self) -> JoinHandle<ExportReport> {
        let exporter = self.exporter.clone();
        let beacons = self.observer.beacon_snapshot();
        let access_points = self.observer.ap_snapshot();

        tokio::spawn(async move {
            let report = exporter.export_all(beacons, access_points).await;
            if !report.is_complete() {
                tracing::warn!(
                    "Export finished with {} failed collections",
                    report.failed.len()
                );
            }
            report
        })
    }

    /// Wipe both collections in the background
    pub fn clean_data(&self) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.clear_all().await {
                tracing::error!("Failed to clear collections: {}", e);
            }
        })
    }

    /// The observer backing this screen's live view
    pub fn observer(&self) -> &DataObserver {
        &self.observer
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn is_toolbar_ready(&self) -> bool {
        self.toolbar_ready
    }
}

impl Screen for SurveyScreen {
    fn layout_id(&self) -> LayoutId {
        self.layout_id
    }

    fn set_binding(&mut self) -> Result<(), ScreenError> {
        self.bound = true;
        Ok(())
    }

    fn set_toolbar(&mut self) -> Result<(), ScreenError> {
        self.toolbar_ready = true;
        Ok(())
    }
}

impl Drop for SurveyScreen {
    fn drop(&mut self) {
        self.release_subscriptions();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccessPoint, Beacon};
    use crate::permissions::{Capability, PermissionHost};
    use crate::services::ScriptedSource;
    use std::time::Duration;
    use tokio::sync::broadcast;
    use uuid::Uuid;

    struct CountingHost {
        granted: bool,
        requests: parking_lot::Mutex<u32>,
    }

    impl PermissionHost for CountingHost {
        fn is_granted(&self, _capability: Capability) -> bool {
            self.granted
        }

        fn request(&self, _capabilities: &[Capability], _request_id: u32) {
            *self.requests.lock() += 1;
        }
    }

    fn fixture(host: Arc<CountingHost>) -> (SurveyScreen, Arc<SurveyStore>) {
        let store = Arc::new(SurveyStore::new());
        let services = Arc::new(ServiceController::spawn(
            store.clone(),
            ScriptedSource::<Beacon>::new(Vec::new()),
            ScriptedSource::<AccessPoint>::new(Vec::new()),
            Duration::from_millis(50),
            Duration::from_millis(50),
        ));
        let (notices, _) = broadcast::channel(8);
        let exporter = Arc::new(SnapshotExporter::new(std::env::temp_dir(), notices));
        let gate = PermissionGate::new(host);

        let screen = SurveyScreen::new(store.clone(), services, exporter, gate);
        (screen, store)
    }

    #[tokio::test]
    async fn test_activation_binds_then_asks_then_observes() {
        let host = Arc::new(CountingHost {
            granted: false,
            requests: parking_lot::Mutex::new(0),
        });
        let (mut screen, _store) = fixture(host.clone());

        let activation = screen.activate().unwrap();

        assert_eq!(activation.shell, Activation::Ready);
        assert!(screen.is_bound());
        assert!(screen.is_toolbar_ready());
        assert_eq!(activation.permission_request.unwrap().capabilities.len(), 4);
        assert_eq!(*host.requests.lock(), 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(screen.observer().beacon_label(), "0 beacon salvati in locale");
    }

    #[tokio::test]
    async fn test_zero_layout_skips_shell_but_not_the_rest() {
        let host = Arc::new(CountingHost {
            granted: true,
            requests: parking_lot::Mutex::new(0),
        });
        let (screen, _store) = fixture(host);
        let mut screen = screen.with_layout_id(LayoutId::NONE);

        let activation = screen.activate().unwrap();

        assert_eq!(activation.shell, Activation::Skipped);
        assert!(!screen.is_bound());
        assert!(activation.permission_request.is_none());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(screen.observer().ap_label(), "0 ap salvati in locale");
    }

    #[tokio::test]
    async fn test_deactivate_releases_subscriptions() {
        let host = Arc::new(CountingHost {
            granted: true,
            requests: parking_lot::Mutex::new(0),
        });
        let (mut screen, store) = fixture(host);

        screen.activate().unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        screen.deactivate();
        tokio::time::sleep(Duration::from_millis(20)).await;

        store.insert_beacons(vec![Beacon::new(Uuid::new_v4(), 1, 1, -60)]);
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(screen.observer().beacon_snapshot().is_empty());
    }
}
