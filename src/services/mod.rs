//! Background collection services
//!
//! Two long-lived services sample radio sources and feed the survey store:
//! one for BLE beacons, one for WiFi access points. Callers steer them through
//! one-way action signals; a signal to a stopped service is dropped, never an
//! error.

pub mod collector;
pub mod source;

pub use source::{ScriptedSource, SignalSource, SimulatedBeaconField, SimulatedWifiNeighborhood};

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::{AccessPoint, Beacon};
use crate::store::SurveyStore;

/// Control signal accepted by a collection service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    /// Begin periodic sampling
    Start,
    /// Pause sampling, keeping the service alive
    Stop,
}

/// Which collection service a handle or log line refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Beacon,
    Wifi,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Beacon => "beacon",
            ServiceKind::Wifi => "wifi",
        }
    }
}

/// Cheap, cloneable handle for steering one collection service
#[derive(Clone)]
pub struct ServiceHandle {
    kind: ServiceKind,
    tx: mpsc::UnboundedSender<ServiceAction>,
}

impl ServiceHandle {
    /// Send an action signal without waiting for the service to act on it
    pub fn dispatch(&self, action: ServiceAction) {
        if self.tx.send(action).is_err() {
            tracing::debug!(
                "{} service is gone, dropping {:?} signal",
                self.kind.as_str(),
                action
            );
        }
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }
}

/// Owns both collection services and their background tasks
pub struct ServiceController {
    beacon: ServiceHandle,
    wifi: ServiceHandle,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ServiceController {
    /// Spawn the beacon and WiFi services against the given store
    pub fn spawn<B, W>(
        store: Arc<SurveyStore>,
        beacon_source: B,
        wifi_source: W,
        beacon_interval: Duration,
        wifi_interval: Duration,
    ) -> Self
    where
        B: SignalSource<Record = Beacon> + 'static,
        W: SignalSource<Record = AccessPoint> + 'static,
    {
        let (beacon_tx, beacon_rx) = mpsc::unbounded_channel();
        let (wifi_tx, wifi_rx) = mpsc::unbounded_channel();

        let beacon_task = tokio::spawn(collector::run_collector(
            ServiceKind::Beacon,
            beacon_interval,
            store.clone(),
            beacon_source,
            beacon_rx,
            SurveyStore::insert_beacons,
        ));
        let wifi_task = tokio::spawn(collector::run_collector(
            ServiceKind::Wifi,
            wifi_interval,
            store,
            wifi_source,
            wifi_rx,
            SurveyStore::insert_access_points,
        ));

        Self {
            beacon: ServiceHandle {
                kind: ServiceKind::Beacon,
                tx: beacon_tx,
            },
            wifi: ServiceHandle {
                kind: ServiceKind::Wifi,
                tx: wifi_tx,
            },
            tasks: Mutex::new(vec![beacon_task, wifi_task]),
        }
    }

    /// Start both services, beacon first
    pub fn start_collection(&self) {
        self.beacon.dispatch(ServiceAction::Start);
        self.wifi.dispatch(ServiceAction::Start);
    }

    /// Stop both services, beacon first
    pub fn stop_collection(&self) {
        self.beacon.dispatch(ServiceAction::Stop);
        self.wifi.dispatch(ServiceAction::Stop);
    }

    /// Handle for the beacon service
    pub fn beacon(&self) -> ServiceHandle {
        self.beacon.clone()
    }

    /// Handle for the WiFi service
    pub fn wifi(&self) -> ServiceHandle {
        self.wifi.clone()
    }

    /// Abort both service tasks
    pub fn shutdown(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

impl Drop for ServiceController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Beacon;
    use std::time::Duration;
    use uuid::Uuid;

    fn beacon(minor: u16) -> Beacon {
        Beacon::new(Uuid::new_v4(), 1, minor, -60)
    }

    fn access_point(i: u8) -> AccessPoint {
        AccessPoint::new(
            format!("net-{:02}", i),
            format!("aa:bb:cc:dd:ee:{:02x}", i),
            -45,
            2_412,
        )
    }

    fn controller_with_script(
        beacons: Vec<Vec<Beacon>>,
        aps: Vec<Vec<crate::models::AccessPoint>>,
    ) -> (ServiceController, Arc<SurveyStore>) {
        let store = Arc::new(SurveyStore::new());
        let controller = ServiceController::spawn(
            store.clone(),
            ScriptedSource::new(beacons),
            ScriptedSource::new(aps),
            Duration::from_millis(10),
            Duration::from_millis(10),
        );
        (controller, store)
    }

    #[tokio::test]
    async fn test_started_service_feeds_the_store() {
        let (controller, store) =
            controller_with_script(vec![vec![beacon(1)], vec![beacon(2)]], Vec::new());
        let mut updates = store.beacons().subscribe();

        controller.start_collection();

        tokio::time::timeout(Duration::from_secs(2), async {
            while store.beacons().len() < 2 {
                updates.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        assert_eq!(store.beacons().len(), 2);
    }

    #[tokio::test]
    async fn test_stop_halts_sampling() {
        let batches = (0..50).map(|i| vec![beacon(i)]).collect();
        let (controller, store) = controller_with_script(batches, Vec::new());
        let mut updates = store.beacons().subscribe();

        controller.start_collection();
        tokio::time::timeout(Duration::from_secs(2), async {
            while store.beacons().is_empty() {
                updates.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        controller.stop_collection();
        tokio::time::sleep(Duration::from_millis(30)).await;
        let settled = store.beacons().len();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(store.beacons().len(), settled);
    }

    #[tokio::test]
    async fn test_dispatch_after_shutdown_is_dropped() {
        let (controller, _store) = controller_with_script(Vec::new(), Vec::new());

        controller.shutdown();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The services are gone; signals must vanish without panicking
        controller.start_collection();
        controller.stop_collection();
    }

    #[tokio::test]
    async fn test_redundant_start_is_harmless() {
        let (controller, store) = controller_with_script(vec![vec![beacon(1)]], Vec::new());
        let mut updates = store.beacons().subscribe();

        controller.start_collection();
        controller.start_collection();

        tokio::time::timeout(Duration::from_secs(2), async {
            while store.beacons().is_empty() {
                updates.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        assert_eq!(store.beacons().len(), 1);
    }

    #[tokio::test]
    async fn test_per_service_handles_steer_independently() {
        let (controller, store) =
            controller_with_script(vec![vec![beacon(1)]], vec![vec![access_point(1)]]);

        let beacon_handle = controller.beacon();
        assert_eq!(beacon_handle.kind(), ServiceKind::Beacon);
        assert_eq!(controller.wifi().kind(), ServiceKind::Wifi);

        // Start only the beacon service through its own handle
        beacon_handle.dispatch(ServiceAction::Start);

        let mut updates = store.beacons().subscribe();
        tokio::time::timeout(Duration::from_secs(2), async {
            while store.beacons().is_empty() {
                updates.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        // The WiFi service never saw a start signal and stays idle
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(store.access_points().is_empty());
    }
}
