//! Live view over the survey store
//!
//! The observer mirrors each collection into a cell the UI layer can read at
//! any time, together with a presentation label. Subscriptions deliver the
//! current snapshot immediately, so a freshly attached observer is never
//! blank. Each subscription is a task handle; aborting the handle is the
//! guaranteed teardown.

use std::sync::Arc;

use futures::StreamExt;
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

use crate::models::{AccessPoint, Beacon};
use crate::store::{Snapshot, SurveyStore};

/// Cloneable read-side view of the survey collections
#[derive(Clone, Default)]
pub struct DataObserver {
    inner: Arc<Cells>,
}

#[derive(Default)]
struct Cells {
    beacons: RwLock<Snapshot<Beacon>>,
    access_points: RwLock<Snapshot<AccessPoint>>,
    beacon_label: RwLock<String>,
    ap_label: RwLock<String>,
}

impl DataObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the beacon collection until the returned handle is aborted
    pub fn observe_beacons(&self, store: &SurveyStore) -> JoinHandle<()> {
        let cells = self.inner.clone();
        let mut updates = WatchStream::new(store.beacons().subscribe());

        tokio::spawn(async move {
            while let Some(snapshot) = updates.next().await {
                let label = format!("{} beacon salvati in locale", snapshot.len());
                tracing::debug!("{}", label);
                *cells.beacons.write() = snapshot;
                *cells.beacon_label.write() = label;
            }
        })
    }

    /// Track the access point collection until the returned handle is aborted
    pub fn observe_access_points(&self, store: &SurveyStore) -> JoinHandle<()> {
        let cells = self.inner.clone();
        let mut updates = WatchStream::new(store.access_points().subscribe());

        tokio::spawn(async move {
            while let Some(snapshot) = updates.next().await {
                let label = format!("{} ap salvati in locale", snapshot.len());
                tracing::debug!("{}", label);
                *cells.access_points.write() = snapshot;
                *cells.ap_label.write() = label;
            }
        })
    }

    /// Last beacon snapshot seen by the subscription
    pub fn beacon_snapshot(&self) -> Snapshot<Beacon> {
        self.inner.beacons.read().clone()
    }

    /// Last access point snapshot seen by the subscription
    pub fn ap_snapshot(&self) -> Snapshot<AccessPoint> {
        self.inner.access_points.read().clone()
    }

    /// Presentation label for the beacon count
    pub fn beacon_label(&self) -> String {
        self.inner.beacon_label.read().clone()
    }

    /// Presentation label for the access point count
    pub fn ap_label(&self) -> String {
        self.inner.ap_label.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uuid::Uuid;

    fn beacon(minor: u16) -> Beacon {
        Beacon::new(Uuid::new_v4(), 1, minor, -55)
    }

    fn access_point(i: u8) -> AccessPoint {
        AccessPoint::new(format!("net-{}", i), format!("aa:bb:cc:dd:ee:{:02x}", i), -40, 2_412)
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_delivered_immediately() {
        let store = SurveyStore::new();
        store.insert_beacons(vec![beacon(1)]);

        let observer = DataObserver::new();
        let subscription = observer.observe_beacons(&store);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(observer.beacon_snapshot().len(), 1);
        assert_eq!(observer.beacon_label(), "1 beacon salvati in locale");
        subscription.abort();
    }

    #[tokio::test]
    async fn test_labels_track_updates() {
        let store = SurveyStore::new();
        let observer = DataObserver::new();
        let beacons = observer.observe_beacons(&store);
        let aps = observer.observe_access_points(&store);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(observer.beacon_label(), "0 beacon salvati in locale");
        assert_eq!(observer.ap_label(), "0 ap salvati in locale");

        store.insert_beacons(vec![beacon(1), beacon(2)]);
        store.insert_access_points(vec![access_point(1)]);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(observer.beacon_label(), "2 beacon salvati in locale");
        assert_eq!(observer.ap_label(), "1 ap salvati in locale");
        beacons.abort();
        aps.abort();
    }

    #[tokio::test]
    async fn test_aborted_subscription_stops_tracking() {
        let store = SurveyStore::new();
        let observer = DataObserver::new();
        let subscription = observer.observe_beacons(&store);
        tokio::time::sleep(Duration::from_millis(20)).await;

        subscription.abort();
        tokio::time::sleep(Duration::from_millis(20)).await;

        store.insert_beacons(vec![beacon(1)]);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(observer.beacon_snapshot().is_empty());
    }
}
