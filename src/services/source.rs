//! Signal sources feeding the collection services
//!
//! Real radio scanning belongs to the host platform; the collectors only see
//! this sampling seam. The simulated sources make the SDK runnable end to end
//! without radio hardware, and the scripted source drives deterministic tests.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::models::{AccessPoint, Beacon};

/// A source of radio sightings polled by a collection service
#[async_trait]
pub trait SignalSource: Send {
    /// Record type this source produces
    type Record: Send + 'static;

    /// Sightings observed during one sampling pass
    ///
    /// An empty batch means nothing was in range; the collector skips it.
    async fn sample(&mut self) -> Vec<Self::Record>;
}

/// Simulated field of BLE beacons with jittered signal strength
pub struct SimulatedBeaconField {
    rng: StdRng,
    identities: Vec<(Uuid, u16, u16)>,
}

impl SimulatedBeaconField {
    /// Simulate `count` beacons sharing one proximity UUID
    pub fn new(count: u16) -> Self {
        Self::with_seed(count, rand::random())
    }

    /// Seeded variant for reproducible runs
    pub fn with_seed(count: u16, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut bytes = [0u8; 16];
        rng.fill(&mut bytes[..]);
        let group = uuid::Builder::from_random_bytes(bytes).into_uuid();

        let identities = (0..count).map(|minor| (group, 1u16, minor)).collect();
        Self { rng, identities }
    }
}

#[async_trait]
impl SignalSource for SimulatedBeaconField {
    type Record = Beacon;

    async fn sample(&mut self) -> Vec<Beacon> {
        let mut batch = Vec::new();
        for (proximity_uuid, major, minor) in &self.identities {
            // Not every beacon is audible on every pass
            if self.rng.gen_bool(0.8) {
                let rssi = self.rng.gen_range(-90..=-40);
                batch.push(Beacon::new(*proximity_uuid, *major, *minor, rssi));
            }
        }
        batch
    }
}

/// Simulated WiFi neighborhood with a fixed set of access points
pub struct SimulatedWifiNeighborhood {
    rng: StdRng,
    networks: Vec<(String, String, u32)>,
}

impl SimulatedWifiNeighborhood {
    /// Simulate `count` nearby networks
    pub fn new(count: u8) -> Self {
        Self::with_seed(count, rand::random())
    }

    /// Seeded variant for reproducible runs
    pub fn with_seed(count: u8, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let networks = (0..count)
            .map(|i| {
                let octet: u8 = rng.gen();
                let ssid = format!("net-{:02}", i);
                let bssid = format!("aa:bb:cc:dd:{:02x}:{:02x}", i, octet);
                let frequency = if rng.gen_bool(0.5) { 2_412 } else { 5_180 };
                (ssid, bssid, frequency)
            })
            .collect();
        Self { rng, networks }
    }
}

#[async_trait]
impl SignalSource for SimulatedWifiNeighborhood {
    type Record = AccessPoint;

    async fn sample(&mut self) -> Vec<AccessPoint> {
        let mut batch = Vec::new();
        for (ssid, bssid, frequency) in &self.networks {
            if self.rng.gen_bool(0.9) {
                let rssi = self.rng.gen_range(-85..=-30);
                batch.push(AccessPoint::new(ssid.clone(), bssid.clone(), rssi, *frequency));
            }
        }
        batch
    }
}

/// Replays predefined batches, one per sampling pass
///
/// Intended for tests: the batches come out in order, then the source goes
/// quiet.
pub struct ScriptedSource<T> {
    batches: VecDeque<Vec<T>>,
}

impl<T> ScriptedSource<T> {
    pub fn new(batches: Vec<Vec<T>>) -> Self {
        Self {
            batches: batches.into(),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> SignalSource for ScriptedSource<T> {
    type Record = T;

    async fn sample(&mut self) -> Vec<T> {
        self.batches.pop_front().unwrap_or_default()
    }
}
