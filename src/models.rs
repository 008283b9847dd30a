//! Sighting records collected by the survey services
//!
//! Both record types are plain serde structs: the store persists them as JSON
//! and the exporter writes them out unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Collection name for beacon sightings, used in export file names
pub const BEACON_COLLECTION: &str = "beacon";

/// Collection name for access point sightings, used in export file names
pub const AP_COLLECTION: &str = "ap";

/// A single BLE beacon sighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beacon {
    /// Proximity UUID advertised by the beacon
    pub proximity_uuid: Uuid,
    /// Beacon group identifier
    pub major: u16,
    /// Beacon identifier within the group
    pub minor: u16,
    /// Received signal strength in dBm
    pub rssi: i16,
    /// When the sighting was recorded
    pub seen_at: DateTime<Utc>,
}

impl Beacon {
    /// Create a sighting stamped with the current time
    pub fn new(proximity_uuid: Uuid, major: u16, minor: u16, rssi: i16) -> Self {
        Self {
            proximity_uuid,
            major,
            minor,
            rssi,
            seen_at: Utc::now(),
        }
    }
}

/// A single WiFi access point sighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPoint {
    /// Network name
    pub ssid: String,
    /// Hardware address of the access point
    pub bssid: String,
    /// Received signal strength in dBm
    pub rssi: i16,
    /// Channel frequency in MHz
    pub frequency: u32,
    /// When the sighting was recorded
    pub seen_at: DateTime<Utc>,
}

impl AccessPoint {
    /// Create a sighting stamped with the current time
    pub fn new(ssid: impl Into<String>, bssid: impl Into<String>, rssi: i16, frequency: u32) -> Self {
        Self {
            ssid: ssid.into(),
            bssid: bssid.into(),
            rssi,
            frequency,
            seen_at: Utc::now(),
        }
    }
}
