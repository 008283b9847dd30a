//! Utility functions for the radiolog SDK

/// Common utility functions
pub mod common {
    use std::time::{SystemTime, UNIX_EPOCH};

    /// Milliseconds since the Unix epoch, as used in export file names
    pub fn epoch_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64
    }

    /// Seconds since the Unix epoch
    pub fn epoch_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }
}
