//! RadioLog SDK demo
//!
//! Runs a complete survey session against the simulated radio sources:
//! screen activation, a collection window, export, cleanup and a few live
//! rounds with the observer labels.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use radiolog::config::SurveyConfig;
use radiolog::permissions::{Capability, PermissionHost};
use radiolog::RadioLogSDK;

/// Demo host: pretends the OS granted everything except external storage
struct DemoHost;

impl PermissionHost for DemoHost {
    fn is_granted(&self, capability: Capability) -> bool {
        capability != Capability::WriteExternalStorage
    }

    fn request(&self, capabilities: &[Capability], request_id: u32) {
        tracing::info!("🪪 OS prompt (request {}): {:?}", request_id, capabilities);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    tracing::info!("🚀 Starting RadioLog SDK demo");

    #[cfg(feature = "config-file")]
    let config = SurveyConfig::load()?;
    #[cfg(not(feature = "config-file"))]
    let config = SurveyConfig::default();

    let sdk = RadioLogSDK::with_config(config, Arc::new(DemoHost)).await?;

    // Relay user-facing notices into the log
    let mut notices = sdk.subscribe_notices();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            tracing::info!("🔔 {}", notice);
        }
    });

    // Example 1: Bring up the survey screen
    tracing::info!("📋 Example 1: Activating the survey screen");
    let mut screen = sdk.new_screen();
    match screen.activate() {
        Ok(activation) => tracing::info!("✅ Screen active: {:?}", activation.shell),
        Err(e) => tracing::error!("Screen activation failed: {}", e),
    }

    // Example 2: Collect for a short window
    tracing::info!("📡 Example 2: Collecting for 5 seconds");
    screen.start_collection();
    tokio::time::sleep(Duration::from_secs(5)).await;
    screen.stop_collection();
    tracing::info!("{}", screen.observer().beacon_label());
    tracing::info!("{}", screen.observer().ap_label());

    // Example 3: Export what the screen observed
    tracing::info!("💾 Example 3: Exporting the collections");
    match screen.export_data().await {
        Ok(report) => tracing::info!(
            "✅ Export done: {} files written, {} failed",
            report.written.len(),
            report.failed.len()
        ),
        Err(e) => tracing::error!("Export task failed: {}", e),
    }

    // Example 4: Wipe the collections
    tracing::info!("🧹 Example 4: Cleaning the collections");
    screen.clean_data().await?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    tracing::info!("{}", screen.observer().beacon_label());
    tracing::info!("{}", screen.observer().ap_label());

    // A few live rounds with the observer labels
    screen.start_collection();
    for round in 1..=4 {
        tokio::time::sleep(Duration::from_secs(5)).await;
        tracing::info!(
            "Round {}: {} / {}",
            round,
            screen.observer().beacon_label(),
            screen.observer().ap_label()
        );
    }
    screen.stop_collection();

    screen.deactivate();
    sdk.shutdown().await?;

    tracing::info!("🎉 RadioLog SDK demo completed");
    Ok(())
}
