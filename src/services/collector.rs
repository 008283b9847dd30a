//! Collection loop shared by the beacon and WiFi services
//!
//! Each service runs this loop on its own task. The loop owns its source and
//! reacts to one-way action signals; callers never wait on it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::services::source::SignalSource;
use crate::services::{ServiceAction, ServiceKind};
use crate::store::SurveyStore;

/// Drive one collection service until its action channel closes
pub(crate) async fn run_collector<S>(
    kind: ServiceKind,
    sample_interval: Duration,
    store: Arc<SurveyStore>,
    mut source: S,
    mut actions: mpsc::UnboundedReceiver<ServiceAction>,
    insert: fn(&SurveyStore, Vec<S::Record>),
) where
    S: SignalSource,
{
    let mut sampling = false;
    let mut ticker = tokio::time::interval(sample_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::debug!("{} service ready", kind.as_str());

    loop {
        tokio::select! {
            // Action signals take priority over sampling ticks
            biased;

            action = actions.recv() => match action {
                Some(ServiceAction::Start) if !sampling => {
                    tracing::info!("Starting {} collection", kind.as_str());
                    sampling = true;
                    ticker.reset();
                }
                Some(ServiceAction::Stop) if sampling => {
                    tracing::info!("Stopping {} collection", kind.as_str());
                    sampling = false;
                }
                Some(_) => {} // Redundant signal, already in that state
                None => break,
            },

            _ = ticker.tick(), if sampling => {
                let batch = source.sample().await;
                if !batch.is_empty() {
                    tracing::debug!("{} service sampled {} records", kind.as_str(), batch.len());
                    insert(&store, batch);
                    if let Err(e) = store.save_if_needed().await {
                        tracing::warn!("Autosave failed: {}", e);
                    }
                }
            }
        }
    }

    tracing::debug!("{} service shut down", kind.as_str());
}
