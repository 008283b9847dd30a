//! Permission gate guarding the survey capabilities
//!
//! Checks the four runtime capabilities the collection flow depends on and
//! issues at most one batched request per pass for whatever is missing. Grant
//! results arrive later through the host's own callback channel and are not
//! awaited here.

use std::sync::Arc;

/// Runtime capabilities required by the survey flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    CoarseLocation,
    WriteExternalStorage,
    ChangeWifiState,
    AccessWifiState,
}

impl Capability {
    /// Every gated capability, in the order requests are issued
    pub const ALL: [Capability; 4] = [
        Capability::CoarseLocation,
        Capability::WriteExternalStorage,
        Capability::ChangeWifiState,
        Capability::AccessWifiState,
    ];

    /// Stable name used in logs and across the FFI boundary
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CoarseLocation => "coarse_location",
            Capability::WriteExternalStorage => "write_external_storage",
            Capability::ChangeWifiState => "change_wifi_state",
            Capability::AccessWifiState => "access_wifi_state",
        }
    }
}

/// Host-side permission surface
///
/// The embedding platform answers grant checks and renders the actual prompt.
pub trait PermissionHost: Send + Sync {
    /// Whether the capability is currently granted
    fn is_granted(&self, capability: Capability) -> bool;

    /// Prompt the user for the given capabilities as one batched request
    fn request(&self, capabilities: &[Capability], request_id: u32);
}

/// A batched request issued to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    /// Identifier the host echoes back with the prompt result
    pub id: u32,
    /// Requested capabilities, in fixed enumeration order
    pub capabilities: Vec<Capability>,
}

/// Checks grant state and issues batched permission requests
pub struct PermissionGate {
    host: Arc<dyn PermissionHost>,
    request_id: u32,
}

impl PermissionGate {
    /// Create a gate with the default request identifier
    pub fn new(host: Arc<dyn PermissionHost>) -> Self {
        Self { host, request_id: 0 }
    }

    /// Create a gate tagging its requests with `request_id`
    pub fn with_request_id(host: Arc<dyn PermissionHost>, request_id: u32) -> Self {
        Self { host, request_id }
    }

    /// Request whatever capabilities are still ungranted
    ///
    /// Returns the issued request, or `None` when everything is already
    /// granted and no prompt is needed.
    pub fn ask_for_permissions(&self) -> Option<PermissionRequest> {
        let missing: Vec<Capability> = Capability::ALL
            .iter()
            .copied()
            .filter(|capability| !self.host.is_granted(*capability))
            .collect();

        if missing.is_empty() {
            tracing::debug!("All capabilities granted, no request issued");
            return None;
        }

        tracing::info!(
            "Requesting {} missing capabilities: {:?}",
            missing.len(),
            missing
        );
        self.host.request(&missing, self.request_id);

        Some(PermissionRequest {
            id: self.request_id,
            capabilities: missing,
        })
    }
}
