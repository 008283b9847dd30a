//! FFI data types and JSON schemas (v1)
//!
//! All data exchanged across the FFI boundary uses JSON serialization for
//! simplicity. Each message includes a `version` field for future
//! compatibility.

use serde::{Deserialize, Serialize};

/// Version 1 of the FFI protocol
pub const FFI_VERSION: u32 = 1;

// ============================================================================
// Result envelope
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FfiResult<T> {
    Ok { ok: bool, data: T },
    Err { ok: bool, code: String, message: String },
}

impl<T> FfiResult<T> {
    pub fn success(data: T) -> Self {
        FfiResult::Ok { ok: true, data }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        FfiResult::Err {
            ok: false,
            code: code.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    pub version: u32,
    /// Directory under which the export folder is created
    pub export_root: Option<String>,
    /// Directory for persisted collections; in-memory only when unset
    pub store_dir: Option<String>,
    pub enable_logging: bool,
    pub log_level: Option<String>,
    /// Capability names the host has already granted, e.g. "coarse_location"
    pub granted_capabilities: Vec<String>,
}

// ============================================================================
// Export
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    pub written: Vec<String>,
    pub failed: Vec<ExportFailureDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFailureDto {
    pub collection: String,
    pub reason: String,
}
