//! Android JNI interface
//!
//! This module provides the JNI bindings that Kotlin can call from Android.
//! All functions follow the JNI naming convention and handle marshalling
//! between Java types and Rust types.

use jni::objects::{JByteArray, JClass};
use jni::sys::{jlong, jstring};
use jni::JNIEnv;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use super::runtime;
use super::types::*;
use crate::config::SurveyConfig;
use crate::permissions::{Capability, PermissionHost};
use crate::RadioLogSDK;

// Global state for SDK instances
lazy_static::lazy_static! {
    static ref SDK_INSTANCES: Arc<Mutex<Vec<Arc<FfiInstance>>>> = Arc::new(Mutex::new(Vec::new()));
}

/// One SDK instance plus its notice subscription
struct FfiInstance {
    sdk: RadioLogSDK,
    notices: Mutex<tokio::sync::broadcast::Receiver<String>>,
}

/// Permission surface backed by the capability names the host handed over
struct FfiPermissionHost {
    granted: HashSet<String>,
}

impl PermissionHost for FfiPermissionHost {
    fn is_granted(&self, capability: Capability) -> bool {
        self.granted.contains(capability.as_str())
    }

    fn request(&self, capabilities: &[Capability], request_id: u32) {
        // The OS prompt belongs to the Kotlin side; just record the ask
        tracing::info!(
            "Permission request {} forwarded to host: {:?}",
            request_id,
            capabilities
        );
    }
}

// =============================================================================
// Initialization and lifecycle
// =============================================================================

/// Initialize the RadioLog SDK
/// Returns a handle (index) to the initialized SDK instance
#[no_mangle]
pub extern "C" fn Java_io_radiolog_sdk_RadioLogFFI_init(
    env: JNIEnv,
    _class: JClass,
    config_bytes: JByteArray,
) -> jlong {
    let result: Result<jlong, String> = (|| {
        // Initialize runtime if needed
        runtime::init_runtime().ok(); // Ignore if already initialized

        // Parse config
        let config_data: Vec<u8> = env
            .convert_byte_array(&config_bytes)
            .map_err(|e| format!("Failed to read config bytes: {}", e))?;

        let config: SdkConfig = serde_json::from_slice(&config_data)
            .map_err(|e| format!("Failed to parse config: {}", e))?;

        // Initialize logging if requested
        if config.enable_logging {
            let _ = tracing_subscriber::fmt()
                .with_max_level(parse_log_level(config.log_level.as_deref()))
                .try_init();
        }

        let mut survey_config = SurveyConfig::default();
        if let Some(export_root) = &config.export_root {
            survey_config.export_root = export_root.into();
        }
        survey_config.store_dir = config.store_dir.as_ref().map(Into::into);

        let host = Arc::new(FfiPermissionHost {
            granted: config.granted_capabilities.into_iter().collect(),
        });

        let sdk = runtime::block_on(RadioLogSDK::with_config(survey_config, host))
            .map_err(|e| format!("Failed to initialize SDK: {}", e))?;

        let notices = Mutex::new(sdk.subscribe_notices());
        let mut instances = SDK_INSTANCES.lock();
        instances.push(Arc::new(FfiInstance { sdk, notices }));
        let handle = (instances.len() - 1) as jlong;

        tracing::info!("✅ RadioLog SDK initialized with handle {}", handle);
        Ok(handle)
    })();

    match result {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("Failed to initialize SDK: {}", e);
            -1 // Error handle
        }
    }
}

/// Get SDK version
#[no_mangle]
pub extern "C" fn Java_io_radiolog_sdk_RadioLogFFI_version(
    env: JNIEnv,
    _class: JClass,
) -> jstring {
    let version = env!("CARGO_PKG_VERSION");
    env.new_string(version)
        .expect("Failed to create Java string")
        .into_raw()
}

/// Shutdown the SDK: stop collection and flush the store
#[no_mangle]
pub extern "C" fn Java_io_radiolog_sdk_RadioLogFFI_shutdown(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) {
    match get_instance(handle) {
        Ok(instance) => {
            if let Err(e) = runtime::block_on(instance.sdk.shutdown()) {
                tracing::error!("Shutdown failed: {}", e);
            }
            tracing::info!("🛑 Shut down SDK handle {}", handle);
        }
        Err(e) => tracing::error!("shutdown: {}", e),
    }
}

// =============================================================================
// Collection control
// =============================================================================

/// Start both collection services
#[no_mangle]
pub extern "C" fn Java_io_radiolog_sdk_RadioLogFFI_startCollection(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    let result = (|| {
        let instance = get_instance(handle)?;
        instance.sdk.start_collection();

        let response: FfiResult<()> = FfiResult::success(());
        serde_json::to_string(&response).map_err(|e| format!("Serialization error: {}", e))
    })();

    create_result_string(&mut env, result)
}

/// Stop both collection services
#[no_mangle]
pub extern "C" fn Java_io_radiolog_sdk_RadioLogFFI_stopCollection(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    let result = (|| {
        let instance = get_instance(handle)?;
        instance.sdk.stop_collection();

        let response: FfiResult<()> = FfiResult::success(());
        serde_json::to_string(&response).map_err(|e| format!("Serialization error: {}", e))
    })();

    create_result_string(&mut env, result)
}

// =============================================================================
// Data access
// =============================================================================

/// Number of beacons currently in the store, or -1 for a bad handle
#[no_mangle]
pub extern "C" fn Java_io_radiolog_sdk_RadioLogFFI_beaconCount(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jlong {
    match get_instance(handle) {
        Ok(instance) => instance.sdk.beacon_count() as jlong,
        Err(e) => {
            tracing::error!("beaconCount error: {}", e);
            -1
        }
    }
}

/// Number of access points currently in the store, or -1 for a bad handle
#[no_mangle]
pub extern "C" fn Java_io_radiolog_sdk_RadioLogFFI_apCount(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jlong {
    match get_instance(handle) {
        Ok(instance) => instance.sdk.ap_count() as jlong,
        Err(e) => {
            tracing::error!("apCount error: {}", e);
            -1
        }
    }
}

/// Export both collections and return what was written
#[no_mangle]
pub extern "C" fn Java_io_radiolog_sdk_RadioLogFFI_exportAll(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    let result = (|| {
        let instance = get_instance(handle)?;
        let report = runtime::block_on(instance.sdk.export_all());

        let summary = ExportSummary {
            written: report
                .written
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
            failed: report
                .failed
                .iter()
                .map(|failure| ExportFailureDto {
                    collection: failure.collection.to_string(),
                    reason: failure.reason.to_string(),
                })
                .collect(),
        };

        let response: FfiResult<ExportSummary> = FfiResult::success(summary);
        serde_json::to_string(&response).map_err(|e| format!("Serialization error: {}", e))
    })();

    create_result_string(&mut env, result)
}

/// Wipe both collections
#[no_mangle]
pub extern "C" fn Java_io_radiolog_sdk_RadioLogFFI_clearAll(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    let result = (|| {
        let instance = get_instance(handle)?;
        runtime::block_on(instance.sdk.clear_all())
            .map_err(|e| format!("Failed to clear collections: {}", e))?;

        let response: FfiResult<()> = FfiResult::success(());
        serde_json::to_string(&response).map_err(|e| format!("Serialization error: {}", e))
    })();

    create_result_string(&mut env, result)
}

/// Pop the next pending user-facing notice, if any
#[no_mangle]
pub extern "C" fn Java_io_radiolog_sdk_RadioLogFFI_nextNotice(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jstring {
    let result = (|| {
        let instance = get_instance(handle)?;
        let notice = instance.notices.lock().try_recv().ok();

        let response: FfiResult<Option<String>> = FfiResult::success(notice);
        serde_json::to_string(&response).map_err(|e| format!("Serialization error: {}", e))
    })();

    create_result_string(&mut env, result)
}

// =============================================================================
// Helper functions
// =============================================================================

fn get_instance(handle: jlong) -> Result<Arc<FfiInstance>, String> {
    let instances = SDK_INSTANCES.lock();
    if handle < 0 || handle as usize >= instances.len() {
        return Err(format!("Invalid handle: {}", handle));
    }
    Ok(instances[handle as usize].clone())
}

fn create_result_string(env: &mut JNIEnv, result: Result<String, String>) -> jstring {
    match result {
        Ok(json) => env
            .new_string(json)
            .expect("Failed to create Java string")
            .into_raw(),
        Err(e) => {
            let error_response: FfiResult<()> = FfiResult::error("ERR_INTERNAL", e);
            let error_json = serde_json::to_string(&error_response)
                .unwrap_or_else(|_| r#"{"ok":false,"code":"ERR_FATAL","message":"Serialization failed"}"#.to_string());
            env.new_string(error_json)
                .expect("Failed to create error string")
                .into_raw()
        }
    }
}

fn parse_log_level(level: Option<&str>) -> tracing::Level {
    match level {
        Some("trace") => tracing::Level::TRACE,
        Some("debug") => tracing::Level::DEBUG,
        Some("info") => tracing::Level::INFO,
        Some("warn") => tracing::Level::WARN,
        Some("error") => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
