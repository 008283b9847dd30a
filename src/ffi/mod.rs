//! FFI bindings for host platforms
//!
//! Exposes the SDK to Android hosts over JNI. Data crosses the boundary as
//! JSON; async work runs on a dedicated runtime owned by this module.

pub mod android;
pub mod runtime;
pub mod types;

pub use types::*;
