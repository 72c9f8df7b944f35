//! FFI layer for embedding the engine in a non-Rust host.
//!
//! This module provides C-compatible functions for webview or mobile shells.
//! All data crosses the boundary as JSON strings.
//!
//! # Memory Management
//!
//! - Strings returned by `tabula_*` functions are allocated by Rust
//! - Caller must free them with `tabula_string_free`
//! - Engine pointers must be freed with `tabula_engine_free`
//!
//! # Error Handling
//!
//! Functions return JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>"}` on failure

use crate::{
    Command, EngineSnapshot, ExportFormat, FieldDescriptor, Fields, SnapshotMetadata,
    TabularEngine,
};
use std::ffi::{c_char, CStr, CString};
use std::ptr;

/// Result wrapper for FFI responses.
#[derive(serde::Serialize)]
#[serde(untagged)]
enum FfiResult<T: serde::Serialize> {
    Ok { ok: T },
    Err { error: String },
}

impl<T: serde::Serialize> FfiResult<T> {
    fn ok(value: T) -> Self {
        FfiResult::Ok { ok: value }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {}"}}"#, e))
    }
}

fn error_json(message: impl Into<String>) -> *mut c_char {
    to_c_string(
        FfiResult::<()>::Err {
            error: message.into(),
        }
        .to_json(),
    )
}

/// Convert a Rust string to a C string pointer.
/// Caller must free with `tabula_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => CString::from(c"{\"error\":\"string contained null bytes\"}").into_raw(),
    }
}

/// Convert a C string pointer to a Rust string.
/// Returns None if pointer is null or invalid UTF-8.
unsafe fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

// ============================================================================
// Engine Lifecycle
// ============================================================================

/// Create a new engine.
///
/// # Arguments
/// - `name`: Table name, used as the export file stem
/// - `fields_json`: JSON array of FieldDescriptor
/// - `records_json`: JSON array of record objects, or null for an empty table
///
/// # Returns
/// Pointer to TabularEngine, or null on failure.
///
/// # Safety
/// - `name` and `fields_json` must be valid null-terminated C strings or null
/// - `records_json` must be a valid null-terminated C string or null
/// - Caller must free the returned pointer with `tabula_engine_free`
#[no_mangle]
pub unsafe extern "C" fn tabula_engine_new(
    name: *const c_char,
    fields_json: *const c_char,
    records_json: *const c_char,
) -> *mut TabularEngine {
    let name = match from_c_string(name) {
        Some(s) => s,
        None => return ptr::null_mut(),
    };

    let fields: Vec<FieldDescriptor> = match from_c_string(fields_json)
        .and_then(|s| serde_json::from_str(&s).ok())
    {
        Some(f) => f,
        None => return ptr::null_mut(),
    };

    let mut engine = TabularEngine::new(name, fields);

    if !records_json.is_null() {
        let rows: Vec<Fields> = match from_c_string(records_json)
            .and_then(|s| serde_json::from_str(&s).ok())
        {
            Some(r) => r,
            None => return ptr::null_mut(),
        };
        if engine.load_fields(rows).is_err() {
            return ptr::null_mut();
        }
    }

    Box::into_raw(Box::new(engine))
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer from `tabula_engine_new`
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn tabula_engine_free(engine: *mut TabularEngine) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Free a string allocated by the engine.
///
/// # Safety
/// - `s` must be a valid pointer from a `tabula_*` function
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn tabula_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ============================================================================
// Engine Operations
// ============================================================================

/// Execute a command.
///
/// # Arguments
/// - `command_json`: JSON string of Command, e.g. `{"type":"setPage","page":2}`
///
/// # Returns
/// JSON string: `{"ok": CommandOutcome}` or `{"error": "message"}`
///
/// # Safety
/// - `engine` must be a valid pointer from `tabula_engine_new` or null
/// - `command_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `tabula_string_free`
#[no_mangle]
pub unsafe extern "C" fn tabula_engine_execute(
    engine: *mut TabularEngine,
    command_json: *const c_char,
) -> *mut c_char {
    let engine = match engine.as_mut() {
        Some(e) => e,
        None => return error_json("null engine pointer"),
    };

    let command_str = match from_c_string(command_json) {
        Some(s) => s,
        None => return error_json("invalid command JSON"),
    };

    let command: Command = match serde_json::from_str(&command_str) {
        Ok(c) => c,
        Err(e) => return error_json(format!("parse error: {}", e)),
    };

    match engine.execute(command) {
        Ok(outcome) => to_c_string(FfiResult::ok(outcome).to_json()),
        Err(e) => error_json(e.to_string()),
    }
}

/// Get the current view.
///
/// # Returns
/// JSON string: `{"ok": View}` or `{"error": "message"}`
///
/// # Safety
/// - `engine` must be a valid pointer from `tabula_engine_new` or null
/// - Caller must free the returned string with `tabula_string_free`
#[no_mangle]
pub unsafe extern "C" fn tabula_engine_view(engine: *const TabularEngine) -> *mut c_char {
    let engine = match engine.as_ref() {
        Some(e) => e,
        None => return error_json("null engine pointer"),
    };

    to_c_string(FfiResult::ok(engine.view()).to_json())
}

/// Export the filtered view, ignoring pagination.
///
/// # Arguments
/// - `format`: `"csv"` or `"json"`
///
/// # Returns
/// JSON string: `{"ok": ExportPayload}` or `{"error": "message"}`
///
/// # Safety
/// - `engine` must be a valid pointer from `tabula_engine_new` or null
/// - `format` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `tabula_string_free`
#[no_mangle]
pub unsafe extern "C" fn tabula_engine_export(
    engine: *const TabularEngine,
    format: *const c_char,
) -> *mut c_char {
    let engine = match engine.as_ref() {
        Some(e) => e,
        None => return error_json("null engine pointer"),
    };

    let format: ExportFormat = match from_c_string(format).map(|s| s.parse()) {
        Some(Ok(f)) => f,
        Some(Err(e)) => return error_json(e.to_string()),
        None => return error_json("invalid format"),
    };

    match engine.export_view(format) {
        Ok(payload) => to_c_string(FfiResult::ok(payload).to_json()),
        Err(e) => error_json(e.to_string()),
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// Export engine state as a snapshot.
///
/// # Returns
/// JSON string: `{"ok": EngineSnapshot}` or `{"error": "message"}`
///
/// # Safety
/// - `engine` must be a valid pointer from `tabula_engine_new` or null
/// - Caller must free the returned string with `tabula_string_free`
#[no_mangle]
pub unsafe extern "C" fn tabula_engine_export_state(engine: *const TabularEngine) -> *mut c_char {
    let engine = match engine.as_ref() {
        Some(e) => e,
        None => return error_json("null engine pointer"),
    };

    to_c_string(FfiResult::ok(engine.export_state()).to_json())
}

/// Import state from a snapshot.
///
/// # Arguments
/// - `snapshot_json`: JSON string of EngineSnapshot
///
/// # Returns
/// JSON string: `{"ok": null}` or `{"error": "message"}`
///
/// # Safety
/// - `engine` must be a valid pointer from `tabula_engine_new` or null
/// - `snapshot_json` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `tabula_string_free`
#[no_mangle]
pub unsafe extern "C" fn tabula_engine_import_state(
    engine: *mut TabularEngine,
    snapshot_json: *const c_char,
) -> *mut c_char {
    let engine = match engine.as_mut() {
        Some(e) => e,
        None => return error_json("null engine pointer"),
    };

    let snapshot_str = match from_c_string(snapshot_json) {
        Some(s) => s,
        None => return error_json("invalid snapshot JSON"),
    };

    let result = EngineSnapshot::from_json(&snapshot_str).and_then(|s| engine.import_state(s));
    match result {
        Ok(()) => to_c_string(FfiResult::ok(()).to_json()),
        Err(e) => error_json(e.to_string()),
    }
}

/// Get snapshot metadata without the records.
///
/// # Returns
/// JSON string: `{"ok": SnapshotMetadata}` or `{"error": "message"}`
///
/// # Safety
/// - `engine` must be a valid pointer from `tabula_engine_new` or null
/// - Caller must free the returned string with `tabula_string_free`
#[no_mangle]
pub unsafe extern "C" fn tabula_engine_metadata(engine: *const TabularEngine) -> *mut c_char {
    let engine = match engine.as_ref() {
        Some(e) => e,
        None => return error_json("null engine pointer"),
    };

    let metadata = SnapshotMetadata::from(&engine.export_state());
    to_c_string(FfiResult::ok(metadata).to_json())
}

// ============================================================================
// Utility
// ============================================================================

/// Get the engine version.
///
/// # Returns
/// Static string pointer (do not free)
#[no_mangle]
pub extern "C" fn tabula_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

/// Get the snapshot format version.
#[no_mangle]
pub extern "C" fn tabula_snapshot_format_version() -> u32 {
    crate::SNAPSHOT_FORMAT_VERSION
}
