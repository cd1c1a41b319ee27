//! FFI bindings for the Neuromotion engine
//!
//! This module provides C-compatible functions for embedding the engine in
//! host applications. All functions use C strings (null-terminated) and
//! return allocated memory that must be freed by the caller using
//! `neuromotion_free_string` (strings) or `neuromotion_engine_free`
//! (engine handles).

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::engine::{EngineConfig, RepEngine};
use crate::plan::ExercisePlan;
use crate::types::FrameInput;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Engine lifecycle
// ============================================================================

/// Create an engine from a plan JSON array with default tuning.
///
/// Pass NULL as `plan_json` to use the built-in rehabilitation plan.
///
/// # Safety
/// - `plan_json` must be NULL or a valid null-terminated C string.
/// - Returns an opaque engine handle that must be freed with
///   `neuromotion_engine_free`.
/// - Returns NULL on error; call `neuromotion_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn neuromotion_engine_new(plan_json: *const c_char) -> *mut RepEngine {
    neuromotion_engine_new_with_config(plan_json, ptr::null())
}

/// Create an engine from a plan JSON array and a configuration JSON object.
///
/// Pass NULL for either argument to use the built-in plan or default
/// tuning respectively.
///
/// # Safety
/// - `plan_json` and `config_json` must each be NULL or a valid
///   null-terminated C string.
/// - Returns an opaque engine handle that must be freed with
///   `neuromotion_engine_free`.
/// - Returns NULL on error; call `neuromotion_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn neuromotion_engine_new_with_config(
    plan_json: *const c_char,
    config_json: *const c_char,
) -> *mut RepEngine {
    clear_last_error();

    let plan = if plan_json.is_null() {
        ExercisePlan::default_rehab()
    } else {
        let Some(json) = cstr_to_string(plan_json) else {
            set_last_error("Invalid plan string pointer");
            return ptr::null_mut();
        };
        match ExercisePlan::from_json(&json) {
            Ok(plan) => plan,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    let config = if config_json.is_null() {
        EngineConfig::default()
    } else {
        let Some(json) = cstr_to_string(config_json) else {
            set_last_error("Invalid config string pointer");
            return ptr::null_mut();
        };
        match EngineConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    Box::into_raw(Box::new(RepEngine::with_config(plan, config)))
}

/// Free an engine handle.
///
/// # Safety
/// - `engine` must be a handle returned by one of the constructors, or
///   NULL (a no-op).
/// - The handle must not be used after this call.
#[no_mangle]
pub unsafe extern "C" fn neuromotion_engine_free(engine: *mut RepEngine) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

// ============================================================================
// Per-frame API
// ============================================================================

/// Feed one landmark frame (JSON) to the engine and return the frame
/// report as JSON.
///
/// # Safety
/// - `engine` must be a valid handle; `frame_json` a valid null-terminated
///   C string.
/// - Returns a newly allocated string that must be freed with
///   `neuromotion_free_string`.
/// - Returns NULL on error; call `neuromotion_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn neuromotion_engine_observe(
    engine: *mut RepEngine,
    frame_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(engine) = engine.as_mut() else {
        set_last_error("Invalid engine pointer");
        return ptr::null_mut();
    };

    let Some(json) = cstr_to_string(frame_json) else {
        set_last_error("Invalid frame string pointer");
        return ptr::null_mut();
    };

    let frame: FrameInput = match serde_json::from_str(&json) {
        Ok(frame) => frame,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let report = engine.observe(&frame);
    match serde_json::to_string(&report) {
        Ok(report_json) => string_to_cstr(&report_json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Reset the engine: clears all detector, calibration, and progression
/// state. The plan configuration is kept.
///
/// # Safety
/// - `engine` must be a valid handle or NULL (a no-op).
#[no_mangle]
pub unsafe extern "C" fn neuromotion_engine_reset(engine: *mut RepEngine) {
    if let Some(engine) = engine.as_mut() {
        engine.reset();
    }
}

/// Return the session summary as JSON.
///
/// # Safety
/// - `engine` must be a valid handle.
/// - Returns a newly allocated string that must be freed with
///   `neuromotion_free_string`.
/// - Returns NULL on error; call `neuromotion_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn neuromotion_engine_summary(engine: *const RepEngine) -> *mut c_char {
    clear_last_error();

    let Some(engine) = engine.as_ref() else {
        set_last_error("Invalid engine pointer");
        return ptr::null_mut();
    };

    match engine.summary_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Error handling and memory management
// ============================================================================

/// Get the last error message, or NULL if none.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with
///   `neuromotion_free_string`.
#[no_mangle]
pub unsafe extern "C" fn neuromotion_last_error() -> *mut c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(msg) => string_to_cstr(msg.to_str().unwrap_or("Invalid error message")),
        None => ptr::null_mut(),
    })
}

/// Free a string returned by this library.
///
/// # Safety
/// - `s` must be a string returned by a `neuromotion_*` function, or NULL
///   (a no-op).
#[no_mangle]
pub unsafe extern "C" fn neuromotion_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cstr(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    #[test]
    fn test_engine_round_trip() {
        unsafe {
            let engine = neuromotion_engine_new(ptr::null());
            assert!(!engine.is_null());

            let frame = cstr("{}");
            let report_ptr = neuromotion_engine_observe(engine, frame.as_ptr());
            assert!(!report_ptr.is_null());

            let report = CStr::from_ptr(report_ptr).to_str().unwrap();
            let parsed: serde_json::Value = serde_json::from_str(report).unwrap();
            assert_eq!(parsed["exercise_index"], 0);
            assert_eq!(parsed["rep_accepted"], false);

            neuromotion_free_string(report_ptr);
            neuromotion_engine_free(engine);
        }
    }

    #[test]
    fn test_invalid_plan_sets_last_error() {
        unsafe {
            let plan = cstr(r#"[{"name":"Mouth Open - Close","kind":{"family":"mouth_open_close"},"target_repetitions":0}]"#);
            let engine = neuromotion_engine_new(plan.as_ptr());
            assert!(engine.is_null());

            let err_ptr = neuromotion_last_error();
            assert!(!err_ptr.is_null());
            let msg = CStr::from_ptr(err_ptr).to_str().unwrap();
            assert!(msg.contains("zero repetition target"));
            neuromotion_free_string(err_ptr);
        }
    }

    #[test]
    fn test_summary_json() {
        unsafe {
            let engine = neuromotion_engine_new(ptr::null());
            let summary_ptr = neuromotion_engine_summary(engine);
            assert!(!summary_ptr.is_null());

            let summary = CStr::from_ptr(summary_ptr).to_str().unwrap();
            let parsed: serde_json::Value = serde_json::from_str(summary).unwrap();
            assert_eq!(parsed["producer"]["name"], "neuromotion");
            assert_eq!(parsed["plan_complete"], false);

            neuromotion_free_string(summary_ptr);
            neuromotion_engine_free(engine);
        }
    }
}
