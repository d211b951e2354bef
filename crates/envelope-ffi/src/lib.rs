//! envelope-ffi: C-ABI exports for building, encoding and decoding envelope
//! containers from C, C++, .NET and Python hosts.
//!
//! Every function returns an [`EnvResult`] (or a null handle) and records a
//! message retrievable with [`env_last_error`] on the calling thread.

mod args;
mod codec;
mod container;
mod error;
mod schema;
mod types;

use std::panic::AssertUnwindSafe;

pub use codec::{env_decode, env_decode_with, env_detect_format, env_encode};
pub use container::{
    env_container_add, env_container_add_container, env_container_free, env_container_get,
    env_container_len, env_container_new, env_container_set_header, env_string_free,
};
pub use schema::env_schema_validate;
pub use types::{
    EnvContainerHandle, EnvResult, ENV_ERR_DUPLICATE_CYCLE, ENV_ERR_INTERNAL,
    ENV_ERR_INVALID_ARGUMENT, ENV_ERR_INVALID_BASE64, ENV_ERR_INVALID_JSON, ENV_ERR_INVALID_UTF8,
    ENV_ERR_MALFORMED_ENTRY, ENV_ERR_MALFORMED_HEADER, ENV_ERR_MAX_DEPTH_EXCEEDED,
    ENV_ERR_NOT_FOUND, ENV_ERR_SCHEMA_VIOLATION, ENV_ERR_UNKNOWN_JSON_SHAPE,
    ENV_ERR_UNKNOWN_TYPE_TAG, ENV_ERR_VALUE_OUT_OF_RANGE, ENV_FORMAT_LEGACY_FLAT,
    ENV_FORMAT_LEGACY_NESTED, ENV_FORMAT_TEXT, ENV_FORMAT_UNIFIED, ENV_OK, ENV_PROFILE_FULL,
    ENV_PROFILE_MINIMAL,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

#[no_mangle]
pub extern "C" fn env_init() -> EnvResult {
    ffi_boundary(EnvResult::Internal, || {
        error::clear_error_state();
        EnvResult::Ok
    })
}

#[no_mangle]
pub extern "C" fn env_cleanup() {
    ffi_boundary((), || {
        error::clear_error_state();
    });
}

#[no_mangle]
pub extern "C" fn env_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}

/// Byte offset of the last text decode error on this thread, or -1 when the
/// last error has no offset.
#[no_mangle]
pub extern "C" fn env_last_error_offset() -> i64 {
    ffi_boundary(-1, error::last_error_offset)
}

/// JSON path of the last JSON decode error on this thread. Empty when the
/// last error has no path.
#[no_mangle]
pub extern "C" fn env_last_error_path() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_path_ptr)
}
