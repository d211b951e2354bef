use std::os::raw::c_char;

use envelope_json::{detect_format, encode, from_any_with, AdapterConfig, NativeProfile};

use crate::args::{box_container, bytes_arg, with_container, write_string_out};
use crate::error;
use crate::types::{
    format_code, format_from_code, EnvContainerHandle, EnvResult, ENV_PROFILE_FULL,
    ENV_PROFILE_MINIMAL,
};

/// Encode a container in one of the `ENV_FORMAT_*` formats.
///
/// # Safety
/// `container` must be a valid handle and `out_text` a non-null writable pointer.
/// Release the output with `env_string_free`.
#[no_mangle]
pub unsafe extern "C" fn env_encode(
    container: EnvContainerHandle,
    format: i32,
    out_text: *mut *mut c_char,
) -> EnvResult {
    crate::ffi_boundary(EnvResult::Internal, || {
        error::clear_error_state();

        let Some(format) = format_from_code(format) else {
            return error::set_invalid_argument(format!("unknown format code {format}"));
        };

        with_container(container, EnvResult::InvalidArgument, |handle| {
            match encode(&handle.container, format, false) {
                Ok(text) => write_string_out(out_text, text),
                Err(err) => error::map_envelope_error(&err),
            }
        })
    })
}

/// Decode text or any JSON shape into a new container handle.
///
/// # Safety
/// If `len > 0`, `data` must be non-null and readable for `len` bytes.
/// `out_container` must be non-null and writable.
#[no_mangle]
pub unsafe extern "C" fn env_decode(
    data: *const u8,
    len: usize,
    out_container: *mut EnvContainerHandle,
) -> EnvResult {
    // SAFETY: Same contract as this function.
    unsafe { env_decode_with(data, len, 0, ENV_PROFILE_FULL, out_container) }
}

/// Decode with an explicit nesting limit (`0` for the default) and
/// `ENV_PROFILE_*` consumer profile.
///
/// # Safety
/// If `len > 0`, `data` must be non-null and readable for `len` bytes.
/// `out_container` must be non-null and writable.
#[no_mangle]
pub unsafe extern "C" fn env_decode_with(
    data: *const u8,
    len: usize,
    max_depth: usize,
    profile: i32,
    out_container: *mut EnvContainerHandle,
) -> EnvResult {
    crate::ffi_boundary(EnvResult::Internal, || {
        error::clear_error_state();

        if out_container.is_null() {
            return error::set_invalid_argument("out_container cannot be null");
        }
        let src = {
            // SAFETY: We validate pointer/length pairing in helper.
            match unsafe { bytes_arg(data, len, "data") } {
                Some(v) => v,
                None => return EnvResult::InvalidArgument,
            }
        };

        let mut config = AdapterConfig::default();
        if max_depth > 0 {
            config = config.with_max_depth(max_depth);
        }
        config.json.profile = match profile {
            ENV_PROFILE_FULL => NativeProfile::Full,
            ENV_PROFILE_MINIMAL => NativeProfile::Minimal,
            other => return error::set_invalid_argument(format!("unknown profile code {other}")),
        };

        match from_any_with(src, &config) {
            Ok(container) => {
                // SAFETY: Pointer was checked for null above.
                unsafe {
                    *out_container = box_container(container);
                }
                EnvResult::Ok
            }
            Err(err) => error::map_envelope_error(&err),
        }
    })
}

/// Detect the wire format of `data` and write its `ENV_FORMAT_*` code.
///
/// # Safety
/// If `len > 0`, `data` must be non-null and readable for `len` bytes.
/// `out_format` must be non-null and writable.
#[no_mangle]
pub unsafe extern "C" fn env_detect_format(
    data: *const u8,
    len: usize,
    out_format: *mut i32,
) -> EnvResult {
    crate::ffi_boundary(EnvResult::Internal, || {
        error::clear_error_state();

        if out_format.is_null() {
            return error::set_invalid_argument("out_format cannot be null");
        }
        let src = {
            // SAFETY: We validate pointer/length pairing in helper.
            match unsafe { bytes_arg(data, len, "data") } {
                Some(v) => v,
                None => return EnvResult::InvalidArgument,
            }
        };

        match detect_format(src) {
            Ok(format) => {
                // SAFETY: Pointer was checked for null above.
                unsafe {
                    *out_format = format_code(format);
                }
                EnvResult::Ok
            }
            Err(err) => error::map_envelope_error(&err),
        }
    })
}
