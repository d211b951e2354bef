use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::error;
use crate::types::{ContainerHandle, EnvContainerHandle, EnvResult};

/// Convert a required C string argument into UTF-8 `&str`.
///
/// # Safety
/// `value` must be null or point to a valid NUL-terminated C string.
pub(crate) unsafe fn required_str_arg<'a>(value: *const c_char, name: &str) -> Option<&'a str> {
    if value.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null"));
        return None;
    }

    let as_cstr = {
        // SAFETY: The caller guarantees `value` points to a valid NUL-terminated C string.
        unsafe { CStr::from_ptr(value) }
    };

    match as_cstr.to_str() {
        Ok(v) => Some(v),
        Err(_) => {
            let _ = error::set_invalid_argument(format!("{name} must be valid UTF-8"));
            None
        }
    }
}

/// Convert an optional byte pointer + length into a slice.
///
/// # Safety
/// If `len > 0`, `data` must be non-null and readable for `len` bytes.
pub(crate) unsafe fn bytes_arg<'a>(data: *const u8, len: usize, name: &str) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }
    if data.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null when len > 0"));
        return None;
    }

    // SAFETY: Pointer and length are validated above and owned by caller for the call duration.
    Some(unsafe { std::slice::from_raw_parts(data, len) })
}

pub(crate) fn with_container<T>(
    handle: EnvContainerHandle,
    on_error: T,
    f: impl FnOnce(&ContainerHandle) -> T,
) -> T {
    if handle.is_null() {
        let _ = error::set_invalid_argument("container handle cannot be null");
        return on_error;
    }

    let container_handle = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &*(handle as *mut ContainerHandle) }
    };

    f(container_handle)
}

pub(crate) fn with_container_mut<T>(
    handle: EnvContainerHandle,
    on_error: T,
    f: impl FnOnce(&mut ContainerHandle) -> T,
) -> T {
    if handle.is_null() {
        let _ = error::set_invalid_argument("container handle cannot be null");
        return on_error;
    }

    let container_handle = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &mut *(handle as *mut ContainerHandle) }
    };

    f(container_handle)
}

/// Hand a string to the caller through `out`. Release with `env_string_free`.
pub(crate) fn write_string_out(out: *mut *mut c_char, text: String) -> EnvResult {
    if out.is_null() {
        return error::set_invalid_argument("out pointer cannot be null");
    }

    let text = match CString::new(text) {
        Ok(text) => text,
        Err(_) => return error::set_invalid_argument("output contains an interior NUL byte"),
    };

    // SAFETY: Pointer was checked for null above.
    unsafe {
        *out = text.into_raw();
    }
    EnvResult::Ok
}

pub(crate) fn box_container(container: envelope_core::Container) -> EnvContainerHandle {
    Box::into_raw(Box::new(ContainerHandle { container })) as EnvContainerHandle
}
