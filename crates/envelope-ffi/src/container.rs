use std::ffi::CString;
use std::os::raw::c_char;

use envelope_core::{EnvelopeError, TypeTag, Value};
use envelope_text::to_text;

use crate::args::{box_container, required_str_arg, with_container, with_container_mut, write_string_out};
use crate::error;
use crate::types::{ContainerHandle, EnvContainerHandle, EnvResult};

/// Create an empty container with the given message type.
///
/// # Safety
/// `message_type` must be a non-null pointer to a valid UTF-8, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn env_container_new(message_type: *const c_char) -> EnvContainerHandle {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();

        let message_type = {
            // SAFETY: We validate null and UTF-8 in helper.
            match unsafe { required_str_arg(message_type, "message_type") } {
                Some(v) => v,
                None => return std::ptr::null_mut(),
            }
        };

        box_container(envelope_core::Container::with_header(envelope_core::Header::new(
            message_type,
        )))
    })
}

/// Set the header of a container.
///
/// `message_type` may be null to keep the message type given to
/// [`env_container_new`].
///
/// # Safety
/// `container` must be a valid handle. Every other string argument must be a
/// non-null, valid UTF-8, NUL-terminated C string. `message_type` must be null
/// or such a string.
#[no_mangle]
pub unsafe extern "C" fn env_container_set_header(
    container: EnvContainerHandle,
    target_id: *const c_char,
    target_sub_id: *const c_char,
    source_id: *const c_char,
    source_sub_id: *const c_char,
    message_type: *const c_char,
    version: *const c_char,
) -> EnvResult {
    crate::ffi_boundary(EnvResult::Internal, || {
        error::clear_error_state();

        let message_type = if message_type.is_null() {
            None
        } else {
            // SAFETY: We validate UTF-8 in helper; null was handled above.
            match unsafe { required_str_arg(message_type, "message_type") } {
                Some(v) => Some(v.to_string()),
                None => return EnvResult::InvalidArgument,
            }
        };

        let fields = [
            (target_id, "target_id"),
            (target_sub_id, "target_sub_id"),
            (source_id, "source_id"),
            (source_sub_id, "source_sub_id"),
            (version, "version"),
        ];
        let mut values = Vec::with_capacity(fields.len());
        for (ptr, name) in fields {
            // SAFETY: We validate null and UTF-8 in helper.
            match unsafe { required_str_arg(ptr, name) } {
                Some(v) => values.push(v.to_string()),
                None => return EnvResult::InvalidArgument,
            }
        }

        with_container_mut(container, EnvResult::InvalidArgument, |handle| {
            let header = &mut handle.container.header;
            let mut values = values.into_iter();
            let mut next = || values.next().unwrap_or_default();
            header.target_id = next();
            header.target_sub_id = next();
            header.source_id = next();
            header.source_sub_id = next();
            header.version = next();
            if let Some(message_type) = message_type {
                header.message_type = message_type;
            }
            EnvResult::Ok
        })
    })
}

/// Append a scalar value given its type tag and canonical text form.
///
/// # Safety
/// `container` must be a valid handle. `name` and `text` must be non-null,
/// valid UTF-8, NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn env_container_add(
    container: EnvContainerHandle,
    name: *const c_char,
    type_tag: i32,
    text: *const c_char,
) -> EnvResult {
    crate::ffi_boundary(EnvResult::Internal, || {
        error::clear_error_state();

        // SAFETY: We validate null and UTF-8 in helper.
        let Some(name) = (unsafe { required_str_arg(name, "name") }) else {
            return EnvResult::InvalidArgument;
        };
        // SAFETY: We validate null and UTF-8 in helper.
        let Some(text) = (unsafe { required_str_arg(text, "text") }) else {
            return EnvResult::InvalidArgument;
        };

        let value = TypeTag::from_id(i64::from(type_tag))
            .and_then(|tag| Value::from_text(name, tag, text));
        let value = match value {
            Ok(value) => value,
            Err(err) => return error::map_envelope_error(&err),
        };

        with_container_mut(container, EnvResult::InvalidArgument, |handle| {
            handle.container.add(value);
            EnvResult::Ok
        })
    })
}

/// Move `child` into `parent` as a CONTAINER value named `name`.
///
/// On success `child` is consumed and must not be used or freed again. On
/// failure the caller still owns it. Nesting a container into itself fails
/// with `DuplicateCycle`.
///
/// # Safety
/// `parent` and `child` must be valid handles. `name` must be a non-null,
/// valid UTF-8, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn env_container_add_container(
    parent: EnvContainerHandle,
    name: *const c_char,
    child: EnvContainerHandle,
) -> EnvResult {
    crate::ffi_boundary(EnvResult::Internal, || {
        error::clear_error_state();

        // SAFETY: We validate null and UTF-8 in helper.
        let Some(name) = (unsafe { required_str_arg(name, "name") }) else {
            return EnvResult::InvalidArgument;
        };
        if parent.is_null() || child.is_null() {
            return error::set_invalid_argument("container handle cannot be null");
        }
        if parent == child {
            let err = EnvelopeError::DuplicateCycle(format!(
                "container cannot be nested into itself as {name:?}"
            ));
            return error::map_envelope_error(&err);
        }
        if name.is_empty() {
            return error::map_envelope_error(&EnvelopeError::EmptyName);
        }

        let child = {
            // SAFETY: Caller guarantees `child` was allocated by this library and is distinct
            // from `parent`; ownership moves here.
            unsafe { Box::from_raw(child as *mut ContainerHandle) }
        };

        with_container_mut(parent, EnvResult::InvalidArgument, |handle| {
            match handle.container.add_container(name, child.container) {
                Ok(()) => EnvResult::Ok,
                Err(err) => error::map_envelope_error(&err),
            }
        })
    })
}

/// Number of values in a container.
///
/// # Safety
/// `container` must be a valid handle and `out_len` a non-null writable pointer.
#[no_mangle]
pub unsafe extern "C" fn env_container_len(
    container: EnvContainerHandle,
    out_len: *mut usize,
) -> EnvResult {
    crate::ffi_boundary(EnvResult::Internal, || {
        error::clear_error_state();

        if out_len.is_null() {
            return error::set_invalid_argument("out_len cannot be null");
        }

        with_container(container, EnvResult::InvalidArgument, |handle| {
            // SAFETY: Pointer was checked for null above.
            unsafe {
                *out_len = handle.container.len();
            }
            EnvResult::Ok
        })
    })
}

/// Look up the last value named `name`.
///
/// Writes the type tag to `out_tag` and the canonical text form to `out_text`
/// (release with `env_string_free`). CONTAINER values are returned in the
/// text wire format.
///
/// # Safety
/// `container` must be a valid handle, `name` a valid C string, and both
/// output pointers non-null and writable.
#[no_mangle]
pub unsafe extern "C" fn env_container_get(
    container: EnvContainerHandle,
    name: *const c_char,
    out_tag: *mut i32,
    out_text: *mut *mut c_char,
) -> EnvResult {
    crate::ffi_boundary(EnvResult::Internal, || {
        error::clear_error_state();

        // SAFETY: We validate null and UTF-8 in helper.
        let Some(name) = (unsafe { required_str_arg(name, "name") }) else {
            return EnvResult::InvalidArgument;
        };
        if out_tag.is_null() {
            return error::set_invalid_argument("out_tag cannot be null");
        }

        with_container(container, EnvResult::InvalidArgument, |handle| {
            let value = match handle.container.get(name) {
                Ok(value) => value,
                Err(err) => return error::map_envelope_error(&err),
            };
            let text = match value.as_container() {
                Some(child) => to_text(child),
                None => value.to_text().unwrap_or_default(),
            };
            let result = write_string_out(out_text, text);
            if result == EnvResult::Ok {
                // SAFETY: Pointer was checked for null above.
                unsafe {
                    *out_tag = i32::from(value.tag().id());
                }
            }
            result
        })
    })
}

/// Free a container handle.
///
/// # Safety
/// `container` must be null or a handle returned by this library that has not
/// been freed or consumed by `env_container_add_container`.
#[no_mangle]
pub unsafe extern "C" fn env_container_free(container: EnvContainerHandle) {
    crate::ffi_boundary((), || {
        if container.is_null() {
            return;
        }

        // SAFETY: Caller guarantees this handle was allocated by this library.
        unsafe {
            drop(Box::from_raw(container as *mut ContainerHandle));
        }
    });
}

/// Free a string returned by this library.
///
/// # Safety
/// `text` must be null or a pointer previously written by this library.
#[no_mangle]
pub unsafe extern "C" fn env_string_free(text: *mut c_char) {
    crate::ffi_boundary((), || {
        if text.is_null() {
            return;
        }

        // SAFETY: `text` was produced by `CString::into_raw` in this library.
        unsafe {
            drop(CString::from_raw(text));
        }
    });
}
