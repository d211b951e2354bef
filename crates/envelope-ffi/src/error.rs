use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use envelope_core::{EnvelopeError, ErrorKind, Location};

use crate::types::EnvResult;

/// Diagnostics of the last failed call on this thread.
#[derive(Default)]
struct LastError {
    message: CString,
    /// Byte offset into text input, when the failure has one.
    offset: Option<usize>,
    /// JSON path into JSON input, empty when the failure has none.
    path: CString,
}

thread_local! {
    static LAST_ERROR: RefCell<LastError> = RefCell::new(LastError::default());
}

fn c_string(text: &str) -> CString {
    CString::new(text.replace('\0', "?")).unwrap_or_default()
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| *state.borrow_mut() = LastError::default());
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    let message = c_string(&message.into());
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = LastError {
            message,
            ..LastError::default()
        };
    });
}

pub(crate) fn set_invalid_argument(message: impl Into<String>) -> EnvResult {
    set_error_message(message);
    EnvResult::InvalidArgument
}

pub(crate) fn set_panic_error() {
    set_error_message("panic across FFI boundary");
}

/// Record `err` with its decode location and return the matching result code.
pub(crate) fn map_envelope_error(err: &EnvelopeError) -> EnvResult {
    let (offset, path) = match err.location() {
        Some(Location::Offset(offset)) => (Some(*offset), CString::default()),
        Some(Location::Path(path)) => (None, c_string(path)),
        None => (None, CString::default()),
    };
    let message = c_string(&err.to_string());
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = LastError {
            message,
            offset,
            path,
        };
    });

    match err.kind() {
        ErrorKind::MalformedHeader => EnvResult::MalformedHeader,
        ErrorKind::MalformedEntry => EnvResult::MalformedEntry,
        ErrorKind::UnknownTypeTag => EnvResult::UnknownTypeTag,
        ErrorKind::ValueOutOfRange => EnvResult::ValueOutOfRange,
        ErrorKind::InvalidUtf8 => EnvResult::InvalidUtf8,
        ErrorKind::InvalidBase64 => EnvResult::InvalidBase64,
        ErrorKind::MaxDepthExceeded => EnvResult::MaxDepthExceeded,
        ErrorKind::UnknownJsonShape => EnvResult::UnknownJsonShape,
        ErrorKind::DuplicateCycle => EnvResult::DuplicateCycle,
        ErrorKind::NotFound => EnvResult::NotFound,
        ErrorKind::EmptyName => EnvResult::InvalidArgument,
        ErrorKind::InvalidJson => EnvResult::InvalidJson,
        ErrorKind::SchemaViolation => EnvResult::SchemaViolation,
    }
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().message.as_ptr())
}

/// Offset of the last text decode error, or -1.
pub(crate) fn last_error_offset() -> i64 {
    LAST_ERROR.with(|state| {
        state
            .borrow()
            .offset
            .and_then(|offset| i64::try_from(offset).ok())
            .unwrap_or(-1)
    })
}

pub(crate) fn last_error_path_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().path.as_ptr())
}
