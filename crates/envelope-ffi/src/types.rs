use std::ffi::c_void;

use envelope_core::Container;
use envelope_json::{Format, JsonShape};

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvResult {
    Ok = 0,
    InvalidArgument = 1,
    MalformedHeader = 2,
    MalformedEntry = 3,
    UnknownTypeTag = 4,
    ValueOutOfRange = 5,
    InvalidUtf8 = 6,
    InvalidBase64 = 7,
    MaxDepthExceeded = 8,
    UnknownJsonShape = 9,
    DuplicateCycle = 10,
    NotFound = 11,
    InvalidJson = 12,
    SchemaViolation = 13,
    Internal = 99,
}

#[allow(dead_code)]
pub const ENV_OK: EnvResult = EnvResult::Ok;
#[allow(dead_code)]
pub const ENV_ERR_INVALID_ARGUMENT: EnvResult = EnvResult::InvalidArgument;
#[allow(dead_code)]
pub const ENV_ERR_MALFORMED_HEADER: EnvResult = EnvResult::MalformedHeader;
#[allow(dead_code)]
pub const ENV_ERR_MALFORMED_ENTRY: EnvResult = EnvResult::MalformedEntry;
#[allow(dead_code)]
pub const ENV_ERR_UNKNOWN_TYPE_TAG: EnvResult = EnvResult::UnknownTypeTag;
#[allow(dead_code)]
pub const ENV_ERR_VALUE_OUT_OF_RANGE: EnvResult = EnvResult::ValueOutOfRange;
#[allow(dead_code)]
pub const ENV_ERR_INVALID_UTF8: EnvResult = EnvResult::InvalidUtf8;
#[allow(dead_code)]
pub const ENV_ERR_INVALID_BASE64: EnvResult = EnvResult::InvalidBase64;
#[allow(dead_code)]
pub const ENV_ERR_MAX_DEPTH_EXCEEDED: EnvResult = EnvResult::MaxDepthExceeded;
#[allow(dead_code)]
pub const ENV_ERR_UNKNOWN_JSON_SHAPE: EnvResult = EnvResult::UnknownJsonShape;
#[allow(dead_code)]
pub const ENV_ERR_DUPLICATE_CYCLE: EnvResult = EnvResult::DuplicateCycle;
#[allow(dead_code)]
pub const ENV_ERR_NOT_FOUND: EnvResult = EnvResult::NotFound;
#[allow(dead_code)]
pub const ENV_ERR_INVALID_JSON: EnvResult = EnvResult::InvalidJson;
#[allow(dead_code)]
pub const ENV_ERR_SCHEMA_VIOLATION: EnvResult = EnvResult::SchemaViolation;
#[allow(dead_code)]
pub const ENV_ERR_INTERNAL: EnvResult = EnvResult::Internal;

#[allow(dead_code)]
pub const ENV_FORMAT_TEXT: i32 = 0;
#[allow(dead_code)]
pub const ENV_FORMAT_UNIFIED: i32 = 1;
#[allow(dead_code)]
pub const ENV_FORMAT_LEGACY_NESTED: i32 = 2;
#[allow(dead_code)]
pub const ENV_FORMAT_LEGACY_FLAT: i32 = 3;

#[allow(dead_code)]
pub const ENV_PROFILE_FULL: i32 = 0;
#[allow(dead_code)]
pub const ENV_PROFILE_MINIMAL: i32 = 1;

pub(crate) fn format_from_code(code: i32) -> Option<Format> {
    match code {
        ENV_FORMAT_TEXT => Some(Format::Text),
        ENV_FORMAT_UNIFIED => Some(Format::UNIFIED),
        ENV_FORMAT_LEGACY_NESTED => Some(Format::Json(JsonShape::LegacyNested)),
        ENV_FORMAT_LEGACY_FLAT => Some(Format::Json(JsonShape::LegacyFlat)),
        _ => None,
    }
}

pub(crate) fn format_code(format: Format) -> i32 {
    match format {
        Format::Text => ENV_FORMAT_TEXT,
        Format::Json(JsonShape::Unified) => ENV_FORMAT_UNIFIED,
        Format::Json(JsonShape::LegacyNested) => ENV_FORMAT_LEGACY_NESTED,
        Format::Json(JsonShape::LegacyFlat) => ENV_FORMAT_LEGACY_FLAT,
    }
}

pub type EnvContainerHandle = *mut c_void;

pub(crate) struct ContainerHandle {
    pub(crate) container: Container,
}
