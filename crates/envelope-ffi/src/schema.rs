use crate::error;
#[cfg(feature = "schema")]
use crate::args;
use crate::types::EnvResult;

/// Validate a unified v2.0 JSON document against the embedded schema.
///
/// # Safety
/// If `len > 0`, `data` must be non-null and readable for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn env_schema_validate(data: *const u8, len: usize, strict: bool) -> EnvResult {
    crate::ffi_boundary(EnvResult::Internal, || {
        error::clear_error_state();

        #[cfg(feature = "schema")]
        {
            let payload = {
                // SAFETY: We validate pointer/length pairing in helper.
                match unsafe { args::bytes_arg(data, len, "data") } {
                    Some(v) => v,
                    None => return EnvResult::InvalidArgument,
                }
            };

            let config = envelope_json::SchemaConfig {
                strict_mode: strict,
            };
            match envelope_json::UnifiedSchema::new(config)
                .and_then(|schema| schema.validate_bytes(payload))
            {
                Ok(()) => EnvResult::Ok,
                Err(err) => error::map_envelope_error(&err),
            }
        }
        #[cfg(not(feature = "schema"))]
        {
            let _ = data;
            let _ = len;
            let _ = strict;
            error::set_error_message("schema support is not enabled in this envelope-ffi build");
            EnvResult::Internal
        }
    })
}
