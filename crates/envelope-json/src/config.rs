use envelope_core::DEFAULT_MAX_DEPTH;

/// Which value types the decoding side represents natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NativeProfile {
    /// Every registry tag is native. Values widened by another consumer are
    /// restored to their original tag when provenance is present.
    #[default]
    Full,
    /// Only NULL, BOOL, INT, LONG, FLOAT, DOUBLE, BYTES, STRING and CONTAINER.
    /// SHORT/USHORT decode as INT and UINT/ULONG/LLONG/ULLONG as LONG, with
    /// the original tag kept as provenance.
    Minimal,
}

/// Configuration for JSON decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonConfig {
    /// Maximum container nesting accepted on decode. Default: 32.
    pub max_depth: usize,
    /// Native value set of the consumer. Default: full.
    pub profile: NativeProfile,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            profile: NativeProfile::Full,
        }
    }
}

impl JsonConfig {
    /// Default configuration for a minimal consumer.
    pub fn minimal() -> Self {
        Self {
            profile: NativeProfile::Minimal,
            ..Self::default()
        }
    }
}
