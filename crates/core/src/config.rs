//! Decode policy knobs.
//!
//! These are plain data: the crate never reads files or the environment.
//! Callers that keep a configuration file can embed them and deserialize
//! with serde.

use serde::{Deserialize, Serialize};

/// Default bound on a single variable-length byte block (16 MiB).
pub const DEFAULT_MAX_VAR_BYTES: usize = 0x100_0000;

/// Default bound on the item count of a variable-length array.
pub const DEFAULT_MAX_ARRAY_LEN: usize = 0x100_0000;

/// Default ceiling on Lucas-sequence attempts when recovering a y-coordinate.
pub const DEFAULT_SQRT_ATTEMPTS: usize = 128;

/// Size limits applied while decoding attacker-controlled length prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecLimits {
    /// Maximum length of any variable-length byte block or string.
    pub max_var_bytes: usize,
    /// Maximum item count of any variable-length array.
    pub max_array_len: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_var_bytes: DEFAULT_MAX_VAR_BYTES,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
        }
    }
}

/// Configuration for compressed point decompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqrtConfig {
    /// Maximum number of random Lucas parameters tried before giving up.
    /// Only primes congruent to 1 mod 4 take the randomized path.
    pub max_attempts: usize,
}

impl Default for SqrtConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_SQRT_ATTEMPTS,
        }
    }
}
