//! Syntactic validators for device identifiers and categories.
//!
//! None of these consult a registry; a device is "valid" as soon as its
//! identifier parses.

use crate::error::{ParseError, ParseResult};
use crate::types::TransportMode;

/// Returns `true` if `s` parses as a UUID.
///
/// Any standard textual form is accepted (hyphenated, simple, braced or
/// `urn:uuid:` prefixed) and the version is not checked.
///
/// # Examples
///
/// ```
/// use tally_types::is_valid_device_id;
///
/// assert!(is_valid_device_id("123e4567-e89b-12d3-a456-426614174000"));
/// assert!(!is_valid_device_id("123e4567"));
/// assert!(!is_valid_device_id(""));
/// ```
#[must_use]
pub fn is_valid_device_id(s: &str) -> bool {
    uuid::Uuid::parse_str(s).is_ok()
}

/// Returns `true` if `s` is exactly one of the known transport modes.
///
/// Matching is case-sensitive: `"Car"` is rejected.
#[must_use]
pub fn is_valid_transport_mode(s: &str) -> bool {
    s.parse::<TransportMode>().is_ok()
}

/// Check a device identifier, returning it unchanged on success.
pub fn check_device_id(s: &str) -> ParseResult<&str> {
    if is_valid_device_id(s) {
        Ok(s)
    } else {
        Err(ParseError::InvalidDeviceId(s.to_string()))
    }
}

/// Truncate a fractional duration toward zero.
///
/// `120.9` becomes `120` and `-0.5` becomes `0`. Values whose truncation is
/// negative, or which do not fit in a `u64`, are rejected.
pub fn truncate_duration(value: f64) -> ParseResult<u64> {
    if !value.is_finite() {
        return Err(ParseError::InvalidDuration);
    }
    let truncated = value.trunc();
    if truncated < 0.0 {
        return Err(ParseError::NegativeDuration);
    }
    // 2^64: the first value a u64 cannot hold
    if truncated >= 18_446_744_073_709_551_616.0 {
        return Err(ParseError::DurationOutOfRange);
    }
    Ok(truncated as u64)
}
