//! Error types for event validation in tally-types.

use thiserror::Error;

/// Errors that can occur when validating an incoming usage event.
///
/// The `Display` output of each variant is the client-facing message
/// returned by the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// One of `type`, `device_id`, `duration` or `message` is absent.
    #[error("Missing required fields")]
    MissingFields,

    /// The device identifier is not a UUID.
    #[error("Invalid device_id format")]
    InvalidDeviceId(String),

    /// The duration is not a JSON number.
    #[error("Duration must be a number")]
    InvalidDuration,

    /// The duration truncates to a value below zero.
    #[error("Duration must be a non-negative number")]
    NegativeDuration,

    /// The duration does not fit into a 64-bit counter.
    #[error("Duration is out of range")]
    DurationOutOfRange,

    /// A transportation event without a `mode` field.
    #[error("Missing mode for transportation event")]
    MissingMode,

    /// A `mode` value outside the known transport modes.
    #[error("Invalid transportation mode")]
    InvalidMode(String),

    /// A `type` value that is neither `transportation` nor `air-conditioner`.
    #[error("Invalid event type")]
    InvalidEventType(String),
}

/// Result type alias using tally-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
