//! Event and category types for per-device usage tallies.
//!
//! This crate provides the types shared by the store and the HTTP service:
//!
//! - [`TransportMode`] and [`EventKind`] enumerations
//! - The [`UsageEvent`] tagged union, only constructible when valid
//! - Device identifier and mode validators
//! - Error types for event validation
//!
//! # Example
//!
//! ```
//! use tally_types::{TransportMode, UsageEvent};
//!
//! let event = UsageEvent::transportation(
//!     "123e4567-e89b-12d3-a456-426614174000",
//!     120,
//!     TransportMode::Bike,
//! )?;
//! assert_eq!(event.duration(), 120);
//! # Ok::<(), tally_types::ParseError>(())
//! ```

pub mod error;
pub mod types;
pub mod validate;

pub use error::{ParseError, ParseResult};
pub use types::{EventKind, TransportMode, UsageEvent};
pub use validate::{
    check_device_id, is_valid_device_id, is_valid_transport_mode, truncate_duration,
};
