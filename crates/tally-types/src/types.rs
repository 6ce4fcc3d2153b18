//! Core types for usage events.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};
use crate::validate::check_device_id;

/// Mode of travel reported by a transportation event.
///
/// Serialized in lowercase (`"car"`, `"bike"`, ...), which is also the
/// only spelling accepted by [`FromStr`].
///
/// ```
/// use tally_types::TransportMode;
///
/// assert_eq!("bike".parse::<TransportMode>(), Ok(TransportMode::Bike));
/// assert!("Bike".parse::<TransportMode>().is_err());
/// assert_eq!(TransportMode::Train.to_string(), "train");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TransportMode {
    Car,
    Bike,
    Walk,
    Bus,
    Train,
}

impl TransportMode {
    /// Every transport mode, in declaration order.
    pub const ALL: [TransportMode; 5] = [
        TransportMode::Car,
        TransportMode::Bike,
        TransportMode::Walk,
        TransportMode::Bus,
        TransportMode::Train,
    ];

    /// The wire spelling of this mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Car => "car",
            TransportMode::Bike => "bike",
            TransportMode::Walk => "walk",
            TransportMode::Bus => "bus",
            TransportMode::Train => "train",
        }
    }
}

impl FromStr for TransportMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "car" => Ok(TransportMode::Car),
            "bike" => Ok(TransportMode::Bike),
            "walk" => Ok(TransportMode::Walk),
            "bus" => Ok(TransportMode::Bus),
            "train" => Ok(TransportMode::Train),
            _ => Err(ParseError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminant of a [`UsageEvent`], as sent in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Transportation,
    AirConditioner,
}

impl EventKind {
    /// The wire spelling of this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Transportation => "transportation",
            EventKind::AirConditioner => "air-conditioner",
        }
    }
}

impl FromStr for EventKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transportation" => Ok(EventKind::Transportation),
            "air-conditioner" => Ok(EventKind::AirConditioner),
            _ => Err(ParseError::InvalidEventType(s.to_string())),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single, fully validated usage event.
///
/// Events only live for the duration of one request: their duration is
/// folded into the aggregate and the event itself is dropped. The
/// constructors reject invalid device identifiers, so a `UsageEvent` is
/// never observed in a partially valid state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageEvent {
    /// Time spent travelling with a given mode.
    Transportation {
        device_id: String,
        duration: u64,
        mode: TransportMode,
    },
    /// Air-conditioner run time.
    AirConditioner { device_id: String, duration: u64 },
}

impl UsageEvent {
    /// Build a transportation event.
    pub fn transportation(
        device_id: impl Into<String>,
        duration: u64,
        mode: TransportMode,
    ) -> ParseResult<Self> {
        let device_id = device_id.into();
        check_device_id(&device_id)?;
        Ok(UsageEvent::Transportation {
            device_id,
            duration,
            mode,
        })
    }

    /// Build an air-conditioner event.
    pub fn air_conditioner(device_id: impl Into<String>, duration: u64) -> ParseResult<Self> {
        let device_id = device_id.into();
        check_device_id(&device_id)?;
        Ok(UsageEvent::AirConditioner {
            device_id,
            duration,
        })
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            UsageEvent::Transportation { .. } => EventKind::Transportation,
            UsageEvent::AirConditioner { .. } => EventKind::AirConditioner,
        }
    }

    #[must_use]
    pub fn device_id(&self) -> &str {
        match self {
            UsageEvent::Transportation { device_id, .. }
            | UsageEvent::AirConditioner { device_id, .. } => device_id,
        }
    }

    /// Duration in whole units, already truncated.
    #[must_use]
    pub fn duration(&self) -> u64 {
        match self {
            UsageEvent::Transportation { duration, .. }
            | UsageEvent::AirConditioner { duration, .. } => *duration,
        }
    }
}
