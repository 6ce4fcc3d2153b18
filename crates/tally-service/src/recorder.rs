//! Event recording, stats projection and reset.
//!
//! These are the operations behind the HTTP handlers, kept free of any axum
//! types so they can be exercised directly against a [`Store`].
//!
//! Validation always completes before the store is touched: a rejected event
//! never causes a load or a save.

use serde::Serialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::debug;
use uuid::Uuid;

use tally_store::{DeviceStats, Store};
use tally_types::{
    EventKind, ParseError, ParseResult, TransportMode, UsageEvent, check_device_id,
    truncate_duration,
};

/// Fields every event payload must carry.
pub const REQUIRED_FIELDS: [&str; 4] = ["type", "device_id", "duration", "message"];

/// Failure of a recorder operation.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The client sent something invalid.
    #[error(transparent)]
    Validation(#[from] ParseError),
    /// Storage or another unexpected failure.
    #[error("{0}")]
    Internal(String),
}

impl From<tally_store::Error> for RecordError {
    fn from(e: tally_store::Error) -> Self {
        RecordError::Internal(e.to_string())
    }
}

/// Response to an accepted event.
///
/// Nothing here is persisted; `event_id` is a fresh correlation token that
/// cannot be looked up later.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgment {
    pub success: bool,
    pub event_id: Uuid,
    pub device_id: String,
    /// UTC, ISO-8601, no offset suffix.
    pub timestamp: String,
}

impl Acknowledgment {
    fn new(device_id: &str) -> Result<Self, RecordError> {
        Ok(Self {
            success: true,
            event_id: Uuid::new_v4(),
            device_id: device_id.to_string(),
            timestamp: naive_utc_timestamp(OffsetDateTime::now_utc())?,
        })
    }
}

/// Format a UTC instant as `YYYY-MM-DDTHH:MM:SS.ffffff`.
pub fn naive_utc_timestamp(now: OffsetDateTime) -> Result<String, RecordError> {
    let format =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]");
    now.format(&format)
        .map_err(|e| RecordError::Internal(e.to_string()))
}

/// Validate a raw JSON payload into a [`UsageEvent`].
///
/// Checks run in a fixed order: required fields, device id, duration, then
/// the type-specific fields. The first failure is returned.
pub fn parse_event(payload: &Value) -> ParseResult<UsageEvent> {
    let fields = payload.as_object().ok_or(ParseError::MissingFields)?;
    if !REQUIRED_FIELDS.iter().all(|k| fields.contains_key(*k)) {
        return Err(ParseError::MissingFields);
    }

    let device_id = required(fields, "device_id")?;
    let device_id = device_id
        .as_str()
        .ok_or_else(|| ParseError::InvalidDeviceId(device_id.to_string()))?;
    check_device_id(device_id)?;

    let duration = parse_duration(required(fields, "duration")?)?;

    let kind = required(fields, "type")?;
    let kind: EventKind = kind
        .as_str()
        .ok_or_else(|| ParseError::InvalidEventType(kind.to_string()))?
        .parse()?;

    match kind {
        EventKind::Transportation => {
            let mode = fields.get("mode").ok_or(ParseError::MissingMode)?;
            let mode = mode
                .as_str()
                .ok_or_else(|| ParseError::InvalidMode(mode.to_string()))?
                .parse::<TransportMode>()?;
            UsageEvent::transportation(device_id, duration, mode)
        }
        EventKind::AirConditioner => UsageEvent::air_conditioner(device_id, duration),
    }
}

fn required<'a>(fields: &'a Map<String, Value>, name: &str) -> ParseResult<&'a Value> {
    fields.get(name).ok_or(ParseError::MissingFields)
}

/// Accept any JSON number and truncate it toward zero.
fn parse_duration(value: &Value) -> ParseResult<u64> {
    let Value::Number(number) = value else {
        return Err(ParseError::InvalidDuration);
    };
    if let Some(whole) = number.as_u64() {
        return Ok(whole);
    }
    if number.is_i64() {
        return Err(ParseError::NegativeDuration);
    }
    number
        .as_f64()
        .map_or(Err(ParseError::InvalidDuration), truncate_duration)
}

/// Validate an event payload and fold it into the store.
///
/// Replaying the same payload counts it twice; there is no deduplication.
pub fn record_event(store: &Store, payload: &Value) -> Result<Acknowledgment, RecordError> {
    let event = parse_event(payload).inspect_err(|e| debug!("Rejected event: {}", e))?;

    store.update(|aggregate| aggregate.apply(&event))?;
    debug!(
        device_id = event.device_id(),
        kind = %event.kind(),
        duration = event.duration(),
        "Recorded event"
    );

    Acknowledgment::new(event.device_id())
}

/// Counters for one device; unseen devices get empty defaults.
pub fn get_stats(store: &Store, device_id: &str) -> Result<DeviceStats, RecordError> {
    check_device_id(device_id)?;
    Ok(store.device_stats(device_id)?)
}

/// Wipe every counter.
pub fn reset(store: &Store) -> Result<(), RecordError> {
    Ok(store.reset()?)
}
