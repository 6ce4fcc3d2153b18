//! Data models for stored data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tally_types::{TransportMode, UsageEvent, is_valid_device_id};

use crate::error::{Error, Result};

/// Per-mode durations for one device.
pub type ModeTotals = BTreeMap<TransportMode, u64>;

/// The whole persisted aggregate.
///
/// This is the only thing the store ever reads or writes. Counters are only
/// ever incremented; the single way to clear them is to replace the whole
/// aggregate with [`AggregateStore::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateStore {
    /// Device identifier to per-mode travel time.
    pub transportation: BTreeMap<String, ModeTotals>,
    /// Device identifier to air-conditioner run time.
    pub air_conditioner: BTreeMap<String, u64>,
}

impl AggregateStore {
    /// Fold an event's duration into the matching counter.
    ///
    /// Missing device or mode entries start at zero. Addition saturates at
    /// `u64::MAX`.
    pub fn apply(&mut self, event: &UsageEvent) {
        match event {
            UsageEvent::Transportation {
                device_id,
                duration,
                mode,
            } => {
                let total = self
                    .transportation
                    .entry(device_id.clone())
                    .or_default()
                    .entry(*mode)
                    .or_insert(0);
                *total = total.saturating_add(*duration);
            }
            UsageEvent::AirConditioner {
                device_id,
                duration,
            } => {
                let total = self.air_conditioner.entry(device_id.clone()).or_insert(0);
                *total = total.saturating_add(*duration);
            }
        }
    }

    /// Project out one device's counters, defaulting to empty / zero.
    #[must_use]
    pub fn stats(&self, device_id: &str) -> DeviceStats {
        DeviceStats {
            device_id: device_id.to_string(),
            transportation: self
                .transportation
                .get(device_id)
                .cloned()
                .unwrap_or_default(),
            air_conditioner: self.air_conditioner.get(device_id).copied().unwrap_or(0),
        }
    }

    /// Whether no counter has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transportation.is_empty() && self.air_conditioner.is_empty()
    }

    /// Check that every device key is a valid identifier.
    ///
    /// Mode keys need no check here; deserialization already rejects
    /// anything that is not a [`TransportMode`].
    pub fn validate(&self) -> Result<()> {
        let keys = self
            .transportation
            .keys()
            .chain(self.air_conditioner.keys());
        for device_id in keys {
            if !is_valid_device_id(device_id) {
                return Err(Error::InvalidDeviceId(device_id.clone()));
            }
        }
        Ok(())
    }
}

/// Counters for a single device, as returned by the stats endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStats {
    /// Device identifier, echoed as queried.
    pub device_id: String,
    /// Accumulated duration per transport mode.
    pub transportation: ModeTotals,
    /// Accumulated air-conditioner run time.
    pub air_conditioner: u64,
}
