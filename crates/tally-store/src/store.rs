//! Main store implementation.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{AggregateStore, DeviceStats};
use crate::storage::{FileStorage, MemoryStorage, Storage};

/// Accessor for the persisted aggregate.
///
/// Every call reads or writes the complete aggregate through the injected
/// [`Storage`]. The store does no locking of its own; callers that need
/// load-modify-save to be atomic must serialize access themselves.
pub struct Store {
    storage: Box<dyn Storage>,
}

impl Store {
    /// Open or create a store file at the given path.
    ///
    /// If the file does not exist yet, it is created holding the empty
    /// aggregate.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let storage = FileStorage::new(path);

        info!("Opening store at {}", storage.path().display());
        let initialize = !storage.exists();
        let store = Self::with_storage(storage);
        if initialize {
            info!("Store file missing, initializing empty aggregate");
            store.save(&AggregateStore::default())?;
        }

        Ok(store)
    }

    /// Open the default store location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_store_path())
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Self {
        Self::with_storage(MemoryStorage::new())
    }

    /// Build a store over any storage backend.
    pub fn with_storage<S: Storage + 'static>(storage: S) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Load the full aggregate.
    ///
    /// Returns the empty aggregate if nothing has been persisted yet.
    pub fn load(&self) -> Result<AggregateStore> {
        let Some(contents) = self.storage.read()? else {
            debug!("No persisted aggregate, starting empty");
            return Ok(AggregateStore::default());
        };

        let aggregate: AggregateStore = serde_json::from_str(&contents)?;
        aggregate.validate()?;
        Ok(aggregate)
    }

    /// Persist the full aggregate, replacing whatever was stored before.
    pub fn save(&self, aggregate: &AggregateStore) -> Result<()> {
        let contents = serde_json::to_string_pretty(aggregate).map_err(Error::Serialize)?;
        self.storage.write(&contents)
    }

    /// Load, apply `f`, then save.
    ///
    /// If loading fails nothing is written. If saving fails the mutation is
    /// lost and the persisted aggregate is whatever the backend left behind.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut AggregateStore),
    {
        let mut aggregate = self.load()?;
        f(&mut aggregate);
        self.save(&aggregate)
    }

    /// Project one device's counters.
    pub fn device_stats(&self, device_id: &str) -> Result<DeviceStats> {
        Ok(self.load()?.stats(device_id))
    }

    /// Replace the aggregate with the empty one, unconditionally.
    pub fn reset(&self) -> Result<()> {
        info!("Resetting store");
        self.save(&AggregateStore::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::{TransportMode, UsageEvent};

    const DEVICE: &str = "123e4567-e89b-12d3-a456-426614174000";

    fn bike(duration: u64) -> UsageEvent {
        UsageEvent::transportation(DEVICE, duration, TransportMode::Bike).unwrap()
    }

    #[test]
    fn test_open_in_memory_loads_empty() {
        let store = Store::open_in_memory();
        let aggregate = store.load().unwrap();
        assert!(aggregate.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let store = Store::open_in_memory();
        let mut aggregate = AggregateStore::default();
        aggregate.apply(&bike(15));

        store.save(&aggregate).unwrap();
        assert_eq!(store.load().unwrap(), aggregate);
    }

    #[test]
    fn test_update_accumulates() {
        let store = Store::open_in_memory();

        store.update(|agg| agg.apply(&bike(10))).unwrap();
        store.update(|agg| agg.apply(&bike(5))).unwrap();

        let stats = store.device_stats(DEVICE).unwrap();
        assert_eq!(stats.transportation[&TransportMode::Bike], 15);
    }

    #[test]
    fn test_reset_clears_everything() {
        let store = Store::open_in_memory();
        store.update(|agg| agg.apply(&bike(10))).unwrap();

        store.reset().unwrap();

        assert!(store.load().unwrap().is_empty());
        let stats = store.device_stats(DEVICE).unwrap();
        assert!(stats.transportation.is_empty());
        assert_eq!(stats.air_conditioner, 0);
    }

    #[test]
    fn test_load_malformed_is_parse_error() {
        let store = Store::with_storage(MemoryStorage::with_contents("not json"));
        assert!(matches!(store.load(), Err(Error::Parse(_))));
    }

    #[test]
    fn test_load_wrong_shape_is_parse_error() {
        let store = Store::with_storage(MemoryStorage::with_contents(r#"{"transportation": []}"#));
        assert!(matches!(store.load(), Err(Error::Parse(_))));
    }

    #[test]
    fn test_load_invalid_key_is_rejected() {
        let store = Store::with_storage(MemoryStorage::with_contents(
            r#"{"transportation": {}, "air_conditioner": {"abc": 1}}"#,
        ));
        assert!(matches!(store.load(), Err(Error::InvalidDeviceId(_))));
    }

    #[test]
    fn test_update_on_malformed_store_writes_nothing() {
        let store = Store::with_storage(MemoryStorage::with_contents("garbage"));
        assert!(store.update(|agg| agg.apply(&bike(1))).is_err());
        // still unparseable, so nothing was overwritten
        assert!(store.load().is_err());
    }

    #[test]
    fn test_open_creates_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("data").join("events_db.json");

        let store = Store::open(&path).unwrap();
        assert!(path.exists());

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            on_disk,
            serde_json::json!({"transportation": {}, "air_conditioner": {}})
        );
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_open_keeps_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("events_db.json");

        {
            let store = Store::open(&path).unwrap();
            store.update(|agg| agg.apply(&bike(42))).unwrap();
        }

        let reopened = Store::open(&path).unwrap();
        let stats = reopened.device_stats(DEVICE).unwrap();
        assert_eq!(stats.transportation[&TransportMode::Bike], 42);
    }

    #[test]
    fn test_saved_file_is_pretty_printed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("events_db.json");
        let store = Store::open(&path).unwrap();
        store
            .update(|agg| agg.apply(&UsageEvent::air_conditioner(DEVICE, 30).unwrap()))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\n  \"air_conditioner\""));
    }
}
