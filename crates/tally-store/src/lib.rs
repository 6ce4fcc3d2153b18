//! Whole-value persistence for per-device usage tallies.
//!
//! The store holds a single [`AggregateStore`]: per-device transportation
//! durations keyed by mode, and per-device air-conditioner run time. It is
//! always read and written as a whole, through a pluggable [`Storage`]
//! backend (a JSON file in production, memory in tests).
//!
//! # Example
//!
//! ```no_run
//! use tally_store::Store;
//! use tally_types::{TransportMode, UsageEvent};
//!
//! let store = Store::open_default()?;
//! let event = UsageEvent::transportation(
//!     "123e4567-e89b-12d3-a456-426614174000",
//!     120,
//!     TransportMode::Bike,
//! )
//! .expect("valid event");
//! store.update(|aggregate| aggregate.apply(&event))?;
//! # Ok::<(), tally_store::Error>(())
//! ```

mod error;
mod models;
mod storage;
mod store;

pub use error::{Error, Result};
pub use models::{AggregateStore, DeviceStats, ModeTotals};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::Store;

/// Default store path following platform conventions.
///
/// - Linux: `~/.local/share/tally/events_db.json`
/// - macOS: `~/Library/Application Support/tally/events_db.json`
/// - Windows: `C:\Users\<user>\AppData\Local\tally\events_db.json`
pub fn default_store_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("tally")
        .join("events_db.json")
}
