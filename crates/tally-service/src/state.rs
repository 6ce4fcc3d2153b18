//! Application state shared across handlers.
//!
//! # Store serialization
//!
//! Every handler takes the `store` mutex for the whole of its
//! load-modify-save sequence. Two concurrent `POST /events` requests
//! therefore cannot both load the same aggregate and overwrite each other's
//! increment. This only holds within one process; separate processes
//! pointed at the same file still race.

use std::sync::Arc;

use tally_store::Store;
use tokio::sync::Mutex;

/// Shared application state.
pub struct AppState {
    /// The aggregate store, one writer at a time.
    pub store: Mutex<Store>,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Store) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
        })
    }
}
