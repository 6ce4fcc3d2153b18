//! HTTP API recording per-device usage events and serving aggregated stats.
//!
//! This crate provides a service that:
//! - Accepts transportation and air-conditioner usage events
//! - Folds each event's duration into a persisted per-device tally
//! - Serves the accumulated counters for a device
//! - Resets the whole tally on request
//!
//! # REST API Endpoints
//!
//! - `POST /events` - Record an event
//! - `GET /stats/{device_id}` - Counters for a device
//! - `POST /reset` - Clear all counters
//! - `GET /health` - Service health check
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/tally/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:5000"
//!
//! [storage]
//! path = "~/.local/share/tally/events_db.json"
//! ```

pub mod api;
pub mod config;
pub mod recorder;
pub mod state;

pub use config::{Config, ConfigError, ServerConfig, StorageConfig, ValidationError};
pub use recorder::{Acknowledgment, RecordError};
pub use state::AppState;
