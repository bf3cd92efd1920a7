//! Configuration module
//!
//! Configuration types, defaults and loading for the metrics collector.
//! The surrounding tooling decides where configuration comes from; this
//! module owns the shape and the defaults.

mod defaults;
mod loading;
mod types;

pub use loading::load_config;
pub use types::CollectorConfig;

// Re-export default functions for use in tests and other modules
pub use defaults::{export_dir, fetch_timeout, history_capacity, host, poll_interval, retain_on_stop};
