//! Configuration module
//!
//! Provider connection, trust evaluation, decision API and logging settings,
//! layered from TOML files and `TRIGGER_GATE__*` environment variables.

pub mod loader;
pub mod types;

pub use loader::{load_config, load_config_from_str};
pub use types::*;
