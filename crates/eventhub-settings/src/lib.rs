//! # eventhub-settings
//!
//! Configuration for the eventhub server, loaded from three layers
//! (in priority order):
//! 1. **Compiled defaults**: [`EventhubSettings::default()`]
//! 2. **Settings file**: `./eventhub.json` or `EVENTHUB_CONFIG` (deep-merged)
//! 3. **Environment variables**: `PORT`, `DATABASE_URL`, `EVENTHUB_*`
//!
//! Settings are loaded once at startup and passed down explicitly; there is
//! no global instance.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_overrides, deep_merge, load_settings, load_settings_from_path};
pub use types::*;
