//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`EventhubSettings::default()`]
//! 2. If a settings file exists, deep-merge its values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::{EventhubSettings, LogFormat};

/// Settings file looked up in the working directory when no path is given.
pub const DEFAULT_SETTINGS_FILE: &str = "eventhub.json";

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "EVENTHUB_CONFIG";

/// Resolve which settings file to read.
///
/// An explicit path wins, then `EVENTHUB_CONFIG`, then `./eventhub.json`.
pub fn settings_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(
        || {
            read_env_string(CONFIG_ENV)
                .map_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE), PathBuf::from)
        },
        Path::to_path_buf,
    )
}

/// Load settings with env var overrides.
///
/// A path passed explicitly must exist; the implicit default file is
/// optional.
pub fn load_settings(explicit: Option<&Path>) -> Result<EventhubSettings> {
    let path = settings_path(explicit);
    if explicit.is_some() && !path.exists() {
        return Err(SettingsError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }
    load_settings_from_path(&path)
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<EventhubSettings> {
    let mut settings = read_settings_file(path)?;
    apply_env_overrides(&mut settings);
    validate(&settings)?;
    Ok(settings)
}

/// Read and merge a settings file over defaults, without env overrides.
pub fn read_settings_file(path: &Path) -> Result<EventhubSettings> {
    let defaults = serde_json::to_value(EventhubSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply process environment overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut EventhubSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// `PORT`, `HOST` and `DATABASE_URL` are the conventional names used by
/// container platforms; the rest are prefixed with `EVENTHUB_`. Invalid
/// values are ignored with a warning.
pub fn apply_overrides<F>(settings: &mut EventhubSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = get("PORT").and_then(|v| parsed("PORT", &v, parse_u16_range(&v, 1, 65535))) {
        settings.server.port = v;
    }
    if let Some(v) = get("HOST") {
        settings.server.host = v;
    }

    // ── Database ────────────────────────────────────────────────────
    if let Some(v) = get("DATABASE_URL") {
        settings.database.url = v;
    }
    if let Some(v) = get("EVENTHUB_POOL_SIZE")
        .and_then(|v| parsed("EVENTHUB_POOL_SIZE", &v, parse_u32_range(&v, 1, 1024)))
    {
        settings.database.pool_size = v;
    }
    if let Some(v) = get("EVENTHUB_BUSY_TIMEOUT_MS")
        .and_then(|v| parsed("EVENTHUB_BUSY_TIMEOUT_MS", &v, parse_u32_range(&v, 0, 600_000)))
    {
        settings.database.busy_timeout_ms = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = get("EVENTHUB_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = get("EVENTHUB_LOG_FORMAT")
        .and_then(|v| parsed("EVENTHUB_LOG_FORMAT", &v, v.parse::<LogFormat>().ok()))
    {
        settings.logging.format = v;
    }
}

/// Reject settings the server cannot start with.
pub fn validate(settings: &EventhubSettings) -> Result<()> {
    if settings.database.pool_size == 0 {
        return Err(SettingsError::InvalidValue(
            "database.poolSize must be at least 1".to_string(),
        ));
    }
    if settings.database.connection_timeout_secs == 0 {
        return Err(SettingsError::InvalidValue(
            "database.connectionTimeoutSecs must be at least 1".to_string(),
        ));
    }
    if settings.database.url.trim().is_empty() {
        return Err(SettingsError::InvalidValue(
            "database.url must not be empty".to_string(),
        ));
    }
    Ok(())
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

fn parsed<T>(name: &str, raw: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        tracing::warn!(key = name, value = %raw, "invalid env var, ignoring");
    }
    value
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
