//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so a settings
//! file may be partial: missing fields take their compiled default.

use serde::{Deserialize, Serialize};

/// Root settings type for the eventhub server.
///
/// ```json
/// {
///   "server": { "port": 8080 },
///   "database": { "url": "sqlite://data/eventhub.db", "poolSize": 8 },
///   "logging": { "level": "debug", "format": "json" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventhubSettings {
    /// HTTP listener settings.
    pub server: ServerSettings,
    /// Relational store settings.
    pub database: DatabaseSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Listening port.
    pub port: u16,
    /// Seconds to wait for in-flight requests during shutdown.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            shutdown_timeout_secs: 30,
        }
    }
}

/// Relational store settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Connection string: a path, `sqlite://path`, `sqlite:path` or `:memory:`.
    pub url: String,
    /// Maximum number of pooled connections.
    pub pool_size: u32,
    /// `SQLite` busy timeout applied to each connection.
    pub busy_timeout_ms: u32,
    /// How long a request waits for a free pooled connection.
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "eventhub.db".to_string(),
            pool_size: 16,
            busy_timeout_ms: 5_000,
            connection_timeout_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = EventhubSettings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.database.url, "eventhub.db");
        assert_eq!(settings.database.pool_size, 16);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{"server": {"port": 8080}, "database": {"poolSize": 4}}"#;
        let settings: EventhubSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.database.pool_size, 4);
        assert_eq!(settings.database.busy_timeout_ms, 5_000);
    }

    #[test]
    fn camel_case_wire_format() {
        let value = serde_json::to_value(EventhubSettings::default()).unwrap();
        assert!(value["database"].get("poolSize").is_some());
        assert!(value["database"].get("busyTimeoutMs").is_some());
        assert!(value["server"].get("shutdownTimeoutSecs").is_some());
        assert_eq!(value["logging"]["format"], "pretty");
    }

    #[test]
    fn log_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
