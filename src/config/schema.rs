//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logging::{Fields, Level};

/// Root configuration for a service using the logger.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Logger settings.
    pub logger: LoggerConfig,

    /// HTTP server settings (used by the demo binary).
    pub server: ServerConfig,
}

/// Logger configuration. Immutable once a `Logger` is built from it.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggerConfig {
    /// Service name stamped on every record. Must not be empty.
    pub service: String,

    /// Minimum severity kept by the sink (default: info).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,

    /// Render records as JSON lines instead of colorized text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    /// Drop default tags and pack request facts into the message text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concise: Option<bool>,

    /// Static key/values added to every record unless `concise`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Fields>,
}

impl LoggerConfig {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = Some(json);
        self
    }

    pub fn with_concise(mut self, concise: bool) -> Self {
        self.concise = Some(concise);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.tags
            .get_or_insert_with(Fields::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn min_level(&self) -> Level {
        self.level.unwrap_or_default()
    }

    pub fn is_json(&self) -> bool {
        self.json == Some(true)
    }

    pub fn is_concise(&self) -> bool {
        self.concise == Some(true)
    }

    /// Inverse of `is_concise`: request/response bags are recorded.
    pub fn is_verbose(&self) -> bool {
        !self.is_concise()
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [logger]
            service = "example"
            "#,
        )
        .unwrap();
        assert_eq!(config.logger.service, "example");
        assert_eq!(config.logger.min_level(), Level::Info);
        assert!(!config.logger.is_json());
        assert!(config.logger.is_verbose());
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_full_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [logger]
            service = "example"
            level = "Debug"
            json = true
            concise = true

            [logger.tags]
            version = "v0.1"
            shard = 3

            [server]
            bind_address = "127.0.0.1:9000"
            request_timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.logger.level, Some(Level::Debug));
        assert!(config.logger.is_json());
        assert!(config.logger.is_concise());
        let tags = config.logger.tags.unwrap();
        assert_eq!(tags["version"], json!("v0.1"));
        assert_eq!(tags["shard"], json!(3));
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_level_rejected() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
            [logger]
            service = "example"
            level = "loud"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_builder() {
        let config = LoggerConfig::new("api")
            .with_level(Level::Warn)
            .with_concise(true)
            .with_tag("region", "eu");
        assert_eq!(config.min_level(), Level::Warn);
        assert!(config.is_concise());
        assert_eq!(config.tags.unwrap()["region"], json!("eu"));
    }
}
