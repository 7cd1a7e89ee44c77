//! Service-wide logger.
//!
//! # Responsibilities
//! - Hold the immutable config, the base fields and the sink
//! - Assemble records from root fields, path fields and errors
//! - Hand out per-request [`LogEntry`] accumulators
//!
//! # Design Decisions
//! - Base fields sit underneath everything; explicit fields may shadow tags
//!   but `service` is always the configured service
//! - Empty path: path fields merge into the top level, root fields win on collision
//! - Named path: path fields nest under `record[path]`, omitted when empty;
//!   root fields are applied after the nested object
//! - `stacktrace`/`panic` are written last
//! - Records below `config.level` are dropped after error escalation, whatever
//!   the sink

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::entry::LogEntry;
use super::field::{attach_failure, classify, Classified, Field, Fields};
use super::level::Level;
use super::sink::{ConsoleSink, Format, Sink};
use crate::config::{validate_logger, ConfigError, LoggerConfig};

/// Namespace used for path fields when no path is given.
pub const DEFAULT_PATH: &str = "context";

const SERVICE_KEY: &str = "service";

/// Cheaply clonable handle to a configured logger.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

struct Inner {
    config: Arc<LoggerConfig>,
    base: Fields,
    sink: Arc<dyn Sink>,
}

impl Logger {
    /// Build a logger writing to stdout, JSON or plain per `config.json`.
    pub fn new(config: LoggerConfig) -> Result<Self, ConfigError> {
        let format = if config.is_json() {
            Format::Json
        } else {
            Format::Plain
        };
        let sink = ConsoleSink::stdout(config.min_level(), format);
        Self::with_sink(config, Arc::new(sink))
    }

    /// Build a logger around a custom sink. The configured minimum level still
    /// applies; the sink may filter further.
    pub fn with_sink(config: LoggerConfig, sink: Arc<dyn Sink>) -> Result<Self, ConfigError> {
        validate_logger(&config).map_err(ConfigError::Validation)?;

        let mut base = Fields::new();
        if !config.is_concise() {
            if let Some(tags) = &config.tags {
                base.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        base.insert(SERVICE_KEY.to_string(), Value::String(config.service.clone()));

        Ok(Self {
            inner: Arc::new(Inner {
                config: Arc::new(config),
                base,
                sink,
            }),
        })
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.inner.config
    }

    /// Shared handle to the config, for attaching to request context.
    pub fn shared_config(&self) -> Arc<LoggerConfig> {
        self.inner.config.clone()
    }

    /// Fields stamped on every record.
    pub fn base_fields(&self) -> &Fields {
        &self.inner.base
    }

    /// Start a new entry. `None` selects [`DEFAULT_PATH`], `Some("")` merges
    /// path fields into the top level.
    pub fn create_entry(&self, path: Option<&str>) -> LogEntry {
        LogEntry::new(self.clone(), path.unwrap_or(DEFAULT_PATH))
    }

    /// Core emission primitive.
    pub fn write(
        &self,
        level: Level,
        message: &str,
        root_fields: &Fields,
        path_fields: Vec<Field>,
        path: &str,
    ) {
        let (level, record) = self.assemble(level, root_fields, path_fields, path);
        if !level.enabled_at(self.inner.config.min_level()) {
            return;
        }
        self.inner.sink.write(level, message, &record);
    }

    fn assemble(
        &self,
        level: Level,
        root_fields: &Fields,
        path_fields: Vec<Field>,
        path: &str,
    ) -> (Level, Fields) {
        let Classified {
            level,
            meta: path_meta,
            failure,
        } = classify(level, path_fields);

        let mut record = self.inner.base.clone();
        if path.is_empty() {
            record.extend(path_meta);
        } else if !path_meta.is_empty() {
            record.insert(path.to_string(), Value::Object(path_meta));
        }
        record.extend(root_fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        record.insert(
            SERVICE_KEY.to_string(),
            Value::String(self.inner.config.service.clone()),
        );

        if let Some(failure) = &failure {
            attach_failure(&mut record, failure);
        }
        (level, record)
    }

    pub fn log(&self, level: Level, message: &str, fields: Vec<Field>) {
        self.write(level, message, &Fields::new(), fields, DEFAULT_PATH);
    }

    pub fn debug(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::Debug, message, fields);
    }

    pub fn info(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::Info, message, fields);
    }

    pub fn warn(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::Warn, message, fields);
    }

    pub fn error(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::Error, message, fields);
    }

    pub fn critical(&self, message: &str, fields: Vec<Field>) {
        self.log(Level::Critical, message, fields);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
