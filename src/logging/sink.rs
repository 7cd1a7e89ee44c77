//! Record sinks.
//!
//! # Responsibilities
//! - Accept `(level, message, fields)` and render/ship it
//! - Filter records below the configured minimum level
//! - Serialize concurrent writes
//!
//! # Design Decisions
//! - JSON mode writes one object per line: `timestamp`, `level`, `message`, then fields
//! - Plain mode mirrors a `level: message {fields}` layout, colorized by level
//! - Writing never fails from the caller's point of view; IO errors are dropped

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use serde_json::Value;

use super::field::Fields;
use super::level::Level;

/// Destination for finished records.
pub trait Sink: Send + Sync {
    fn write(&self, level: Level, message: &str, fields: &Fields);
}

/// Rendering mode of a [`ConsoleSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Plain,
}

/// Writes records to stdout (or any writer).
pub struct ConsoleSink {
    minimum: Level,
    format: Format,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn stdout(minimum: Level, format: Format) -> Self {
        Self::with_writer(minimum, format, Box::new(io::stdout()))
    }

    pub fn with_writer(minimum: Level, format: Format, out: Box<dyn Write + Send>) -> Self {
        Self {
            minimum,
            format,
            out: Mutex::new(out),
        }
    }

    pub fn minimum(&self) -> Level {
        self.minimum
    }

    pub fn format(&self) -> Format {
        self.format
    }
}

impl Sink for ConsoleSink {
    fn write(&self, level: Level, message: &str, fields: &Fields) {
        if !level.enabled_at(self.minimum) {
            return;
        }
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let line = match self.format {
            Format::Json => render_json(&timestamp, level, message, fields),
            Format::Plain => render_plain(&timestamp, level, message, fields),
        };
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
}

fn render_json(timestamp: &str, level: Level, message: &str, fields: &Fields) -> String {
    let mut record = Fields::new();
    record.insert("timestamp".into(), Value::String(timestamp.to_string()));
    record.insert("level".into(), Value::String(level.as_str().to_string()));
    record.insert("message".into(), Value::String(message.to_string()));
    for (k, v) in fields {
        if !record.contains_key(k) {
            record.insert(k.clone(), v.clone());
        }
    }
    Value::Object(record).to_string()
}

fn render_plain(timestamp: &str, level: Level, message: &str, fields: &Fields) -> String {
    let label = match level {
        Level::Critical => level.as_str().red().bold(),
        Level::Error => level.as_str().red(),
        Level::Warn => level.as_str().yellow(),
        Level::Info => level.as_str().green(),
        Level::Debug => level.as_str().blue(),
    };
    let mut extra = fields.clone();
    extra.insert("timestamp".into(), Value::String(timestamp.to_string()));
    format!("{}: {} {}", label, message, Value::Object(extra))
}

/// Forwards records into `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn write(&self, level: Level, message: &str, fields: &Fields) {
        let fields = Value::Object(fields.clone());
        match level {
            Level::Critical | Level::Error => {
                tracing::error!(severity = level.as_str(), fields = %fields, "{}", message)
            }
            Level::Warn => tracing::warn!(severity = level.as_str(), fields = %fields, "{}", message),
            Level::Info => tracing::info!(severity = level.as_str(), fields = %fields, "{}", message),
            Level::Debug => {
                tracing::debug!(severity = level.as_str(), fields = %fields, "{}", message)
            }
        }
    }
}

/// A record captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRecord {
    pub level: Level,
    pub message: String,
    pub fields: Fields,
}

impl CapturedRecord {
    /// Look up a field by dotted path, e.g. `httpResponse.status`.
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }
}

/// Keeps records in memory; clones share the same buffer.
#[derive(Debug, Clone)]
pub struct MemorySink {
    minimum: Level,
    records: Arc<Mutex<Vec<CapturedRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::with_minimum(Level::Debug)
    }

    pub fn with_minimum(minimum: Level) -> Self {
        Self {
            minimum,
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for MemorySink {
    fn write(&self, level: Level, message: &str, fields: &Fields) {
        if !level.enabled_at(self.minimum) {
            return;
        }
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(CapturedRecord {
                level,
                message: message.to_string(),
                fields: fields.clone(),
            });
    }
}
