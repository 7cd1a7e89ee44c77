//! Per-request field accumulator.
//!
//! An entry collects fields over the lifetime of one unit of work and emits
//! through its owning [`Logger`]. Root fields and path fields are kept in
//! separate maps, so the same key may be set in both without interference.

use serde_json::Value;

use super::field::{Field, Fields};
use super::level::Level;
use super::logger::Logger;

/// Which namespace a field is read from or written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Nested under the entry's path at emission time.
    #[default]
    Path,
    /// Emitted at the top level of the record.
    Root,
}

#[derive(Debug)]
pub struct LogEntry {
    logger: Logger,
    path: String,
    root_fields: Fields,
    path_fields: Fields,
}

impl LogEntry {
    pub(crate) fn new(logger: Logger, path: &str) -> Self {
        Self {
            logger,
            path: path.to_string(),
            root_fields: Fields::new(),
            path_fields: Fields::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn fields(&self, scope: Scope) -> &Fields {
        match scope {
            Scope::Path => &self.path_fields,
            Scope::Root => &self.root_fields,
        }
    }

    pub fn set_in(&mut self, scope: Scope, key: impl Into<String>, value: impl Into<Value>) {
        let map = match scope {
            Scope::Path => &mut self.path_fields,
            Scope::Root => &mut self.root_fields,
        };
        map.insert(key.into(), value.into());
    }

    pub fn get_in(&self, scope: Scope, key: &str) -> Option<&Value> {
        self.fields(scope).get(key)
    }

    /// Set a path-scoped field.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.set_in(Scope::Path, key, value);
    }

    /// Set a root-scoped field.
    pub fn set_root(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.set_in(Scope::Root, key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.get_in(Scope::Path, key)
    }

    pub fn get_root(&self, key: &str) -> Option<&Value> {
        self.get_in(Scope::Root, key)
    }

    /// Emit a record. Stored path fields go first as single-key fields, then
    /// `fields`, so call-time values win and stored error objects are still
    /// classified.
    pub fn log(&self, level: Level, message: &str, fields: Vec<Field>) {
        let mut sequence: Vec<Field> = self
            .path_fields
            .iter()
            .map(|(k, v)| stored_field(k, v))
            .collect();
        sequence.extend(fields);
        self.logger
            .write(level, message, &self.root_fields, sequence, &self.path);
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

/// A stored value becomes a one-key bag, unless it is itself error-shaped.
fn stored_field(key: &str, value: &Value) -> Field {
    match Field::from(value.clone()) {
        failure @ Field::Failure(_) => failure,
        Field::Bag(_) => Field::kv(key, value.clone()),
    }
}
