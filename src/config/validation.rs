//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate required values (service name) and address formats
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Building a logger only requires a service name; the stricter checks apply
//!   to config files

use std::net::SocketAddr;

use crate::config::schema::{AppConfig, LoggerConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("logger.service cannot be empty")]
    EmptyService,

    #[error("logger.tags contains an empty key")]
    EmptyTagKey,

    #[error("server.bind_address is not a socket address: {0}")]
    InvalidBindAddress(String),

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Checks required to construct a logger.
pub fn validate_logger(config: &LoggerConfig) -> Result<(), Vec<ValidationError>> {
    if config.service.is_empty() {
        return Err(vec![ValidationError::EmptyService]);
    }
    Ok(())
}

/// Validate a whole application config.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if config.logger.service.is_empty() {
        errors.push(ValidationError::EmptyService);
    }
    if let Some(tags) = &config.logger.tags {
        if tags.keys().any(|k| k.is_empty()) {
            errors.push(ValidationError::EmptyTagKey);
        }
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.server.bind_address.clone(),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
