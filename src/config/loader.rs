//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading and logger construction.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

impl ConfigError {
    /// Whether validation rejected an empty service name.
    pub fn is_empty_service(&self) -> bool {
        matches!(self, ConfigError::Validation(errors) if errors.contains(&ValidationError::EmptyService))
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), service = %config.logger.service, "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let config = parse_config("[logger]\nservice = \"svc\"\n").unwrap();
        assert_eq!(config.logger.service, "svc");
    }

    #[test]
    fn test_missing_service_fails_validation() {
        let err = parse_config("[logger]\njson = true\n").unwrap_err();
        assert!(err.is_empty_service());
        assert_eq!(
            err.to_string(),
            "Validation failed: logger.service cannot be empty"
        );
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[logger\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("reqlog-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[logger]\nservice = \"disk\"\nlevel = \"warn\"\n").unwrap();
        let config = load_config(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.logger.service, "disk");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
