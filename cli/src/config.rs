use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use todo_core::ClientConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Settings for the `todos` binary.
///
/// ```toml
/// base_url = "https://jsonplaceholder.typicode.com"
/// timeout_secs = 10
/// refresh_every_secs = 30
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub client: ClientConfig,
    /// Keep running and refresh on this period. `None` means load once.
    pub refresh_every_secs: Option<u64>,
}

impl CliConfig {
    /// Loads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: CliConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Checks:
    /// - the base URL is http(s)
    /// - neither the timeout nor the refresh period is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.client.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                message: format!("base_url must start with http:// or https://, got '{url}'"),
            });
        }
        if self.client.timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.refresh_every_secs == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "refresh_every_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn refresh_every(&self) -> Option<Duration> {
        self.refresh_every_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use todo_core::config::DEFAULT_BASE_URL;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_all_fields() {
        let file = write_config(
            r#"
            base_url = "http://127.0.0.1:3000"
            timeout_secs = 5
            refresh_every_secs = 30
            "#,
        );
        let config = CliConfig::load(file.path()).unwrap();
        assert_eq!(config.client.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.client.timeout_secs, Some(5));
        assert_eq!(config.refresh_every(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let file = write_config("");
        let config = CliConfig::load(file.path()).unwrap();
        assert_eq!(config.client.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.client.timeout_secs, None);
        assert_eq!(config.refresh_every(), None);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = CliConfig::load(Path::new("/nonexistent/todos.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let file = write_config("base_url = ");
        let err = CliConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let file = write_config(r#"base_url = "ftp://example.com""#);
        let err = CliConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn zero_periods_are_rejected() {
        let mut config = CliConfig::default();
        config.client.timeout_secs = Some(0);
        assert!(config.validate().is_err());

        let mut config = CliConfig::default();
        config.refresh_every_secs = Some(0);
        assert!(config.validate().is_err());
    }
}
