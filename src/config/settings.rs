//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Name of the configuration whose files live directly in the project root.
pub const LOCAL_MASTER_CONFIGURATION: &str = "Local Master Configuration";

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Annotation server connection settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Packaging settings.
    #[serde(default)]
    pub packer: PackerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.connect_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "server.connect_timeout_secs",
                "must be greater than zero",
            ));
        }

        if self.server.csv_delimiter_byte().is_none() {
            return Err(ConfigError::invalid(
                "server.csv_delimiter",
                format!(
                    "{:?} is not usable; expected an ASCII character other than a quote or line break",
                    self.server.csv_delimiter
                ),
            ));
        }

        if self.packer.archive_name.trim().is_empty() {
            return Err(ConfigError::invalid(
                "packer.archive_name",
                "must not be empty",
            ));
        }

        Ok(())
    }
}

/// Annotation server connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Server address as `host:port`.
    #[serde(default = "default_address")]
    pub address: String,

    /// Seconds to wait for a connection before giving up.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Field delimiter of the CSV payload.
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: char,
}

impl ServerConfig {
    /// Connect timeout as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// CSV delimiter as a byte.
    ///
    /// `None` if the delimiter is not ASCII, or is the quote character or a
    /// line break, none of which can separate fields.
    #[must_use]
    pub fn csv_delimiter_byte(&self) -> Option<u8> {
        u8::try_from(self.csv_delimiter)
            .ok()
            .filter(|b| b.is_ascii() && !matches!(b, b'"' | b'\r' | b'\n'))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            connect_timeout_secs: default_connect_timeout(),
            csv_delimiter: default_csv_delimiter(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:15808".to_string()
}

const fn default_connect_timeout() -> u64 {
    10
}

const fn default_csv_delimiter() -> char {
    ','
}

/// Packaging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackerConfig {
    /// Configuration to package. `None` selects the local master configuration.
    #[serde(default)]
    pub configuration: Option<String>,

    /// File name of the archive.
    #[serde(default = "default_archive_name")]
    pub archive_name: String,

    /// Folder (relative to the project root) receiving the archive.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl PackerConfig {
    /// The configuration to package, falling back to the local master one.
    #[must_use]
    pub fn configuration_name(&self) -> &str {
        self.configuration
            .as_deref()
            .unwrap_or(LOCAL_MASTER_CONFIGURATION)
    }
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            configuration: None,
            archive_name: default_archive_name(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_archive_name() -> String {
    "DocumentGateway.zip".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("_Zips")
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.address, "127.0.0.1:15808");
        assert_eq!(config.packer.configuration_name(), LOCAL_MASTER_CONFIGURATION);
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "server": {
                "address": "annotations.example.org:15808",
                "connect_timeout_secs": 3,
                "csv_delimiter": ";"
            },
            "packer": {
                "configuration": "Plazi",
                "archive_name": "Gateway.zip",
                "output_dir": "dist"
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.address, "annotations.example.org:15808");
        assert_eq!(config.server.connect_timeout(), Duration::from_secs(3));
        assert_eq!(config.server.csv_delimiter_byte(), Some(b';'));
        assert_eq!(config.packer.configuration_name(), "Plazi");
        assert_eq!(config.packer.archive_name, "Gateway.zip");
        assert_eq!(config.packer.output_dir, PathBuf::from("dist"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.csv_delimiter, ',');
    }

    #[test]
    fn packer_config_defaults() {
        let config = PackerConfig::default();
        assert_eq!(config.archive_name, "DocumentGateway.zip");
        assert_eq!(config.output_dir, PathBuf::from("_Zips"));
        assert!(config.configuration.is_none());
    }

    #[test]
    fn logging_config_defaults() {
        assert_eq!(LoggingConfig::default().level, "warn");
    }

    #[test]
    fn reject_quote_delimiter() {
        let json = r#"{ "server": { "csv_delimiter": "\"" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "server.csv_delimiter", .. })
        ));
    }

    #[test]
    fn unusable_delimiters_have_no_byte() {
        for delimiter in ['§', 'é', '\u{2028}', '"', '\n'] {
            let config = ServerConfig {
                csv_delimiter: delimiter,
                ..ServerConfig::default()
            };
            assert_eq!(config.csv_delimiter_byte(), None, "{delimiter:?}");
        }
        let tab = ServerConfig {
            csv_delimiter: '\t',
            ..ServerConfig::default()
        };
        assert_eq!(tab.csv_delimiter_byte(), Some(b'\t'));
    }

    #[test]
    fn reject_non_ascii_delimiter() {
        let json = r#"{ "server": { "csv_delimiter": "§" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.csv_delimiter"));
    }

    #[test]
    fn reject_zero_timeout() {
        let json = r#"{ "server": { "connect_timeout_secs": 0 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_empty_archive_name() {
        let json = r#"{ "packer": { "archive_name": "  " } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
