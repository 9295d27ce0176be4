//! Error types for configuration handling.
//!
//! Client and packer errors live next to the code that raises them
//! ([`crate::client::ClientError`], [`crate::packer::PackerError`]).

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the JSON configuration file.
///
/// A missing *default* file is not an error (built-in defaults apply), so
/// [`ConfigError::Missing`] only concerns a file named with `--config`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file named with `--config` does not exist.
    #[error("configuration file given with --config does not exist: {path}")]
    Missing {
        /// Path as given on the command line.
        path: PathBuf,
    },

    /// The configuration file exists but could not be read.
    #[error("cannot read configuration file {path}")]
    Read {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON or does not match the configuration layout.
    #[error("invalid configuration file {path} (line {line}, column {column})")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Line of the offending JSON, 1-based.
        line: usize,
        /// Column of the offending JSON, 1-based.
        column: usize,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A setting holds a value the client or packer cannot use.
    #[error("invalid setting {field}: {message}")]
    Invalid {
        /// Dotted path of the setting, e.g. `server.csv_delimiter`.
        field: &'static str,
        /// Description of the accepted values.
        message: String,
    },
}

impl ConfigError {
    /// Creates a parse error, recording where in the file it occurred.
    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            line: source.line(),
            column: source.column(),
            source,
        }
    }

    /// Creates an invalid setting error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}
