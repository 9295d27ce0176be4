//! Error types for archive packaging.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for packaging operations.
pub type PackerResult<T> = Result<T, PackerError>;

/// Errors that can occur while building the gateway archive.
#[derive(Debug, Error)]
pub enum PackerError {
    /// Failed to open or read a file.
    #[error("Failed to read file: {path}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to create or write a file.
    #[error("Failed to write file: {path}")]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The previous archive could not be moved out of the way.
    #[error("Failed to back up {from} as {to}")]
    Backup {
        /// Existing archive.
        from: PathBuf,
        /// Intended backup path.
        to: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The zip writer rejected an operation.
    #[error("Failed to write archive entry '{entry}'")]
    Archive {
        /// Entry being written.
        entry: String,
        /// Underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// A file list names something other than a relative path below its folder.
    #[error("Invalid file list entry '{name}': {message}")]
    InvalidEntry {
        /// The listed name.
        name: String,
        /// Why it was rejected.
        message: &'static str,
    },

    /// The configuration file list could not be determined.
    #[error("Cannot resolve configuration '{configuration}': {message}")]
    Resolve {
        /// Configuration name.
        configuration: String,
        /// Description of what's wrong.
        message: String,
    },
}

impl PackerError {
    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates an archive error.
    pub fn archive(entry: impl Into<String>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            entry: entry.into(),
            source,
        }
    }

    /// Creates an invalid entry error.
    pub fn invalid_entry(name: impl Into<String>, message: &'static str) -> Self {
        Self::InvalidEntry {
            name: name.into(),
            message,
        }
    }

    /// Creates a resolve error.
    pub fn resolve(configuration: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolve {
            configuration: configuration.into(),
            message: message.into(),
        }
    }
}
