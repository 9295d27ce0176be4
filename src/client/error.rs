//! Error types for annotation server exchanges.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to an annotation server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The connection could not be established.
    #[error("Failed to connect to {address}")]
    Connect {
        /// Server address.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The connection attempt did not finish in time.
    #[error("Timed out connecting to {address} after {timeout:?}")]
    Timeout {
        /// Server address.
        address: String,
        /// Configured connect timeout.
        timeout: Duration,
    },

    /// Reading or writing on an open connection failed.
    #[error("I/O error during exchange: {0}")]
    Io(#[from] io::Error),

    /// The server answered with something other than the command sentinel.
    ///
    /// The message is the first response line, verbatim.
    #[error("{message}")]
    Server {
        /// First response line.
        message: String,
    },

    /// The server closed the connection without sending a response line.
    #[error("Server closed the connection before answering {command}")]
    UnexpectedEof {
        /// Command that went unanswered.
        command: &'static str,
    },

    /// A request parameter cannot be sent on the wire.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of what's wrong.
        message: String,
    },

    /// The tabular payload could not be parsed.
    #[error("Malformed annotation data: {0}")]
    Csv(#[from] csv::Error),
}

impl ClientError {
    /// Creates a server error from the first response line.
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}
