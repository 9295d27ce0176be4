//! Wire protocol of the annotation table server.
//!
//! One exchange per connection:
//!
//! - Request: the command token on its own line, followed by one line per
//!   parameter.
//! - Response: a first line that either repeats the command token (success)
//!   or carries an error message, followed by the payload up to end of stream.

use crate::client::error::{ClientError, ClientResult};

/// Command listing the annotation types the server hosts.
pub const GET_ANNOTATION_TYPES: &str = "GET_ANNOTATION_TYPES";

/// Command fetching the annotations of one type.
pub const GET_ANNOTATIONS: &str = "GET_ANNOTATIONS";

/// Quote character of the CSV payload.
pub const CSV_QUOTE: u8 = b'"';

/// Checks the first response line against the command sentinel.
///
/// # Errors
///
/// Returns [`ClientError::Server`] carrying the line verbatim if it differs
/// from `command`, or [`ClientError::UnexpectedEof`] if there was no line.
pub fn expect_sentinel(command: &'static str, first_line: Option<String>) -> ClientResult<()> {
    match first_line {
        Some(line) if line == command => Ok(()),
        Some(line) => Err(ClientError::server(line)),
        None => Err(ClientError::UnexpectedEof { command }),
    }
}

/// Ensures `value` fits on a single request line.
///
/// # Errors
///
/// Returns [`ClientError::InvalidParameter`] if `value` contains a line break.
pub fn check_single_line(name: &'static str, value: &str) -> ClientResult<()> {
    if value.contains(['\n', '\r']) {
        return Err(ClientError::invalid_parameter(
            name,
            "must not contain line breaks",
        ));
    }
    Ok(())
}
