//! Connections to the annotation server.
//!
//! A [`Connector`] opens one fresh stream per exchange. The stream is wrapped
//! in a [`Connection`] that speaks the line-oriented protocol:
//!
//! - Lines are UTF-8 and terminated by `\n` (a preceding `\r` is stripped on read)
//! - The server signals the end of a response by closing the stream

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::client::error::{ClientError, ClientResult};
use crate::config::ServerConfig;

/// Opens streams to an annotation server.
pub trait Connector: Send + Sync {
    /// Stream type produced by this connector.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Opens a new stream.
    fn connect(&self) -> impl Future<Output = ClientResult<Self::Stream>> + Send;
}

/// Connector opening TCP connections with a connect timeout.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    address: String,
    timeout: Duration,
}

impl TcpConnector {
    /// Creates a connector for `address` (`host:port`).
    #[must_use]
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }

    /// Creates a connector from the server section of the configuration.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.address.clone(), config.connect_timeout())
    }

    /// The server address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self) -> ClientResult<TcpStream> {
        tracing::debug!(address = %self.address, "Connecting to annotation server");

        match tokio::time::timeout(self.timeout, TcpStream::connect(self.address.as_str())).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(ClientError::Connect {
                address: self.address.clone(),
                source,
            }),
            Err(_) => Err(ClientError::Timeout {
                address: self.address.clone(),
                timeout: self.timeout,
            }),
        }
    }
}

/// A single open exchange with the server.
pub struct Connection<S> {
    stream: BufReader<S>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an open stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// Writes the request lines and flushes them.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub async fn send(&mut self, lines: &[&str]) -> io::Result<()> {
        for line in lines {
            debug_assert!(
                !line.contains('\n'),
                "request lines must not contain embedded newlines"
            );
            tracing::trace!(line, "Sending request line");
            self.stream.write_all(line.as_bytes()).await?;
            self.stream.write_all(b"\n").await?;
        }
        self.stream.flush().await
    }

    /// Reads the next response line.
    ///
    /// Returns `None` once the server has closed the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the line is not valid UTF-8.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let bytes_read = self.stream.read_line(&mut line).await?;

        if bytes_read == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }

    /// Shuts the stream down.
    ///
    /// Failures are logged and otherwise ignored: the exchange outcome is
    /// already decided when the connection is released.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(error = %e, "Error while closing connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_line_strips_terminators() {
        let mock = tokio_test::io::Builder::new()
            .read(b"first\r\nsecond\nlast")
            .build();
        let mut connection = Connection::new(mock);

        assert_eq!(connection.read_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(connection.read_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(connection.read_line().await.unwrap().as_deref(), Some("last"));
        assert_eq!(connection.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn send_terminates_each_line() {
        let mock = tokio_test::io::Builder::new()
            .write(b"GET_ANNOTATIONS\ntaxonomicName\n\n")
            .build();
        let mut connection = Connection::new(mock);

        connection
            .send(&["GET_ANNOTATIONS", "taxonomicName", ""])
            .await
            .unwrap();
        connection.close().await;
    }

    #[tokio::test]
    async fn refused_connection_is_a_connect_error() {
        // Bind then drop a listener so the port is very likely closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let connector = TcpConnector::new(address.clone(), Duration::from_secs(2));
        let err = connector.connect().await.unwrap_err();
        assert!(
            matches!(err, ClientError::Connect { address: ref a, .. } if *a == address)
                || matches!(err, ClientError::Timeout { .. })
        );
    }
}
