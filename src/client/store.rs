//! Client for annotation table servers.
//!
//! Every call opens its own connection, performs exactly one exchange and
//! releases the connection before returning, whether the exchange succeeded
//! or not. Nothing is retried.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::annotation::Annotation;
use crate::client::connection::{Connection, Connector, TcpConnector};
use crate::client::error::{ClientError, ClientResult};
use crate::client::protocol::{
    check_single_line, expect_sentinel, GET_ANNOTATIONS, GET_ANNOTATION_TYPES,
};
use crate::client::response::AnnotationReader;
use crate::config::ServerConfig;

/// Client for the annotation lists hosted by an annotation table server.
#[derive(Debug, Clone)]
pub struct AnnotationStoreClient<C> {
    connector: C,
    csv_delimiter: u8,
}

impl AnnotationStoreClient<TcpConnector> {
    /// Creates a TCP client from the server section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidParameter`] if the configured CSV
    /// delimiter cannot separate fields (see [`ServerConfig::csv_delimiter_byte`]).
    pub fn from_config(config: &ServerConfig) -> ClientResult<Self> {
        let delimiter = config.csv_delimiter_byte().ok_or_else(|| {
            ClientError::invalid_parameter(
                "csv_delimiter",
                format!(
                    "{:?} is not an ASCII character other than a quote or line break",
                    config.csv_delimiter
                ),
            )
        })?;
        Ok(Self::new(TcpConnector::from_config(config)).with_csv_delimiter(delimiter))
    }
}

impl<C: Connector> AnnotationStoreClient<C> {
    /// Creates a client using `connector`, with `,` as CSV delimiter.
    #[must_use]
    pub const fn new(connector: C) -> Self {
        Self {
            connector,
            csv_delimiter: b',',
        }
    }

    /// Sets the field delimiter of the CSV payload.
    #[must_use]
    pub const fn with_csv_delimiter(mut self, delimiter: u8) -> Self {
        self.csv_delimiter = delimiter;
        self
    }

    /// Lists the annotation types the server provides.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails, the server answers with an
    /// error line, or the stream ends before the sentinel.
    pub async fn list_annotation_types(&self) -> ClientResult<Vec<String>> {
        let mut connection = self.open().await?;
        let result = read_annotation_types(&mut connection).await;
        connection.close().await;

        if let Ok(ref types) = result {
            tracing::info!(count = types.len(), "Retrieved annotation types");
        }
        result
    }

    /// Fetches all annotations of `annotation_type`.
    ///
    /// `predicate` is a GPath filter expression evaluated by the server; `None`
    /// fetches everything. Invalid predicates are reported by the server and
    /// surface as [`ClientError::Server`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidParameter`] without connecting if the
    /// type is empty or either parameter spans several lines. Otherwise
    /// returns an error if the connection fails, the server answers with an
    /// error line, or the payload is malformed.
    pub async fn fetch_annotations(
        &self,
        annotation_type: &str,
        predicate: Option<&str>,
    ) -> ClientResult<Vec<Annotation>> {
        if annotation_type.is_empty() {
            return Err(ClientError::invalid_parameter(
                "annotation_type",
                "must not be empty",
            ));
        }
        check_single_line("annotation_type", annotation_type)?;
        let predicate = predicate.map(str::trim).unwrap_or_default();
        check_single_line("predicate", predicate)?;

        let mut connection = self.open().await?;
        let result = read_annotations(
            &mut connection,
            annotation_type,
            predicate,
            self.csv_delimiter,
        )
        .await;
        connection.close().await;

        if let Ok(ref annotations) = result {
            tracing::info!(
                annotation_type,
                count = annotations.len(),
                "Retrieved annotations"
            );
        }
        result
    }

    async fn open(&self) -> ClientResult<Connection<C::Stream>> {
        let stream = self.connector.connect().await?;
        Ok(Connection::new(stream))
    }
}

async fn read_annotation_types<S>(connection: &mut Connection<S>) -> ClientResult<Vec<String>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    connection.send(&[GET_ANNOTATION_TYPES]).await?;
    expect_sentinel(GET_ANNOTATION_TYPES, connection.read_line().await?)?;

    let mut types = Vec::new();
    while let Some(line) = connection.read_line().await? {
        types.push(line);
    }
    Ok(types)
}

async fn read_annotations<S>(
    connection: &mut Connection<S>,
    annotation_type: &str,
    predicate: &str,
    delimiter: u8,
) -> ClientResult<Vec<Annotation>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    connection
        .send(&[GET_ANNOTATIONS, annotation_type, predicate])
        .await?;
    expect_sentinel(GET_ANNOTATIONS, connection.read_line().await?)?;

    let mut reader = AnnotationReader::new(annotation_type, delimiter);
    while let Some(line) = connection.read_line().await? {
        reader.push_line(&line)?;
    }
    reader.finish()
}
