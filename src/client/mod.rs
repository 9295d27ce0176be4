//! Client for annotation table servers.
//!
//! The server hosts flat lists of annotations, one list per annotation type.
//! Each call performs one request/response exchange over its own connection:
//!
//! ```text
//! client                              server
//!   │ GET_ANNOTATIONS                   │
//!   │ taxonomicName                     │
//!   │ <predicate or empty line>         │
//!   │──────────────────────────────────▶│
//!   │                   GET_ANNOTATIONS │  (or an error message)
//!   │          "value","rank",...       │
//!   │          "Apis mellifera",...     │
//!   │                                   │  (blank line ends a block)
//!   │◀──────────────────────────────────│  (EOF ends the response)
//! ```

pub mod connection;
pub mod error;
pub mod protocol;
pub mod response;
pub mod store;

pub use connection::{Connection, Connector, TcpConnector};
pub use error::{ClientError, ClientResult};
pub use protocol::{GET_ANNOTATIONS, GET_ANNOTATION_TYPES};
pub use response::AnnotationReader;
pub use store::AnnotationStoreClient;
