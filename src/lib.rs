//! annotation-gateway: client for annotation table servers and document
//! gateway packaging.
//!
//! # Architecture
//!
//! Two independent parts share the configuration and error conventions:
//!
//! - **Annotation client**: one request/response exchange per call against an
//!   annotation table server, parsing type lists and CSV annotation payloads
//! - **Packer**: assembles the document gateway zip archive from the core
//!   file list, a configuration's files, and the special files
//!
//! # Modules
//!
//! - [`annotation`] — Annotation data model and tokenizer
//! - [`client`] — Annotation server client and wire protocol
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Configuration error types
//! - [`packer`] — Gateway archive packaging

pub mod annotation;
pub mod client;
pub mod config;
pub mod error;
pub mod packer;
