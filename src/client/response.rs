//! Parsing of annotation payloads.
//!
//! The payload of a `GET_ANNOTATIONS` response is a sequence of CSV blocks,
//! each starting with its own header row and ending with a blank line. Blocks
//! come from different server-side data files, so their columns may differ.

use crate::annotation::Annotation;
use crate::client::error::ClientResult;
use crate::client::protocol::CSV_QUOTE;

/// Incrementally turns response lines into annotations.
#[derive(Debug)]
pub struct AnnotationReader {
    annotation_type: String,
    delimiter: u8,
    block: String,
    annotations: Vec<Annotation>,
    dropped_rows: usize,
}

impl AnnotationReader {
    /// Creates a reader producing annotations of `annotation_type`.
    #[must_use]
    pub fn new(annotation_type: impl Into<String>, delimiter: u8) -> Self {
        Self {
            annotation_type: annotation_type.into(),
            delimiter,
            block: String::new(),
            annotations: Vec::new(),
            dropped_rows: 0,
        }
    }

    /// Feeds one response line (without terminator).
    ///
    /// # Errors
    ///
    /// Returns an error if a completed block is not valid CSV.
    pub fn push_line(&mut self, line: &str) -> ClientResult<()> {
        if line.is_empty() {
            return self.flush_block();
        }
        self.block.push_str(line);
        self.block.push('\n');
        Ok(())
    }

    /// Number of rows skipped so far for lacking a `value`.
    #[must_use]
    pub const fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Parses any trailing block and returns all annotations read.
    ///
    /// # Errors
    ///
    /// Returns an error if the trailing block is not valid CSV.
    pub fn finish(mut self) -> ClientResult<Vec<Annotation>> {
        self.flush_block()?;
        if self.dropped_rows > 0 {
            tracing::warn!(
                annotation_type = %self.annotation_type,
                dropped = self.dropped_rows,
                "Skipped rows without a value"
            );
        }
        Ok(self.annotations)
    }

    fn flush_block(&mut self) -> ClientResult<()> {
        let block = std::mem::take(&mut self.block);
        if block.is_empty() {
            return Ok(());
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(CSV_QUOTE)
            .has_headers(true)
            .flexible(true)
            .from_reader(block.as_bytes());

        let headers = reader.headers()?.clone();
        tracing::debug!(columns = headers.len(), "Parsing annotation block");

        for record in reader.records() {
            let record = record?;
            match Annotation::from_row(&self.annotation_type, headers.iter().zip(record.iter())) {
                Some(annotation) => self.annotations.push(annotation),
                None => self.dropped_rows += 1,
            }
        }

        Ok(())
    }
}
