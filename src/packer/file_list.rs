//! Plain-text file lists.
//!
//! One relative path per line. Lines are trimmed; blank lines and lines
//! starting with `//` are ignored. Names are used both as source paths and as
//! archive entry names, so [`check_entry_name`] only admits plain relative
//! paths.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use crate::packer::error::{PackerError, PackerResult};

/// Parses a file list into a sorted set of unique names.
#[must_use]
pub fn parse_file_list(contents: &str) -> BTreeSet<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .map(|line| line.replace('\\', "/"))
        .collect()
}

/// Reads and parses the file list at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_file_list(path: &Path) -> PackerResult<BTreeSet<String>> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| PackerError::file_read(path, e))?;
    Ok(parse_file_list(&contents))
}

/// Checks that `name` is a relative path made of plain folder and file names.
///
/// # Errors
///
/// Returns [`PackerError::InvalidEntry`] for empty names, absolute paths,
/// drive prefixes, and `.` or `..` components.
pub fn check_entry_name(name: &str) -> PackerResult<()> {
    if name.is_empty() {
        return Err(PackerError::invalid_entry(name, "name is empty"));
    }
    // Components silently drops interior `.` segments, so check the raw text.
    if name.split('/').any(|segment| segment == "." || segment == "..") {
        return Err(PackerError::invalid_entry(
            name,
            "name must not contain '.' or '..' segments",
        ));
    }
    for component in Path::new(name).components() {
        if !matches!(component, Component::Normal(_)) {
            return Err(PackerError::invalid_entry(name, "name must be a relative path"));
        }
    }
    Ok(())
}
