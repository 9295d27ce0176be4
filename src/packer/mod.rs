//! Document gateway archive packaging.
//!
//! Builds `<output_dir>/<archive_name>` (by default `_Zips/DocumentGateway.zip`)
//! below the project root from:
//!
//! 1. The special files, read from `_DocumentGatewayPacker.<name>`
//! 2. The core files listed in `_DocumentGatewayPacker.cnfg`
//! 3. The files of the selected configuration, minus its bookkeeping files
//!
//! An archive left over from a previous run is renamed to
//! `<archive_name>.<unix millis>.old` first. The new archive is written to
//! `<archive_name>.partial` and only renamed into place once complete, so a
//! failed run never leaves a truncated archive under the final name.

pub mod error;
pub mod file_list;
pub mod resolver;

pub use error::{PackerError, PackerResult};
pub use file_list::{check_entry_name, parse_file_list, read_file_list};
pub use resolver::{ConfigurationFiles, ConfigurationResolver, FolderResolver};

use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::PackerConfig;

/// Core file list, relative to the project root.
pub const CORE_FILE_LIST: &str = "_DocumentGatewayPacker.cnfg";

/// Prefix of the local sources of the special files.
pub const SPECIAL_FILE_PREFIX: &str = "_DocumentGatewayPacker.";

/// Files packaged from `_DocumentGatewayPacker.<name>` instead of the lists.
pub const SPECIAL_FILES: [&str; 2] = ["Parameters.cnfg", "README.txt"];

/// Bookkeeping files of a configuration that never go into the archive.
pub const EXCLUDED_CONFIGURATION_FILES: [&str; 4] = [
    "files.txt",
    "configuration.xml",
    "timestamp.txt",
    "README.txt",
];

/// Outcome of a successful packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackReport {
    /// The archive written.
    pub archive: PathBuf,
    /// Where the previous archive was moved, if there was one.
    pub backup: Option<PathBuf>,
    /// Entry names in the order they were written.
    pub entries: Vec<String>,
}

/// Builds the document gateway archive for one configuration.
#[derive(Debug, Clone)]
pub struct Packer<R = FolderResolver> {
    root: PathBuf,
    configuration: String,
    output_dir: PathBuf,
    archive_name: String,
    resolver: R,
}

impl Packer<FolderResolver> {
    /// Creates a packer for the project at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: &PackerConfig) -> Self {
        Self {
            root: root.into(),
            configuration: config.configuration_name().to_string(),
            output_dir: config.output_dir.clone(),
            archive_name: config.archive_name.clone(),
            resolver: FolderResolver,
        }
    }
}

impl<R: ConfigurationResolver> Packer<R> {
    /// Replaces the configuration resolver.
    #[must_use]
    pub fn with_resolver<S: ConfigurationResolver>(self, resolver: S) -> Packer<S> {
        Packer {
            root: self.root,
            configuration: self.configuration,
            output_dir: self.output_dir,
            archive_name: self.archive_name,
            resolver,
        }
    }

    /// Selects the configuration to package.
    #[must_use]
    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = configuration.into();
        self
    }

    /// The configuration being packaged.
    #[must_use]
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    /// Path of the archive this packer writes.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.root.join(&self.output_dir).join(&self.archive_name)
    }

    /// Reads the core file list, without the special files.
    ///
    /// # Errors
    ///
    /// Returns an error if the core file list cannot be read.
    pub fn core_files(&self) -> PackerResult<BTreeSet<String>> {
        let mut files = read_file_list(&self.root.join(CORE_FILE_LIST))?;
        for special in SPECIAL_FILES {
            files.remove(special);
        }
        Ok(files)
    }

    /// Builds the archive.
    ///
    /// # Errors
    ///
    /// Returns an error if any input cannot be read, the configuration cannot
    /// be resolved, the previous archive cannot be backed up, or the archive
    /// cannot be written.
    pub fn pack(&self) -> PackerResult<PackReport> {
        tracing::info!(
            root = %self.root.display(),
            configuration = %self.configuration,
            "Packaging document gateway"
        );

        let core_files = self.core_files()?;
        let mut configuration = self.resolver.resolve(&self.root, &self.configuration)?;
        configuration
            .files
            .retain(|name| !EXCLUDED_CONFIGURATION_FILES.contains(&name.as_str()));
        for name in core_files.iter().chain(&configuration.files) {
            check_entry_name(name)?;
        }

        let archive = self.archive_path();
        let backup = backup_existing(&archive)?;
        if let Some(parent) = archive.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PackerError::file_write(parent, e))?;
        }

        let (partial, file) = PartialArchive::create(&archive)?;
        let mut writer = ArchiveWriter::new(file);

        for special in SPECIAL_FILES {
            let source = self.root.join(format!("{SPECIAL_FILE_PREFIX}{special}"));
            writer.add(&source, special)?;
        }
        for name in &core_files {
            writer.add(&self.root.join(name), name)?;
        }
        for name in &configuration.files {
            writer.add(&configuration.source_dir.join(name), name)?;
        }

        let entries = writer.finish()?;
        partial.commit(&archive)?;
        tracing::info!(
            archive = %archive.display(),
            entries = entries.len(),
            "Document gateway archive created"
        );

        Ok(PackReport {
            archive,
            backup,
            entries,
        })
    }
}

/// Renames an existing archive to `<name>.<unix millis>.old`.
fn backup_existing(archive: &Path) -> PackerResult<Option<PathBuf>> {
    if !archive.exists() {
        return Ok(None);
    }

    let file_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let millis = chrono::Utc::now().timestamp_millis();
    let backup = archive.with_file_name(format!("{file_name}.{millis}.old"));

    std::fs::rename(archive, &backup).map_err(|source| PackerError::Backup {
        from: archive.to_path_buf(),
        to: backup.clone(),
        source,
    })?;

    tracing::info!(backup = %backup.display(), "Previous archive backed up");
    Ok(Some(backup))
}

/// Archive under construction at `<archive>.partial`.
///
/// Removed on drop unless [`Self::commit`] moved it into place.
struct PartialArchive {
    path: PathBuf,
    committed: bool,
}

impl PartialArchive {
    fn create(archive: &Path) -> PackerResult<(Self, File)> {
        let mut name = archive.as_os_str().to_owned();
        name.push(".partial");
        let path = PathBuf::from(name);
        let file = File::create(&path).map_err(|e| PackerError::file_write(&path, e))?;
        Ok((
            Self {
                path,
                committed: false,
            },
            file,
        ))
    }

    /// Moves the finished archive to `archive`. The file must be closed.
    fn commit(mut self, archive: &Path) -> PackerResult<()> {
        std::fs::rename(&self.path, archive).map_err(|e| PackerError::file_write(archive, e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartialArchive {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed partial archive"),
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove partial archive"
            ),
        }
    }
}

/// Zip writer that writes each entry name at most once.
struct ArchiveWriter {
    zip: ZipWriter<File>,
    options: SimpleFileOptions,
    written: HashSet<String>,
    entries: Vec<String>,
}

impl ArchiveWriter {
    fn new(file: File) -> Self {
        Self {
            zip: ZipWriter::new(file),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            written: HashSet::new(),
            entries: Vec::new(),
        }
    }

    fn add(&mut self, source: &Path, name: &str) -> PackerResult<()> {
        if !self.written.insert(name.to_string()) {
            tracing::debug!(entry = name, "Skipping duplicate entry");
            return Ok(());
        }

        let mut input = File::open(source).map_err(|e| PackerError::file_read(source, e))?;
        self.zip
            .start_file(name, self.options)
            .map_err(|e| PackerError::archive(name, e))?;
        io::copy(&mut input, &mut self.zip).map_err(|e| PackerError::file_read(source, e))?;

        tracing::debug!(entry = name, "Added archive entry");
        self.entries.push(name.to_string());
        Ok(())
    }

    /// Writes the central directory and closes the output.
    fn finish(self) -> PackerResult<Vec<String>> {
        let output = self
            .zip
            .finish()
            .map_err(|e| PackerError::archive("<central directory>", e))?;
        drop(output);
        Ok(self.entries)
    }
}
