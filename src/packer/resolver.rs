//! Resolution of configuration-specific file lists.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::config::LOCAL_MASTER_CONFIGURATION;
use crate::packer::error::{PackerError, PackerResult};
use crate::packer::file_list::read_file_list;

/// Folder holding the named configurations, relative to the project root.
pub const CONFIGURATIONS_DIR: &str = "Configurations";

/// File listing the files of a configuration.
pub const CONFIGURATION_FILE_LIST: &str = "files.txt";

/// Files of one configuration, relative to `source_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationFiles {
    /// Folder the files are read from.
    pub source_dir: PathBuf,
    /// Relative file names, `/` separated.
    pub files: Vec<String>,
}

/// Determines which files belong to a configuration.
pub trait ConfigurationResolver {
    /// Resolves the files of `configuration` below the project `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not exist or its files
    /// cannot be listed.
    fn resolve(&self, root: &Path, configuration: &str) -> PackerResult<ConfigurationFiles>;
}

/// Resolver backed by the `Configurations/` folder layout.
///
/// A named configuration lives in `Configurations/<name>/`; the local master
/// configuration lives in the project root. The files are taken from
/// `files.txt` in that folder. Named configurations without a `files.txt`
/// contribute every file below their folder.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderResolver;

impl ConfigurationResolver for FolderResolver {
    fn resolve(&self, root: &Path, configuration: &str) -> PackerResult<ConfigurationFiles> {
        let local_master = configuration == LOCAL_MASTER_CONFIGURATION;
        let source_dir = if local_master {
            root.to_path_buf()
        } else {
            check_configuration_name(configuration)?;
            root.join(CONFIGURATIONS_DIR).join(configuration)
        };

        if !source_dir.is_dir() {
            return Err(PackerError::resolve(
                configuration,
                format!("folder {} does not exist", source_dir.display()),
            ));
        }

        let list_path = source_dir.join(CONFIGURATION_FILE_LIST);
        let files = if list_path.is_file() {
            read_file_list(&list_path)?.into_iter().collect()
        } else if local_master {
            tracing::warn!(
                path = %list_path.display(),
                "Local master configuration has no file list, packaging core files only"
            );
            Vec::new()
        } else {
            list_folder(&source_dir, configuration)?
        };

        tracing::debug!(configuration, count = files.len(), "Resolved configuration files");
        Ok(ConfigurationFiles { source_dir, files })
    }
}

fn check_configuration_name(configuration: &str) -> PackerResult<()> {
    let mut components = Path::new(configuration).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(PackerError::resolve(
            configuration,
            "name must be a single folder name",
        )),
    }
}

/// Lists every regular file below `dir`, relative to it and `/` separated.
fn list_folder(dir: &Path, configuration: &str) -> PackerResult<Vec<String>> {
    let dir_str = dir.to_str().ok_or_else(|| {
        PackerError::resolve(configuration, "folder path is not valid UTF-8")
    })?;
    let pattern = format!("{}/**/*", glob::Pattern::escape(dir_str));

    let paths = glob::glob(&pattern)
        .map_err(|e| PackerError::resolve(configuration, format!("invalid folder pattern: {e}")))?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| {
            let source = io::Error::new(e.error().kind(), e.error().to_string());
            PackerError::file_read(e.path(), source)
        })?;
        if !path.is_file() {
            continue;
        }
        let Ok(relative) = path.strip_prefix(dir) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(name);
    }
    files.sort();
    Ok(files)
}
