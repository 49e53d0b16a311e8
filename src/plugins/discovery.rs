//! Startup scan for directories that hold native libraries

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::PluginManager;
use crate::error::PluginError;

/// Walk `root` and collect every directory containing a file with the given
/// extension, plus `root` itself
///
/// The extension is compared case-insensitively and may be given with or
/// without a leading dot. Symlinks are not followed. Entries that cannot be
/// read are skipped.
///
/// # Errors
/// Returns [`PluginError::ScanRootMissing`] if `root` is not a directory.
pub fn discover_library_dirs(root: &Path, extension: &str) -> Result<BTreeSet<PathBuf>, PluginError> {
    if !root.is_dir() {
        return Err(PluginError::ScanRootMissing {
            path: root.to_path_buf(),
        });
    }

    let extension = extension.trim_start_matches('.');
    let mut dirs = BTreeSet::new();
    dirs.insert(root.to_path_buf());

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            if let Some(parent) = entry.path().parent() {
                dirs.insert(parent.to_path_buf());
            }
        }
    }

    Ok(dirs)
}

/// Scan `root` and register every discovered directory with `manager`
///
/// Returns the number of directories handed to the manager; zero when the
/// scan root is missing.
pub fn register_discovered(manager: &mut PluginManager, root: &Path, extension: &str) -> usize {
    let dirs = match discover_library_dirs(root, extension) {
        Ok(dirs) => dirs,
        Err(e) => {
            warn!(error = %e, "Library scan skipped");
            return 0;
        }
    };

    info!(root = %root.display(), count = dirs.len(), "Registering discovered library directories");
    for dir in &dirs {
        manager.add_search_path(dir);
    }
    dirs.len()
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
