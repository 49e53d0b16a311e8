//! Directories consulted when a bare library name is loaded
//!
//! The OS loaders differ in how a running process can extend their search
//! path: glibc reads `LD_LIBRARY_PATH` once at startup, so mutating it later
//! has no effect. The registry therefore resolves names itself by probing
//! each directory, and on Windows additionally hands every directory to
//! `AddDllDirectory` so dependent DLLs next to a plugin are found too.

use std::env::consts::{DLL_EXTENSION, DLL_PREFIX};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::PluginError;

/// Deduplicated set of library search directories, kept in insertion order
#[derive(Debug, Default)]
pub struct SearchPaths {
    dirs: Vec<PathBuf>,
    #[cfg(windows)]
    cookies: Vec<*mut std::ffi::c_void>,
}

impl SearchPaths {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `directory`; invalid directories are logged and ignored
    pub fn add<P: AsRef<Path>>(&mut self, directory: P) {
        let directory = directory.as_ref();
        match self.try_add(directory) {
            Ok(true) => info!(path = %directory.display(), "Added library search path"),
            Ok(false) => debug!(path = %directory.display(), "Search path already registered"),
            Err(e) => warn!(error = %e, "Ignoring library search path"),
        }
    }

    /// Register `directory`, returning whether it was newly added
    ///
    /// # Errors
    /// Returns [`PluginError::SearchPathInvalid`] if the path is not an
    /// existing directory, or [`PluginError::SearchPathRejected`] if the
    /// system loader refused it.
    pub fn try_add<P: AsRef<Path>>(&mut self, directory: P) -> Result<bool, PluginError> {
        let directory = directory.as_ref();
        let invalid = || PluginError::SearchPathInvalid {
            path: directory.to_path_buf(),
        };

        if !directory.is_dir() {
            return Err(invalid());
        }
        let canonical = fs::canonicalize(directory).map_err(|_| invalid())?;

        if self.dirs.contains(&canonical) {
            return Ok(false);
        }

        #[cfg(windows)]
        self.register_with_loader(&canonical)?;

        self.dirs.push(canonical);
        Ok(true)
    }

    #[cfg(windows)]
    fn register_with_loader(&mut self, directory: &Path) -> Result<(), PluginError> {
        use windows::core::HSTRING;
        use windows::Win32::System::LibraryLoader::AddDllDirectory;

        let wide = HSTRING::from(directory.as_os_str());
        // SAFETY: `wide` is a valid null-terminated wide string for the call
        let cookie = unsafe { AddDllDirectory(&wide) };
        if cookie.is_null() {
            return Err(PluginError::SearchPathRejected {
                path: directory.to_path_buf(),
            });
        }
        self.cookies.push(cookie);
        Ok(())
    }

    /// Whether `directory` has been registered
    pub fn contains<P: AsRef<Path>>(&self, directory: P) -> bool {
        match fs::canonicalize(directory.as_ref()) {
            Ok(canonical) => self.dirs.contains(&canonical),
            Err(_) => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    /// Find the first registered directory holding a file for `name`
    ///
    /// Directories are probed in registration order. Within a directory the
    /// name is tried verbatim first, then with the platform's library
    /// extension and prefix when `name` has no extension of its own.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let candidates = candidate_file_names(name);
        self.dirs
            .iter()
            .flat_map(|dir| candidates.iter().map(move |file| dir.join(file)))
            .find(|path| path.is_file())
    }
}

#[cfg(windows)]
impl Drop for SearchPaths {
    fn drop(&mut self) {
        use windows::Win32::System::LibraryLoader::RemoveDllDirectory;

        for cookie in self.cookies.drain(..) {
            // SAFETY: every cookie came from a successful AddDllDirectory call
            if let Err(e) = unsafe { RemoveDllDirectory(cookie) } {
                debug!(error = %e, "Failed to remove DLL directory");
            }
        }
    }
}

/// File names tried for `name` inside a search directory
pub(crate) fn candidate_file_names(name: &str) -> Vec<String> {
    let mut names = vec![name.to_string()];
    if Path::new(name).extension().is_none() {
        names.push(format!("{name}.{DLL_EXTENSION}"));
        if !DLL_PREFIX.is_empty() && !name.starts_with(DLL_PREFIX) {
            names.push(format!("{DLL_PREFIX}{name}.{DLL_EXTENSION}"));
        }
    }
    names
}
