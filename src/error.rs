//! Error types for the plugin manager
//!
//! None of these ever escape the public `load_plugin`/`add_search_path`
//! entry points: those log and fall back to a boolean or a no-op. The
//! `try_*` variants hand them to callers that want the reason.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while registering search paths, scanning for libraries
/// or loading a plugin
#[derive(Error, Debug)]
pub enum PluginError {
    /// An empty library name was requested
    #[error("Plugin name is empty")]
    EmptyName,

    /// The name could not be resolved or the OS loader rejected the file
    #[error("Failed to load plugin '{name}': {source}")]
    LoadFailure {
        name: String,
        #[source]
        source: libloading::Error,
    },

    /// Search path does not exist or is not a directory
    #[error("Search path {path} does not exist or is not a directory")]
    SearchPathInvalid { path: PathBuf },

    /// The OS refused to register the directory with its loader
    #[error("Search path {path} could not be registered with the system loader")]
    SearchPathRejected { path: PathBuf },

    /// Root of a library scan is missing
    #[error("Library scan root {path} does not exist or is not a directory")]
    ScanRootMissing { path: PathBuf },
}
