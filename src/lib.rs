//! Native plugin manager - runtime loading and unloading of native libraries
//!
//! A host registers the directories its plugins live in, loads and unloads
//! plugins by name, and polls the inventory of what is currently loaded.
//!
//! ```no_run
//! use native_plugin_manager::plugins::{discovery, InventoryWatcher, PluginManager};
//! use std::path::Path;
//!
//! let mut manager = PluginManager::new();
//! discovery::register_discovered(&mut manager, Path::new("/opt/host/data"), "so");
//!
//! if manager.load_plugin("TestLib") {
//!     let mut watcher = InventoryWatcher::new();
//!     if let Some(names) = watcher.poll(&manager) {
//!         println!("loaded: {names:?}");
//!     }
//! }
//! manager.unload_all_plugins();
//! ```
//!
//! # Modules
//!
//! - [`plugins`]: Plugin manager, search paths, discovery and inventory polling
//! - [`config`]: Configuration management and serialization
//! - [`error`]: Error types
//! - [`ffi`]: C interface for non-Rust hosts
//! - [`logging`]: Optional stderr logging setup

pub mod config;
pub mod error;
pub mod ffi;
pub mod logging;
pub mod plugins;

pub use config::{Config, DuplicateLoadPolicy, LifecycleConfig};
pub use error::PluginError;
pub use plugins::PluginManager;
