//! Inventory change detection for hosts
//!
//! Hosts either poll with an [`InventoryWatcher`] (count first, names only
//! when the count moved) or register a listener through
//! [`super::PluginManager::subscribe`] and receive every transition.

use super::PluginManager;

/// A single inventory transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    Loaded { name: String },
    Unloaded { name: String },
}

impl InventoryEvent {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Loaded { name } | Self::Unloaded { name } => name,
        }
    }
}

/// Count-then-fetch poller over a manager's inventory
///
/// Only the count is compared between polls, so an unload followed by a
/// load of a different library between two polls goes unnoticed. Hosts
/// that need every transition should subscribe instead.
#[derive(Debug, Default, Clone)]
pub struct InventoryWatcher {
    names: Vec<String>,
}

impl InventoryWatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fresh name list when the loaded count changed since the
    /// last fetch, `None` otherwise
    pub fn poll(&mut self, manager: &PluginManager) -> Option<&[String]> {
        if manager.loaded_library_count() == self.names.len() {
            return None;
        }
        self.names = manager.loaded_library_names();
        Some(&self.names)
    }

    /// Names from the most recent fetch
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
