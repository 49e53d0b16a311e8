// Native plugin lifecycle:
// - Name resolution through registered search paths, then the system loader
// - One handle per name, owned exclusively by the manager
// - Optional plugin_load/plugin_unload hooks
// - Inventory queries that always reflect the last load/unload
use libloading::{Library, Symbol};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::api::{HostContext, PluginLoadFn, PluginUnloadFn};
use super::discovery;
use super::inventory::InventoryEvent;
use super::search_path::SearchPaths;
use crate::config::{Config, DuplicateLoadPolicy, LifecycleConfig};
use crate::error::PluginError;

type Listener = Box<dyn FnMut(&InventoryEvent)>;

/// Plugin manager for loading and managing native libraries
///
/// Construct exactly one per process and pass it to whatever needs it.
/// Every loaded library is unloaded when the manager is dropped.
pub struct PluginManager {
    libraries: Vec<LoadedLibrary>,
    search_paths: SearchPaths,
    duplicate_load: DuplicateLoadPolicy,
    lifecycle: LifecycleConfig,
    host_context: HostContext,
    listeners: Vec<Listener>,
}

/// A loaded library
pub struct LoadedLibrary {
    name: String,
    path: PathBuf,
    library: Library,
    /// Present only when the library exported both lifecycle hooks
    unload_hook: Option<PluginUnloadFn>,
}

impl LoadedLibrary {
    /// Name the library was requested under
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path handed to the OS loader
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn has_lifecycle_hooks(&self) -> bool {
        self.unload_hook.is_some()
    }

    /// Run the unload hook and release the OS handle
    ///
    /// A handle the OS refuses to close is only logged.
    fn unload(self) {
        if let Some(hook) = self.unload_hook {
            debug!(plugin = %self.name, "Calling plugin unload hook");
            // Safety: the hook was resolved from this library, which is still loaded
            unsafe { hook() };
        }
        if let Err(e) = self.library.close() {
            warn!(plugin = %self.name, error = %e, "Library could not be released cleanly");
        }
    }
}

impl PluginManager {
    /// Create a new plugin manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            libraries: Vec::new(),
            search_paths: SearchPaths::new(),
            duplicate_load: DuplicateLoadPolicy::default(),
            lifecycle: LifecycleConfig::default(),
            host_context: HostContext::null(),
            listeners: Vec::new(),
        }
    }

    /// Build a manager from host configuration
    ///
    /// Registers the configured search paths, then every directory under
    /// `data_dir` holding a library. Scan failures are logged; the manager
    /// is still returned.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut manager = Self::new()
            .with_duplicate_load(config.duplicate_load)
            .with_lifecycle(config.lifecycle.clone());

        for dir in &config.search_paths {
            manager.add_search_path(dir);
        }
        if let Some(data_dir) = &config.data_dir {
            discovery::register_discovered(&mut manager, data_dir, &config.library_extension);
        }

        manager
    }

    #[must_use]
    pub fn with_duplicate_load(mut self, policy: DuplicateLoadPolicy) -> Self {
        self.duplicate_load = policy;
        self
    }

    #[must_use]
    pub fn with_lifecycle(mut self, lifecycle: LifecycleConfig) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Pointer passed to every plugin load hook
    #[must_use]
    pub fn with_host_context(mut self, context: HostContext) -> Self {
        self.host_context = context;
        self
    }

    /// Register a directory to probe when resolving bare names
    ///
    /// Invalid directories are logged and ignored. On Unix only the plugin
    /// file itself is found this way: libraries the plugin links against are
    /// still resolved by the system loader, so a dependency sitting next to
    /// the plugin needs an `$ORIGIN` rpath in the plugin.
    pub fn add_search_path<P: AsRef<Path>>(&mut self, directory: P) {
        self.search_paths.add(directory);
    }

    #[must_use]
    pub fn search_paths(&self) -> &SearchPaths {
        &self.search_paths
    }

    /// Receive every load/unload transition from now on
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&InventoryEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Load a plugin, reporting only success
    pub fn load_plugin(&mut self, name: &str) -> bool {
        info!(plugin = name, "Loading plugin");
        match self.try_load_plugin(name) {
            Ok(()) => {
                info!(plugin = name, "Plugin loaded");
                true
            }
            Err(e) => {
                warn!(plugin = name, error = %e, "Plugin failed to load");
                false
            }
        }
    }

    /// Load a plugin
    ///
    /// Names containing a path separator are loaded as given. Bare names
    /// are looked up in the registered search paths first and otherwise
    /// left to the system loader's default search.
    ///
    /// # Errors
    /// Returns [`PluginError::EmptyName`] for an empty name and
    /// [`PluginError::LoadFailure`] when the OS loader fails.
    pub fn try_load_plugin(&mut self, name: &str) -> Result<(), PluginError> {
        if name.is_empty() {
            return Err(PluginError::EmptyName);
        }

        if self.is_loaded(name) {
            match self.duplicate_load {
                DuplicateLoadPolicy::Keep => {
                    debug!(plugin = name, "Plugin already loaded");
                    return Ok(());
                }
                DuplicateLoadPolicy::Reload => {
                    debug!(plugin = name, "Reloading plugin");
                    self.unload_plugin(name);
                }
            }
        }

        let path = self.resolve(name);
        debug!(plugin = name, path = %path.display(), "Resolved plugin path");

        let library = open_library(&path).map_err(|source| PluginError::LoadFailure {
            name: name.to_string(),
            source,
        })?;
        let unload_hook = self.attach_lifecycle(name, &library);

        self.libraries.push(LoadedLibrary {
            name: name.to_string(),
            path,
            library,
            unload_hook,
        });
        self.notify(&InventoryEvent::Loaded {
            name: name.to_string(),
        });

        Ok(())
    }

    /// Unload a plugin; unknown names are ignored
    pub fn unload_plugin(&mut self, name: &str) {
        let Some(index) = self.position(name) else {
            debug!(plugin = name, "Plugin not loaded, nothing to unload");
            return;
        };

        info!(plugin = name, "Unloading plugin");
        self.libraries.remove(index).unload();
        self.notify(&InventoryEvent::Unloaded {
            name: name.to_string(),
        });
    }

    /// Unload every plugin, most recently loaded first
    pub fn unload_all_plugins(&mut self) {
        info!(count = self.libraries.len(), "Unloading all plugins");
        while let Some(loaded) = self.libraries.pop() {
            let name = loaded.name.clone();
            loaded.unload();
            self.notify(&InventoryEvent::Unloaded { name });
        }
    }

    /// Number of loaded libraries
    #[must_use]
    pub fn loaded_library_count(&self) -> usize {
        self.libraries.len()
    }

    /// Names of loaded libraries in load order
    #[must_use]
    pub fn loaded_library_names(&self) -> Vec<String> {
        self.libraries.iter().map(|lib| lib.name.clone()).collect()
    }

    /// Check if plugin is loaded
    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LoadedLibrary> {
        self.libraries.iter().find(|lib| lib.name == name)
    }

    /// Look up an exported symbol of a loaded plugin
    ///
    /// # Safety
    /// `T` must match the actual type of the exported symbol, and the
    /// returned symbol must not be used after the plugin is unloaded
    /// (the borrow on the manager enforces the latter).
    pub unsafe fn symbol<T>(&self, name: &str, symbol: &str) -> Option<Symbol<'_, T>> {
        let loaded = self.get(name)?;
        match unsafe { loaded.library.get::<T>(symbol.as_bytes()) } {
            Ok(sym) => Some(sym),
            Err(e) => {
                debug!(plugin = name, symbol, error = %e, "Symbol not found");
                None
            }
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.libraries.iter().position(|lib| lib.name == name)
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let requested = Path::new(name);
        if requested.is_absolute() || requested.components().count() > 1 {
            return requested.to_path_buf();
        }
        self.search_paths
            .resolve(name)
            .unwrap_or_else(|| requested.to_path_buf())
    }

    /// Run the load hook if the library exports both hooks, returning the
    /// unload hook to keep
    fn attach_lifecycle(&self, name: &str, library: &Library) -> Option<PluginUnloadFn> {
        if !self.lifecycle.enabled {
            return None;
        }

        // Safety: the symbol types are the documented hook ABI
        let load = unsafe { library.get::<PluginLoadFn>(self.lifecycle.load_symbol.as_bytes()) }
            .ok()
            .map(|sym| *sym);
        let unload =
            unsafe { library.get::<PluginUnloadFn>(self.lifecycle.unload_symbol.as_bytes()) }
                .ok()
                .map(|sym| *sym);

        match (load, unload) {
            (Some(load), Some(unload)) => {
                debug!(plugin = name, "Calling plugin load hook");
                // Safety: resolved from the library that was just loaded
                unsafe { load(self.host_context.as_ptr()) };
                Some(unload)
            }
            (None, None) => None,
            _ => {
                debug!(plugin = name, "Plugin exports only one lifecycle hook, ignoring both");
                None
            }
        }
    }

    fn notify(&mut self, event: &InventoryEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PluginManager {
    fn drop(&mut self) {
        if !self.libraries.is_empty() {
            self.unload_all_plugins();
        }
    }
}

fn open_library(path: &Path) -> Result<Library, libloading::Error> {
    // Safety: loading runs the library's initialisers; plugins are trusted
    // by the host that asked for them
    let result = unsafe { Library::new(path) };

    // LoadLibrary ignores AddDllDirectory entries unless asked to
    #[cfg(windows)]
    let result = result.or_else(|_| unsafe {
        libloading::os::windows::Library::load_with_flags(
            path,
            libloading::os::windows::LOAD_LIBRARY_SEARCH_DEFAULT_DIRS,
        )
        .map(Library::from)
    });

    result
}
