// Native plugin management:
// - Search path registry and startup discovery scan
// - Load/unload through libloading with one handle per name
// - Inventory queries, polling and change listeners
pub mod api;
pub mod discovery;
pub mod inventory;
pub mod loader;
pub mod search_path;

pub use api::HostContext;
pub use inventory::{InventoryEvent, InventoryWatcher};
pub use loader::{LoadedLibrary, PluginManager};
pub use search_path::SearchPaths;
