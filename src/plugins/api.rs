//! Plugin-side ABI understood by the manager
//!
//! A plugin may export a pair of lifecycle entry points. When both are
//! present the manager calls the load hook right after the library is
//! loaded and the unload hook right before it is closed. Anything else a
//! plugin exports is reached through [`super::PluginManager::symbol`].

use std::ffi::c_void;
use std::ptr;

/// Load hook, receives the host context pointer
pub type PluginLoadFn = unsafe extern "C" fn(host: *mut c_void);

/// Unload hook
pub type PluginUnloadFn = unsafe extern "C" fn();

/// Opaque pointer handed to every plugin load hook
///
/// The manager never dereferences it. Hosts typically pass a table of
/// their own services (logging, interfaces) here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostContext(*mut c_void);

impl HostContext {
    /// Null context
    #[must_use]
    pub const fn null() -> Self {
        Self(ptr::null_mut())
    }

    #[must_use]
    pub const fn from_raw(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    #[must_use]
    pub const fn as_ptr(self) -> *mut c_void {
        self.0
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::null()
    }
}
