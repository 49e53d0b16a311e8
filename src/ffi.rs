//! C interface for non-Rust hosts
//!
//! The host creates one manager with `npm_manager_new`, passes the handle to
//! every call and releases it with `npm_manager_free`, which unloads all
//! plugins. Null handles and invalid strings are logged and treated as a
//! failed or skipped call.
//!
//! ```c
//! npm_manager_t* mgr = npm_manager_new();
//! npm_add_search_path(mgr, "/opt/host/Plugins");
//! if (npm_load_plugin(mgr, "TestLib")) {
//!     int count = npm_loaded_library_count(mgr);
//! }
//! npm_manager_free(mgr);
//! ```

use std::ffi::{c_char, CStr, CString};
use std::ptr;
use tracing::warn;

use crate::plugins::PluginManager;

/// Receives the loaded names; the strings are only valid during the call
pub type NamesCallback = extern "C" fn(names: *const *const c_char, count: i32);

unsafe fn c_str<'a>(value: *const c_char, what: &str) -> Option<&'a str> {
    if value.is_null() {
        warn!(argument = what, "Null string passed across the C interface");
        return None;
    }
    match CStr::from_ptr(value).to_str() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(argument = what, error = %e, "Invalid UTF-8 passed across the C interface");
            None
        }
    }
}

unsafe fn manager_mut<'a>(manager: *mut PluginManager) -> Option<&'a mut PluginManager> {
    if manager.is_null() {
        warn!("Null manager handle passed across the C interface");
    }
    manager.as_mut()
}

/// Install the stderr logger
///
/// Returns false if a logger was already installed.
#[no_mangle]
pub extern "C" fn npm_init_logging(debug: bool) -> bool {
    crate::logging::init(debug).is_ok()
}

/// Create a plugin manager
#[no_mangle]
pub extern "C" fn npm_manager_new() -> *mut PluginManager {
    Box::into_raw(Box::new(PluginManager::new()))
}

/// Unload every plugin and free the manager
///
/// # Safety
/// `manager` must be null or a pointer returned by `npm_manager_new` that
/// has not been freed yet
#[no_mangle]
pub unsafe extern "C" fn npm_manager_free(manager: *mut PluginManager) {
    if !manager.is_null() {
        drop(Box::from_raw(manager));
    }
}

/// Register a library search directory
///
/// # Safety
/// `manager` must be a live handle and `directory` a null-terminated string
#[no_mangle]
pub unsafe extern "C" fn npm_add_search_path(manager: *mut PluginManager, directory: *const c_char) {
    let (Some(manager), Some(directory)) = (manager_mut(manager), c_str(directory, "directory")) else {
        return;
    };
    manager.add_search_path(directory);
}

/// Load a plugin by name
///
/// # Safety
/// `manager` must be a live handle and `name` a null-terminated string
#[no_mangle]
pub unsafe extern "C" fn npm_load_plugin(manager: *mut PluginManager, name: *const c_char) -> bool {
    let (Some(manager), Some(name)) = (manager_mut(manager), c_str(name, "name")) else {
        return false;
    };
    manager.load_plugin(name)
}

/// Unload a plugin by name
///
/// # Safety
/// `manager` must be a live handle and `name` a null-terminated string
#[no_mangle]
pub unsafe extern "C" fn npm_unload_plugin(manager: *mut PluginManager, name: *const c_char) {
    let (Some(manager), Some(name)) = (manager_mut(manager), c_str(name, "name")) else {
        return;
    };
    manager.unload_plugin(name);
}

/// Unload every plugin
///
/// # Safety
/// `manager` must be a live handle
#[no_mangle]
pub unsafe extern "C" fn npm_unload_all_plugins(manager: *mut PluginManager) {
    if let Some(manager) = manager_mut(manager) {
        manager.unload_all_plugins();
    }
}

/// Number of loaded plugins, 0 for a null handle
///
/// # Safety
/// `manager` must be null or a live handle
#[no_mangle]
pub unsafe extern "C" fn npm_loaded_library_count(manager: *const PluginManager) -> i32 {
    match manager.as_ref() {
        Some(manager) => i32::try_from(manager.loaded_library_count()).unwrap_or(i32::MAX),
        None => 0,
    }
}

/// Pass the loaded names to `callback` in load order
///
/// Names containing an interior NUL cannot cross the interface and are
/// skipped.
///
/// # Safety
/// `manager` must be null or a live handle
#[no_mangle]
pub unsafe extern "C" fn npm_loaded_library_names(
    manager: *const PluginManager,
    callback: Option<NamesCallback>,
) {
    let (Some(manager), Some(callback)) = (manager.as_ref(), callback) else {
        return;
    };

    let names: Vec<CString> = manager
        .loaded_library_names()
        .into_iter()
        .filter_map(|name| CString::new(name).ok())
        .collect();
    let pointers: Vec<*const c_char> = names.iter().map(|name| name.as_ptr()).collect();
    let count = i32::try_from(pointers.len()).unwrap_or(i32::MAX);

    let data = if pointers.is_empty() {
        ptr::null()
    } else {
        pointers.as_ptr()
    };
    callback(data, count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static RECEIVED: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
    }

    extern "C" fn record_names(names: *const *const c_char, count: i32) {
        let collected = if names.is_null() {
            Vec::new()
        } else {
            let count = usize::try_from(count).unwrap();
            unsafe { std::slice::from_raw_parts(names, count) }
                .iter()
                .map(|&name| unsafe { CStr::from_ptr(name) }.to_str().unwrap().to_string())
                .collect()
        };
        RECEIVED.with(|received| *received.borrow_mut() = Some(collected));
    }

    fn take_received() -> Option<Vec<String>> {
        RECEIVED.with(|received| received.borrow_mut().take())
    }

    #[test]
    fn test_null_handles_are_tolerated() {
        unsafe {
            assert!(!npm_load_plugin(ptr::null_mut(), c"Foo".as_ptr()));
            npm_unload_plugin(ptr::null_mut(), c"Foo".as_ptr());
            npm_unload_all_plugins(ptr::null_mut());
            npm_add_search_path(ptr::null_mut(), c"/tmp".as_ptr());
            assert_eq!(npm_loaded_library_count(ptr::null()), 0);
            npm_loaded_library_names(ptr::null(), Some(record_names));
            npm_manager_free(ptr::null_mut());
        }
        assert!(take_received().is_none());
    }

    #[test]
    fn test_null_name_fails() {
        let manager = npm_manager_new();
        unsafe {
            assert!(!npm_load_plugin(manager, ptr::null()));
            assert_eq!(npm_loaded_library_count(manager), 0);
            npm_manager_free(manager);
        }
    }

    #[test]
    fn test_empty_inventory_callback() {
        let manager = npm_manager_new();
        unsafe {
            npm_loaded_library_names(manager, Some(record_names));
            npm_loaded_library_names(manager, None);
            npm_manager_free(manager);
        }
        assert_eq!(take_received(), Some(Vec::new()));
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_load_and_list_through_c_interface() {
        let manager = npm_manager_new();
        unsafe {
            assert!(npm_load_plugin(manager, c"libm.so.6".as_ptr()));
            assert!(npm_load_plugin(manager, c"libm.so.6".as_ptr()));
            assert!(!npm_load_plugin(manager, c"DoesNotExist".as_ptr()));
            assert_eq!(npm_loaded_library_count(manager), 1);

            npm_loaded_library_names(manager, Some(record_names));
            assert_eq!(take_received(), Some(vec!["libm.so.6".to_string()]));

            npm_unload_plugin(manager, c"libm.so.6".as_ptr());
            assert_eq!(npm_loaded_library_count(manager), 0);
            npm_manager_free(manager);
        }
    }
}
