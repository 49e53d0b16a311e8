//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Library file name that exists nowhere on the default loader path
pub const FIXTURE_FILE: &str = "libnpmfixture.so";

/// Bare name that resolves to [`FIXTURE_FILE`] inside a search path
pub const FIXTURE_STEM: &str = "npmfixture";

/// Locate the system libm to copy as a loadable fixture
pub fn system_libm() -> Option<PathBuf> {
    const DIRS: &[&str] = &[
        "/lib/x86_64-linux-gnu",
        "/usr/lib/x86_64-linux-gnu",
        "/lib/aarch64-linux-gnu",
        "/usr/lib/aarch64-linux-gnu",
        "/lib64",
        "/usr/lib64",
        "/lib",
        "/usr/lib",
    ];
    DIRS.iter()
        .map(|dir| Path::new(dir).join("libm.so.6"))
        .find(|path| path.is_file())
}

/// Copy libm into `dir` under [`FIXTURE_FILE`]
///
/// Returns `None` when no libm could be found on this system.
pub fn install_fixture(dir: &Path) -> Option<PathBuf> {
    install_fixture_as(dir, FIXTURE_FILE)
}

/// Copy libm into `dir` under `file_name`
pub fn install_fixture_as(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let source = system_libm()?;
    fs::create_dir_all(dir).ok()?;
    let target = dir.join(file_name);
    fs::copy(source, &target).ok()?;
    Some(target)
}
