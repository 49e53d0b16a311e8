use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Host-side configuration for a plugin manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the recursive library scan run at startup
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// File extension that marks a dynamic library during the scan
    #[serde(default = "default_library_extension")]
    pub library_extension: String,

    /// Extra directories registered before the scan
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// What loading an already loaded name does
    #[serde(default)]
    pub duplicate_load: DuplicateLoadPolicy,

    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Enable debug logging
    #[serde(default)]
    pub debug_logging: bool,
}

/// Behaviour of `load_plugin` for a name that is already loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateLoadPolicy {
    /// Keep the existing handle and report success
    #[default]
    Keep,
    /// Unload the existing handle, then load the library again
    Reload,
}

/// Optional entry points a plugin can export to observe its own load/unload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Called right after load with the host context pointer
    #[serde(default = "default_load_symbol")]
    pub load_symbol: String,

    /// Called right before the library is closed
    #[serde(default = "default_unload_symbol")]
    pub unload_symbol: String,
}

// Default value functions
fn default_library_extension() -> String {
    std::env::consts::DLL_EXTENSION.to_string()
}

fn default_true() -> bool {
    true
}

fn default_load_symbol() -> String {
    "plugin_load".to_string()
}

fn default_unload_symbol() -> String {
    "plugin_unload".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            library_extension: default_library_extension(),
            search_paths: Vec::new(),
            duplicate_load: DuplicateLoadPolicy::default(),
            lifecycle: LifecycleConfig::default(),
            debug_logging: false,
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            load_symbol: default_load_symbol(),
            unload_symbol: default_unload_symbol(),
        }
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        let config: Config =
            serde_yaml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_yaml::to_string(self).context("Failed to serialize config")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(path.as_ref(), contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get default configuration path
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;

        Ok(home.join(".native-plugin-manager").join("config.yaml"))
    }
}
