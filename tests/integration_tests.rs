mod common;

#[cfg(test)]
mod config_tests {
    use native_plugin_manager::config::{Config, DuplicateLoadPolicy};
    use tempfile::tempdir;

    #[test]
    fn test_config_load() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");

        let yaml = r#"
library_extension: dll
search_paths:
  - /opt/host/Plugins
duplicate_load: reload
lifecycle:
  enabled: false
"#;
        std::fs::write(&config_path, yaml).unwrap();

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.library_extension, "dll");
        assert_eq!(loaded.search_paths.len(), 1);
        assert_eq!(loaded.duplicate_load, DuplicateLoadPolicy::Reload);
        assert!(!loaded.lifecycle.enabled);
        assert_eq!(loaded.lifecycle.load_symbol, "plugin_load");
    }

    #[test]
    fn test_config_save_and_reload() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.data_dir = Some(dir.path().to_path_buf());
        config.debug_logging = true;
        config.save_to_file(&config_path).unwrap();

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.data_dir.as_deref(), Some(dir.path()));
        assert!(loaded.debug_logging);
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempdir().unwrap();
        assert!(Config::load_from_file(dir.path().join("absent.yaml")).is_err());
    }
}

#[cfg(test)]
mod manager_config_tests {
    use native_plugin_manager::config::Config;
    use native_plugin_manager::PluginManager;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_from_config_registers_paths_and_scan() {
        let root = tempdir().unwrap();
        let extra = tempdir().unwrap();
        let nested = root.path().join("Plugins").join("Native");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("TestLib.dll"), b"").unwrap();

        let mut config = Config::default();
        config.data_dir = Some(root.path().to_path_buf());
        config.library_extension = "dll".to_string();
        config.search_paths = vec![extra.path().to_path_buf(), root.path().join("missing")];

        let manager = PluginManager::from_config(&config);
        let paths = manager.search_paths();
        assert_eq!(paths.len(), 3);
        assert!(paths.contains(extra.path()));
        assert!(paths.contains(root.path()));
        assert!(paths.contains(&nested));
    }

    #[test]
    fn test_from_config_with_missing_data_dir() {
        let root = tempdir().unwrap();
        let mut config = Config::default();
        config.data_dir = Some(root.path().join("gone"));

        let manager = PluginManager::from_config(&config);
        assert!(manager.search_paths().is_empty());
        assert_eq!(manager.loaded_library_count(), 0);
    }
}

#[cfg(all(test, target_os = "linux", target_env = "gnu"))]
mod discovery_load_tests {
    use super::common;
    use native_plugin_manager::config::Config;
    use native_plugin_manager::PluginManager;
    use tempfile::tempdir;

    #[test]
    fn test_discovered_directory_makes_plugin_loadable() {
        let root = tempdir().unwrap();
        let plugin_dir = root.path().join("Assets").join("Plugins");
        if common::install_fixture(&plugin_dir).is_none() {
            eprintln!("libm not found, skipping");
            return;
        }

        let mut config = Config::default();
        config.data_dir = Some(root.path().to_path_buf());

        let mut manager = PluginManager::from_config(&config);
        assert!(manager.load_plugin(common::FIXTURE_STEM));
        assert_eq!(
            manager.loaded_library_names(),
            vec![common::FIXTURE_STEM.to_string()]
        );
        assert!(manager
            .get(common::FIXTURE_STEM)
            .unwrap()
            .path()
            .ends_with(common::FIXTURE_FILE));
    }
}
