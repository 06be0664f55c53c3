use crate::models::DiagnosticsConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, File, FileFormat};
use std::fs;

/// File name of the diagnostics configuration
pub const CONFIG_FILE_NAME: &str = "Diagnostics.yaml";

/// Configuration manager for loading and saving the diagnostics YAML file.
///
/// Loading layers the file over [`DiagnosticsConfig::default`], so a missing file
/// or missing keys fall back to defaults.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing `Diagnostics.yaml`
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the diagnostics configuration.
    ///
    /// # Returns
    /// The file's settings over the defaults, or the defaults if the file doesn't exist
    pub fn load_config(&self) -> Result<DiagnosticsConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Diagnostics config not found at {}, using defaults",
                self.config_path
            );
        }

        let defaults = Config::try_from(&DiagnosticsConfig::default())
            .context("Failed to build default diagnostics config")?;

        let config: DiagnosticsConfig = Config::builder()
            .add_source(defaults)
            .add_source(File::new(self.config_path.as_str(), FileFormat::Yaml).required(false))
            .build()
            .and_then(Config::try_deserialize)
            .with_context(|| format!("Failed to parse diagnostics config: {}", self.config_path))?;

        tracing::info!("Loaded diagnostics config from {}", self.config_path);
        Ok(config)
    }

    /// Save the diagnostics configuration.
    pub fn save_config(&self, config: &DiagnosticsConfig) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(config)
            .context("Failed to serialize diagnostics config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write diagnostics config: {}", self.config_path))?;

        tracing::info!("Saved diagnostics config to {}", self.config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_create_config_manager() {
        let (manager, _temp_dir) = create_test_config_manager();
        assert!(manager.config_path().as_str().ends_with("Diagnostics.yaml"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded, DiagnosticsConfig::default());
    }

    #[test]
    fn test_load_save_config() {
        let (manager, _temp_dir) = create_test_config_manager();

        let config = DiagnosticsConfig {
            retention_hours: 72,
            show_error_dialogs: false,
            ..DiagnosticsConfig::default()
        };
        manager.save_config(&config).unwrap();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.retention_hours, 72);
        assert!(!loaded.show_error_dialogs);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.config_path(), "folder_prefix: Trace\n").unwrap();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.folder_prefix, "Trace");
        assert_eq!(loaded.retention_hours, 24);
        assert!(loaded.console_output);
    }
}
