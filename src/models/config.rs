use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default run-folder prefix, producing names like `Diagnostics-14h5m9s`.
pub const DEFAULT_FOLDER_PREFIX: &str = "Diagnostics";

/// Diagnostics configuration loaded from `Diagnostics.yaml`.
///
/// Every field has a default, so a partial file (or no file at all) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Name of the per-user data sub-directory (`<data dir>/<app_name>`)
    pub app_name: String,

    /// Explicit base folder, bypassing the OS data directory lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_folder: Option<Utf8PathBuf>,

    pub folder_prefix: String,

    /// Run folders older than this are deleted at startup
    pub retention_hours: u64,

    /// Mirror main-thread logs to the console
    pub console_output: bool,

    /// Show a native modal dialog for reported errors
    pub show_error_dialogs: bool,

    pub change_channel_capacity: usize,

    /// Number of lines each sink keeps in memory for live views
    pub recent_lines: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            data_folder: None,
            folder_prefix: DEFAULT_FOLDER_PREFIX.to_string(),
            retention_hours: 24,
            console_output: true,
            show_error_dialogs: true,
            change_channel_capacity: 100,
            recent_lines: 200,
        }
    }
}

impl DiagnosticsConfig {
    /// Configuration rooted at an explicit base folder, mostly for tests and tools.
    pub fn with_data_folder(data_folder: impl Into<Utf8PathBuf>) -> Self {
        Self {
            data_folder: Some(data_folder.into()),
            ..Self::default()
        }
    }

    /// Expiration window for old run folders
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_hours.saturating_mul(60 * 60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_config_defaults() {
        let config = DiagnosticsConfig::default();
        assert_eq!(config.folder_prefix, "Diagnostics");
        assert_eq!(config.retention_hours, 24);
        assert!(config.console_output);
        assert!(config.show_error_dialogs);
        assert!(config.data_folder.is_none());
    }

    #[test]
    fn test_retention_is_one_day_by_default() {
        let config = DiagnosticsConfig::default();
        assert_eq!(config.retention(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: DiagnosticsConfig =
            serde_yaml_ng::from_str("retention_hours: 48\nconsole_output: false\n").unwrap();

        assert_eq!(config.retention_hours, 48);
        assert!(!config.console_output);
        assert_eq!(config.recent_lines, 200);
    }

    #[test]
    fn test_data_folder_round_trips_through_yaml() {
        let config = DiagnosticsConfig::with_data_folder("/var/lib/diagnostics");

        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        assert!(yaml.contains("data_folder: /var/lib/diagnostics"));

        let parsed: DiagnosticsConfig = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(
            parsed.data_folder.as_deref(),
            Some(camino::Utf8Path::new("/var/lib/diagnostics"))
        );
    }
}
