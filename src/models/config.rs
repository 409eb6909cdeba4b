use serde::{Deserialize, Serialize};

/// Default key under which the state blob is stored.
pub const DEFAULT_STATE_KEY: &str = "crisis-copilot-state";

/// Application configuration from `copilot.yaml`
///
/// Every section falls back to its defaults when absent, so a partial file
/// (or no file at all) is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub splash: SplashSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory holding the key-value store files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_state_key")]
    pub state_key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            state_key: default_state_key(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_dir")]
    pub dir: String,

    #[serde(default = "default_log_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            prefix: default_log_prefix(),
            debug: false,
            console: default_console(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplashSettings {
    /// How long the splash screen stays up before handing over to home
    #[serde(default = "default_splash_delay_ms")]
    pub delay_ms: u64,
}

impl Default for SplashSettings {
    fn default() -> Self {
        Self {
            delay_ms: default_splash_delay_ms(),
        }
    }
}

fn default_data_dir() -> String {
    "Crisis Copilot Data".to_string()
}

fn default_state_key() -> String {
    DEFAULT_STATE_KEY.to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_prefix() -> String {
    "crisis-copilot".to_string()
}

fn default_console() -> bool {
    true
}

fn default_splash_delay_ms() -> u64 {
    2500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.storage.state_key, "crisis-copilot-state");
        assert_eq!(config.storage.data_dir, "Crisis Copilot Data");
        assert_eq!(config.logging.prefix, "crisis-copilot");
        assert!(!config.logging.debug);
        assert!(config.logging.console);
        assert_eq!(config.splash.delay_ms, 2500);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "logging:\n  debug: true\n";
        let config: AppConfig = serde_yaml_ng::from_str(yaml).unwrap();

        assert!(config.logging.debug);
        assert_eq!(config.logging.dir, "logs");
        assert_eq!(config.storage, StorageSettings::default());
    }
}
