use crate::models::AppConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the application configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "copilot.yaml";

/// Prefix for environment overrides, e.g. `COPILOT__LOGGING__DEBUG=true`.
pub const ENV_PREFIX: &str = "COPILOT";

/// Configuration manager for loading and saving `copilot.yaml`.
///
/// Loading layers three sources, later ones winning:
/// 1. Built-in defaults ([`AppConfig::default`])
/// 2. `copilot.yaml` in the config directory (optional)
/// 3. `COPILOT__<SECTION>__<KEY>` environment variables
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager rooted at `config_dir`, creating the directory if needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the application configuration.
    ///
    /// # Returns
    /// The merged AppConfig; defaults when neither file nor environment set anything
    pub fn load_config(&self) -> Result<AppConfig> {
        self.load_with_env(None)
    }

    /// Load with an explicit environment map instead of the process environment.
    pub(crate) fn load_with_env(
        &self,
        env: Option<config::Map<String, String>>,
    ) -> Result<AppConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
        }

        let defaults = config::Config::try_from(&AppConfig::default())
            .context("Failed to build default configuration")?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(
                config::File::from(self.config_path.as_std_path())
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let app_config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::info!("Loaded config from {}", self.config_dir);
        Ok(app_config)
    }

    /// Save the application configuration.
    pub fn save_config(&self, app_config: &AppConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(app_config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

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
    fn test_load_defaults_without_file() {
        let (manager, _temp_dir) = create_test_config_manager();

        let config = manager.load_with_env(Some(config::Map::new())).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_save_config() {
        let (manager, _temp_dir) = create_test_config_manager();

        let mut config = AppConfig::default();
        config.splash.delay_ms = 100;
        config.storage.state_key = "other-key".to_string();
        manager.save_config(&config).unwrap();

        let loaded = manager.load_with_env(Some(config::Map::new())).unwrap();
        assert_eq!(loaded.splash.delay_ms, 100);
        assert_eq!(loaded.storage.state_key, "other-key");
    }

    #[test]
    fn test_env_overrides_file() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.config_path(), "logging:\n  debug: false\n").unwrap();

        let mut env = config::Map::new();
        env.insert("COPILOT__LOGGING__DEBUG".to_string(), "true".to_string());

        let loaded = manager.load_with_env(Some(env)).unwrap();
        assert!(loaded.logging.debug);
        assert_eq!(loaded.logging.prefix, "crisis-copilot");
    }
}
