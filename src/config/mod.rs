use crate::models::{MenuConfig, Settings};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File};
use std::fs;

/// Environment variable prefix for [`MenuConfig`] overrides (`EMUMENU_TICK_INTERVAL_US=250`)
pub const ENV_PREFIX: &str = "EMUMENU";

/// Configuration manager for the menu's YAML files.
///
/// Manages two files in one directory:
/// - `Menu.yaml`: runtime tunables, layered with `EMUMENU_*` environment variables
/// - `Preferences.yaml`: the user's [`Settings`], rewritten whenever they are saved
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    menu_config_path: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            menu_config_path: config_dir.join("Menu.yaml"),
            settings_path: config_dir.join("Preferences.yaml"),
            config_dir,
        })
    }

    /// Load the menu tunables.
    ///
    /// Sources, lowest priority first: built-in defaults, `Menu.yaml` (optional),
    /// `EMUMENU_*` environment variables.
    pub fn load_menu_config(&self) -> Result<MenuConfig> {
        let layered = Config::builder()
            .add_source(File::from(self.menu_config_path.as_std_path()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read menu config: {}", self.menu_config_path))?;

        let config: MenuConfig = layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse menu config: {}", self.menu_config_path))?;

        tracing::info!(
            "Loaded menu config (tick={}us, grace={}us, min_total={})",
            config.tick_interval_us,
            config.overlay_grace_us,
            config.min_progress_total
        );
        Ok(config)
    }

    /// Save the menu tunables (environment overrides are not written back).
    pub fn save_menu_config(&self, config: &MenuConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize menu config to YAML")?;

        fs::write(&self.menu_config_path, yaml_string)
            .with_context(|| format!("Failed to write menu config: {}", self.menu_config_path))?;

        tracing::info!("Saved menu config to {}", self.menu_config_path);
        Ok(())
    }

    /// Load the user's preferences.
    ///
    /// # Returns
    /// The stored settings, or defaults if the file doesn't exist
    pub fn load_settings(&self) -> Result<Settings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Preferences not found at {}, using defaults",
                self.settings_path
            );
            return Ok(Settings::default());
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read preferences: {}", self.settings_path))?;

        let settings: Settings = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse preferences: {}", self.settings_path))?;

        tracing::info!("Loaded preferences from {}", self.settings_path);
        Ok(settings)
    }

    /// Load preferences, writing defaults back when nothing usable is stored.
    pub fn load_or_create_settings(&self) -> Result<Settings> {
        match self.load_settings() {
            Ok(settings) if self.settings_path.exists() => Ok(settings),
            Ok(settings) => {
                self.save_settings(&settings)?;
                Ok(settings)
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable preferences: {:#}", e);
                let settings = Settings::default();
                self.save_settings(&settings)?;
                Ok(settings)
            }
        }
    }

    /// Save the user's preferences.
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize preferences to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write preferences: {}", self.settings_path))?;

        tracing::info!("Saved preferences to {}", self.settings_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}
