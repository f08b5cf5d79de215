use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Paradigm file to use instead of the bundled one.
    #[serde(default)]
    pub paradigms_path: Option<String>,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_strict_accents")]
    pub strict_accents: bool,
    #[serde(default = "default_randomize_next")]
    pub randomize_next: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_theme() -> String {
    "parchment".to_string()
}
fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("klisis")
        .to_string_lossy()
        .to_string()
}
fn default_strict_accents() -> bool {
    false
}
fn default_randomize_next() -> bool {
    false
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            paradigms_path: None,
            data_dir: default_data_dir(),
            strict_accents: default_strict_accents(),
            randomize_next: default_randomize_next(),
            log_level: default_log_level(),
        }
    }
}

/// Command-line settings that apply to one run and are never saved.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub theme: Option<String>,
    pub paradigms_path: Option<String>,
    pub data_dir: Option<String>,
    pub randomize_next: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn with_overrides(&self, overrides: &Overrides) -> Config {
        let mut config = self.clone();
        if let Some(theme) = &overrides.theme {
            config.theme = theme.clone();
        }
        if let Some(path) = &overrides.paradigms_path {
            config.paradigms_path = Some(path.clone());
        }
        if let Some(dir) = &overrides.data_dir {
            config.data_dir = dir.clone();
        }
        if overrides.randomize_next {
            config.randomize_next = true;
        }
        config
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("klisis")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_path().join("logs")
    }
}
