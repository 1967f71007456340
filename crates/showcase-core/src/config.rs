use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use showcase_sound::SoundConfig;

use crate::hotspot::LayoutVariant;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub sound: SoundConfig,
    /// Directory sound assets are resolved against.
    pub asset_dir: PathBuf,
    pub tablet_layout: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sound: SoundConfig::default(),
            asset_dir: PathBuf::from("assets/sounds"),
            tablet_layout: false,
        }
    }
}

impl AppConfig {
    /// Platform config location, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("com", "showcase", "car-showcase") {
            proj_dirs.config_dir().join(CONFIG_FILE)
        } else {
            PathBuf::from(CONFIG_FILE)
        }
    }

    /// Loads config from a specified path.
    /// Returns default config if file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.sound.validate()?;
        Ok(config)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn layout(&self) -> LayoutVariant {
        LayoutVariant::from_tablet(self.tablet_layout)
    }
}
