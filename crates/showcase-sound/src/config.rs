use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::SoundError;
use crate::volume::VolumeRange;

/// Nominal accelerometer sampling interval.
pub const SAMPLE_INTERVAL_MS: u64 = 50;
/// Volume at rest; also the floor of the tilt mapping.
pub const BASE_VOLUME: f32 = 0.05;
pub const MAX_VOLUME: f32 = 1.0;
/// Length of a full-volume preview.
pub const PREVIEW_WINDOW_MS: u64 = 3000;
pub const PREVIEW_VOLUME: f32 = 1.0;

/// Tunables for tilt sessions and previews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub sample_interval_ms: u64,
    pub base_volume: f32,
    pub max_volume: f32,
    pub preview_window_ms: u64,
    pub preview_volume: f32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: SAMPLE_INTERVAL_MS,
            base_volume: BASE_VOLUME,
            max_volume: MAX_VOLUME,
            preview_window_ms: PREVIEW_WINDOW_MS,
            preview_volume: PREVIEW_VOLUME,
        }
    }
}

impl SoundConfig {
    /// Loads config from a JSON file.
    /// Returns default config if file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read sound config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse sound config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SoundError> {
        self.volume_range()?;
        if self.sample_interval_ms == 0 {
            return Err(SoundError::InvalidConfig(
                "sample interval must be non-zero".to_string(),
            ));
        }
        if self.preview_window_ms == 0 {
            return Err(SoundError::InvalidConfig(
                "preview window must be non-zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.preview_volume) {
            return Err(SoundError::InvalidConfig(format!(
                "preview volume {} outside 0.0..=1.0",
                self.preview_volume
            )));
        }
        Ok(())
    }

    pub fn volume_range(&self) -> Result<VolumeRange, SoundError> {
        VolumeRange::new(self.base_volume, self.max_volume)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn preview_window(&self) -> Duration {
        Duration::from_millis(self.preview_window_ms)
    }
}
