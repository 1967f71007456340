use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Identifier of a sound asset (file name or path relative to the asset root).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundAsset(String);

impl SoundAsset {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SoundAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SoundAsset {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SoundAsset {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Factory for playback handles.
/// Implementations: KiraAudio (showcase-audio), MockAudio (testing).
pub trait AudioBackend: Send + Sync + 'static {
    type Handle: AudioHandle;

    /// Decode/open an asset. May block; callers run it off the event loop.
    fn load(&self, asset: &SoundAsset) -> Result<Self::Handle>;
}

/// A loaded, loop-capable, volume-adjustable sound.
pub trait AudioHandle: Send + 'static {
    /// Set volume (0.0..=1.0).
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// `true` loops forever.
    fn set_looping(&mut self, looping: bool) -> Result<()>;

    fn play(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;

    /// Free the underlying resource. Consumes the handle.
    fn release(self);
}
