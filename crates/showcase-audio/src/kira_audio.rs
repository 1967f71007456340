use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Result, anyhow};
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::{AudioManager, AudioManagerSettings, Decibels, DefaultBackend, Tween};
use tracing::{debug, info};

use showcase_sound::{AudioBackend, AudioHandle, SoundAsset};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Convert a linear amplitude (0.0..=1.0) to kira's decibel volume.
pub fn amplitude_to_decibels(amplitude: f32) -> Decibels {
    if amplitude <= 0.0 || amplitude.is_nan() {
        return Decibels::SILENCE;
    }
    let db = 20.0 * amplitude.min(1.0).log10();
    Decibels(db.max(Decibels::SILENCE.0))
}

/// Asset names are relative to `root`; absolute paths are used as given.
pub fn resolve_asset(root: &Path, asset: &SoundAsset) -> PathBuf {
    let path = Path::new(asset.as_str());
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Audio backend backed by one shared kira manager.
pub struct KiraAudio {
    manager: Arc<Mutex<AudioManager>>,
    asset_root: PathBuf,
}

impl KiraAudio {
    /// Create a new audio backend resolving assets under `asset_root`.
    pub fn new(asset_root: impl Into<PathBuf>) -> Result<Self> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| anyhow!("Failed to create audio manager: {e}"))?;
        let asset_root = asset_root.into();
        info!("Audio ready (assets under {})", asset_root.display());
        Ok(Self {
            manager: Arc::new(Mutex::new(manager)),
            asset_root,
        })
    }
}

impl AudioBackend for KiraAudio {
    type Handle = KiraSound;

    fn load(&self, asset: &SoundAsset) -> Result<KiraSound> {
        let path = resolve_asset(&self.asset_root, asset);
        let data = StaticSoundData::from_file(&path)
            .map_err(|e| anyhow!("Failed to load sound {}: {e}", path.display()))?;
        debug!("Decoded {}", path.display());
        Ok(KiraSound {
            manager: Arc::clone(&self.manager),
            data,
            name: asset.to_string(),
            volume: 1.0,
            looping: false,
            playing: None,
        })
    }
}

/// A decoded sound plus its live playback handle, if playing.
pub struct KiraSound {
    manager: Arc<Mutex<AudioManager>>,
    data: StaticSoundData,
    name: String,
    volume: f32,
    /// Applied on the next `play`.
    looping: bool,
    playing: Option<StaticSoundHandle>,
}

impl AudioHandle for KiraSound {
    fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(handle) = self.playing.as_mut() {
            handle.set_volume(amplitude_to_decibels(self.volume), Tween::default());
        }
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) -> Result<()> {
        self.looping = looping;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if let Some(mut handle) = self.playing.take() {
            handle.stop(Tween::default());
        }
        let mut data = self.data.clone().volume(amplitude_to_decibels(self.volume));
        if self.looping {
            data = data.loop_region(..);
        }
        let handle = lock(&self.manager)
            .play(data)
            .map_err(|e| anyhow!("Failed to play {}: {e:?}", self.name))?;
        self.playing = Some(handle);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(mut handle) = self.playing.take() {
            handle.stop(Tween::default());
        }
        Ok(())
    }

    fn release(mut self) {
        if let Some(mut handle) = self.playing.take() {
            handle.stop(Tween::default());
        }
        debug!("Released {}", self.name);
    }
}
