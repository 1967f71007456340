//! Tilt-driven ambient sound engine.
//!
//! This crate provides:
//! - [`GyroVolumeController`]: the session state machine binding an audio
//!   handle to a sensor subscription
//! - [`TiltSoundService`]: the tokio driver that performs loads, pumps
//!   sensor samples and runs preview timers
//! - [`VolumeRange`] / [`TiltMapper`]: orientation-to-volume mapping
//! - [`AudioBackend`] / [`SensorSource`]: the seams to the platform
//! - [`SoundConfig`]: tunables (sampling interval, volume bounds, preview)

pub mod audio;
pub mod config;
pub mod controller;
pub mod error;
pub mod sample;
pub mod sensor;
pub mod service;
pub mod volume;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use audio::{AudioBackend, AudioHandle, SoundAsset};
pub use config::SoundConfig;
pub use controller::{
    Activation, ControllerState, GyroVolumeController, LoadOutcome, LoadTicket, SessionMode,
    SessionToken, StartOutcome,
};
pub use error::{SensorError, SoundError};
pub use sample::{Baseline, OrientationSample};
pub use sensor::{SensorSource, Subscription, SubscriptionId};
pub use service::TiltSoundService;
pub use volume::{TiltMapper, VolumeRange};
