//! kira-backed audio resources for tilt sound sessions.

mod kira_audio;

pub use kira_audio::{KiraAudio, KiraSound, amplitude_to_decibels, resolve_asset};
