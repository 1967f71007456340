//! Presentation-facing plumbing for the car showcase.
//!
//! - [`catalog`]: the cars behind each controller hotspot and their sounds
//! - [`hotspot`]: controller overlay layout and touch hit testing
//! - [`language`] / [`prefs`]: language codes and persisted preferences
//! - [`config`]: application configuration
//! - [`screen`]: routes gestures and focus changes to the tilt sound service

pub mod catalog;
pub mod config;
pub mod error;
pub mod hotspot;
pub mod language;
pub mod prefs;
pub mod screen;

pub use catalog::{CarField, CarId, CarRecord, Catalog};
pub use config::AppConfig;
pub use error::CoreError;
pub use hotspot::{Hotspot, LayoutVariant};
pub use language::Language;
pub use prefs::{Preferences, StartScreen};
pub use screen::ShowcaseScreen;
