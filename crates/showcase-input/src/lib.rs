//! Sensor sources for hosts without a live accelerometer.
//!
//! - [`ScriptedSensor`] replays a recorded [`SensorTrace`]
//! - [`UnavailableSensor`] refuses every subscription

mod scripted;
mod trace;

pub use scripted::{ScriptedSensor, UnavailableSensor};
pub use trace::SensorTrace;
