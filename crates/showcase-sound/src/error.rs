use thiserror::Error;

/// Failures surfaced by a tilt sound session.
///
/// None of these cross the service boundary as a panic or a returned error
/// to the presentation layer; they are logged and the session stays idle.
#[derive(Debug, Error)]
pub enum SoundError {
    #[error("Failed to load sound asset {asset}: {reason}")]
    AssetLoad { asset: String, reason: String },

    #[error("Motion sensor unavailable: {0}")]
    SubscriptionUnavailable(#[from] SensorError),

    #[error("Failed to start playback of {asset}: {reason}")]
    Playback { asset: String, reason: String },

    #[error("Invalid sound configuration: {0}")]
    InvalidConfig(String),
}

/// Failures reported by a sensor source when opening a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("sensor not available: {0}")]
    Unavailable(String),

    #[error("permission to read the motion sensor was denied")]
    PermissionDenied,
}
