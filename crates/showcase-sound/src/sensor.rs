use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::SensorError;
use crate::sample::OrientationSample;

/// Samples buffered per subscription. Once it is full a source either waits
/// for the consumer (scripted replay) or drops the sample (live sources).
pub const SAMPLE_QUEUE_DEPTH: usize = 32;

/// Handle for referencing an open subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// An open accelerometer stream.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub samples: mpsc::Receiver<OrientationSample>,
}

impl Subscription {
    /// Create the channel pair for a new subscription.
    pub fn channel(id: SubscriptionId) -> (mpsc::Sender<OrientationSample>, Self) {
        let (tx, rx) = mpsc::channel(SAMPLE_QUEUE_DEPTH);
        (tx, Self { id, samples: rx })
    }
}

/// Abstraction over motion sensors.
/// Implementations: ScriptedSensor / UnavailableSensor (showcase-input),
/// MockSensor (testing).
pub trait SensorSource: Send + 'static {
    /// Open a stream delivering samples roughly every `interval`.
    fn subscribe(&mut self, interval: Duration) -> Result<Subscription, SensorError>;

    /// Close a stream. Unknown ids are ignored.
    fn unsubscribe(&mut self, id: SubscriptionId);
}
