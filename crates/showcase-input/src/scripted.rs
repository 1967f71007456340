use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use showcase_sound::{
    OrientationSample, SensorError, SensorSource, Subscription, SubscriptionId,
};

use crate::trace::SensorTrace;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Replays a recorded trace, one sample per tick of the requested interval.
///
/// Each subscription gets its own replay task on the ambient tokio runtime.
pub struct ScriptedSensor {
    trace: Arc<SensorTrace>,
    looping: bool,
    next_id: u64,
    tasks: HashMap<u64, JoinHandle<()>>,
}

impl ScriptedSensor {
    pub fn new(trace: SensorTrace) -> Self {
        Self {
            trace: Arc::new(trace),
            looping: false,
            next_id: 0,
            tasks: HashMap::new(),
        }
    }

    /// Restart the trace from the top instead of closing the stream at its end.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn active_subscriptions(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }
}

impl SensorSource for ScriptedSensor {
    fn subscribe(&mut self, interval: Duration) -> Result<Subscription, SensorError> {
        let runtime = Handle::try_current()
            .map_err(|_| SensorError::Unavailable("no async runtime to replay on".to_string()))?;
        if self.trace.is_empty() {
            return Err(SensorError::Unavailable("sensor trace is empty".to_string()));
        }

        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        let (tx, subscription) = Subscription::channel(id);
        let task = runtime.spawn(replay(
            Arc::clone(&self.trace),
            interval.max(MIN_INTERVAL),
            self.looping,
            tx,
        ));
        self.tasks.insert(id.0, task);
        debug!("Replaying {} samples for {id:?}", self.trace.len());
        Ok(subscription)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        if let Some(task) = self.tasks.remove(&id.0) {
            task.abort();
            debug!("Stopped replay for {id:?}");
        }
    }
}

impl Drop for ScriptedSensor {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

async fn replay(
    trace: Arc<SensorTrace>,
    interval: Duration,
    looping: bool,
    tx: mpsc::Sender<OrientationSample>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        for sample in trace.samples() {
            ticker.tick().await;
            if tx.send(*sample).await.is_err() {
                return;
            }
        }
        if !looping {
            debug!("Sensor trace exhausted");
            return;
        }
    }
}

/// A sensor that is never available, e.g. on hosts without motion hardware
/// or when the user declined access to it.
#[derive(Debug, Clone)]
pub struct UnavailableSensor {
    refusal: SensorError,
}

impl UnavailableSensor {
    pub fn new(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.is_empty() {
            "no motion sensor".to_string()
        } else {
            reason
        };
        Self {
            refusal: SensorError::Unavailable(reason),
        }
    }

    /// A sensor the user has not granted access to.
    pub fn permission_denied() -> Self {
        Self {
            refusal: SensorError::PermissionDenied,
        }
    }
}

impl Default for UnavailableSensor {
    fn default() -> Self {
        Self::new("")
    }
}

impl SensorSource for UnavailableSensor {
    fn subscribe(&mut self, _interval: Duration) -> Result<Subscription, SensorError> {
        warn!("Sensor subscription refused: {}", self.refusal);
        Err(self.refusal.clone())
    }

    fn unsubscribe(&mut self, _id: SubscriptionId) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(2);

    fn trace() -> SensorTrace {
        SensorTrace::new(vec![
            OrientationSample::yz(0.0, 0.0),
            OrientationSample::yz(0.1, 0.1),
            OrientationSample::yz(0.3, 0.3),
        ])
    }

    #[tokio::test]
    async fn replays_in_order_then_closes() {
        let mut sensor = ScriptedSensor::new(trace());
        let mut sub = sensor.subscribe(Duration::from_millis(1)).unwrap();

        let mut received = Vec::new();
        while let Some(sample) = timeout(WAIT, sub.samples.recv()).await.unwrap() {
            received.push(sample);
        }
        assert_eq!(received, trace().samples());
    }

    #[tokio::test]
    async fn looping_wraps_around() {
        let mut sensor = ScriptedSensor::new(trace()).looping(true);
        let mut sub = sensor.subscribe(Duration::from_millis(1)).unwrap();

        let mut received = Vec::new();
        for _ in 0..7 {
            received.push(timeout(WAIT, sub.samples.recv()).await.unwrap().unwrap());
        }
        assert_eq!(received[3], received[0]);
        assert_eq!(received[6], received[0]);
        sensor.unsubscribe(sub.id);
    }

    #[tokio::test]
    async fn unsubscribe_closes_stream() {
        let mut sensor = ScriptedSensor::new(trace()).looping(true);
        let mut sub = sensor.subscribe(Duration::from_millis(1)).unwrap();
        assert!(timeout(WAIT, sub.samples.recv()).await.unwrap().is_some());

        sensor.unsubscribe(sub.id);
        // Buffered samples may still drain before the stream reports closed.
        let closed = timeout(WAIT, async {
            while sub.samples.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok());
        assert_eq!(sensor.active_subscriptions(), 0);

        // Unknown ids are ignored.
        sensor.unsubscribe(sub.id);
    }

    #[tokio::test]
    async fn full_queue_waits_instead_of_dropping() {
        let samples: Vec<_> = (0..40)
            .map(|i| OrientationSample::yz(i as f32, 0.0))
            .collect();
        let mut sensor = ScriptedSensor::new(SensorTrace::new(samples.clone()));
        let mut sub = sensor.subscribe(Duration::from_millis(1)).unwrap();
        // Let the replay run into the queue limit before reading anything.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut received = Vec::new();
        while let Some(sample) = timeout(WAIT, sub.samples.recv()).await.unwrap() {
            received.push(sample);
        }
        assert_eq!(received, samples);
    }

    #[tokio::test]
    async fn subscriptions_get_distinct_ids() {
        let mut sensor = ScriptedSensor::new(trace());
        let a = sensor.subscribe(Duration::from_millis(50)).unwrap();
        let b = sensor.subscribe(Duration::from_millis(50)).unwrap();
        assert_ne!(a.id, b.id);
        sensor.unsubscribe(a.id);
        sensor.unsubscribe(b.id);
    }

    #[tokio::test]
    async fn empty_trace_is_unavailable() {
        let mut sensor = ScriptedSensor::new(SensorTrace::default());
        assert!(matches!(
            sensor.subscribe(Duration::from_millis(50)),
            Err(SensorError::Unavailable(_))
        ));
    }

    #[test]
    fn subscribe_outside_runtime_is_unavailable() {
        let mut sensor = ScriptedSensor::new(trace());
        assert!(matches!(
            sensor.subscribe(Duration::from_millis(50)),
            Err(SensorError::Unavailable(_))
        ));
    }

    #[test]
    fn unavailable_sensor_refuses() {
        let mut sensor = UnavailableSensor::new("simulator");
        assert_eq!(
            sensor.subscribe(Duration::from_millis(50)).unwrap_err(),
            SensorError::Unavailable("simulator".to_string())
        );
        sensor.unsubscribe(SubscriptionId(1));
    }

    #[test]
    fn unavailable_sensor_has_default_reason() {
        let mut sensor = UnavailableSensor::default();
        assert_eq!(
            sensor.subscribe(Duration::from_millis(50)).unwrap_err(),
            SensorError::Unavailable("no motion sensor".to_string())
        );
    }

    #[test]
    fn denied_sensor_reports_permission() {
        let mut sensor = UnavailableSensor::permission_denied();
        assert_eq!(
            sensor.subscribe(Duration::from_millis(50)).unwrap_err(),
            SensorError::PermissionDenied
        );
    }
}
