//! Mock audio backend and sensor source for deterministic tests.
//!
//! Both mocks are cheap to clone; clones share state so a test can keep one
//! for inspection while the controller owns another.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;

use crate::audio::{AudioBackend, AudioHandle, SoundAsset};
use crate::error::SensorError;
use crate::sample::OrientationSample;
use crate::sensor::{SensorSource, Subscription, SubscriptionId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything the mock audio backend was asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioLog {
    /// Assets successfully loaded, in order. Handle ids are 1-based indices.
    pub loads: Vec<String>,
    pub failed_loads: Vec<String>,
    pub plays: Vec<u64>,
    pub stops: Vec<u64>,
    pub releases: Vec<u64>,
    pub volumes: Vec<(u64, f32)>,
    pub looping: Vec<(u64, bool)>,
    /// Open sensor streams observed at each release (when a sensor is attached).
    pub open_streams_at_release: Vec<usize>,
}

#[derive(Default)]
struct AudioState {
    log: AudioLog,
    failing: HashSet<String>,
    failing_play: HashSet<String>,
    sensor: Option<MockSensor>,
}

/// Recording audio backend.
#[derive(Clone, Default)]
pub struct MockAudio {
    state: Arc<Mutex<AudioState>>,
}

impl MockAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later load of `asset` fail.
    pub fn fail_asset(&self, asset: &str) {
        lock(&self.state).failing.insert(asset.to_string());
    }

    /// Make `play` fail on every handle later loaded for `asset`.
    pub fn fail_play(&self, asset: &str) {
        lock(&self.state).failing_play.insert(asset.to_string());
    }

    /// Record the sensor's open stream count whenever a handle is released.
    pub fn attach_sensor(&self, sensor: MockSensor) {
        lock(&self.state).sensor = Some(sensor);
    }

    pub fn snapshot(&self) -> AudioLog {
        lock(&self.state).log.clone()
    }
}

impl AudioBackend for MockAudio {
    type Handle = MockSound;

    fn load(&self, asset: &SoundAsset) -> Result<MockSound> {
        let mut state = lock(&self.state);
        if state.failing.contains(asset.as_str()) {
            state.log.failed_loads.push(asset.to_string());
            return Err(anyhow!("mock: cannot open {asset}"));
        }
        state.log.loads.push(asset.to_string());
        Ok(MockSound {
            id: state.log.loads.len() as u64,
            asset: asset.to_string(),
            state: Arc::clone(&self.state),
        })
    }
}

/// Handle produced by [`MockAudio`].
pub struct MockSound {
    id: u64,
    asset: String,
    state: Arc<Mutex<AudioState>>,
}

impl MockSound {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl AudioHandle for MockSound {
    fn set_volume(&mut self, volume: f32) -> Result<()> {
        lock(&self.state).log.volumes.push((self.id, volume));
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) -> Result<()> {
        lock(&self.state).log.looping.push((self.id, looping));
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        if state.failing_play.contains(&self.asset) {
            return Err(anyhow!("mock: no output for {}", self.asset));
        }
        state.log.plays.push(self.id);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        lock(&self.state).log.stops.push(self.id);
        Ok(())
    }

    fn release(self) {
        let mut state = lock(&self.state);
        let open = state.sensor.as_ref().map(MockSensor::open_count);
        if let Some(open) = open {
            state.log.open_streams_at_release.push(open);
        }
        state.log.releases.push(self.id);
    }
}

#[derive(Default)]
struct SensorState {
    subscribes: usize,
    unsubscribes: usize,
    intervals: Vec<Duration>,
    senders: HashMap<u64, mpsc::Sender<OrientationSample>>,
    next_id: u64,
    unavailable: bool,
    denied: bool,
}

/// Sensor source whose samples are pushed by the test.
#[derive(Clone, Default)]
pub struct MockSensor {
    state: Arc<Mutex<SensorState>>,
}

impl MockSensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sensor that refuses every subscription.
    pub fn unavailable() -> Self {
        let sensor = Self::default();
        sensor.set_unavailable(true);
        sensor
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        lock(&self.state).unavailable = unavailable;
    }

    /// Refuse later subscriptions as if the user declined sensor access.
    pub fn deny_permission(&self) {
        lock(&self.state).denied = true;
    }

    /// Deliver a sample to every open stream. Returns `false` if none is open.
    pub fn push(&self, sample: OrientationSample) -> bool {
        let state = lock(&self.state);
        for tx in state.senders.values() {
            let _ = tx.try_send(sample);
        }
        !state.senders.is_empty()
    }

    pub fn open_count(&self) -> usize {
        lock(&self.state).senders.len()
    }

    pub fn subscribe_count(&self) -> usize {
        lock(&self.state).subscribes
    }

    pub fn unsubscribe_count(&self) -> usize {
        lock(&self.state).unsubscribes
    }

    pub fn intervals(&self) -> Vec<Duration> {
        lock(&self.state).intervals.clone()
    }
}

impl SensorSource for MockSensor {
    fn subscribe(&mut self, interval: Duration) -> Result<Subscription, SensorError> {
        let mut state = lock(&self.state);
        if state.unavailable {
            return Err(SensorError::Unavailable("mock sensor disabled".to_string()));
        }
        if state.denied {
            return Err(SensorError::PermissionDenied);
        }
        state.next_id += 1;
        let id = state.next_id;
        let (tx, subscription) = Subscription::channel(SubscriptionId(id));
        state.senders.insert(id, tx);
        state.subscribes += 1;
        state.intervals.push(interval);
        Ok(subscription)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        let mut state = lock(&self.state);
        if state.senders.remove(&id.0).is_some() {
            state.unsubscribes += 1;
        }
    }
}
