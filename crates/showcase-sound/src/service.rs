// Tilt sound service
//
// Drives a GyroVolumeController on the tokio runtime: loads run on the
// blocking pool, sensor samples are pumped by a per-session task, and
// previews are timed by a task that races the window against the
// session's end signal.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::audio::{AudioBackend, SoundAsset};
use crate::config::SoundConfig;
use crate::controller::{
    Activation, ControllerState, GyroVolumeController, LoadOutcome, LoadTicket, SessionMode,
    StartOutcome,
};
use crate::error::SoundError;
use crate::sensor::SensorSource;

type Shared<A, S> = Arc<Mutex<GyroVolumeController<<A as AudioBackend>::Handle, S>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Start/stop surface handed to the presentation layer.
///
/// Must be used from within a tokio runtime. Dropping the service stops
/// any session it owns.
pub struct TiltSoundService<A: AudioBackend, S: SensorSource> {
    backend: Arc<A>,
    controller: Shared<A, S>,
    preview_window: Duration,
    playing: watch::Receiver<bool>,
    volume: watch::Receiver<f32>,
}

impl<A: AudioBackend, S: SensorSource> TiltSoundService<A, S> {
    pub fn new(backend: A, sensor: S, config: &SoundConfig) -> Result<Self, SoundError> {
        let controller = GyroVolumeController::new(sensor, config)?;
        let playing = controller.watch_playing();
        let volume = controller.watch_volume();
        Ok(Self {
            backend: Arc::new(backend),
            controller: Arc::new(Mutex::new(controller)),
            preview_window: config.preview_window(),
            playing,
            volume,
        })
    }

    /// Begin a tilt session for `asset`. Returns immediately; ignored while
    /// a session is loading or already playing.
    pub fn start(&self, asset: impl Into<SoundAsset>) {
        let outcome = lock(&self.controller).start(asset.into());
        if let StartOutcome::Loading(ticket) = outcome {
            self.spawn_load(ticket);
        }
    }

    /// Tear down any session. Idempotent.
    pub fn stop(&self) {
        lock(&self.controller).stop();
    }

    /// Play `asset` at the preview volume for the preview window.
    ///
    /// Resolves `true` if the window elapsed uninterrupted, `false` if the
    /// preview was stopped, replaced, failed to load, or was rejected
    /// because another load was in flight.
    pub async fn play_full_volume(&self, asset: impl Into<SoundAsset>) -> bool {
        let (outcome, done) = lock(&self.controller).start_preview(asset.into());
        if let StartOutcome::Loading(ticket) = outcome {
            self.spawn_load(ticket);
        }
        done.await.unwrap_or(false)
    }

    pub fn is_playing(&self) -> bool {
        *self.playing.borrow()
    }

    pub fn state(&self) -> ControllerState {
        lock(&self.controller).state()
    }

    /// Observable playing flag.
    pub fn playing(&self) -> watch::Receiver<bool> {
        self.playing.clone()
    }

    /// Observable volume level, for visual feedback.
    pub fn volume(&self) -> watch::Receiver<f32> {
        self.volume.clone()
    }

    fn spawn_load(&self, ticket: LoadTicket) {
        let backend = Arc::clone(&self.backend);
        let controller = Arc::clone(&self.controller);
        let window = self.preview_window;

        tokio::spawn(async move {
            let LoadTicket { token, asset, .. } = ticket;
            let loaded = tokio::task::spawn_blocking(move || backend.load(&asset))
                .await
                .unwrap_or_else(|e| Err(anyhow!("load task failed: {e}")));

            let outcome = lock(&controller).complete_load(token, loaded);
            match outcome {
                LoadOutcome::Activated(activation) => drive::<A, S>(controller, activation, window),
                LoadOutcome::Discarded => debug!("Load for {token:?} arrived after teardown"),
                LoadOutcome::Failed(e) => debug!("Session {token:?} did not start: {e}"),
            }
        });
    }
}

impl<A: AudioBackend, S: SensorSource> Drop for TiltSoundService<A, S> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn drive<A: AudioBackend, S: SensorSource>(
    controller: Shared<A, S>,
    activation: Activation,
    window: Duration,
) {
    let Activation {
        token,
        mode,
        samples,
        mut ended,
    } = activation;

    match (mode, samples) {
        (SessionMode::Tilt, Some(mut samples)) => {
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        sample = samples.recv() => match sample {
                            Some(sample) => {
                                lock(&controller).on_sample(token, sample);
                            }
                            None => {
                                debug!("Sensor stream for {token:?} closed");
                                break;
                            }
                        },
                        _ = &mut ended => break,
                    }
                }
            });
        }
        (SessionMode::Preview, _) => {
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(window) => {
                        if lock(&controller).finish_preview(token) {
                            info!("Preview {token:?} completed");
                        }
                    }
                    _ = &mut ended => debug!("Preview {token:?} cancelled"),
                }
            });
        }
        (SessionMode::Tilt, None) => debug!("Tilt session {token:?} has no sensor stream"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::OrientationSample;
    use crate::testing::{MockAudio, MockSensor};
    use tokio::time::{sleep, timeout};

    const WAIT: Duration = Duration::from_secs(2);

    fn service(config: SoundConfig) -> (TiltSoundService<MockAudio, MockSensor>, MockAudio, MockSensor) {
        let audio = MockAudio::new();
        let sensor = MockSensor::new();
        let service = TiltSoundService::new(audio.clone(), sensor.clone(), &config).unwrap();
        (service, audio, sensor)
    }

    async fn wait_playing(service: &TiltSoundService<MockAudio, MockSensor>) {
        let mut playing = service.playing();
        timeout(WAIT, playing.wait_for(|p| *p))
            .await
            .expect("session did not start")
            .unwrap();
    }

    #[tokio::test]
    async fn test_samples_drive_volume_signal() {
        let (service, audio, sensor) = service(SoundConfig::default());
        service.start("a.mp3");
        wait_playing(&service).await;
        assert_eq!(service.state(), ControllerState::Active);

        assert!(sensor.push(OrientationSample::yz(0.0, 0.0)));
        assert!(sensor.push(OrientationSample::yz(0.3, 0.3)));

        let mut volume = service.volume();
        timeout(WAIT, volume.wait_for(|v| (v - 0.65).abs() < 1e-6))
            .await
            .expect("volume never reached 0.65")
            .unwrap();
        let (_, applied) = *audio.snapshot().volumes.last().unwrap();
        assert!((applied - 0.65).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_stop_releases_session() {
        let (service, audio, sensor) = service(SoundConfig::default());
        service.start("a.mp3");
        wait_playing(&service).await;

        service.stop();
        service.stop();
        assert!(!service.is_playing());
        assert_eq!(service.state(), ControllerState::Idle);
        assert_eq!(sensor.subscribe_count(), sensor.unsubscribe_count());
        let log = audio.snapshot();
        assert_eq!(log.loads.len(), log.releases.len());
    }

    #[tokio::test]
    async fn test_stop_before_load_completes() {
        let (service, audio, sensor) = service(SoundConfig::default());
        // The load task cannot run before this task yields.
        service.start("a.mp3");
        service.stop();
        sleep(Duration::from_millis(100)).await;

        assert!(!service.is_playing());
        assert_eq!(sensor.subscribe_count(), 0);
        let log = audio.snapshot();
        assert!(log.plays.is_empty());
        assert_eq!(log.loads.len(), log.releases.len());
    }

    #[tokio::test]
    async fn test_preview_completes() {
        let config = SoundConfig {
            preview_window_ms: 30,
            ..Default::default()
        };
        let (service, audio, _) = service(config);
        let completed = timeout(WAIT, service.play_full_volume("a.mp3")).await.unwrap();
        assert!(completed);
        assert!(!service.is_playing());
        assert_eq!(audio.snapshot().releases.len(), 1);
    }

    #[tokio::test]
    async fn test_preview_interrupted_by_stop_resolves_false() {
        let config = SoundConfig {
            preview_window_ms: 60_000,
            ..Default::default()
        };
        let (service, _, _) = service(config);
        let preview = service.play_full_volume("a.mp3");
        let interrupt = async {
            wait_playing(&service).await;
            service.stop();
        };
        let (completed, ()) = timeout(WAIT, async { tokio::join!(preview, interrupt) })
            .await
            .expect("preview was left pending");
        assert!(!completed);
    }

    #[tokio::test]
    async fn test_preview_interrupted_by_start_resolves_false() {
        let config = SoundConfig {
            preview_window_ms: 60_000,
            ..Default::default()
        };
        let (service, audio, _) = service(config);
        let preview = service.play_full_volume("a.mp3");
        let interrupt = async {
            wait_playing(&service).await;
            service.start("b.mp3");
        };
        let (completed, ()) = timeout(WAIT, async { tokio::join!(preview, interrupt) })
            .await
            .expect("preview was left pending");
        assert!(!completed);

        wait_playing(&service).await;
        assert_eq!(audio.snapshot().loads, vec!["a.mp3".to_string(), "b.mp3".to_string()]);
    }

    #[tokio::test]
    async fn test_preview_of_missing_asset_resolves_false() {
        let (service, audio, _) = service(SoundConfig::default());
        audio.fail_asset("missing.mp3");
        let completed = timeout(WAIT, service.play_full_volume("missing.mp3")).await.unwrap();
        assert!(!completed);
        assert!(!service.is_playing());
    }

    #[tokio::test]
    async fn test_playback_failure_leaves_service_idle() {
        let (service, audio, sensor) = service(SoundConfig::default());
        audio.fail_play("silent.mp3");
        service.start("silent.mp3");
        sleep(Duration::from_millis(100)).await;

        assert!(!service.is_playing());
        assert_eq!(service.state(), ControllerState::Idle);
        assert_eq!(sensor.subscribe_count(), 0);
        let log = audio.snapshot();
        assert!(log.plays.is_empty());
        assert_eq!(log.loads.len(), log.releases.len());

        // A later start of a playable sound still works.
        service.start("a.mp3");
        wait_playing(&service).await;
    }

    #[tokio::test]
    async fn test_unavailable_sensor_leaves_service_idle() {
        let audio = MockAudio::new();
        let service =
            TiltSoundService::new(audio.clone(), MockSensor::unavailable(), &SoundConfig::default())
                .unwrap();
        service.start("a.mp3");
        sleep(Duration::from_millis(100)).await;

        assert!(!service.is_playing());
        assert_eq!(service.state(), ControllerState::Idle);
        let log = audio.snapshot();
        assert_eq!(log.loads.len(), log.releases.len());
    }

    #[tokio::test]
    async fn test_drop_stops_session() {
        let (service, audio, sensor) = service(SoundConfig::default());
        let playing = service.playing();
        service.start("a.mp3");
        wait_playing(&service).await;

        drop(service);
        assert!(!*playing.borrow());
        assert_eq!(sensor.unsubscribe_count(), 1);
        assert_eq!(audio.snapshot().releases.len(), 1);
    }
}
