//! Session state machine binding one audio handle to one sensor subscription.
//!
//! The controller is synchronous: loads and sample delivery happen
//! elsewhere (see [`crate::service`]) and are fed back in with the
//! [`SessionToken`] they were issued for. A token that no longer matches
//! the current phase marks a late completion or a stale sample, which is
//! discarded instead of resurrecting a torn-down session.

use std::mem;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::audio::{AudioHandle, SoundAsset};
use crate::config::SoundConfig;
use crate::error::SoundError;
use crate::sample::{Baseline, OrientationSample};
use crate::sensor::{SensorSource, SubscriptionId};
use crate::volume::{TiltMapper, VolumeRange};

/// Identity of one start attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    /// Audio load in flight.
    Starting,
    /// Audio looping; for tilt sessions the sensor is subscribed.
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Volume follows device tilt.
    Tilt,
    /// Volume held at the preview level for a fixed window.
    Preview,
}

/// Work order for the caller: load `asset` and report back with `token`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket {
    pub token: SessionToken,
    pub asset: SoundAsset,
    pub mode: SessionMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    Loading(LoadTicket),
    /// A tilt session is already playing; nothing changed.
    AlreadyActive,
    /// A load is already in flight; nothing changed.
    AlreadyStarting,
}

impl StartOutcome {
    pub fn into_ticket(self) -> Option<LoadTicket> {
        match self {
            StartOutcome::Loading(ticket) => Some(ticket),
            _ => None,
        }
    }
}

/// Everything the driver needs to keep a freshly active session fed.
#[derive(Debug)]
pub struct Activation {
    pub token: SessionToken,
    pub mode: SessionMode,
    /// Sensor stream (tilt sessions only).
    pub samples: Option<mpsc::Receiver<OrientationSample>>,
    /// Completes (with an error) once the session is torn down.
    pub ended: oneshot::Receiver<()>,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Activated(Activation),
    /// The session was stopped or replaced while loading; the handle was
    /// released without playing.
    Discarded,
    Failed(SoundError),
}

struct Pending {
    token: SessionToken,
    asset: SoundAsset,
    mode: SessionMode,
    preview_done: Option<oneshot::Sender<bool>>,
}

struct Session<H> {
    token: SessionToken,
    asset: SoundAsset,
    mode: SessionMode,
    handle: H,
    subscription: Option<SubscriptionId>,
    mapper: TiltMapper,
    preview_done: Option<oneshot::Sender<bool>>,
    end: oneshot::Sender<()>,
}

enum Phase<H> {
    Idle,
    Starting(Pending),
    Active(Session<H>),
}

/// Bridges a [`SensorSource`] to an audio handle and owns both for the
/// lifetime of a session.
pub struct GyroVolumeController<H: AudioHandle, S: SensorSource> {
    sensor: S,
    range: VolumeRange,
    sample_interval: Duration,
    preview_volume: f32,
    phase: Phase<H>,
    next_token: u64,
    playing: watch::Sender<bool>,
    volume: watch::Sender<f32>,
}

impl<H: AudioHandle, S: SensorSource> GyroVolumeController<H, S> {
    pub fn new(sensor: S, config: &SoundConfig) -> Result<Self, SoundError> {
        config.validate()?;
        let range = config.volume_range()?;
        let (playing, _) = watch::channel(false);
        let (volume, _) = watch::channel(range.base());
        Ok(Self {
            sensor,
            range,
            sample_interval: config.sample_interval(),
            preview_volume: config.preview_volume,
            phase: Phase::Idle,
            next_token: 1,
            playing,
            volume,
        })
    }

    pub fn state(&self) -> ControllerState {
        match self.phase {
            Phase::Idle => ControllerState::Idle,
            Phase::Starting(_) => ControllerState::Starting,
            Phase::Active(_) => ControllerState::Active,
        }
    }

    pub fn is_playing(&self) -> bool {
        *self.playing.borrow()
    }

    /// Current volume level; the base level while idle.
    pub fn volume(&self) -> f32 {
        *self.volume.borrow()
    }

    pub fn watch_playing(&self) -> watch::Receiver<bool> {
        self.playing.subscribe()
    }

    pub fn watch_volume(&self) -> watch::Receiver<f32> {
        self.volume.subscribe()
    }

    /// Token of the pending or active session.
    pub fn current_token(&self) -> Option<SessionToken> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Starting(pending) => Some(pending.token),
            Phase::Active(session) => Some(session.token),
        }
    }

    pub fn mode(&self) -> Option<SessionMode> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Starting(pending) => Some(pending.mode),
            Phase::Active(session) => Some(session.mode),
        }
    }

    pub fn baseline(&self) -> Option<Baseline> {
        match &self.phase {
            Phase::Active(session) => session.mapper.baseline(),
            _ => None,
        }
    }

    /// Request a tilt session. Ignored while a load is in flight or a tilt
    /// session is already active; interrupts an active preview.
    pub fn start(&mut self, asset: SoundAsset) -> StartOutcome {
        match &self.phase {
            Phase::Starting(pending) => {
                debug!(
                    "Ignoring start of {asset}: {} is still loading",
                    pending.asset
                );
                return StartOutcome::AlreadyStarting;
            }
            Phase::Active(session) if session.mode == SessionMode::Tilt => {
                debug!("Ignoring start of {asset}: {} is already playing", session.asset);
                return StartOutcome::AlreadyActive;
            }
            Phase::Active(session) => {
                info!("Interrupting preview of {} for {asset}", session.asset);
            }
            Phase::Idle => {}
        }
        self.teardown();
        StartOutcome::Loading(self.begin(asset, SessionMode::Tilt, None))
    }

    /// Request a full-volume preview. The receiver resolves `true` only if
    /// the preview window elapses while the preview is still active.
    pub fn start_preview(&mut self, asset: SoundAsset) -> (StartOutcome, oneshot::Receiver<bool>) {
        let (done_tx, done_rx) = oneshot::channel();
        match &self.phase {
            Phase::Starting(pending) => {
                debug!(
                    "Rejecting preview of {asset}: {} is still loading",
                    pending.asset
                );
                let _ = done_tx.send(false);
                return (StartOutcome::AlreadyStarting, done_rx);
            }
            Phase::Active(session) => {
                info!("Replacing session for {} with preview of {asset}", session.asset);
            }
            Phase::Idle => {}
        }
        self.teardown();
        let ticket = self.begin(asset, SessionMode::Preview, Some(done_tx));
        (StartOutcome::Loading(ticket), done_rx)
    }

    fn begin(
        &mut self,
        asset: SoundAsset,
        mode: SessionMode,
        preview_done: Option<oneshot::Sender<bool>>,
    ) -> LoadTicket {
        let token = SessionToken(self.next_token);
        self.next_token += 1;
        debug!("Loading {asset} for {mode:?} session {token:?}");
        self.phase = Phase::Starting(Pending {
            token,
            asset: asset.clone(),
            mode,
            preview_done,
        });
        LoadTicket { token, asset, mode }
    }

    /// Feed back the result of loading the asset named by a [`LoadTicket`].
    pub fn complete_load(&mut self, token: SessionToken, loaded: anyhow::Result<H>) -> LoadOutcome {
        let pending = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Starting(pending) if pending.token == token => pending,
            other => {
                self.phase = other;
                match loaded {
                    Ok(handle) => {
                        warn!("Releasing late load for stale session {token:?}");
                        handle.release();
                    }
                    Err(e) => debug!("Ignoring failed load for stale session {token:?}: {e:#}"),
                }
                return LoadOutcome::Discarded;
            }
        };
        let Pending {
            asset,
            mode,
            preview_done,
            ..
        } = pending;

        let mut handle = match loaded {
            Ok(handle) => handle,
            Err(e) => {
                let err = SoundError::AssetLoad {
                    asset: asset.to_string(),
                    reason: format!("{e:#}"),
                };
                error!("{err}");
                settle(preview_done, false);
                return LoadOutcome::Failed(err);
            }
        };

        let initial = match mode {
            SessionMode::Tilt => self.range.base(),
            SessionMode::Preview => self.preview_volume,
        };
        if let Err(e) = prepare(&mut handle, initial) {
            let err = SoundError::Playback {
                asset: asset.to_string(),
                reason: format!("{e:#}"),
            };
            error!("{err}");
            discard(handle);
            settle(preview_done, false);
            return LoadOutcome::Failed(err);
        }

        let (subscription, samples) = match mode {
            SessionMode::Tilt => match self.sensor.subscribe(self.sample_interval) {
                Ok(sub) => (Some(sub.id), Some(sub.samples)),
                Err(e) => {
                    warn!("Cannot drive volume for {asset}: {e}");
                    discard(handle);
                    settle(preview_done, false);
                    return LoadOutcome::Failed(SoundError::SubscriptionUnavailable(e));
                }
            },
            SessionMode::Preview => (None, None),
        };

        let (end, ended) = oneshot::channel();
        self.phase = Phase::Active(Session {
            token,
            asset: asset.clone(),
            mode,
            handle,
            subscription,
            mapper: TiltMapper::new(self.range),
            preview_done,
            end,
        });
        self.playing.send_replace(true);
        self.volume.send_replace(initial);
        info!("Playing {asset} ({mode:?} session {token:?})");

        LoadOutcome::Activated(Activation {
            token,
            mode,
            samples,
            ended,
        })
    }

    /// Apply one sensor sample. Returns the new level, or `None` when the
    /// sample set the baseline or belongs to a session that is gone.
    pub fn on_sample(&mut self, token: SessionToken, sample: OrientationSample) -> Option<f32> {
        let Phase::Active(session) = &mut self.phase else {
            return None;
        };
        if session.token != token || session.mode != SessionMode::Tilt {
            return None;
        }
        let level = session.mapper.feed(&sample)?;
        if let Err(e) = session.handle.set_volume(level) {
            warn!("Failed to set volume of {}: {e:#}", session.asset);
        }
        self.volume.send_replace(level);
        Some(level)
    }

    /// Called when the preview window of `token` elapses. Settles the
    /// preview as completed and ends the session.
    pub fn finish_preview(&mut self, token: SessionToken) -> bool {
        let done = match &mut self.phase {
            Phase::Active(session)
                if session.token == token && session.mode == SessionMode::Preview =>
            {
                session.preview_done.take()
            }
            _ => return false,
        };
        settle(done, true);
        self.teardown();
        true
    }

    /// Tear down any pending or active session. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if matches!(self.phase, Phase::Idle) {
            return;
        }
        self.teardown();
    }

    fn teardown(&mut self) {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::Starting(pending) => {
                debug!(
                    "Cancelled load of {} ({:?})",
                    pending.asset, pending.token
                );
                settle(pending.preview_done, false);
            }
            Phase::Active(session) => self.release(session),
        }
    }

    fn release(&mut self, session: Session<H>) {
        let Session {
            token,
            asset,
            mut handle,
            subscription,
            preview_done,
            end,
            ..
        } = session;

        // Samples must stop before the handle goes away.
        if let Some(id) = subscription {
            self.sensor.unsubscribe(id);
        }
        if let Err(e) = handle.stop() {
            warn!("Failed to stop {asset}: {e:#}");
        }
        handle.release();

        self.playing.send_replace(false);
        self.volume.send_replace(self.range.base());
        drop(end);
        settle(preview_done, false);
        info!("Stopped {asset} (session {token:?})");
    }

    #[cfg(test)]
    fn handle(&self) -> Option<&H> {
        match &self.phase {
            Phase::Active(session) => Some(&session.handle),
            _ => None,
        }
    }
}

impl<H: AudioHandle, S: SensorSource> Drop for GyroVolumeController<H, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn prepare<H: AudioHandle>(handle: &mut H, volume: f32) -> anyhow::Result<()> {
    handle.set_looping(true)?;
    handle.set_volume(volume)?;
    handle.play()
}

fn discard<H: AudioHandle>(mut handle: H) {
    if let Err(e) = handle.stop() {
        debug!("Stop during discard failed: {e:#}");
    }
    handle.release();
}

fn settle(done: Option<oneshot::Sender<bool>>, completed: bool) {
    if let Some(done) = done {
        let _ = done.send(completed);
    }
}
