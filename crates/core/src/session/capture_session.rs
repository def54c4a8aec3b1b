use std::time::{Instant, SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::camera::domain::camera::{Camera, CameraError, CameraStream};
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::domain::landmark_engine::{EngineError, EngineFactory};
use crate::detection::infrastructure::landmark_source::LandmarkSource;
use crate::sensors::domain::motion_sensor::MotionSensor;
use crate::sensors::domain::sensor_sampler::SensorSampler;
use crate::session::config::CaptureConfig;
use crate::session::observation::{FrameObservation, ObservationMeta};
use crate::session::payload::{encode_still, SessionMeta, SessionPayload};
use crate::shared::device_info::DeviceInfo;

/// Lifecycle tag of a capture attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    Idle,
    Initializing,
    Ready,
    Scanning,
    Processing,
    Failed(SessionError),
}

/// Why a session ended without a payload.
///
/// Engine and camera failures are terminal for the attempt; insufficient
/// frames is a retryable outcome (poor lighting, excessive motion), distinct
/// from a hard error. Retry always means a new session.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SessionError {
    #[error("landmark engine is not available: {0}")]
    EngineUnavailable(String),
    #[error("landmark engine failed to initialize: {0}")]
    EngineInitFailed(String),
    #[error("camera access denied: {0}")]
    CameraDenied(String),
    #[error("no usable camera: {0}")]
    CameraUnavailable(String),
    #[error("collected {collected} frames, need at least {required}")]
    InsufficientFrames { collected: usize, required: usize },
}

impl From<EngineError> for SessionError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Unavailable(msg) => SessionError::EngineUnavailable(msg),
            EngineError::InitFailed(msg) => SessionError::EngineInitFailed(msg),
        }
    }
}

impl From<CameraError> for SessionError {
    fn from(e: CameraError) -> Self {
        match e {
            CameraError::Denied(msg) => SessionError::CameraDenied(msg),
            CameraError::Unavailable(msg) => SessionError::CameraUnavailable(msg),
        }
    }
}

/// Which completion trigger fired. Both are legitimate ends of a scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionReason {
    TargetReached,
    TimedOut,
}

/// Terminal result of a capture attempt.
#[derive(Debug)]
pub enum SessionOutcome {
    Completed {
        payload: SessionPayload,
        reason: CompletionReason,
    },
    Failed(SessionError),
}

/// Progress callback: `(frames_collected, target_frames)`.
pub type ProgressFn = Box<dyn Fn(usize, usize) + Send>;

/// The capture session state machine.
///
/// Owns the camera stream, the landmark source, the frame buffer and the
/// watchdog for exactly one capture attempt. All state lives in this struct
/// and is mutated only by the thread driving [`tick`](Self::tick); the
/// detector runs on its own worker, but its results are observed from the
/// tick, so the buffer needs no locking and the presentation layer is a
/// read-only observer.
pub struct CaptureSession {
    config: CaptureConfig,
    device: DeviceInfo,
    state: SessionState,
    engine_factory: Option<EngineFactory>,
    source: Option<LandmarkSource>,
    camera: Box<dyn Camera>,
    stream: Option<Box<dyn CameraStream>>,
    sensor: Box<dyn MotionSensor>,
    sampler: SensorSampler,
    buffer: Vec<FrameObservation>,
    started_at: Option<Instant>,
    deadline: Option<Instant>,
    on_progress: Option<ProgressFn>,
}

impl CaptureSession {
    /// Create a session in `Initializing`. Call [`initialize`](Self::initialize)
    /// to construct the engine, then [`start`](Self::start) to begin scanning.
    pub fn new(
        config: CaptureConfig,
        engine_factory: EngineFactory,
        camera: Box<dyn Camera>,
        sensor: Box<dyn MotionSensor>,
    ) -> Result<Self, &'static str> {
        config.validate()?;
        Ok(Self {
            config,
            device: DeviceInfo::current(),
            state: SessionState::Initializing,
            engine_factory: Some(engine_factory),
            source: None,
            camera,
            stream: None,
            sensor,
            sampler: SensorSampler::new(),
            buffer: Vec::new(),
            started_at: None,
            deadline: None,
            on_progress: None,
        })
    }

    pub fn set_on_progress(&mut self, callback: ProgressFn) {
        self.on_progress = Some(callback);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn frames_collected(&self) -> usize {
        self.buffer.len()
    }

    /// Fraction of the target collected, clamped to [0, 1].
    pub fn progress(&self) -> f64 {
        (self.buffer.len() as f64 / self.config.target_frames as f64).min(1.0)
    }

    /// Construct the landmark engine: `Initializing → Ready`, or a terminal
    /// failure when the engine cannot be built.
    pub fn initialize(&mut self) -> Result<(), SessionError> {
        let Some(factory) = self.engine_factory.take() else {
            return Ok(()); // already initialized
        };
        match factory(&self.config.engine) {
            Ok(engine) => {
                self.source = Some(LandmarkSource::spawn(engine));
                self.state = SessionState::Ready;
                log::debug!("landmark engine ready");
                Ok(())
            }
            Err(e) => {
                let err = SessionError::from(e);
                self.fail(err.clone());
                Err(err)
            }
        }
    }

    /// `Ready → Scanning`: open the camera at the configured constraints,
    /// clear the buffer, subscribe the motion sensor, arm the watchdog and
    /// enable the submission loop.
    pub fn start(&mut self, now: Instant) -> Result<(), SessionError> {
        if self.state != SessionState::Ready {
            log::warn!("start ignored in state {:?}", self.state);
            return Ok(());
        }
        match self.camera.open(&self.config.constraints) {
            Ok(stream) => {
                self.stream = Some(stream);
                self.buffer.clear();
                match self.sensor.subscribe() {
                    Ok(rx) => self.sampler.attach(rx),
                    Err(e) => log::debug!("motion sensors unavailable, recording zero motion: {e}"),
                }
                self.started_at = Some(now);
                self.deadline = Some(now + self.config.max_duration);
                self.state = SessionState::Scanning;
                log::info!(
                    "scan started: target {} frames, watchdog {}ms",
                    self.config.target_frames,
                    self.config.max_duration.as_millis()
                );
                Ok(())
            }
            Err(e) => {
                let err = SessionError::from(e);
                self.fail(err.clone());
                Err(err)
            }
        }
    }

    /// One scheduling tick of the submission loop.
    ///
    /// Runs only in `Scanning`; returns the outcome when this tick finalized
    /// the session. The loop never blocks on a detector result; it only
    /// gates re-submission on whether a prior submission is outstanding.
    pub fn tick(&mut self, now: Instant) -> Option<SessionOutcome> {
        if self.state != SessionState::Scanning {
            return None;
        }

        self.sampler.pump();

        // Result delivery first: an accepted frame may complete the buffer.
        if let Some(result) = self.source.as_mut().and_then(|s| s.try_result()) {
            match result {
                Ok(Some(landmarks)) => self.accept_frame(landmarks, now),
                Ok(None) => {} // missed sample, not an error
                Err(e) => log::warn!("detector error, tick skipped: {e}"),
            }
        }

        // Completion triggers race; whichever is observed first wins and
        // finalization disarms the other.
        if self.buffer.len() >= self.config.target_frames {
            return Some(self.finalize(now, CompletionReason::TargetReached));
        }
        if self.deadline.is_some_and(|deadline| now >= deadline) {
            return Some(self.finalize(now, CompletionReason::TimedOut));
        }

        // Fire-and-forget submission, gated on the capacity-1 in-flight slot.
        if self.source.as_ref().is_some_and(|s| !s.busy()) {
            if let Some(frame) = self.stream.as_mut().and_then(|s| s.try_frame()) {
                if let Some(source) = self.source.as_mut() {
                    if let Err(e) = source.submit(frame) {
                        log::warn!("frame submission failed: {e}");
                    }
                }
            }
        }

        None
    }

    fn accept_frame(&mut self, landmarks: FaceLandmarks, now: Instant) {
        let elapsed = self
            .started_at
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default();
        self.buffer.push(FrameObservation {
            landmarks,
            sensors: self.sampler.snapshot(),
            meta: ObservationMeta {
                timestamp: elapsed.as_millis() as u64,
                camera_facing: self.config.constraints.facing,
            },
        });
        if let Some(callback) = &self.on_progress {
            callback(self.buffer.len(), self.config.target_frames);
        }
    }

    /// Runs exactly once per session: `tick` only reaches it from `Scanning`,
    /// and the first thing it does is leave that state, so a race between
    /// the two completion triggers cannot fire it twice. The buffer is
    /// frozen from this point on.
    fn finalize(&mut self, now: Instant, reason: CompletionReason) -> SessionOutcome {
        self.state = SessionState::Processing;
        self.deadline = None;

        let still_jpeg = if self.config.capture_still {
            self.stream
                .as_mut()
                .and_then(|s| s.try_frame())
                .and_then(|frame| match encode_still(&frame) {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        log::warn!("still capture failed: {e}");
                        None
                    }
                })
        } else {
            None
        };

        self.release();

        let collected = self.buffer.len();
        log::info!("scan finished ({reason:?}): {collected} frames");

        if collected < self.config.min_frames {
            let err = SessionError::InsufficientFrames {
                collected,
                required: self.config.min_frames,
            };
            self.state = SessionState::Failed(err.clone());
            return SessionOutcome::Failed(err);
        }

        let duration_ms = self
            .started_at
            .map(|t| now.saturating_duration_since(t).as_millis() as u64)
            .unwrap_or(0);
        let captured_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let payload = SessionPayload {
            data: std::mem::take(&mut self.buffer),
            meta: SessionMeta {
                captured_at,
                duration_ms,
                frame_count: collected,
                device: self.device.clone(),
            },
            still_jpeg,
        };
        self.state = SessionState::Idle;
        SessionOutcome::Completed { payload, reason }
    }

    /// Release every owned resource: stop the camera tracks, disarm the
    /// watchdog, drop the landmark source (cancelling any in-flight
    /// submission) and stop the motion sensor.
    ///
    /// The single teardown path: finalization, supersession and drop all
    /// route through here. Idempotent; a second call has no further effect.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
        self.deadline = None;
        self.source = None;
        self.sampler.detach();
        self.sensor.stop();
    }

    /// Supersede or tear down the session: release everything and return to
    /// `Idle` so a newer session can take the camera.
    pub fn cancel(&mut self) {
        self.release();
        self.state = SessionState::Idle;
    }

    fn fail(&mut self, err: SessionError) {
        log::warn!("capture session failed: {err}");
        self.release();
        self.state = SessionState::Failed(err);
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}
