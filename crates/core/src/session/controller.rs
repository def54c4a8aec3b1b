use std::time::Instant;

use crate::camera::domain::camera::Camera;
use crate::detection::domain::landmark_engine::EngineFactory;
use crate::scoring::domain::scoring_client::{ScoringClient, Verdict};
use crate::sensors::domain::motion_sensor::MotionSensor;
use crate::session::capture_session::{
    CaptureSession, SessionError, SessionOutcome, SessionState,
};
use crate::session::config::CaptureConfig;
use crate::session::payload::SessionPayload;

/// Messages surfaced to the presentation layer.
#[derive(Debug)]
pub enum ControllerEvent {
    Progress { collected: usize, target: usize },
    /// Scan finished and the scoring service answered.
    Completed(Verdict),
    /// Scan finished; no scoring client is configured, here is the payload.
    PayloadReady(SessionPayload),
    SessionFailed(SessionError),
    ScoringFailed(String),
}

/// Binds capture sessions to the outside world.
///
/// Owns at most one live session, supersedes it on a new request (the old
/// camera handle is released before the new session may acquire one), and
/// relays finished payloads to the scoring collaborator. Presentation reads
/// state through here and never mutates it. Retries are the caller's call:
/// the controller never restarts a failed session on its own.
pub struct SessionController {
    session: Option<CaptureSession>,
    scoring: Option<Box<dyn ScoringClient>>,
    last_progress: usize,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            session: None,
            scoring: None,
            last_progress: 0,
        }
    }

    pub fn with_scoring(scoring: Box<dyn ScoringClient>) -> Self {
        Self {
            session: None,
            scoring: Some(scoring),
            last_progress: 0,
        }
    }

    /// Create and initialize a new session, fully releasing any active one
    /// first. On an initialization failure the failed session is kept so
    /// its state stays observable.
    pub fn begin(
        &mut self,
        config: CaptureConfig,
        engine_factory: EngineFactory,
        camera: Box<dyn Camera>,
        sensor: Box<dyn MotionSensor>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(mut old) = self.session.take() {
            log::info!("superseding active capture session");
            old.cancel();
        }
        self.last_progress = 0;

        let mut session = CaptureSession::new(config, engine_factory, camera, sensor)?;
        let init = session.initialize();
        self.session = Some(session);
        init.map_err(Into::into)
    }

    /// Start scanning on the active session.
    pub fn start(&mut self, now: Instant) -> Result<(), Box<dyn std::error::Error>> {
        let session = self.session.as_mut().ok_or("no active capture session")?;
        session.start(now).map_err(Into::into)
    }

    /// Drive the active session one tick and translate what happened.
    pub fn poll(&mut self, now: Instant) -> Option<ControllerEvent> {
        let session = self.session.as_mut()?;
        match session.tick(now) {
            Some(SessionOutcome::Failed(err)) => Some(ControllerEvent::SessionFailed(err)),
            Some(SessionOutcome::Completed { payload, .. }) => Some(self.deliver(payload)),
            None => {
                let collected = session.frames_collected();
                if collected != self.last_progress {
                    self.last_progress = collected;
                    Some(ControllerEvent::Progress {
                        collected,
                        target: session.config().target_frames,
                    })
                } else {
                    None
                }
            }
        }
    }

    fn deliver(&self, payload: SessionPayload) -> ControllerEvent {
        match &self.scoring {
            None => ControllerEvent::PayloadReady(payload),
            Some(client) => match client.score(&payload) {
                Ok(verdict) => ControllerEvent::Completed(verdict),
                Err(e) => {
                    log::warn!("scoring request failed: {e}");
                    ControllerEvent::ScoringFailed(e.to_string())
                }
            },
        }
    }

    /// Read-only state snapshot for presentation.
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map(|s| s.state().clone())
            .unwrap_or(SessionState::Idle)
    }

    pub fn progress(&self) -> f64 {
        self.session.as_ref().map(|s| s.progress()).unwrap_or(0.0)
    }

    pub fn frames_collected(&self) -> usize {
        self.session
            .as_ref()
            .map(|s| s.frames_collected())
            .unwrap_or(0)
    }

    /// Tear down the active session; the camera is released immediately.
    pub fn cancel(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.cancel();
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::camera::domain::camera::{CameraError, CameraStream, StreamConstraints};
    use crate::detection::domain::face_landmarks::FaceLandmarks;
    use crate::detection::domain::landmark_engine::LandmarkEngine;
    use crate::scoring::domain::scoring_client::ScoringError;
    use crate::sensors::infrastructure::null_motion_sensor::NullMotionSensor;
    use crate::shared::constants::LANDMARK_LEN;
    use crate::shared::frame_image::FrameImage;

    // --- Stubs ---

    struct ScriptedStream {
        next_index: usize,
        stops: Arc<AtomicUsize>,
    }

    impl CameraStream for ScriptedStream {
        fn try_frame(&mut self) -> Option<FrameImage> {
            let frame = FrameImage::new(vec![64u8; 8 * 6 * 3], 8, 6, self.next_index);
            self.next_index += 1;
            Some(frame)
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::Relaxed);
        }
    }

    struct StubCamera {
        stops: Arc<AtomicUsize>,
    }

    impl StubCamera {
        fn new() -> Self {
            Self {
                stops: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Camera for StubCamera {
        fn open(
            &mut self,
            _constraints: &StreamConstraints,
        ) -> Result<Box<dyn CameraStream>, CameraError> {
            Ok(Box::new(ScriptedStream {
                next_index: 0,
                stops: self.stops.clone(),
            }))
        }
    }

    struct AlwaysFaceEngine;

    impl LandmarkEngine for AlwaysFaceEngine {
        fn process(
            &mut self,
            _frame: &FrameImage,
        ) -> Result<Vec<FaceLandmarks>, Box<dyn std::error::Error>> {
            Ok(vec![FaceLandmarks::from_flat(vec![0.5; LANDMARK_LEN]).unwrap()])
        }
    }

    fn face_factory() -> EngineFactory {
        Box::new(|_| Ok(Box::new(AlwaysFaceEngine)))
    }

    struct StubScoringClient {
        verdict: Result<Verdict, String>,
    }

    impl ScoringClient for StubScoringClient {
        fn score(&self, _payload: &SessionPayload) -> Result<Verdict, ScoringError> {
            match &self.verdict {
                Ok(v) => Ok(v.clone()),
                Err(msg) => Err(ScoringError::Transport(msg.clone())),
            }
        }
    }

    fn small_config() -> CaptureConfig {
        CaptureConfig {
            target_frames: 3,
            min_frames: 1,
            max_duration: Duration::from_secs(60),
            ..Default::default()
        }
    }

    fn run_to_terminal(controller: &mut SessionController, start: Instant) -> ControllerEvent {
        let step = Duration::from_millis(33);
        let mut now = start;
        for _ in 0..20_000 {
            match controller.poll(now) {
                Some(ControllerEvent::Progress { .. }) | None => {}
                Some(event) => return event,
            }
            now += step;
            std::thread::sleep(Duration::from_micros(200));
        }
        panic!("controller never reached a terminal event");
    }

    // --- Tests ---

    #[test]
    fn test_payload_ready_without_scoring_client() {
        let mut controller = SessionController::new();
        controller
            .begin(
                small_config(),
                face_factory(),
                Box::new(StubCamera::new()),
                Box::new(NullMotionSensor),
            )
            .unwrap();
        let start = Instant::now();
        controller.start(start).unwrap();

        match run_to_terminal(&mut controller, start) {
            ControllerEvent::PayloadReady(payload) => assert_eq!(payload.data.len(), 3),
            other => panic!("expected payload, got {other:?}"),
        }
    }

    #[test]
    fn test_verdict_relayed_through_scoring_client() {
        let verdict = Verdict {
            score: 0.93,
            is_real: true,
            status: None,
            details: None,
        };
        let mut controller = SessionController::with_scoring(Box::new(StubScoringClient {
            verdict: Ok(verdict.clone()),
        }));
        controller
            .begin(
                small_config(),
                face_factory(),
                Box::new(StubCamera::new()),
                Box::new(NullMotionSensor),
            )
            .unwrap();
        let start = Instant::now();
        controller.start(start).unwrap();

        match run_to_terminal(&mut controller, start) {
            ControllerEvent::Completed(v) => assert_eq!(v, verdict),
            other => panic!("expected verdict, got {other:?}"),
        }
    }

    #[test]
    fn test_scoring_failure_surfaced() {
        let mut controller = SessionController::with_scoring(Box::new(StubScoringClient {
            verdict: Err("connection refused".to_string()),
        }));
        controller
            .begin(
                small_config(),
                face_factory(),
                Box::new(StubCamera::new()),
                Box::new(NullMotionSensor),
            )
            .unwrap();
        let start = Instant::now();
        controller.start(start).unwrap();

        match run_to_terminal(&mut controller, start) {
            ControllerEvent::ScoringFailed(msg) => assert!(msg.contains("connection refused")),
            other => panic!("expected scoring failure, got {other:?}"),
        }
    }

    #[test]
    fn test_progress_events_emitted() {
        let mut controller = SessionController::new();
        controller
            .begin(
                small_config(),
                face_factory(),
                Box::new(StubCamera::new()),
                Box::new(NullMotionSensor),
            )
            .unwrap();
        let start = Instant::now();
        controller.start(start).unwrap();

        let step = Duration::from_millis(33);
        let mut now = start;
        let mut seen = Vec::new();
        for _ in 0..20_000 {
            match controller.poll(now) {
                Some(ControllerEvent::Progress { collected, target }) => {
                    seen.push((collected, target));
                }
                Some(_) => break,
                None => {}
            }
            now += step;
            std::thread::sleep(Duration::from_micros(200));
        }
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_scenario_d_supersession_releases_old_camera() {
        let camera_a = StubCamera::new();
        let stops_a = camera_a.stops.clone();

        let mut controller = SessionController::new();
        controller
            .begin(
                small_config(),
                face_factory(),
                Box::new(camera_a),
                Box::new(NullMotionSensor),
            )
            .unwrap();
        let start = Instant::now();
        controller.start(start).unwrap();

        // Let session A collect at least one frame mid-scan.
        let mut now = start;
        for _ in 0..200 {
            controller.poll(now);
            if controller.frames_collected() >= 1 {
                break;
            }
            now += Duration::from_millis(33);
            std::thread::sleep(Duration::from_micros(200));
        }
        assert!(controller.frames_collected() >= 1);

        // Session B supersedes A: A's camera stopped exactly once, B's
        // buffer starts clean.
        controller
            .begin(
                small_config(),
                face_factory(),
                Box::new(StubCamera::new()),
                Box::new(NullMotionSensor),
            )
            .unwrap();
        assert_eq!(stops_a.load(Ordering::Relaxed), 1);
        assert_eq!(controller.frames_collected(), 0);
        assert_eq!(controller.state(), SessionState::Ready);
    }

    #[test]
    fn test_cancel_releases_camera() {
        let camera = StubCamera::new();
        let stops = camera.stops.clone();

        let mut controller = SessionController::new();
        controller
            .begin(
                small_config(),
                face_factory(),
                Box::new(camera),
                Box::new(NullMotionSensor),
            )
            .unwrap();
        controller.start(Instant::now()).unwrap();
        controller.cancel();

        assert_eq!(stops.load(Ordering::Relaxed), 1);
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(controller.poll(Instant::now()).is_none());
    }

    #[test]
    fn test_idle_without_session() {
        let controller = SessionController::new();
        assert_eq!(controller.state(), SessionState::Idle);
        assert_eq!(controller.progress(), 0.0);
        assert_eq!(controller.frames_collected(), 0);
    }

    #[test]
    fn test_start_without_session_errors() {
        let mut controller = SessionController::new();
        assert!(controller.start(Instant::now()).is_err());
    }
}
