use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Receiver;
use serde::Deserialize;
use thiserror::Error;

use crate::sensors::domain::motion::{MotionEvent, Vec3};
use crate::sensors::domain::motion_sensor::{MotionSensor, SensorError};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read motion script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed motion script: {0}")]
    Parse(String),
    #[error("unknown reading kind '{0}' (expected 'accel' or 'gyro')")]
    UnknownKind(String),
}

#[derive(Deserialize)]
struct ScriptedReading {
    kind: String,
    x: f64,
    y: f64,
    z: f64,
}

/// Replays recorded motion readings from a worker thread at a fixed pace.
///
/// The script is a JSON array of `{"kind": "accel"|"gyro", "x", "y", "z"}`
/// readings; delivery cycles through it until the sensor is stopped, so the
/// sampler always has fresh data for the session's duration.
pub struct ScriptedMotionSensor {
    readings: Vec<MotionEvent>,
    interval: Duration,
    stopped: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ScriptedMotionSensor {
    pub fn new(readings: Vec<MotionEvent>, interval: Duration) -> Self {
        Self {
            readings,
            interval,
            stopped: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn from_file(path: &Path, interval: Duration) -> Result<Self, ScriptError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ScriptError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let parsed: Vec<ScriptedReading> =
            serde_json::from_str(&raw).map_err(|e| ScriptError::Parse(e.to_string()))?;

        let mut readings = Vec::with_capacity(parsed.len());
        for reading in parsed {
            let v = Vec3::new(reading.x, reading.y, reading.z);
            match reading.kind.as_str() {
                "accel" => readings.push(MotionEvent::Accel(v)),
                "gyro" => readings.push(MotionEvent::Gyro(v)),
                other => return Err(ScriptError::UnknownKind(other.to_string())),
            }
        }
        Ok(Self::new(readings, interval))
    }
}

impl MotionSensor for ScriptedMotionSensor {
    fn subscribe(&mut self) -> Result<Receiver<MotionEvent>, SensorError> {
        if self.readings.is_empty() {
            return Err(SensorError::Unsupported);
        }
        self.stop();

        let (tx, rx) = crossbeam_channel::unbounded();
        let readings = self.readings.clone();
        let interval = self.interval;
        let stopped = Arc::new(AtomicBool::new(false));
        self.stopped = stopped.clone();

        self.worker = Some(std::thread::spawn(move || loop {
            for event in &readings {
                if stopped.load(Ordering::Relaxed) || tx.send(*event).is_err() {
                    return;
                }
                std::thread::sleep(interval);
            }
        }));

        Ok(rx)
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for ScriptedMotionSensor {
    fn drop(&mut self) {
        self.stop();
    }
}
