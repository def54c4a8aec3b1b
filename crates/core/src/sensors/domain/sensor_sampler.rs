use crossbeam_channel::{Receiver, TryRecvError};

use crate::sensors::domain::motion::{MotionEvent, MotionSnapshot};

/// Caches the freshest motion reading without blocking any other component.
///
/// No history is kept: each reading overwrites the cached vector for its
/// axis. Motion data is best-effort enrichment, so a sampler that never
/// receives a reading keeps reporting the zero default and that is fine.
#[derive(Default)]
pub struct SensorSampler {
    events: Option<Receiver<MotionEvent>>,
    latest: MotionSnapshot,
}

impl SensorSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, events: Receiver<MotionEvent>) {
        self.events = Some(events);
    }

    pub fn detach(&mut self) {
        self.events = None;
    }

    /// Drain pending events into the cache. Called once per session tick.
    pub fn pump(&mut self) {
        // Receiver clones share the same channel.
        let Some(rx) = self.events.clone() else {
            return;
        };
        loop {
            match rx.try_recv() {
                Ok(event) => self.on_reading(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.events = None;
                    break;
                }
            }
        }
    }

    /// Overwrite the cached value for the event's axis unconditionally.
    /// Readings with non-finite components are dropped.
    pub fn on_reading(&mut self, event: MotionEvent) {
        match event {
            MotionEvent::Accel(v) if v.is_finite() => self.latest.accel = v,
            MotionEvent::Gyro(v) if v.is_finite() => self.latest.gyro = v,
            _ => {}
        }
    }

    /// The latest cached readings, by value.
    pub fn snapshot(&self) -> MotionSnapshot {
        self.latest
    }
}
