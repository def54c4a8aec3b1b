use crossbeam_channel::Receiver;
use thiserror::Error;

use crate::sensors::domain::motion::MotionEvent;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("motion sensors are not supported on this platform")]
    Unsupported,
    #[error("motion sensor permission denied")]
    PermissionDenied,
}

/// Platform motion-sensor seam with an explicit lifecycle.
///
/// Subscriptions are owned by the capture session and live exactly as long
/// as it does; there is no ambient global listener. A failed subscription
/// is not a session error: the sampler degrades to the zero-default
/// snapshot.
pub trait MotionSensor: Send {
    fn subscribe(&mut self) -> Result<Receiver<MotionEvent>, SensorError>;

    /// Stop delivering events. Idempotent.
    fn stop(&mut self);
}
