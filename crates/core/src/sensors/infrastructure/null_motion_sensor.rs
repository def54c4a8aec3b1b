use crossbeam_channel::Receiver;

use crate::sensors::domain::motion::MotionEvent;
use crate::sensors::domain::motion_sensor::{MotionSensor, SensorError};

/// Sensor for platforms with no motion stack.
///
/// Always reports unsupported; the sampler then records the zero-default
/// snapshot for the whole session.
pub struct NullMotionSensor;

impl MotionSensor for NullMotionSensor {
    fn subscribe(&mut self) -> Result<Receiver<MotionEvent>, SensorError> {
        Err(SensorError::Unsupported)
    }

    fn stop(&mut self) {}
}
