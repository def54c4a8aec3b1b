use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::shared::constants::{DEFAULT_FRAME_RATE, DEFAULT_STREAM_HEIGHT, DEFAULT_STREAM_WIDTH};
use crate::shared::frame_image::FrameImage;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera permission denied: {0}")]
    Denied(String),
    #[error("no usable camera: {0}")]
    Unavailable(String),
}

/// Which way the requested camera faces.
///
/// Serialized into the frame metadata because the scoring service flips the
/// accelerometer z-axis for rear-facing captures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    User,
    Environment,
}

/// Requested stream parameters, fixed for the lifetime of one stream.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamConstraints {
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    pub facing: CameraFacing,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            width: DEFAULT_STREAM_WIDTH,
            height: DEFAULT_STREAM_HEIGHT,
            frame_rate: DEFAULT_FRAME_RATE,
            facing: CameraFacing::User,
        }
    }
}

impl StreamConstraints {
    /// Nominal time between frames at the requested rate.
    pub fn frame_interval(&self) -> Duration {
        if self.frame_rate > 0.0 {
            Duration::from_secs_f64(1.0 / self.frame_rate)
        } else {
            Duration::from_secs_f64(1.0 / DEFAULT_FRAME_RATE)
        }
    }
}

/// Platform camera seam: a device that can be opened into a live stream.
///
/// The stream may be revoked by the platform at any time, which surfaces as
/// `try_frame` never becoming ready again.
pub trait Camera: Send {
    fn open(&mut self, constraints: &StreamConstraints)
        -> Result<Box<dyn CameraStream>, CameraError>;
}

/// A live stream of decoded frames from an open camera.
pub trait CameraStream: Send {
    /// The next decoded frame, if one is ready this tick.
    fn try_frame(&mut self) -> Option<FrameImage>;

    /// Stop every track backing the stream. Idempotent.
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_constraints() {
        let c = StreamConstraints::default();
        assert_eq!(c.width, 320);
        assert_eq!(c.height, 240);
        assert_eq!(c.facing, CameraFacing::User);
        assert_relative_eq!(c.frame_rate, 30.0);
    }

    #[test]
    fn test_frame_interval_at_30fps() {
        let c = StreamConstraints::default();
        assert_relative_eq!(c.frame_interval().as_secs_f64(), 1.0 / 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_frame_interval_zero_rate_falls_back() {
        let c = StreamConstraints {
            frame_rate: 0.0,
            ..Default::default()
        };
        assert_relative_eq!(c.frame_interval().as_secs_f64(), 1.0 / 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_facing_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(CameraFacing::User).unwrap(),
            "user"
        );
        assert_eq!(
            serde_json::to_value(CameraFacing::Environment).unwrap(),
            "environment"
        );
    }
}
