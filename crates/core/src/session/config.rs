use std::time::Duration;

use crate::camera::domain::camera::StreamConstraints;
use crate::detection::domain::landmark_engine::EngineOptions;
use crate::shared::constants::{
    DEFAULT_MAX_DURATION_MS, DEFAULT_MIN_FRAMES, DEFAULT_TARGET_FRAMES,
};

/// Immutable per-session capture parameters, fixed at session start.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureConfig {
    /// Buffer size that triggers normal completion.
    pub target_frames: usize,
    /// Fewest frames a finished session may hold and still succeed.
    pub min_frames: usize,
    /// Watchdog: the session finalizes with whatever it has after this long.
    pub max_duration: Duration,
    pub constraints: StreamConstraints,
    pub engine: EngineOptions,
    /// Attach one still image of the video surface to the payload.
    pub capture_still: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_frames: DEFAULT_TARGET_FRAMES,
            min_frames: DEFAULT_MIN_FRAMES,
            max_duration: Duration::from_millis(DEFAULT_MAX_DURATION_MS),
            constraints: StreamConstraints::default(),
            engine: EngineOptions::default(),
            capture_still: true,
        }
    }
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.target_frames == 0 {
            return Err("target_frames must be >= 1");
        }
        if self.min_frames == 0 {
            return Err("min_frames must be >= 1");
        }
        if self.min_frames > self.target_frames {
            return Err("min_frames must not exceed target_frames");
        }
        if self.max_duration.is_zero() {
            return Err("max_duration must be nonzero");
        }
        if self.constraints.width == 0 || self.constraints.height == 0 {
            return Err("stream resolution must be nonzero");
        }
        if self.constraints.frame_rate <= 0.0 {
            return Err("frame_rate must be positive");
        }
        self.engine.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target_frames, 80);
        assert_eq!(config.min_frames, 5);
        assert_eq!(config.max_duration, Duration::from_millis(15_000));
        assert!(config.capture_still);
    }

    #[test]
    fn test_zero_target_rejected() {
        let config = CaptureConfig {
            target_frames: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_min_above_target_rejected() {
        let config = CaptureConfig {
            target_frames: 10,
            min_frames: 11,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_duration_rejected() {
        let config = CaptureConfig {
            max_duration: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_options_checked() {
        let mut config = CaptureConfig::default();
        config.engine.min_detection_confidence = 2.0;
        assert!(config.validate().is_err());
    }
}
