use thiserror::Error;

use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::frame_image::FrameImage;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("landmark engine runtime is not present: {0}")]
    Unavailable(String),
    #[error("landmark engine failed to initialize: {0}")]
    InitFailed(String),
}

/// Fixed configuration handed to the external engine at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineOptions {
    /// The session only tracks the primary face.
    pub max_faces: usize,
    pub refine_landmarks: bool,
    pub min_detection_confidence: f64,
    pub min_tracking_confidence: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_faces: 1,
            refine_landmarks: false,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_faces == 0 {
            return Err("max_faces must be >= 1");
        }
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            return Err("min_detection_confidence must be between 0.0 and 1.0");
        }
        if !(0.0..=1.0).contains(&self.min_tracking_confidence) {
            return Err("min_tracking_confidence must be between 0.0 and 1.0");
        }
        Ok(())
    }
}

/// Black-box interface to the external face-landmark engine.
///
/// Implementations may be stateful (e.g., tracking across frames), hence
/// `&mut self`. The engine is not reentrant: callers must not submit a new
/// frame before the previous call returned.
pub trait LandmarkEngine: Send {
    fn process(
        &mut self,
        frame: &FrameImage,
    ) -> Result<Vec<FaceLandmarks>, Box<dyn std::error::Error>>;
}

/// Constructs the engine during session initialization.
///
/// Reports [`EngineError::Unavailable`] when the engine's code is not
/// present in the runtime, [`EngineError::InitFailed`] when construction
/// or option-setting fails.
pub type EngineFactory =
    Box<dyn FnOnce(&EngineOptions) -> Result<Box<dyn LandmarkEngine>, EngineError> + Send>;
