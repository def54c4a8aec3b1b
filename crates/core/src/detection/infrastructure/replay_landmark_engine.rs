use std::path::Path;

use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::domain::landmark_engine::{EngineError, LandmarkEngine};
use crate::shared::frame_image::FrameImage;

/// Replays pre-recorded landmark detections keyed by frame index.
///
/// The recording is a JSON array with one entry per frame: a flat
/// `[x, y, z, ...]` coordinate list for the detected face, or `null` for a
/// frame where no face was found. Frame indices past the end wrap around,
/// so a short recording can drive an arbitrarily long session.
pub struct ReplayLandmarkEngine {
    detections: Vec<Option<FaceLandmarks>>,
}

impl ReplayLandmarkEngine {
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            return Err(EngineError::Unavailable(format!(
                "recording not found: {}",
                path.display()
            )));
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::InitFailed(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let entries: Vec<Option<Vec<f32>>> = serde_json::from_str(raw)
            .map_err(|e| EngineError::InitFailed(format!("malformed recording: {e}")))?;

        let mut detections = Vec::with_capacity(entries.len());
        for (i, entry) in entries.into_iter().enumerate() {
            match entry {
                Some(coords) => detections.push(Some(
                    FaceLandmarks::from_flat(coords)
                        .map_err(|e| EngineError::InitFailed(format!("frame {i}: {e}")))?,
                )),
                None => detections.push(None),
            }
        }
        if detections.is_empty() {
            return Err(EngineError::InitFailed(
                "recording contains no frames".to_string(),
            ));
        }
        Ok(Self { detections })
    }

    pub fn from_detections(detections: Vec<Option<FaceLandmarks>>) -> Self {
        debug_assert!(!detections.is_empty(), "recording must not be empty");
        Self { detections }
    }
}

impl LandmarkEngine for ReplayLandmarkEngine {
    fn process(
        &mut self,
        frame: &FrameImage,
    ) -> Result<Vec<FaceLandmarks>, Box<dyn std::error::Error>> {
        let entry = &self.detections[frame.index() % self.detections.len()];
        Ok(entry.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::shared::constants::LANDMARK_LEN;

    fn frame(index: usize) -> FrameImage {
        FrameImage::new(vec![0u8; 8 * 6 * 3], 8, 6, index)
    }

    fn landmarks(fill: f32) -> FaceLandmarks {
        FaceLandmarks::from_flat(vec![fill; LANDMARK_LEN]).unwrap()
    }

    fn recording_json(entries: &[Option<f32>]) -> String {
        let values: Vec<serde_json::Value> = entries
            .iter()
            .map(|entry| match entry {
                Some(fill) => serde_json::json!(vec![*fill; LANDMARK_LEN]),
                None => serde_json::Value::Null,
            })
            .collect();
        serde_json::to_string(&values).unwrap()
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let err = ReplayLandmarkEngine::from_file(Path::new("/nonexistent/rec.json"))
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::Unavailable(_)));
    }

    #[test]
    fn test_malformed_json_is_init_failed() {
        let err = ReplayLandmarkEngine::from_json("not json").err().unwrap();
        assert!(matches!(err, EngineError::InitFailed(_)));
    }

    #[test]
    fn test_wrong_coordinate_count_is_init_failed() {
        let err = ReplayLandmarkEngine::from_json("[[1.0, 2.0, 3.0]]")
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::InitFailed(_)));
    }

    #[test]
    fn test_empty_recording_is_init_failed() {
        let err = ReplayLandmarkEngine::from_json("[]").err().unwrap();
        assert!(matches!(err, EngineError::InitFailed(_)));
    }

    #[test]
    fn test_replays_by_frame_index() {
        let json = recording_json(&[Some(0.1), None, Some(0.3)]);
        let mut engine = ReplayLandmarkEngine::from_json(&json).unwrap();

        assert_eq!(engine.process(&frame(0)).unwrap(), vec![landmarks(0.1)]);
        assert!(engine.process(&frame(1)).unwrap().is_empty());
        assert_eq!(engine.process(&frame(2)).unwrap(), vec![landmarks(0.3)]);
    }

    #[test]
    fn test_indices_wrap_past_the_end() {
        let json = recording_json(&[Some(0.1), None]);
        let mut engine = ReplayLandmarkEngine::from_json(&json).unwrap();

        assert_eq!(engine.process(&frame(2)).unwrap(), vec![landmarks(0.1)]);
        assert!(engine.process(&frame(3)).unwrap().is_empty());
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.json");
        std::fs::write(&path, recording_json(&[Some(0.5)])).unwrap();

        let mut engine = ReplayLandmarkEngine::from_file(&path).unwrap();
        assert_eq!(engine.process(&frame(0)).unwrap(), vec![landmarks(0.5)]);
    }

    #[test]
    fn test_from_detections() {
        let mut engine = ReplayLandmarkEngine::from_detections(vec![Some(landmarks(0.7))]);
        assert_eq!(engine.process(&frame(0)).unwrap(), vec![landmarks(0.7)]);
    }
}
