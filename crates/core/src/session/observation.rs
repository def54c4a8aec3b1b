use serde::Serialize;

use crate::camera::domain::camera::CameraFacing;
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::sensors::domain::motion::MotionSnapshot;

/// Per-observation metadata.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ObservationMeta {
    /// Milliseconds since the scan started. Non-decreasing across the buffer.
    pub timestamp: u64,
    pub camera_facing: CameraFacing,
}

/// One sample collected during an active session: the detected face's
/// landmark set paired with the freshest motion reading at capture time.
///
/// Only ever created for a tick where the detector reported a face; the
/// field names are the scoring service's wire schema.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameObservation {
    #[serde(rename = "faceMesh")]
    pub landmarks: FaceLandmarks,
    pub sensors: MotionSnapshot,
    pub meta: ObservationMeta,
}
