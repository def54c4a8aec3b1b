use image::ImageEncoder;
use serde::Serialize;

use crate::session::observation::FrameObservation;
use crate::shared::constants::STILL_JPEG_QUALITY;
use crate::shared::device_info::DeviceInfo;
use crate::shared::frame_image::FrameImage;

/// Session-level metadata attached to the finished payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionMeta {
    /// Unix milliseconds at finalization.
    pub captured_at: u64,
    /// Wall time the scan ran for.
    pub duration_ms: u64,
    pub frame_count: usize,
    pub device: DeviceInfo,
}

/// The finalized data structure handed to the scoring service.
///
/// `data` is the wire name the service expects for the frame sequence. The
/// optional still image travels next to the JSON (a separate multipart
/// part), never inside it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionPayload {
    pub data: Vec<FrameObservation>,
    pub meta: SessionMeta,
    #[serde(skip)]
    pub still_jpeg: Option<Vec<u8>>,
}

impl SessionPayload {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// JPEG-encode a camera frame for transmission alongside the payload.
pub fn encode_still(frame: &FrameImage) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, STILL_JPEG_QUALITY);
    encoder.write_image(
        frame.data(),
        frame.width(),
        frame.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::domain::camera::CameraFacing;
    use crate::detection::domain::face_landmarks::FaceLandmarks;
    use crate::sensors::domain::motion::MotionSnapshot;
    use crate::session::observation::ObservationMeta;
    use crate::shared::constants::LANDMARK_LEN;

    fn payload(frames: usize, still: Option<Vec<u8>>) -> SessionPayload {
        let data = (0..frames)
            .map(|i| FrameObservation {
                landmarks: FaceLandmarks::from_flat(vec![0.0; LANDMARK_LEN]).unwrap(),
                sensors: MotionSnapshot::default(),
                meta: ObservationMeta {
                    timestamp: (i as u64) * 33,
                    camera_facing: CameraFacing::User,
                },
            })
            .collect();
        SessionPayload {
            data,
            meta: SessionMeta {
                captured_at: 1_700_000_000_000,
                duration_ms: 2_640,
                frame_count: frames,
                device: DeviceInfo {
                    platform: "linux".to_string(),
                    app_version: "0.2.0".to_string(),
                },
            },
            still_jpeg: still,
        }
    }

    #[test]
    fn test_json_has_data_and_meta() {
        let json: serde_json::Value =
            serde_json::from_str(&payload(3, None).to_json().unwrap()).unwrap();
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
        assert_eq!(json["meta"]["frame_count"], 3);
        assert_eq!(json["meta"]["captured_at"], 1_700_000_000_000u64);
        assert_eq!(json["meta"]["device"]["platform"], "linux");
    }

    #[test]
    fn test_still_stays_out_of_the_json() {
        let json = payload(1, Some(vec![0xFF, 0xD8])).to_json().unwrap();
        assert!(!json.contains("still"));
    }

    #[test]
    fn test_encode_still_produces_jpeg() {
        let frame = FrameImage::new(vec![128u8; 16 * 12 * 3], 16, 12, 0);
        let bytes = encode_still(&frame).unwrap();
        // JPEG SOI marker.
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
