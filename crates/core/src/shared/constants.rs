/// Frames a completed session hands to the scoring service.
pub const DEFAULT_TARGET_FRAMES: usize = 80;

/// Fewest usable frames the scoring service will accept.
pub const DEFAULT_MIN_FRAMES: usize = 5;

/// Watchdog ceiling on a single scan (~3x the nominal capture time at 30 fps).
pub const DEFAULT_MAX_DURATION_MS: u64 = 15_000;

/// Points in one face-mesh detection.
pub const LANDMARK_POINTS: usize = 468;

/// Coordinates per landmark point (x, y, z).
pub const LANDMARK_DIMS: usize = 3;

/// Length of a flattened landmark list.
pub const LANDMARK_LEN: usize = LANDMARK_POINTS * LANDMARK_DIMS;

pub const DEFAULT_STREAM_WIDTH: u32 = 320;
pub const DEFAULT_STREAM_HEIGHT: u32 = 240;
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

pub const STILL_JPEG_QUALITY: u8 = 85;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
