use serde::Serialize;

/// One 3-axis reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// The latest known accelerometer and gyroscope readings.
///
/// Zero-valued until a reading arrives; that default is what gets recorded
/// when the platform has no motion sensors at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MotionSnapshot {
    pub accel: Vec3,
    pub gyro: Vec3,
}

/// A single reading event from the platform sensor stack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionEvent {
    Accel(Vec3),
    Gyro(Vec3),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zero() {
        let snapshot = MotionSnapshot::default();
        assert_eq!(snapshot.accel, Vec3::default());
        assert_eq!(snapshot.gyro, Vec3::default());
    }

    #[test]
    fn test_is_finite() {
        assert!(Vec3::new(1.0, -2.0, 0.0).is_finite());
        assert!(!Vec3::new(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!Vec3::new(0.0, f64::INFINITY, 0.0).is_finite());
    }

    #[test]
    fn test_snapshot_serializes_per_axis() {
        let snapshot = MotionSnapshot {
            accel: Vec3::new(0.1, 0.2, 9.8),
            gyro: Vec3::new(0.0, 0.0, 0.5),
        };
        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(json["accel"]["z"], 9.8);
        assert_eq!(json["gyro"]["z"], 0.5);
    }
}
