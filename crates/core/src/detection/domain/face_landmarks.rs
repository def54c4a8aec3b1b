use serde::Serialize;

use crate::shared::constants::{LANDMARK_DIMS, LANDMARK_LEN, LANDMARK_POINTS};

/// The landmark set for one detected face: a fixed-size flattened
/// `[x0, y0, z0, x1, y1, z1, ...]` coordinate list.
///
/// Serializes as the flat array, which is the wire shape the scoring
/// service reads.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FaceLandmarks {
    coords: Vec<f32>,
}

impl FaceLandmarks {
    pub fn from_flat(coords: Vec<f32>) -> Result<Self, &'static str> {
        if coords.len() != LANDMARK_LEN {
            return Err("landmark list must contain 468 x/y/z triples");
        }
        Ok(Self { coords })
    }

    pub fn from_points(points: &[[f32; 3]]) -> Result<Self, &'static str> {
        let mut coords = Vec::with_capacity(points.len() * LANDMARK_DIMS);
        for p in points {
            coords.extend_from_slice(p);
        }
        Self::from_flat(coords)
    }

    pub fn coords(&self) -> &[f32] {
        &self.coords
    }

    pub fn point_count(&self) -> usize {
        LANDMARK_POINTS
    }

    /// The `i`-th landmark as `[x, y, z]`.
    pub fn point(&self, i: usize) -> Option<[f32; 3]> {
        if i >= LANDMARK_POINTS {
            return None;
        }
        let base = i * LANDMARK_DIMS;
        Some([
            self.coords[base],
            self.coords[base + 1],
            self.coords[base + 2],
        ])
    }
}
