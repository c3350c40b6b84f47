use serde::{Deserialize, Serialize};

use crate::{MeasureError, Pt3, Real, Vec2};

/// Pinhole camera intrinsics without skew.
///
/// The corresponding calibration matrix `K` has the form:
///
/// ```text
/// [ fx   0  cx ]
/// [  0  fy  cy ]
/// [  0   0   1 ]
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinholeIntrinsics {
    /// Focal length in pixels along X.
    pub fx: Real,
    /// Focal length in pixels along Y.
    pub fy: Real,
    /// Principal point X coordinate in pixels.
    pub cx: Real,
    /// Principal point Y coordinate in pixels.
    pub cy: Real,
}

impl Default for PinholeIntrinsics {
    /// Fixed placeholder values for a 320x240 depth texture. They are not
    /// calibrated from hardware.
    fn default() -> Self {
        Self {
            fx: 500.0,
            fy: 500.0,
            cx: 160.0,
            cy: 120.0,
        }
    }
}

impl PinholeIntrinsics {
    pub fn new(fx: Real, fy: Real, cx: Real, cy: Real) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Convert pixel coordinates to the normalized image plane (Z=1).
    pub fn pixel_to_normalized(&self, pixel: &Vec2) -> Vec2 {
        Vec2::new(
            (pixel.x - self.cx) / self.fx,
            (pixel.y - self.cy) / self.fy,
        )
    }

    /// Convert normalized coordinates (Z=1 plane) to pixel coordinates.
    pub fn normalized_to_pixel(&self, n: &Vec2) -> Vec2 {
        Vec2::new(self.fx * n.x + self.cx, self.fy * n.y + self.cy)
    }

    /// Back-project a pixel and a depth along the optical axis into a
    /// camera-space point.
    ///
    /// ```text
    /// x = (u - cx) * z / fx
    /// y = (v - cy) * z / fy
    /// ```
    ///
    /// Returns [`MeasureError::InvalidDepth`] when `depth <= 0` or is not
    /// finite; the projection is undefined there.
    pub fn backproject(&self, u: Real, v: Real, depth: Real) -> Result<Pt3, MeasureError> {
        if !(depth.is_finite() && depth > 0.0) {
            return Err(MeasureError::InvalidDepth(depth));
        }
        let n = self.pixel_to_normalized(&Vec2::new(u, v));
        Ok(Pt3::new(n.x * depth, n.y * depth, depth))
    }

    /// Project a camera-space point to pixel coordinates.
    ///
    /// Returns `None` for points on or behind the camera plane (`z <= 0`).
    pub fn project(&self, p_c: &Pt3) -> Option<Vec2> {
        if p_c.z <= 0.0 {
            return None;
        }
        Some(self.normalized_to_pixel(&Vec2::new(p_c.x / p_c.z, p_c.y / p_c.z)))
    }
}
