//! Synthetic depth scenes.
//!
//! The functions here render simple analytic surfaces (planes) into
//! [`DepthMap`]s so that back-projection and grid sampling can be checked
//! against known geometry.

use anyhow::Result;

use crate::{DepthMap, PinholeIntrinsics, Real, Vec2, Vec3};

/// Constant depth everywhere: a wall facing the camera.
pub fn fronto_parallel(width: usize, height: usize, depth: Real) -> Result<DepthMap> {
    DepthMap::from_fn(width, height, |_, _| depth)
}

/// Render the plane `normal · p = offset` (camera frame) into a depth map.
///
/// Pixels whose ray misses the plane, or hits it behind the camera, get depth
/// `0`, which decodes as invalid.
pub fn plane(
    width: usize,
    height: usize,
    intrinsics: &PinholeIntrinsics,
    normal: Vec3,
    offset: Real,
) -> Result<DepthMap> {
    DepthMap::from_fn(width, height, |u, v| {
        let n = intrinsics.pixel_to_normalized(&Vec2::new(u as Real, v as Real));
        let denom = normal.dot(&Vec3::new(n.x, n.y, 1.0));
        if denom.abs() < 1e-12 {
            return 0.0;
        }
        let z = offset / denom;
        if z > 0.0 {
            z
        } else {
            0.0
        }
    })
}

/// A horizontal floor `camera_height` below the camera (image `y` points down).
pub fn floor(
    width: usize,
    height: usize,
    intrinsics: &PinholeIntrinsics,
    camera_height: Real,
) -> Result<DepthMap> {
    plane(width, height, intrinsics, Vec3::y(), camera_height)
}

/// Punch a zero-depth hole at `(u, v)`; out-of-range pixels are ignored.
pub fn with_hole(mut map: DepthMap, u: usize, v: usize) -> DepthMap {
    // Ignored on purpose: a hole outside the map is a no-op.
    let _ = map.set(u, v, 0.0);
    map
}
