//! Screen-to-world back-projection of taps.

use serde::{Deserialize, Serialize};

use crate::{DepthMap, DepthSample, MeasureError, PinholeIntrinsics, Pt2, Pt3, Real, ViewSize};

/// A tap resolved against a depth frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPoint {
    pub sample: DepthSample,
    /// Camera-space position.
    pub point: Pt3,
}

impl ResolvedPoint {
    /// Straight-line distance from the camera centre to the point.
    pub fn range(&self) -> Real {
        self.point.coords.norm()
    }
}

/// Resolve texture pixel `(u, v)` to a camera-space point.
pub fn resolve_pixel(
    depth: &DepthMap,
    intrinsics: &PinholeIntrinsics,
    u: usize,
    v: usize,
) -> Result<ResolvedPoint, MeasureError> {
    let sample = depth.sample(u, v)?;
    let point = sample.backproject(intrinsics)?;
    Ok(ResolvedPoint { sample, point })
}

/// Resolve a tap given in view coordinates.
///
/// `depth` is `None` until the capture pipeline has produced a frame, which
/// yields [`MeasureError::DataUnavailable`].
pub fn resolve_view_tap(
    depth: Option<&DepthMap>,
    intrinsics: &PinholeIntrinsics,
    view: &ViewSize,
    tap: &Pt2,
) -> Result<ResolvedPoint, MeasureError> {
    let depth = depth.ok_or(MeasureError::DataUnavailable)?;
    let (u, v) = depth.view_to_pixel(tap, view)?;
    resolve_pixel(depth, intrinsics, u, v)
}
