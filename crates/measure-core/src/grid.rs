//! Sampling grids between two measured points.
//!
//! Three flavors are provided:
//!
//! - [`horizontal_grid`]: an `N x N` grid in the horizontal plane straddling
//!   the segment, heights pulled from a [`HeightSource`];
//! - [`point_cloud_square`]: a dense, fixed-spacing square of points around
//!   the midpoint;
//! - [`screen_depth_grid`]: a grid between two view-space taps, each cell
//!   resolved through the depth frame.
//!
//! All of them are best-effort visualizations: a cell that cannot be sampled
//! falls back or is skipped, never fails the whole grid.

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::{
    distance, horizontal, horizontal_perpendicular, midpoint, normalize_or_zero, resolve_view_tap,
    DepthMap, DepthRange, MeasureError, PinholeIntrinsics, Pt2, Pt3, Real, ViewSize,
};

/// Upper bound on the number of cells in a horizontal or screen-space grid.
pub const MAX_GRID_CELLS: usize = 1_000_000;

/// Cell count of a `side x side` grid, or `None` past [`MAX_GRID_CELLS`].
pub fn grid_cell_count(side: usize) -> Option<usize> {
    side.checked_mul(side).filter(|&n| n <= MAX_GRID_CELLS)
}

/// Height (`y`) and depth recovered for a horizontal position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightSample {
    pub y: Real,
    pub depth: Real,
}

/// Something that can report the surface height under a horizontal position.
pub trait HeightSource {
    /// Sample the surface at `(x, z)`. `reference_y` is the height used to
    /// place the query point before projecting it.
    fn sample_height(&self, x: Real, z: Real, reference_y: Real)
        -> Result<HeightSample, MeasureError>;
}

impl<F> HeightSource for F
where
    F: Fn(Real, Real, Real) -> Result<HeightSample, MeasureError>,
{
    fn sample_height(
        &self,
        x: Real,
        z: Real,
        reference_y: Real,
    ) -> Result<HeightSample, MeasureError> {
        self(x, z, reference_y)
    }
}

/// Height source for when no depth frame has been captured yet.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDepth;

impl HeightSource for NoDepth {
    fn sample_height(&self, _: Real, _: Real, _: Real) -> Result<HeightSample, MeasureError> {
        Err(MeasureError::DataUnavailable)
    }
}

/// Height source backed by a camera-frame depth map.
///
/// The query point `(x, reference_y, z)` is projected into the texture, the
/// depth at that pixel is read and back-projected, and the back-projected
/// `y` is reported.
#[derive(Clone, Copy, Debug)]
pub struct DepthProjector<'a> {
    pub depth: &'a DepthMap,
    pub intrinsics: &'a PinholeIntrinsics,
}

impl<'a> DepthProjector<'a> {
    pub fn new(depth: &'a DepthMap, intrinsics: &'a PinholeIntrinsics) -> Self {
        Self { depth, intrinsics }
    }
}

impl HeightSource for DepthProjector<'_> {
    fn sample_height(
        &self,
        x: Real,
        z: Real,
        reference_y: Real,
    ) -> Result<HeightSample, MeasureError> {
        let px = self
            .intrinsics
            .project(&Pt3::new(x, reference_y, z))
            .ok_or(MeasureError::InvalidDepth(z))?;
        let (u, v) = self.depth.pixel_at(px.x, px.y)?;
        let sample = self.depth.sample(u, v)?;
        let p = sample.backproject(self.intrinsics)?;
        Ok(HeightSample {
            y: p.y,
            depth: sample.depth,
        })
    }
}

/// One cell of a [`HorizontalGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Index along the segment direction.
    pub i: usize,
    /// Index across the segment.
    pub j: usize,
    pub position: Pt3,
    /// Sampled depth; `None` when the cell fell back to the midpoint height.
    pub depth: Option<Real>,
}

/// Row-major `resolution x resolution` cells, `i` outer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HorizontalGrid {
    pub resolution: usize,
    pub spacing: Real,
    pub cells: Vec<GridCell>,
}

impl HorizontalGrid {
    /// Number of cells that fell back to the midpoint height.
    pub fn num_fallbacks(&self) -> usize {
        self.cells.iter().filter(|c| c.depth.is_none()).count()
    }
}

/// Build a `resolution x resolution` grid in the horizontal plane straddling
/// the segment `a -> b`.
///
/// The spacing is `distance(a, b) / resolution`. Cell `(i, j)` sits at
/// `a + dir * (i * s) + perp * (j * s - d / 2)` where `dir` is the
/// horizontal direction from `a` to `b` and `perp` its horizontal
/// perpendicular. Its height comes from `source`; on failure it keeps the
/// midpoint's `y`. A resolution of zero, or one whose cell count exceeds
/// [`MAX_GRID_CELLS`], yields an empty grid.
pub fn horizontal_grid(
    a: &Pt3,
    b: &Pt3,
    resolution: usize,
    source: &impl HeightSource,
) -> HorizontalGrid {
    let num_cells = match grid_cell_count(resolution) {
        Some(n) if n > 0 => n,
        Some(_) => {
            return HorizontalGrid {
                resolution,
                spacing: 0.0,
                cells: Vec::new(),
            }
        }
        None => {
            warn!(
                "horizontal grid of {}x{} cells exceeds the limit of {}",
                resolution, resolution, MAX_GRID_CELLS
            );
            return HorizontalGrid {
                resolution,
                spacing: 0.0,
                cells: Vec::new(),
            };
        }
    };

    let d = distance(a, b);
    let spacing = d / resolution as Real;
    let mid = midpoint(a, b);
    let dir = normalize_or_zero(&horizontal(&(b - a)));
    let perp = horizontal_perpendicular(&dir);

    let mut cells = Vec::with_capacity(num_cells);
    for i in 0..resolution {
        for j in 0..resolution {
            let along = i as Real * spacing;
            let across = j as Real * spacing - d * 0.5;
            let x = a.x + dir.x * along + perp.x * across;
            let z = a.z + dir.z * along + perp.z * across;
            let (y, depth) = match source.sample_height(x, z, mid.y) {
                Ok(s) => (s.y, Some(s.depth)),
                Err(err) => {
                    trace!("grid cell ({i}, {j}) falls back to midpoint height: {err}");
                    (mid.y, None)
                }
            };
            cells.push(GridCell {
                i,
                j,
                position: Pt3::new(x, y, z),
                depth,
            });
        }
    }

    HorizontalGrid {
        resolution,
        spacing,
        cells,
    }
}

/// Dense square of points produced by [`point_cloud_square`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub spacing: Real,
    /// Points per side; the cloud holds `per_side^2` points.
    pub per_side: usize,
    pub points: Vec<Pt3>,
}

/// Square point cloud of side `distance(a, b)` around the midpoint, in the
/// plane of constant `z`.
///
/// With `n = trunc(d / spacing)` the cloud has `(n + 1)^2` points at
/// `mid + (i * spacing - d/2, j * spacing - d/2, 0)`. Returns `None` when the
/// spacing is not positive or the cloud would exceed `max_points`.
pub fn point_cloud_square(a: &Pt3, b: &Pt3, spacing: Real, max_points: usize) -> Option<PointCloud> {
    if !(spacing > 0.0) {
        return None;
    }
    let d = distance(a, b);
    let side = (d / spacing).trunc() + 1.0;
    if !side.is_finite() || side * side > max_points as Real {
        warn!(
            "point cloud of {}x{} points exceeds the limit of {}",
            side, side, max_points
        );
        return None;
    }
    let per_side = side as usize;

    let mid = midpoint(a, b);
    let half = d * 0.5;
    let mut points = Vec::with_capacity(per_side * per_side);
    for i in 0..per_side {
        for j in 0..per_side {
            points.push(Pt3::new(
                mid.x + i as Real * spacing - half,
                mid.y + j as Real * spacing - half,
                mid.z,
            ));
        }
    }
    Some(PointCloud {
        spacing,
        per_side,
        points,
    })
}

/// A screen-space grid cell that resolved to a valid depth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenGridCell {
    /// View-space location of the cell.
    pub view: Pt2,
    /// Camera-to-point range at the cell.
    pub range: Real,
    /// Range normalized into the depth window, usable as a hue.
    pub hue: Real,
}

/// Sample a `count x count` grid of view locations spanning `start -> end`.
///
/// Cell `(i, j)` is at `start + (i * (end.x - start.x) / count,
/// j * (end.y - start.y) / count)`. Cells without valid depth are skipped;
/// a count past [`MAX_GRID_CELLS`] yields no cells.
pub fn screen_depth_grid(
    start: &Pt2,
    end: &Pt2,
    count: usize,
    depth: Option<&DepthMap>,
    intrinsics: &PinholeIntrinsics,
    view: &ViewSize,
    range: &DepthRange,
) -> Vec<ScreenGridCell> {
    let num_cells = match grid_cell_count(count) {
        Some(n) => n,
        None => {
            warn!(
                "screen grid of {}x{} cells exceeds the limit of {}",
                count, count, MAX_GRID_CELLS
            );
            return Vec::new();
        }
    };
    if num_cells == 0 {
        return Vec::new();
    }
    let step_x = (end.x - start.x) / count as Real;
    let step_y = (end.y - start.y) / count as Real;

    let mut cells = Vec::with_capacity(num_cells);
    for i in 0..count {
        for j in 0..count {
            let p = Pt2::new(start.x + i as Real * step_x, start.y + j as Real * step_y);
            match resolve_view_tap(depth, intrinsics, view, &p) {
                Ok(resolved) => {
                    let r = resolved.range();
                    cells.push(ScreenGridCell {
                        view: p,
                        range: r,
                        hue: range.normalize(r),
                    });
                }
                Err(err) => trace!("screen grid cell ({i}, {j}) skipped: {err}"),
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;

    fn flat(y: Real) -> impl HeightSource {
        move |_x: Real, _z: Real, _ref: Real| Ok::<_, MeasureError>(HeightSample { y, depth: 1.0 })
    }

    #[test]
    fn grid_has_requested_resolution_and_spacing() {
        let a = Pt3::new(0.0, 0.0, 0.0);
        let b = Pt3::new(2.0, 0.0, 0.0);
        let grid = horizontal_grid(&a, &b, 4, &flat(-0.3));
        assert_eq!(grid.cells.len(), 16);
        assert!((grid.spacing - 0.5).abs() < 1e-12);
        assert_eq!(grid.num_fallbacks(), 0);
        assert!(grid.cells.iter().all(|c| (c.position.y + 0.3).abs() < 1e-12));
    }

    #[test]
    fn grid_straddles_the_segment() {
        let a = Pt3::new(0.0, 0.0, 0.0);
        let b = Pt3::new(2.0, 0.0, 0.0);
        let grid = horizontal_grid(&a, &b, 4, &flat(0.0));

        // Along +X, across along the perpendicular (+Z for +X direction).
        let first = grid.cells[0];
        assert_eq!((first.i, first.j), (0, 0));
        assert!((first.position.x - 0.0).abs() < 1e-12);
        assert!((first.position.z + 1.0).abs() < 1e-12);

        let c = grid.cells.iter().find(|c| c.i == 3 && c.j == 2).unwrap();
        assert!((c.position.x - 1.5).abs() < 1e-12);
        assert!(c.position.z.abs() < 1e-12);
    }

    #[test]
    fn failed_samples_fall_back_to_midpoint_height() {
        let a = Pt3::new(0.0, 1.0, 0.0);
        let b = Pt3::new(1.0, 3.0, 0.0);
        let grid = horizontal_grid(&a, &b, 3, &NoDepth);
        assert_eq!(grid.num_fallbacks(), 9);
        assert!(grid.cells.iter().all(|c| (c.position.y - 2.0).abs() < 1e-12));
    }

    #[test]
    fn zero_resolution_gives_empty_grid() {
        let grid = horizontal_grid(&Pt3::origin(), &Pt3::new(1.0, 0.0, 0.0), 0, &NoDepth);
        assert!(grid.cells.is_empty());
    }

    #[test]
    fn oversized_grid_is_empty_instead_of_overflowing() {
        let a = Pt3::origin();
        let b = Pt3::new(1.0, 0.0, 0.0);
        assert!(horizontal_grid(&a, &b, 1usize << 33, &NoDepth).cells.is_empty());
        assert!(horizontal_grid(&a, &b, usize::MAX, &NoDepth).cells.is_empty());
        assert!(horizontal_grid(&a, &b, 1_001, &NoDepth).cells.is_empty());
        assert_eq!(horizontal_grid(&a, &b, 1_000, &flat(0.0)).cells.len(), MAX_GRID_CELLS);
    }

    #[test]
    fn grid_cell_count_bounds() {
        assert_eq!(grid_cell_count(0), Some(0));
        assert_eq!(grid_cell_count(10), Some(100));
        assert_eq!(grid_cell_count(1_000), Some(MAX_GRID_CELLS));
        assert_eq!(grid_cell_count(1_001), None);
        assert_eq!(grid_cell_count(1usize << 33), None);
    }

    #[test]
    fn depth_projector_recovers_floor_height() {
        let k = PinholeIntrinsics::default();
        let map = synthetic::floor(320, 240, &k, 0.5).unwrap();
        let source = DepthProjector::new(&map, &k);

        let a = Pt3::new(-0.2, 0.5, 4.0);
        let b = Pt3::new(0.2, 0.5, 4.0);
        let grid = horizontal_grid(&a, &b, 5, &source);
        assert_eq!(grid.num_fallbacks(), 0);
        for c in &grid.cells {
            assert!((c.position.y - 0.5).abs() < 1e-2, "cell {c:?}");
        }
    }

    #[test]
    fn depth_projector_rejects_points_behind_camera() {
        let k = PinholeIntrinsics::default();
        let map = synthetic::fronto_parallel(320, 240, 1.0).unwrap();
        let source = DepthProjector::new(&map, &k);
        assert!(matches!(
            source.sample_height(0.0, -1.0, 0.0),
            Err(MeasureError::InvalidDepth(_))
        ));
        assert!(matches!(
            source.sample_height(100.0, 1.0, 0.0),
            Err(MeasureError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn point_cloud_counts_and_bounds() {
        let a = Pt3::new(0.0, 0.0, 1.0);
        let b = Pt3::new(0.5, 0.0, 1.0);
        let cloud = point_cloud_square(&a, &b, 0.125, 1_000).unwrap();
        assert_eq!(cloud.per_side, 5);
        assert_eq!(cloud.points.len(), 25);
        assert!(cloud.points[0].x.abs() < 1e-12);
        assert!((cloud.points[0].y + 0.25).abs() < 1e-12);
        assert!((cloud.points[24].x - 0.5).abs() < 1e-12);
        assert!(cloud.points.iter().all(|p| p.z == 1.0));
    }

    #[test]
    fn point_cloud_respects_cap_and_spacing() {
        let a = Pt3::origin();
        let b = Pt3::new(10.0, 0.0, 0.0);
        assert!(point_cloud_square(&a, &b, 0.005, 1_000).is_none());
        assert!(point_cloud_square(&a, &b, 0.0, 1_000).is_none());
        let single = point_cloud_square(&a, &a, 0.005, 1).unwrap();
        assert_eq!(single.points, vec![Pt3::origin()]);
    }

    #[test]
    fn screen_grid_skips_missing_depth() {
        let k = PinholeIntrinsics::default();
        let view = ViewSize::new(320.0, 240.0);
        let range = DepthRange::default();
        let cells = screen_depth_grid(
            &Pt2::new(10.0, 10.0),
            &Pt2::new(110.0, 60.0),
            10,
            None,
            &k,
            &view,
            &range,
        );
        assert!(cells.is_empty());

        let map = synthetic::fronto_parallel(320, 240, 3.0).unwrap();
        let cells = screen_depth_grid(
            &Pt2::new(10.0, 10.0),
            &Pt2::new(110.0, 60.0),
            10,
            Some(&map),
            &k,
            &view,
            &range,
        );
        assert_eq!(cells.len(), 100);
        assert!(cells.iter().all(|c| c.range >= 3.0 && c.hue > 0.19 && c.hue <= 1.0));
    }

    #[test]
    fn oversized_screen_grid_is_empty() {
        let k = PinholeIntrinsics::default();
        let map = synthetic::fronto_parallel(320, 240, 3.0).unwrap();
        let cells = screen_depth_grid(
            &Pt2::new(10.0, 10.0),
            &Pt2::new(110.0, 60.0),
            1usize << 33,
            Some(&map),
            &k,
            &ViewSize::new(320.0, 240.0),
            &DepthRange::default(),
        );
        assert!(cells.is_empty());
    }
}
