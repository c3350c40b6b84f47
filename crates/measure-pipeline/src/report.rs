//! Measurement reports handed back to the host.

use log::debug;
use measure_core::{
    distance, horizontal_grid, midpoint, point_cloud_square, screen_depth_grid, DepthMap,
    DepthProjector, DistanceLabel, HorizontalGrid, LineSegment, Marker, MeasuredPoint, NoDepth,
    PointCloud, PointSource, Pt2, Pt3, Real, ScreenGridCell, SquarePlane,
};
use serde::{Deserialize, Serialize};

use crate::MeasureConfig;

/// Everything the host needs to display one completed measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementReport {
    pub start: MeasuredPoint,
    pub end: MeasuredPoint,
    /// Euclidean distance between the points, in meters.
    pub distance: Real,
    pub midpoint: Pt3,
    pub markers: [Marker; 2],
    pub line: LineSegment,
    pub plane: SquarePlane,
    pub label: DistanceLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<HorizontalGrid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_cloud: Option<PointCloud>,
    /// Only for depth measurements, where both view taps are known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_grid: Option<Vec<ScreenGridCell>>,
}

/// Inputs available when a pair completes.
pub(crate) struct ReportContext<'a> {
    pub config: &'a MeasureConfig,
    pub frame: Option<&'a DepthMap>,
    /// View taps of a depth pair, in order.
    pub taps: Option<(Pt2, Pt2)>,
}

impl MeasurementReport {
    pub(crate) fn build(start: MeasuredPoint, end: MeasuredPoint, ctx: &ReportContext<'_>) -> Self {
        let (a, b) = (start.position, end.position);
        let config = ctx.config;

        let grid = config.grid.enabled.then(|| {
            // Camera intrinsics only describe depth-frame points; hit-test
            // points are in the world frame and fall back to midpoint height.
            match (start.source, ctx.frame) {
                (PointSource::Depth, Some(frame)) => horizontal_grid(
                    &a,
                    &b,
                    config.grid.resolution,
                    &DepthProjector::new(frame, &config.intrinsics),
                ),
                _ => horizontal_grid(&a, &b, config.grid.resolution, &NoDepth),
            }
        });
        if let Some(grid) = &grid {
            debug!(
                "horizontal grid: {} cells, {} fell back to midpoint height",
                grid.cells.len(),
                grid.num_fallbacks()
            );
        }

        let point_cloud = if config.point_cloud.enabled {
            point_cloud_square(
                &a,
                &b,
                config.point_cloud.spacing,
                config.point_cloud.max_points,
            )
        } else {
            None
        };

        let screen_grid = match ctx.taps {
            Some((t0, t1)) if config.screen_grid.count > 0 => Some(screen_depth_grid(
                &t0,
                &t1,
                config.screen_grid.count,
                ctx.frame,
                &config.intrinsics,
                &config.view,
                &config.depth_range,
            )),
            _ => None,
        };

        Self {
            start,
            end,
            distance: distance(&a, &b),
            midpoint: midpoint(&a, &b),
            markers: [Marker::at(a), Marker::at(b)],
            line: LineSegment::between(&a, &b),
            plane: SquarePlane::between(&a, &b),
            label: DistanceLabel::between(&a, &b),
            grid,
            point_cloud,
            screen_grid,
        }
    }
}
