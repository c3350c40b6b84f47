//! Session configuration.
//!
//! Every field has a serde default, so `{}` is a valid configuration file.

use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use measure_core::{
    grid_cell_count, DepthRange, PinholeIntrinsics, Real, ViewSize, MAX_GRID_CELLS,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureConfig {
    /// Camera intrinsics of the depth texture. Defaults to fixed placeholder
    /// values, not a hardware calibration.
    #[serde(default)]
    pub intrinsics: PinholeIntrinsics,
    /// Size of the view reporting taps, in points.
    #[serde(default = "default_view")]
    pub view: ViewSize,
    /// Depth window used for coloring.
    #[serde(default)]
    pub depth_range: DepthRange,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub point_cloud: PointCloudConfig,
    #[serde(default)]
    pub screen_grid: ScreenGridConfig,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            intrinsics: PinholeIntrinsics::default(),
            view: default_view(),
            depth_range: DepthRange::default(),
            grid: GridConfig::default(),
            point_cloud: PointCloudConfig::default(),
            screen_grid: ScreenGridConfig::default(),
        }
    }
}

fn default_view() -> ViewSize {
    ViewSize::new(320.0, 240.0)
}

/// Horizontal sampling grid between the measured points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cells per side.
    #[serde(default = "default_grid_resolution")]
    pub resolution: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            resolution: default_grid_resolution(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_grid_resolution() -> usize {
    10
}

/// Dense point-cloud square around the midpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloudConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Distance between neighbouring points, in meters.
    #[serde(default = "default_cloud_spacing")]
    pub spacing: Real,
    /// Clouds larger than this are skipped.
    #[serde(default = "default_cloud_max_points")]
    pub max_points: usize,
}

impl Default for PointCloudConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            spacing: default_cloud_spacing(),
            max_points: default_cloud_max_points(),
        }
    }
}

fn default_cloud_spacing() -> Real {
    0.005
}

fn default_cloud_max_points() -> usize {
    250_000
}

/// Depth grid sampled in view space between two taps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenGridConfig {
    /// Cells per side; `0` disables the grid.
    #[serde(default = "default_grid_resolution")]
    pub count: usize,
}

impl Default for ScreenGridConfig {
    fn default() -> Self {
        Self {
            count: default_grid_resolution(),
        }
    }
}

impl MeasureConfig {
    pub fn validate(&self) -> Result<()> {
        let k = &self.intrinsics;
        ensure!(
            k.fx > 0.0 && k.fy > 0.0,
            "focal lengths must be positive, got fx={} fy={}",
            k.fx,
            k.fy
        );
        ensure!(
            k.cx.is_finite() && k.cy.is_finite(),
            "principal point must be finite"
        );
        ensure!(
            self.view.width > 0.0 && self.view.height > 0.0,
            "view size must be positive, got {}x{}",
            self.view.width,
            self.view.height
        );
        ensure!(
            self.depth_range.min.is_finite() && self.depth_range.max.is_finite(),
            "depth range must be finite"
        );
        if self.grid.enabled {
            ensure!(self.grid.resolution > 0, "grid resolution must be positive");
            ensure!(
                grid_cell_count(self.grid.resolution).is_some(),
                "grid resolution {} exceeds {} cells",
                self.grid.resolution,
                MAX_GRID_CELLS
            );
        }
        ensure!(
            grid_cell_count(self.screen_grid.count).is_some(),
            "screen grid count {} exceeds {} cells",
            self.screen_grid.count,
            MAX_GRID_CELLS
        );
        if self.point_cloud.enabled {
            ensure!(
                self.point_cloud.spacing > 0.0,
                "point cloud spacing must be positive, got {}",
                self.point_cloud.spacing
            );
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("parse measurement config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&data)
    }
}
