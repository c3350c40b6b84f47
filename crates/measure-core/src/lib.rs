//! Core math and geometry primitives for LiDAR tap-to-measure.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Pt3`, ...) and the small
//!   vector algebra used for measuring,
//! - half-precision depth maps and pinhole intrinsics,
//! - the two-point measurement state ([`MeasurementPair`]),
//! - sampling grids and annotation primitives derived from a measured pair.
//!
//! Depth pipeline:
//! `point = backproject(K, pixel(tap), decode(depth[pixel]))`
//!
//! Hit-test points from the host platform skip the depth pipeline and feed
//! [`MeasurementPair`] directly.

/// Annotation primitives (markers, line, plane, labels, depth coloring).
pub mod annotation;
mod error;
/// Sampling grids between two measured points.
pub mod grid;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Depth textures and camera intrinsics.
pub mod models;
mod pair;
mod resolve;
/// Analytic depth scenes for tests and demos.
pub mod synthetic;

pub use annotation::*;
pub use error::MeasureError;
pub use grid::*;
pub use math::*;
pub use models::*;
pub use pair::*;
pub use resolve::*;
