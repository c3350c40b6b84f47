//! High-level entry crate for the LiDAR measurement toolkit.
//!
//! Re-exports the two layers:
//!
//! - [`geometry`]: depth decoding, back-projection, vector geometry, grids and
//!   annotation primitives. Pure functions and plain values.
//! - [`session`]: configuration and the tap-driven [`MeasureSession`].
//!
//! ```no_run
//! use measure::geometry::{synthetic, Pt2};
//! use measure::{MeasureConfig, MeasureSession, TapResult};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut session = MeasureSession::new(MeasureConfig::default())?;
//! session.set_frame(synthetic::fronto_parallel(320, 240, 1.5)?);
//! session.tap_view(Pt2::new(100.0, 120.0))?;
//! if let TapResult::Measured(report) = session.tap_view(Pt2::new(220.0, 120.0))? {
//!     println!("{} ({})", report.label.meters, report.label.centimeters);
//! }
//! # Ok(())
//! # }
//! ```

pub use measure_core as geometry;
pub use measure_pipeline as session;

pub use measure_core::{distance, midpoint, MeasureError, PinholeIntrinsics, Pt3};
pub use measure_pipeline::{MeasureConfig, MeasureSession, MeasurementReport, TapResult};
