//! Measurement session built on `measure-core`.
//!
//! - [`MeasureConfig`]: JSON-serializable session configuration,
//! - [`MeasureSession`]: tap-driven state container,
//! - [`MeasurementReport`]: what the host draws for a completed pair.

mod config;
mod report;
mod session;

pub use config::*;
pub use report::MeasurementReport;
pub use session::{MeasureSession, TapResult};
