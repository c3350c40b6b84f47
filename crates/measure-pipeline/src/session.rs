//! Tap-driven measurement session.
//!
//! The session is a single-threaded state container: the host calls into it
//! synchronously from its event thread with each new depth frame and each
//! tap, and gets plain values back.
//!
//! ```no_run
//! use measure_core::{synthetic, Pt2};
//! use measure_pipeline::{MeasureConfig, MeasureSession, TapResult};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut session = MeasureSession::new(MeasureConfig::default())?;
//! session.set_frame(synthetic::fronto_parallel(320, 240, 2.0)?);
//!
//! session.tap_view(Pt2::new(110.0, 120.0))?;
//! if let TapResult::Measured(report) = session.tap_view(Pt2::new(210.0, 120.0))? {
//!     println!("{}", report.label.centimeters);
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use log::{debug, info};
use measure_core::{
    resolve_view_tap, DepthMap, MeasureError, MeasuredPoint, MeasurementPair, Pt2, Pt3,
    PushOutcome, Real,
};

use crate::{report::ReportContext, MeasureConfig, MeasurementReport};

/// What a tap produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TapResult {
    /// First point of a new pair.
    Pending(MeasuredPoint),
    /// The tap completed a pair.
    Measured(Box<MeasurementReport>),
}

#[derive(Debug, Clone)]
pub struct MeasureSession {
    config: MeasureConfig,
    frame: Option<DepthMap>,
    pair: MeasurementPair,
    /// View locations of depth taps, parallel to `pair`.
    taps: Vec<Pt2>,
    last_report: Option<MeasurementReport>,
}

impl MeasureSession {
    pub fn new(config: MeasureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            frame: None,
            pair: MeasurementPair::new(),
            taps: Vec::with_capacity(2),
            last_report: None,
        })
    }

    pub fn pair(&self) -> &MeasurementPair {
        &self.pair
    }

    pub fn frame(&self) -> Option<&DepthMap> {
        self.frame.as_ref()
    }

    /// Report of the most recent completed pair, cleared when a new pair
    /// starts.
    pub fn last_report(&self) -> Option<&MeasurementReport> {
        self.last_report.as_ref()
    }

    /// Replace the current depth frame.
    pub fn set_frame(&mut self, frame: DepthMap) {
        self.frame = Some(frame);
    }

    pub fn clear_frame(&mut self) {
        self.frame = None;
    }

    /// Drop all points and the last report.
    pub fn reset(&mut self) {
        self.pair.clear();
        self.taps.clear();
        self.last_report = None;
    }

    /// Resolve a view-space tap against the current depth frame.
    ///
    /// On failure the session is left untouched.
    pub fn tap_view(&mut self, tap: Pt2) -> Result<TapResult, MeasureError> {
        let resolved = resolve_view_tap(
            self.frame.as_ref(),
            &self.config.intrinsics,
            &self.config.view,
            &tap,
        )
        .inspect_err(|err| debug!("tap at ({:.1}, {:.1}) skipped: {err}", tap.x, tap.y))?;

        let point = MeasuredPoint::from_depth(resolved.point, resolved.range());
        Ok(self.push(point, Some(tap)))
    }

    /// Add a point returned by the platform hit-test.
    pub fn tap_world(&mut self, position: Pt3) -> TapResult {
        self.push(MeasuredPoint::from_hit_test(position), None)
    }

    fn push(&mut self, point: MeasuredPoint, tap: Option<Pt2>) -> TapResult {
        match self.pair.push(point) {
            PushOutcome::Started { cleared } => {
                if cleared {
                    self.last_report = None;
                }
                self.taps.clear();
                self.taps.extend(tap);
                TapResult::Pending(point)
            }
            PushOutcome::Completed {
                start,
                end,
                distance,
            } => {
                self.taps.extend(tap);
                info!("measured {:.3} m", distance);
                let report = self.build_report(start, end);
                self.last_report = Some(report.clone());
                TapResult::Measured(Box::new(report))
            }
        }
    }

    fn build_report(&self, start: MeasuredPoint, end: MeasuredPoint) -> MeasurementReport {
        let taps = match self.taps.as_slice() {
            [t0, t1] => Some((*t0, *t1)),
            _ => None,
        };
        let ctx = ReportContext {
            config: &self.config,
            frame: self.frame.as_ref(),
            taps,
        };
        MeasurementReport::build(start, end, &ctx)
    }

    /// Camera-to-point range of each stored depth tap, re-read from the
    /// current frame.
    ///
    /// Depth readouts follow the live frame, so this changes as new frames
    /// arrive even though the measured pair does not.
    pub fn live_ranges(&self) -> Vec<Result<Real, MeasureError>> {
        self.taps
            .iter()
            .map(|tap| {
                resolve_view_tap(
                    self.frame.as_ref(),
                    &self.config.intrinsics,
                    &self.config.view,
                    tap,
                )
                .map(|r| r.range())
            })
            .collect()
    }
}
