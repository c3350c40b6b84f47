//! Two-point measurement state.
//!
//! At most two points are live at once. Pushing a third point clears the pair
//! and starts a new one with that point as its first member.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{distance, midpoint, Pt3, Real};

/// Where a measured point came from.
///
/// Depth-buffer points live in the camera frame of the frame they were
/// sampled from; hit-test points live in the platform's world frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSource {
    Depth,
    HitTest,
}

/// A 3D point registered by a tap, with its provenance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasuredPoint {
    pub position: Pt3,
    pub source: PointSource,
    /// Camera-to-point range, known only for depth-buffer points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Real>,
}

impl MeasuredPoint {
    /// Point back-projected from the depth buffer, with its camera range.
    pub fn from_depth(position: Pt3, range: Real) -> Self {
        Self {
            position,
            source: PointSource::Depth,
            range: Some(range),
        }
    }

    /// Point returned by a platform hit-test.
    pub fn from_hit_test(position: Pt3) -> Self {
        Self {
            position,
            source: PointSource::HitTest,
            range: None,
        }
    }
}

/// Result of [`MeasurementPair::push`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PushOutcome {
    /// The point became the first member of a pair. `cleared` is set when a
    /// previous pair (complete, or from another source) was discarded.
    Started { cleared: bool },
    /// The point completed the pair.
    Completed {
        start: MeasuredPoint,
        end: MeasuredPoint,
        distance: Real,
    },
}

/// Up to two measured points from the same source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPair {
    first: Option<MeasuredPoint>,
    second: Option<MeasuredPoint>,
}

impl MeasurementPair {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live points (0, 1 or 2).
    pub fn len(&self) -> usize {
        self.first.is_some() as usize + self.second.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.second.is_some()
    }

    pub fn first(&self) -> Option<&MeasuredPoint> {
        self.first.as_ref()
    }

    pub fn second(&self) -> Option<&MeasuredPoint> {
        self.second.as_ref()
    }

    /// Both points, once the pair is complete.
    pub fn points(&self) -> Option<(&MeasuredPoint, &MeasuredPoint)> {
        Some((self.first.as_ref()?, self.second.as_ref()?))
    }

    pub fn clear(&mut self) {
        self.first = None;
        self.second = None;
    }

    /// Add a point.
    ///
    /// A point whose source differs from the pending first point starts a new
    /// pair instead of being measured against a point in another frame.
    pub fn push(&mut self, point: MeasuredPoint) -> PushOutcome {
        match (self.first, self.second) {
            (Some(first), None) if first.source == point.source => {
                self.second = Some(point);
                PushOutcome::Completed {
                    start: first,
                    end: point,
                    distance: distance(&first.position, &point.position),
                }
            }
            (None, _) => {
                self.first = Some(point);
                PushOutcome::Started { cleared: false }
            }
            (Some(first), second) => {
                if second.is_none() {
                    debug!(
                        "discarding pending {:?} point, new point comes from {:?}",
                        first.source, point.source
                    );
                } else {
                    debug!("pair complete, starting a new measurement");
                }
                self.first = Some(point);
                self.second = None;
                PushOutcome::Started { cleared: true }
            }
        }
    }

    /// Distance between the two points, once the pair is complete.
    pub fn distance(&self) -> Option<Real> {
        self.points()
            .map(|(a, b)| distance(&a.position, &b.position))
    }

    /// Midpoint of the two points, once the pair is complete.
    pub fn midpoint(&self) -> Option<Pt3> {
        self.points()
            .map(|(a, b)| midpoint(&a.position, &b.position))
    }
}
