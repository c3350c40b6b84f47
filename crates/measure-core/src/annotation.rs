//! Renderer-agnostic annotation primitives.
//!
//! These describe where the host should draw markers, the connecting line,
//! the square plane, and the distance label. Primitives with a length follow
//! the usual scene-graph convention of a local +Y axis (cylinders, planes
//! after the look-at rotation), so orientation is an axis-angle pair that
//! turns +Y onto the measured direction.

use serde::{Deserialize, Serialize};

use crate::{axis_angle_to_quat, distance, midpoint, rotation_between, Pt3, Quat, Real, Vec3};

/// Radius of the sphere drawn at each measured point, in meters.
pub const MARKER_RADIUS: Real = 0.01;
/// Radius of the connecting cylinder, in meters.
pub const LINE_RADIUS: Real = 0.001;
/// Height of the distance label above the segment midpoint, in meters.
pub const LABEL_LIFT: Real = 0.02;

/// Sphere drawn at a measured point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub center: Pt3,
    pub radius: Real,
}

impl Marker {
    pub fn at(center: Pt3) -> Self {
        Self {
            center,
            radius: MARKER_RADIUS,
        }
    }
}

/// Orientation that turns the local +Y axis onto a direction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisAngle {
    pub axis: Vec3,
    /// Radians.
    pub angle: Real,
}

impl AxisAngle {
    pub fn y_onto(direction: &Vec3) -> Self {
        let (axis, angle) = rotation_between(&Vec3::y(), direction);
        Self { axis, angle }
    }

    pub fn to_quat(&self) -> Quat {
        axis_angle_to_quat(&self.axis, self.angle)
    }
}

/// Cylinder connecting the two measured points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Pt3,
    pub end: Pt3,
    pub center: Pt3,
    pub length: Real,
    pub radius: Real,
    pub orientation: AxisAngle,
}

impl LineSegment {
    pub fn between(start: &Pt3, end: &Pt3) -> Self {
        Self {
            start: *start,
            end: *end,
            center: midpoint(start, end),
            length: distance(start, end),
            radius: LINE_RADIUS,
            orientation: AxisAngle::y_onto(&(end - start)),
        }
    }
}

/// Square with side equal to the measured distance, centred on the midpoint
/// and aligned with the segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquarePlane {
    pub center: Pt3,
    pub side: Real,
    pub orientation: AxisAngle,
}

impl SquarePlane {
    pub fn between(start: &Pt3, end: &Pt3) -> Self {
        Self {
            center: midpoint(start, end),
            side: distance(start, end),
            orientation: AxisAngle::y_onto(&(end - start)),
        }
    }
}

/// `"12.34 cm"` for a distance given in meters.
pub fn format_centimeters(meters: Real) -> String {
    format!("{:.2} cm", meters * 100.0)
}

/// `"0.12 meters"` for a distance given in meters.
pub fn format_meters(meters: Real) -> String {
    format!("{:.2} meters", meters)
}

/// Text of the distance readout and where to anchor it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceLabel {
    pub anchor: Pt3,
    pub centimeters: String,
    pub meters: String,
}

impl DistanceLabel {
    pub fn between(start: &Pt3, end: &Pt3) -> Self {
        let d = distance(start, end);
        let mut anchor = midpoint(start, end);
        anchor.y += LABEL_LIFT;
        Self {
            anchor,
            centimeters: format_centimeters(d),
            meters: format_meters(d),
        }
    }
}

/// Depth window used to color depth samples.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    pub min: Real,
    pub max: Real,
}

impl Default for DepthRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 15.0,
        }
    }
}

impl DepthRange {
    /// Position of `depth` in the window, clamped to `[0, 1]`.
    ///
    /// Used directly as a hue. A window with `max <= min` maps everything
    /// to `0`.
    pub fn normalize(&self, depth: Real) -> Real {
        let span = self.max - self.min;
        if !(span > 0.0) || depth.is_nan() {
            return 0.0;
        }
        ((depth - self.min) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_is_centred_and_oriented() {
        let a = Pt3::new(0.0, 0.0, 0.0);
        let b = Pt3::new(1.0, 0.0, 0.0);
        let line = LineSegment::between(&a, &b);
        assert_eq!(line.center, Pt3::new(0.5, 0.0, 0.0));
        assert!((line.length - 1.0).abs() < 1e-12);

        let tip = line.orientation.to_quat() * Vec3::y();
        assert!((tip - Vec3::x()).norm() < 1e-9, "tip={tip}");
        assert!((line.orientation.angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn vertical_line_needs_no_rotation() {
        let line = LineSegment::between(&Pt3::new(0.0, 0.0, 0.0), &Pt3::new(0.0, 3.0, 0.0));
        assert!(line.orientation.angle.abs() < 1e-12);
        assert_eq!(line.orientation.to_quat(), Quat::identity());
    }

    #[test]
    fn coincident_points_give_degenerate_line() {
        let p = Pt3::new(1.0, 2.0, 3.0);
        let line = LineSegment::between(&p, &p);
        assert_eq!(line.length, 0.0);
        assert_eq!(line.orientation.axis, Vec3::zeros());
    }

    #[test]
    fn square_matches_distance() {
        let sq = SquarePlane::between(&Pt3::new(0.0, 0.0, 0.0), &Pt3::new(0.0, 0.0, 2.0));
        assert!((sq.side - 2.0).abs() < 1e-12);
        assert_eq!(sq.center, Pt3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn labels_format_both_units() {
        let label = DistanceLabel::between(&Pt3::new(0.0, 0.0, 0.0), &Pt3::new(0.0, 0.0, 1.2345));
        assert_eq!(label.centimeters, "123.45 cm");
        assert_eq!(label.meters, "1.23 meters");
        assert!((label.anchor.y - LABEL_LIFT).abs() < 1e-12);
        assert_eq!(format_centimeters(0.0), "0.00 cm");
    }

    #[test]
    fn depth_range_clamps() {
        let r = DepthRange { min: 1.0, max: 3.0 };
        assert_eq!(r.normalize(2.0), 0.5);
        assert_eq!(r.normalize(0.0), 0.0);
        assert_eq!(r.normalize(10.0), 1.0);
        let flat = DepthRange { min: 2.0, max: 2.0 };
        assert_eq!(flat.normalize(5.0), 0.0);
    }

    #[test]
    fn marker_uses_default_radius() {
        assert_eq!(Marker::at(Pt3::origin()).radius, MARKER_RADIUS);
    }
}
