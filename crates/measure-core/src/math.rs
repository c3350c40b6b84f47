//! Scalar and vector aliases plus the small vector algebra used by the
//! measurement code.
//!
//! Everything here is total: degenerate inputs (zero-length vectors,
//! coincident points) map to well-defined outputs instead of NaN.

use nalgebra::{Point2, Point3, UnitQuaternion, Vector2, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// Unit quaternion with [`Real`] components.
pub type Quat = UnitQuaternion<Real>;

/// Euclidean distance between two points.
pub fn distance(a: &Pt3, b: &Pt3) -> Real {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Componentwise average of two points.
pub fn midpoint(a: &Pt3, b: &Pt3) -> Pt3 {
    Pt3::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5, (a.z + b.z) * 0.5)
}

/// Scale `v` to unit length.
///
/// A vector whose magnitude is exactly zero is returned unchanged (the zero
/// vector).
pub fn normalize_or_zero(v: &Vec3) -> Vec3 {
    let n = v.norm();
    if n == 0.0 {
        Vec3::zeros()
    } else {
        v / n
    }
}

/// Cross product `a x b`.
pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

/// Dot product `a . b`.
pub fn dot(a: &Vec3, b: &Vec3) -> Real {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// Perpendicular of a horizontal direction within the horizontal (XZ) plane.
///
/// `(dx, _, dz) -> (-dz, 0, dx)`; the `y` component of the input is ignored.
pub fn horizontal_perpendicular(dir: &Vec3) -> Vec3 {
    Vec3::new(-dir.z, 0.0, dir.x)
}

/// Project `v` onto the horizontal plane by dropping its `y` component.
pub fn horizontal(v: &Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Axis and angle of the rotation that turns `from` onto `to`.
///
/// The axis is `normalize(from × to)` and the angle is the `acos` of the
/// normalized dot product, clamped into `[-1, 1]`. If either vector has zero
/// length the rotation is the identity: zero axis, zero angle. For
/// anti-parallel vectors the cross product vanishes, so the axis falls back to
/// any unit vector perpendicular to `from`.
pub fn rotation_between(from: &Vec3, to: &Vec3) -> (Vec3, Real) {
    let len = from.norm() * to.norm();
    if len == 0.0 {
        return (Vec3::zeros(), 0.0);
    }
    let cos = (dot(from, to) / len).clamp(-1.0, 1.0);
    let angle = cos.acos();
    let mut axis = normalize_or_zero(&cross(from, to));
    if axis == Vec3::zeros() && angle > 0.0 {
        let helper = if from.x.abs() < 0.9 * from.norm() {
            Vec3::x()
        } else {
            Vec3::z()
        };
        axis = normalize_or_zero(&cross(from, &helper));
    }
    (axis, angle)
}

/// Convert an axis-angle pair into a unit quaternion.
///
/// A zero axis yields the identity rotation.
pub fn axis_angle_to_quat(axis: &Vec3, angle: Real) -> Quat {
    match nalgebra::Unit::try_new(*axis, 0.0) {
        Some(unit) => Quat::from_axis_angle(&unit, angle),
        None => Quat::identity(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_point(rng: &mut StdRng) -> Pt3 {
        Pt3::new(
            rng.random_range(-5.0..5.0),
            rng.random_range(-5.0..5.0),
            rng.random_range(-5.0..5.0),
        )
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let a = random_point(&mut rng);
            let b = random_point(&mut rng);
            assert_eq!(distance(&a, &b), distance(&b, &a));
            assert_eq!(distance(&a, &a), 0.0);
        }
    }

    #[test]
    fn distance_and_midpoint_on_axis() {
        let a = Pt3::new(0.0, 0.0, 0.0);
        let b = Pt3::new(0.0, 0.0, 2.0);
        assert!((distance(&a, &b) - 2.0).abs() < 1e-12);
        let m = midpoint(&a, &b);
        assert!((m - Pt3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn distance_matches_nalgebra() {
        let a = Pt3::new(1.0, -2.0, 0.5);
        let b = Pt3::new(-0.3, 4.0, 2.5);
        assert!((distance(&a, &b) - nalgebra::distance(&a, &b)).abs() < 1e-12);
    }

    #[test]
    fn normalize_zero_vector_stays_zero() {
        assert_eq!(normalize_or_zero(&Vec3::zeros()), Vec3::zeros());
        let n = normalize_or_zero(&Vec3::new(3.0, 0.0, 4.0));
        assert!((n.norm() - 1.0).abs() < 1e-12);
        assert!((n.x - 0.6).abs() < 1e-12);
    }

    #[test]
    fn cross_and_dot_agree_with_nalgebra() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-4.0, 0.5, 2.0);
        assert!((cross(&a, &b) - a.cross(&b)).norm() < 1e-12);
        assert!((dot(&a, &b) - a.dot(&b)).abs() < 1e-12);
    }

    #[test]
    fn horizontal_perpendicular_is_orthogonal() {
        let d = Vec3::new(0.3, 0.0, -0.7);
        let p = horizontal_perpendicular(&d);
        assert_eq!(p, Vec3::new(0.7, 0.0, 0.3));
        assert!(dot(&d, &p).abs() < 1e-12);
    }

    #[test]
    fn rotation_between_maps_from_onto_to() {
        let from = Vec3::y();
        let to = Vec3::new(1.0, 1.0, 0.5);
        let (axis, angle) = rotation_between(&from, &to);
        let q = axis_angle_to_quat(&axis, angle);
        let rotated = q * from;
        assert!((rotated - to.normalize()).norm() < 1e-9, "rotated={rotated}");
    }

    #[test]
    fn rotation_between_handles_degenerate_inputs() {
        let (axis, angle) = rotation_between(&Vec3::y(), &Vec3::zeros());
        assert_eq!(axis, Vec3::zeros());
        assert_eq!(angle, 0.0);

        let (axis, angle) = rotation_between(&Vec3::y(), &(Vec3::y() * 2.0));
        assert_eq!(axis, Vec3::zeros());
        assert!(angle.abs() < 1e-12);

        let (axis, angle) = rotation_between(&Vec3::y(), &-Vec3::y());
        assert!((angle - std::f64::consts::PI).abs() < 1e-12);
        assert!((axis.norm() - 1.0).abs() < 1e-12);
        let rotated = axis_angle_to_quat(&axis, angle) * Vec3::y();
        assert!((rotated + Vec3::y()).norm() < 1e-9);
    }
}
