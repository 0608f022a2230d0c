use std::f64::consts::PI;

use nalgebra::Quaternion;

/// Strip off and return the sign of the argument.
///
/// Exact zero maps to zero, there is no tolerance band.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Bring an angle back into the range [-PI, PI].
///
/// This is a single step correction, not a modulo reduction. Inputs outside
/// (-3PI, 3PI) are not fully normalized.
pub fn normalize_angle(angle: f64) -> f64 {
    if angle > PI {
        angle - (2.0 * PI)
    } else if angle < -PI {
        angle + (2.0 * PI)
    } else {
        angle
    }
}

/// Convert a planar quaternion to a heading.
///
/// Only valid for rotations about the z-axis. The x and y components
/// are ignored.
#[inline]
pub fn quaternion_to_heading(quaternion: &Quaternion<f64>) -> f64 {
    2.0 * quaternion.k.atan2(quaternion.w)
}

/// Convert a heading to a planar quaternion.
#[inline]
pub fn heading_to_quaternion(heading: f64) -> Quaternion<f64> {
    Quaternion::new((heading / 2.0).cos(), 0.0, 0.0, (heading / 2.0).sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign() {
        assert_eq!(sign(3.2), 1.0);
        assert_eq!(sign(-0.001), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(f64::MIN_POSITIVE), 1.0);
    }

    #[test]
    fn test_normalize_angle() {
        let angles = [-PI, -2.5, -1.0, 0.0, 0.3, 1.9, PI];

        for angle in angles {
            for k in [-1.0, 0.0, 1.0] {
                let normal = normalize_angle(angle + 2.0 * PI * k);
                assert!((-PI - 1e-9..=PI + 1e-9).contains(&normal), "{}", normal);
            }
        }

        assert_eq!(normalize_angle(0.5), 0.5);
        assert!((normalize_angle(270.0_f64.to_radians()) + 90.0_f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_angle_single_step() {
        let angle = normalize_angle(4.0 * PI);

        assert!((angle - 2.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn test_quaternion_heading() {
        let quaternion = heading_to_quaternion(PI / 2.0);

        assert_eq!(quaternion.i, 0.0);
        assert_eq!(quaternion.j, 0.0);
        assert!((quaternion.k - (PI / 4.0).sin()).abs() < 1e-9);
        assert!((quaternion.w - (PI / 4.0).cos()).abs() < 1e-9);

        assert!((quaternion_to_heading(&quaternion) - PI / 2.0).abs() < 1e-9);
        assert_eq!(quaternion_to_heading(&Quaternion::identity()), 0.0);
    }

    #[test]
    fn test_quaternion_round_trip() {
        for heading in [-3.0, -1.2, 0.0, 0.7, 2.4] {
            let quaternion = heading_to_quaternion(heading);
            let quaternion2 = heading_to_quaternion(quaternion_to_heading(&quaternion));

            assert!((quaternion.k - quaternion2.k).abs() < 1e-9);
            assert!((quaternion.w - quaternion2.w).abs() < 1e-9);
        }
    }
}
