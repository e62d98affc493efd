//! Direction vector to pitch/yaw/roll conversion

use crate::error::ConversionError;
use crate::types::{Rotation, Vec3};

/// Convert a light direction into degrees
///
/// The vector is always re-normalized. Pitch is positive when the light points
/// down (`asin(-z)`), yaw is measured from +X towards +Y. A direction with no
/// horizontal component (straight up or down) has yaw 0.
pub fn direction_to_rotation(direction: Vec3) -> Result<Rotation, ConversionError> {
    if !direction.is_finite() {
        return Err(ConversionError::NonFinite { field: "direction" });
    }

    let length = direction.length();
    if length == 0.0 || !length.is_finite() {
        return Err(ConversionError::DegenerateInput {
            x: direction.x,
            y: direction.y,
            z: direction.z,
        });
    }
    let unit = direction.scaled(1.0 / length);

    // Drift can push |z| a hair past 1.0
    let pitch = (-unit.z).clamp(-1.0, 1.0).asin().to_degrees();
    let yaw = if unit.x == 0.0 && unit.y == 0.0 {
        0.0
    } else {
        unit.y.atan2(unit.x).to_degrees()
    };

    Ok(Rotation {
        pitch,
        yaw,
        roll: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_straight_down_has_pitch_90_and_zero_yaw() {
        let rot = direction_to_rotation(Vec3::new(0.0, 0.0, -1.0)).unwrap();
        assert_eq!(rot.pitch, 90.0);
        assert_eq!(rot.yaw, 0.0);
        assert_eq!(rot.roll, 0.0);
    }

    #[test]
    fn test_straight_up_with_negative_zero_x_has_zero_yaw() {
        // atan2(0, -0) would be 180 degrees
        let rot = direction_to_rotation(Vec3::new(-0.0, 0.0, 5.0)).unwrap();
        assert_eq!(rot.pitch, -90.0);
        assert_eq!(rot.yaw, 0.0);
    }

    #[test]
    fn test_horizontal_directions() {
        let rot = direction_to_rotation(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(approx(rot.pitch, 0.0));
        assert!(approx(rot.yaw, 0.0));

        let rot = direction_to_rotation(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert!(approx(rot.yaw, 90.0));

        let rot = direction_to_rotation(Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        assert!(approx(rot.yaw, 180.0));

        let rot = direction_to_rotation(Vec3::new(0.0, -1.0, 0.0)).unwrap();
        assert!(approx(rot.yaw, -90.0));
    }

    #[test]
    fn test_diagonal_down() {
        let rot = direction_to_rotation(Vec3::new(1.0, 1.0, -2.0_f64.sqrt())).unwrap();
        assert!(approx(rot.pitch, 45.0));
        assert!(approx(rot.yaw, 45.0));
    }

    #[test]
    fn test_scale_invariance() {
        let samples = [
            Vec3::new(0.3, -0.7, 0.2),
            Vec3::new(-4.0, 1.5, -9.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(1e-3, 2e-3, -5e-4),
        ];
        for v in samples {
            let a = direction_to_rotation(v).unwrap();
            let b = direction_to_rotation(v.scaled(2.0)).unwrap();
            assert_eq!(a.pitch, b.pitch, "pitch differs for {v:?}");
            assert_eq!(a.yaw, b.yaw, "yaw differs for {v:?}");

            let c = direction_to_rotation(v.scaled(37.5)).unwrap();
            assert!(approx(a.pitch, c.pitch));
            assert!(approx(a.yaw, c.yaw));
        }
    }

    #[test]
    fn test_unnormalized_input_is_normalized() {
        let rot = direction_to_rotation(Vec3::new(0.0, 0.0, -250.0)).unwrap();
        assert_eq!(rot.pitch, 90.0);
    }

    #[test]
    fn test_zero_vector_is_degenerate() {
        let err = direction_to_rotation(Vec3::new(0.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, ConversionError::DegenerateInput { .. }));
    }

    #[test]
    fn test_non_finite_direction_is_rejected() {
        let err = direction_to_rotation(Vec3::new(f64::NAN, 0.0, 1.0)).unwrap_err();
        assert!(matches!(err, ConversionError::NonFinite { field: "direction" }));

        let err = direction_to_rotation(Vec3::new(f64::INFINITY, 0.0, 1.0)).unwrap_err();
        assert!(matches!(err, ConversionError::NonFinite { .. }));
    }

    #[test]
    fn test_huge_vector_overflowing_length_is_degenerate() {
        let err = direction_to_rotation(Vec3::new(f64::MAX, f64::MAX, 0.0)).unwrap_err();
        assert!(matches!(err, ConversionError::DegenerateInput { .. }));
    }
}
