//! Math utilities and types
//!
//! World-space quantities (grid transforms, sphere centers) use nalgebra
//! vectors; index-space quantities use [`crate::grid::Coord`].

pub use nalgebra::Vector3;

/// 3D vector type in single precision
pub type Vec3 = Vector3<f32>;

/// 3D vector type in double precision
pub type Vec3d = Vector3<f64>;

/// Round a value up to the nearest integer, as an `i32`.
///
/// Saturates at the `i32` range; NaN maps to zero.
#[allow(clippy::cast_possible_truncation)]
pub fn round_up(value: f64) -> i32 {
    value.ceil() as i32
}

/// Square of a value
pub fn pow2(value: f64) -> f64 {
    value * value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(2.0), 2);
        assert_eq!(round_up(2.1), 3);
        assert_eq!(round_up(-2.5), -2);
        assert_eq!(round_up(f64::NAN), 0);
    }

    #[test]
    fn test_pow2() {
        assert!((pow2(-3.0) - 9.0).abs() < f64::EPSILON);
    }
}
