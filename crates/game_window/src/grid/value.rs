//! Voxel value types

use std::fmt::Debug;
use std::ops::Neg;

/// A type that can be stored in a [`super::Tree`]
pub trait GridValue: Copy + PartialEq + Debug + Send + Sync + 'static {
    /// Name reported in grid summaries
    const TYPE_NAME: &'static str;

    /// Value used when none is given
    fn zero() -> Self;
}

/// Floating point voxel values, as used by level sets
pub trait FloatValue: GridValue + PartialOrd + Neg<Output = Self> {
    /// Convert from a double precision distance
    fn from_f64(value: f64) -> Self;

    /// Convert to double precision
    fn to_f64(self) -> f64;

    /// Absolute value
    #[must_use]
    fn abs(self) -> Self {
        if self.to_f64() < 0.0 {
            -self
        } else {
            self
        }
    }
}

macro_rules! impl_grid_value {
    ($($ty:ty => $name:literal, $zero:expr;)*) => {
        $(
            impl GridValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn zero() -> Self {
                    $zero
                }
            }
        )*
    };
}

impl_grid_value! {
    f32 => "float", 0.0;
    f64 => "double", 0.0;
    i32 => "int32", 0;
    i64 => "int64", 0;
    bool => "bool", false;
}

impl FloatValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_f64(value: f64) -> Self {
        value as Self
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl FloatValue for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(<f32 as GridValue>::TYPE_NAME, "float");
        assert_eq!(<i32 as GridValue>::TYPE_NAME, "int32");
        assert!(!<bool as GridValue>::zero());
    }

    #[test]
    fn test_float_abs() {
        assert!((FloatValue::abs(-2.5_f32) - 2.5).abs() < f32::EPSILON);
        assert!((FloatValue::abs(1.0_f64) - 1.0).abs() < f64::EPSILON);
    }
}
