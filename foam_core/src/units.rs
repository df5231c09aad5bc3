//! # Unit Types
//!
//! Type-safe wrappers for the handful of units a spray-foam estimate deals
//! in. They are plain `f64` newtypes so JSON stays clean (just numbers).
//!
//! - Length: feet (ft), inches (in)
//! - Area: square feet (sq ft)
//! - Volume: board-feet, computed as `sq ft × inches / 12` throughout the
//!   engine so every geometry formula shares one convention
//!
//! Money is carried as `f64` dollars and rounded once, at the reporting
//! boundary, with [`round_to_cents`].
//!
//! ## Example
//!
//! ```rust
//! use foam_core::units::{BoardFeet, Inches, SqFt};
//!
//! let sprayed = SqFt(400.0).at_thickness(Inches(3.0));
//! assert_eq!(sprayed, BoardFeet(100.0));
//! ```

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Length Units
// ============================================================================

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Inches> for Feet {
    fn from(inches: Inches) -> Self {
        Feet(inches.0 / 12.0)
    }
}

// ============================================================================
// Area and Volume
// ============================================================================

/// Area in square feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqFt(pub f64);

impl SqFt {
    /// Rectangle area from two lengths.
    pub fn from_lengths(a: Feet, b: Feet) -> Self {
        SqFt(a.0 * b.0)
    }

    /// Board-feet of foam covering this area at the given thickness.
    pub fn at_thickness(self, thickness: Inches) -> BoardFeet {
        BoardFeet(self.0 * thickness.0 / 12.0)
    }
}

/// Foam volume in board-feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardFeet(pub f64);

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|v| v.0).sum())
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Feet);
impl_arithmetic!(Inches);
impl_arithmetic!(SqFt);
impl_arithmetic!(BoardFeet);

// ============================================================================
// Rounding
// ============================================================================

/// Round to a fixed number of decimal places (half away from zero).
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Round a dollar amount to whole cents.
pub fn round_to_cents(value: f64) -> f64 {
    round_to(value, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inches_to_feet() {
        let ft: Feet = Inches(18.0).into();
        assert_eq!(ft, Feet(1.5));
    }

    #[test]
    fn test_area_at_thickness() {
        let area = SqFt::from_lengths(Feet(50.0), Feet(8.0));
        assert_eq!(area, SqFt(400.0));
        let bdft = area.at_thickness(Inches(3.0));
        assert_eq!(bdft, BoardFeet(100.0));
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = BoardFeet(10.0);
        let b = BoardFeet(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);

        let total: BoardFeet = vec![a, b, BoardFeet(0.5)].into_iter().sum();
        assert_eq!(total.0, 15.5);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to_cents(10.416_666), 10.42);
        assert_eq!(round_to_cents(77.1956), 77.2);
        assert_eq!(round_to(0.083_333, 3), 0.083);
        assert_eq!(round_to_cents(0.0), 0.0);
    }

    #[test]
    fn test_serialization() {
        let bdft = BoardFeet(200.0);
        let json = serde_json::to_string(&bdft).unwrap();
        assert_eq!(json, "200.0");

        let roundtrip: BoardFeet = serde_json::from_str(&json).unwrap();
        assert_eq!(bdft, roundtrip);
    }
}
