//! # Board-Feet Geometry
//!
//! Converts the physical dimensions of an assembly into board-feet of foam.
//! Every formula divides `area × thickness_in` by 12.
//!
//! The functions here are pure and total. They do not clamp: negative or
//! NaN dimensions are rejected earlier by [`Geometry::validate`] (called from
//! `AssemblyInput::validate`), so the formulas stay exact.
//!
//! ## Example
//!
//! ```rust
//! use foam_core::geometry::{wall_board_feet, Geometry};
//!
//! assert_eq!(wall_board_feet(100.0, 8.0, 3.0), 200.0);
//!
//! let attic = Geometry::Attic { area_sqft: 1000.0, pitch: 0.0, pitch_is_rise_over_12: true };
//! assert_eq!(attic.board_feet(6.0), 500.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_non_negative, require_positive, CalcResult};
use crate::units::{Feet, Inches, SqFt};

/// Wall: `linear_ft × height_ft × thickness_in / 12`
pub fn wall_board_feet(linear_ft: f64, height_ft: f64, thickness_in: f64) -> f64 {
    SqFt::from_lengths(Feet(linear_ft), Feet(height_ft))
        .at_thickness(Inches(thickness_in))
        .value()
}

/// Slope adjustment applied to attic/roof plan area.
///
/// With `pitch_is_rise_over_12` the pitch is read as inches of rise per 12 of
/// run and converted to the true roof-surface factor `sqrt(1 + (pitch/12)²)`.
/// Otherwise the pitch value is already a multiplier and is returned as is.
pub fn pitch_factor(pitch: f64, pitch_is_rise_over_12: bool) -> f64 {
    if pitch_is_rise_over_12 {
        (1.0 + (pitch / 12.0).powi(2)).sqrt()
    } else {
        pitch
    }
}

/// Attic or roof deck: `area_sqft × pitch_factor × thickness_in / 12`
pub fn attic_roof_board_feet(
    area_sqft: f64,
    pitch: f64,
    thickness_in: f64,
    pitch_is_rise_over_12: bool,
) -> f64 {
    SqFt(area_sqft * pitch_factor(pitch, pitch_is_rise_over_12))
        .at_thickness(Inches(thickness_in))
        .value()
}

/// Flat area (slab, ceiling, low-slope deck): `area_sqft × thickness_in / 12`
pub fn flat_area_board_feet(area_sqft: f64, thickness_in: f64) -> f64 {
    SqFt(area_sqft).at_thickness(Inches(thickness_in)).value()
}

/// Linear run (rim joist, sill plate): `(linear_ft × spray_width_in / 12) × thickness_in / 12`
pub fn linear_board_feet(linear_ft: f64, spray_width_in: f64, thickness_in: f64) -> f64 {
    SqFt::from_lengths(Feet(linear_ft), Feet::from(Inches(spray_width_in)))
        .at_thickness(Inches(thickness_in))
        .value()
}

fn default_rise_over_12() -> bool {
    true
}

/// Shape of an assembly, carrying only the dimensions its formula needs.
///
/// ## JSON Example
///
/// ```json
/// { "kind": "attic", "area_sqft": 1200.0, "pitch": 6.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    /// Wall section measured along its length
    Wall { linear_ft: f64, height_ft: f64 },
    /// Attic floor or roof deck measured in plan
    Attic {
        area_sqft: f64,
        pitch: f64,
        /// Treat `pitch` as rise over 12 (slope-corrected); `false` uses it as a raw multiplier
        #[serde(default = "default_rise_over_12")]
        pitch_is_rise_over_12: bool,
    },
    /// Any flat surface measured by area
    Flat { area_sqft: f64 },
    /// Narrow strip such as a rim joist
    Linear { linear_ft: f64, spray_width_in: f64 },
}

impl Geometry {
    /// Board-feet for this shape at the given thickness.
    pub fn board_feet(&self, thickness_in: f64) -> f64 {
        match *self {
            Geometry::Wall { linear_ft, height_ft } => wall_board_feet(linear_ft, height_ft, thickness_in),
            Geometry::Attic {
                area_sqft,
                pitch,
                pitch_is_rise_over_12,
            } => attic_roof_board_feet(area_sqft, pitch, thickness_in, pitch_is_rise_over_12),
            Geometry::Flat { area_sqft } => flat_area_board_feet(area_sqft, thickness_in),
            Geometry::Linear {
                linear_ft,
                spray_width_in,
            } => linear_board_feet(linear_ft, spray_width_in, thickness_in),
        }
    }

    /// Sprayed surface area in square feet (before thickness).
    pub fn surface_sqft(&self) -> f64 {
        self.board_feet(12.0)
    }

    /// Lowercase kind tag, matching the serialized form.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Wall { .. } => "wall",
            Geometry::Attic { .. } => "attic",
            Geometry::Flat { .. } => "flat",
            Geometry::Linear { .. } => "linear",
        }
    }

    /// Reject non-positive or non-finite dimensions.
    ///
    /// Pitch may be zero (a flat attic floor) but not negative. A direct
    /// multiplier pitch must be positive since it scales the whole area.
    pub fn validate(&self) -> CalcResult<()> {
        match *self {
            Geometry::Wall { linear_ft, height_ft } => {
                require_positive("linear_ft", linear_ft)?;
                require_positive("height_ft", height_ft)
            }
            Geometry::Attic {
                area_sqft,
                pitch,
                pitch_is_rise_over_12,
            } => {
                require_positive("area_sqft", area_sqft)?;
                if pitch_is_rise_over_12 {
                    require_non_negative("pitch", pitch)
                } else {
                    require_positive("pitch", pitch)
                }
            }
            Geometry::Flat { area_sqft } => require_positive("area_sqft", area_sqft),
            Geometry::Linear {
                linear_ft,
                spray_width_in,
            } => {
                require_positive("linear_ft", linear_ft)?;
                require_positive("spray_width_in", spray_width_in)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_formula_exact() {
        assert_eq!(wall_board_feet(100.0, 8.0, 3.0), 200.0);
        assert_eq!(wall_board_feet(50.0, 8.0, 3.0), 100.0);
    }

    #[test]
    fn test_flat_and_linear() {
        assert_eq!(flat_area_board_feet(1200.0, 2.0), 200.0);
        // 100 ft of rim at 12" wide, 3" thick = 100 sq ft * 3 / 12
        assert_eq!(linear_board_feet(100.0, 12.0, 3.0), 25.0);
        // 6" strip is half as much
        assert_eq!(linear_board_feet(100.0, 6.0, 3.0), 12.5);
    }

    #[test]
    fn test_pitch_factor_modes() {
        assert_eq!(pitch_factor(0.0, true), 1.0);
        // 12/12 roof: sqrt(2)
        assert!((pitch_factor(12.0, true) - 2f64.sqrt()).abs() < 1e-12);
        // 6/12 roof: sqrt(1.25) = 1.1180
        assert!((pitch_factor(6.0, true) - 1.118_034).abs() < 1e-6);
        // Direct multiplier passes through
        assert_eq!(pitch_factor(1.25, false), 1.25);
    }

    #[test]
    fn test_attic_roof() {
        let bdft = attic_roof_board_feet(1000.0, 6.0, 6.0, true);
        assert!((bdft - 559.017).abs() < 0.001);

        let direct = attic_roof_board_feet(1000.0, 1.2, 6.0, false);
        assert!((direct - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_in_every_dimension() {
        let base = [
            Geometry::Wall { linear_ft: 40.0, height_ft: 8.0 },
            Geometry::Attic { area_sqft: 800.0, pitch: 4.0, pitch_is_rise_over_12: true },
            Geometry::Flat { area_sqft: 500.0 },
            Geometry::Linear { linear_ft: 120.0, spray_width_in: 10.0 },
        ];
        let grown = [
            [
                Geometry::Wall { linear_ft: 41.0, height_ft: 8.0 },
                Geometry::Wall { linear_ft: 40.0, height_ft: 9.0 },
            ],
            [
                Geometry::Attic { area_sqft: 801.0, pitch: 4.0, pitch_is_rise_over_12: true },
                Geometry::Attic { area_sqft: 800.0, pitch: 5.0, pitch_is_rise_over_12: true },
            ],
            [Geometry::Flat { area_sqft: 501.0 }, Geometry::Flat { area_sqft: 600.0 }],
            [
                Geometry::Linear { linear_ft: 121.0, spray_width_in: 10.0 },
                Geometry::Linear { linear_ft: 120.0, spray_width_in: 11.0 },
            ],
        ];

        for (shape, bigger) in base.iter().zip(grown.iter()) {
            let b = shape.board_feet(3.0);
            assert!(shape.board_feet(3.5) > b, "thickness for {}", shape.kind());
            for g in bigger {
                assert!(g.board_feet(3.0) > b, "dimension for {}", shape.kind());
            }
        }
    }

    #[test]
    fn test_surface_area() {
        let wall = Geometry::Wall { linear_ft: 50.0, height_ft: 8.0 };
        assert_eq!(wall.surface_sqft(), 400.0);
    }

    #[test]
    fn test_validation() {
        assert!(Geometry::Flat { area_sqft: 10.0 }.validate().is_ok());
        assert!(Geometry::Flat { area_sqft: 0.0 }.validate().is_err());
        assert!(Geometry::Wall { linear_ft: 10.0, height_ft: -8.0 }.validate().is_err());
        assert!(Geometry::Attic { area_sqft: 10.0, pitch: 0.0, pitch_is_rise_over_12: true }
            .validate()
            .is_ok());
        assert!(Geometry::Attic { area_sqft: 10.0, pitch: 0.0, pitch_is_rise_over_12: false }
            .validate()
            .is_err());
        assert!(Geometry::Linear { linear_ft: f64::NAN, spray_width_in: 6.0 }.validate().is_err());
    }

    #[test]
    fn test_json_shape() {
        let attic: Geometry = serde_json::from_str(r#"{"kind":"attic","area_sqft":1200.0,"pitch":6.0}"#).unwrap();
        assert_eq!(
            attic,
            Geometry::Attic { area_sqft: 1200.0, pitch: 6.0, pitch_is_rise_over_12: true }
        );

        let json = serde_json::to_string(&Geometry::Flat { area_sqft: 10.0 }).unwrap();
        assert_eq!(json, r#"{"kind":"flat","area_sqft":10.0}"#);
    }
}
