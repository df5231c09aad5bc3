//! # Cost Composition
//!
//! Turns board-feet into labor and material dollars. Everything here is
//! unrounded; rounding to cents happens once, when results are reported.

use serde::{Deserialize, Serialize};

/// Hours to spray `board_feet` at `rate` bdft/hr.
///
/// A zero, negative or non-finite rate yields 0 hours instead of infinity.
///
/// ```rust
/// use foam_core::calculations::cost::labor_hours;
///
/// assert_eq!(labor_hours(1200.0, 1200.0), 1.0);
/// assert_eq!(labor_hours(1200.0, 0.0), 0.0);
/// ```
pub fn labor_hours(board_feet: f64, rate: f64) -> f64 {
    if !rate.is_finite() || rate <= 0.0 {
        return 0.0;
    }
    board_feet / rate
}

/// `hours × labor_rate × crew_size`
pub fn labor_cost(hours: f64, labor_rate_per_hour: f64, crew_size: u32) -> f64 {
    hours * labor_rate_per_hour * f64::from(crew_size)
}

/// `board_feet × cost_per_bdft`
pub fn raw_material_cost(board_feet: f64, cost_per_bdft: f64) -> f64 {
    board_feet * cost_per_bdft
}

/// `raw × (1 + markup_percent / 100)`
pub fn apply_markup(raw_cost: f64, markup_percent: f64) -> f64 {
    raw_cost * (1.0 + markup_percent / 100.0)
}

/// Unrounded cost components of one assembly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub labor_hours: f64,
    pub labor_cost: f64,
    pub raw_material_cost: f64,
    /// Material cost including markup
    pub material_cost: f64,
}

impl CostBreakdown {
    /// Compose labor and material cost for a quantity of foam.
    pub fn compose(
        board_feet: f64,
        productivity_rate: f64,
        labor_rate_per_hour: f64,
        crew_size: u32,
        cost_per_bdft: f64,
        markup_percent: f64,
    ) -> Self {
        let hours = labor_hours(board_feet, productivity_rate);
        let raw = raw_material_cost(board_feet, cost_per_bdft);
        CostBreakdown {
            labor_hours: hours,
            labor_cost: labor_cost(hours, labor_rate_per_hour, crew_size),
            raw_material_cost: raw,
            material_cost: apply_markup(raw, markup_percent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labor_hours_zero_guards() {
        assert_eq!(labor_hours(0.0, 1200.0), 0.0);
        assert_eq!(labor_hours(500.0, 0.0), 0.0);
        assert_eq!(labor_hours(500.0, -10.0), 0.0);
        assert_eq!(labor_hours(500.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_labor_cost_scales_with_crew() {
        assert_eq!(labor_cost(2.0, 50.0, 1), 100.0);
        assert_eq!(labor_cost(2.0, 50.0, 3), 300.0);
    }

    #[test]
    fn test_markup_zero_is_identity() {
        for raw in [0.0, 0.01, 55.0, 1234.567, 1e9] {
            assert_eq!(apply_markup(raw, 0.0), raw);
        }
        assert!((apply_markup(100.0, 15.0) - 115.0).abs() < 1e-9);
    }

    #[test]
    fn test_compose() {
        let c = CostBreakdown::compose(100.0, 1200.0, 125.0, 1, 0.55, 0.0);
        assert!((c.labor_hours - 0.083_333).abs() < 1e-6);
        assert!((c.labor_cost - 10.416_667).abs() < 1e-6);
        assert!((c.raw_material_cost - 55.0).abs() < 1e-9);
        assert_eq!(c.material_cost, c.raw_material_cost);
    }
}
