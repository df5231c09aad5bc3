//! # Overhead, Profit and Margin
//!
//! Two pricing conventions coexist in the trade, so both are exposed under
//! their own names and callers pick one on purpose:
//!
//! - [`apply_overhead_then_profit`] (cost-plus, the default):
//!   `sell = base × (1 + overhead%) × (1 + profit%)`
//! - [`apply_gross_margin`] (margin on sell price):
//!   `sell = base / (1 − margin%)`
//!
//! [`apply_margin`] dispatches on `PricingConfig::margin_model`.
//!
//! ## Example
//!
//! ```rust
//! use foam_core::calculations::margin::{apply_gross_margin, apply_overhead_then_profit};
//!
//! let cost_plus = apply_overhead_then_profit(100.0, 10.0, 20.0);
//! assert!((cost_plus.sell_price - 132.0).abs() < 1e-9);
//!
//! let margin = apply_gross_margin(100.0, 20.0).unwrap();
//! assert!((margin.sell_price - 125.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::errors::{require_non_negative, CalcError, CalcResult};
use crate::units::round_to_cents;

/// Which margin convention to price with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginModel {
    /// Overhead markup on cost, then profit markup on cost plus overhead
    #[default]
    OverheadThenProfit,
    /// Single margin expressed as a share of the sell price
    GrossMargin,
}

impl MarginModel {
    pub fn display_name(&self) -> &'static str {
        match self {
            MarginModel::OverheadThenProfit => "Overhead + Profit",
            MarginModel::GrossMargin => "Gross Margin",
        }
    }
}

/// Base cost split into overhead, profit and sell price.
///
/// Under the gross-margin model the whole markup is reported as `profit`
/// and `overhead` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginBreakdown {
    pub base: f64,
    pub overhead: f64,
    pub profit: f64,
    pub sell_price: f64,
}

impl MarginBreakdown {
    /// Base plus overhead, before profit
    pub fn with_overhead(&self) -> f64 {
        self.base + self.overhead
    }

    /// Round each line to cents and rebuild the sell price from the
    /// rounded lines so the breakdown always adds up on a printed quote.
    pub fn rounded(&self) -> MarginBreakdown {
        let base = round_to_cents(self.base);
        let overhead = round_to_cents(self.overhead);
        let profit = round_to_cents(self.profit);
        MarginBreakdown {
            base,
            overhead,
            profit,
            sell_price: round_to_cents(base + overhead + profit),
        }
    }
}

/// Cost-plus pricing: overhead on base, then profit on base plus overhead.
pub fn apply_overhead_then_profit(base: f64, overhead_percent: f64, profit_percent: f64) -> MarginBreakdown {
    let overhead = base * overhead_percent / 100.0;
    let with_overhead = base + overhead;
    let profit = with_overhead * profit_percent / 100.0;
    MarginBreakdown {
        base,
        overhead,
        profit,
        sell_price: with_overhead + profit,
    }
}

/// Gross-margin pricing: margin is a share of the final sell price.
///
/// A margin of 100% or more has no finite sell price and is rejected.
pub fn apply_gross_margin(base: f64, margin_percent: f64) -> CalcResult<MarginBreakdown> {
    require_non_negative("margin_percent", margin_percent)?;
    if margin_percent >= 100.0 {
        return Err(CalcError::invalid_input(
            "margin_percent",
            margin_percent.to_string(),
            "Gross margin must be below 100%",
        ));
    }

    let sell_price = base / (1.0 - margin_percent / 100.0);
    Ok(MarginBreakdown {
        base,
        overhead: 0.0,
        profit: sell_price - base,
        sell_price,
    })
}

/// Price `base` with the model selected in `config`.
pub fn apply_margin(base: f64, config: &PricingConfig) -> CalcResult<MarginBreakdown> {
    match config.margin_model {
        MarginModel::OverheadThenProfit => Ok(apply_overhead_then_profit(
            base,
            config.overhead_percent,
            config.profit_percent,
        )),
        MarginModel::GrossMargin => apply_gross_margin(base, config.margin_percent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overhead_then_profit() {
        let b = apply_overhead_then_profit(65.42, 18.0, 25.0);
        assert!((b.with_overhead() - 77.1956).abs() < 1e-9);
        assert!((b.sell_price - 96.4945).abs() < 1e-9);
    }

    #[test]
    fn test_rounded_lines_add_up() {
        let b = apply_overhead_then_profit(65.42, 18.0, 25.0).rounded();
        assert_eq!(b.overhead, 11.78);
        assert_eq!(b.profit, 19.3);
        assert!((b.with_overhead() - 77.2).abs() < 1e-9);
        assert_eq!(b.sell_price, 96.5);
    }

    #[test]
    fn test_gross_margin() {
        let b = apply_gross_margin(100.0, 30.0).unwrap().rounded();
        assert_eq!(b.sell_price, 142.86);
        assert_eq!(b.profit, 42.86);
        assert_eq!(b.overhead, 0.0);
    }

    #[test]
    fn test_gross_margin_rejects_100_percent() {
        assert!(apply_gross_margin(100.0, 100.0).is_err());
        assert!(apply_gross_margin(100.0, -1.0).is_err());
    }

    #[test]
    fn test_zero_percent_is_identity() {
        assert_eq!(apply_overhead_then_profit(80.0, 0.0, 0.0).sell_price, 80.0);
        assert_eq!(apply_gross_margin(80.0, 0.0).unwrap().sell_price, 80.0);
    }

    #[test]
    fn test_models_differ() {
        // 25% profit on cost is not the same as a 25% margin on price
        let plus = apply_overhead_then_profit(100.0, 0.0, 25.0);
        let gross = apply_gross_margin(100.0, 25.0).unwrap();
        assert!((plus.sell_price - 125.0).abs() < 1e-9);
        assert!((gross.sell_price - 133.333_333).abs() < 1e-6);
    }

    #[test]
    fn test_dispatch_on_config() {
        let mut config = PricingConfig {
            overhead_percent: 10.0,
            profit_percent: 10.0,
            margin_percent: 50.0,
            ..PricingConfig::default()
        };
        assert!((apply_margin(100.0, &config).unwrap().sell_price - 121.0).abs() < 1e-9);

        config.margin_model = MarginModel::GrossMargin;
        assert!((apply_margin(100.0, &config).unwrap().sell_price - 200.0).abs() < 1e-9);
    }
}
