//! # Job Totals
//!
//! Aggregates priced assemblies into one quote. Totals are always a full
//! recompute over the current assembly list; there are no running sums to
//! drift when assemblies are added or removed.
//!
//! Overhead and profit (or gross margin) are priced once on the aggregate
//! base (material + labor), so the job total does not depend on how the work
//! is split into assemblies.
//!
//! ```text
//! base          = Σ material + Σ labor
//! subtotal      = base + overhead + profit
//! fuel          = miles × rate_per_mile
//! grand_total   = subtotal + mobilization + fuel
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::assembly::{price_assembly, AssemblyInput, AssemblyResult};
use crate::calculations::cost::labor_hours;
use crate::calculations::margin::{apply_margin, apply_overhead_then_profit, MarginBreakdown};
use crate::config::PricingConfig;
use crate::errors::{require_non_negative, CalcResult};
use crate::units::{round_to, round_to_cents};

/// The cost fields of one priced assembly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostLine {
    pub board_feet: f64,
    pub material_cost: f64,
    pub labor_cost: f64,
}

/// Job-level fee settings for cost-plus totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JobFeeConfig {
    pub overhead_percent: f64,
    pub profit_percent: f64,
    pub mobilization_fee: f64,
}

impl From<&PricingConfig> for JobFeeConfig {
    fn from(config: &PricingConfig) -> Self {
        JobFeeConfig {
            overhead_percent: config.overhead_percent,
            profit_percent: config.profit_percent,
            mobilization_fee: config.mobilization_fee,
        }
    }
}

/// Per-estimate options that are not business settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateOptions {
    /// Round-trip miles to the job site
    pub miles: Option<f64>,

    /// Overrides `PricingConfig::fuel_surcharge_per_mile`
    pub fuel_rate_per_mile: Option<f64>,

    /// Overrides `PricingConfig::mobilization_fee`
    pub mobilization_fee_override: Option<f64>,
}

impl EstimateOptions {
    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [
            ("miles", self.miles),
            ("fuel_rate_per_mile", self.fuel_rate_per_mile),
            ("mobilization_fee_override", self.mobilization_fee_override),
        ] {
            if let Some(value) = value {
                require_non_negative(field, value)?;
            }
        }
        Ok(())
    }
}

/// Aggregated quote. Every money field is in cents precision.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JobTotals {
    pub total_board_feet: f64,
    pub material_total: f64,
    pub labor_total: f64,

    /// Material plus labor
    pub base_cost: f64,

    pub overhead_total: f64,
    pub profit_total: f64,

    /// Base plus overhead plus profit
    pub subtotal_with_margin: f64,

    pub mobilization_fee: f64,
    pub fuel_surcharge: f64,
    pub grand_total: f64,
}

/// Full result for an estimate: every assembly plus the job totals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EstimateTotals {
    pub assemblies: Vec<AssemblyResult>,

    /// Crew hours across all assemblies (0.001)
    pub total_labor_hours: f64,

    pub job: JobTotals,
}

/// `miles × rate`, or 0 when no mileage is recorded.
pub fn fuel_surcharge(miles: Option<f64>, rate_per_mile: f64) -> f64 {
    miles.map(|m| m * rate_per_mile).unwrap_or(0.0)
}

fn aggregate(lines: &[CostLine], margin: MarginBreakdown, mobilization_fee: f64, fuel: f64) -> JobTotals {
    let margin = margin.rounded();
    let subtotal_with_margin = margin.sell_price;
    let mobilization_fee = round_to_cents(mobilization_fee);
    let fuel_surcharge = round_to_cents(fuel);

    JobTotals {
        total_board_feet: round_to(lines.iter().map(|l| l.board_feet).sum(), 2),
        material_total: round_to_cents(lines.iter().map(|l| l.material_cost).sum()),
        labor_total: round_to_cents(lines.iter().map(|l| l.labor_cost).sum()),
        base_cost: margin.base,
        overhead_total: margin.overhead,
        profit_total: margin.profit,
        subtotal_with_margin,
        mobilization_fee,
        fuel_surcharge,
        grand_total: round_to_cents(subtotal_with_margin + mobilization_fee + fuel_surcharge),
    }
}

fn base_cost(lines: &[CostLine]) -> f64 {
    let material: f64 = lines.iter().map(|l| l.material_cost).sum();
    let labor: f64 = lines.iter().map(|l| l.labor_cost).sum();
    round_to_cents(round_to_cents(material) + round_to_cents(labor))
}

/// Cost-plus job totals from already-priced assembly lines.
///
/// No fuel surcharge applies on this path.
///
/// # Example
///
/// ```rust
/// use foam_core::calculations::totals::{calculate_job_totals_from_assemblies, CostLine, JobFeeConfig};
///
/// let lines = [CostLine { board_feet: 100.0, material_cost: 55.0, labor_cost: 10.42 }];
/// let fees = JobFeeConfig { overhead_percent: 18.0, profit_percent: 25.0, mobilization_fee: 250.0 };
///
/// let totals = calculate_job_totals_from_assemblies(&lines, &fees);
/// assert_eq!(totals.subtotal_with_margin, 96.5);
/// assert_eq!(totals.grand_total, 346.5);
/// ```
pub fn calculate_job_totals_from_assemblies(lines: &[CostLine], fees: &JobFeeConfig) -> JobTotals {
    let base = base_cost(lines);
    let margin = apply_overhead_then_profit(base, fees.overhead_percent, fees.profit_percent);
    aggregate(lines, margin, fees.mobilization_fee, 0.0)
}

/// Price every assembly and aggregate into job totals.
///
/// The margin model comes from `config`; mileage and fee overrides come from
/// `options`.
pub fn calculate_estimate_totals(
    assemblies: &[AssemblyInput],
    config: &PricingConfig,
    options: &EstimateOptions,
) -> CalcResult<EstimateTotals> {
    config.validate()?;
    options.validate()?;

    let results = assemblies
        .iter()
        .map(|input| price_assembly(input, config))
        .collect::<CalcResult<Vec<_>>>()?;

    let lines: Vec<CostLine> = results.iter().map(AssemblyResult::cost_line).collect();
    let margin = apply_margin(base_cost(&lines), config)?;

    let rate_per_mile = options.fuel_rate_per_mile.unwrap_or(config.fuel_surcharge_per_mile);
    let mobilization = options.mobilization_fee_override.unwrap_or(config.mobilization_fee);
    let job = aggregate(&lines, margin, mobilization, fuel_surcharge(options.miles, rate_per_mile));

    let total_labor_hours = round_to(
        assemblies
            .iter()
            .zip(&results)
            // Unrounded per-assembly hours, so many small assemblies do not lose time
            .map(|(input, result)| labor_hours(input.board_feet(), result.productivity_rate))
            .sum(),
        3,
    );

    debug!(
        assemblies = results.len(),
        grand_total = job.grand_total,
        "estimate totals recomputed"
    );

    Ok(EstimateTotals {
        assemblies: results,
        total_labor_hours,
        job,
    })
}

/// Full recompute with default options; call after every add/remove.
pub fn recompute_totals(assemblies: &[AssemblyInput], config: &PricingConfig) -> CalcResult<EstimateTotals> {
    calculate_estimate_totals(assemblies, config, &EstimateOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::margin::MarginModel;
    use crate::geometry::Geometry;
    use crate::materials::MaterialType;
    use crate::productivity::Condition;

    fn wall(label: &str, linear_ft: f64) -> AssemblyInput {
        AssemblyInput {
            label: label.to_string(),
            geometry: Geometry::Wall {
                linear_ft,
                height_ft: 8.0,
            },
            thickness_in: 3.0,
            material: MaterialType::ClosedCell,
            material_cost_per_bdft: Some(0.55),
            condition: Condition::Typical,
        }
    }

    fn config() -> PricingConfig {
        PricingConfig {
            labor_rate_per_hour: 125.0,
            crew_size: 1,
            prod_typical: Some(1200.0),
            overhead_percent: 18.0,
            profit_percent: 25.0,
            mobilization_fee: 250.0,
            fuel_surcharge_per_mile: 0.0,
            ..PricingConfig::default()
        }
    }

    #[test]
    fn test_single_wall_scenario() {
        let totals = recompute_totals(&[wall("A", 50.0)], &config()).unwrap();
        let job = totals.job;

        assert_eq!(job.total_board_feet, 100.0);
        assert_eq!(job.material_total, 55.0);
        assert_eq!(job.labor_total, 10.42);
        assert_eq!(job.base_cost, 65.42);
        assert_eq!(job.overhead_total, 11.78);
        assert_eq!(job.profit_total, 19.3);
        assert_eq!(job.subtotal_with_margin, 96.5);
        assert_eq!(job.mobilization_fee, 250.0);
        assert_eq!(job.fuel_surcharge, 0.0);
        assert_eq!(job.grand_total, 346.5);
        assert_eq!(totals.total_labor_hours, 0.083);
    }

    #[test]
    fn test_board_feet_sum_matches_assemblies() {
        let assemblies = vec![
            wall("A", 50.0),
            wall("B", 33.3),
            AssemblyInput {
                label: "Attic".to_string(),
                geometry: Geometry::Attic {
                    area_sqft: 1234.5,
                    pitch: 7.0,
                    pitch_is_rise_over_12: true,
                },
                thickness_in: 5.5,
                material: MaterialType::OpenCell,
                material_cost_per_bdft: None,
                condition: Condition::Tight,
            },
        ];
        let totals = recompute_totals(&assemblies, &config()).unwrap();
        let sum: f64 = totals.assemblies.iter().map(|a| a.board_feet).sum();
        assert!((totals.job.total_board_feet - sum).abs() <= 0.01);
    }

    #[test]
    fn test_order_does_not_change_totals() {
        let forward = vec![wall("A", 50.0), wall("B", 21.7), wall("C", 13.1)];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = recompute_totals(&forward, &config()).unwrap().job;
        let b = recompute_totals(&reversed, &config()).unwrap().job;
        assert!((a.grand_total - b.grand_total).abs() < 1e-9);
    }

    #[test]
    fn test_empty_estimate_is_just_fees() {
        let options = EstimateOptions {
            miles: Some(40.0),
            fuel_rate_per_mile: Some(0.5),
            mobilization_fee_override: None,
        };
        let totals = calculate_estimate_totals(&[], &config(), &options).unwrap();
        assert_eq!(totals.job.base_cost, 0.0);
        assert_eq!(totals.job.fuel_surcharge, 20.0);
        assert_eq!(totals.job.grand_total, 270.0);
    }

    #[test]
    fn test_fuel_and_mobilization_options() {
        let mut cfg = config();
        cfg.fuel_surcharge_per_mile = 0.75;

        let no_miles = calculate_estimate_totals(&[wall("A", 50.0)], &cfg, &EstimateOptions::default()).unwrap();
        assert_eq!(no_miles.job.fuel_surcharge, 0.0);

        let options = EstimateOptions {
            miles: Some(100.0),
            fuel_rate_per_mile: None,
            mobilization_fee_override: Some(0.0),
        };
        let totals = calculate_estimate_totals(&[wall("A", 50.0)], &cfg, &options).unwrap();
        assert_eq!(totals.job.fuel_surcharge, 75.0);
        assert_eq!(totals.job.mobilization_fee, 0.0);
        assert_eq!(totals.job.grand_total, 171.5);
    }

    #[test]
    fn test_gross_margin_model_totals() {
        let cfg = PricingConfig {
            margin_model: MarginModel::GrossMargin,
            margin_percent: 50.0,
            ..config()
        };
        let job = recompute_totals(&[wall("A", 50.0)], &cfg).unwrap().job;
        assert_eq!(job.overhead_total, 0.0);
        assert_eq!(job.profit_total, 65.42);
        assert_eq!(job.subtotal_with_margin, 130.84);
    }

    #[test]
    fn test_job_totals_from_lines_matches_estimate_path() {
        let assemblies = vec![wall("A", 50.0), wall("B", 80.0)];
        let totals = recompute_totals(&assemblies, &config()).unwrap();

        let lines: Vec<CostLine> = totals.assemblies.iter().map(AssemblyResult::cost_line).collect();
        let from_lines = calculate_job_totals_from_assemblies(&lines, &JobFeeConfig::from(&config()));
        assert_eq!(from_lines, totals.job);
    }

    #[test]
    fn test_invalid_assembly_fails_whole_estimate() {
        let bad = AssemblyInput {
            thickness_in: 0.0,
            ..wall("Bad", 10.0)
        };
        assert!(recompute_totals(&[wall("A", 50.0), bad], &config()).is_err());

        let options = EstimateOptions {
            miles: Some(-3.0),
            ..EstimateOptions::default()
        };
        assert!(calculate_estimate_totals(&[], &config(), &options).is_err());
    }
}
