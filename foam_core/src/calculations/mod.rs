//! # Estimating Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` / `*Totals` - Calculation results (JSON-serializable)
//! - `calculate_*(input, &config) -> CalcResult<_>` - Pure calculation function
//!
//! ## Available Calculations
//!
//! - [`cost`] - Labor hours, labor cost, material cost and markup
//! - [`margin`] - Overhead-then-profit and gross-margin pricing
//! - [`assembly`] - One priced assembly
//! - [`totals`] - Job and estimate aggregation

pub mod assembly;
pub mod cost;
pub mod margin;
pub mod totals;

// Re-export commonly used types
pub use assembly::{calculate_assembly, AssemblyInput, AssemblyResult};
pub use margin::{apply_gross_margin, apply_margin, apply_overhead_then_profit, MarginBreakdown, MarginModel};
pub use totals::{
    calculate_estimate_totals, calculate_job_totals_from_assemblies, recompute_totals, CostLine,
    EstimateOptions, EstimateTotals, JobFeeConfig, JobTotals,
};
