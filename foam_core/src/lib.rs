//! # foam_core - Spray Foam Estimating Engine
//!
//! `foam_core` turns the measurements a spray-foam estimator takes on site
//! (wall runs, attic areas, roof pitch, foam thickness) into board-feet,
//! labor hours, material cost and a priced quote. All inputs and outputs are
//! JSON-serializable so the same engine backs the CLI, saved estimate files
//! and any front end that speaks JSON.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions over an immutable `PricingConfig` snapshot
//! - **Full recompute**: Totals are rebuilt from inputs on every change
//! - **Rounding at the edge**: Full precision inside, cents on reported lines
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use foam_core::calculations::{calculate_assembly, AssemblyInput};
//! use foam_core::config::PricingConfig;
//! use foam_core::geometry::Geometry;
//! use foam_core::materials::MaterialType;
//! use foam_core::productivity::Condition;
//!
//! let input = AssemblyInput {
//!     label: "Garage attic".to_string(),
//!     geometry: Geometry::Attic { area_sqft: 600.0, pitch: 6.0, pitch_is_rise_over_12: true },
//!     thickness_in: 5.5,
//!     material: MaterialType::OpenCell,
//!     material_cost_per_bdft: None,
//!     condition: Condition::Tight,
//! };
//!
//! let result = calculate_assembly(&input, &PricingConfig::default())?;
//! println!("{} bdft, ${:.2} before margin", result.board_feet, result.pre_margin_total);
//! # Ok::<(), foam_core::errors::CalcError>(())
//! ```
//!
//! ## Modules
//!
//! - [`geometry`] - Board-foot formulas per assembly shape
//! - [`productivity`] - Spray rates by job condition
//! - [`materials`] - Foam and coating products with catalog costs
//! - [`config`] - Business pricing settings and the settings reducer
//! - [`calculations`] - Assembly pricing, margins and job totals
//! - [`estimate`] - Estimate document with assemblies and cached totals
//! - [`units`] - Type-safe unit wrappers and rounding
//! - [`errors`] - Structured error types
//! - [`file_io`] - `.sfe` files with atomic saves and locking

pub mod calculations;
pub mod config;
pub mod errors;
pub mod estimate;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod geometry;
pub mod materials;
pub mod productivity;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate_assembly, calculate_estimate_totals, AssemblyInput, AssemblyResult, EstimateTotals};
pub use config::{PricingConfig, SettingsPatch, SettingsUpdate};
pub use errors::{CalcError, CalcResult};
pub use estimate::Estimate;
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_estimate, load_pricing_config, save_estimate, save_pricing_config, FileLock};
pub use geometry::Geometry;
pub use materials::MaterialType;
pub use productivity::Condition;
