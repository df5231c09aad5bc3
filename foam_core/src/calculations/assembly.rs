//! # Assembly Pricing
//!
//! Prices one assembly (a wall section, attic, roof deck, rim run) from its
//! geometry, thickness, material and job condition.
//!
//! ## Example
//!
//! ```rust
//! use foam_core::calculations::assembly::{calculate_assembly, AssemblyInput};
//! use foam_core::config::PricingConfig;
//! use foam_core::geometry::Geometry;
//! use foam_core::materials::MaterialType;
//! use foam_core::productivity::Condition;
//!
//! let input = AssemblyInput {
//!     label: "North wall".to_string(),
//!     geometry: Geometry::Wall { linear_ft: 50.0, height_ft: 8.0 },
//!     thickness_in: 3.0,
//!     material: MaterialType::ClosedCell,
//!     material_cost_per_bdft: Some(0.55),
//!     condition: Condition::Typical,
//! };
//!
//! let config = PricingConfig {
//!     labor_rate_per_hour: 125.0,
//!     crew_size: 1,
//!     prod_typical: Some(1200.0),
//!     ..PricingConfig::default()
//! };
//!
//! let result = calculate_assembly(&input, &config).unwrap();
//! assert_eq!(result.board_feet, 100.0);
//! assert_eq!(result.material_cost, 55.0);
//! assert_eq!(result.labor_cost, 10.42);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::cost::CostBreakdown;
use crate::calculations::margin::apply_margin;
use crate::calculations::totals::CostLine;
use crate::config::PricingConfig;
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::geometry::Geometry;
use crate::materials::MaterialType;
use crate::productivity::{resolve_rate, Condition};
use crate::units::{round_to, round_to_cents};

/// Input parameters for one assembly.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Attic",
///   "geometry": { "kind": "attic", "area_sqft": 1200.0, "pitch": 6.0 },
///   "thickness_in": 5.5,
///   "material": "open_cell",
///   "condition": "tight"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyInput {
    /// User label (e.g., "North wall", "Garage attic")
    pub label: String,

    /// Shape and dimensions
    pub geometry: Geometry,

    /// Foam thickness in inches
    pub thickness_in: f64,

    /// Product sprayed
    #[serde(default)]
    pub material: MaterialType,

    /// Explicit cost per board-foot; overrides the configured price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_cost_per_bdft: Option<f64>,

    /// Job-site difficulty
    #[serde(default)]
    pub condition: Condition,
}

impl AssemblyInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if self.label.trim().is_empty() {
            return Err(CalcError::missing_field("label"));
        }
        self.geometry.validate()?;
        require_positive("thickness_in", self.thickness_in)?;
        if let Some(cost) = self.material_cost_per_bdft {
            require_non_negative("material_cost_per_bdft", cost)?;
        }
        Ok(())
    }

    /// Unrounded board-feet for this assembly
    pub fn board_feet(&self) -> f64 {
        self.geometry.board_feet(self.thickness_in)
    }

    /// Resolved material cost per board-foot (assembly, then config, then catalog)
    pub fn cost_per_bdft(&self, config: &PricingConfig) -> f64 {
        self.material_cost_per_bdft
            .unwrap_or_else(|| config.material_cost_per_bdft(self.material))
    }
}

/// Priced assembly. Money is rounded to cents, hours to 0.001.
///
/// `pre_margin_total` is material plus labor; `post_margin_total` applies
/// the config's margin model to that single assembly, for previews. Job
/// totals price the aggregate base instead (see `totals`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyResult {
    pub label: String,
    pub geometry_kind: String,
    pub material: MaterialType,
    pub condition: Condition,

    /// Sprayed surface area in sq ft (0.01)
    pub surface_sqft: f64,

    /// Board-feet of foam (0.01)
    pub board_feet: f64,

    /// Spray rate used, bdft/hr
    pub productivity_rate: f64,

    /// Crew hours on the gun (0.001)
    pub labor_hours: f64,

    pub labor_cost: f64,

    /// Material before markup
    pub raw_material_cost: f64,

    /// Material including markup
    pub material_cost: f64,

    pub pre_margin_total: f64,
    pub post_margin_total: f64,
}

impl AssemblyResult {
    /// The fields job aggregation consumes
    pub fn cost_line(&self) -> CostLine {
        CostLine {
            board_feet: self.board_feet,
            material_cost: self.material_cost,
            labor_cost: self.labor_cost,
        }
    }
}

/// Price a single assembly.
///
/// Validates both the input and the config, then computes board-feet, the
/// spray rate for the assembly's condition, labor and material cost, and a
/// per-assembly margin preview.
pub fn calculate_assembly(input: &AssemblyInput, config: &PricingConfig) -> CalcResult<AssemblyResult> {
    config.validate()?;
    price_assembly(input, config)
}

/// Same as [`calculate_assembly`] but trusts that `config` is already validated.
pub(crate) fn price_assembly(input: &AssemblyInput, config: &PricingConfig) -> CalcResult<AssemblyResult> {
    input.validate()?;

    let board_feet = input.board_feet();
    let rate = resolve_rate(config, input.condition);
    if rate == 0.0 {
        warn!(label = %input.label, condition = ?input.condition, "productivity rate resolved to 0, labor hours set to 0");
    }

    let costs = CostBreakdown::compose(
        board_feet,
        rate,
        config.labor_rate_per_hour,
        config.crew_size,
        input.cost_per_bdft(config),
        config.material_markup_percent,
    );

    let labor_cost = round_to_cents(costs.labor_cost);
    let material_cost = round_to_cents(costs.material_cost);
    let pre_margin_total = round_to_cents(labor_cost + material_cost);
    let post_margin_total = apply_margin(pre_margin_total, config)?.rounded().sell_price;

    debug!(
        label = %input.label,
        kind = input.geometry.kind(),
        board_feet,
        rate,
        pre_margin_total,
        "assembly priced"
    );

    Ok(AssemblyResult {
        label: input.label.clone(),
        geometry_kind: input.geometry.kind().to_string(),
        material: input.material,
        condition: input.condition,
        surface_sqft: round_to(input.geometry.surface_sqft(), 2),
        board_feet: round_to(board_feet, 2),
        productivity_rate: rate,
        labor_hours: round_to(costs.labor_hours, 3),
        labor_cost,
        raw_material_cost: round_to_cents(costs.raw_material_cost),
        material_cost,
        pre_margin_total,
        post_margin_total,
    })
}
