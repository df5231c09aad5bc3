//! # Pricing Configuration
//!
//! `PricingConfig` is the business-wide settings snapshot every calculation
//! borrows. The engine never mutates it in place: settings edits go through
//! [`PricingConfig::apply`], a reducer that validates the new value, returns
//! a new config, and recomputes derived fields from [`DERIVED_FIELD_RULES`].
//!
//! ## Derived fields
//!
//! | Trigger            | Only when auto productivity | Recomputed                     |
//! |--------------------|-----------------------------|--------------------------------|
//! | `ProdTypical`      | yes                         | `ProdWideOpen`, `ProdTight`    |
//! | `AutoProductivity` | yes (switched on)           | `ProdWideOpen`, `ProdTight`    |
//! | `ProdWideOpen`     | yes                         | `ProdWideOpen`                 |
//! | `ProdTight`        | yes                         | `ProdTight`                    |
//!
//! In auto mode the stored wide/tight rates always equal the derived rates,
//! so an explicit override only sticks once auto productivity is off.
//!
//! ## Example
//!
//! ```rust
//! use foam_core::config::{PricingConfig, SettingsUpdate};
//!
//! let config = PricingConfig::default()
//!     .apply(SettingsUpdate::AutoProductivity(true))?
//!     .apply(SettingsUpdate::ProdTypical(Some(1000.0)))?;
//!
//! assert_eq!(config.prod_tight, Some(700.0));
//! # Ok::<(), foam_core::errors::CalcError>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::margin::MarginModel;
use crate::errors::{require_non_negative, CalcError, CalcResult};
use crate::materials::MaterialType;
use crate::productivity::{derived_rate, typical_rate, Condition, DEFAULT_PROD_TYPICAL};

/// Business-wide pricing settings.
///
/// Every field has a default so a partial JSON file loads cleanly.
///
/// ## JSON Example
///
/// ```json
/// {
///   "labor_rate_per_hour": 125.0,
///   "crew_size": 2,
///   "prod_typical": 1200.0,
///   "auto_productivity": true,
///   "material_costs": { "open_cell": 0.42, "closed_cell": 1.05 },
///   "material_markup_percent": 10.0,
///   "overhead_percent": 18.0,
///   "profit_percent": 25.0,
///   "margin_model": "overhead_then_profit",
///   "mobilization_fee": 250.0,
///   "fuel_surcharge_per_mile": 0.65
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Hourly labor rate per crew member
    pub labor_rate_per_hour: f64,

    /// Crew members on the rig (≥ 1)
    pub crew_size: u32,

    /// Typical spray rate in bdft/hr (falls back to 1200 when unset)
    pub prod_typical: Option<f64>,

    /// Wide-open override in bdft/hr (manual mode only)
    pub prod_wide_open: Option<f64>,

    /// Tight override in bdft/hr (manual mode only)
    pub prod_tight: Option<f64>,

    /// Derive wide/tight rates from typical with fixed multipliers
    pub auto_productivity: bool,

    /// Business prices per board-foot; missing products use catalog cost
    pub material_costs: BTreeMap<MaterialType, f64>,

    /// Markup on raw material cost, percent
    pub material_markup_percent: f64,

    /// Overhead, percent of base cost (overhead-then-profit model)
    pub overhead_percent: f64,

    /// Profit, percent on cost plus overhead (overhead-then-profit model)
    pub profit_percent: f64,

    /// Gross margin, percent of sell price (gross-margin model, < 100)
    pub margin_percent: f64,

    /// Which margin convention totals use
    pub margin_model: MarginModel,

    /// Flat per-job mobilization charge
    pub mobilization_fee: f64,

    /// Fuel surcharge per mile driven
    pub fuel_surcharge_per_mile: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            labor_rate_per_hour: 65.0,
            crew_size: 2,
            prod_typical: Some(DEFAULT_PROD_TYPICAL),
            prod_wide_open: None,
            prod_tight: None,
            auto_productivity: true,
            material_costs: BTreeMap::new(),
            material_markup_percent: 0.0,
            overhead_percent: 18.0,
            profit_percent: 25.0,
            margin_percent: 30.0,
            margin_model: MarginModel::default(),
            mobilization_fee: 250.0,
            fuel_surcharge_per_mile: 0.0,
        }
    }
}

impl PricingConfig {
    /// Validate every range the engine relies on.
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("labor_rate_per_hour", self.labor_rate_per_hour)?;
        validate_crew_size(self.crew_size)?;
        for (field, rate) in [
            ("prod_typical", self.prod_typical),
            ("prod_wide_open", self.prod_wide_open),
            ("prod_tight", self.prod_tight),
        ] {
            if let Some(rate) = rate {
                require_non_negative(field, rate)?;
            }
        }
        for (material, cost) in &self.material_costs {
            require_non_negative(&format!("material_costs.{}", material.code()), *cost)?;
        }
        require_non_negative("material_markup_percent", self.material_markup_percent)?;
        require_non_negative("overhead_percent", self.overhead_percent)?;
        require_non_negative("profit_percent", self.profit_percent)?;
        validate_margin_percent(self.margin_percent)?;
        require_non_negative("mobilization_fee", self.mobilization_fee)?;
        require_non_negative("fuel_surcharge_per_mile", self.fuel_surcharge_per_mile)?;
        Ok(())
    }

    /// Cost per board-foot the business charges itself for a product.
    ///
    /// Falls back to the catalog price when no business price is configured.
    pub fn material_cost_per_bdft(&self, material: MaterialType) -> f64 {
        match self.material_costs.get(&material) {
            Some(cost) => *cost,
            None => {
                debug!(material = material.code(), "no configured material price, using catalog cost");
                material.catalog_cost_per_bdft()
            }
        }
    }

    /// Apply one settings edit, returning the updated config.
    ///
    /// The new value is range-checked first; an invalid edit leaves `self`
    /// untouched and returns `CalcError::InvalidInput`.
    pub fn apply(&self, update: SettingsUpdate) -> CalcResult<PricingConfig> {
        update.validate()?;

        let field = update.field();
        let mut next = self.clone();
        match update {
            SettingsUpdate::LaborRatePerHour(v) => next.labor_rate_per_hour = v,
            SettingsUpdate::CrewSize(v) => next.crew_size = v,
            SettingsUpdate::ProdTypical(v) => next.prod_typical = v,
            SettingsUpdate::ProdWideOpen(v) => next.prod_wide_open = v,
            SettingsUpdate::ProdTight(v) => next.prod_tight = v,
            SettingsUpdate::AutoProductivity(v) => next.auto_productivity = v,
            SettingsUpdate::MaterialCost { material, cost_per_bdft } => match cost_per_bdft {
                Some(cost) => {
                    next.material_costs.insert(material, cost);
                }
                None => {
                    next.material_costs.remove(&material);
                }
            },
            SettingsUpdate::MaterialMarkupPercent(v) => next.material_markup_percent = v,
            SettingsUpdate::OverheadPercent(v) => next.overhead_percent = v,
            SettingsUpdate::ProfitPercent(v) => next.profit_percent = v,
            SettingsUpdate::MarginPercent(v) => next.margin_percent = v,
            SettingsUpdate::MarginModel(v) => next.margin_model = v,
            SettingsUpdate::MobilizationFee(v) => next.mobilization_fee = v,
            SettingsUpdate::FuelSurchargePerMile(v) => next.fuel_surcharge_per_mile = v,
        }

        for rule in DERIVED_FIELD_RULES.iter().filter(|r| r.trigger == field) {
            if rule.requires_auto_productivity && !next.auto_productivity {
                continue;
            }
            for derived in rule.derived {
                next.recompute(*derived);
            }
        }

        debug!(?field, "pricing config updated");
        Ok(next)
    }

    /// Merge a partial form submission.
    ///
    /// Updates are applied in a fixed order: plain fields, then the auto
    /// productivity toggle, then the typical rate, then explicit wide/tight
    /// overrides. With auto off an explicit override in the same patch
    /// survives; with auto on it is replaced by the derived rate.
    pub fn apply_patch(&self, patch: &SettingsPatch) -> CalcResult<PricingConfig> {
        patch
            .to_updates()
            .into_iter()
            .try_fold(self.clone(), |config, update| config.apply(update))
    }

    fn recompute(&mut self, field: SettingsField) {
        let typical = typical_rate(self);
        match field {
            SettingsField::ProdWideOpen => self.prod_wide_open = Some(derived_rate(typical, Condition::Wide)),
            SettingsField::ProdTight => self.prod_tight = Some(derived_rate(typical, Condition::Tight)),
            // No other field is derived
            _ => {}
        }
    }
}

fn validate_crew_size(crew_size: u32) -> CalcResult<()> {
    if crew_size < 1 {
        return Err(CalcError::invalid_input(
            "crew_size",
            crew_size.to_string(),
            "Crew needs at least one member",
        ));
    }
    Ok(())
}

fn validate_margin_percent(margin_percent: f64) -> CalcResult<()> {
    require_non_negative("margin_percent", margin_percent)?;
    if margin_percent >= 100.0 {
        return Err(CalcError::invalid_input(
            "margin_percent",
            margin_percent.to_string(),
            "Gross margin must be below 100%",
        ));
    }
    Ok(())
}

/// Names of the editable settings fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsField {
    LaborRatePerHour,
    CrewSize,
    ProdTypical,
    ProdWideOpen,
    ProdTight,
    AutoProductivity,
    MaterialCost,
    MaterialMarkupPercent,
    OverheadPercent,
    ProfitPercent,
    MarginPercent,
    MarginModel,
    MobilizationFee,
    FuelSurchargePerMile,
}

/// One edit to a settings field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum SettingsUpdate {
    LaborRatePerHour(f64),
    CrewSize(u32),
    ProdTypical(Option<f64>),
    ProdWideOpen(Option<f64>),
    ProdTight(Option<f64>),
    AutoProductivity(bool),
    /// `None` clears the business price so the catalog cost applies
    MaterialCost {
        material: MaterialType,
        cost_per_bdft: Option<f64>,
    },
    MaterialMarkupPercent(f64),
    OverheadPercent(f64),
    ProfitPercent(f64),
    MarginPercent(f64),
    MarginModel(MarginModel),
    MobilizationFee(f64),
    FuelSurchargePerMile(f64),
}

impl SettingsUpdate {
    pub fn field(&self) -> SettingsField {
        match self {
            SettingsUpdate::LaborRatePerHour(_) => SettingsField::LaborRatePerHour,
            SettingsUpdate::CrewSize(_) => SettingsField::CrewSize,
            SettingsUpdate::ProdTypical(_) => SettingsField::ProdTypical,
            SettingsUpdate::ProdWideOpen(_) => SettingsField::ProdWideOpen,
            SettingsUpdate::ProdTight(_) => SettingsField::ProdTight,
            SettingsUpdate::AutoProductivity(_) => SettingsField::AutoProductivity,
            SettingsUpdate::MaterialCost { .. } => SettingsField::MaterialCost,
            SettingsUpdate::MaterialMarkupPercent(_) => SettingsField::MaterialMarkupPercent,
            SettingsUpdate::OverheadPercent(_) => SettingsField::OverheadPercent,
            SettingsUpdate::ProfitPercent(_) => SettingsField::ProfitPercent,
            SettingsUpdate::MarginPercent(_) => SettingsField::MarginPercent,
            SettingsUpdate::MarginModel(_) => SettingsField::MarginModel,
            SettingsUpdate::MobilizationFee(_) => SettingsField::MobilizationFee,
            SettingsUpdate::FuelSurchargePerMile(_) => SettingsField::FuelSurchargePerMile,
        }
    }

    fn validate(&self) -> CalcResult<()> {
        match self {
            SettingsUpdate::LaborRatePerHour(v) => require_non_negative("labor_rate_per_hour", *v),
            SettingsUpdate::CrewSize(v) => validate_crew_size(*v),
            SettingsUpdate::ProdTypical(Some(v)) => require_non_negative("prod_typical", *v),
            SettingsUpdate::ProdWideOpen(Some(v)) => require_non_negative("prod_wide_open", *v),
            SettingsUpdate::ProdTight(Some(v)) => require_non_negative("prod_tight", *v),
            SettingsUpdate::MaterialCost {
                material,
                cost_per_bdft: Some(cost),
            } => require_non_negative(&format!("material_costs.{}", material.code()), *cost),
            SettingsUpdate::MaterialMarkupPercent(v) => require_non_negative("material_markup_percent", *v),
            SettingsUpdate::OverheadPercent(v) => require_non_negative("overhead_percent", *v),
            SettingsUpdate::ProfitPercent(v) => require_non_negative("profit_percent", *v),
            SettingsUpdate::MarginPercent(v) => validate_margin_percent(*v),
            SettingsUpdate::MobilizationFee(v) => require_non_negative("mobilization_fee", *v),
            SettingsUpdate::FuelSurchargePerMile(v) => require_non_negative("fuel_surcharge_per_mile", *v),
            _ => Ok(()),
        }
    }
}

/// A derived-field dependency: when `trigger` changes, `derived` are recomputed.
#[derive(Debug, Clone, Copy)]
pub struct DerivedRule {
    pub trigger: SettingsField,
    pub requires_auto_productivity: bool,
    pub derived: &'static [SettingsField],
}

/// Every derived-field rule, in evaluation order.
pub const DERIVED_FIELD_RULES: &[DerivedRule] = &[
    DerivedRule {
        trigger: SettingsField::ProdTypical,
        requires_auto_productivity: true,
        derived: &[SettingsField::ProdWideOpen, SettingsField::ProdTight],
    },
    DerivedRule {
        trigger: SettingsField::AutoProductivity,
        requires_auto_productivity: true,
        derived: &[SettingsField::ProdWideOpen, SettingsField::ProdTight],
    },
    DerivedRule {
        trigger: SettingsField::ProdWideOpen,
        requires_auto_productivity: true,
        derived: &[SettingsField::ProdWideOpen],
    },
    DerivedRule {
        trigger: SettingsField::ProdTight,
        requires_auto_productivity: true,
        derived: &[SettingsField::ProdTight],
    },
];

/// Partial settings submission from a form; `None` means "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub labor_rate_per_hour: Option<f64>,
    pub crew_size: Option<u32>,
    pub prod_typical: Option<f64>,
    pub prod_wide_open: Option<f64>,
    pub prod_tight: Option<f64>,
    pub auto_productivity: Option<bool>,
    pub material_costs: BTreeMap<MaterialType, f64>,
    pub material_markup_percent: Option<f64>,
    pub overhead_percent: Option<f64>,
    pub profit_percent: Option<f64>,
    pub margin_percent: Option<f64>,
    pub margin_model: Option<MarginModel>,
    pub mobilization_fee: Option<f64>,
    pub fuel_surcharge_per_mile: Option<f64>,
}

impl SettingsPatch {
    /// Expand into individual updates, in application order.
    pub fn to_updates(&self) -> Vec<SettingsUpdate> {
        let mut updates = Vec::new();

        if let Some(v) = self.labor_rate_per_hour {
            updates.push(SettingsUpdate::LaborRatePerHour(v));
        }
        if let Some(v) = self.crew_size {
            updates.push(SettingsUpdate::CrewSize(v));
        }
        for (material, cost) in &self.material_costs {
            updates.push(SettingsUpdate::MaterialCost {
                material: *material,
                cost_per_bdft: Some(*cost),
            });
        }
        if let Some(v) = self.material_markup_percent {
            updates.push(SettingsUpdate::MaterialMarkupPercent(v));
        }
        if let Some(v) = self.overhead_percent {
            updates.push(SettingsUpdate::OverheadPercent(v));
        }
        if let Some(v) = self.profit_percent {
            updates.push(SettingsUpdate::ProfitPercent(v));
        }
        if let Some(v) = self.margin_percent {
            updates.push(SettingsUpdate::MarginPercent(v));
        }
        if let Some(v) = self.margin_model {
            updates.push(SettingsUpdate::MarginModel(v));
        }
        if let Some(v) = self.mobilization_fee {
            updates.push(SettingsUpdate::MobilizationFee(v));
        }
        if let Some(v) = self.fuel_surcharge_per_mile {
            updates.push(SettingsUpdate::FuelSurchargePerMile(v));
        }

        // Productivity last: toggle, then typical, then explicit overrides
        if let Some(v) = self.auto_productivity {
            updates.push(SettingsUpdate::AutoProductivity(v));
        }
        if let Some(v) = self.prod_typical {
            updates.push(SettingsUpdate::ProdTypical(Some(v)));
        }
        if let Some(v) = self.prod_wide_open {
            updates.push(SettingsUpdate::ProdWideOpen(Some(v)));
        }
        if let Some(v) = self.prod_tight {
            updates.push(SettingsUpdate::ProdTight(Some(v)));
        }

        updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::productivity::resolve_all;

    #[test]
    fn test_default_is_valid() {
        assert!(PricingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: PricingConfig = serde_json::from_str(r#"{"labor_rate_per_hour": 125.0}"#).unwrap();
        assert_eq!(config.labor_rate_per_hour, 125.0);
        assert_eq!(config.crew_size, PricingConfig::default().crew_size);
        assert_eq!(config.margin_model, MarginModel::OverheadThenProfit);
    }

    #[test]
    fn test_validation_ranges() {
        let bad_crew = PricingConfig {
            crew_size: 0,
            ..PricingConfig::default()
        };
        assert_eq!(bad_crew.validate().unwrap_err().error_code(), "INVALID_INPUT");

        let bad_margin = PricingConfig {
            margin_percent: 100.0,
            ..PricingConfig::default()
        };
        assert!(bad_margin.validate().is_err());

        let mut bad_cost = PricingConfig::default();
        bad_cost.material_costs.insert(MaterialType::ClosedCell, -1.0);
        match bad_cost.validate().unwrap_err() {
            CalcError::InvalidInput { field, .. } => assert_eq!(field, "material_costs.closed_cell"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_material_cost_fallback() {
        let mut config = PricingConfig::default();
        assert_eq!(
            config.material_cost_per_bdft(MaterialType::OpenCell),
            MaterialType::OpenCell.catalog_cost_per_bdft()
        );
        config.material_costs.insert(MaterialType::OpenCell, 0.38);
        assert_eq!(config.material_cost_per_bdft(MaterialType::OpenCell), 0.38);
    }

    #[test]
    fn test_typical_change_recomputes_when_auto() {
        let config = PricingConfig {
            auto_productivity: true,
            ..PricingConfig::default()
        }
        .apply(SettingsUpdate::ProdTypical(Some(1000.0)))
        .unwrap();

        assert_eq!(config.prod_typical, Some(1000.0));
        assert!((config.prod_wide_open.unwrap() - 1400.0).abs() < 1e-9);
        assert!((config.prod_tight.unwrap() - 700.0).abs() < 1e-9);
    }

    #[test]
    fn test_typical_change_leaves_manual_overrides() {
        let config = PricingConfig {
            auto_productivity: false,
            prod_wide_open: Some(2000.0),
            ..PricingConfig::default()
        }
        .apply(SettingsUpdate::ProdTypical(Some(1000.0)))
        .unwrap();

        assert_eq!(config.prod_wide_open, Some(2000.0));
        assert_eq!(config.prod_tight, None);
    }

    #[test]
    fn test_enabling_auto_recomputes() {
        let config = PricingConfig {
            auto_productivity: false,
            prod_typical: Some(1000.0),
            prod_tight: Some(100.0),
            ..PricingConfig::default()
        }
        .apply(SettingsUpdate::AutoProductivity(true))
        .unwrap();

        assert!((config.prod_tight.unwrap() - 700.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_update_rejected() {
        let config = PricingConfig::default();
        assert!(config.apply(SettingsUpdate::MarginPercent(120.0)).is_err());
        assert!(config.apply(SettingsUpdate::CrewSize(0)).is_err());
        assert!(config.apply(SettingsUpdate::OverheadPercent(f64::NAN)).is_err());
    }

    #[test]
    fn test_clear_material_cost() {
        let config = PricingConfig::default()
            .apply(SettingsUpdate::MaterialCost {
                material: MaterialType::RoofFoam,
                cost_per_bdft: Some(1.4),
            })
            .unwrap();
        assert_eq!(config.material_cost_per_bdft(MaterialType::RoofFoam), 1.4);

        let cleared = config
            .apply(SettingsUpdate::MaterialCost {
                material: MaterialType::RoofFoam,
                cost_per_bdft: None,
            })
            .unwrap();
        assert!(cleared.material_costs.is_empty());
    }

    #[test]
    fn test_patch_explicit_override_survives() {
        let patch = SettingsPatch {
            labor_rate_per_hour: Some(110.0),
            auto_productivity: Some(false),
            prod_typical: Some(900.0),
            prod_wide_open: Some(1500.0),
            ..SettingsPatch::default()
        };
        let config = PricingConfig::default().apply_patch(&patch).unwrap();

        assert_eq!(config.labor_rate_per_hour, 110.0);
        assert!(!config.auto_productivity);
        assert_eq!(config.prod_typical, Some(900.0));
        assert_eq!(config.prod_wide_open, Some(1500.0));
    }

    #[test]
    fn test_patch_overrides_follow_auto_mode() {
        let patch = SettingsPatch {
            auto_productivity: Some(true),
            prod_typical: Some(1000.0),
            prod_wide_open: Some(5000.0),
            prod_tight: Some(50.0),
            ..SettingsPatch::default()
        };
        let config = PricingConfig::default().apply_patch(&patch).unwrap();
        let rates = resolve_all(&config);

        assert!(config.auto_productivity);
        assert_eq!(config.prod_wide_open, Some(rates.wide));
        assert_eq!(config.prod_tight, Some(rates.tight));
        assert!((rates.wide - 1400.0).abs() < 1e-9);
        assert!((rates.tight - 700.0).abs() < 1e-9);
    }

    #[test]
    fn test_override_in_auto_mode_is_rederived() {
        let config = PricingConfig {
            auto_productivity: true,
            prod_typical: Some(1000.0),
            ..PricingConfig::default()
        }
        .apply(SettingsUpdate::ProdWideOpen(Some(9000.0)))
        .unwrap();
        assert!((config.prod_wide_open.unwrap() - 1400.0).abs() < 1e-9);
    }

    #[test]
    fn test_patch_stops_on_first_invalid_value() {
        let patch = SettingsPatch {
            overhead_percent: Some(-5.0),
            ..SettingsPatch::default()
        };
        assert!(PricingConfig::default().apply_patch(&patch).is_err());
    }

    #[test]
    fn test_update_json_shape() {
        let update: SettingsUpdate = serde_json::from_str(r#"{"field":"overhead_percent","value":20.0}"#).unwrap();
        assert_eq!(update, SettingsUpdate::OverheadPercent(20.0));
        assert_eq!(update.field(), SettingsField::OverheadPercent);
    }
}
