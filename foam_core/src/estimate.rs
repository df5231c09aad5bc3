//! # Estimate Document
//!
//! The `Estimate` struct is the saved form of one customer quote.
//! Estimates serialize to `.sfe` (spray-foam estimate) files as JSON.
//!
//! ## Structure
//!
//! ```text
//! Estimate
//! ├── id: Uuid
//! ├── meta: EstimateMetadata (version, customer, job info, timestamps)
//! ├── pricing: PricingConfig (snapshot taken when the estimate was priced)
//! ├── options: EstimateOptions (miles, fee overrides)
//! ├── assemblies: Vec<AssemblyEntry> (insertion order)
//! └── totals: EstimateTotals (always consistent with the above)
//! ```
//!
//! Every mutation recomputes the totals from scratch. The pricing snapshot
//! travels with the estimate, so reopening it reproduces the same numbers
//! even after the business changes its live settings. Use
//! [`Estimate::reprice`] to deliberately move an estimate to new settings.
//!
//! ## Example
//!
//! ```rust
//! use foam_core::calculations::AssemblyInput;
//! use foam_core::config::PricingConfig;
//! use foam_core::estimate::Estimate;
//! use foam_core::geometry::Geometry;
//! use foam_core::materials::MaterialType;
//! use foam_core::productivity::Condition;
//!
//! let mut estimate = Estimate::new("Jane Homeowner", "Garage retrofit", PricingConfig::default())?;
//!
//! estimate.add_assembly(AssemblyInput {
//!     label: "East wall".to_string(),
//!     geometry: Geometry::Wall { linear_ft: 24.0, height_ft: 9.0 },
//!     thickness_in: 3.5,
//!     material: MaterialType::OpenCell,
//!     material_cost_per_bdft: None,
//!     condition: Condition::Typical,
//! })?;
//!
//! assert_eq!(estimate.assembly_count(), 1);
//! assert!(estimate.totals().job.grand_total > 0.0);
//! # Ok::<(), foam_core::errors::CalcError>(())
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::calculations::{calculate_estimate_totals, AssemblyInput, EstimateOptions, EstimateTotals};
use crate::config::PricingConfig;
use crate::errors::{CalcError, CalcResult};

/// Current schema version for .sfe files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// One assembly with its stable id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyEntry {
    pub id: Uuid,
    #[serde(flatten)]
    pub input: AssemblyInput,
}

/// Root estimate container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    pub id: Uuid,

    /// Estimate metadata (version, customer, job info)
    pub meta: EstimateMetadata,

    /// Pricing settings this estimate was priced with
    pricing: PricingConfig,

    /// Mileage and per-job fee overrides
    #[serde(default)]
    options: EstimateOptions,

    /// Assemblies in the order they were added
    ///
    /// A Vec keeps the quote's line order; ids stay stable across reorders
    /// and removals.
    assemblies: Vec<AssemblyEntry>,

    /// Cached totals, recomputed on every change and on load
    #[serde(default)]
    totals: EstimateTotals,
}

impl Estimate {
    /// Create a new empty estimate priced with `pricing`.
    ///
    /// Fails if the pricing snapshot is out of range.
    pub fn new(customer: impl Into<String>, job_name: impl Into<String>, pricing: PricingConfig) -> CalcResult<Self> {
        let now = Utc::now();
        let mut estimate = Estimate {
            id: Uuid::new_v4(),
            meta: EstimateMetadata {
                version: SCHEMA_VERSION.to_string(),
                customer: customer.into(),
                job_name: job_name.into(),
                site_address: None,
                created: now,
                modified: now,
            },
            pricing,
            options: EstimateOptions::default(),
            assemblies: Vec::new(),
            totals: EstimateTotals::default(),
        };
        estimate.recalculate()?;
        Ok(estimate)
    }

    /// Add an assembly and recompute totals.
    ///
    /// An invalid assembly is rejected and the estimate is left unchanged.
    pub fn add_assembly(&mut self, input: AssemblyInput) -> CalcResult<Uuid> {
        let id = Uuid::new_v4();
        let mut entries = self.assemblies.clone();
        entries.push(AssemblyEntry { id, input });
        self.commit(entries, self.pricing.clone(), self.options)?;
        Ok(id)
    }

    /// Replace an existing assembly's input and recompute totals.
    pub fn update_assembly(&mut self, id: &Uuid, input: AssemblyInput) -> CalcResult<()> {
        let mut entries = self.assemblies.clone();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == *id)
            .ok_or_else(|| CalcError::assembly_not_found(id))?;
        entry.input = input;
        self.commit(entries, self.pricing.clone(), self.options)
    }

    /// Remove an assembly by id and recompute totals.
    ///
    /// Returns the removed input.
    pub fn remove_assembly(&mut self, id: &Uuid) -> CalcResult<AssemblyInput> {
        let mut entries = self.assemblies.clone();
        let index = entries
            .iter()
            .position(|e| e.id == *id)
            .ok_or_else(|| CalcError::assembly_not_found(id))?;
        let removed = entries.remove(index);
        self.commit(entries, self.pricing.clone(), self.options)?;
        Ok(removed.input)
    }

    /// Get an assembly input by id.
    pub fn get_assembly(&self, id: &Uuid) -> Option<&AssemblyInput> {
        self.assemblies.iter().find(|e| e.id == *id).map(|e| &e.input)
    }

    pub fn assembly_count(&self) -> usize {
        self.assemblies.len()
    }

    /// Assemblies in quote order.
    pub fn assemblies(&self) -> &[AssemblyEntry] {
        &self.assemblies
    }

    /// Pricing snapshot the totals were computed with. Change it with [`Estimate::reprice`].
    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    /// Current mileage / fee overrides. Change them with [`Estimate::set_options`].
    pub fn options(&self) -> &EstimateOptions {
        &self.options
    }

    /// Change mileage / fee overrides and recompute totals.
    pub fn set_options(&mut self, options: EstimateOptions) -> CalcResult<()> {
        self.commit(self.assemblies.clone(), self.pricing.clone(), options)
    }

    /// Re-price this estimate with a new settings snapshot.
    pub fn reprice(&mut self, pricing: PricingConfig) -> CalcResult<()> {
        self.commit(self.assemblies.clone(), pricing, self.options)
    }

    /// Totals for the current assemblies, pricing and options.
    pub fn totals(&self) -> &EstimateTotals {
        &self.totals
    }

    /// Recompute totals from the stored snapshot.
    ///
    /// Called after loading from disk so the cached totals never come from
    /// the file itself.
    pub fn recalculate(&mut self) -> CalcResult<()> {
        self.totals = self.compute(&self.assemblies, &self.pricing, &self.options)?;
        Ok(())
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    fn compute(
        &self,
        entries: &[AssemblyEntry],
        pricing: &PricingConfig,
        options: &EstimateOptions,
    ) -> CalcResult<EstimateTotals> {
        let inputs: Vec<AssemblyInput> = entries.iter().map(|e| e.input.clone()).collect();
        calculate_estimate_totals(&inputs, pricing, options)
    }

    /// Price the candidate state and only then swap it in.
    fn commit(&mut self, entries: Vec<AssemblyEntry>, pricing: PricingConfig, options: EstimateOptions) -> CalcResult<()> {
        let totals = self.compute(&entries, &pricing, &options)?;
        self.assemblies = entries;
        self.pricing = pricing;
        self.options = options;
        self.totals = totals;
        self.touch();
        debug!(estimate = %self.id, assemblies = self.assemblies.len(), "estimate updated");
        Ok(())
    }
}

/// Estimate metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Customer name
    pub customer: String,

    /// Short job description
    pub job_name: String,

    /// Job site address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_address: Option<String>,

    /// When the estimate was created
    pub created: DateTime<Utc>,

    /// When the estimate was last modified
    pub modified: DateTime<Utc>,
}
