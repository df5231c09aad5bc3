//! # Materials Catalog
//!
//! The foam and coating products a crew sprays, with catalog costs used when
//! the business has not configured its own price for a product.
//!
//! Cost resolution for an assembly never fails:
//!
//! 1. explicit `material_cost_per_bdft` on the assembly
//! 2. the business price in `PricingConfig::material_costs`
//! 3. [`MaterialType::catalog_cost_per_bdft`]
//!
//! ## Example
//!
//! ```rust
//! use foam_core::materials::MaterialType;
//!
//! let mat = MaterialType::from_str_flexible("closed cell").unwrap();
//! assert_eq!(mat, MaterialType::ClosedCell);
//! assert_eq!(mat.code(), "closed_cell");
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Fallback cost per board-foot for products without a catalog price.
pub const DEFAULT_MATERIAL_COST_PER_BDFT: f64 = 0.55;

/// Sprayed product families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    /// 0.5 lb open-cell foam
    OpenCell,
    /// 2 lb closed-cell foam
    ClosedCell,
    /// 3 lb roofing foam
    RoofFoam,
    /// Elastomeric roof coating (silicone / acrylic)
    RoofCoating,
    /// Anything else, priced at the default rate
    Other,
}

impl MaterialType {
    /// All material variants for UI selection
    pub const ALL: [MaterialType; 5] = [
        MaterialType::OpenCell,
        MaterialType::ClosedCell,
        MaterialType::RoofFoam,
        MaterialType::RoofCoating,
        MaterialType::Other,
    ];

    /// Serialized code (e.g., "open_cell")
    pub fn code(&self) -> &'static str {
        match self {
            MaterialType::OpenCell => "open_cell",
            MaterialType::ClosedCell => "closed_cell",
            MaterialType::RoofFoam => "roof_foam",
            MaterialType::RoofCoating => "roof_coating",
            MaterialType::Other => "other",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialType::OpenCell => "Open Cell Foam",
            MaterialType::ClosedCell => "Closed Cell Foam",
            MaterialType::RoofFoam => "Roofing Foam",
            MaterialType::RoofCoating => "Roof Coating",
            MaterialType::Other => "Other",
        }
    }

    /// Catalog cost per board-foot, used when the business has no price set.
    pub fn catalog_cost_per_bdft(&self) -> f64 {
        match self {
            MaterialType::OpenCell => 0.45,
            MaterialType::ClosedCell => 1.10,
            MaterialType::RoofFoam => 1.25,
            MaterialType::RoofCoating => 0.85,
            MaterialType::Other => DEFAULT_MATERIAL_COST_PER_BDFT,
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "open_cell" | "opencell" | "oc" | "open_cell_foam" => Ok(MaterialType::OpenCell),
            "closed_cell" | "closedcell" | "cc" | "closed_cell_foam" => Ok(MaterialType::ClosedCell),
            "roof_foam" | "roofing_foam" | "roof" => Ok(MaterialType::RoofFoam),
            "roof_coating" | "coating" | "silicone" | "acrylic" => Ok(MaterialType::RoofCoating),
            "other" => Ok(MaterialType::Other),
            _ => Err(CalcError::material_not_found(s)),
        }
    }
}

impl Default for MaterialType {
    fn default() -> Self {
        MaterialType::OpenCell
    }
}

impl std::fmt::Display for MaterialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for MaterialType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaterialType::from_str_flexible(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flexible_parsing() {
        assert_eq!(MaterialType::from_str_flexible("Open Cell").unwrap(), MaterialType::OpenCell);
        assert_eq!(MaterialType::from_str_flexible("CC").unwrap(), MaterialType::ClosedCell);
        assert_eq!(MaterialType::from_str_flexible("roof-coating").unwrap(), MaterialType::RoofCoating);
        assert!(MaterialType::from_str_flexible("fiberglass").is_err());
    }

    #[test]
    fn test_codes_match_serde() {
        for mat in MaterialType::ALL {
            let json = serde_json::to_string(&mat).unwrap();
            assert_eq!(json, format!("\"{}\"", mat.code()));
            assert_eq!(MaterialType::from_str_flexible(mat.code()).unwrap(), mat);
        }
    }

    #[test]
    fn test_catalog_costs_non_negative() {
        for mat in MaterialType::ALL {
            assert!(mat.catalog_cost_per_bdft() >= 0.0);
        }
        assert_eq!(MaterialType::Other.catalog_cost_per_bdft(), DEFAULT_MATERIAL_COST_PER_BDFT);
    }
}
