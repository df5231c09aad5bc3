//! # Productivity Rates
//!
//! How many board-feet a crew sprays per hour, by job condition.
//!
//! | Condition | Multiplier on typical |
//! |-----------|-----------------------|
//! | tight     | 0.7                   |
//! | typical   | 1.0                   |
//! | wide      | 1.4                   |
//!
//! With `auto_productivity` on, every rate is `typical × multiplier`. With it
//! off, an explicit per-condition override wins and the multiplier is only a
//! fallback. A missing typical rate falls back to [`DEFAULT_PROD_TYPICAL`].
//! Negative or non-finite rates resolve to 0, which in turn yields zero labor
//! hours rather than a division error.

use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::errors::CalcError;

/// Typical spray rate (bdft/hr) when the business has not set one.
pub const DEFAULT_PROD_TYPICAL: f64 = 1200.0;

/// Multiplier for cramped work (crawlspaces, cathedral bays).
pub const TIGHT_MULTIPLIER: f64 = 0.7;

/// Multiplier for the typical condition.
pub const TYPICAL_MULTIPLIER: f64 = 1.0;

/// Multiplier for wide-open work (pole barns, open decks).
pub const WIDE_MULTIPLIER: f64 = 1.4;

/// Job-site difficulty tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Tight,
    #[default]
    Typical,
    #[serde(alias = "wide_open")]
    Wide,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::Tight, Condition::Typical, Condition::Wide];

    /// Fixed multiplier applied to the typical rate
    pub fn multiplier(&self) -> f64 {
        match self {
            Condition::Tight => TIGHT_MULTIPLIER,
            Condition::Typical => TYPICAL_MULTIPLIER,
            Condition::Wide => WIDE_MULTIPLIER,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Condition::Tight => "Tight",
            Condition::Typical => "Typical",
            Condition::Wide => "Wide Open",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Condition {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "tight" => Ok(Condition::Tight),
            "typical" | "normal" => Ok(Condition::Typical),
            "wide" | "wide_open" | "open" => Ok(Condition::Wide),
            _ => Err(CalcError::invalid_input("condition", s, "Expected tight, typical or wide")),
        }
    }
}

/// Resolved bdft/hr for every condition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductivityRates {
    pub tight: f64,
    pub typical: f64,
    pub wide: f64,
}

impl ProductivityRates {
    pub fn get(&self, condition: Condition) -> f64 {
        match condition {
            Condition::Tight => self.tight,
            Condition::Typical => self.typical,
            Condition::Wide => self.wide,
        }
    }
}

/// Clamp a rate to a usable value: NaN, infinities and negatives become 0.
pub fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        0.0
    }
}

/// `typical × multiplier`, sanitized.
pub fn derived_rate(typical: f64, condition: Condition) -> f64 {
    sanitize_rate(sanitize_rate(typical) * condition.multiplier())
}

/// Typical rate from config, or the system default when unset.
pub fn typical_rate(config: &PricingConfig) -> f64 {
    sanitize_rate(config.prod_typical.unwrap_or(DEFAULT_PROD_TYPICAL))
}

/// Resolve the spray rate for one condition.
///
/// # Example
///
/// ```rust
/// use foam_core::config::PricingConfig;
/// use foam_core::productivity::{resolve_rate, Condition};
///
/// let config = PricingConfig {
///     prod_typical: Some(1000.0),
///     auto_productivity: true,
///     ..PricingConfig::default()
/// };
/// assert!((resolve_rate(&config, Condition::Wide) - 1400.0).abs() < 1e-9);
/// ```
pub fn resolve_rate(config: &PricingConfig, condition: Condition) -> f64 {
    let typical = typical_rate(config);

    if config.auto_productivity {
        return derived_rate(typical, condition);
    }

    let explicit = match condition {
        Condition::Typical => return typical,
        Condition::Wide => config.prod_wide_open,
        Condition::Tight => config.prod_tight,
    };

    match explicit {
        Some(rate) => sanitize_rate(rate),
        None => derived_rate(typical, condition),
    }
}

/// Resolve all three condition rates at once.
pub fn resolve_all(config: &PricingConfig) -> ProductivityRates {
    ProductivityRates {
        tight: resolve_rate(config, Condition::Tight),
        typical: resolve_rate(config, Condition::Typical),
        wide: resolve_rate(config, Condition::Wide),
    }
}
