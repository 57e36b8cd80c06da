// Historical auction baseline: how real auctions deviate from projected value.
//
// These tables are constant for the life of the process. The defaults below
// come from aggregate analysis of past auctions; `config/baseline.toml` can
// replace any of them at startup and a league's `inflation_settings` can
// override tier/position factors per call.

use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Position inflation classes
// ---------------------------------------------------------------------------

/// How strongly a position has historically been bid above projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InflationClass {
    Severe,
    High,
    Moderate,
}

impl InflationClass {
    /// Premium applied on top of the scarcity multiplier.
    ///
    /// Severe = +15%, High = +10%, Moderate = +5%.
    pub fn premium(&self) -> f64 {
        match self {
            InflationClass::Severe => 0.15,
            InflationClass::High => 0.10,
            InflationClass::Moderate => 0.05,
        }
    }
}

// ---------------------------------------------------------------------------
// Price ranges
// ---------------------------------------------------------------------------

/// A winning-bid bracket used for price-range inflation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub label: String,
    pub min: u32,
    /// Inclusive upper bound; `None` means open-ended.
    #[serde(default)]
    pub max: Option<u32>,
}

impl PriceRange {
    fn new(label: &str, min: u32, max: Option<u32>) -> Self {
        PriceRange {
            label: label.to_string(),
            min,
            max,
        }
    }

    /// Whether a winning bid falls into this range.
    pub fn contains(&self, bid: u32) -> bool {
        bid >= self.min && self.max.map_or(true, |max| bid <= max)
    }
}

// ---------------------------------------------------------------------------
// Baseline tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalBaseline {
    /// Market adjustment per value tier 1..=10 (index 0 = tier 1).
    pub tier_factors: Vec<f64>,
    /// Market adjustment per position abbreviation.
    pub position_factors: BTreeMap<String, f64>,
    /// Historical inflation class per position abbreviation.
    pub position_premiums: BTreeMap<String, InflationClass>,
    pub price_ranges: Vec<PriceRange>,
}

pub const DEFAULT_TIER_FACTORS: [f64; 10] =
    [-0.20, -0.08, 0.05, 0.12, 0.20, 0.30, 0.45, 0.60, 0.85, 1.20];

impl Default for HistoricalBaseline {
    fn default() -> Self {
        let position_factors = [
            ("C", 0.20),
            ("RP", 0.25),
            ("1B", -0.05),
            ("SS", 0.05),
            ("2B", 0.03),
            ("3B", 0.0),
            ("OF", 0.0),
            ("SP", 0.05),
            ("DH", -0.05),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();

        let position_premiums = [
            ("C", InflationClass::Severe),
            ("RP", InflationClass::Severe),
            ("SS", InflationClass::High),
            ("2B", InflationClass::High),
            ("3B", InflationClass::Moderate),
            ("SP", InflationClass::Moderate),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();

        HistoricalBaseline {
            tier_factors: DEFAULT_TIER_FACTORS.to_vec(),
            position_factors,
            position_premiums,
            price_ranges: vec![
                PriceRange::new("Filler", 1, Some(5)),
                PriceRange::new("Value", 6, Some(10)),
                PriceRange::new("Mid-tier", 11, Some(15)),
                PriceRange::new("Quality", 16, Some(20)),
                PriceRange::new("Star", 21, Some(30)),
                PriceRange::new("Elite", 31, None),
            ],
        }
    }
}

impl HistoricalBaseline {
    /// Process-wide default baseline.
    pub fn shared() -> &'static HistoricalBaseline {
        static BASELINE: OnceLock<HistoricalBaseline> = OnceLock::new();
        BASELINE.get_or_init(HistoricalBaseline::default)
    }

    /// Factor for a tier in 1..=10. Missing entries read as 0.
    pub fn tier_factor(&self, tier: u8) -> f64 {
        let idx = usize::from(tier.clamp(1, 10)) - 1;
        self.tier_factors.get(idx).copied().unwrap_or(0.0)
    }

    /// Largest position factor among the player's eligible positions
    /// (0 for a player with no listed position).
    pub fn position_factor(&self, positions: &[Position]) -> f64 {
        positions
            .iter()
            .filter_map(|p| self.position_factors.get(p.canonical().display_str()))
            .copied()
            .fold(None, |best: Option<f64>, f| Some(best.map_or(f, |b| b.max(f))))
            .unwrap_or(0.0)
    }

    /// Historical premium for a single position (0 when unclassified).
    pub fn position_premium(&self, position: Position) -> f64 {
        self.position_premiums
            .get(position.canonical().display_str())
            .map_or(0.0, InflationClass::premium)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
