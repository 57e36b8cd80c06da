// Linear points scoring for points leagues.

use crate::valuation::projections::{PlayerType, Projection};
use crate::valuation::stats::projection_stat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-stat point weights from the league settings. Keys override or extend
/// the default tables below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsSettings {
    pub hitting: BTreeMap<String, f64>,
    pub pitching: BTreeMap<String, f64>,
}

const DEFAULT_HITTING_WEIGHTS: &[(&str, f64)] = &[
    ("1B", 1.0),
    ("2B", 2.0),
    ("3B", 3.0),
    ("HR", 4.0),
    ("R", 1.0),
    ("RBI", 1.0),
    ("BB", 1.0),
    ("HBP", 1.0),
    ("SB", 2.0),
    ("CS", -1.0),
    ("K", -0.5),
];

const DEFAULT_PITCHING_WEIGHTS: &[(&str, f64)] = &[
    ("IP", 3.0),
    ("K", 1.0),
    ("W", 5.0),
    ("L", -3.0),
    ("SV", 5.0),
    ("HLD", 2.0),
    ("QS", 3.0),
    ("BS", -2.0),
    ("ER", -2.0),
    ("H", -1.0),
    ("BB", -1.0),
];

/// Resolve the weight table for a player type: defaults, then league overrides.
pub fn effective_weights(
    player_type: PlayerType,
    settings: Option<&PointsSettings>,
) -> BTreeMap<String, f64> {
    let (defaults, overrides) = match player_type {
        PlayerType::Hitter => (DEFAULT_HITTING_WEIGHTS, settings.map(|s| &s.hitting)),
        PlayerType::Pitcher => (DEFAULT_PITCHING_WEIGHTS, settings.map(|s| &s.pitching)),
    };
    let mut weights: BTreeMap<String, f64> = defaults
        .iter()
        .map(|(code, w)| (code.to_string(), *w))
        .collect();
    if let Some(overrides) = overrides {
        for (code, w) in overrides {
            weights.insert(code.trim().to_uppercase(), *w);
        }
    }
    weights
}

/// `Σ stat(code) × weight(code)`. A missing stat block scores 0.
pub fn compute_points(player: &Projection, weights: &BTreeMap<String, f64>) -> f64 {
    weights
        .iter()
        .map(|(code, w)| projection_stat(player, code).unwrap_or(0.0) * w)
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
