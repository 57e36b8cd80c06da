// Positional scarcity of the players still on the board.
//
// Compares how many slots the league still has to fill at each position with
// how many above-median players remain there. The resulting multiplier feeds
// the inflation-adjusted value of a player.

use crate::baseline::HistoricalBaseline;
use crate::inflation::types::{LeagueConfig, MatchedPlayer, PositionalScarcity, ScarcityLevel};
use crate::position::CONCRETE_POSITIONS;
use tracing::debug;

/// Median of a list of values (mean of the middle pair for even lengths).
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Scarcity for every concrete position the roster has slots for.
///
/// Steps:
/// 1. Quality threshold = median projected value over all available players.
/// 2. Per position: `need = teams × slots − drafted eligible players`
///    (floored at 0); `quality` = available eligible players at or above
///    the threshold.
/// 3. `ratio = need / quality` mapped to a level. No quality supply with
///    unmet need is always severe.
/// 4. `adjustment = level multiplier × (1 + historical premium)`.
pub fn compute_positional_scarcity(
    players: &[MatchedPlayer],
    config: &LeagueConfig,
    baseline: &HistoricalBaseline,
) -> Vec<PositionalScarcity> {
    let available: Vec<(&MatchedPlayer, f64)> = players
        .iter()
        .filter(|p| p.is_available())
        .filter_map(|p| p.projected_value.map(|v| (p, v)))
        .collect();
    let values: Vec<f64> = available.iter().map(|(_, v)| *v).collect();
    let threshold = median(&values);
    debug!(
        "scarcity: {} available players, quality threshold ${:.1}",
        available.len(),
        threshold
    );

    let mut out = Vec::new();
    for &position in CONCRETE_POSITIONS {
        let slots = config.slots_for(position);
        if slots == 0 {
            continue;
        }

        let drafted = players
            .iter()
            .filter(|p| p.is_drafted() && p.eligible_positions().contains(&position))
            .count();
        let league_need = (config.num_teams as usize).saturating_mul(slots).saturating_sub(drafted);

        let eligible: Vec<f64> = available
            .iter()
            .filter(|(p, _)| p.eligible_positions().contains(&position))
            .map(|(_, v)| *v)
            .collect();
        let quality_count = eligible
            .iter()
            .filter(|&&v| v > 0.0 && v >= threshold)
            .count();

        let (scarcity_ratio, level) = if quality_count > 0 {
            let ratio = league_need as f64 / quality_count as f64;
            (ratio, ScarcityLevel::from_ratio(ratio))
        } else if league_need > 0 {
            (league_need as f64, ScarcityLevel::Severe)
        } else {
            (0.0, ScarcityLevel::Surplus)
        };

        out.push(PositionalScarcity {
            position,
            league_need,
            available_count: eligible.len(),
            quality_count,
            scarcity_ratio,
            level,
            adjustment: level.multiplier() * (1.0 + baseline.position_premium(position)),
        });
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
