// Live-auction inflation analysis.
//
// Takes a snapshot of an auction in progress (players already bought and
// still available, each matched to our projected value) and measures how far
// real bidding has drifted from projection.

pub mod budget;
pub mod scarcity;
pub mod tiers;
pub mod types;

use crate::baseline::HistoricalBaseline;
use tracing::info;
use types::{EnhancedInflationStats, LeagueConfig, MatchedPlayer, ScrapedTeam};

/// Inflation report using the default historical baseline.
pub fn calculate_inflation_stats(
    players: &[MatchedPlayer],
    config: &LeagueConfig,
    teams: Option<&[ScrapedTeam]>,
) -> EnhancedInflationStats {
    calculate_inflation_stats_with(players, config, teams, HistoricalBaseline::shared())
}

/// Build the full inflation report for one auction snapshot.
///
/// Steps:
/// 1. Drafted players with a bid and a positive projected value are ranked
///    by projected value and bucketed into tiers.
/// 2. Overall, weighted, tier, price-range and positional inflation.
/// 3. Team constraints from scraped teams, or rebuilt from winning bids.
/// 4. Remaining projected value of available players, adjusted remaining
///    budget and the resulting market rate.
/// 5. Positional scarcity of the available pool.
pub fn calculate_inflation_stats_with(
    players: &[MatchedPlayer],
    config: &LeagueConfig,
    teams: Option<&[ScrapedTeam]>,
    baseline: &HistoricalBaseline,
) -> EnhancedInflationStats {
    let samples = tiers::drafted_samples(players);

    let (team_constraints, scraped) = match teams {
        Some(t) => (budget::constraints_from_teams(t, config), true),
        None => (budget::constraints_from_bids(players, config), false),
    };
    let adjusted_remaining_budget = budget::adjusted_remaining_budget(
        players,
        config,
        scraped.then_some(team_constraints.as_slice()),
    );

    let remaining_projected_value: f64 = players
        .iter()
        .filter(|p| p.is_available())
        .filter_map(|p| p.projected_value)
        .filter(|&v| v > 0.0)
        .sum();
    let market_rate = if remaining_projected_value > 0.0 {
        adjusted_remaining_budget / remaining_projected_value
    } else {
        1.0
    };

    let stats = EnhancedInflationStats {
        overall_inflation_rate: tiers::weighted_inflation(&samples),
        weighted_inflation_rate: tiers::aggregate_inflation(&samples),
        drafted_count: samples.len(),
        total_spent: samples.iter().map(|s| s.actual).sum(),
        total_projected_value: samples.iter().map(|s| s.projected).sum(),
        tier_inflation: tiers::tier_inflation(&samples),
        price_range_inflation: tiers::price_range_inflation(&samples, &baseline.price_ranges),
        positional_inflation: tiers::positional_inflation(&samples),
        positional_scarcity: scarcity::compute_positional_scarcity(players, config, baseline),
        team_constraints,
        adjusted_remaining_budget,
        remaining_projected_value,
        market_rate,
    };

    info!(
        "inflation: {} drafted, {:.1}% overall, market rate {:.3}",
        stats.drafted_count, stats.overall_inflation_rate, stats.market_rate
    );
    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
