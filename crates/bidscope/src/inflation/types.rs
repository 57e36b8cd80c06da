// Live-auction inputs and inflation report types.

use crate::config::LeagueSettings;
use crate::position::Position;
use crate::valuation::auction::roster_size;
use crate::valuation::projections::ProjectionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Where a scraped player stands in the auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuctionStatus {
    Drafted,
    Available,
    OnBlock,
}

/// A scraped auction player matched to our projected value.
///
/// `actual_bid` is set once the player is drafted; `projected_value` is
/// missing when the scraper could not match the player to a projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedPlayer {
    pub name: String,
    #[serde(default)]
    pub positions: Vec<String>,
    pub status: AuctionStatus,
    #[serde(default)]
    pub winning_team: Option<String>,
    #[serde(default)]
    pub actual_bid: Option<u32>,
    #[serde(default)]
    pub projected_value: Option<f64>,
}

impl MatchedPlayer {
    pub fn is_drafted(&self) -> bool {
        self.status == AuctionStatus::Drafted
    }

    /// Still up for auction (including the player currently nominated).
    pub fn is_available(&self) -> bool {
        matches!(self.status, AuctionStatus::Available | AuctionStatus::OnBlock)
    }

    /// Eligible positions, canonicalized. Unknown strings are dropped.
    pub fn eligible_positions(&self) -> Vec<Position> {
        let mut out = Vec::new();
        for pos in self.positions.iter().filter_map(|s| Position::from_str_pos(s)) {
            let pos = pos.canonical();
            if !out.contains(&pos) {
                out.push(pos);
            }
        }
        out
    }
}

/// The subset of league settings the inflation engine needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueConfig {
    pub num_teams: u32,
    pub budget_per_team: u32,
    pub roster_spots: BTreeMap<String, usize>,
}

impl LeagueConfig {
    pub fn total_budget(&self) -> u32 {
        self.num_teams.saturating_mul(self.budget_per_team)
    }

    /// Auction roster slots per team (IL/NA excluded).
    pub fn roster_size(&self) -> usize {
        roster_size(&self.roster_spots)
    }

    /// Per-team slots that a concrete position fills (LF/CF/RF count as OF).
    pub fn slots_for(&self, position: Position) -> usize {
        self.roster_spots
            .iter()
            .filter(|(key, _)| {
                Position::from_str_pos(key).is_some_and(|p| p.canonical() == position)
            })
            .map(|(_, &count)| count)
            .sum()
    }
}

impl From<&LeagueSettings> for LeagueConfig {
    fn from(settings: &LeagueSettings) -> Self {
        LeagueConfig {
            num_teams: settings.num_teams,
            budget_per_team: settings.budget_per_team,
            roster_spots: settings.roster_spots.clone(),
        }
    }
}

/// Budget and roster progress for one team, as scraped from the draft room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedTeam {
    pub name: String,
    pub budget_remaining: u32,
    pub players_drafted: u32,
    #[serde(default)]
    pub total_roster_spots: Option<u32>,
    #[serde(default)]
    pub spent: Option<u32>,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Inflation among drafted players of one value tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierInflationData {
    pub tier: u8,
    pub player_count: usize,
    pub avg_projected_value: f64,
    pub avg_actual_bid: f64,
    /// Dampened-weight average of per-player inflation, in percent.
    pub inflation_rate: f64,
}

/// Spending inside one projected-value bracket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeInflation {
    pub label: String,
    pub min_price: u32,
    pub max_price: Option<u32>,
    pub player_count: usize,
    pub total_projected: f64,
    pub total_spent: u32,
    pub avg_bid: f64,
    pub percent_of_total_spend: f64,
    pub inflation_rate: f64,
}

/// Spending per eligible position. Multi-position players count at each.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionalInflation {
    pub position: Position,
    pub drafted_count: usize,
    pub total_projected: f64,
    pub total_spent: u32,
    pub avg_bid: f64,
    pub median_bid: f64,
    pub max_bid: u32,
    pub min_bid: u32,
    /// Sample standard deviation of winning bids (0 for a single bid).
    pub std_dev: f64,
    pub inflation_rate: f64,
}

/// Coarse bucket for `need / quality supply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScarcityLevel {
    Severe,
    Moderate,
    Normal,
    Surplus,
}

impl ScarcityLevel {
    /// Severe >= 2.0, Moderate >= 1.0, Normal >= 0.5, else Surplus.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 2.0 {
            ScarcityLevel::Severe
        } else if ratio >= 1.0 {
            ScarcityLevel::Moderate
        } else if ratio >= 0.5 {
            ScarcityLevel::Normal
        } else {
            ScarcityLevel::Surplus
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            ScarcityLevel::Severe => 1.25,
            ScarcityLevel::Moderate => 1.12,
            ScarcityLevel::Normal => 1.0,
            ScarcityLevel::Surplus => 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionalScarcity {
    pub position: Position,
    /// Unfilled slots at this position across the league.
    pub league_need: usize,
    pub available_count: usize,
    /// Available players at or above the median available value.
    pub quality_count: usize,
    pub scarcity_ratio: f64,
    pub level: ScarcityLevel,
    /// Level multiplier with the historical position premium applied.
    pub adjustment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamBudgetConstraint {
    pub team_name: String,
    pub spent: u32,
    pub budget_remaining: u32,
    pub players_drafted: u32,
    pub roster_spots_remaining: u32,
    /// Remaining budget less $1 held back for every slot after the next.
    pub effective_budget: u32,
    pub average_per_player: f64,
    pub budget_utilization: f64,
}

/// Full inflation report for one auction snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedInflationStats {
    /// Average of per-player inflation with cheap players dampened, in
    /// percent.
    pub overall_inflation_rate: f64,
    /// Projected-value-weighted inflation, in percent:
    /// `(Σ actual − Σ projected) / Σ projected`.
    pub weighted_inflation_rate: f64,
    pub drafted_count: usize,
    pub total_spent: u32,
    pub total_projected_value: f64,
    pub tier_inflation: Vec<TierInflationData>,
    pub price_range_inflation: Vec<PriceRangeInflation>,
    pub positional_inflation: Vec<PositionalInflation>,
    pub positional_scarcity: Vec<PositionalScarcity>,
    pub team_constraints: Vec<TeamBudgetConstraint>,
    pub adjusted_remaining_budget: f64,
    pub remaining_projected_value: f64,
    /// `adjusted_remaining_budget / remaining_projected_value` (1.0 when
    /// nothing of value remains).
    pub market_rate: f64,
}

impl EnhancedInflationStats {
    /// Best scarcity adjustment among a player's positions (1.0 if none).
    pub fn scarcity_adjustment(&self, positions: &[Position]) -> f64 {
        positions
            .iter()
            .filter_map(|p| {
                let p = p.canonical();
                self.positional_scarcity.iter().find(|s| s.position == p)
            })
            .map(|s| s.adjustment)
            .fold(None, |best: Option<f64>, a| Some(best.map_or(a, |b| b.max(a))))
            .unwrap_or(1.0)
    }

    /// What a player should cost given the current market:
    /// `projected × market_rate × best scarcity adjustment`, floored at $1.
    pub fn inflation_adjusted_value(&self, projected: f64, positions: &[Position]) -> f64 {
        (projected * self.market_rate * self.scarcity_adjustment(positions)).max(1.0)
    }
}

// ---------------------------------------------------------------------------
// JSON loaders
// ---------------------------------------------------------------------------

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ProjectionError> {
    let text = std::fs::read_to_string(path).map_err(|e| ProjectionError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| ProjectionError::Json {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load a JSON array of matched auction players.
pub fn load_matched_players(path: &Path) -> Result<Vec<MatchedPlayer>, ProjectionError> {
    read_json(path)
}

/// Load a JSON array of scraped team budgets.
pub fn load_scraped_teams(path: &Path) -> Result<Vec<ScrapedTeam>, ProjectionError> {
    read_json(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
