// Valuation pipeline: projections -> scores -> dollars -> market -> dynasty.

pub mod auction;
pub mod dynasty;
pub mod market;
pub mod points;
pub mod projections;
pub mod sgp;
pub mod stats;

use crate::baseline::HistoricalBaseline;
use crate::config::{LeagueSettings, LeagueType, ScoringType};
use auction::{distribute_budget, roster_breakdown, ScoredCandidate};
use chrono::{DateTime, Utc};
use dynasty::{DynastyDetail, DynastyIndex};
use market::{apply_market_correction, normalize_proportional, MarketFactors};
use projections::{DynastyRanking, PlayerType, Projection};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("unknown scoring type '{0}'")]
    UnknownScoringType(String),

    #[error("invalid league setting `{field}`: {message}")]
    InvalidSettings { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueSummary {
    pub num_teams: u32,
    pub budget_per_team: u32,
    pub total_budget: u32,
    pub scoring_type: ScoringType,
    pub draftable_pool_size: usize,
    pub hitter_pool_size: usize,
    pub pitcher_pool_size: usize,
    pub hitter_budget: u32,
    pub pitcher_budget: u32,
    pub league_type: LeagueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynasty_weight: Option<f64>,
}

/// One valued player. Built once per calculation and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWithValue {
    #[serde(flatten)]
    pub projection: Projection,
    pub auction_value: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sgp_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_values: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_value: Option<f64>,
    pub tier: u8,
    pub is_in_draft_pool: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynasty: Option<DynastyDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedValuesResult {
    pub projection_system: String,
    pub calculated_at: DateTime<Utc>,
    pub league_summary: LeagueSummary,
    pub players: Vec<PlayerWithValue>,
}

// ---------------------------------------------------------------------------
// Raw scores
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum RawScore {
    Sgp(sgp::SgpScore),
    Points(f64),
}

impl RawScore {
    fn value(&self) -> f64 {
        match self {
            RawScore::Sgp(s) => s.total,
            RawScore::Points(p) => *p,
        }
    }
}

/// Output of the redraft pipeline for one player type.
struct TypeValuation {
    candidates: Vec<ScoredCandidate>,
    pool_size: usize,
    budget: u32,
}

// ---------------------------------------------------------------------------
// League summary
// ---------------------------------------------------------------------------

/// Pool sizes and budgets derived from the league settings.
///
/// `hitter_budget = round(total × hitter share)`; pitchers get the rest so
/// the two always add up to the total.
pub fn league_summary(settings: &LeagueSettings) -> LeagueSummary {
    let roster = roster_breakdown(&settings.roster_spots);
    let teams = settings.num_teams as usize;
    let total_budget = settings.total_budget();
    let hitter_budget = (f64::from(total_budget) * settings.hitter_pitcher_split.hitter_share())
        .round() as u32;
    LeagueSummary {
        num_teams: settings.num_teams,
        budget_per_team: settings.budget_per_team,
        total_budget,
        scoring_type: settings.scoring_type,
        draftable_pool_size: teams.saturating_mul(roster.total()),
        hitter_pool_size: teams.saturating_mul(roster.hitter_slots),
        pitcher_pool_size: teams.saturating_mul(roster.pitcher_slots),
        hitter_budget,
        pitcher_budget: total_budget - hitter_budget,
        league_type: settings.league_type,
        dynasty_weight: settings.dynasty_weight(),
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

fn score_players(
    projections: &[Projection],
    indices: &[usize],
    player_type: PlayerType,
    settings: &LeagueSettings,
    pool_size: usize,
) -> Vec<RawScore> {
    let players: Vec<&Projection> = indices.iter().map(|&i| &projections[i]).collect();
    if settings.scoring_type.is_points() {
        let weights = points::effective_weights(player_type, settings.points_settings.as_ref());
        players
            .iter()
            .map(|p| RawScore::Points(points::compute_points(p, &weights)))
            .collect()
    } else {
        let categories = match player_type {
            PlayerType::Hitter => settings.enabled_hitting_categories(),
            PlayerType::Pitcher => settings.enabled_pitching_categories(),
        };
        sgp::compute_sgp(&players, &categories, pool_size)
            .into_iter()
            .map(RawScore::Sgp)
            .collect()
    }
}

/// Redraft dollars for one player type: score, convert, correct.
fn value_player_type(
    projections: &[Projection],
    player_type: PlayerType,
    settings: &LeagueSettings,
    factors: &MarketFactors,
    pool_size: usize,
    budget: u32,
    scores_out: &mut HashMap<usize, RawScore>,
) -> TypeValuation {
    let indices: Vec<usize> = projections
        .iter()
        .enumerate()
        .filter(|(_, p)| p.player_type == player_type)
        .map(|(i, _)| i)
        .collect();

    let scores = score_players(projections, &indices, player_type, settings, pool_size);
    let mut candidates: Vec<ScoredCandidate> = indices
        .iter()
        .zip(scores.iter())
        .map(|(&i, s)| ScoredCandidate::new(i, s.value(), projections[i].positions.clone()))
        .collect();
    for (&i, s) in indices.iter().zip(scores) {
        scores_out.insert(i, s);
    }

    let pool = distribute_budget(&mut candidates, pool_size, budget);
    if settings.inflation().enable_market_correction {
        apply_market_correction(&mut candidates, factors, budget);
    } else {
        normalize_proportional(&mut candidates, budget);
    }

    info!(
        "{:?} pool: {} of {} players valued with ${}",
        player_type,
        pool,
        candidates.len(),
        budget
    );
    TypeValuation {
        candidates,
        pool_size,
        budget,
    }
}

/// Blend redraft values with dynasty rankings and re-run the converter over
/// ranked players only. Returns the dynasty detail per projection index.
fn apply_dynasty(
    projections: &[Projection],
    types: &mut [&mut TypeValuation],
    rankings: &[DynastyRanking],
    weight: f64,
    include_minors: bool,
) -> HashMap<usize, DynastyDetail> {
    let index = DynastyIndex::build(rankings, include_minors);

    let redraft: HashMap<usize, u32> = types
        .iter()
        .flat_map(|t| t.candidates.iter().map(|c| (c.index, c.auction_value)))
        .collect();
    let max_redraft = redraft.values().copied().max().unwrap_or(0);
    let capped_max = dynasty::capped_max_value(f64::from(max_redraft));

    let mut details = HashMap::new();
    let mut blended = HashMap::new();
    for (&i, &redraft_value) in &redraft {
        let detail = match index.lookup(&projections[i].name) {
            Some(ranking) => {
                let dollars = dynasty::dynasty_dollar_value(ranking.overall_rank, capped_max);
                let value = dynasty::blend(f64::from(redraft_value), f64::from(dollars), weight);
                blended.insert(i, value);
                DynastyDetail {
                    overall_rank: Some(ranking.overall_rank),
                    level: Some(ranking.level.clone()),
                    dynasty_dollar_value: Some(dollars),
                    redraft_value,
                    blended_value: Some(value),
                    has_no_dynasty_data: false,
                }
            }
            None => DynastyDetail {
                overall_rank: None,
                level: None,
                dynasty_dollar_value: None,
                redraft_value,
                blended_value: None,
                has_no_dynasty_data: true,
            },
        };
        details.insert(i, detail);
    }

    info!(
        "dynasty blend: {} of {} players ranked (weight {:.2}, cap ${:.1})",
        blended.len(),
        redraft.len(),
        weight,
        capped_max
    );

    for t in types.iter_mut() {
        let candidates = std::mem::take(&mut t.candidates);
        let (revalued, _) = dynasty::revalue_ranked(candidates, &blended, t.pool_size, t.budget);
        t.candidates = revalued;
    }
    details
}

// ---------------------------------------------------------------------------
// Top-level entry points
// ---------------------------------------------------------------------------

/// Compute auction values with the default historical baseline, stamped now.
pub fn calculate_auction_values(
    projections: &[Projection],
    settings: &LeagueSettings,
    dynasty_rankings: Option<&[DynastyRanking]>,
) -> Result<CalculatedValuesResult, ValuationError> {
    calculate_auction_values_at(
        projections,
        settings,
        dynasty_rankings,
        HistoricalBaseline::shared(),
        Utc::now(),
    )
}

/// Compute auction values for every projection.
///
/// Steps:
/// 1. Validate settings; derive pool sizes and hitter/pitcher budgets.
/// 2. Per player type: SGP (or points) scores, then the dollar converter
///    over the top `pool` players, then the market correction (or legacy
///    proportional normalization when disabled).
/// 3. Dynasty leagues with rankings: blend and re-value ranked players only.
/// 4. Sort by auction value descending.
///
/// Deterministic for identical inputs and `calculated_at`.
pub fn calculate_auction_values_at(
    projections: &[Projection],
    settings: &LeagueSettings,
    dynasty_rankings: Option<&[DynastyRanking]>,
    baseline: &HistoricalBaseline,
    calculated_at: DateTime<Utc>,
) -> Result<CalculatedValuesResult, ValuationError> {
    settings.validate()?;
    let summary = league_summary(settings);

    let mut result = CalculatedValuesResult {
        projection_system: settings.projection_system.as_str().to_string(),
        calculated_at,
        league_summary: summary.clone(),
        players: Vec::new(),
    };
    if projections.is_empty() {
        return Ok(result);
    }

    let factors = MarketFactors::resolve(baseline, &settings.inflation());
    let mut scores: HashMap<usize, RawScore> = HashMap::new();
    let mut hitters = value_player_type(
        projections,
        PlayerType::Hitter,
        settings,
        &factors,
        summary.hitter_pool_size,
        summary.hitter_budget,
        &mut scores,
    );
    let mut pitchers = value_player_type(
        projections,
        PlayerType::Pitcher,
        settings,
        &factors,
        summary.pitcher_pool_size,
        summary.pitcher_budget,
        &mut scores,
    );

    let mut dynasty_details: HashMap<usize, DynastyDetail> = HashMap::new();
    if settings.league_type == LeagueType::Dynasty {
        match dynasty_rankings.filter(|r| !r.is_empty()) {
            Some(rankings) => {
                let (weight, include_minors) = settings
                    .dynasty_settings
                    .map_or((0.0, false), |d| (d.dynasty_weight, d.include_minors));
                dynasty_details = apply_dynasty(
                    projections,
                    &mut [&mut hitters, &mut pitchers],
                    rankings,
                    weight,
                    include_minors,
                );
            }
            None => info!("dynasty league without rankings; using redraft values"),
        }
    }

    let mut players: Vec<PlayerWithValue> = hitters
        .candidates
        .iter()
        .chain(pitchers.candidates.iter())
        .map(|c| {
            let (sgp_value, category_values, points_value) = match scores.get(&c.index) {
                Some(RawScore::Sgp(s)) => (Some(s.total), Some(s.breakdown.clone()), None),
                Some(RawScore::Points(p)) => (None, None, Some(*p)),
                None => (None, None, None),
            };
            PlayerWithValue {
                projection: projections[c.index].clone(),
                auction_value: c.auction_value,
                sgp_value,
                category_values,
                points_value,
                tier: c.tier,
                is_in_draft_pool: c.in_pool,
                dynasty: dynasty_details.remove(&c.index),
            }
        })
        .collect();
    players.sort_by(|a, b| b.auction_value.cmp(&a.auction_value));

    result.players = players;
    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
