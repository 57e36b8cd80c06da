// Standings Gain Points (category z-scores) against a replacement-level group.

use crate::valuation::projections::{PlayerType, Projection};
use crate::valuation::stats::projection_stat;
use std::collections::BTreeMap;
use tracing::debug;

// ---------------------------------------------------------------------------
// Pool statistics
// ---------------------------------------------------------------------------

/// Mean and standard deviation for a single category across the reference group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Threshold below which standard deviation is treated as zero.
const STDEV_EPSILON: f64 = 1e-9;

/// Compute mean and sample standard deviation for a slice of values.
///
/// Zero values are excluded: a 0 in a counting category almost always means
/// "not projected" rather than "projected to be zero". The variance uses the
/// N-1 divisor (falling back to 1 for a single value). A zero standard
/// deviation is replaced by 1 so every z-score stays finite.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    let nonzero: Vec<f64> = values.iter().copied().filter(|v| *v != 0.0).collect();
    if nonzero.is_empty() {
        return PoolStats {
            mean: 0.0,
            stdev: 1.0,
        };
    }
    let n = nonzero.len() as f64;
    let mean = nonzero.iter().sum::<f64>() / n;
    let divisor = (n - 1.0).max(1.0);
    let variance = nonzero.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / divisor;
    let stdev = variance.sqrt();
    PoolStats {
        mean,
        stdev: if stdev < STDEV_EPSILON { 1.0 } else { stdev },
    }
}

/// Whether a lower raw value is better in this category.
pub fn is_lower_better(player_type: PlayerType, code: &str) -> bool {
    let code = code.trim().to_uppercase();
    match player_type {
        PlayerType::Hitter => matches!(code.as_str(), "K" | "SO" | "CS" | "GIDP" | "GDP"),
        PlayerType::Pitcher => matches!(
            code.as_str(),
            "ERA"
                | "WHIP"
                | "BB/9"
                | "BB9"
                | "L"
                | "BS"
                | "ER"
                | "H"
                | "BB"
                | "HR"
                | "HBP"
                | "WP"
                | "BK"
                | "IRS"
                | "OBA"
                | "FIP"
        ),
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// Total SGP for one player plus the per-category contributions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SgpScore {
    pub total: f64,
    pub breakdown: BTreeMap<String, f64>,
}

/// Select the reference group: the top `size` players by projected WAR.
///
/// Ties keep input order.
pub fn reference_group<'a>(players: &[&'a Projection], size: usize) -> Vec<&'a Projection> {
    let mut sorted: Vec<&Projection> = players.to_vec();
    sorted.sort_by(|a, b| {
        b.war()
            .partial_cmp(&a.war())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(size);
    sorted
}

/// Per-category pool stats over the reference group.
pub fn compute_category_stats(
    group: &[&Projection],
    categories: &[String],
) -> BTreeMap<String, PoolStats> {
    categories
        .iter()
        .map(|code| {
            let values: Vec<f64> = group
                .iter()
                .filter_map(|p| projection_stat(p, code))
                .collect();
            let stats = compute_pool_stats(&values);
            (code.clone(), stats)
        })
        .collect()
}

/// Score one player against precomputed category stats.
///
/// A player without the stat block for its type scores 0 in every category.
pub fn score_player(
    player: &Projection,
    category_stats: &BTreeMap<String, PoolStats>,
) -> SgpScore {
    let mut score = SgpScore::default();
    for (code, stats) in category_stats {
        let z = match projection_stat(player, code) {
            Some(value) => {
                let z = (value - stats.mean) / stats.stdev;
                if is_lower_better(player.player_type, code) {
                    -z
                } else {
                    z
                }
            }
            None => 0.0,
        };
        score.total += z;
        score.breakdown.insert(code.clone(), z);
    }
    score
}

/// Compute SGP for every player of one type.
///
/// Steps:
/// 1. Reference group = top `pool_size` players by WAR.
/// 2. Mean and sample stdev per enabled category over that group.
/// 3. Score every player (not just the group), inverting lower-is-better
///    categories.
///
/// The returned scores line up index-for-index with `players`.
pub fn compute_sgp(
    players: &[&Projection],
    categories: &[String],
    pool_size: usize,
) -> Vec<SgpScore> {
    if players.is_empty() {
        return Vec::new();
    }
    let group = reference_group(players, pool_size.max(1));
    let category_stats = compute_category_stats(&group, categories);
    debug!(
        "SGP reference group: {} of {} players, {} categories",
        group.len(),
        players.len(),
        category_stats.len()
    );
    players
        .iter()
        .map(|p| score_player(p, &category_stats))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
