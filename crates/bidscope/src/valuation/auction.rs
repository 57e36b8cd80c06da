// Auction dollar value conversion.
//
// Converts ranked scores (SGP or points) into auction dollars for a
// salary-cap draft. Every in-pool player is guaranteed $1; the rest of the
// budget is distributed proportionally to positive score, and the final
// values are corrected so they sum to the budget exactly.

use crate::position::Position;
use std::collections::BTreeMap;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Roster size calculation
// ---------------------------------------------------------------------------

/// Per-team slot counts split by who fills them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterBreakdown {
    pub hitter_slots: usize,
    pub pitcher_slots: usize,
    pub bench_slots: usize,
}

impl RosterBreakdown {
    /// Slots that take part in the auction (IL/NA excluded).
    pub fn total(&self) -> usize {
        self.hitter_slots + self.pitcher_slots + self.bench_slots
    }
}

/// Classify a league's roster slots.
///
/// IL/DL/NA slots are not counted because those players do not consume
/// auction budget. Unknown slot names are ignored with a warning.
pub fn roster_breakdown(roster: &BTreeMap<String, usize>) -> RosterBreakdown {
    let mut breakdown = RosterBreakdown::default();
    for (key, &count) in roster {
        match Position::from_str_pos(key) {
            Some(pos) if pos.is_hitter_slot() => breakdown.hitter_slots += count,
            Some(pos) if pos.is_pitcher_slot() => breakdown.pitcher_slots += count,
            Some(Position::Bench) => breakdown.bench_slots += count,
            Some(_) => {}
            None => warn!("ignoring unknown roster slot '{}'", key),
        }
    }
    breakdown
}

/// Active roster size per team (hitters + pitchers + bench).
pub fn roster_size(roster: &BTreeMap<String, usize>) -> usize {
    roster_breakdown(roster).total()
}

// ---------------------------------------------------------------------------
// Scored candidates
// ---------------------------------------------------------------------------

/// A player moving through the dollar pipeline.
///
/// Only lives for the duration of one calculation; the public result type is
/// built from it once every stage is done.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// Index into the caller's projection slice.
    pub index: usize,
    pub score: f64,
    pub positions: Vec<Position>,
    pub auction_value: u32,
    pub tier: u8,
    pub in_pool: bool,
}

impl ScoredCandidate {
    pub fn new(index: usize, score: f64, positions: Vec<Position>) -> Self {
        ScoredCandidate {
            index,
            score,
            positions,
            auction_value: 0,
            tier: 10,
            in_pool: false,
        }
    }
}

/// Sort descending by score. Equal scores keep their input order.
pub fn sort_by_score(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Percentile tier 1..=10 for a 1-based rank within a pool.
pub fn tier_for_rank(rank: usize, pool_size: usize) -> u8 {
    if pool_size == 0 {
        return 10;
    }
    let tier = (rank as f64 / pool_size as f64 * 10.0).ceil();
    tier.clamp(1.0, 10.0) as u8
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Distribute `budget` dollars over the top `pool_size` candidates.
///
/// Algorithm:
/// 1. Sort descending by score; the first `min(pool_size, len)` are in-pool.
/// 2. Reserve $1 per in-pool player; `distributable = budget - reserved`.
/// 3. Positive scores get `1 + round(score / Σ positive × distributable)`;
///    non-positive scores get $1. Out-of-pool players get $0 and tier 10.
/// 4. Tier = `ceil(rank / pool × 10)`.
/// 5. Exact-sum correction on the top player.
///
/// Returns the effective pool size.
pub fn distribute_budget(candidates: &mut [ScoredCandidate], pool_size: usize, budget: u32) -> usize {
    sort_by_score(candidates);
    let pool = pool_size.min(candidates.len());

    let distributable = budget.saturating_sub(pool as u32) as f64;
    let positive_total: f64 = candidates[..pool]
        .iter()
        .filter(|c| c.score > 0.0)
        .map(|c| c.score)
        .sum();

    for (i, c) in candidates.iter_mut().enumerate() {
        if i < pool {
            c.in_pool = true;
            c.tier = tier_for_rank(i + 1, pool);
            c.auction_value = if c.score > 0.0 && positive_total > 0.0 {
                1 + (c.score / positive_total * distributable).round() as u32
            } else {
                1
            };
        } else {
            c.in_pool = false;
            c.tier = 10;
            c.auction_value = 0;
        }
    }

    enforce_exact_sum(candidates, budget);
    debug!(
        "distributed ${} over {} of {} candidates",
        budget,
        pool,
        candidates.len()
    );
    pool
}

/// Sum of auction values over in-pool candidates.
pub fn pool_total(candidates: &[ScoredCandidate]) -> i64 {
    candidates
        .iter()
        .filter(|c| c.in_pool)
        .map(|c| i64::from(c.auction_value))
        .sum()
}

/// Add the rounding drift to the highest-ranked in-pool player, clamped at $1.
///
/// Candidates must already be in rank order. Under heavy drift the clamp can
/// leave the sum off budget; that only happens when the budget barely
/// covers the $1 minimums.
pub fn enforce_exact_sum(candidates: &mut [ScoredCandidate], budget: u32) {
    let diff = i64::from(budget) - pool_total(candidates);
    if diff == 0 {
        return;
    }
    if let Some(top) = candidates.iter_mut().find(|c| c.in_pool) {
        let adjusted = (i64::from(top.auction_value) + diff).max(1);
        debug!("exact-sum correction of {} applied to top player", diff);
        top.auction_value = adjusted as u32;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
