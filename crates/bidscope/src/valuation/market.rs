// Market inflation correction.
//
// Real auctions don't pay projected value: elite players historically sell
// below projection and the cheap end of the pool sells well above it. This
// stage moves dollars from the negative-factor tiers to everyone else
// according to the historical tier table, applies position factors, and then
// re-normalizes to the exact budget.

use crate::baseline::HistoricalBaseline;
use crate::config::InflationSettings;
use crate::valuation::auction::{enforce_exact_sum, pool_total, ScoredCandidate};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Tier and position factors in effect for one calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketFactors {
    pub tier_factors: [f64; 10],
    pub position_factors: BTreeMap<String, f64>,
    pub apply_position_factors: bool,
}

impl MarketFactors {
    /// Baseline tables with the league's per-call overrides applied.
    pub fn resolve(baseline: &HistoricalBaseline, settings: &InflationSettings) -> Self {
        let mut tier_factors = [0.0; 10];
        for (tier, slot) in tier_factors.iter_mut().enumerate() {
            *slot = baseline.tier_factor(tier as u8 + 1);
        }
        if let Some(custom) = &settings.tier_factors {
            if custom.len() == 10 {
                tier_factors.copy_from_slice(custom);
            } else {
                warn!(
                    "ignoring custom tier factors: expected 10 values, got {}",
                    custom.len()
                );
            }
        }

        let mut position_factors = baseline.position_factors.clone();
        if let Some(custom) = &settings.position_factors {
            for (pos, factor) in custom {
                position_factors.insert(pos.trim().to_uppercase(), *factor);
            }
        }

        MarketFactors {
            tier_factors,
            position_factors,
            apply_position_factors: settings.enable_position_scarcity,
        }
    }

    pub fn tier_factor(&self, tier: u8) -> f64 {
        self.tier_factors[usize::from(tier.clamp(1, 10)) - 1]
    }

    /// Largest factor among a candidate's eligible positions.
    pub fn position_factor(&self, candidate: &ScoredCandidate) -> f64 {
        candidate
            .positions
            .iter()
            .filter_map(|p| self.position_factors.get(p.canonical().display_str()))
            .copied()
            .fold(None, |best: Option<f64>, f| Some(best.map_or(f, |b| b.max(f))))
            .unwrap_or(0.0)
    }
}

/// Apply the three-phase market correction to a ranked, priced pool.
///
/// Algorithm:
/// 1. Release: `Σ base × |factor|` over players in negative-factor tiers.
/// 2. Elites are reduced by their factor. Every other player receives
///    `min(share of release, base × tier factor)`, where the share is
///    proportional to that same desired bonus. Position factors are then
///    applied multiplicatively and values rounded (floor $1).
/// 3. Re-normalize to `budget` with ±$1 nudges, mid-tier first.
///
/// Candidates must be in rank order with values from the dollar converter.
pub fn apply_market_correction(
    candidates: &mut [ScoredCandidate],
    factors: &MarketFactors,
    budget: u32,
) {
    // ---- Phase 1: released dollars ----
    let released: f64 = candidates
        .iter()
        .filter(|c| c.in_pool)
        .map(|c| {
            let f = factors.tier_factor(c.tier);
            if f < 0.0 {
                f64::from(c.auction_value) * f.abs()
            } else {
                0.0
            }
        })
        .sum();

    // ---- Phase 2: redistribute ----
    let desired_total: f64 = candidates
        .iter()
        .filter(|c| c.in_pool)
        .map(|c| {
            let f = factors.tier_factor(c.tier);
            if f >= 0.0 {
                f64::from(c.auction_value) * f
            } else {
                0.0
            }
        })
        .sum();

    for c in candidates.iter_mut().filter(|c| c.in_pool) {
        let base = f64::from(c.auction_value);
        let f = factors.tier_factor(c.tier);
        let mut adjusted = if f < 0.0 {
            base * (1.0 + f)
        } else {
            let desired = base * f;
            let share = if desired_total > 0.0 {
                released * desired / desired_total
            } else {
                0.0
            };
            base + share.min(desired)
        };
        if factors.apply_position_factors {
            adjusted *= 1.0 + factors.position_factor(c);
        }
        c.auction_value = adjusted.round().max(1.0) as u32;
    }

    debug!(
        "market correction released ${:.1} against ${:.1} desired",
        released, desired_total
    );

    // ---- Phase 3: exact budget ----
    normalize_mid_tier_first(candidates, budget);
}

/// Nudge values by $1 until the pool sums to `budget`.
///
/// Players are visited round-robin by closeness of their tier to 4, then by
/// rank. A player never drops below $1; when nobody can absorb a reduction
/// the remainder falls to the top player.
pub fn normalize_mid_tier_first(candidates: &mut [ScoredCandidate], budget: u32) {
    let mut diff = i64::from(budget) - pool_total(candidates);
    if diff == 0 {
        return;
    }

    let mut order: Vec<usize> = (0..candidates.len())
        .filter(|&i| candidates[i].in_pool)
        .collect();
    order.sort_by_key(|&i| ((i32::from(candidates[i].tier) - 4).abs(), i));

    while diff != 0 {
        let mut changed = false;
        for &i in &order {
            if diff == 0 {
                break;
            }
            let c = &mut candidates[i];
            if diff > 0 {
                c.auction_value += 1;
                diff -= 1;
                changed = true;
            } else if c.auction_value > 1 {
                c.auction_value -= 1;
                diff += 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    if diff != 0 {
        enforce_exact_sum(candidates, budget);
    }
}

/// Legacy normalization used when market correction is disabled: scale the
/// pool proportionally to the budget, then correct the top player.
pub fn normalize_proportional(candidates: &mut [ScoredCandidate], budget: u32) {
    let total = pool_total(candidates);
    if total <= 0 {
        return;
    }
    let scale = f64::from(budget) / total as f64;
    for c in candidates.iter_mut().filter(|c| c.in_pool) {
        c.auction_value = (f64::from(c.auction_value) * scale).round().max(1.0) as u32;
    }
    enforce_exact_sum(candidates, budget);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
