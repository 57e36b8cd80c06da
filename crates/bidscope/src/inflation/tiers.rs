// Inflation among drafted players, broken down by tier, price and position.

use crate::baseline::PriceRange;
use crate::inflation::types::{
    MatchedPlayer, PositionalInflation, PriceRangeInflation, TierInflationData,
};
use crate::position::Position;
use crate::valuation::auction::tier_for_rank;
use std::collections::BTreeMap;

/// A drafted player with both a winning bid and a positive projected value.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftedSample {
    pub projected: f64,
    pub actual: u32,
    pub positions: Vec<Position>,
    pub tier: u8,
}

impl DraftedSample {
    /// `(actual − projected) / projected × 100`
    pub fn inflation_pct(&self) -> f64 {
        (f64::from(self.actual) - self.projected) / self.projected * 100.0
    }
}

/// Weight of a player in inflation averages.
///
/// Cheap players are damped so a $1 player bought for $3 cannot dominate
/// the average: value <= 2 weighs `value × 0.25`, value <= 5 weighs
/// `value × 0.5`, everything else weighs its full value.
pub fn dampened_weight(projected: f64) -> f64 {
    if projected <= 2.0 {
        projected * 0.25
    } else if projected <= 5.0 {
        projected * 0.5
    } else {
        projected
    }
}

/// Drafted players usable for inflation, ranked by projected value with
/// percentile tiers assigned.
pub fn drafted_samples(players: &[MatchedPlayer]) -> Vec<DraftedSample> {
    let mut samples: Vec<DraftedSample> = players
        .iter()
        .filter(|p| p.is_drafted())
        .filter_map(|p| match (p.actual_bid, p.projected_value) {
            (Some(actual), Some(projected)) if projected > 0.0 => Some(DraftedSample {
                projected,
                actual,
                positions: p.eligible_positions(),
                tier: 10,
            }),
            _ => None,
        })
        .collect();

    samples.sort_by(|a, b| {
        b.projected
            .partial_cmp(&a.projected)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let total = samples.len();
    for (i, s) in samples.iter_mut().enumerate() {
        s.tier = tier_for_rank(i + 1, total);
    }
    samples
}

/// Dollar-weighted inflation: `(Σ actual − Σ projected) / Σ projected × 100`.
///
/// Each player counts in proportion to its projected value, with no
/// dampening (0 for no samples).
pub fn aggregate_inflation(samples: &[DraftedSample]) -> f64 {
    let projected: f64 = samples.iter().map(|s| s.projected).sum();
    let spent: u32 = samples.iter().map(|s| s.actual).sum();
    aggregate_rate(projected, spent)
}

/// Dampened-weight mean of per-player inflation (0 for no samples).
pub fn weighted_inflation<'a, I>(samples: I) -> f64
where
    I: IntoIterator<Item = &'a DraftedSample>,
{
    let (weighted, weights) = samples.into_iter().fold((0.0, 0.0), |(sum, w), s| {
        let weight = dampened_weight(s.projected);
        (sum + s.inflation_pct() * weight, w + weight)
    });
    if weights > 0.0 {
        weighted / weights
    } else {
        0.0
    }
}

fn aggregate_rate(total_projected: f64, total_spent: u32) -> f64 {
    if total_projected > 0.0 {
        (f64::from(total_spent) - total_projected) / total_projected * 100.0
    } else {
        0.0
    }
}

/// Per-tier inflation. Tiers without drafted players are omitted.
pub fn tier_inflation(samples: &[DraftedSample]) -> Vec<TierInflationData> {
    (1..=10u8)
        .filter_map(|tier| {
            let in_tier: Vec<&DraftedSample> = samples.iter().filter(|s| s.tier == tier).collect();
            if in_tier.is_empty() {
                return None;
            }
            let n = in_tier.len() as f64;
            Some(TierInflationData {
                tier,
                player_count: in_tier.len(),
                avg_projected_value: in_tier.iter().map(|s| s.projected).sum::<f64>() / n,
                avg_actual_bid: in_tier.iter().map(|s| f64::from(s.actual)).sum::<f64>() / n,
                inflation_rate: weighted_inflation(in_tier.iter().copied()),
            })
        })
        .collect()
}

/// Spending per winning-bid bracket. Empty brackets are omitted.
///
/// A $0 bid is counted as $1 so every sample lands in a bracket.
pub fn price_range_inflation(
    samples: &[DraftedSample],
    ranges: &[PriceRange],
) -> Vec<PriceRangeInflation> {
    let total_spent: u32 = samples.iter().map(|s| s.actual).sum();
    ranges
        .iter()
        .filter_map(|range| {
            let in_range: Vec<&DraftedSample> =
                samples.iter().filter(|s| range.contains(s.actual.max(1))).collect();
            if in_range.is_empty() {
                return None;
            }
            let spent: u32 = in_range.iter().map(|s| s.actual).sum();
            let projected: f64 = in_range.iter().map(|s| s.projected).sum();
            Some(PriceRangeInflation {
                label: range.label.clone(),
                min_price: range.min,
                max_price: range.max,
                player_count: in_range.len(),
                total_projected: projected,
                total_spent: spent,
                avg_bid: f64::from(spent) / in_range.len() as f64,
                percent_of_total_spend: if total_spent > 0 {
                    f64::from(spent) / f64::from(total_spent) * 100.0
                } else {
                    0.0
                },
                inflation_rate: aggregate_rate(projected, spent),
            })
        })
        .collect()
}

fn median_bid(sorted: &[u32]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0
    } else {
        f64::from(sorted[mid])
    }
}

/// Sample standard deviation (N−1); 0 for fewer than two bids.
fn bid_std_dev(bids: &[u32], mean: f64) -> f64 {
    if bids.len() < 2 {
        return 0.0;
    }
    let variance = bids
        .iter()
        .map(|&b| (f64::from(b) - mean).powi(2))
        .sum::<f64>()
        / (bids.len() - 1) as f64;
    variance.sqrt()
}

/// Spending per eligible position, in position order.
pub fn positional_inflation(samples: &[DraftedSample]) -> Vec<PositionalInflation> {
    let mut by_pos: BTreeMap<Position, (f64, Vec<u32>)> = BTreeMap::new();
    for s in samples {
        for &pos in &s.positions {
            let entry = by_pos.entry(pos).or_insert((0.0, Vec::new()));
            entry.0 += s.projected;
            entry.1.push(s.actual);
        }
    }
    by_pos
        .into_iter()
        .map(|(position, (projected, mut bids))| {
            bids.sort_unstable();
            let spent: u32 = bids.iter().sum();
            let avg_bid = f64::from(spent) / bids.len() as f64;
            PositionalInflation {
                position,
                drafted_count: bids.len(),
                total_projected: projected,
                total_spent: spent,
                avg_bid,
                median_bid: median_bid(&bids),
                max_bid: bids.last().copied().unwrap_or(0),
                min_bid: bids.first().copied().unwrap_or(0),
                std_dev: bid_std_dev(&bids, avg_bid),
                inflation_rate: aggregate_rate(projected, spent),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::HistoricalBaseline;
    use crate::inflation::types::AuctionStatus;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn drafted(name: &str, pos: &[&str], bid: u32, projected: f64) -> MatchedPlayer {
        MatchedPlayer {
            name: name.into(),
            positions: pos.iter().map(|s| s.to_string()).collect(),
            status: AuctionStatus::Drafted,
            winning_team: Some("Team A".into()),
            actual_bid: Some(bid),
            projected_value: Some(projected),
        }
    }

    #[test]
    fn dampened_weight_brackets() {
        assert!(approx_eq(dampened_weight(1.0), 0.25, 1e-12));
        assert!(approx_eq(dampened_weight(2.0), 0.5, 1e-12));
        assert!(approx_eq(dampened_weight(4.0), 2.0, 1e-12));
        assert!(approx_eq(dampened_weight(5.0), 2.5, 1e-12));
        assert!(approx_eq(dampened_weight(30.0), 30.0, 1e-12));
    }

    #[test]
    fn samples_skip_unusable_players() {
        let mut undrafted = drafted("Avail", &["C"], 5, 5.0);
        undrafted.status = AuctionStatus::Available;
        let mut unmatched = drafted("Unmatched", &["C"], 5, 5.0);
        unmatched.projected_value = None;
        let zero = drafted("Zero", &["C"], 1, 0.0);
        let ok = drafted("Ok", &["C"], 12, 10.0);
        let samples = drafted_samples(&[undrafted, unmatched, zero, ok]);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].tier, 10);
        assert!(approx_eq(samples[0].inflation_pct(), 20.0, 1e-9));
    }

    #[test]
    fn tiers_follow_projected_rank() {
        let players: Vec<MatchedPlayer> = (0..20)
            .map(|i| drafted(&format!("P{i}"), &["OF"], 10, f64::from(i + 1)))
            .collect();
        let samples = drafted_samples(&players);
        assert!(approx_eq(samples[0].projected, 20.0, 1e-12));
        assert_eq!(samples[0].tier, 1);
        assert_eq!(samples[1].tier, 1);
        assert_eq!(samples[2].tier, 2);
        assert_eq!(samples[19].tier, 10);

        let tiers = tier_inflation(&samples);
        assert_eq!(tiers.len(), 10);
        assert!(tiers.iter().all(|t| t.player_count == 2));
        // Top tier (20, 19 projected, both bought for 10) deflated.
        assert!(tiers[0].inflation_rate < 0.0);
        // Bottom tier (2, 1 projected, bought for 10) heavily inflated.
        assert!(tiers[9].inflation_rate > 300.0);
    }

    #[test]
    fn dampening_limits_cheap_outliers() {
        // $1 -> $3 is +200%; $30 -> $27 is -10%.
        let samples = drafted_samples(&[
            drafted("Cheap", &["C"], 3, 1.0),
            drafted("Star", &["SS"], 27, 30.0),
        ]);
        // (200 × 0.25 + (−10) × 30) / 30.25
        let weighted = weighted_inflation(&samples);
        assert!(approx_eq(weighted, -250.0 / 30.25, 1e-9));
        assert!(weighted < 0.0);
        // 30 spent against 31 projected
        assert!(approx_eq(aggregate_inflation(&samples), -100.0 / 31.0, 1e-9));
    }

    #[test]
    fn price_ranges_use_winning_bid() {
        let baseline = HistoricalBaseline::default();
        let samples = drafted_samples(&[
            drafted("A", &["C"], 4, 3.0),
            drafted("B", &["C"], 2, 4.6),
            drafted("C", &["1B"], 44, 40.0),
            drafted("D", &["OF"], 8, 12.0),
        ]);
        let ranges = price_range_inflation(&samples, &baseline.price_ranges);
        let labels: Vec<&str> = ranges.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Filler", "Value", "Elite"]);
        let filler = &ranges[0];
        assert_eq!(filler.player_count, 2);
        assert_eq!(filler.total_spent, 6);
        assert!(approx_eq(filler.avg_bid, 3.0, 1e-12));
        assert!(approx_eq(filler.percent_of_total_spend, 6.0 / 58.0 * 100.0, 1e-9));
        // Projected at $12 but bought for $8: counted as a value buy.
        assert_eq!(ranges[1].player_count, 1);
        assert!(approx_eq(ranges[1].inflation_rate, -100.0 / 3.0, 1e-9));
        let elite = &ranges[2];
        assert_eq!(elite.max_price, None);
        assert!(approx_eq(elite.inflation_rate, 10.0, 1e-9));
    }

    #[test]
    fn every_sample_lands_in_a_price_range() {
        let baseline = HistoricalBaseline::default();
        let samples = drafted_samples(&[
            drafted("Tiny", &["RP"], 2, 0.4),
            drafted("Mid", &["SP"], 8, 7.0),
        ]);
        let ranges = price_range_inflation(&samples, &baseline.price_ranges);
        let counted: usize = ranges.iter().map(|r| r.player_count).sum();
        assert_eq!(counted, samples.len());
        let share: f64 = ranges.iter().map(|r| r.percent_of_total_spend).sum();
        assert!(approx_eq(share, 100.0, 1e-9));
    }

    #[test]
    fn multi_position_players_count_everywhere() {
        let samples = drafted_samples(&[
            drafted("Util", &["2B", "SS"], 20, 16.0),
            drafted("Short", &["SS"], 10, 10.0),
        ]);
        let by_pos = positional_inflation(&samples);
        assert_eq!(by_pos.len(), 2);
        let second = &by_pos[0];
        assert_eq!(second.position, Position::SecondBase);
        assert_eq!(second.drafted_count, 1);
        assert_eq!(second.std_dev, 0.0);
        assert_eq!(second.min_bid, 20);
        assert_eq!(second.max_bid, 20);
        let ss = &by_pos[1];
        assert_eq!(ss.position, Position::ShortStop);
        assert_eq!(ss.drafted_count, 2);
        assert_eq!(ss.total_spent, 30);
        assert!(approx_eq(ss.avg_bid, 15.0, 1e-12));
        assert!(approx_eq(ss.inflation_rate, 4.0 / 26.0 * 100.0, 1e-9));
    }

    #[test]
    fn positional_bid_spread() {
        let samples = drafted_samples(&[
            drafted("A", &["OF"], 30, 25.0),
            drafted("B", &["OF"], 10, 12.0),
            drafted("C", &["OF", "1B"], 2, 3.0),
            drafted("D", &["OF"], 6, 5.0),
        ]);
        let by_pos = positional_inflation(&samples);
        let of = by_pos
            .iter()
            .find(|p| p.position == Position::Outfield)
            .unwrap();
        assert_eq!(of.drafted_count, 4);
        assert_eq!(of.min_bid, 2);
        assert_eq!(of.max_bid, 30);
        // bids 2 6 10 30
        assert!(approx_eq(of.median_bid, 8.0, 1e-12));
        let mean = 12.0;
        let var = ((2.0f64 - mean).powi(2)
            + (6.0f64 - mean).powi(2)
            + (10.0f64 - mean).powi(2)
            + (30.0f64 - mean).powi(2))
            / 3.0;
        assert!(approx_eq(of.std_dev, var.sqrt(), 1e-9));

        let first = by_pos
            .iter()
            .find(|p| p.position == Position::FirstBase)
            .unwrap();
        assert_eq!(first.drafted_count, 1);
        assert!(approx_eq(first.median_bid, 2.0, 1e-12));
    }

    #[test]
    fn empty_input() {
        let samples = drafted_samples(&[]);
        assert!(samples.is_empty());
        assert_eq!(aggregate_inflation(&samples), 0.0);
        assert_eq!(weighted_inflation(&samples), 0.0);
        assert!(tier_inflation(&samples).is_empty());
        assert!(positional_inflation(&samples).is_empty());
    }
}
