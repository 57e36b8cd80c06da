// Dynasty blending: mixes single-season dollar value with a long-term ranking.

use crate::valuation::auction::{distribute_budget, ScoredCandidate};
use crate::valuation::projections::DynastyRanking;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Ranks beyond this are worth the $1 minimum.
pub const DYNASTY_RANK_HORIZON: u32 = 500;
/// Ceiling for the rank-derived dollar curve.
pub const DYNASTY_VALUE_CAP: f64 = 55.0;
const DECAY_EXPONENT: f64 = 1.2;

const NAME_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv", "v"];

// ---------------------------------------------------------------------------
// Public detail record
// ---------------------------------------------------------------------------

/// Dynasty-specific fields attached to each player in a dynasty calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DynastyDetail {
    pub overall_rank: Option<u32>,
    pub level: Option<String>,
    pub dynasty_dollar_value: Option<u32>,
    pub redraft_value: u32,
    pub blended_value: Option<f64>,
    pub has_no_dynasty_data: bool,
}

// ---------------------------------------------------------------------------
// Name matching
// ---------------------------------------------------------------------------

fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ñ' | 'Ñ' => 'n',
        'ç' | 'Ç' => 'c',
        other => other,
    }
}

/// Lowercase, strip accents and punctuation, collapse whitespace.
///
/// `"José Ramírez"` -> `"jose ramirez"`, `"J.T. Realmuto"` -> `"jt realmuto"`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars().map(fold_accent) {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop a trailing generational suffix from a normalized name.
pub fn strip_suffix(normalized: &str) -> String {
    let mut tokens: Vec<&str> = normalized.split_whitespace().collect();
    if tokens.len() > 1 && tokens.last().is_some_and(|t| NAME_SUFFIXES.contains(t)) {
        tokens.pop();
    }
    tokens.join(" ")
}

/// First three letters of the first name plus the last name
/// (`"mike trout"` and `"michael trout"` both give `"mic trout"`).
pub fn short_key(normalized: &str) -> Option<String> {
    let stripped = strip_suffix(normalized);
    let tokens: Vec<&str> = stripped.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    let first: String = tokens[0].chars().take(3).collect();
    tokens.last().map(|last| format!("{first} {last}"))
}

/// Lookup index over a ranking list with three fallback keys.
#[derive(Debug, Default)]
pub struct DynastyIndex<'a> {
    rankings: Vec<&'a DynastyRanking>,
    exact: HashMap<String, usize>,
    stripped: HashMap<String, usize>,
    short: HashMap<String, usize>,
}

/// Whether a ranking's level counts as major league. A blank level is
/// treated as MLB.
fn is_mlb(level: &str) -> bool {
    let level = level.trim();
    level.is_empty() || level.eq_ignore_ascii_case("MLB")
}

impl<'a> DynastyIndex<'a> {
    /// Build the index. When two rankings share a key the better rank wins.
    pub fn build(rankings: &'a [DynastyRanking], include_minors: bool) -> Self {
        let mut kept: Vec<&DynastyRanking> = rankings
            .iter()
            .filter(|r| include_minors || is_mlb(&r.level))
            .collect();
        kept.sort_by_key(|r| r.overall_rank);

        let mut index = DynastyIndex {
            rankings: kept,
            ..Default::default()
        };
        for (i, r) in index.rankings.iter().enumerate() {
            let normalized = normalize_name(&r.name);
            index.stripped.entry(strip_suffix(&normalized)).or_insert(i);
            if let Some(key) = short_key(&normalized) {
                index.short.entry(key).or_insert(i);
            }
            index.exact.entry(normalized).or_insert(i);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.rankings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rankings.is_empty()
    }

    /// Match a player name: exact, then suffix-stripped, then short key.
    pub fn lookup(&self, name: &str) -> Option<&'a DynastyRanking> {
        let normalized = normalize_name(name);
        let idx = self
            .exact
            .get(&normalized)
            .or_else(|| self.stripped.get(&strip_suffix(&normalized)))
            .or_else(|| short_key(&normalized).and_then(|k| self.short.get(&k)))?;
        self.rankings.get(*idx).copied()
    }
}

// ---------------------------------------------------------------------------
// Dollar curve and blend
// ---------------------------------------------------------------------------

/// `min(max_redraft × 1.1, 55)`
pub fn capped_max_value(max_redraft_value: f64) -> f64 {
    (max_redraft_value * 1.1).min(DYNASTY_VALUE_CAP)
}

/// Rank-derived dollar value with log decay:
/// `round(capped_max × (1 − ln(rank)/ln(500))^1.2)`, floored at $1.
/// Ranks past 500 are worth $1.
pub fn dynasty_dollar_value(rank: u32, capped_max: f64) -> u32 {
    if rank == 0 || rank > DYNASTY_RANK_HORIZON {
        return 1;
    }
    let decay = (1.0 - f64::from(rank).ln() / f64::from(DYNASTY_RANK_HORIZON).ln()).max(0.0);
    (capped_max * decay.powf(DECAY_EXPONENT)).round().max(1.0) as u32
}

/// `(1 − w) × redraft + w × dynasty`
pub fn blend(redraft_value: f64, dynasty_value: f64, weight: f64) -> f64 {
    (1.0 - weight) * redraft_value + weight * dynasty_value
}

/// Re-run the dollar converter over ranked players only.
///
/// `blended` maps projection index to blended value for every ranked player.
/// Unranked candidates are appended after the ranked ones with $0, out of
/// the pool, tier 10. Returns the new candidate list and the effective pool
/// size (`min(pool_size, ranked count)`).
pub fn revalue_ranked(
    candidates: Vec<ScoredCandidate>,
    blended: &HashMap<usize, f64>,
    pool_size: usize,
    budget: u32,
) -> (Vec<ScoredCandidate>, usize) {
    let (mut ranked, mut unranked): (Vec<ScoredCandidate>, Vec<ScoredCandidate>) = candidates
        .into_iter()
        .partition(|c| blended.contains_key(&c.index));

    for c in ranked.iter_mut() {
        c.score = blended.get(&c.index).copied().unwrap_or(0.0);
    }
    let pool = distribute_budget(&mut ranked, pool_size, budget);

    for c in unranked.iter_mut() {
        c.auction_value = 0;
        c.in_pool = false;
        c.tier = 10;
    }
    debug!(
        "dynasty pool: {} ranked ({} in pool), {} unranked excluded",
        ranked.len(),
        pool,
        unranked.len()
    );
    ranked.extend(unranked);
    (ranked, pool)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
