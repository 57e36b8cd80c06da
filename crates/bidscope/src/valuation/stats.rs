// Category code -> stat value extraction.
//
// Projection systems publish a core set of counting and rate stats. Leagues
// routinely score categories nobody projects (quality starts, blown saves,
// GIDP, ...), so those are estimated from the published numbers with fixed
// heuristics. Lookups go through two static dispatch tables keyed by the
// upper-cased category code; unknown codes yield 0.

use crate::valuation::projections::{HittingStats, PitchingStats, PlayerType, Projection};
use std::collections::HashMap;
use std::sync::OnceLock;

pub type HittingExtractor = fn(&HittingStats) -> f64;
pub type PitchingExtractor = fn(&PitchingStats) -> f64;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `num / den`, or 0 when the denominator is not positive.
fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// A projected value wins over an estimate whenever one was published.
fn recorded_or(value: f64, estimate: impl FnOnce() -> f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        estimate()
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

// ---------------------------------------------------------------------------
// Hitting: derived stats
// ---------------------------------------------------------------------------

pub fn singles(s: &HittingStats) -> f64 {
    recorded_or(s.singles, || (s.h - s.doubles - s.triples - s.hr).max(0.0))
}

pub fn total_bases(s: &HittingStats) -> f64 {
    singles(s) + 2.0 * s.doubles + 3.0 * s.triples + 4.0 * s.hr
}

pub fn extra_base_hits(s: &HittingStats) -> f64 {
    s.doubles + s.triples + s.hr
}

pub fn isolated_power(s: &HittingStats) -> f64 {
    let slg = recorded_or(s.slg, || ratio(total_bases(s), s.ab));
    slg - s.avg
}

fn on_base_pct(s: &HittingStats) -> f64 {
    recorded_or(s.obp, || {
        ratio(
            s.h + s.bb + hit_by_pitch(s),
            s.ab + s.bb + hit_by_pitch(s) + sacrifice_flies(s),
        )
    })
}

fn slugging(s: &HittingStats) -> f64 {
    recorded_or(s.slg, || ratio(total_bases(s), s.ab))
}

// ---------------------------------------------------------------------------
// Hitting: estimated stats
// ---------------------------------------------------------------------------

pub fn hit_by_pitch(s: &HittingStats) -> f64 {
    recorded_or(s.hbp, || s.pa * 0.011)
}

pub fn sacrifice_flies(s: &HittingStats) -> f64 {
    recorded_or(s.sf, || s.pa * 0.0075)
}

pub fn sacrifice_hits(s: &HittingStats) -> f64 {
    s.pa * 0.003
}

pub fn intentional_walks(s: &HittingStats) -> f64 {
    let hr_rate = ratio(s.hr, s.pa);
    s.bb * if hr_rate > 0.05 { 0.10 } else { 0.05 }
}

pub fn caught_stealing(s: &HittingStats) -> f64 {
    recorded_or(s.cs, || s.sb * 0.25)
}

/// Grounded into double plays.
///
/// Base rate 1.8% of PA, scaled by three adjustments:
/// - strikeout rate: K/PA > 25% -> 0.8 (fewer balls in play), < 15% -> 1.2
/// - speed: SB/PA > 3% -> 0.7, > 1.5% -> 0.85
/// - ground-ball proxy: ISO < .140 -> 1.15, ISO > .220 -> 0.85
pub fn grounded_into_double_plays(s: &HittingStats) -> f64 {
    recorded_or(s.gidp, || {
        let k_rate = ratio(s.k, s.pa);
        let k_adj = if k_rate > 0.25 {
            0.8
        } else if k_rate < 0.15 {
            1.2
        } else {
            1.0
        };

        let sb_rate = ratio(s.sb, s.pa);
        let speed_adj = if sb_rate > 0.03 {
            0.7
        } else if sb_rate > 0.015 {
            0.85
        } else {
            1.0
        };

        let iso = isolated_power(s);
        let gb_adj = if iso < 0.140 {
            1.15
        } else if iso > 0.220 {
            0.85
        } else {
            1.0
        };

        s.pa * 0.018 * k_adj * speed_adj * gb_adj
    })
}

/// Batting average on balls in play: `(H - HR) / (AB - K - HR + SF)`.
pub fn babip(s: &HittingStats) -> f64 {
    ratio(s.h - s.hr, s.ab - s.k - s.hr + sacrifice_flies(s))
}

// ---------------------------------------------------------------------------
// Pitching: derived stats
// ---------------------------------------------------------------------------

pub fn hits_allowed(s: &PitchingStats) -> f64 {
    recorded_or(s.h, || (s.whip * s.ip - s.bb).max(0.0))
}

pub fn earned_runs(s: &PitchingStats) -> f64 {
    recorded_or(s.er, || s.era * s.ip / 9.0)
}

pub fn k_per_nine(s: &PitchingStats) -> f64 {
    ratio(s.k * 9.0, s.ip)
}

pub fn bb_per_nine(s: &PitchingStats) -> f64 {
    ratio(s.bb * 9.0, s.ip)
}

pub fn k_per_bb(s: &PitchingStats) -> f64 {
    ratio(s.k, s.bb)
}

// ---------------------------------------------------------------------------
// Pitching: estimated stats
// ---------------------------------------------------------------------------

pub fn losses(s: &PitchingStats) -> f64 {
    recorded_or(s.l, || {
        if s.is_starter() {
            s.gs * 0.35
        } else {
            s.g * 0.04
        }
    })
}

/// Quality starts.
///
/// The per-start QS rate is bucketed by innings per start, then shifted by
/// ERA and clamped to [0, 0.85]:
///
/// | IP/GS  | base | | ERA        | adj   |
/// |--------|------| |------------|-------|
/// | >= 6.2 | 0.70 | | <= 3.00    | +0.10 |
/// | >= 6.0 | 0.60 | | <= 3.75    | +0.05 |
/// | >= 5.5 | 0.50 | | <= 4.50    | 0     |
/// | >= 5.0 | 0.38 | | otherwise  | -0.10 |
/// | else   | 0.25 | |            |       |
pub fn quality_starts(s: &PitchingStats) -> f64 {
    recorded_or(s.qs, || {
        if s.gs <= 0.0 {
            return 0.0;
        }
        let ip_per_start = s.ip / s.gs;
        let base: f64 = if ip_per_start >= 6.2 {
            0.70
        } else if ip_per_start >= 6.0 {
            0.60
        } else if ip_per_start >= 5.5 {
            0.50
        } else if ip_per_start >= 5.0 {
            0.38
        } else {
            0.25
        };
        let era_adj: f64 = if s.era <= 3.00 {
            0.10
        } else if s.era <= 3.75 {
            0.05
        } else if s.era <= 4.50 {
            0.0
        } else {
            -0.10
        };
        s.gs * (base + era_adj).clamp(0.0, 0.85)
    })
}

pub fn blown_saves(s: &PitchingStats) -> f64 {
    if s.is_starter() {
        0.0
    } else if s.sv > 0.0 {
        s.sv * 0.15 + s.hld * 0.08
    } else {
        s.hld * 0.10
    }
}

pub fn save_opportunities(s: &PitchingStats) -> f64 {
    s.sv + blown_saves(s)
}

pub fn net_saves(s: &PitchingStats) -> f64 {
    s.sv - blown_saves(s)
}

pub fn net_saves_and_holds(s: &PitchingStats) -> f64 {
    s.sv + s.hld - blown_saves(s)
}

pub fn games_finished(s: &PitchingStats) -> f64 {
    if s.is_starter() {
        0.0
    } else if s.sv >= 10.0 {
        s.sv + (s.g - s.sv).max(0.0) * 0.35
    } else {
        s.g * 0.20
    }
}

pub fn complete_games(s: &PitchingStats) -> f64 {
    if !s.is_starter() {
        return 0.0;
    }
    let ip_per_start = ratio(s.ip, s.gs);
    let rate = if ip_per_start >= 6.5 {
        0.05
    } else if ip_per_start >= 6.0 {
        0.025
    } else {
        0.01
    };
    s.gs * rate
}

pub fn shutouts(s: &PitchingStats) -> f64 {
    complete_games(s) * if s.era < 3.00 { 0.35 } else { 0.20 }
}

pub fn batters_faced(s: &PitchingStats) -> f64 {
    3.0 * s.ip + hits_allowed(s) + s.bb
}

pub fn hit_batsmen(s: &PitchingStats) -> f64 {
    batters_faced(s) * 0.009
}

pub fn wild_pitches(s: &PitchingStats) -> f64 {
    s.ip * 0.035 * (bb_per_nine(s) / 3.2)
}

pub fn balks(s: &PitchingStats) -> f64 {
    s.ip * 0.003
}

pub fn stolen_bases_allowed(s: &PitchingStats) -> f64 {
    s.ip * 0.075 * (s.whip / 1.25)
}

pub fn inherited_runners(s: &PitchingStats) -> f64 {
    if s.is_starter() {
        0.0
    } else {
        (s.g - s.gs).max(0.0) * 0.45
    }
}

pub fn inherited_runners_scored(s: &PitchingStats) -> f64 {
    inherited_runners(s) * 0.30
}

pub fn opponent_avg(s: &PitchingStats) -> f64 {
    let h = hits_allowed(s);
    ratio(h, 3.0 * s.ip + h)
}

// ---------------------------------------------------------------------------
// Dispatch tables
// ---------------------------------------------------------------------------

fn hitting_table() -> &'static HashMap<&'static str, HittingExtractor> {
    static TABLE: OnceLock<HashMap<&'static str, HittingExtractor>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let entries: &[(&'static str, HittingExtractor)] = &[
            ("G", |s| s.g),
            ("PA", |s| s.pa),
            ("AB", |s| s.ab),
            ("H", |s| s.h),
            ("1B", singles),
            ("2B", |s| s.doubles),
            ("3B", |s| s.triples),
            ("HR", |s| s.hr),
            ("R", |s| s.r),
            ("RBI", |s| s.rbi),
            ("R+RBI", |s| s.r + s.rbi),
            ("BB", |s| s.bb),
            ("K", |s| s.k),
            ("SO", |s| s.k),
            ("SB", |s| s.sb),
            ("CS", caught_stealing),
            ("NSB", |s| s.sb - caught_stealing(s)),
            ("SB-CS", |s| s.sb - caught_stealing(s)),
            ("AVG", |s| s.avg),
            ("BA", |s| s.avg),
            ("OBP", on_base_pct),
            ("SLG", slugging),
            ("OPS", |s| recorded_or(s.ops, || on_base_pct(s) + slugging(s))),
            ("ISO", isolated_power),
            ("TB", total_bases),
            ("XBH", extra_base_hits),
            ("BB%", |s| ratio(s.bb, s.pa)),
            ("K%", |s| ratio(s.k, s.pa)),
            ("HBP", hit_by_pitch),
            ("SF", sacrifice_flies),
            ("SH", sacrifice_hits),
            ("IBB", intentional_walks),
            ("GIDP", grounded_into_double_plays),
            ("GDP", grounded_into_double_plays),
            ("BABIP", babip),
            ("CYC", |_| 0.0),
            ("WAR", |s| s.war),
        ];
        entries.iter().copied().collect()
    })
}

fn pitching_table() -> &'static HashMap<&'static str, PitchingExtractor> {
    static TABLE: OnceLock<HashMap<&'static str, PitchingExtractor>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let entries: &[(&'static str, PitchingExtractor)] = &[
            ("G", |s| s.g),
            ("APP", |s| s.g),
            ("GS", |s| s.gs),
            ("IP", |s| s.ip),
            ("W", |s| s.w),
            ("L", losses),
            ("NW", |s| s.w - losses(s)),
            ("W-L", |s| s.w - losses(s)),
            ("SV", |s| s.sv),
            ("HLD", |s| s.hld),
            ("HD", |s| s.hld),
            ("SVHD", |s| s.sv + s.hld),
            ("SV+HLD", |s| s.sv + s.hld),
            ("SV+H", |s| s.sv + s.hld),
            ("K", |s| s.k),
            ("SO", |s| s.k),
            ("H", hits_allowed),
            ("BB", |s| s.bb),
            ("HR", |s| s.hr),
            ("ER", earned_runs),
            ("ERA", |s| s.era),
            ("WHIP", |s| s.whip),
            ("FIP", |s| s.fip),
            ("K/9", k_per_nine),
            ("K9", k_per_nine),
            ("BB/9", bb_per_nine),
            ("BB9", bb_per_nine),
            ("K/BB", k_per_bb),
            ("QS", quality_starts),
            ("BS", blown_saves),
            ("SVO", save_opportunities),
            ("SVOPP", save_opportunities),
            ("NSV", net_saves),
            ("NSVH", net_saves_and_holds),
            ("GF", games_finished),
            ("CG", complete_games),
            ("SHO", shutouts),
            ("TBF", batters_faced),
            ("BF", batters_faced),
            ("HBP", hit_batsmen),
            ("WP", wild_pitches),
            ("BK", balks),
            ("SBA", stolen_bases_allowed),
            ("IR", inherited_runners),
            ("IRS", inherited_runners_scored),
            ("OBA", opponent_avg),
            ("WAR", |s| s.war),
        ];
        entries.iter().copied().collect()
    })
}

/// Look up the extractor for a hitting category code.
pub fn hitting_extractor(code: &str) -> Option<HittingExtractor> {
    hitting_table().get(normalize_code(code).as_str()).copied()
}

/// Look up the extractor for a pitching category code.
pub fn pitching_extractor(code: &str) -> Option<PitchingExtractor> {
    pitching_table().get(normalize_code(code).as_str()).copied()
}

/// Value of a hitting category for one stat block. Unknown codes yield 0.
pub fn hitting_stat(stats: &HittingStats, code: &str) -> f64 {
    hitting_extractor(code).map_or(0.0, |f| f(stats))
}

/// Value of a pitching category for one stat block. Unknown codes yield 0.
pub fn pitching_stat(stats: &PitchingStats, code: &str) -> f64 {
    pitching_extractor(code).map_or(0.0, |f| f(stats))
}

/// Value of a category for a projection, reading the block that matches its
/// player type. A missing block yields `None`.
pub fn projection_stat(projection: &Projection, code: &str) -> Option<f64> {
    match projection.player_type {
        PlayerType::Hitter => projection.hitting.as_ref().map(|s| hitting_stat(s, code)),
        PlayerType::Pitcher => projection.pitching.as_ref().map(|s| pitching_stat(s, code)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
