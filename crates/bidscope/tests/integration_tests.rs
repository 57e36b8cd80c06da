// Integration tests for bidscope.
//
// These tests exercise the library end-to-end through its public API: CSV
// and JSON fixtures are loaded from disk, run through the valuation and
// inflation pipelines, and checked against the budget invariants a draft
// room depends on.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bidscope::baseline::HistoricalBaseline;
use bidscope::config::*;
use bidscope::inflation::types::{
    load_matched_players, load_scraped_teams, LeagueConfig, ScarcityLevel,
};
use bidscope::inflation::{calculate_inflation_stats, calculate_inflation_stats_with};
use bidscope::position::Position;
use bidscope::valuation::projections::{
    load_all_projections, load_dynasty_rankings, PlayerType, Projection,
};
use bidscope::valuation::{
    calculate_auction_values, calculate_auction_values_at, league_summary,
    CalculatedValuesResult, PlayerWithValue,
};

use chrono::{DateTime, TimeZone, Utc};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fixture directory path (relative to the package root, which is the cwd
/// for `cargo test`).
const FIXTURES: &str = "tests/fixtures";

fn fixture(name: &str) -> PathBuf {
    Path::new(FIXTURES).join(name)
}

fn roster(entries: &[(&str, usize)]) -> BTreeMap<String, usize> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// 2-team league: 10 hitter slots and 6 pitcher slots league-wide.
fn small_league() -> LeagueSettings {
    LeagueSettings {
        num_teams: 2,
        budget_per_team: 260,
        roster_spots: roster(&[
            ("C", 1),
            ("SS", 1),
            ("OF", 2),
            ("UTIL", 1),
            ("SP", 2),
            ("RP", 1),
            ("BN", 1),
        ]),
        scoring_type: ScoringType::Rotisserie,
        hitting_categories: BTreeMap::new(),
        pitching_categories: BTreeMap::new(),
        points_settings: None,
        hitter_pitcher_split: HitterPitcherSplit::default(),
        league_type: LeagueType::Redraft,
        dynasty_settings: None,
        inflation_settings: None,
        projection_system: ProjectionSystem::Steamer,
    }
}

/// The standard 12-team, $260 league.
fn standard_league() -> LeagueSettings {
    LeagueSettings {
        num_teams: 12,
        roster_spots: roster(&[
            ("C", 1),
            ("1B", 1),
            ("2B", 1),
            ("3B", 1),
            ("SS", 1),
            ("OF", 3),
            ("UTIL", 1),
            ("SP", 5),
            ("RP", 2),
            ("Bench", 2),
        ]),
        ..small_league()
    }
}

fn load_fixture_projections() -> Vec<Projection> {
    load_all_projections(&fixture("hitters.csv"), &fixture("pitchers.csv"))
        .expect("fixture projections should load")
}

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
}

fn value(settings: &LeagueSettings, projections: &[Projection]) -> CalculatedValuesResult {
    calculate_auction_values_at(
        projections,
        settings,
        None,
        &HistoricalBaseline::default(),
        fixed_time(),
    )
    .expect("valuation should succeed")
}

fn find<'a>(result: &'a CalculatedValuesResult, name: &str) -> &'a PlayerWithValue {
    result
        .players
        .iter()
        .find(|p| p.projection.name == name)
        .unwrap_or_else(|| panic!("{name} missing from result"))
}

fn pool_sum(result: &CalculatedValuesResult, player_type: PlayerType) -> u32 {
    result
        .players
        .iter()
        .filter(|p| p.projection.player_type == player_type && p.is_in_draft_pool)
        .map(|p| p.auction_value)
        .sum()
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bidscope_it_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// ===========================================================================
// Loading
// ===========================================================================

#[test]
fn fixture_projections_load() {
    let projections = load_fixture_projections();
    let hitters = projections
        .iter()
        .filter(|p| p.player_type == PlayerType::Hitter)
        .count();
    // The malformed hitter row is skipped.
    assert_eq!(hitters, 12);
    assert_eq!(projections.len(), 20);

    let mop_up = projections
        .iter()
        .find(|p| p.name == "Mop-Up Reliever")
        .unwrap();
    assert_eq!(mop_up.positions, vec![Position::ReliefPitcher]);

    let bench = projections
        .iter()
        .find(|p| p.name == "Bench Infielder")
        .unwrap();
    assert_eq!(bench.positions, vec![Position::SecondBase, Position::ShortStop]);
}

#[test]
fn fixture_dynasty_rankings_load() {
    let rankings = load_dynasty_rankings(&fixture("dynasty.csv")).unwrap();
    // Rank 0 row is skipped.
    assert_eq!(rankings.len(), 11);
    assert_eq!(rankings[0].name, "Bobby Witt");
    assert_eq!(rankings[0].overall_rank, 1);
}

#[test]
fn default_config_drives_standard_summary() {
    let dir = temp_dir("defaults");
    let defaults = dir.join("defaults");
    std::fs::create_dir_all(&defaults).unwrap();
    for file in ["league.toml", "baseline.toml"] {
        std::fs::copy(Path::new("defaults").join(file), defaults.join(file)).unwrap();
    }

    ensure_config_files(&dir).unwrap();
    let config = load_config_from(&dir).unwrap();
    let summary = league_summary(&config.league);
    assert_eq!(summary.total_budget, 3120);
    assert_eq!(summary.hitter_budget, 2122);
    assert_eq!(summary.pitcher_budget, 998);
    assert_eq!(summary.draftable_pool_size, 216);
    assert_eq!(summary.hitter_pool_size, 108);
    assert_eq!(summary.pitcher_pool_size, 84);

    let _ = std::fs::remove_dir_all(&dir);
}

// ===========================================================================
// Redraft valuation
// ===========================================================================

#[test]
fn standard_league_summary_and_empty_pool() {
    let result = calculate_auction_values(&[], &standard_league(), None).unwrap();
    assert!(result.players.is_empty());
    assert_eq!(result.league_summary.total_budget, 3120);
    assert_eq!(result.league_summary.hitter_budget, 2122);
    assert_eq!(result.league_summary.pitcher_budget, 998);
    assert_eq!(result.league_summary.hitter_pool_size, 108);
    assert_eq!(result.league_summary.pitcher_pool_size, 84);
    assert_eq!(result.league_summary.draftable_pool_size, 216);
}

#[test]
fn redraft_values_respect_budget_invariants() {
    let projections = load_fixture_projections();
    let result = value(&small_league(), &projections);

    assert_eq!(result.players.len(), 20);
    assert_eq!(result.league_summary.hitter_budget, 354);
    assert_eq!(result.league_summary.pitcher_budget, 166);
    assert_eq!(pool_sum(&result, PlayerType::Hitter), 354);
    assert_eq!(pool_sum(&result, PlayerType::Pitcher), 166);

    let in_pool = |t: PlayerType| {
        result
            .players
            .iter()
            .filter(|p| p.projection.player_type == t && p.is_in_draft_pool)
            .count()
    };
    assert_eq!(in_pool(PlayerType::Hitter), 10);
    assert_eq!(in_pool(PlayerType::Pitcher), 6);

    for p in &result.players {
        if p.is_in_draft_pool {
            assert!(p.auction_value >= 1, "{} below $1", p.projection.name);
            assert!((1..=10).contains(&p.tier));
        } else {
            assert_eq!(p.auction_value, 0, "{} out of pool but valued", p.projection.name);
            assert_eq!(p.tier, 10);
        }
    }

    for pair in result.players.windows(2) {
        assert!(pair[0].auction_value >= pair[1].auction_value);
    }
}

#[test]
fn replacement_level_falls_out_of_pool() {
    let result = value(&small_league(), &load_fixture_projections());
    let repl = find(&result, "Replacement Outfielder");
    assert!(!repl.is_in_draft_pool);
    assert_eq!(repl.auction_value, 0);

    let judge = find(&result, "Aaron Judge");
    assert!(judge.is_in_draft_pool);
    assert!(judge.sgp_value.unwrap() > repl.sgp_value.unwrap());
    assert!(judge.auction_value > find(&result, "Average Outfielder").auction_value);
}

#[test]
fn identical_inputs_produce_identical_json() {
    let projections = load_fixture_projections();
    let a = value(&small_league(), &projections);
    let b = value(&small_league(), &projections);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
    assert_eq!(a.calculated_at, fixed_time());
}

#[test]
fn points_league_keeps_invariants() {
    let mut settings = small_league();
    settings.scoring_type = ScoringType::H2hPoints;
    let result = value(&settings, &load_fixture_projections());
    assert_eq!(pool_sum(&result, PlayerType::Hitter), 354);
    assert_eq!(pool_sum(&result, PlayerType::Pitcher), 166);
    assert!(result.players.iter().all(|p| p.sgp_value.is_none()));
    let judge = find(&result, "Aaron Judge");
    assert!(judge.points_value.unwrap() > find(&result, "Backup Catcher").points_value.unwrap());
}

#[test]
fn custom_categories_change_scores() {
    let mut settings = small_league();
    settings.hitting_categories = [("OBP", true), ("HR", true), ("K", true), ("AVG", false)]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();
    let result = value(&settings, &load_fixture_projections());
    let judge = find(&result, "Aaron Judge");
    let cats = judge.category_values.as_ref().unwrap();
    let keys: Vec<&str> = cats.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["HR", "K", "OBP"]);
    // Judge strikes out the most: lower-is-better K counts against him.
    assert!(cats["K"] < 0.0);
    assert_eq!(pool_sum(&result, PlayerType::Hitter), 354);
}

#[test]
fn market_correction_disabled_still_sums() {
    let mut settings = small_league();
    settings.inflation_settings = Some(InflationSettings {
        enable_market_correction: false,
        ..Default::default()
    });
    let result = value(&settings, &load_fixture_projections());
    assert_eq!(pool_sum(&result, PlayerType::Hitter), 354);
    assert_eq!(pool_sum(&result, PlayerType::Pitcher), 166);
}

// ===========================================================================
// Dynasty valuation
// ===========================================================================

fn dynasty_league(weight: f64) -> LeagueSettings {
    LeagueSettings {
        league_type: LeagueType::Dynasty,
        dynasty_settings: Some(DynastySettings {
            dynasty_weight: weight,
            include_minors: false,
        }),
        ..small_league()
    }
}

#[test]
fn dynasty_excludes_unranked_players() {
    let projections = load_fixture_projections();
    let rankings = load_dynasty_rankings(&fixture("dynasty.csv")).unwrap();
    let result = calculate_auction_values_at(
        &projections,
        &dynasty_league(0.6),
        Some(&rankings),
        &HistoricalBaseline::default(),
        fixed_time(),
    )
    .unwrap();

    assert_eq!(result.league_summary.dynasty_weight, Some(0.6));
    assert_eq!(pool_sum(&result, PlayerType::Hitter), 354);
    assert_eq!(pool_sum(&result, PlayerType::Pitcher), 166);

    for p in &result.players {
        let detail = p.dynasty.as_ref().expect("every player carries dynasty detail");
        if detail.has_no_dynasty_data {
            assert!(!p.is_in_draft_pool, "{} unranked but in pool", p.projection.name);
            assert_eq!(p.auction_value, 0);
        }
    }

    // 7 ranked hitters and 3 ranked pitchers, all inside their pools.
    let ranked_in_pool = result.players.iter().filter(|p| p.is_in_draft_pool).count();
    assert_eq!(ranked_in_pool, 10);

    // Name matching: suffix, accents and generational suffix.
    let witt = find(&result, "Bobby Witt Jr.");
    assert_eq!(witt.dynasty.as_ref().unwrap().overall_rank, Some(1));
    assert!(find(&result, "José Ramírez").is_in_draft_pool);
    assert_eq!(
        find(&result, "Michael Harris II")
            .dynasty
            .as_ref()
            .unwrap()
            .overall_rank,
        Some(30)
    );
    assert!(!find(&result, "Marcus Semien").is_in_draft_pool);
}

#[test]
fn dynasty_dollar_values_follow_rank() {
    let rankings = load_dynasty_rankings(&fixture("dynasty.csv")).unwrap();
    let result = calculate_auction_values_at(
        &load_fixture_projections(),
        &dynasty_league(1.0),
        Some(&rankings),
        &HistoricalBaseline::default(),
        fixed_time(),
    )
    .unwrap();
    let dd = |name: &str| {
        find(&result, name)
            .dynasty
            .as_ref()
            .unwrap()
            .dynasty_dollar_value
            .unwrap()
    };
    assert!(dd("Bobby Witt Jr.") > dd("Julio Rodríguez"));
    assert!(dd("Julio Rodríguez") > dd("Freddie Freeman"));
    assert!(dd("Bobby Witt Jr.") <= 55);
}

#[test]
fn redraft_league_ignores_rankings() {
    let rankings = load_dynasty_rankings(&fixture("dynasty.csv")).unwrap();
    let projections = load_fixture_projections();
    let with = calculate_auction_values_at(
        &projections,
        &small_league(),
        Some(&rankings),
        &HistoricalBaseline::default(),
        fixed_time(),
    )
    .unwrap();
    let without = value(&small_league(), &projections);
    assert_eq!(with, without);
}

// ===========================================================================
// Inflation
// ===========================================================================

fn inflation_league() -> LeagueConfig {
    LeagueConfig {
        num_teams: 2,
        budget_per_team: 260,
        roster_spots: roster(&[
            ("C", 1),
            ("1B", 1),
            ("2B", 1),
            ("SS", 1),
            ("OF", 2),
            ("SP", 2),
            ("RP", 1),
            ("BN", 1),
        ]),
    }
}

#[test]
fn inflation_from_fixture_snapshot() {
    let players = load_matched_players(&fixture("matched_players.json")).unwrap();
    assert_eq!(players.len(), 13);

    let stats = calculate_inflation_stats(&players, &inflation_league(), None);
    assert_eq!(stats.drafted_count, 6);
    assert_eq!(stats.total_spent, 167);
    assert!((stats.total_projected_value - 155.0).abs() < 1e-9);

    // 520 − 169 spent = 351; 20 slots, 7 filled -> 13 open, 11 held back
    assert!((stats.adjusted_remaining_budget - 340.0).abs() < 1e-9);
    assert!((stats.remaining_projected_value - 102.0).abs() < 1e-9);
    assert!((stats.market_rate - 340.0 / 102.0).abs() < 1e-9);

    let names: Vec<&str> = stats
        .team_constraints
        .iter()
        .map(|t| t.team_name.as_str())
        .collect();
    assert_eq!(names, vec!["Carolina", "Duke"]);
    assert_eq!(stats.team_constraints[1].spent, 90);

    // The $1 -> $3 catcher barely moves the overall rate.
    assert!((stats.overall_inflation_rate - 1050.0 / 154.25).abs() < 1e-9);
    assert!((stats.weighted_inflation_rate - 12.0 / 155.0 * 100.0).abs() < 1e-9);

    // Every drafted sample lands in exactly one price range.
    let in_ranges: usize = stats
        .price_range_inflation
        .iter()
        .map(|r| r.player_count)
        .sum();
    assert_eq!(in_ranges, stats.drafted_count);
    let share: f64 = stats
        .price_range_inflation
        .iter()
        .map(|r| r.percent_of_total_spend)
        .sum();
    assert!((share - 100.0).abs() < 1e-9);

    let catchers = stats
        .positional_inflation
        .iter()
        .find(|p| p.position == Position::Catcher)
        .unwrap();
    assert_eq!(catchers.drafted_count, 2);
    assert_eq!((catchers.min_bid, catchers.max_bid), (3, 24));
    assert!((catchers.median_bid - 13.5).abs() < 1e-9);
    assert!((catchers.std_dev - (2.0f64 * 10.5 * 10.5).sqrt()).abs() < 1e-9);
    assert!(stats
        .positional_inflation
        .iter()
        .any(|p| p.position == Position::ReliefPitcher));

    // Both catcher slots are filled and none remain: surplus.
    let c = stats
        .positional_scarcity
        .iter()
        .find(|s| s.position == Position::Catcher)
        .unwrap();
    assert_eq!(c.league_need, 0);
    assert_eq!(c.level, ScarcityLevel::Surplus);
}

#[test]
fn inflation_with_scraped_teams() {
    let players = load_matched_players(&fixture("matched_players.json")).unwrap();
    let teams = load_scraped_teams(&fixture("teams.json")).unwrap();
    let stats = calculate_inflation_stats_with(
        &players,
        &inflation_league(),
        Some(&teams),
        &HistoricalBaseline::default(),
    );
    let duke = &stats.team_constraints[0];
    assert_eq!(duke.team_name, "Duke");
    assert_eq!(duke.effective_budget, 165);
    let carolina = &stats.team_constraints[1];
    assert_eq!(carolina.spent, 79);
    assert_eq!(carolina.effective_budget, 175);
    assert!((stats.adjusted_remaining_budget - 340.0).abs() < 1e-9);

    let adjusted = stats.inflation_adjusted_value(10.0, &[Position::Outfield]);
    assert!(adjusted >= 1.0);
    let json = serde_json::to_value(&stats).unwrap();
    assert!(json["marketRate"].as_f64().unwrap() > 1.0);
}

#[test]
fn league_config_from_settings() {
    let config = LeagueConfig::from(&standard_league());
    assert_eq!(config.total_budget(), 3120);
    assert_eq!(config.roster_size(), 18);
}
