// Configuration loading and parsing (league.toml, baseline.toml).

use crate::baseline::HistoricalBaseline;
use crate::valuation::points::PointsSettings;
use crate::valuation::ValuationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Enumerated settings
// ---------------------------------------------------------------------------

/// How the league turns stats into standings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScoringType {
    Rotisserie,
    H2hCategories,
    H2hPoints,
}

impl ScoringType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringType::Rotisserie => "rotisserie",
            ScoringType::H2hCategories => "h2h-categories",
            ScoringType::H2hPoints => "h2h-points",
        }
    }

    /// Points leagues are valued with linear points instead of SGP.
    pub fn is_points(&self) -> bool {
        matches!(self, ScoringType::H2hPoints)
    }
}

impl FromStr for ScoringType {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "rotisserie" | "roto" => Ok(ScoringType::Rotisserie),
            "h2h-categories" => Ok(ScoringType::H2hCategories),
            "h2h-points" => Ok(ScoringType::H2hPoints),
            _ => Err(ValuationError::UnknownScoringType(s.to_string())),
        }
    }
}

impl TryFrom<String> for ScoringType {
    type Error = ValuationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScoringType> for String {
    fn from(value: ScoringType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ScoringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeagueType {
    #[default]
    Redraft,
    Dynasty,
}

/// Projection source the league values against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionSystem {
    #[default]
    Steamer,
    Ja,
    Batx,
}

impl ProjectionSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionSystem::Steamer => "steamer",
            ProjectionSystem::Ja => "ja",
            ProjectionSystem::Batx => "batx",
        }
    }
}

// ---------------------------------------------------------------------------
// League settings
// ---------------------------------------------------------------------------

/// Share of the total budget reserved for hitters vs. pitchers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitterPitcherSplit {
    pub hitter: f64,
    pub pitcher: f64,
}

impl Default for HitterPitcherSplit {
    fn default() -> Self {
        HitterPitcherSplit {
            hitter: 0.68,
            pitcher: 0.32,
        }
    }
}

impl HitterPitcherSplit {
    /// Hitter share normalized so the two shares sum to 1.
    pub fn hitter_share(&self) -> f64 {
        let total = self.hitter + self.pitcher;
        if total > 0.0 {
            self.hitter / total
        } else {
            HitterPitcherSplit::default().hitter
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynastySettings {
    pub dynasty_weight: f64,
    #[serde(default)]
    pub include_minors: bool,
}

/// Per-league overrides for the market correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InflationSettings {
    /// Ten factors, tier 1 first. Anything else is ignored.
    pub tier_factors: Option<Vec<f64>>,
    /// Merged over the baseline position factors.
    pub position_factors: Option<BTreeMap<String, f64>>,
    pub enable_market_correction: bool,
    pub enable_position_scarcity: bool,
}

impl Default for InflationSettings {
    fn default() -> Self {
        InflationSettings {
            tier_factors: None,
            position_factors: None,
            enable_market_correction: true,
            enable_position_scarcity: true,
        }
    }
}

const DEFAULT_HITTING_CATEGORIES: &[&str] = &["R", "HR", "RBI", "SB", "AVG"];
const DEFAULT_PITCHING_CATEGORIES: &[&str] = &["W", "SV", "K", "ERA", "WHIP"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSettings {
    pub num_teams: u32,
    pub budget_per_team: u32,
    /// Position -> slots per team (e.g. `OF = 3`, `Bench = 2`).
    pub roster_spots: BTreeMap<String, usize>,
    pub scoring_type: ScoringType,
    /// Category code -> enabled flag.
    #[serde(default)]
    pub hitting_categories: BTreeMap<String, bool>,
    #[serde(default)]
    pub pitching_categories: BTreeMap<String, bool>,
    #[serde(default)]
    pub points_settings: Option<PointsSettings>,
    #[serde(default)]
    pub hitter_pitcher_split: HitterPitcherSplit,
    #[serde(default)]
    pub league_type: LeagueType,
    #[serde(default)]
    pub dynasty_settings: Option<DynastySettings>,
    #[serde(default)]
    pub inflation_settings: Option<InflationSettings>,
    #[serde(default)]
    pub projection_system: ProjectionSystem,
}

fn enabled(flags: &BTreeMap<String, bool>, defaults: &[&str]) -> Vec<String> {
    let on: Vec<String> = flags
        .iter()
        .filter(|(_, &enabled)| enabled)
        .map(|(code, _)| code.trim().to_uppercase())
        .collect();
    if on.is_empty() {
        defaults.iter().map(|c| c.to_string()).collect()
    } else {
        on
    }
}

impl LeagueSettings {
    /// League-wide budget (saturates; `validate` rejects overflowing leagues).
    pub fn total_budget(&self) -> u32 {
        self.num_teams.saturating_mul(self.budget_per_team)
    }

    /// Enabled hitting categories, or standard 5x5 when none are flagged.
    pub fn enabled_hitting_categories(&self) -> Vec<String> {
        enabled(&self.hitting_categories, DEFAULT_HITTING_CATEGORIES)
    }

    /// Enabled pitching categories, or standard 5x5 when none are flagged.
    pub fn enabled_pitching_categories(&self) -> Vec<String> {
        enabled(&self.pitching_categories, DEFAULT_PITCHING_CATEGORIES)
    }

    /// Inflation settings with defaults filled in.
    pub fn inflation(&self) -> InflationSettings {
        self.inflation_settings.clone().unwrap_or_default()
    }

    /// Dynasty weight in effect: 0 outside dynasty leagues.
    pub fn dynasty_weight(&self) -> Option<f64> {
        match self.league_type {
            LeagueType::Dynasty => Some(self.dynasty_settings.map_or(0.0, |d| d.dynasty_weight)),
            LeagueType::Redraft => None,
        }
    }

    /// Check the settings the valuation engine relies on.
    pub fn validate(&self) -> Result<(), ValuationError> {
        if self.num_teams == 0 {
            return Err(ValuationError::InvalidSettings {
                field: "num_teams".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.budget_per_team == 0 {
            return Err(ValuationError::InvalidSettings {
                field: "budget_per_team".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.num_teams.checked_mul(self.budget_per_team).is_none() {
            return Err(ValuationError::InvalidSettings {
                field: "budget_per_team".into(),
                message: format!(
                    "total budget of {} teams at ${} does not fit in u32",
                    self.num_teams, self.budget_per_team
                ),
            });
        }
        let split = self.hitter_pitcher_split;
        for (field, value) in [
            ("hitter_pitcher_split.hitter", split.hitter),
            ("hitter_pitcher_split.pitcher", split.pitcher),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValuationError::InvalidSettings {
                    field: field.into(),
                    message: format!("must be between 0.0 and 1.0 inclusive, got {value}"),
                });
            }
        }
        if split.hitter + split.pitcher <= 0.0 {
            return Err(ValuationError::InvalidSettings {
                field: "hitter_pitcher_split".into(),
                message: "hitter and pitcher shares cannot both be 0".into(),
            });
        }
        if let Some(dynasty) = self.dynasty_settings {
            let w = dynasty.dynasty_weight;
            if !(0.0..=1.0).contains(&w) {
                return Err(ValuationError::InvalidSettings {
                    field: "dynasty_settings.dynasty_weight".into(),
                    message: format!("must be between 0.0 and 1.0 inclusive, got {w}"),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataPaths {
    pub hitters: String,
    pub pitchers: String,
    #[serde(default)]
    pub dynasty_rankings: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueSettings,
    pub baseline: HistoricalBaseline,
    pub data_paths: DataPaths,
}

/// Raw deserialization target for league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueSettings,
    data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// (optionally) `config/baseline.toml`, relative to `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- baseline.toml (optional) ---
    let baseline_path = config_dir.join("baseline.toml");
    let baseline = if baseline_path.exists() {
        let text = read_file(&baseline_path)?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: baseline_path.clone(),
            source: e,
        })?
    } else {
        HistoricalBaseline::default()
    };

    let config = Config {
        league: league_file.league,
        baseline,
        data_paths: league_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy `src` to `dst` unless `dst` already exists. Returns whether a copy
/// was made.
fn copy_if_missing(src: &Path, dst: &Path) -> Result<bool, ConfigError> {
    let copy_error = |what: &str, path: &Path, e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("cannot {what} {}: {e}", path.display()),
    };
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dst)
    {
        Ok(file) => file,
        // Never clobber a league the user has already edited.
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error("create", dst, e)),
    };
    let content = std::fs::read(src).map_err(|e| copy_error("read default", src, e))?;
    std::io::Write::write_all(&mut dest, &content).map_err(|e| copy_error("write", dst, e))?;
    Ok(true)
}

/// Seed `config/` with any league or baseline file it is missing.
///
/// Only `*.toml` files from `defaults/` are considered, in name order;
/// existing files are left untouched. Returns the files that were created.
/// A project with `config/` but no `defaults/` is left as it is.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(vec![]);
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no league configuration under {}: expected defaults/league.toml \
                 or config/league.toml",
                base_dir.display()
            ),
        });
    }

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("cannot list {}: {e}", defaults_dir.display()),
    })?;
    let mut defaults: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    defaults.sort();

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("cannot create {}: {e}", config_dir.display()),
    })?;

    let mut copied = Vec::new();
    for src in defaults {
        let Some(file_name) = src.file_name() else {
            continue;
        };
        let target = config_dir.join(file_name);
        if copy_if_missing(&src, &target)? {
            info!("seeded {} from defaults", target.display());
            copied.push(target);
        }
    }
    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    config.league.validate().map_err(|e| match e {
        ValuationError::InvalidSettings { field, message } => ConfigError::ValidationError {
            field: format!("league.{field}"),
            message,
        },
        other => ConfigError::ValidationError {
            field: "league".into(),
            message: other.to_string(),
        },
    })?;

    let breakdown = crate::valuation::auction::roster_breakdown(&config.league.roster_spots);
    if breakdown.hitter_slots == 0 || breakdown.pitcher_slots == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.roster_spots".into(),
            message: "roster needs at least one hitter and one pitcher slot".into(),
        });
    }

    let tiers = config.baseline.tier_factors.len();
    if tiers != 10 {
        return Err(ConfigError::ValidationError {
            field: "baseline.tier_factors".into(),
            message: format!("expected 10 tier factors, got {tiers}"),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
