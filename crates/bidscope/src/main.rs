// Bidscope entry point.
//
// `values` loads the league config and projection CSVs and prints the
// calculated auction values. `inflation` reads an auction snapshot and
// prints the inflation report. Output is JSON on stdout; logs go to stderr.

use bidscope::config;
use bidscope::inflation;
use bidscope::valuation;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

/// Auction valuation and inflation engine
#[derive(Parser)]
#[command(name = "bidscope")]
#[command(about = "Fantasy baseball auction values and live inflation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Calculate auction values for the configured league
    Values {
        /// Dynasty rankings CSV (overrides config/league.toml)
        #[arg(long)]
        dynasty: Option<PathBuf>,
    },

    /// Measure inflation in a live or finished auction
    Inflation {
        /// JSON array of matched auction players
        matched: PathBuf,

        /// JSON array of scraped team budgets
        #[arg(long)]
        teams: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} teams, ${} budget, {}",
        config.league.num_teams, config.league.budget_per_team, config.league.scoring_type
    );

    match cli.command {
        Command::Values { dynasty } => run_values(&config, dynasty.as_deref()),
        Command::Inflation { matched, teams } => {
            run_inflation(&config, &matched, teams.as_deref())
        }
    }
}

fn run_values(config: &config::Config, dynasty: Option<&Path>) -> anyhow::Result<()> {
    let projections = valuation::projections::load_all_projections(
        Path::new(&config.data_paths.hitters),
        Path::new(&config.data_paths.pitchers),
    )
    .context("failed to load projections")?;
    info!("Loaded {} projections", projections.len());

    let rankings_path = dynasty
        .map(Path::to_path_buf)
        .or_else(|| config.data_paths.dynasty_rankings.as_ref().map(PathBuf::from));
    let rankings = match rankings_path {
        Some(path) if config.league.league_type == config::LeagueType::Dynasty => Some(
            valuation::projections::load_dynasty_rankings(&path)
                .with_context(|| format!("failed to load dynasty rankings from {}", path.display()))?,
        ),
        _ => None,
    };

    let result = valuation::calculate_auction_values_at(
        &projections,
        &config.league,
        rankings.as_deref(),
        &config.baseline,
        chrono::Utc::now(),
    )
    .context("failed to calculate auction values")?;
    info!(
        "Valued {} players ({} in pool)",
        result.players.len(),
        result.players.iter().filter(|p| p.is_in_draft_pool).count()
    );

    print_json(&result)
}

fn run_inflation(
    config: &config::Config,
    matched: &Path,
    teams: Option<&Path>,
) -> anyhow::Result<()> {
    let players = inflation::types::load_matched_players(matched)
        .context("failed to load matched players")?;
    let teams = teams
        .map(inflation::types::load_scraped_teams)
        .transpose()
        .context("failed to load scraped teams")?;

    let league = inflation::types::LeagueConfig::from(&config.league);
    let stats = inflation::calculate_inflation_stats_with(
        &players,
        &league,
        teams.as_deref(),
        &config.baseline,
    );
    print_json(&stats)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Initialize tracing to stderr so stdout carries only JSON.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bidscope=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
