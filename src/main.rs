//! Leaguebook CLI - club records for leagues, teams, players and matches

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use leaguebook::config;
use leaguebook::storage::LeagueStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "leaguebook")]
#[command(version)]
#[command(about = "Club records - leagues, teams, players, matches and scoring events")]
#[command(long_about = r#"
Leaguebook keeps a small club's records in a SQLite file and answers the
usual questions about them: who scored, who leads, who plays where.

Example usage:
  leaguebook init --sample
  leaguebook report goals
  leaguebook teams "Premier League"
  leaguebook age Warrior --years 1
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn is_human(&self) -> bool {
        matches!(self, OutputFormat::Text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Every score event with match, teams, league and scorer
    Matches,
    /// Players with their team and league
    Roster,
    /// The standing player_summary view
    Summary,
    /// Total goals per team
    Goals,
    /// Average player age per team
    Ages,
    /// Teams holding the single highest-scoring event
    TopScorers,
    /// Players of the team with the highest average age
    OldestRoster,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the database
    Init {
        /// Load the bundled sample records
        #[arg(long)]
        sample: bool,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Import a TOML dataset in one transaction
    Seed {
        /// Dataset file (defaults to the configured seed, then the bundled sample)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show row counts per table
    Stats,

    /// Run one of the built-in reports
    Report {
        #[arg(value_enum)]
        kind: ReportKind,
    },

    /// List the teams of a league
    Teams {
        /// League name
        league: String,
    },

    /// Assign a new coach to a team
    Coach {
        /// Team name
        team: String,

        /// New coach name
        coach: String,
    },

    /// Increase the age of every player on a team
    Age {
        /// Team name
        team: String,

        /// Years to add
        #[arg(long, default_value = "1")]
        years: i32,

        /// Report the change, then roll it back
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete one score event
    DeleteEvent {
        /// Score event id
        id: i64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let settings = config::load_config(Some(&config_path))?.unwrap_or_default();
    let database = settings.database_path(cli.database.as_deref());

    let format = cli.format;
    let seed_file = settings.seed.as_ref().map(PathBuf::from);

    match cli.command {
        Commands::Init { sample, force } => {
            commands::run_init(&config_path, &database, sample, force, format)
        }
        Commands::Seed { file } => with_store(&database, |store| {
            commands::run_seed(store, file.or(seed_file).as_deref(), format)
        }),
        Commands::Stats => with_store(&database, |store| commands::run_stats(store, format)),
        Commands::Report { kind } => {
            with_store(&database, |store| commands::run_report(store, kind, format))
        }
        Commands::Teams { league } => {
            with_store(&database, |store| commands::run_teams(store, &league, format))
        }
        Commands::Coach { team, coach } => {
            with_store(&database, |store| commands::run_coach(store, &team, &coach, format))
        }
        Commands::Age { team, years, dry_run } => with_store(&database, |store| {
            commands::run_age(store, &team, years, dry_run, format)
        }),
        Commands::DeleteEvent { id } => {
            with_store(&database, |store| commands::run_delete_event(store, id, format))
        }
    }
}

/// Open the store, run one command against it, then close it
fn with_store<F>(database: &Path, f: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut LeagueStore) -> anyhow::Result<()>,
{
    config::ensure_db_dir(database)?;
    tracing::debug!("Using database {:?}", database);
    let mut store = LeagueStore::open(database)?;
    let outcome = f(&mut store);
    settle(outcome, store.close())
}

/// The command's own error wins over a close error
fn settle(outcome: anyhow::Result<()>, closed: leaguebook::Result<()>) -> anyhow::Result<()> {
    outcome?;
    closed?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_failure() -> leaguebook::Result<()> {
        Err(leaguebook::Error::Io(std::io::Error::other("disk gone")))
    }

    #[test]
    fn test_command_error_wins_over_close_error() {
        let err = settle(Err(anyhow::anyhow!("No team named 'Ghosts'")), close_failure()).unwrap_err();
        assert_eq!(err.to_string(), "No team named 'Ghosts'");
    }

    #[test]
    fn test_close_error_surfaces_after_success() {
        let err = settle(Ok(()), close_failure()).unwrap_err();
        assert!(err.to_string().contains("disk gone"));
        assert!(settle(Ok(()), Ok(())).is_ok());
    }

    #[test]
    fn test_with_store_reports_command_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let database = dir.path().join("nested").join("leaguebook.db");
        let err = with_store(&database, |_| anyhow::bail!("No score event with id 9")).unwrap_err();
        assert_eq!(err.to_string(), "No score event with id 9");
        assert!(database.exists());
    }
}
